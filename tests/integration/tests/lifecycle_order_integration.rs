//! Lifecycle ordering across a component tree
//!
//! These tests verify:
//! 1. `before-*` hooks fire parent first, the others children first
//! 2. Each instance re-renders once per flush, parent before child
//! 3. Commits reach the renderer in the same order, whichever write came first
//! 4. A panicking hook does not stop the traversal

use reinhardt_reactivity::component::testing::{HookLog, RecordingRenderer, RenderOp};
use reinhardt_reactivity::component::{Component, LifecycleError, View, on_mounted, render};
use reinhardt_reactivity::reactive::testing::DiagnosticCapture;
use reinhardt_reactivity::reactive::tick;
use reinhardt_reactivity_integration_tests::{NestedTree, node};
use rstest::rstest;
use serial_test::serial;
use std::rc::Rc;

#[rstest]
#[serial(reactive)]
fn test_mount_order() {
	let tree = NestedTree::mount().unwrap();

	assert_eq!(
		tree.log.entries(),
		vec!["A.bm", "B.bm", "C.bm", "C.m", "B.m", "A.m"]
	);
	let inserted: Vec<String> = tree
		.renderer
		.ops()
		.into_iter()
		.filter_map(|op| match op {
			RenderOp::Insert { output, .. } => Some(output),
			_ => None,
		})
		.collect();
	assert_eq!(inserted, vec!["A:0", "B:0", "C:0"]);
}

#[rstest]
#[serial(reactive)]
fn test_update_order_after_shared_write() {
	let tree = NestedTree::mount().unwrap();
	let (b, c) = tree.descendants().unwrap();
	tree.log.clear();
	tree.renderer.take_ops();

	tree.shared.set(1);
	tree.shared.set(2);
	tick();

	assert_eq!(
		tree.log.entries(),
		vec!["A.bu", "B.bu", "C.bu", "C.u", "B.u", "A.u"]
	);
	assert_eq!(
		tree.renderer.ops(),
		vec![
			RenderOp::Patch {
				instance: tree.root.id(),
				output: "A:2".to_owned(),
			},
			RenderOp::Patch {
				instance: b.id(),
				output: "B:2".to_owned(),
			},
			RenderOp::Patch {
				instance: c.id(),
				output: "C:2".to_owned(),
			},
		]
	);
	assert!(!b.is_update_pending());
	assert!(!c.is_update_pending());
}

#[rstest]
#[case::leaf_then_shared(true)]
#[case::shared_then_leaf(false)]
#[serial(reactive)]
fn test_mixed_batch_keeps_tree_order(#[case] leaf_first: bool) {
	let tree = NestedTree::mount().unwrap();
	let (b, c) = tree.descendants().unwrap();
	tree.log.clear();
	tree.renderer.take_ops();

	if leaf_first {
		tree.leaf.set(1);
		tree.shared.set(1);
	} else {
		tree.shared.set(1);
		tree.leaf.set(1);
	}
	tick();

	assert_eq!(
		tree.log.entries(),
		vec!["A.bu", "B.bu", "C.bu", "C.u", "B.u", "A.u"]
	);
	assert_eq!(
		tree.renderer.ops(),
		vec![
			RenderOp::Patch {
				instance: tree.root.id(),
				output: "A:1".to_owned(),
			},
			RenderOp::Patch {
				instance: b.id(),
				output: "B:1".to_owned(),
			},
			RenderOp::Patch {
				instance: c.id(),
				output: "C:2".to_owned(),
			},
		]
	);
	assert!(!c.is_update_pending());
}

#[rstest]
#[serial(reactive)]
fn test_leaf_write_updates_only_the_leaf() {
	let tree = NestedTree::mount().unwrap();
	tree.log.clear();

	tree.leaf.set(5);
	tick();

	assert_eq!(tree.log.entries(), vec!["C.bu", "C.u"]);
	let (_, c) = tree.descendants().unwrap();
	assert_eq!(tree.renderer.committed(c.id()), Some("C:5".to_owned()));
}

#[rstest]
#[serial(reactive)]
fn test_unmount_order() {
	let tree = NestedTree::mount().unwrap();
	let (b, c) = tree.descendants().unwrap();
	tree.log.clear();
	tree.renderer.take_ops();

	tree.root.unmount().unwrap();

	assert_eq!(
		tree.log.entries(),
		vec!["A.bum", "B.bum", "C.bum", "C.um", "B.um", "A.um"]
	);
	assert_eq!(
		tree.renderer.ops(),
		vec![
			RenderOp::Remove { instance: c.id() },
			RenderOp::Remove { instance: b.id() },
			RenderOp::Remove {
				instance: tree.root.id(),
			},
		]
	);
	assert_eq!(tree.renderer.committed_len(), 0);
}

#[rstest]
#[serial(reactive)]
fn test_writes_after_unmount_are_ignored() {
	let tree = NestedTree::mount().unwrap();
	tree.root.unmount().unwrap();
	tree.log.clear();
	tree.renderer.take_ops();

	tree.shared.set(7);
	tree.leaf.set(7);
	tick();

	assert!(tree.log.entries().is_empty());
	assert!(tree.renderer.ops().is_empty());
}

#[rstest]
#[serial(reactive)]
fn test_panicking_hook_does_not_stop_traversal() {
	let capture = DiagnosticCapture::install();
	let log = HookLog::new();
	let broken = Component::new("Broken", {
		let log = log.clone();
		move || {
			log.log_lifecycle("Broken");
			on_mounted(|| panic!("mounted failed"));
			|| View::new(String::new())
		}
	});
	let outer = Component::new("Outer", {
		let log = log.clone();
		move || {
			log.log_lifecycle("Outer");
			let broken = broken.clone();
			move || View::new(String::new()).with_child("inner", &broken)
		}
	});

	let root = render(&outer, Rc::new(RecordingRenderer::new())).unwrap();

	assert!(root.is_mounted());
	assert_eq!(
		log.entries(),
		vec!["Outer.bm", "Broken.bm", "Broken.m", "Outer.m"]
	);
	assert_eq!(capture.errors::<LifecycleError>().len(), 1);
}

#[rstest]
#[serial(reactive)]
fn test_sibling_subtrees_update_independently() {
	let log = HookLog::new();
	let left_state = reinhardt_reactivity::reactive::Signal::new(0);
	let right_state = reinhardt_reactivity::reactive::Signal::new(0);
	let left = node("Left", &log, vec![left_state.clone()], None);
	let right = node("Right", &log, vec![right_state.clone()], None);
	let parent = Component::new("Parent", move || {
		let (left, right) = (left.clone(), right.clone());
		move || {
			View::new("parent".to_owned())
				.with_child("left", &left)
				.with_child("right", &right)
		}
	});
	let root = render(&parent, Rc::new(RecordingRenderer::new())).unwrap();
	log.clear();

	right_state.set(1);
	left_state.set(1);
	tick();

	// Jobs flush in first-enqueue order
	assert_eq!(
		log.entries(),
		vec!["Right.bu", "Right.u", "Left.bu", "Left.u"]
	);
	assert_eq!(root.children().len(), 2);
}
