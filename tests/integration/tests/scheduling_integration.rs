//! Update scheduling through the job queue
//!
//! These tests verify:
//! 1. `next_tick()` resolves only after prior mutations are committed
//! 2. A host scheduler (tokio `LocalSet`) drives flushes on its own
//! 3. A panicking render fails its own job only
//! 4. A component that re-triggers itself forever hits the recursion limit

use futures::FutureExt;
use reinhardt_reactivity::component::testing::{RecordingRenderer, RenderOp};
use reinhardt_reactivity::component::{Component, View, on_updated, render};
use reinhardt_reactivity::reactive::testing::DiagnosticCapture;
use reinhardt_reactivity::reactive::{
	ReactiveError, RuntimeConfig, Signal, clear_scheduler, configure, next_tick, set_scheduler,
	tick,
};
use reinhardt_reactivity_integration_tests::NestedTree;
use rstest::rstest;
use serial_test::serial;
use std::cell::Cell;
use std::rc::Rc;

#[rstest]
#[serial(reactive)]
fn test_next_tick_resolves_after_commit() {
	let tree = NestedTree::mount().unwrap();
	let (_, c) = tree.descendants().unwrap();

	tree.shared.set(3);
	let mut waiter = next_tick();
	assert!(!waiter.is_ready());
	assert!((&mut waiter).now_or_never().is_none());
	assert_eq!(tree.renderer.committed(c.id()), Some("C:0".to_owned()));

	tick();

	assert!(waiter.is_ready());
	assert_eq!(waiter.now_or_never(), Some(()));
	assert_eq!(tree.renderer.committed(c.id()), Some("C:3".to_owned()));
}

#[rstest]
#[serial(reactive)]
fn test_next_tick_without_pending_work_still_passes_a_flush() {
	let waiter = next_tick();
	assert!(!waiter.is_ready());

	tick();

	assert!(waiter.is_ready());
}

#[tokio::test(flavor = "current_thread")]
#[serial(reactive)]
async fn test_tokio_host_commits_before_next_tick() {
	let local = tokio::task::LocalSet::new();
	local
		.run_until(async {
			set_scheduler(|task| {
				tokio::task::spawn_local(async move { task() });
			});

			let tree = NestedTree::mount().unwrap();
			let (b, c) = tree.descendants().unwrap();
			tree.log.clear();

			tree.shared.set(1);
			tree.leaf.set(1);
			next_tick().await;

			assert_eq!(tree.renderer.committed(b.id()), Some("B:1".to_owned()));
			assert_eq!(tree.renderer.committed(c.id()), Some("C:2".to_owned()));
			assert_eq!(
				tree.log.entries(),
				vec!["A.bu", "B.bu", "C.bu", "C.u", "B.u", "A.u"]
			);

			tree.root.unmount().unwrap();
			clear_scheduler();
		})
		.await;
}

#[rstest]
#[serial(reactive)]
fn test_panicking_render_fails_only_its_job() {
	let capture = DiagnosticCapture::install();
	let state = Signal::new(0);
	let broken = Component::new("Broken", {
		let state = state.clone();
		move || {
			let state = state.clone();
			move || {
				if state.get() > 0 {
					panic!("render failed");
				}
				View::new("ok".to_owned())
			}
		}
	});
	let healthy = Component::new("Healthy", {
		let state = state.clone();
		move || {
			let state = state.clone();
			move || View::new(format!("healthy:{}", state.get()))
		}
	});
	let renderer = Rc::new(RecordingRenderer::new());
	let _broken = render(&broken, Rc::clone(&renderer)).unwrap();
	let healthy = render(&healthy, Rc::clone(&renderer)).unwrap();
	renderer.take_ops();

	state.set(1);
	tick();

	assert_eq!(
		renderer.ops(),
		vec![RenderOp::Patch {
			instance: healthy.id(),
			output: "healthy:1".to_owned(),
		}]
	);
	assert_eq!(
		capture.errors::<ReactiveError>(),
		vec![ReactiveError::JobPanicked {
			label: "update:Broken".to_owned(),
			message: "render failed".to_owned(),
		}]
	);
}

#[rstest]
#[serial(reactive)]
fn test_self_triggering_component_hits_recursion_limit() {
	configure(RuntimeConfig::new().with_recursion_limit(5));
	let capture = DiagnosticCapture::install();
	let state = Signal::new(0u32);
	let renders = Rc::new(Cell::new(0u32));
	let looper = Component::new("Looper", {
		let (state, renders) = (state.clone(), Rc::clone(&renders));
		move || {
			let writer = state.clone();
			on_updated(move || writer.update(|value| *value += 1));
			let (state, renders) = (state.clone(), Rc::clone(&renders));
			move || {
				renders.set(renders.get() + 1);
				View::new(state.get().to_string())
			}
		}
	});
	let _root = render(&looper, Rc::new(RecordingRenderer::new())).unwrap();

	state.set(1);
	tick();

	assert_eq!(
		capture.errors::<ReactiveError>(),
		vec![ReactiveError::RecursionLimitExceeded {
			label: "update:Looper".to_owned(),
			limit: 5,
		}]
	);
	// First render plus at most `limit` updates
	assert!(renders.get() <= 6);
	configure(RuntimeConfig::default());
}
