//! Render debug hooks and dependency bookkeeping seen from components
//!
//! These tests verify:
//! 1. GET, HAS, ITERATE reads are reported in read order
//! 2. SET carries old and new values, ADD only new, DELETE only old
//! 3. Subscriptions not read by the latest render are pruned
//! 4. Hook registration outside setup is reported and ignored

use reinhardt_reactivity::component::testing::{RecordingRenderer, RenderOp};
use reinhardt_reactivity::component::{
	Component, LifecycleError, View, on_mounted, on_render_tracked, on_render_triggered, render,
};
use reinhardt_reactivity::reactive::testing::DiagnosticCapture;
use reinhardt_reactivity::reactive::{DebugEvent, Key, OpKind, ReactiveRecord, Signal, tick};
use rstest::rstest;
use serde_json::{Value, json};
use serial_test::serial;
use std::cell::RefCell;
use std::rc::Rc;

type EventLog = Rc<RefCell<Vec<DebugEvent>>>;

fn inspector(state: &ReactiveRecord) -> (Component<String>, EventLog, EventLog) {
	let tracked: EventLog = Rc::default();
	let triggered: EventLog = Rc::default();
	let component = Component::new("Inspector", {
		let (state, tracked, triggered) = (state.clone(), Rc::clone(&tracked), Rc::clone(&triggered));
		move || {
			let tracked = Rc::clone(&tracked);
			on_render_tracked(move |event| tracked.borrow_mut().push(event.clone()));
			let triggered = Rc::clone(&triggered);
			on_render_triggered(move |event| triggered.borrow_mut().push(event.clone()));
			let state = state.clone();
			move || {
				let foo = state.get("foo");
				let has_foo = state.contains_key("foo");
				let keys = state.keys();
				View::new(format!("{foo:?} {has_foo} {keys:?}"))
			}
		}
	});
	(component, tracked, triggered)
}

#[rstest]
#[serial(reactive)]
fn test_tracked_reads_in_order() {
	let state = ReactiveRecord::from_json(json!({ "foo": 1 })).unwrap();
	let (component, tracked, _) = inspector(&state);

	let _root = render(&component, Rc::new(RecordingRenderer::new())).unwrap();

	let tracked = tracked.borrow();
	let kinds: Vec<OpKind> = tracked.iter().map(|event| event.kind).collect();
	assert_eq!(kinds, vec![OpKind::Get, OpKind::Has, OpKind::Iterate]);
	assert_eq!(tracked[0].key, Key::from("foo"));
	assert_eq!(tracked[1].key, Key::from("foo"));
	assert_eq!(tracked[2].key, Key::Iterate);
	assert!(tracked.iter().all(|event| event.target == state.target_id()));
}

#[rstest]
#[serial(reactive)]
fn test_triggered_payloads() {
	let state = ReactiveRecord::from_json(json!({ "foo": 1 })).unwrap();
	let (component, _, triggered) = inspector(&state);
	let _root = render(&component, Rc::new(RecordingRenderer::new())).unwrap();

	state.set("foo", 2);
	state.set("bar", 1);
	state.remove("foo");

	let triggered = triggered.borrow();
	let summary: Vec<(OpKind, Option<Value>, Option<Value>)> = triggered
		.iter()
		.map(|event| {
			(
				event.kind,
				event.old_value_as::<Value>().cloned(),
				event.new_value_as::<Value>().cloned(),
			)
		})
		.collect();
	assert_eq!(
		summary,
		vec![
			(OpKind::Set, Some(json!(1)), Some(json!(2))),
			(OpKind::Add, None, Some(json!(1))),
			(OpKind::Delete, Some(json!(2)), None),
		]
	);
}

#[rstest]
#[serial(reactive)]
fn test_debug_hooks_do_not_change_scheduling() {
	let state = ReactiveRecord::from_json(json!({ "foo": 1 })).unwrap();
	let (component, _, _) = inspector(&state);
	let renderer = Rc::new(RecordingRenderer::new());
	let root = render(&component, Rc::clone(&renderer)).unwrap();
	renderer.take_ops();

	state.set("foo", 2);
	state.set("foo", 3);
	assert!(renderer.ops().is_empty());
	tick();

	assert_eq!(
		renderer.ops(),
		vec![RenderOp::Patch {
			instance: root.id(),
			output: r#"Some(Number(3)) true ["foo"]"#.to_owned(),
		}]
	);
}

#[rstest]
#[serial(reactive)]
fn test_stale_branch_is_pruned() {
	let use_left = Signal::new(true);
	let left = Signal::new(0);
	let right = Signal::new(0);
	let renders = Rc::new(RefCell::new(0));
	let branch = Component::new("Branch", {
		let (use_left, left, right, renders) =
			(use_left.clone(), left.clone(), right.clone(), Rc::clone(&renders));
		move || {
			let (use_left, left, right, renders) =
				(use_left.clone(), left.clone(), right.clone(), Rc::clone(&renders));
			move || {
				*renders.borrow_mut() += 1;
				let value = if use_left.get() { left.get() } else { right.get() };
				View::new(value.to_string())
			}
		}
	});
	let root = render(&branch, Rc::new(RecordingRenderer::new())).unwrap();

	use_left.set(false);
	tick();
	assert_eq!(*renders.borrow(), 2);

	left.set(1);
	tick();
	assert_eq!(*renders.borrow(), 2);
	assert!(!root.is_update_pending());

	right.set(1);
	tick();
	assert_eq!(*renders.borrow(), 3);
}

#[rstest]
#[serial(reactive)]
fn test_hook_outside_setup_is_reported_and_ignored() {
	let capture = DiagnosticCapture::install();

	on_mounted(|| panic!("must never run"));
	on_render_tracked(|_| panic!("must never run"));

	assert_eq!(
		capture.warnings::<LifecycleError>(),
		vec![
			LifecycleError::HookOutsideSetup { hook: "on_mounted" },
			LifecycleError::HookOutsideSetup {
				hook: "on_render_tracked",
			},
		]
	);

	let plain = Component::new("Plain", || || View::new(String::new()));
	let root = render(&plain, Rc::new(RecordingRenderer::new())).unwrap();
	assert!(root.is_mounted());
	assert!(capture.errors::<LifecycleError>().is_empty());
}
