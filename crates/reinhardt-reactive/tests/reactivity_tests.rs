//! Integration tests for dependency tracking
//!
//! These tests verify:
//! 1. Debug events for reads arrive as GET, HAS, ITERATE in read order
//! 2. Write events carry the expected old/new values
//! 3. Subscriptions that were not read in the latest run are pruned
//! 4. Untracked reads and disposed effects never subscribe

use reinhardt_reactive::runtime::with_runtime;
use reinhardt_reactive::{
	DebugEvent, Effect, EffectOptions, Key, OpKind, ReactiveMap, ReactiveRecord, Signal, reactive,
	untrack,
};
use rstest::rstest;
use serde_json::json;
use serial_test::serial;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

fn recorder() -> (Rc<RefCell<Vec<DebugEvent>>>, impl Fn(&DebugEvent) + 'static) {
	let events = Rc::new(RefCell::new(Vec::new()));
	let sink = Rc::clone(&events);
	(events, move |event: &DebugEvent| sink.borrow_mut().push(event.clone()))
}

#[rstest]
#[serial(reactive)]
fn test_read_kinds_in_order() {
	let state = ReactiveRecord::from_json(json!({ "foo": 1 })).unwrap();
	let (events, hook) = recorder();

	let _effect = Effect::with_options(
		{
			let state = state.clone();
			move || {
				state.get("foo");
				state.contains_key("foo");
				state.keys();
			}
		},
		EffectOptions::new().on_track(hook),
	);

	let kinds: Vec<OpKind> = events.borrow().iter().map(|event| event.kind).collect();
	assert_eq!(kinds, vec![OpKind::Get, OpKind::Has, OpKind::Iterate]);
	let events = events.borrow();
	assert!(events.iter().all(|event| event.target == state.target_id()));
	assert!(events.iter().all(|event| event.old_value.is_none() && event.new_value.is_none()));
	assert_eq!(events[2].key, Key::Iterate);
}

#[rstest]
#[serial(reactive)]
fn test_write_payloads() {
	let scores = reactive(HashMap::from([("alice", 1)]));
	let (events, hook) = recorder();

	let _effect = Effect::with_options(
		{
			let scores = scores.clone();
			move || scores.entries()
		},
		EffectOptions::new().on_trigger(hook),
	);

	scores.insert("alice", 2);
	scores.insert("bob", 5);
	scores.remove(&"alice");

	let events = events.borrow();
	assert_eq!(events.len(), 3);

	assert_eq!(events[0].kind, OpKind::Set);
	assert_eq!(events[0].old_value_as::<i32>(), Some(&1));
	assert_eq!(events[0].new_value_as::<i32>(), Some(&2));

	assert_eq!(events[1].kind, OpKind::Add);
	assert!(events[1].old_value.is_none());
	assert_eq!(events[1].new_value_as::<i32>(), Some(&5));

	assert_eq!(events[2].kind, OpKind::Delete);
	assert_eq!(events[2].old_value_as::<i32>(), Some(&2));
	assert!(events[2].new_value.is_none());
}

#[rstest]
#[serial(reactive)]
fn test_payload_describes_the_write_not_a_later_rewrite() {
	let flags = reactive(HashMap::from([("a", 0)]));
	let (events, hook) = recorder();

	// Runs synchronously before the observer below and rewrites the key
	let _normalizer = Effect::new({
		let flags = flags.clone();
		move || {
			if flags.get(&"a") == Some(1) {
				flags.insert("a", 5);
			}
		}
	});
	let _observer = Effect::with_options(
		{
			let flags = flags.clone();
			move || flags.get(&"a")
		},
		EffectOptions::new().on_trigger(hook),
	);

	flags.insert("a", 1);

	let payloads: Vec<(Option<i32>, Option<i32>)> = events
		.borrow()
		.iter()
		.map(|event| {
			(
				event.old_value_as::<i32>().copied(),
				event.new_value_as::<i32>().copied(),
			)
		})
		.collect();
	assert_eq!(payloads, vec![(Some(1), Some(5)), (Some(0), Some(1))]);
	assert_eq!(flags.get_untracked(&"a"), Some(5));
}

#[rstest]
#[serial(reactive)]
fn test_stale_subscriptions_are_pruned() {
	let toggle = Signal::new(true);
	let left = Signal::new("left");
	let right = Signal::new("right");
	let runs = Rc::new(Cell::new(0));

	let effect = Effect::new({
		let (toggle, left, right) = (toggle.clone(), left.clone(), right.clone());
		let runs = Rc::clone(&runs);
		move || {
			runs.set(runs.get() + 1);
			if toggle.get() { left.get() } else { right.get() }
		}
	});
	assert_eq!(runs.get(), 1);

	toggle.set(false);
	assert_eq!(runs.get(), 2);

	// `left` was not read in the latest run
	left.set("left again");
	assert_eq!(runs.get(), 2);
	right.set("right again");
	assert_eq!(runs.get(), 3);

	with_runtime(|rt| {
		assert_eq!(rt.dependency_count(effect.id()), 2);
		assert_eq!(rt.subscriber_count(left.target_id(), &Key::value("value")), 0);
	});
}

#[rstest]
#[serial(reactive)]
fn test_untracked_reads_do_not_subscribe() {
	let tracked = Signal::new(0);
	let ignored = Signal::new(0);
	let runs = Rc::new(Cell::new(0));

	let _effect = Effect::new({
		let (tracked, ignored) = (tracked.clone(), ignored.clone());
		let runs = Rc::clone(&runs);
		move || {
			runs.set(runs.get() + 1);
			tracked.get();
			untrack(|| ignored.get());
		}
	});

	ignored.set(1);
	assert_eq!(runs.get(), 1);
	tracked.set(1);
	assert_eq!(runs.get(), 2);
}

#[rstest]
#[serial(reactive)]
fn test_effect_notified_once_per_write() {
	let map: ReactiveMap<&str, i32> = ReactiveMap::new();
	let runs = Rc::new(Cell::new(0));

	// Reads both the key and the key set; an ADD notifies both entries
	let _effect = Effect::new({
		let map = map.clone();
		let runs = Rc::clone(&runs);
		move || {
			runs.set(runs.get() + 1);
			map.contains_key(&"a");
			map.len();
		}
	});

	map.insert("a", 1);
	assert_eq!(runs.get(), 2);
}

#[rstest]
#[serial(reactive)]
fn test_effects_created_inside_effects() {
	let outer = Signal::new(0);
	let inner = Signal::new(0);
	let log = Rc::new(RefCell::new(Vec::new()));
	let children: Rc<RefCell<Vec<Effect>>> = Rc::new(RefCell::new(Vec::new()));

	let _parent = Effect::new({
		let (outer, inner) = (outer.clone(), inner.clone());
		let (log, children) = (Rc::clone(&log), Rc::clone(&children));
		move || {
			let generation = outer.get();
			// Replacing the child disposes the previous one
			children.borrow_mut().clear();
			let inner = inner.clone();
			let log = Rc::clone(&log);
			children
				.borrow_mut()
				.push(Effect::new(move || log.borrow_mut().push((generation, inner.get()))));
		}
	});

	inner.set(1);
	outer.set(1);
	inner.set(2);

	assert_eq!(*log.borrow(), vec![(0, 0), (0, 1), (1, 1), (1, 2)]);
}
