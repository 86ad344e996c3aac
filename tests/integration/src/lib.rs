//! Integration test utilities for Reinhardt Reactivity
//!
//! This crate provides a small component tree shared by the cross-crate
//! scenarios: three nested components `A > B > C`, every one reading the
//! same signal, with `C` also reading a signal of its own.

use reinhardt_reactivity::component::testing::{HookLog, RecordingRenderer};
use reinhardt_reactivity::component::{Component, ComponentInstance, LifecycleResult, View, render};
use reinhardt_reactivity::reactive::Signal;
use std::rc::Rc;

/// A mounted `A > B > C` tree and the state it reads
pub struct NestedTree {
	/// Root instance (`A`)
	pub root: ComponentInstance<RecordingRenderer>,
	/// Renderer every instance commits through
	pub renderer: Rc<RecordingRenderer>,
	/// Lifecycle log of all three components
	pub log: HookLog,
	/// Read by `A`, `B` and `C`
	pub shared: Signal<u32>,
	/// Read by `C` only
	pub leaf: Signal<u32>,
}

impl NestedTree {
	/// Mount the tree with a fresh renderer and log
	pub fn mount() -> LifecycleResult<Self> {
		let log = HookLog::new();
		let shared = Signal::new(0);
		let leaf = Signal::new(0);

		let c = node("C", &log, vec![shared.clone(), leaf.clone()], None);
		let b = node("B", &log, vec![shared.clone()], Some(c));
		let a = node("A", &log, vec![shared.clone()], Some(b));

		let renderer = Rc::new(RecordingRenderer::new());
		let root = render(&a, Rc::clone(&renderer))?;
		Ok(Self {
			root,
			renderer,
			log,
			shared,
			leaf,
		})
	}

	/// The `B` and `C` instances, while mounted
	pub fn descendants(&self) -> Option<(ComponentInstance<RecordingRenderer>, ComponentInstance<RecordingRenderer>)> {
		let b = self.root.child("child")?;
		let c = b.child("child")?;
		Some((b, c))
	}
}

/// A component that logs its lifecycle and renders `{name}:{sum of reads}`
pub fn node(
	name: &str,
	log: &HookLog,
	reads: Vec<Signal<u32>>,
	child: Option<Component<String>>,
) -> Component<String> {
	let log = log.clone();
	let label = name.to_owned();
	Component::new(name, move || {
		log.log_lifecycle(&label);
		let (label, reads, child) = (label.clone(), reads.clone(), child.clone());
		move || {
			let total: u32 = reads.iter().map(Signal::get).sum();
			let view = View::new(format!("{label}:{total}"));
			match &child {
				Some(child) => view.with_child("child", child),
				None => view,
			}
		}
	})
}

