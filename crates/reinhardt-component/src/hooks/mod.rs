//! Lifecycle hooks
//!
//! Hooks are registered while a component instance is the *current
//! instance*: during its setup, or from inside one of its own hooks. Each
//! instance keeps an insertion-ordered list per phase in its
//! [`HookRegistry`].
//!
//! Hooks run untracked, with their instance as the current instance. A
//! panicking hook is reported as [`LifecycleError::HookPanicked`] and the
//! remaining hooks still run.

mod debug;
mod lifecycle;

pub use debug::{on_render_tracked, on_render_triggered};
pub use lifecycle::{
	on_before_mount, on_before_unmount, on_before_update, on_mounted, on_unmounted, on_updated,
};

use core::cell::RefCell;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use reinhardt_reactive::diagnostics::{Severity, panic_message, report};
use reinhardt_reactive::{DebugEvent, DebugHook, untrack};

use super::error::LifecycleError;
use super::instance::{InstanceCore, InstanceHandle};

/// Lifecycle transitions that fire hooks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecyclePhase {
	/// Before the first render is committed
	BeforeMount,
	/// After the instance and all its children are committed
	Mounted,
	/// Before a re-render
	BeforeUpdate,
	/// After a re-render and its children are committed
	Updated,
	/// Before teardown starts
	BeforeUnmount,
	/// After the instance and all its children were removed
	Unmounted,
}

impl LifecyclePhase {
	/// Name of the registration function for this phase
	pub fn hook_name(self) -> &'static str {
		match self {
			Self::BeforeMount => "on_before_mount",
			Self::Mounted => "on_mounted",
			Self::BeforeUpdate => "on_before_update",
			Self::Updated => "on_updated",
			Self::BeforeUnmount => "on_before_unmount",
			Self::Unmounted => "on_unmounted",
		}
	}
}

/// Render-effect instrumentation points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DebugPhase {
	/// The render effect subscribed to a new entry
	RenderTracked,
	/// A write notified the render effect
	RenderTriggered,
}

impl DebugPhase {
	/// Name of the registration function for this phase
	pub fn hook_name(self) -> &'static str {
		match self {
			Self::RenderTracked => "on_render_tracked",
			Self::RenderTriggered => "on_render_triggered",
		}
	}
}

type Hook = Rc<dyn Fn()>;

/// Per-instance hook lists
#[derive(Default)]
pub struct HookRegistry {
	lifecycle: RefCell<HashMap<LifecyclePhase, Vec<Hook>>>,
	debug: RefCell<HashMap<DebugPhase, Vec<DebugHook>>>,
}

impl HookRegistry {
	pub(crate) fn register(&self, phase: LifecyclePhase, hook: Hook) {
		self.lifecycle.borrow_mut().entry(phase).or_default().push(hook);
	}

	pub(crate) fn register_debug(&self, phase: DebugPhase, hook: DebugHook) {
		self.debug.borrow_mut().entry(phase).or_default().push(hook);
	}

	/// Number of hooks registered for `phase`
	pub fn len(&self, phase: LifecyclePhase) -> usize {
		self.lifecycle.borrow().get(&phase).map_or(0, Vec::len)
	}

	/// Number of debug hooks registered for `phase`
	pub fn debug_len(&self, phase: DebugPhase) -> usize {
		self.debug.borrow().get(&phase).map_or(0, Vec::len)
	}

	fn snapshot(&self, phase: LifecyclePhase) -> Vec<Hook> {
		self.lifecycle
			.borrow()
			.get(&phase)
			.cloned()
			.unwrap_or_default()
	}

	fn debug_snapshot(&self, phase: DebugPhase) -> Vec<DebugHook> {
		self.debug.borrow().get(&phase).cloned().unwrap_or_default()
	}
}

impl core::fmt::Debug for HookRegistry {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		let lifecycle = self.lifecycle.borrow();
		let counts: Vec<(LifecyclePhase, usize)> = lifecycle
			.iter()
			.map(|(phase, hooks)| (*phase, hooks.len()))
			.collect();
		f.debug_struct("HookRegistry")
			.field("lifecycle", &counts)
			.finish_non_exhaustive()
	}
}

// Current instance stack
//
// Setup functions and hooks push their instance; registration functions
// append to the top entry's registry.
thread_local! {
	static CURRENT_INSTANCE: RefCell<Vec<Rc<InstanceCore>>> = const { RefCell::new(Vec::new()) };
}

/// Makes an instance current until dropped.
pub(crate) struct InstanceScope(());

impl InstanceScope {
	pub(crate) fn enter(core: &Rc<InstanceCore>) -> Self {
		CURRENT_INSTANCE.with(|stack| stack.borrow_mut().push(Rc::clone(core)));
		Self(())
	}
}

impl Drop for InstanceScope {
	fn drop(&mut self) {
		let _ = CURRENT_INSTANCE.try_with(|stack| stack.borrow_mut().pop());
	}
}

/// The instance whose setup or hook is running, if any
pub fn current_instance() -> Option<InstanceHandle> {
	CURRENT_INSTANCE
		.with(|stack| stack.borrow().last().cloned())
		.map(InstanceHandle::new)
}

fn with_current_registry(hook_name: &'static str, register: impl FnOnce(&HookRegistry)) {
	let current = CURRENT_INSTANCE.with(|stack| stack.borrow().last().cloned());
	match current {
		Some(core) => register(&core.hooks),
		None => report(Severity::Warning, LifecycleError::HookOutsideSetup { hook: hook_name }),
	}
}

pub(crate) fn register_lifecycle(phase: LifecyclePhase, hook: Hook) {
	with_current_registry(phase.hook_name(), |registry| registry.register(phase, hook));
}

pub(crate) fn register_debug(phase: DebugPhase, hook: DebugHook) {
	with_current_registry(phase.hook_name(), |registry| {
		registry.register_debug(phase, hook)
	});
}

fn isolate(core: &InstanceCore, hook_name: &'static str, call: impl FnOnce()) {
	let outcome = untrack(|| panic::catch_unwind(AssertUnwindSafe(call)));
	if let Err(payload) = outcome {
		report(
			Severity::Error,
			LifecycleError::HookPanicked {
				component: core.name.to_string(),
				hook: hook_name,
				message: panic_message(&*payload),
			},
		);
	}
}

/// Run the hooks registered for `phase` on `core`'s instance.
///
/// Hooks registered while these run take effect at the next transition.
pub(crate) fn invoke(core: &Rc<InstanceCore>, phase: LifecyclePhase) {
	let hooks = core.hooks.snapshot(phase);
	if hooks.is_empty() {
		return;
	}
	tracing::trace!(
		component = %core.name,
		instance = %core.id,
		hook = phase.hook_name(),
		count = hooks.len(),
		"invoking lifecycle hooks"
	);

	let _scope = InstanceScope::enter(core);
	for hook in hooks {
		isolate(core, phase.hook_name(), || hook());
	}
}

pub(crate) fn invoke_debug(core: &Rc<InstanceCore>, phase: DebugPhase, event: &DebugEvent) {
	let hooks = core.hooks.debug_snapshot(phase);
	if hooks.is_empty() {
		return;
	}

	let _scope = InstanceScope::enter(core);
	for hook in hooks {
		isolate(core, phase.hook_name(), || hook(event));
	}
}
