//! Reactive Runtime
//!
//! This module provides the core reactive runtime: the observer stack, the
//! dependency graph between reactive targets and effects, and the per-thread
//! state the job queue and diagnostics hang off.
//!
//! ## Architecture
//!
//! 1. **Observer Stack**: Tracks the currently running effect. Untracked
//!    scopes push an empty slot so reads inside them record nothing.
//! 2. **Dependency Graph**: `TargetId -> Key -> [EffectId]`, plus the reverse
//!    edges stored on each effect node so disposal is an O(dependencies) sweep.
//! 3. **Triggering**: A write looks up the affected entries and either hands
//!    each subscriber to its scheduler or runs it synchronously.
//!
//! ## Example
//!
//! ```ignore
//! use reinhardt_reactive::{Effect, Signal};
//!
//! let count = Signal::new(0);
//!
//! // No scheduler: the effect re-runs synchronously on every change
//! let _effect = Effect::new({
//!     let count = count.clone();
//!     move || println!("Count is: {}", count.get())
//! });
//!
//! count.set(42);
//! ```

use core::cell::RefCell;
use core::fmt;
use core::sync::atomic::{AtomicUsize, Ordering};
use std::collections::{BTreeMap, HashMap};

use super::config::RuntimeConfig;
use super::debug::{DebugEvent, DebugValue, TrackOp, TriggerOp};
use super::diagnostics::DiagnosticHandler;
use super::effect::EffectNode;
use super::key::Key;
use super::scheduler::JobQueue;

/// Unique identifier for an effect
///
/// Identifiers grow monotonically, so ordering by id is ordering by creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EffectId(usize);

impl EffectId {
	/// Create a new unique EffectId
	pub fn new() -> Self {
		static COUNTER: AtomicUsize = AtomicUsize::new(0);
		Self(COUNTER.fetch_add(1, Ordering::Relaxed))
	}
}

impl Default for EffectId {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Display for EffectId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "effect#{}", self.0)
	}
}

/// Unique identifier for a reactive target (one container or signal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetId(usize);

impl TargetId {
	/// Create a new unique TargetId
	pub fn new() -> Self {
		static COUNTER: AtomicUsize = AtomicUsize::new(0);
		Self(COUNTER.fetch_add(1, Ordering::Relaxed))
	}
}

impl Default for TargetId {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Display for TargetId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "target#{}", self.0)
	}
}

/// One edge of the dependency graph, as seen from the effect side.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct Dependency {
	pub(crate) target: TargetId,
	pub(crate) key: Key,
}

type DependencyGraph = HashMap<TargetId, HashMap<Key, Vec<EffectId>>>;

/// Per-thread reactive runtime
///
/// This struct manages the reactive dependency graph, the effect table and
/// the job queue. It uses thread-local storage to maintain separate runtime
/// state per thread.
pub struct Runtime {
	/// Observer stack; `None` marks an untracked scope
	observer_stack: RefCell<Vec<Option<EffectId>>>,
	/// Dependency graph: target -> key -> subscribers
	pub(crate) dependency_graph: RefCell<DependencyGraph>,
	/// Effect table: bodies, dependency sets and options
	pub(crate) effects: RefCell<BTreeMap<EffectId, EffectNode>>,
	/// Pending jobs and flush bookkeeping
	pub(crate) jobs: JobQueue,
	pub(crate) config: RefCell<RuntimeConfig>,
	pub(crate) diagnostic_handler: RefCell<Option<DiagnosticHandler>>,
}

impl Runtime {
	/// Create a new Runtime instance
	pub fn new() -> Self {
		Self {
			observer_stack: RefCell::new(Vec::new()),
			dependency_graph: RefCell::new(HashMap::new()),
			effects: RefCell::new(BTreeMap::new()),
			jobs: JobQueue::default(),
			config: RefCell::new(RuntimeConfig::default()),
			diagnostic_handler: RefCell::new(None),
		}
	}

	/// Get the current observer (the currently running effect), if tracking is active
	pub fn current_observer(&self) -> Option<EffectId> {
		self.observer_stack.borrow().last().copied().flatten()
	}

	/// Push an observer slot; it is popped when the returned guard drops.
	///
	/// The guard restores the stack even when the scoped code panics.
	pub fn enter_observer(&self, observer: Option<EffectId>) -> ObserverGuard<'_> {
		self.observer_stack.borrow_mut().push(observer);
		ObserverGuard { runtime: self }
	}

	/// Depth of the observer stack (for testing)
	pub fn observer_depth(&self) -> usize {
		self.observer_stack.borrow().len()
	}

	/// Record that the current observer read `key` of `target`
	///
	/// Called by every reactive container on reads. Does nothing outside an
	/// effect or inside an untracked scope. The effect's `on_track` hook sees
	/// the read before the subscription is recorded, once per key per run.
	pub fn track(&self, target: TargetId, op: TrackOp, key: Key) {
		let Some(effect_id) = self.current_observer() else {
			return;
		};
		let dependency = Dependency { target, key };

		let on_track = {
			let effects = self.effects.borrow();
			let Some(node) = effects.get(&effect_id) else {
				return;
			};
			if node.deps.contains(&dependency) {
				return;
			}
			node.on_track.clone()
		};

		tracing::trace!(effect = %effect_id, target_id = %target, ?op, key = ?dependency.key, "track");
		if let Some(hook) = on_track {
			hook(&DebugEvent::track(effect_id, target, op, dependency.key.clone()));
		}

		let inserted = self
			.effects
			.borrow_mut()
			.get_mut(&effect_id)
			.is_some_and(|node| node.deps.insert(dependency.clone()));
		if inserted {
			self.dependency_graph
				.borrow_mut()
				.entry(target)
				.or_default()
				.entry(dependency.key)
				.or_default()
				.push(effect_id);
		}
	}

	/// Notify the subscribers of a write to `key` of `target`
	///
	/// ADD and DELETE also notify the structural [`Key::Iterate`] entry. Each
	/// effect is notified once, in creation order; the running effect never
	/// re-triggers itself. `values` builds the old/new debug payload. It is
	/// evaluated once, before any subscriber runs, and only when a subscriber
	/// carries an `on_trigger` hook.
	pub fn trigger<F>(&self, target: TargetId, op: TriggerOp, key: Key, values: F)
	where
		F: FnOnce() -> (Option<DebugValue>, Option<DebugValue>),
	{
		let mut affected: Vec<EffectId> = Vec::new();
		{
			let graph = self.dependency_graph.borrow();
			let Some(entries) = graph.get(&target) else {
				return;
			};
			let mut collect = |key: &Key| {
				for id in entries.get(key).into_iter().flatten() {
					if !affected.contains(id) {
						affected.push(*id);
					}
				}
			};
			collect(&key);
			if op.changes_key_set() {
				collect(&Key::Iterate);
			}
		}
		if affected.is_empty() {
			return;
		}
		affected.sort_unstable();
		tracing::trace!(target_id = %target, ?op, ?key, subscribers = affected.len(), "trigger");

		let current = self.current_observer();
		// Synchronous subscribers may write the same key again
		let hooked = {
			let effects = self.effects.borrow();
			affected
				.iter()
				.any(|id| effects.get(id).is_some_and(|node| node.on_trigger.is_some()))
		};
		let payload = hooked.then(values);
		let mut stale = Vec::new();

		for effect_id in affected {
			if Some(effect_id) == current {
				continue;
			}
			let (on_trigger, scheduler) = {
				let mut effects = self.effects.borrow_mut();
				match effects.get_mut(&effect_id) {
					Some(node) => {
						node.dirty = true;
						(node.on_trigger.clone(), node.scheduler.clone())
					}
					None => {
						stale.push(effect_id);
						continue;
					}
				}
			};

			if let Some(hook) = on_trigger {
				let (old_value, new_value) = payload.clone().unwrap_or_default();
				hook(&DebugEvent {
					effect: effect_id,
					target,
					kind: op.into(),
					key: key.clone(),
					old_value,
					new_value,
				});
			}

			match scheduler {
				Some(schedule) => schedule(),
				None => {
					if let Err(err) = self.run_effect(effect_id) {
						tracing::trace!(effect = %effect_id, error = %err, "synchronous re-run skipped");
					}
				}
			}
		}

		if !stale.is_empty() {
			self.prune(target, &stale);
		}
	}

	/// Clear dependencies for an effect
	///
	/// This is called before every run so that only the entries read during
	/// that run stay subscribed.
	pub fn clear_dependencies(&self, effect_id: EffectId) {
		let deps = self
			.effects
			.borrow_mut()
			.get_mut(&effect_id)
			.map(|node| core::mem::take(&mut node.deps));
		let Some(deps) = deps else {
			return;
		};

		let mut graph = self.dependency_graph.borrow_mut();
		for dependency in deps {
			let Some(entries) = graph.get_mut(&dependency.target) else {
				continue;
			};
			if let Some(subscribers) = entries.get_mut(&dependency.key) {
				subscribers.retain(|id| *id != effect_id);
				if subscribers.is_empty() {
					entries.remove(&dependency.key);
				}
			}
			if entries.is_empty() {
				graph.remove(&dependency.target);
			}
		}
	}

	/// Remove an effect from the runtime
	///
	/// Sweeps its subscriptions and drops its body. The body is dropped after
	/// every borrow is released, since it may own other effects.
	pub fn remove_effect(&self, effect_id: EffectId) {
		self.clear_dependencies(effect_id);
		let node = self.effects.borrow_mut().remove(&effect_id);
		drop(node);
	}

	/// Forget every dependency entry of a target
	///
	/// Called when the last handle of a reactive container is dropped.
	pub fn remove_target(&self, target: TargetId) {
		let entries = self.dependency_graph.borrow_mut().remove(&target);
		drop(entries);
	}

	fn prune(&self, target: TargetId, stale: &[EffectId]) {
		let mut graph = self.dependency_graph.borrow_mut();
		if let Some(entries) = graph.get_mut(&target) {
			entries.retain(|_, subscribers| {
				subscribers.retain(|id| !stale.contains(id));
				!subscribers.is_empty()
			});
			if entries.is_empty() {
				graph.remove(&target);
			}
		}
	}

	/// Check if an effect is registered (for testing)
	pub fn has_effect(&self, effect_id: EffectId) -> bool {
		self.effects.borrow().contains_key(&effect_id)
	}

	/// Get the number of subscribers of one entry (for testing)
	pub fn subscriber_count(&self, target: TargetId, key: &Key) -> usize {
		self.dependency_graph
			.borrow()
			.get(&target)
			.and_then(|entries| entries.get(key))
			.map_or(0, Vec::len)
	}

	/// Get the number of entries an effect is subscribed to (for testing)
	pub fn dependency_count(&self, effect_id: EffectId) -> usize {
		self.effects
			.borrow()
			.get(&effect_id)
			.map_or(0, |node| node.deps.len())
	}

	/// Check if a target still has dependency entries (for testing)
	pub fn has_target(&self, target: TargetId) -> bool {
		self.dependency_graph.borrow().contains_key(&target)
	}
}

impl Default for Runtime {
	fn default() -> Self {
		Self::new()
	}
}

/// Pops the observer slot pushed by [`Runtime::enter_observer`].
pub struct ObserverGuard<'rt> {
	runtime: &'rt Runtime,
}

impl Drop for ObserverGuard<'_> {
	fn drop(&mut self) {
		self.runtime.observer_stack.borrow_mut().pop();
	}
}

// Thread-local runtime instance
//
// In WASM, there is only one thread, so this effectively provides a global runtime.
// On non-WASM platforms, each thread gets its own runtime instance.
thread_local! {
	static RUNTIME: Runtime = Runtime::new();
}

/// Get a reference to the thread's runtime
///
/// # Example
///
/// ```ignore
/// use reinhardt_reactive::runtime::with_runtime;
///
/// let depth = with_runtime(|rt| rt.observer_depth());
/// ```
pub fn with_runtime<F, R>(f: F) -> R
where
	F: FnOnce(&Runtime) -> R,
{
	RUNTIME.with(f)
}

/// Try to access the thread's runtime (safe version for Drop implementations)
///
/// Returns None if the thread-local storage has been destroyed.
pub fn try_with_runtime<F, R>(f: F) -> Option<R>
where
	F: FnOnce(&Runtime) -> R,
{
	RUNTIME.try_with(f).ok()
}

/// Run `f` without recording any dependency for the current effect.
pub fn untrack<F, R>(f: F) -> R
where
	F: FnOnce() -> R,
{
	with_runtime(|rt| {
		let _scope = rt.enter_observer(None);
		f()
	})
}
