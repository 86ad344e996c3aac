//! Effect - Reactive Side Effects
//!
//! `Effect` represents a computation that re-runs when the reactive state it
//! read changes. Dependencies are tracked automatically: any reactive read
//! performed inside the effect body becomes a subscription.
//!
//! ## Key Features
//!
//! - **Automatic Dependency Tracking**: every `get`/`contains`/iteration inside the body is tracked
//! - **Fresh Subscriptions**: all prior subscriptions are dropped before each run
//! - **Pluggable Re-execution**: with a scheduler the trigger calls it, otherwise the effect
//!   re-runs synchronously
//! - **Memory Safe**: Automatically removes itself from the dependency graph when dropped
//!
//! ## Example
//!
//! ```ignore
//! use reinhardt_reactive::{Effect, Signal};
//!
//! let count = Signal::new(0);
//!
//! let _effect = Effect::new({
//!     let count = count.clone();
//!     move || println!("Count is: {}", count.get())
//! });
//!
//! count.set(42); // Prints: "Count is: 42"
//! ```

use core::cell::{Cell, RefCell};
use core::fmt;
use std::collections::HashSet;
use std::rc::Rc;

use super::debug::{DebugEvent, DebugHook};
use super::error::{ReactiveError, ReactiveResult};
use super::runtime::{Dependency, EffectId, Runtime, try_with_runtime, with_runtime};
use super::scheduler::{Job, queue_job};

type EffectBody = Rc<RefCell<Box<dyn FnMut()>>>;

/// Runtime-side state of one effect
pub(crate) struct EffectNode {
	pub(crate) body: EffectBody,
	pub(crate) deps: HashSet<Dependency>,
	pub(crate) scheduler: Option<Rc<dyn Fn()>>,
	pub(crate) on_track: Option<DebugHook>,
	pub(crate) on_trigger: Option<DebugHook>,
	pub(crate) dirty: bool,
}

/// Construction options for an [`Effect`]
#[derive(Default, Clone)]
pub struct EffectOptions {
	scheduler: Option<Rc<dyn Fn()>>,
	lazy: bool,
	on_track: Option<DebugHook>,
	on_trigger: Option<DebugHook>,
}

impl EffectOptions {
	/// Create options for a synchronous, eagerly run effect
	pub fn new() -> Self {
		Self::default()
	}

	/// Call `scheduler` instead of re-running the effect when it is triggered
	pub fn scheduler<F>(mut self, scheduler: F) -> Self
	where
		F: Fn() + 'static,
	{
		self.scheduler = Some(Rc::new(scheduler));
		self
	}

	/// Skip the initial run
	pub fn lazy(mut self, lazy: bool) -> Self {
		self.lazy = lazy;
		self
	}

	/// Observe reads newly subscribed during a run
	pub fn on_track<F>(mut self, hook: F) -> Self
	where
		F: Fn(&DebugEvent) + 'static,
	{
		self.on_track = Some(Rc::new(hook));
		self
	}

	/// Observe writes that notify this effect
	pub fn on_trigger<F>(mut self, hook: F) -> Self
	where
		F: Fn(&DebugEvent) + 'static,
	{
		self.on_trigger = Some(Rc::new(hook));
		self
	}
}

impl fmt::Debug for EffectOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EffectOptions")
			.field("scheduler", &self.scheduler.is_some())
			.field("lazy", &self.lazy)
			.field("on_track", &self.on_track.is_some())
			.field("on_trigger", &self.on_trigger.is_some())
			.finish()
	}
}

/// A reactive effect that re-runs when its dependencies change
///
/// The body may return a value; [`Effect::run`] hands it back to the caller.
/// Dropping the effect disposes it.
///
/// ## Example
///
/// ```ignore
/// use reinhardt_reactive::{Effect, Signal};
///
/// let count = Signal::new(1);
/// let doubled = Effect::with_options(
///     { let count = count.clone(); move || count.get() * 2 },
///     EffectOptions::new().lazy(true),
/// );
///
/// assert_eq!(doubled.run().unwrap(), 2);
/// ```
pub struct Effect<T: 'static = ()> {
	id: EffectId,
	output: Rc<RefCell<Option<T>>>,
	job: Option<Job>,
	disposed: Cell<bool>,
}

impl<T: 'static> Effect<T> {
	/// Create an effect that runs immediately and re-runs synchronously on every trigger
	pub fn new<F>(f: F) -> Self
	where
		F: FnMut() -> T + 'static,
	{
		Self::with_options(f, EffectOptions::new())
	}

	/// Create an effect with explicit options
	pub fn with_options<F>(f: F, options: EffectOptions) -> Self
	where
		F: FnMut() -> T + 'static,
	{
		Self::build(EffectId::new(), f, options, None)
	}

	/// Create an effect whose re-runs are batched through the job queue
	///
	/// Any number of triggers between two flushes re-run the effect once.
	///
	/// # Example
	///
	/// ```ignore
	/// let count = Signal::new(0);
	/// let _effect = Effect::queued("log-count", {
	///     let count = count.clone();
	///     move || println!("{}", count.get())
	/// });
	///
	/// count.set(1);
	/// count.set(2);
	/// tick(); // Prints "2" once
	/// ```
	pub fn queued<F>(label: &str, f: F) -> Self
	where
		F: FnMut() -> T + 'static,
	{
		let id = EffectId::new();
		let job = Job::new(label, move || {
			if let Err(err) = with_runtime(|rt| rt.run_effect(id)) {
				tracing::trace!(effect = %id, error = %err, "queued re-run skipped");
			}
		});
		let options = EffectOptions::new().scheduler({
			let job = job.clone();
			move || queue_job(&job)
		});
		Self::build(id, f, options, Some(job))
	}

	fn build<F>(id: EffectId, mut f: F, options: EffectOptions, job: Option<Job>) -> Self
	where
		F: FnMut() -> T + 'static,
	{
		let output = Rc::new(RefCell::new(None));
		let slot = Rc::clone(&output);
		let body: Box<dyn FnMut()> = Box::new(move || {
			let value = f();
			*slot.borrow_mut() = Some(value);
		});

		let EffectOptions {
			scheduler,
			lazy,
			on_track,
			on_trigger,
		} = options;
		with_runtime(|rt| {
			rt.effects.borrow_mut().insert(
				id,
				EffectNode {
					body: Rc::new(RefCell::new(body)),
					deps: HashSet::new(),
					scheduler,
					on_track,
					on_trigger,
					dirty: true,
				},
			);
		});
		tracing::trace!(effect = %id, lazy, "effect created");

		let effect = Self {
			id,
			output,
			job,
			disposed: Cell::new(false),
		};
		if !lazy {
			if let Err(err) = with_runtime(|rt| rt.run_effect(id)) {
				tracing::trace!(effect = %id, error = %err, "initial run skipped");
			}
		}
		effect
	}

	/// Run the body now, re-collecting dependencies, and return its result
	///
	/// Panics in the body propagate to the caller; the runtime state is
	/// restored first.
	pub fn run(&self) -> ReactiveResult<T> {
		if self.disposed.get() {
			return Err(ReactiveError::EffectDisposed(self.id));
		}
		with_runtime(|rt| rt.run_effect(self.id))?;
		self.output
			.borrow_mut()
			.take()
			.ok_or(ReactiveError::EffectDisposed(self.id))
	}

	/// Get the effect's ID
	pub fn id(&self) -> EffectId {
		self.id
	}

	/// The job carrying batched re-runs, for effects built with [`Effect::queued`]
	pub fn job(&self) -> Option<&Job> {
		self.job.as_ref()
	}

	/// Whether the effect can still run
	pub fn is_active(&self) -> bool {
		!self.disposed.get()
	}

	/// Whether a dependency changed since the last run
	pub fn is_dirty(&self) -> bool {
		with_runtime(|rt| {
			rt.effects
				.borrow()
				.get(&self.id)
				.is_some_and(|node| node.dirty)
		})
	}

	/// Dispose the effect
	///
	/// Sweeps every subscription and makes the effect permanently inert. A
	/// pending batched re-run becomes a no-op.
	pub fn dispose(&self) {
		if self.disposed.replace(true) {
			return;
		}
		if let Some(job) = &self.job {
			job.dispose();
		}
		try_with_runtime(|rt| rt.remove_effect(self.id));
		tracing::trace!(effect = %self.id, "effect disposed");
	}
}

impl<T: 'static> Drop for Effect<T> {
	fn drop(&mut self) {
		self.dispose();
	}
}

impl<T: 'static> fmt::Debug for Effect<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Effect")
			.field("id", &self.id)
			.field("active", &self.is_active())
			.finish()
	}
}

impl Runtime {
	/// Execute an effect by its ID
	///
	/// Clears the previous subscriptions, then runs the body with the effect
	/// as the current observer. The observer slot is popped even when the
	/// body panics.
	pub(crate) fn run_effect(&self, effect_id: EffectId) -> ReactiveResult<()> {
		let body = self
			.effects
			.borrow()
			.get(&effect_id)
			.map(|node| Rc::clone(&node.body))
			.ok_or(ReactiveError::EffectDisposed(effect_id))?;
		let mut body = body
			.try_borrow_mut()
			.map_err(|_| ReactiveError::RecursiveEffect(effect_id))?;

		self.clear_dependencies(effect_id);
		if let Some(node) = self.effects.borrow_mut().get_mut(&effect_id) {
			node.dirty = false;
		}

		let _observer = self.enter_observer(Some(effect_id));
		(*body)();
		Ok(())
	}
}
