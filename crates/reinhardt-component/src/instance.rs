//! Component instances and their lifecycle state machine
//!
//! ```text
//! Created -> SetupRunning -> Mounted <-> Updating
//!                               |           |
//!                               +-----------+--> Unmounting -> Unmounted
//! ```
//!
//! An instance owns its render effect, its update job and its keyed
//! children. Parents are referenced weakly, for lookup only.

use core::cell::{Cell, RefCell};
use core::fmt;
use core::sync::atomic::{AtomicUsize, Ordering};
use std::rc::{Rc, Weak};

use reinhardt_reactive::diagnostics::{Severity, report};
use reinhardt_reactive::{Effect, EffectOptions, Job, invalidate_job, queue_job, untrack};

use super::component::{Child, Component, View};
use super::error::{LifecycleError, LifecycleResult};
use super::hooks::{
	DebugPhase, HookRegistry, InstanceScope, LifecyclePhase, invoke, invoke_debug,
};
use super::renderer::Renderer;

/// Unique identifier for a component instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(usize);

impl InstanceId {
	fn new() -> Self {
		static COUNTER: AtomicUsize = AtomicUsize::new(0);
		Self(COUNTER.fetch_add(1, Ordering::Relaxed))
	}
}

impl fmt::Display for InstanceId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "instance#{}", self.0)
	}
}

/// Where an instance is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
	/// Constructed, setup not yet run
	Created,
	/// Setup or the first render is in progress
	SetupRunning,
	/// Committed and idle
	Mounted,
	/// A re-render is in progress
	Updating,
	/// Teardown is in progress
	Unmounting,
	/// Removed; the instance never runs again
	Unmounted,
}

impl LifecycleState {
	/// Whether the instance is committed (idle or re-rendering)
	pub fn is_mounted(self) -> bool {
		matches!(self, Self::Mounted | Self::Updating)
	}
}

/// The renderer-independent part of an instance
pub(crate) struct InstanceCore {
	pub(crate) id: InstanceId,
	pub(crate) name: Rc<str>,
	pub(crate) hooks: HookRegistry,
	pub(crate) state: Cell<LifecycleState>,
}

/// A renderer-independent view of an instance, as returned by
/// [`current_instance`](crate::current_instance)
#[derive(Clone)]
pub struct InstanceHandle(Rc<InstanceCore>);

impl InstanceHandle {
	pub(crate) fn new(core: Rc<InstanceCore>) -> Self {
		Self(core)
	}

	/// Get the instance's ID
	pub fn id(&self) -> InstanceId {
		self.0.id
	}

	/// Name of the instance's component
	pub fn name(&self) -> &str {
		&self.0.name
	}

	/// Current lifecycle state
	pub fn state(&self) -> LifecycleState {
		self.0.state.get()
	}

	/// The instance's hooks
	pub fn hooks(&self) -> &HookRegistry {
		&self.0.hooks
	}
}

impl fmt::Debug for InstanceHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("InstanceHandle")
			.field("id", &self.0.id)
			.field("name", &self.0.name)
			.field("state", &self.0.state.get())
			.finish()
	}
}

struct ChildEntry<R: Renderer> {
	key: Rc<str>,
	instance: ComponentInstance<R>,
}

struct Inner<R: Renderer> {
	core: Rc<InstanceCore>,
	component: Component<R::Output>,
	renderer: Rc<R>,
	parent: Weak<Inner<R>>,
	children: RefCell<Vec<ChildEntry<R>>>,
	render_effect: RefCell<Option<Rc<Effect<View<R::Output>>>>>,
	job: Job,
}

/// One live use of a [`Component`] in the tree
///
/// Clones are handles to the same instance.
pub struct ComponentInstance<R: Renderer>(Rc<Inner<R>>);

impl<R: Renderer> ComponentInstance<R> {
	pub(crate) fn new(component: Component<R::Output>, renderer: Rc<R>, parent: Option<&Self>) -> Self {
		let core = Rc::new(InstanceCore {
			id: InstanceId::new(),
			name: Rc::from(component.name()),
			hooks: HookRegistry::default(),
			state: Cell::new(LifecycleState::Created),
		});
		let label = format!("update:{}", core.name);
		let parent = parent.map_or_else(Weak::new, |parent| Rc::downgrade(&parent.0));

		let inner = Rc::new_cyclic(|this: &Weak<Inner<R>>| {
			let this = Weak::clone(this);
			let job = Job::new(&label, move || {
				let Some(inner) = this.upgrade() else {
					return;
				};
				let instance = ComponentInstance(inner);
				// The ancestor's reconcile updates this instance in tree order
				if instance.has_pending_ancestor() {
					tracing::trace!(
						component = %instance.0.core.name,
						instance = %instance.0.core.id,
						"deferring update until ancestor re-renders"
					);
					queue_job(&instance.0.job);
					return;
				}
				match instance.update() {
					Ok(()) | Err(LifecycleError::NotMounted(_)) => {}
					Err(err) => report(Severity::Error, err),
				}
			});
			Inner {
				core,
				component,
				renderer,
				parent,
				children: RefCell::new(Vec::new()),
				render_effect: RefCell::new(None),
				job,
			}
		});
		Self(inner)
	}

	/// Run setup, render once, commit, then mount the declared children
	///
	/// Fires `before-mount` before anything is committed and `mounted` after
	/// every child is mounted. Panics in setup or render propagate.
	pub fn mount(&self) -> LifecycleResult<()> {
		let core = &self.0.core;
		if core.state.get() != LifecycleState::Created {
			return Err(LifecycleError::AlreadyMounted(core.id));
		}
		tracing::debug!(component = %core.name, instance = %core.id, "mounting component");

		core.state.set(LifecycleState::SetupRunning);
		let render = {
			let _scope = InstanceScope::enter(core);
			untrack(|| self.0.component.setup())
		};
		let effect = Rc::new(Effect::with_options(render, self.render_options()));
		*self.0.render_effect.borrow_mut() = Some(Rc::clone(&effect));

		invoke(core, LifecyclePhase::BeforeMount);
		let View { content, children } = effect.run()?;
		self.0.renderer.insert(core.id, self.parent_id(), &content);
		for child in children {
			self.mount_child(child)?;
		}

		core.state.set(LifecycleState::Mounted);
		invoke(core, LifecyclePhase::Mounted);
		Ok(())
	}

	fn render_options(&self) -> EffectOptions {
		let job = self.0.job.clone();
		let tracked = Rc::downgrade(&self.0.core);
		let triggered = Weak::clone(&tracked);
		EffectOptions::new()
			.lazy(true)
			.scheduler(move || queue_job(&job))
			.on_track(move |event| {
				if let Some(core) = tracked.upgrade() {
					invoke_debug(&core, DebugPhase::RenderTracked, event);
				}
			})
			.on_trigger(move |event| {
				if let Some(core) = triggered.upgrade() {
					invoke_debug(&core, DebugPhase::RenderTriggered, event);
				}
			})
	}

	fn mount_child(&self, child: Child<R::Output>) -> LifecycleResult<()> {
		let Child { key, component } = child;
		let instance = Self::new(component, Rc::clone(&self.0.renderer), Some(self));
		self.0.children.borrow_mut().push(ChildEntry {
			key,
			instance: instance.clone(),
		});
		instance.mount()
	}

	/// Re-render now and commit the result
	///
	/// Normally driven by the instance's update job. Kept children whose own
	/// update is pending are updated in place, so the whole subtree settles
	/// in one pass.
	pub fn update(&self) -> LifecycleResult<()> {
		let core = &self.0.core;
		if !core.state.get().is_mounted() {
			return Err(LifecycleError::NotMounted(core.id));
		}
		let effect = self
			.0
			.render_effect
			.borrow()
			.clone()
			.ok_or(LifecycleError::NotMounted(core.id))?;
		tracing::debug!(component = %core.name, instance = %core.id, "updating component");

		core.state.set(LifecycleState::Updating);
		invoke(core, LifecyclePhase::BeforeUpdate);
		if core.state.get() != LifecycleState::Updating {
			return Err(LifecycleError::NotMounted(core.id));
		}

		// Writes from before-update hooks are part of this render
		invalidate_job(&self.0.job);
		let View { content, children } = effect.run()?;
		self.0.renderer.patch(core.id, &content);
		self.reconcile(children)?;

		core.state.set(LifecycleState::Mounted);
		invoke(core, LifecyclePhase::Updated);
		Ok(())
	}

	fn reconcile(&self, children: Vec<Child<R::Output>>) -> LifecycleResult<()> {
		let mut previous: Vec<Option<ChildEntry<R>>> = self
			.0
			.children
			.take()
			.into_iter()
			.map(Some)
			.collect();

		let plan: Vec<(Child<R::Output>, Option<ChildEntry<R>>)> = children
			.into_iter()
			.map(|child| {
				let kept = previous
					.iter_mut()
					.find(|slot| {
						slot.as_ref().is_some_and(|entry| {
							entry.key == child.key && entry.instance.0.component.is_same(&child.component)
						})
					})
					.and_then(Option::take);
				(child, kept)
			})
			.collect();

		for entry in previous.into_iter().flatten() {
			entry.instance.unmount_if_mounted();
		}

		for (child, kept) in plan {
			match kept {
				Some(entry) => {
					let instance = entry.instance.clone();
					self.0.children.borrow_mut().push(entry);
					if instance.0.job.is_queued() {
						instance.update()?;
					}
				}
				None => self.mount_child(child)?,
			}
		}
		Ok(())
	}

	/// Tear the instance and its subtree down
	///
	/// Fires `before-unmount` parent first, disposes the render effect and
	/// the update job, unmounts the children, removes the committed output,
	/// then fires `unmounted` children first.
	pub fn unmount(&self) -> LifecycleResult<()> {
		let core = &self.0.core;
		if !core.state.get().is_mounted() {
			return Err(LifecycleError::NotMounted(core.id));
		}
		tracing::debug!(component = %core.name, instance = %core.id, "unmounting component");

		core.state.set(LifecycleState::Unmounting);
		invoke(core, LifecyclePhase::BeforeUnmount);

		let effect = self.0.render_effect.borrow_mut().take();
		if let Some(effect) = effect {
			effect.dispose();
		}
		self.0.job.dispose();

		let children = self.0.children.take();
		for entry in children {
			entry.instance.unmount_if_mounted();
		}

		self.0.renderer.remove(core.id);
		core.state.set(LifecycleState::Unmounted);
		invoke(core, LifecyclePhase::Unmounted);
		self.detach_from_parent();
		Ok(())
	}

	fn unmount_if_mounted(&self) {
		if let Err(err) = self.unmount() {
			tracing::trace!(error = %err, "child already torn down");
		}
	}

	fn detach_from_parent(&self) {
		let Some(parent) = self.0.parent.upgrade() else {
			return;
		};
		let id = self.0.core.id;
		let detached: Vec<ChildEntry<R>> = {
			let mut children = parent.children.borrow_mut();
			let (detached, kept): (Vec<_>, Vec<_>) = core::mem::take(&mut *children)
				.into_iter()
				.partition(|entry| entry.instance.id() == id);
			*children = kept;
			detached
		};
		drop(detached);
	}

	fn has_pending_ancestor(&self) -> bool {
		let mut ancestor = self.0.parent.upgrade();
		while let Some(inner) = ancestor {
			if inner.job.is_queued() && inner.core.state.get().is_mounted() {
				return true;
			}
			ancestor = inner.parent.upgrade();
		}
		false
	}

	fn parent_id(&self) -> Option<InstanceId> {
		self.0.parent.upgrade().map(|parent| parent.core.id)
	}

	/// Get the instance's ID
	pub fn id(&self) -> InstanceId {
		self.0.core.id
	}

	/// Name of the instance's component
	pub fn name(&self) -> &str {
		&self.0.core.name
	}

	/// Current lifecycle state
	pub fn state(&self) -> LifecycleState {
		self.0.core.state.get()
	}

	/// Whether the instance is committed
	pub fn is_mounted(&self) -> bool {
		self.state().is_mounted()
	}

	/// The component this instance was created from
	pub fn component(&self) -> &Component<R::Output> {
		&self.0.component
	}

	/// The instance's hooks
	pub fn hooks(&self) -> &HookRegistry {
		&self.0.core.hooks
	}

	/// A renderer-independent handle to this instance
	pub fn handle(&self) -> InstanceHandle {
		InstanceHandle::new(Rc::clone(&self.0.core))
	}

	/// The instance's update job
	pub fn job(&self) -> &Job {
		&self.0.job
	}

	/// Whether a re-render is waiting for the next flush
	pub fn is_update_pending(&self) -> bool {
		self.0.job.is_queued()
	}

	/// The parent instance, if it is still alive
	pub fn parent(&self) -> Option<Self> {
		self.0.parent.upgrade().map(Self)
	}

	/// The current children, in render order
	pub fn children(&self) -> Vec<Self> {
		self.0
			.children
			.borrow()
			.iter()
			.map(|entry| entry.instance.clone())
			.collect()
	}

	/// The first child rendered under `key`
	pub fn child(&self, key: &str) -> Option<Self> {
		self.0
			.children
			.borrow()
			.iter()
			.find(|entry| &*entry.key == key)
			.map(|entry| entry.instance.clone())
	}

	/// The renderer this instance commits through
	pub fn renderer(&self) -> &Rc<R> {
		&self.0.renderer
	}
}

impl<R: Renderer> Clone for ComponentInstance<R> {
	fn clone(&self) -> Self {
		Self(Rc::clone(&self.0))
	}
}

impl<R: Renderer> PartialEq for ComponentInstance<R> {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}

impl<R: Renderer> Eq for ComponentInstance<R> {}

impl<R: Renderer> fmt::Debug for ComponentInstance<R> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ComponentInstance")
			.field("id", &self.0.core.id)
			.field("name", &self.0.core.name)
			.field("state", &self.0.core.state.get())
			.field("children", &self.0.children.borrow().len())
			.finish()
	}
}
