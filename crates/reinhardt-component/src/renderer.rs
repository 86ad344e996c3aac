//! Host renderer boundary

use std::rc::Rc;

use super::component::Component;
use super::error::LifecycleResult;
use super::instance::{ComponentInstance, InstanceId};

/// Commits render output to the host
///
/// The lifecycle engine calls `insert` once per instance after its first
/// render (parents before children), `patch` after every re-render, and
/// `remove` during unmount (children before parents).
pub trait Renderer: 'static {
	/// What a render produces for one instance
	type Output: 'static;

	/// Commit the first output of `instance`
	fn insert(&self, instance: InstanceId, parent: Option<InstanceId>, output: &Self::Output);

	/// Commit a re-rendered output of `instance`
	fn patch(&self, instance: InstanceId, output: &Self::Output);

	/// Remove everything committed for `instance`
	fn remove(&self, instance: InstanceId);
}

/// Create and mount a root instance of `component`
///
/// The host unmounts it with [`ComponentInstance::unmount`]. Updates are
/// batched through the job queue of the current thread.
///
/// # Example
///
/// ```ignore
/// use std::rc::Rc;
/// use reinhardt_component::{Component, View, render};
/// use reinhardt_component::testing::RecordingRenderer;
///
/// let app = Component::new("App", || || View::new("hello".to_owned()));
/// let root = render(&app, Rc::new(RecordingRenderer::new()))?;
/// ```
pub fn render<R>(component: &Component<R::Output>, renderer: Rc<R>) -> LifecycleResult<ComponentInstance<R>>
where
	R: Renderer,
{
	let instance = ComponentInstance::new(component.clone(), renderer, None);
	instance.mount()?;
	Ok(instance)
}
