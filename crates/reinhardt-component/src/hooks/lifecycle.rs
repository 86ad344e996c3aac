//! Lifecycle hooks: on_before_mount, on_mounted, on_before_update, on_updated,
//! on_before_unmount, on_unmounted
//!
//! Across a component tree, `before` hooks fire parent first and the others
//! fire children first:
//!
//! ```text
//! mount    A.before_mount  B.before_mount  B.mounted  A.mounted
//! update   A.before_update B.before_update B.updated  A.updated
//! unmount  A.before_unmount B.before_unmount B.unmounted A.unmounted
//! ```

use std::rc::Rc;

use super::{LifecyclePhase, register_lifecycle};

/// Runs `hook` before the instance's first render is committed.
///
/// Nothing of the instance is committed when it runs.
///
/// # Example
///
/// ```ignore
/// use reinhardt_component::{Component, View, on_before_mount};
///
/// let greeting = Component::new("Greeting", || {
///     on_before_mount(|| tracing::debug!("about to mount"));
///     || View::new("hello".to_owned())
/// });
/// ```
pub fn on_before_mount<F>(hook: F)
where
	F: Fn() + 'static,
{
	register_lifecycle(LifecyclePhase::BeforeMount, Rc::new(hook));
}

/// Runs `hook` after the instance and all its children are committed.
///
/// # Example
///
/// ```ignore
/// use reinhardt_component::{Component, View, on_mounted, on_before_unmount};
///
/// let timer = Component::new("Timer", || {
///     on_mounted(|| {
///         // Registered here, fires once when the timer is removed
///         on_before_unmount(|| tracing::debug!("stopping timer"));
///     });
///     || View::new("0s".to_owned())
/// });
/// ```
pub fn on_mounted<F>(hook: F)
where
	F: Fn() + 'static,
{
	register_lifecycle(LifecyclePhase::Mounted, Rc::new(hook));
}

/// Runs `hook` before each re-render.
pub fn on_before_update<F>(hook: F)
where
	F: Fn() + 'static,
{
	register_lifecycle(LifecyclePhase::BeforeUpdate, Rc::new(hook));
}

/// Runs `hook` after each re-render and its children are committed.
pub fn on_updated<F>(hook: F)
where
	F: Fn() + 'static,
{
	register_lifecycle(LifecyclePhase::Updated, Rc::new(hook));
}

/// Runs `hook` before the instance starts tearing down.
pub fn on_before_unmount<F>(hook: F)
where
	F: Fn() + 'static,
{
	register_lifecycle(LifecyclePhase::BeforeUnmount, Rc::new(hook));
}

/// Runs `hook` after the instance and all its children were removed.
pub fn on_unmounted<F>(hook: F)
where
	F: Fn() + 'static,
{
	register_lifecycle(LifecyclePhase::Unmounted, Rc::new(hook));
}
