//! Debug hooks: on_render_tracked and on_render_triggered
//!
//! These expose the dependency events of an instance's render effect. They
//! observe only; nothing they do changes scheduling or output.

use std::rc::Rc;

use reinhardt_reactive::DebugEvent;

use super::{DebugPhase, register_debug};

/// Calls `hook` whenever the render effect subscribes to a new entry.
///
/// Receives GET, HAS or ITERATE events, once per entry per render.
///
/// # Example
///
/// ```ignore
/// use reinhardt_component::{Component, View, on_render_tracked};
///
/// let list = Component::new("List", || {
///     on_render_tracked(|event| tracing::debug!(kind = ?event.kind, key = %event.key, "tracked"));
///     || View::new(String::new())
/// });
/// ```
pub fn on_render_tracked<F>(hook: F)
where
	F: Fn(&DebugEvent) + 'static,
{
	register_debug(DebugPhase::RenderTracked, Rc::new(hook));
}

/// Calls `hook` whenever a write notifies the render effect.
///
/// Receives SET, ADD or DELETE events with the old and new values.
pub fn on_render_triggered<F>(hook: F)
where
	F: Fn(&DebugEvent) + 'static,
{
	register_debug(DebugPhase::RenderTriggered, Rc::new(hook));
}
