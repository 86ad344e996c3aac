//! # Reinhardt Reactivity
//!
//! Reactive state and component lifecycle orchestration.
//!
//! Reinhardt Reactivity tracks which computations read which pieces of
//! state, re-runs exactly those computations when the state changes, and
//! batches the re-runs through a job queue so that many writes produce one
//! re-render. Component instances sit on top: each owns a render effect and
//! fires lifecycle hooks in a fixed order around every commit.
//!
//! ## Feature Flags
//!
//! - `minimal` - Reactive runtime only
//! - `component` - Component instances and lifecycle hooks
//! - `full` (default) - Everything
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use std::rc::Rc;
//! use reinhardt_reactivity::prelude::*;
//! use reinhardt_reactivity::component::testing::RecordingRenderer;
//!
//! let todos = reactive(vec!["write docs".to_owned()]);
//! let list = Component::new("TodoList", {
//!     let todos = todos.clone();
//!     move || {
//!         on_mounted(|| tracing::info!("list mounted"));
//!         let todos = todos.clone();
//!         move || View::new(todos.to_vec().join("\n"))
//!     }
//! });
//!
//! let root = render(&list, Rc::new(RecordingRenderer::new()))?;
//! todos.push("ship".to_owned());
//! tick(); // one re-render
//! root.unmount()?;
//! ```
//!
//! ## Threading
//!
//! Every thread owns an independent runtime. Nothing in this crate is
//! `Send`; a host drives a thread's flushes through
//! [`set_scheduler`](reactive::set_scheduler) or [`tick`](reactive::tick).

pub mod reactive;

#[cfg(feature = "component")]
pub mod component;

// Re-export the runtime entry points
pub use reinhardt_reactive::{
	Effect, EffectOptions, ReactiveError, ReactiveResult, Signal, next_tick, reactive, tick,
};

// Re-export the component entry points
#[cfg(feature = "component")]
pub use reinhardt_component::{Component, ComponentInstance, LifecycleError, Renderer, View, render};

/// Prelude module for convenient imports
///
/// Import everything commonly needed with:
/// ```rust,ignore
/// use reinhardt_reactivity::prelude::*;
/// ```
pub mod prelude {
	// Reactive runtime - always available
	pub use crate::reactive::{
		DebugEvent, Effect, EffectOptions, IntoReactive, Job, Key, OpKind, ReactiveError,
		ReactiveMap, ReactiveRecord, ReactiveResult, ReactiveSet, ReactiveVec, Signal,
		flush_jobs, next_tick, queue_job, reactive, tick, untrack,
	};

	#[cfg(feature = "component")]
	pub use crate::component::{
		Component, ComponentInstance, LifecycleError, LifecycleResult, LifecycleState, Renderer,
		View, current_instance, on_before_mount, on_before_unmount, on_before_update, on_mounted,
		on_render_tracked, on_render_triggered, on_unmounted, on_updated, render,
	};
}
