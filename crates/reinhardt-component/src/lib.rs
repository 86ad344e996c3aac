//! # Reinhardt Component
//!
//! Component instances driven by `reinhardt-reactive`: each instance owns a
//! render effect whose re-runs go through the batched job queue, and
//! lifecycle hooks fire at well-defined points around every commit.
//!
//! ## Lifecycle Order
//!
//! For a tree A > B, `before` hooks fire parent first and the others fire
//! children first:
//!
//! ```text
//! mount    A.before_mount   B.before_mount   B.mounted   A.mounted
//! update   A.before_update  B.before_update  B.updated   A.updated
//! unmount  A.before_unmount B.before_unmount B.unmounted A.unmounted
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use reinhardt_component::{Component, View, on_mounted, render};
//! use reinhardt_component::testing::RecordingRenderer;
//! use reinhardt_reactive::{Signal, tick};
//!
//! let count = Signal::new(0);
//! let counter = Component::new("Counter", {
//!     let count = count.clone();
//!     move || {
//!         on_mounted(|| tracing::info!("mounted"));
//!         let count = count.clone();
//!         move || View::new(format!("count: {}", count.get()))
//!     }
//! });
//!
//! let root = render(&counter, Rc::new(RecordingRenderer::new()))?;
//! count.set(1);
//! tick(); // one re-render, one patch
//! root.unmount()?;
//! ```

pub mod component;
pub mod error;
pub mod hooks;
pub mod instance;
pub mod renderer;

// Testing utilities (always compiled so downstream crates can use them in their tests)
pub mod testing;

pub use component::{Child, Component, RenderFn, View};
pub use error::{LifecycleError, LifecycleResult};
pub use hooks::{
	DebugPhase, HookRegistry, LifecyclePhase, current_instance, on_before_mount, on_before_unmount,
	on_before_update, on_mounted, on_render_tracked, on_render_triggered, on_unmounted, on_updated,
};
pub use instance::{ComponentInstance, InstanceHandle, InstanceId, LifecycleState};
pub use renderer::{Renderer, render};
