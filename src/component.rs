//! Component instances and lifecycle hooks
//!
//! This module provides access to reinhardt-component.
//!
//! ## Architecture
//!
//! - **Definitions**: a [`Component`] pairs a name with a setup function
//! - **Instances**: each mounted use owns a render effect and an update job
//! - **Renderer**: the host commits output through the [`Renderer`] trait
//! - **Hooks**: `on_*` functions registered during setup
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::rc::Rc;
//! use reinhardt_reactivity::component::{Component, View, on_mounted, render};
//! use reinhardt_reactivity::component::testing::RecordingRenderer;
//!
//! let app = Component::new("App", || {
//!     on_mounted(|| tracing::info!("app mounted"));
//!     || View::new("hello".to_owned())
//! });
//! let root = render(&app, Rc::new(RecordingRenderer::new()))?;
//! ```

pub use reinhardt_component::*;
