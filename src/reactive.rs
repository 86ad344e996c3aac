//! Fine-grained reactive state
//!
//! This module provides access to reinhardt-reactive: tracked containers,
//! effects, and the batched job queue.
//!
//! ## Example
//!
//! ```rust,ignore
//! use reinhardt_reactivity::reactive::{Effect, Signal, tick};
//!
//! let count = Signal::new(0);
//! let _log = Effect::queued("log", {
//!     let count = count.clone();
//!     move || tracing::info!(count = count.get(), "changed")
//! });
//!
//! count.set(1);
//! tick();
//! ```

pub use reinhardt_reactive::*;
