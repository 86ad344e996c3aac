//! # Reinhardt Reactive
//!
//! Fine-grained reactive runtime: tracked containers, effects that re-run
//! when what they read changes, and a batched job queue that coalesces
//! re-runs into one flush.
//!
//! ## Building Blocks
//!
//! - **Containers**: [`Signal`], [`ReactiveMap`], [`ReactiveSet`], [`ReactiveVec`],
//!   [`ReactiveRecord`] report GET/HAS/ITERATE reads and SET/ADD/DELETE writes
//! - **Effects**: [`Effect`] subscribes to exactly the entries read in its latest run
//! - **Scheduler**: [`queue_job`], [`flush_jobs`], [`next_tick`] and the host
//!   boundary [`set_scheduler`] / [`tick`]
//! - **Debugging**: [`DebugEvent`] delivered to `on_track` / `on_trigger`
//! - **Diagnostics**: misuse and isolated failures go through `tracing` and
//!   an optional handler installed with [`set_diagnostic_handler`]
//!
//! ## Example
//!
//! ```ignore
//! use reinhardt_reactive::{Effect, Signal, tick};
//!
//! let count = Signal::new(0);
//! let _render = Effect::queued("render", {
//!     let count = count.clone();
//!     move || println!("count = {}", count.get())
//! });
//!
//! count.set(1);
//! count.set(2);
//! tick(); // prints "count = 2" once
//! ```
//!
//! Every thread owns an independent runtime; nothing here is `Send`.

pub mod collections;
pub mod config;
pub mod debug;
pub mod diagnostics;
pub mod effect;
pub mod error;
pub mod key;
pub mod runtime;
pub mod scheduler;
pub mod signal;

// Testing utilities (always compiled so downstream crates can use them in their tests)
pub mod testing;

pub use collections::{IntoReactive, ReactiveMap, ReactiveRecord, ReactiveSet, ReactiveVec, reactive};
pub use config::{RuntimeConfig, configure};
pub use debug::{DebugEvent, DebugHook, DebugValue, OpKind, TrackOp, TriggerOp};
pub use diagnostics::{Diagnostic, Severity, report, set_diagnostic_handler};
pub use effect::{Effect, EffectOptions};
pub use error::{ReactiveError, ReactiveResult};
pub use key::Key;
pub use runtime::{EffectId, TargetId, untrack};
pub use scheduler::{
	Job, JobId, NextTick, Task, clear_scheduler, flush_jobs, invalidate_job, next_tick,
	on_next_flush, queue_job, set_scheduler, tick,
};
pub use signal::Signal;
