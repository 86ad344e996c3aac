//! Runtime configuration
//!
//! Each thread's runtime carries its own [`RuntimeConfig`]. Hosts install one
//! at startup with [`configure`]; the config derives `serde` traits so it can
//! be read from the application's settings file.

use serde::{Deserialize, Serialize};

use super::runtime::with_runtime;

/// Default number of consecutive runs allowed for a self re-queueing job.
pub const DEFAULT_RECURSION_LIMIT: u32 = 100;

/// Tunables for the job queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
	/// How many times a job may run across consecutive flushes before the
	/// queue next goes idle. Exceeding it drops the job and reports
	/// [`ReactiveError::RecursionLimitExceeded`](crate::ReactiveError::RecursionLimitExceeded).
	pub recursion_limit: u32,
	/// Isolate panicking jobs inside a flush. When `false` the panic is
	/// reported and then resumed after the queue state has been restored.
	pub catch_panics: bool,
}

impl RuntimeConfig {
	/// Creates the default configuration.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the recursion limit.
	pub fn with_recursion_limit(mut self, limit: u32) -> Self {
		self.recursion_limit = limit;
		self
	}

	/// Sets whether flushes isolate panicking jobs.
	pub fn with_catch_panics(mut self, catch_panics: bool) -> Self {
		self.catch_panics = catch_panics;
		self
	}
}

impl Default for RuntimeConfig {
	fn default() -> Self {
		Self {
			recursion_limit: DEFAULT_RECURSION_LIMIT,
			catch_panics: true,
		}
	}
}

/// Installs `config` for the current thread's runtime.
pub fn configure(config: RuntimeConfig) {
	tracing::debug!(?config, "reactive runtime configured");
	with_runtime(|rt| *rt.config.borrow_mut() = config);
}

/// Returns the current thread's configuration.
pub fn config() -> RuntimeConfig {
	with_runtime(|rt| rt.config.borrow().clone())
}
