//! Error types for the reactive runtime

use thiserror::Error;

use super::runtime::EffectId;

/// Result type for reactive operations
pub type ReactiveResult<T> = Result<T, ReactiveError>;

/// Errors raised or reported by the reactive runtime
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReactiveError {
	/// The effect was disposed and can no longer run
	#[error("effect {0} has been disposed")]
	EffectDisposed(EffectId),

	/// The effect is already on the running stack
	#[error("effect {0} is already running")]
	RecursiveEffect(EffectId),

	/// A queued job panicked during a flush
	#[error("job `{label}` panicked: {message}")]
	JobPanicked {
		/// Label of the failing job
		label: String,
		/// Panic payload rendered as text
		message: String,
	},

	/// A job kept re-queueing itself across flushes
	#[error("job `{label}` re-queued itself more than {limit} times without the queue going idle")]
	RecursionLimitExceeded {
		/// Label of the offending job
		label: String,
		/// Configured limit
		limit: u32,
	},
}
