//! Error types for component lifecycle operations

use reinhardt_reactive::ReactiveError;
use thiserror::Error;

use super::instance::InstanceId;

/// Result type for lifecycle operations
pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Errors raised or reported while driving component instances
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
	/// A hook was registered with no component instance being set up
	#[error("`{hook}` called outside of component setup; the hook was ignored")]
	HookOutsideSetup {
		/// Name of the registration function
		hook: &'static str,
	},

	/// A lifecycle hook panicked; the remaining hooks still ran
	#[error("`{hook}` hook of component `{component}` panicked: {message}")]
	HookPanicked {
		/// Component name
		component: String,
		/// Name of the registration function
		hook: &'static str,
		/// Panic payload rendered as text
		message: String,
	},

	/// The instance is not in a mounted state
	#[error("component instance {0} is not mounted")]
	NotMounted(InstanceId),

	/// The instance has already been mounted once
	#[error("component instance {0} has already been mounted")]
	AlreadyMounted(InstanceId),

	/// The render effect could not run
	#[error(transparent)]
	Reactive(#[from] ReactiveError),
}
