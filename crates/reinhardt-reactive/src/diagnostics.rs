//! Diagnostic channel
//!
//! Usage errors, isolated job panics and hook panics are never swallowed:
//! each one is emitted as a `tracing` event and forwarded to the thread's
//! diagnostic handler, if the host installed one with
//! [`set_diagnostic_handler`].

use core::any::Any;
use core::fmt;
use std::error::Error;
use std::rc::Rc;

use super::runtime::try_with_runtime;

/// How serious a reported problem is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
	/// Misuse that was ignored, execution continues normally.
	Warning,
	/// A failure inside user code that was isolated.
	Error,
}

/// A reported problem.
#[derive(Clone)]
pub struct Diagnostic {
	severity: Severity,
	error: Rc<dyn Error>,
}

impl Diagnostic {
	/// Severity of the report.
	pub fn severity(&self) -> Severity {
		self.severity
	}

	/// The underlying error.
	pub fn error(&self) -> &(dyn Error + 'static) {
		&*self.error
	}

	/// Returns the underlying error if it is an `E`.
	pub fn downcast_ref<E: Error + 'static>(&self) -> Option<&E> {
		self.error.downcast_ref::<E>()
	}
}

impl fmt::Debug for Diagnostic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Diagnostic")
			.field("severity", &self.severity)
			.field("error", &self.error.to_string())
			.finish()
	}
}

impl fmt::Display for Diagnostic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:?}: {}", self.severity, self.error)
	}
}

/// Host callback receiving every diagnostic.
pub type DiagnosticHandler = Rc<dyn Fn(&Diagnostic)>;

/// Reports `error` through the diagnostic channel.
pub fn report<E>(severity: Severity, error: E)
where
	E: Error + 'static,
{
	match severity {
		Severity::Warning => tracing::warn!(error = %error, "reactive runtime warning"),
		Severity::Error => tracing::error!(error = %error, "reactive runtime error"),
	}

	let diagnostic = Diagnostic {
		severity,
		error: Rc::new(error),
	};
	let handler = try_with_runtime(|rt| rt.diagnostic_handler.borrow().clone()).flatten();
	if let Some(handler) = handler {
		handler(&diagnostic);
	}
}

/// Installs the thread's diagnostic handler, returning the previous one.
pub fn set_diagnostic_handler<F>(handler: F) -> Option<DiagnosticHandler>
where
	F: Fn(&Diagnostic) + 'static,
{
	replace_diagnostic_handler(Some(Rc::new(handler)))
}

/// Replaces the thread's diagnostic handler, returning the previous one.
pub fn replace_diagnostic_handler(handler: Option<DiagnosticHandler>) -> Option<DiagnosticHandler> {
	try_with_runtime(|rt| rt.diagnostic_handler.replace(handler)).flatten()
}

/// Renders a panic payload as text.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
	if let Some(message) = payload.downcast_ref::<&str>() {
		(*message).to_owned()
	} else if let Some(message) = payload.downcast_ref::<String>() {
		message.clone()
	} else {
		String::from("non-string panic payload")
	}
}
