//! Test utilities
//!
//! [`DiagnosticCapture`] records every diagnostic reported on the current
//! thread while it is alive, so tests can assert on warnings and isolated
//! failures instead of scraping log output.

use core::cell::RefCell;
use std::error::Error;
use std::rc::Rc;

use super::diagnostics::{Diagnostic, DiagnosticHandler, Severity, replace_diagnostic_handler};

/// Records diagnostics until dropped, then restores the previous handler.
///
/// ## Example
///
/// ```ignore
/// let capture = DiagnosticCapture::install();
/// on_mounted(|| {}); // outside setup
/// assert_eq!(capture.warnings::<LifecycleError>().len(), 1);
/// ```
pub struct DiagnosticCapture {
	seen: Rc<RefCell<Vec<Diagnostic>>>,
	previous: Option<DiagnosticHandler>,
}

impl DiagnosticCapture {
	/// Start recording on the current thread
	pub fn install() -> Self {
		let seen = Rc::new(RefCell::new(Vec::new()));
		let handler: DiagnosticHandler = Rc::new({
			let seen = Rc::clone(&seen);
			move |diagnostic: &Diagnostic| seen.borrow_mut().push(diagnostic.clone())
		});
		let previous = replace_diagnostic_handler(Some(handler));
		Self { seen, previous }
	}

	/// Every diagnostic recorded so far
	pub fn all(&self) -> Vec<Diagnostic> {
		self.seen.borrow().clone()
	}

	/// Number of diagnostics recorded so far
	pub fn len(&self) -> usize {
		self.seen.borrow().len()
	}

	/// Whether nothing was recorded
	pub fn is_empty(&self) -> bool {
		self.seen.borrow().is_empty()
	}

	/// Recorded errors of type `E` with [`Severity::Error`]
	pub fn errors<E>(&self) -> Vec<E>
	where
		E: Error + Clone + 'static,
	{
		self.collect(Severity::Error)
	}

	/// Recorded errors of type `E` with [`Severity::Warning`]
	pub fn warnings<E>(&self) -> Vec<E>
	where
		E: Error + Clone + 'static,
	{
		self.collect(Severity::Warning)
	}

	fn collect<E>(&self, severity: Severity) -> Vec<E>
	where
		E: Error + Clone + 'static,
	{
		self.seen
			.borrow()
			.iter()
			.filter(|diagnostic| diagnostic.severity() == severity)
			.filter_map(|diagnostic| diagnostic.downcast_ref::<E>().cloned())
			.collect()
	}
}

impl Drop for DiagnosticCapture {
	fn drop(&mut self) {
		replace_diagnostic_handler(self.previous.take());
	}
}
