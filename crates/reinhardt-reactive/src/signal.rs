//! Signal - Single-value Reactive Primitive
//!
//! `Signal<T>` holds one value and tracks dependencies when it is read.
//!
//! ## Key Features
//!
//! - **Automatic Dependency Tracking**: `get()` inside an effect subscribes it
//! - **Change Notification**: `set()`/`update()` notify subscribers, unless the value is unchanged
//! - **Lightweight**: clones share the value and the dependency entry
//!
//! ## Example
//!
//! ```ignore
//! use reinhardt_reactive::Signal;
//!
//! let count = Signal::new(0);
//! assert_eq!(count.get(), 0);
//!
//! count.set(42);
//! count.update(|n| *n += 1);
//! assert_eq!(count.get(), 43);
//! ```

use core::fmt;
use std::rc::Rc;

use super::collections::TargetCell;
use super::debug::{DebugValue, TrackOp, TriggerOp};
use super::key::Key;
use super::runtime::TargetId;

const VALUE_KEY: &str = "value";

/// A reactive signal that holds a value and tracks dependencies
///
/// ## Cloning
///
/// All clones of the same Signal share the same underlying value and
/// dependency entry.
pub struct Signal<T: 'static> {
	cell: Rc<TargetCell<T>>,
}

impl<T: 'static> Signal<T> {
	/// Create a new Signal with the given initial value
	pub fn new(value: T) -> Self {
		Self {
			cell: TargetCell::new(value),
		}
	}

	/// Get the current value of the signal (GET)
	pub fn get(&self) -> T
	where
		T: Clone,
	{
		self.with(T::clone)
	}

	/// Borrow the current value (GET)
	///
	/// # Panics
	///
	/// The value stays borrowed while `f` runs, so writing this signal from
	/// inside `f` panics. Read with [`Signal::get`] first when the new value
	/// depends on the old one, or use [`Signal::update`].
	///
	/// # Example
	///
	/// ```ignore
	/// let name = Signal::new(String::from("reinhardt"));
	/// let len = name.with(|name| name.len());
	/// ```
	pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
		self.cell.track(TrackOp::Get, Key::value(VALUE_KEY));
		f(&self.cell.data.borrow())
	}

	/// Get the current value without tracking dependencies
	pub fn get_untracked(&self) -> T
	where
		T: Clone,
	{
		self.cell.data.borrow().clone()
	}

	/// Set the signal to a new value (SET)
	///
	/// Nothing is notified when `value` equals the current value.
	pub fn set(&self, value: T)
	where
		T: Clone + PartialEq,
	{
		let previous = {
			let mut current = self.cell.data.borrow_mut();
			if *current == value {
				return;
			}
			core::mem::replace(&mut *current, value)
		};
		self.notify(previous);
	}

	/// Update the value in place (SET)
	///
	/// # Example
	///
	/// ```ignore
	/// let todos = Signal::new(vec![]);
	/// todos.update(|list| list.push("write docs"));
	/// ```
	pub fn update(&self, f: impl FnOnce(&mut T))
	where
		T: Clone + PartialEq,
	{
		let previous = {
			let mut current = self.cell.data.borrow_mut();
			let previous = current.clone();
			f(&mut current);
			if *current == previous {
				return;
			}
			previous
		};
		self.notify(previous);
	}

	fn notify(&self, previous: T)
	where
		T: Clone,
	{
		self.cell.trigger(TriggerOp::Set, Key::value(VALUE_KEY), || {
			(
				Some(DebugValue::new(previous)),
				Some(DebugValue::new(self.get_untracked())),
			)
		});
	}

	/// Identity of this signal in the dependency graph
	pub fn target_id(&self) -> TargetId {
		self.cell.id
	}

	/// Whether both handles refer to the same signal
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.cell, &other.cell)
	}
}

impl<T: 'static> Clone for Signal<T> {
	fn clone(&self) -> Self {
		Self {
			cell: Rc::clone(&self.cell),
		}
	}
}

impl<T: Default + 'static> Default for Signal<T> {
	fn default() -> Self {
		Self::new(T::default())
	}
}

impl<T: fmt::Debug + 'static> fmt::Debug for Signal<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Signal")
			.field("target", &self.cell.id)
			.field("value", &self.cell.data.borrow())
			.finish()
	}
}
