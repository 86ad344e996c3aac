use core::fmt;
use std::rc::Rc;

use super::TargetCell;
use crate::debug::{DebugValue, TrackOp, TriggerOp};
use crate::key::Key;
use crate::runtime::TargetId;

/// A tracked `Vec`
///
/// Elements are keyed by index. Structural edits (`insert`, `remove`,
/// `retain`, `clear`, [`mutate`](Self::mutate)) compare the contents before
/// and after and trigger SET, ADD or DELETE per affected index.
pub struct ReactiveVec<T> {
	cell: Rc<TargetCell<Vec<T>>>,
}

impl<T: 'static> ReactiveVec<T> {
	/// Create an empty vector
	pub fn new() -> Self {
		Self::from(Vec::new())
	}

	/// Borrow the element at `index` (GET)
	///
	/// # Panics
	///
	/// The vector stays borrowed while `f` runs, so writing this vector from
	/// inside `f` panics. Use [`ReactiveVec::get`] or [`ReactiveVec::mutate`]
	/// when a write follows.
	pub fn with<R>(&self, index: usize, f: impl FnOnce(Option<&T>) -> R) -> R {
		self.cell.track(TrackOp::Get, Key::Index(index));
		f(self.cell.data.borrow().get(index))
	}

	/// Number of elements (ITERATE)
	pub fn len(&self) -> usize {
		self.cell.track(TrackOp::Iterate, Key::Iterate);
		self.cell.data.borrow().len()
	}

	/// Whether the vector is empty (ITERATE)
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Identity of this target in the dependency graph
	pub fn target_id(&self) -> TargetId {
		self.cell.id
	}

	/// Whether both handles wrap the same target
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.cell, &other.cell)
	}

	fn track_all(&self, len: usize) {
		self.cell.track(TrackOp::Iterate, Key::Iterate);
		for index in 0..len {
			self.cell.track(TrackOp::Get, Key::Index(index));
		}
	}
}

impl<T> ReactiveVec<T>
where
	T: Clone + PartialEq + 'static,
{
	/// Get a clone of the element at `index` (GET)
	pub fn get(&self, index: usize) -> Option<T> {
		self.with(index, |value| value.cloned())
	}

	/// Get a clone of the element at `index` without tracking
	pub fn get_untracked(&self, index: usize) -> Option<T> {
		self.cell.data.borrow().get(index).cloned()
	}

	/// Snapshot of the elements (ITERATE, then GET per index)
	pub fn to_vec(&self) -> Vec<T> {
		let items = self.cell.data.borrow().clone();
		self.track_all(items.len());
		items
	}

	/// Whether any element equals `value` (ITERATE, then GET per index)
	pub fn contains(&self, value: &T) -> bool {
		let (len, found) = {
			let data = self.cell.data.borrow();
			(data.len(), data.contains(value))
		};
		self.track_all(len);
		found
	}

	/// Replace the element at `index` (SET), returning the previous one
	///
	/// Returns `None` and leaves the vector untouched when `index` is out of
	/// bounds or the element is unchanged.
	pub fn set(&self, index: usize, value: T) -> Option<T> {
		let previous = {
			let mut data = self.cell.data.borrow_mut();
			let slot = data.get_mut(index)?;
			if *slot == value {
				return None;
			}
			core::mem::replace(slot, value)
		};
		self.cell.trigger(TriggerOp::Set, Key::Index(index), || {
			(
				Some(DebugValue::new(previous.clone())),
				self.get_untracked(index).map(DebugValue::new),
			)
		});
		Some(previous)
	}

	/// Append `value` (ADD at the new last index)
	pub fn push(&self, value: T) {
		let index = {
			let mut data = self.cell.data.borrow_mut();
			data.push(value);
			data.len() - 1
		};
		self.cell.trigger(TriggerOp::Add, Key::Index(index), || {
			(None, self.get_untracked(index).map(DebugValue::new))
		});
	}

	/// Remove the last element (DELETE at its index)
	pub fn pop(&self) -> Option<T> {
		let (index, value) = {
			let mut data = self.cell.data.borrow_mut();
			let value = data.pop()?;
			(data.len(), value)
		};
		self.cell.trigger(TriggerOp::Delete, Key::Index(index), || {
			(Some(DebugValue::new(value.clone())), None)
		});
		Some(value)
	}

	/// Insert `value` at `index`, shifting later elements
	///
	/// Out-of-bounds positions append.
	pub fn insert(&self, index: usize, value: T) {
		self.mutate(|items| {
			let index = index.min(items.len());
			items.insert(index, value);
		});
	}

	/// Remove and return the element at `index`, shifting later elements
	pub fn remove(&self, index: usize) -> Option<T> {
		self.mutate(|items| (index < items.len()).then(|| items.remove(index)))
	}

	/// Keep only the elements matching `keep`
	pub fn retain(&self, keep: impl FnMut(&T) -> bool) {
		self.mutate(|items| items.retain(keep));
	}

	/// Remove every element
	pub fn clear(&self) {
		self.mutate(Vec::clear);
	}

	/// Apply an arbitrary edit to the plain vector
	///
	/// The contents before and after are compared index by index: changed
	/// positions trigger SET, positions past the old length ADD, and
	/// positions past the new length DELETE.
	pub fn mutate<R>(&self, f: impl FnOnce(&mut Vec<T>) -> R) -> R {
		let before = self.cell.data.borrow().clone();
		let result = f(&mut self.cell.data.borrow_mut());
		let after = self.cell.data.borrow().clone();

		for index in 0..before.len().max(after.len()) {
			let (op, old, new) = match (before.get(index), after.get(index)) {
				(Some(old), Some(new)) if old == new => continue,
				(Some(old), Some(new)) => (TriggerOp::Set, Some(old), Some(new)),
				(None, Some(new)) => (TriggerOp::Add, None, Some(new)),
				(Some(old), None) => (TriggerOp::Delete, Some(old), None),
				(None, None) => continue,
			};
			self.cell.trigger(op, Key::Index(index), || {
				(
					old.cloned().map(DebugValue::new),
					new.cloned().map(DebugValue::new),
				)
			});
		}
		result
	}

	/// Copy of the plain vector, untracked
	pub fn to_raw(&self) -> Vec<T> {
		self.cell.data.borrow().clone()
	}
}

impl<T> Clone for ReactiveVec<T> {
	fn clone(&self) -> Self {
		Self {
			cell: Rc::clone(&self.cell),
		}
	}
}

impl<T: 'static> Default for ReactiveVec<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> From<Vec<T>> for ReactiveVec<T> {
	fn from(items: Vec<T>) -> Self {
		Self {
			cell: TargetCell::new(items),
		}
	}
}

impl<T: fmt::Debug> fmt::Debug for ReactiveVec<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ReactiveVec")
			.field("target", &self.cell.id)
			.field("data", &self.cell.data.borrow())
			.finish()
	}
}
