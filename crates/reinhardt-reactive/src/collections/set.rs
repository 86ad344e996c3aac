use core::fmt;
use core::hash::Hash;
use std::collections::HashSet;
use std::rc::Rc;

use super::TargetCell;
use crate::debug::{DebugValue, TrackOp, TriggerOp};
use crate::key::Key;
use crate::runtime::TargetId;

/// A tracked `HashSet`
pub struct ReactiveSet<T> {
	cell: Rc<TargetCell<HashSet<T>>>,
}

impl<T> ReactiveSet<T>
where
	T: Eq + Hash + Clone + fmt::Debug + 'static,
{
	/// Create an empty set
	pub fn new() -> Self {
		Self::from(HashSet::new())
	}

	/// Whether `value` is a member (HAS)
	pub fn contains(&self, value: &T) -> bool {
		self.cell.track(TrackOp::Has, Key::value(value.clone()));
		self.cell.data.borrow().contains(value)
	}

	/// Number of members (ITERATE)
	pub fn len(&self) -> usize {
		self.cell.track(TrackOp::Iterate, Key::Iterate);
		self.cell.data.borrow().len()
	}

	/// Whether the set is empty (ITERATE)
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Snapshot of the members (ITERATE)
	pub fn to_vec(&self) -> Vec<T> {
		self.cell.track(TrackOp::Iterate, Key::Iterate);
		self.cell.data.borrow().iter().cloned().collect()
	}

	/// Add `value`; returns whether it was absent (ADD)
	pub fn insert(&self, value: T) -> bool {
		if !self.cell.data.borrow_mut().insert(value.clone()) {
			return false;
		}
		self.cell.trigger(TriggerOp::Add, Key::value(value.clone()), || {
			(None, Some(DebugValue::new(value.clone())))
		});
		true
	}

	/// Remove `value`; returns whether it was present (DELETE)
	pub fn remove(&self, value: &T) -> bool {
		if !self.cell.data.borrow_mut().remove(value) {
			return false;
		}
		self.cell.trigger(TriggerOp::Delete, Key::value(value.clone()), || {
			(Some(DebugValue::new(value.clone())), None)
		});
		true
	}

	/// Remove every member, triggering DELETE per member
	pub fn clear(&self) {
		let removed = core::mem::take(&mut *self.cell.data.borrow_mut());
		for value in removed {
			self.cell.trigger(TriggerOp::Delete, Key::value(value.clone()), || {
				(Some(DebugValue::new(value.clone())), None)
			});
		}
	}

	/// Copy of the plain set, untracked
	pub fn to_raw(&self) -> HashSet<T> {
		self.cell.data.borrow().clone()
	}

	/// Identity of this target in the dependency graph
	pub fn target_id(&self) -> TargetId {
		self.cell.id
	}

	/// Whether both handles wrap the same target
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.cell, &other.cell)
	}
}

impl<T> Clone for ReactiveSet<T> {
	fn clone(&self) -> Self {
		Self {
			cell: Rc::clone(&self.cell),
		}
	}
}

impl<T> Default for ReactiveSet<T>
where
	T: Eq + Hash + Clone + fmt::Debug + 'static,
{
	fn default() -> Self {
		Self::new()
	}
}

impl<T> From<HashSet<T>> for ReactiveSet<T> {
	fn from(set: HashSet<T>) -> Self {
		Self {
			cell: TargetCell::new(set),
		}
	}
}

impl<T: fmt::Debug> fmt::Debug for ReactiveSet<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ReactiveSet")
			.field("target", &self.cell.id)
			.field("data", &self.cell.data.borrow())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Effect;
	use rstest::rstest;
	use std::cell::RefCell;

	#[rstest]
	fn test_membership_and_size_tracking() {
		let tags = ReactiveSet::from(HashSet::from(["rust"]));
		let log = Rc::new(RefCell::new(Vec::new()));
		let _effect = Effect::new({
			let tags = tags.clone();
			let log = Rc::clone(&log);
			move || log.borrow_mut().push((tags.contains(&"web"), tags.len()))
		});

		assert!(tags.insert("web"));
		assert!(!tags.insert("web"));
		assert!(tags.remove(&"rust"));
		assert!(!tags.remove(&"rust"));

		assert_eq!(*log.borrow(), vec![(false, 1), (true, 2), (true, 1)]);
	}

	#[rstest]
	fn test_clear() {
		let tags = ReactiveSet::from(HashSet::from([1, 2, 3]));
		let sizes = Rc::new(RefCell::new(Vec::new()));
		let _effect = Effect::new({
			let tags = tags.clone();
			let sizes = Rc::clone(&sizes);
			move || sizes.borrow_mut().push(tags.len())
		});

		tags.clear();
		assert_eq!(sizes.borrow().first(), Some(&3));
		assert_eq!(sizes.borrow().last(), Some(&0));
		assert!(tags.to_raw().is_empty());
	}
}
