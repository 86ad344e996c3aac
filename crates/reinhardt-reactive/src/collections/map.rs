use core::fmt;
use core::hash::Hash;
use std::collections::HashMap;
use std::rc::Rc;

use super::TargetCell;
use crate::debug::{DebugValue, TrackOp, TriggerOp};
use crate::key::Key;
use crate::runtime::TargetId;

/// A tracked `HashMap`
///
/// Every value read subscribes the running effect to that key; enumeration
/// subscribes to the key set as a whole.
///
/// ## Example
///
/// ```ignore
/// use reinhardt_reactive::{Effect, ReactiveMap};
///
/// let scores = ReactiveMap::new();
/// scores.insert("alice", 10);
///
/// let _effect = Effect::new({
///     let scores = scores.clone();
///     move || println!("alice: {:?}", scores.get(&"alice"))
/// });
///
/// scores.insert("alice", 11); // re-runs
/// scores.insert("bob", 3);    // does not: nobody read "bob" or the key set
/// ```
pub struct ReactiveMap<K, V> {
	cell: Rc<TargetCell<HashMap<K, V>>>,
}

impl<K, V> ReactiveMap<K, V>
where
	K: Eq + Hash + Clone + fmt::Debug + 'static,
	V: 'static,
{
	/// Create an empty map
	pub fn new() -> Self {
		Self::from(HashMap::new())
	}

	/// Get a clone of the value at `key` (GET)
	pub fn get(&self, key: &K) -> Option<V>
	where
		V: Clone,
	{
		self.with(key, |value| value.cloned())
	}

	/// Borrow the value at `key` (GET)
	///
	/// # Panics
	///
	/// The map stays borrowed while `f` runs, so writing this map from
	/// inside `f` panics. Use [`ReactiveMap::get`] when a write follows.
	pub fn with<R>(&self, key: &K, f: impl FnOnce(Option<&V>) -> R) -> R {
		self.cell.track(TrackOp::Get, Key::value(key.clone()));
		f(self.cell.data.borrow().get(key))
	}

	/// Get a clone of the value at `key` without tracking
	pub fn get_untracked(&self, key: &K) -> Option<V>
	where
		V: Clone,
	{
		self.cell.data.borrow().get(key).cloned()
	}

	/// Whether `key` is present (HAS)
	pub fn contains_key(&self, key: &K) -> bool {
		self.cell.track(TrackOp::Has, Key::value(key.clone()));
		self.cell.data.borrow().contains_key(key)
	}

	/// Number of entries (ITERATE)
	pub fn len(&self) -> usize {
		self.cell.track(TrackOp::Iterate, Key::Iterate);
		self.cell.data.borrow().len()
	}

	/// Whether the map is empty (ITERATE)
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Snapshot of the keys (ITERATE)
	pub fn keys(&self) -> Vec<K> {
		self.cell.track(TrackOp::Iterate, Key::Iterate);
		self.cell.data.borrow().keys().cloned().collect()
	}

	/// Snapshot of the values (ITERATE, then GET per key)
	pub fn values(&self) -> Vec<V>
	where
		V: Clone,
	{
		self.entries().into_iter().map(|(_, value)| value).collect()
	}

	/// Snapshot of the entries (ITERATE, then GET per key)
	pub fn entries(&self) -> Vec<(K, V)>
	where
		V: Clone,
	{
		self.cell.track(TrackOp::Iterate, Key::Iterate);
		let entries: Vec<(K, V)> = self
			.cell
			.data
			.borrow()
			.iter()
			.map(|(key, value)| (key.clone(), value.clone()))
			.collect();
		for (key, _) in &entries {
			self.cell.track(TrackOp::Get, Key::value(key.clone()));
		}
		entries
	}

	/// Insert `value` at `key`, returning the previous value
	///
	/// A new key triggers ADD, a changed value SET. Writing an equal value
	/// triggers nothing.
	pub fn insert(&self, key: K, value: V) -> Option<V>
	where
		V: Clone + PartialEq,
	{
		let (op, previous) = {
			let mut data = self.cell.data.borrow_mut();
			match data.get_mut(&key) {
				Some(slot) if *slot == value => return Some(value),
				Some(slot) => (TriggerOp::Set, Some(core::mem::replace(slot, value))),
				None => {
					data.insert(key.clone(), value);
					(TriggerOp::Add, None)
				}
			}
		};
		self.cell.trigger(op, Key::value(key.clone()), || {
			(
				previous.clone().map(DebugValue::new),
				self.get_untracked(&key).map(DebugValue::new),
			)
		});
		previous
	}

	/// Remove `key`, returning its value (DELETE)
	pub fn remove(&self, key: &K) -> Option<V>
	where
		V: Clone,
	{
		let removed = self.cell.data.borrow_mut().remove(key)?;
		self.cell.trigger(TriggerOp::Delete, Key::value(key.clone()), || {
			(Some(DebugValue::new(removed.clone())), None)
		});
		Some(removed)
	}

	/// Remove every entry, triggering DELETE per removed key
	pub fn clear(&self)
	where
		V: Clone,
	{
		let removed = core::mem::take(&mut *self.cell.data.borrow_mut());
		for (key, value) in removed {
			self.cell.trigger(TriggerOp::Delete, Key::value(key), || {
				(Some(DebugValue::new(value.clone())), None)
			});
		}
	}

	/// Copy of the plain map, untracked
	pub fn to_raw(&self) -> HashMap<K, V>
	where
		V: Clone,
	{
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

impl<K, V> Clone for ReactiveMap<K, V> {
	fn clone(&self) -> Self {
		Self {
			cell: Rc::clone(&self.cell),
		}
	}
}

impl<K, V> Default for ReactiveMap<K, V>
where
	K: Eq + Hash + Clone + fmt::Debug + 'static,
	V: 'static,
{
	fn default() -> Self {
		Self::new()
	}
}

impl<K, V> From<HashMap<K, V>> for ReactiveMap<K, V> {
	fn from(map: HashMap<K, V>) -> Self {
		Self {
			cell: TargetCell::new(map),
		}
	}
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for ReactiveMap<K, V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ReactiveMap")
			.field("target", &self.cell.id)
			.field("data", &self.cell.data.borrow())
			.finish()
	}
}
