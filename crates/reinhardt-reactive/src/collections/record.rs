use core::fmt;
use std::rc::Rc;

use serde_json::{Map, Value};

use super::TargetCell;
use crate::debug::{DebugValue, TrackOp, TriggerOp};
use crate::key::Key;
use crate::runtime::TargetId;

/// A tracked JSON object
///
/// Fields are keyed by name. Tracking is shallow: a nested object is one
/// field value, so editing inside it requires writing the field back.
///
/// ## Example
///
/// ```ignore
/// use reinhardt_reactive::ReactiveRecord;
/// use serde_json::json;
///
/// let user = ReactiveRecord::from_json(json!({ "name": "alice" })).unwrap();
/// user.set("age", 30);
/// assert_eq!(user.get("age"), Some(json!(30)));
/// ```
#[derive(Clone)]
pub struct ReactiveRecord {
	cell: Rc<TargetCell<Map<String, Value>>>,
}

impl ReactiveRecord {
	/// Create an empty record
	pub fn new() -> Self {
		Self::from(Map::new())
	}

	/// Wrap a JSON value; `None` unless it is an object
	pub fn from_json(value: Value) -> Option<Self> {
		match value {
			Value::Object(fields) => Some(Self::from(fields)),
			_ => None,
		}
	}

	/// Get a clone of field `name` (GET)
	pub fn get(&self, name: &str) -> Option<Value> {
		self.cell.track(TrackOp::Get, Key::from(name));
		self.cell.data.borrow().get(name).cloned()
	}

	/// Get a clone of field `name` without tracking
	pub fn get_untracked(&self, name: &str) -> Option<Value> {
		self.cell.data.borrow().get(name).cloned()
	}

	/// Whether field `name` exists (HAS)
	pub fn contains_key(&self, name: &str) -> bool {
		self.cell.track(TrackOp::Has, Key::from(name));
		self.cell.data.borrow().contains_key(name)
	}

	/// Snapshot of the field names (ITERATE)
	pub fn keys(&self) -> Vec<String> {
		self.cell.track(TrackOp::Iterate, Key::Iterate);
		self.cell.data.borrow().keys().cloned().collect()
	}

	/// Number of fields (ITERATE)
	pub fn len(&self) -> usize {
		self.cell.track(TrackOp::Iterate, Key::Iterate);
		self.cell.data.borrow().len()
	}

	/// Whether the record has no fields (ITERATE)
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Write field `name` (ADD when new, SET when changed), returning the previous value
	pub fn set(&self, name: &str, value: impl Into<Value>) -> Option<Value> {
		let value = value.into();
		let (op, previous) = {
			let mut data = self.cell.data.borrow_mut();
			match data.get_mut(name) {
				Some(slot) if *slot == value => return Some(value),
				Some(slot) => (TriggerOp::Set, Some(core::mem::replace(slot, value))),
				None => {
					data.insert(name.to_owned(), value);
					(TriggerOp::Add, None)
				}
			}
		};
		self.cell.trigger(op, Key::from(name), || {
			(
				previous.clone().map(DebugValue::new),
				self.get_untracked(name).map(DebugValue::new),
			)
		});
		previous
	}

	/// Delete field `name` (DELETE), returning its value
	pub fn remove(&self, name: &str) -> Option<Value> {
		let removed = self.cell.data.borrow_mut().remove(name)?;
		self.cell.trigger(TriggerOp::Delete, Key::from(name), || {
			(Some(DebugValue::new(removed.clone())), None)
		});
		Some(removed)
	}

	/// Copy of the plain object, untracked
	pub fn to_raw(&self) -> Map<String, Value> {
		self.cell.data.borrow().clone()
	}

	/// Copy of the record as a JSON value, untracked
	pub fn to_json(&self) -> Value {
		Value::Object(self.to_raw())
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

impl Default for ReactiveRecord {
	fn default() -> Self {
		Self::new()
	}
}

impl From<Map<String, Value>> for ReactiveRecord {
	fn from(fields: Map<String, Value>) -> Self {
		Self {
			cell: TargetCell::new(fields),
		}
	}
}

impl fmt::Debug for ReactiveRecord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ReactiveRecord")
			.field("target", &self.cell.id)
			.field("data", &self.cell.data.borrow())
			.finish()
	}
}
