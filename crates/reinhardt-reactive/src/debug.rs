//! Debug events for dependency tracking and triggering
//!
//! A [`DebugEvent`] describes one dependency interaction. Events are built on
//! demand for effects that carry an `on_track` or `on_trigger` hook and are
//! never retained by the runtime.

use core::any::Any;
use core::fmt;
use std::rc::Rc;

use super::key::Key;
use super::runtime::{EffectId, TargetId};

/// Read operations recorded as subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackOp {
	/// Member value access.
	Get,
	/// Containment check for a key.
	Has,
	/// Enumeration of the key set.
	Iterate,
}

/// Write operations that notify subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerOp {
	/// Overwrite of an existing key.
	Set,
	/// Insertion of a previously absent key.
	Add,
	/// Removal of a key.
	Delete,
}

impl TriggerOp {
	/// ADD and DELETE change the key set and also notify the structural entry.
	pub fn changes_key_set(self) -> bool {
		matches!(self, Self::Add | Self::Delete)
	}
}

/// The kind carried by a [`DebugEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
	/// See [`TrackOp::Get`].
	Get,
	/// See [`TrackOp::Has`].
	Has,
	/// See [`TrackOp::Iterate`].
	Iterate,
	/// See [`TriggerOp::Set`].
	Set,
	/// See [`TriggerOp::Add`].
	Add,
	/// See [`TriggerOp::Delete`].
	Delete,
}

impl From<TrackOp> for OpKind {
	fn from(op: TrackOp) -> Self {
		match op {
			TrackOp::Get => Self::Get,
			TrackOp::Has => Self::Has,
			TrackOp::Iterate => Self::Iterate,
		}
	}
}

impl From<TriggerOp> for OpKind {
	fn from(op: TriggerOp) -> Self {
		match op {
			TriggerOp::Set => Self::Set,
			TriggerOp::Add => Self::Add,
			TriggerOp::Delete => Self::Delete,
		}
	}
}

/// A type-erased snapshot of a value involved in a write.
#[derive(Clone)]
pub struct DebugValue(Rc<dyn Any>);

impl DebugValue {
	/// Wraps a value.
	pub fn new<T: Any>(value: T) -> Self {
		Self(Rc::new(value))
	}

	/// Returns the value if it is a `T`.
	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		self.0.downcast_ref::<T>()
	}
}

impl fmt::Debug for DebugValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("DebugValue(..)")
	}
}

/// One dependency interaction observed by a debug hook.
///
/// `old_value` is present for SET and DELETE, `new_value` for SET and ADD.
/// Read events carry neither.
#[derive(Debug, Clone)]
pub struct DebugEvent {
	/// The effect that read or was notified.
	pub effect: EffectId,
	/// The reactive target involved.
	pub target: TargetId,
	/// Operation kind.
	pub kind: OpKind,
	/// The member key involved.
	pub key: Key,
	/// Value before the write.
	pub old_value: Option<DebugValue>,
	/// Value after the write.
	pub new_value: Option<DebugValue>,
}

impl DebugEvent {
	pub(crate) fn track(effect: EffectId, target: TargetId, op: TrackOp, key: Key) -> Self {
		Self {
			effect,
			target,
			kind: op.into(),
			key,
			old_value: None,
			new_value: None,
		}
	}

	/// Downcasts the old value.
	pub fn old_value_as<T: Any>(&self) -> Option<&T> {
		self.old_value.as_ref().and_then(DebugValue::downcast_ref)
	}

	/// Downcasts the new value.
	pub fn new_value_as<T: Any>(&self) -> Option<&T> {
		self.new_value.as_ref().and_then(DebugValue::downcast_ref)
	}
}

/// Callback receiving debug events.
pub type DebugHook = Rc<dyn Fn(&DebugEvent)>;
