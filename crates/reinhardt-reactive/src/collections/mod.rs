//! Reactive containers
//!
//! Each container wraps one plain aggregate and reports reads and writes to
//! the runtime under its own [`TargetId`]:
//!
//! | Container | Wraps | Member key |
//! |-----------|-------|------------|
//! | [`ReactiveMap`] | `HashMap<K, V>` | `Key::value(k)` |
//! | [`ReactiveSet`] | `HashSet<T>` | `Key::value(t)` |
//! | [`ReactiveVec`] | `Vec<T>` | `Key::Index(i)` |
//! | [`ReactiveRecord`] | `serde_json::Map` | `Key::from(field)` |
//!
//! Clones share storage and identity. Wrapping goes through [`reactive`],
//! which is idempotent: wrapping a container yields the same container.

mod map;
mod record;
mod set;
mod vec;

pub use map::ReactiveMap;
pub use record::ReactiveRecord;
pub use set::ReactiveSet;
pub use vec::ReactiveVec;

use core::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::rc::Rc;

use super::debug::{DebugValue, TrackOp, TriggerOp};
use super::key::Key;
use super::runtime::{TargetId, try_with_runtime, with_runtime};

/// Shared storage of one reactive target
pub(crate) struct TargetCell<S> {
	pub(crate) id: TargetId,
	pub(crate) data: RefCell<S>,
}

impl<S> TargetCell<S> {
	pub(crate) fn new(data: S) -> Rc<Self> {
		Rc::new(Self {
			id: TargetId::new(),
			data: RefCell::new(data),
		})
	}

	pub(crate) fn track(&self, op: TrackOp, key: Key) {
		with_runtime(|rt| rt.track(self.id, op, key));
	}

	/// Notify subscribers. The storage must not be borrowed by the caller.
	pub(crate) fn trigger<F>(&self, op: TriggerOp, key: Key, values: F)
	where
		F: FnOnce() -> (Option<DebugValue>, Option<DebugValue>),
	{
		with_runtime(|rt| rt.trigger(self.id, op, key, values));
	}
}

impl<S> Drop for TargetCell<S> {
	fn drop(&mut self) {
		try_with_runtime(|rt| rt.remove_target(self.id));
	}
}

/// Conversion into a reactive container
///
/// Plain aggregates are wrapped; containers (and references to them) convert
/// to themselves, keeping their identity.
pub trait IntoReactive {
	/// The container produced
	type Reactive;

	/// Performs the conversion
	fn into_reactive(self) -> Self::Reactive;
}

/// Wrap `value` in its reactive container
///
/// # Example
///
/// ```ignore
/// use std::collections::HashMap;
/// use reinhardt_reactive::reactive;
///
/// let state = reactive(HashMap::from([("count", 0)]));
/// let same = reactive(&state);
/// assert!(state.ptr_eq(&same));
/// ```
pub fn reactive<T>(value: T) -> T::Reactive
where
	T: IntoReactive,
{
	value.into_reactive()
}

macro_rules! identity_conversion {
	($container:ident < $($param:ident),+ > where $($bound:tt)+) => {
		impl<$($param),+> IntoReactive for $container<$($param),+>
		where
			$($bound)+
		{
			type Reactive = Self;

			fn into_reactive(self) -> Self {
				self
			}
		}

		impl<$($param),+> IntoReactive for &$container<$($param),+>
		where
			$($bound)+
		{
			type Reactive = $container<$($param),+>;

			fn into_reactive(self) -> Self::Reactive {
				self.clone()
			}
		}
	};
}

identity_conversion!(ReactiveMap<K, V> where K: Eq + Hash + Clone + core::fmt::Debug + 'static, V: 'static);
identity_conversion!(ReactiveSet<T> where T: Eq + Hash + Clone + core::fmt::Debug + 'static);
identity_conversion!(ReactiveVec<T> where T: 'static);

impl<K, V> IntoReactive for HashMap<K, V>
where
	K: Eq + Hash + Clone + core::fmt::Debug + 'static,
	V: 'static,
{
	type Reactive = ReactiveMap<K, V>;

	fn into_reactive(self) -> Self::Reactive {
		ReactiveMap::from(self)
	}
}

impl<T> IntoReactive for HashSet<T>
where
	T: Eq + Hash + Clone + core::fmt::Debug + 'static,
{
	type Reactive = ReactiveSet<T>;

	fn into_reactive(self) -> Self::Reactive {
		ReactiveSet::from(self)
	}
}

impl<T: 'static> IntoReactive for Vec<T> {
	type Reactive = ReactiveVec<T>;

	fn into_reactive(self) -> Self::Reactive {
		ReactiveVec::from(self)
	}
}

impl IntoReactive for serde_json::Map<String, serde_json::Value> {
	type Reactive = ReactiveRecord;

	fn into_reactive(self) -> Self::Reactive {
		ReactiveRecord::from(self)
	}
}

impl IntoReactive for ReactiveRecord {
	type Reactive = Self;

	fn into_reactive(self) -> Self {
		self
	}
}

impl IntoReactive for &ReactiveRecord {
	type Reactive = ReactiveRecord;

	fn into_reactive(self) -> Self::Reactive {
		self.clone()
	}
}
