//! Dependency keys
//!
//! A [`Key`] names one member of a reactive target. Member keys of any
//! `Eq + Hash + Debug` type are type-erased into [`Key::Value`], sequences use
//! [`Key::Index`], and [`Key::Iterate`] is the synthetic structural key shared
//! by enumeration reads and changes to a target's key set.

use core::any::{Any, TypeId};
use core::fmt;
use core::hash::{Hash, Hasher};
use std::rc::Rc;

trait KeyObject: Any + fmt::Debug {
	fn eq_dyn(&self, other: &dyn KeyObject) -> bool;
	fn hash_dyn(&self, state: &mut dyn Hasher);
	fn as_any(&self) -> &dyn Any;
}

impl<T> KeyObject for T
where
	T: Any + fmt::Debug + Eq + Hash,
{
	fn eq_dyn(&self, other: &dyn KeyObject) -> bool {
		other
			.as_any()
			.downcast_ref::<T>()
			.is_some_and(|other| self == other)
	}

	fn hash_dyn(&self, mut state: &mut dyn Hasher) {
		TypeId::of::<T>().hash(&mut state);
		self.hash(&mut state);
	}

	fn as_any(&self) -> &dyn Any {
		self
	}
}

/// A type-erased member key.
///
/// Two value keys are equal only when they wrap the same concrete type and
/// the wrapped values compare equal.
#[derive(Clone)]
pub struct ValueKey(Rc<dyn KeyObject>);

impl ValueKey {
	/// Returns the wrapped key if it is a `T`.
	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		self.0.as_any().downcast_ref::<T>()
	}
}

impl PartialEq for ValueKey {
	fn eq(&self, other: &Self) -> bool {
		self.0.eq_dyn(&*other.0)
	}
}

impl Eq for ValueKey {}

impl Hash for ValueKey {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.0.hash_dyn(state);
	}
}

impl fmt::Debug for ValueKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(&*self.0, f)
	}
}

/// Identifies one dependency entry of a reactive target.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Key {
	/// A named member (map key, record field, set element).
	Value(ValueKey),
	/// A position in a sequence.
	Index(usize),
	/// Structural reads over the whole key set.
	Iterate,
}

impl Key {
	/// Wraps any hashable value as a member key.
	pub fn value<T>(value: T) -> Self
	where
		T: Any + fmt::Debug + Eq + Hash,
	{
		Self::Value(ValueKey(Rc::new(value)))
	}

	/// Returns the member key as a string slice when it wraps a `String` or `&'static str`.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Value(key) => key
				.downcast_ref::<String>()
				.map(String::as_str)
				.or_else(|| key.downcast_ref::<&'static str>().copied()),
			_ => None,
		}
	}

	/// Whether this is the synthetic structural key.
	pub fn is_iterate(&self) -> bool {
		matches!(self, Self::Iterate)
	}
}

impl From<&str> for Key {
	fn from(value: &str) -> Self {
		Self::value(value.to_owned())
	}
}

impl From<String> for Key {
	fn from(value: String) -> Self {
		Self::value(value)
	}
}

impl fmt::Debug for Key {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Value(key) => write!(f, "{key:?}"),
			Self::Index(index) => write!(f, "[{index}]"),
			Self::Iterate => f.write_str("<iterate>"),
		}
	}
}

impl fmt::Display for Key {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(self, f)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::collections::hash_map::DefaultHasher;

	fn hash_of(key: &Key) -> u64 {
		let mut hasher = DefaultHasher::new();
		key.hash(&mut hasher);
		hasher.finish()
	}

	#[rstest]
	fn test_value_keys_compare_by_type_and_value() {
		assert_eq!(Key::from("count"), Key::value(String::from("count")));
		assert_ne!(Key::from("count"), Key::value("count"));
		assert_ne!(Key::value(1_i32), Key::value(1_i64));
		assert_eq!(hash_of(&Key::value(7_u8)), hash_of(&Key::value(7_u8)));
	}

	#[rstest]
	#[case(Key::Index(0), Key::Index(1))]
	#[case(Key::Iterate, Key::from("iterate"))]
	fn test_distinct_keys(#[case] left: Key, #[case] right: Key) {
		assert_ne!(left, right);
	}

	#[rstest]
	fn test_as_str() {
		assert_eq!(Key::from("name").as_str(), Some("name"));
		assert_eq!(Key::value("static").as_str(), Some("static"));
		assert_eq!(Key::Index(3).as_str(), None);
		assert!(Key::Iterate.is_iterate());
	}
}
