//! Component definitions and render output

use core::fmt;
use std::rc::Rc;

/// A boxed render function produced by a component's setup
pub type RenderFn<O> = Box<dyn FnMut() -> View<O>>;

/// A component definition
///
/// The setup function runs once per instance. It registers lifecycle hooks
/// and returns the render function, which is re-run by the instance's render
/// effect whenever the state it read changes.
///
/// Clones share identity; two definitions are the same component only when
/// one was cloned from the other.
///
/// # Example
///
/// ```ignore
/// use reinhardt_component::{Component, View, on_mounted};
/// use reinhardt_reactive::Signal;
///
/// let count = Signal::new(0);
/// let counter = Component::new("Counter", move || {
///     on_mounted(|| tracing::info!("counter mounted"));
///     let count = count.clone();
///     move || View::new(format!("count: {}", count.get()))
/// });
/// ```
pub struct Component<O> {
	name: Rc<str>,
	setup: Rc<dyn Fn() -> RenderFn<O>>,
}

impl<O: 'static> Component<O> {
	/// Define a component from its setup function
	pub fn new<S, F>(name: &str, setup: S) -> Self
	where
		S: Fn() -> F + 'static,
		F: FnMut() -> View<O> + 'static,
	{
		Self {
			name: Rc::from(name),
			setup: Rc::new(move || Box::new(setup()) as RenderFn<O>),
		}
	}

	/// The component's name, used in diagnostics and logs
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Whether both handles refer to the same definition
	pub fn is_same(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.setup, &other.setup)
	}

	pub(crate) fn setup(&self) -> RenderFn<O> {
		(self.setup)()
	}
}

impl<O> Clone for Component<O> {
	fn clone(&self) -> Self {
		Self {
			name: Rc::clone(&self.name),
			setup: Rc::clone(&self.setup),
		}
	}
}

impl<O> fmt::Debug for Component<O> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Component")
			.field("name", &self.name)
			.finish_non_exhaustive()
	}
}

/// Output of one render: the instance's own content plus keyed child components
#[derive(Debug, Clone)]
pub struct View<O> {
	/// Content committed through the renderer
	pub content: O,
	/// Child components, in order
	pub children: Vec<Child<O>>,
}

impl<O: 'static> View<O> {
	/// A view without children
	pub fn new(content: O) -> Self {
		Self {
			content,
			children: Vec::new(),
		}
	}

	/// Append a keyed child component
	pub fn with_child(mut self, key: &str, component: &Component<O>) -> Self {
		self.children.push(Child {
			key: Rc::from(key),
			component: component.clone(),
		});
		self
	}
}

/// A keyed child declared by a [`View`]
///
/// Across renders, a child with the same key and the same component
/// definition is kept; anything else is unmounted or mounted anew.
#[derive(Debug, Clone)]
pub struct Child<O> {
	/// Key identifying the child among its siblings
	pub key: Rc<str>,
	/// The child's definition
	pub component: Component<O>,
}
