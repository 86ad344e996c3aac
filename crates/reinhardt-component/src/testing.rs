//! Test utilities
//!
//! - [`RecordingRenderer`]: a [`Renderer`] that logs every commit
//! - [`HookLog`]: an ordered log that lifecycle hooks can append to

use core::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use super::hooks::{
	on_before_mount, on_before_unmount, on_before_update, on_mounted, on_unmounted, on_updated,
};
use super::instance::InstanceId;
use super::renderer::Renderer;

/// One commit received by a [`RecordingRenderer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOp {
	/// First output of an instance
	Insert {
		/// Instance being committed
		instance: InstanceId,
		/// Its parent, `None` for a root
		parent: Option<InstanceId>,
		/// Rendered content
		output: String,
	},
	/// Re-rendered output of an instance
	Patch {
		/// Instance being committed
		instance: InstanceId,
		/// Rendered content
		output: String,
	},
	/// An instance was removed
	Remove {
		/// Instance being removed
		instance: InstanceId,
	},
}

/// Renderer over `String` output that records commits in order
#[derive(Debug, Default)]
pub struct RecordingRenderer {
	ops: RefCell<Vec<RenderOp>>,
	committed: RefCell<BTreeMap<InstanceId, String>>,
}

impl RecordingRenderer {
	/// Create an empty renderer
	pub fn new() -> Self {
		Self::default()
	}

	/// Every commit so far
	pub fn ops(&self) -> Vec<RenderOp> {
		self.ops.borrow().clone()
	}

	/// Drain the commit log
	pub fn take_ops(&self) -> Vec<RenderOp> {
		self.ops.take()
	}

	/// Currently committed output of `instance`
	pub fn committed(&self, instance: InstanceId) -> Option<String> {
		self.committed.borrow().get(&instance).cloned()
	}

	/// Number of instances with committed output
	pub fn committed_len(&self) -> usize {
		self.committed.borrow().len()
	}
}

impl Renderer for RecordingRenderer {
	type Output = String;

	fn insert(&self, instance: InstanceId, parent: Option<InstanceId>, output: &String) {
		self.committed.borrow_mut().insert(instance, output.clone());
		self.ops.borrow_mut().push(RenderOp::Insert {
			instance,
			parent,
			output: output.clone(),
		});
	}

	fn patch(&self, instance: InstanceId, output: &String) {
		self.committed.borrow_mut().insert(instance, output.clone());
		self.ops.borrow_mut().push(RenderOp::Patch {
			instance,
			output: output.clone(),
		});
	}

	fn remove(&self, instance: InstanceId) {
		self.committed.borrow_mut().remove(&instance);
		self.ops.borrow_mut().push(RenderOp::Remove { instance });
	}
}

/// Shared, ordered log of strings
///
/// Clones append to the same log.
#[derive(Debug, Clone, Default)]
pub struct HookLog(Rc<RefCell<Vec<String>>>);

impl HookLog {
	/// Create an empty log
	pub fn new() -> Self {
		Self::default()
	}

	/// Append an entry
	pub fn record(&self, entry: impl Into<String>) {
		self.0.borrow_mut().push(entry.into());
	}

	/// Every entry so far
	pub fn entries(&self) -> Vec<String> {
		self.0.borrow().clone()
	}

	/// Drop every entry
	pub fn clear(&self) {
		self.0.borrow_mut().clear();
	}

	/// Register all six lifecycle hooks on the current instance
	///
	/// Entries are `{name}.bm`, `.m`, `.bu`, `.u`, `.bum` and `.um`. Call it
	/// from a setup function.
	pub fn log_lifecycle(&self, name: &str) {
		let hook = |suffix: &str| {
			let log = self.clone();
			let entry = format!("{name}.{suffix}");
			move || log.record(entry.clone())
		};
		on_before_mount(hook("bm"));
		on_mounted(hook("m"));
		on_before_update(hook("bu"));
		on_updated(hook("u"));
		on_before_unmount(hook("bum"));
		on_unmounted(hook("um"));
	}
}
