use crate::vnode::{Key, VNode};
use core::fmt::{self, Debug, Formatter};
use std::rc::Rc;

/// Extracts the matching key of a child node.
pub type KeyFn = Rc<dyn Fn(&VNode) -> Option<Key>>;

/// How the children of a reused element are matched between renders.
#[derive(Clone)]
pub enum ChildMatching {
	/// By position and node type. This is the default.
	Positional,
	/// By key, moving reused children where necessary.
	///
	/// If any child on either side has no key, or a key repeats among the next children,
	/// that child list is matched positionally instead.
	Keyed(KeyFn),
}
impl ChildMatching {
	/// Keyed matching on [`VNode::key`].
	#[must_use]
	pub fn by_key() -> Self {
		Self::Keyed(Rc::new(|vnode| vnode.key().cloned()))
	}
}
impl Default for ChildMatching {
	fn default() -> Self {
		Self::Positional
	}
}
impl Debug for ChildMatching {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Self::Positional => f.write_str("Positional"),
			Self::Keyed(key_fn) => f.debug_tuple("Keyed").field(&Rc::as_ptr(key_fn).cast::<()>()).finish(),
		}
	}
}

/// Configuration of a [`DomPatcher`](`crate::DomPatcher`).
#[derive(Debug, Clone)]
pub struct PatcherOptions {
	/// Maximum node nesting that is materialized or reconciled.
	pub depth_limit: usize,
	pub child_matching: ChildMatching,
}
impl PatcherOptions {
	pub const DEFAULT_DEPTH_LIMIT: usize = 1024;

	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn depth_limit(mut self, depth_limit: usize) -> Self {
		self.depth_limit = depth_limit;
		self
	}

	#[must_use]
	pub fn child_matching(mut self, child_matching: ChildMatching) -> Self {
		self.child_matching = child_matching;
		self
	}
}
impl Default for PatcherOptions {
	fn default() -> Self {
		Self {
			depth_limit: Self::DEFAULT_DEPTH_LIMIT,
			child_matching: ChildMatching::default(),
		}
	}
}
