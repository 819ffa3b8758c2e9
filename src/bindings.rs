use crate::vnode::{NodeId, VNode};
use hashbrown::HashMap;
use tracing::{trace, warn};

/// Non-owning association from [`VNode`] identities to the DOM nodes materialized for them.
///
/// The DOM tree owns its nodes; a binding is only a handle and is dropped once its node leaves the rendered tree.
#[derive(Debug, Default)]
pub(crate) struct BindingTable(HashMap<NodeId, web_sys::Node>);
impl BindingTable {
	pub fn get(&self, vnode: &VNode) -> Option<&web_sys::Node> {
		self.0.get(&vnode.id())
	}

	pub fn is_bound(&self, vnode: &VNode) -> bool {
		self.0.contains_key(&vnode.id())
	}

	pub fn bind(&mut self, vnode: &VNode, node: &web_sys::Node) {
		match self.0.insert(vnode.id(), node.clone()) {
			None => trace!(id = ?vnode.id(), "Bound."),
			Some(previous) if previous.is_same_node(Some(node)) => (),
			// Happens only if a node value is reused in a new tree at a different position.
			Some(_) => warn!(id = ?vnode.id(), "Rebound a node to a different DOM node."),
		}
	}

	/// Releases the binding of `vnode` only.
	pub fn unbind(&mut self, vnode: &VNode) {
		if self.0.remove(&vnode.id()).is_some() {
			trace!(id = ?vnode.id(), "Unbound.");
		}
	}

	/// Releases the bindings of `vnode` and its descendants that point into `removed`.
	///
	/// Bindings elsewhere belong to node values that were reused in the new tree and are kept.
	pub fn unbind_tree(&mut self, vnode: &VNode, removed: &web_sys::Node) {
		let inside = self.0.get(&vnode.id()).map_or(false, |bound| removed.contains(Some(bound)));
		if inside {
			self.0.remove(&vnode.id());
			trace!(id = ?vnode.id(), "Unbound.");
		}
		for child in vnode.children() {
			self.unbind_tree(child, removed)
		}
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}
}
