//! The virtual node tree.

use crate::props::Props;
use core::{
	fmt::{self, Display, Formatter},
	sync::atomic::{AtomicU64, Ordering},
};
use std::borrow::Cow;

/// Identity of a [`VNode`], used to look up its DOM binding.
///
/// Each constructed node gets a fresh one. Clones share it, so a cloned node is the *same* node as far as patching is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);
impl NodeId {
	fn next() -> Self {
		static NEXT: AtomicU64 = AtomicU64::new(0);
		Self(NEXT.fetch_add(1, Ordering::Relaxed))
	}
}

/// What kind of DOM node a [`VNode`] describes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeType {
	/// A text node. Its content is the `nodeValue` prop.
	Text,
	/// An element, described by a selector like `"li"` or `"section#main.wide"`.
	Element(Cow<'static, str>),
}
impl NodeType {
	#[must_use]
	pub fn is_text(&self) -> bool {
		matches!(self, NodeType::Text)
	}
}
impl Display for NodeType {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			NodeType::Text => f.write_str("#text"),
			NodeType::Element(selector) => f.write_str(selector),
		}
	}
}

/// Optional identity hint among siblings, consulted only by [`ChildMatching::Keyed`](`crate::ChildMatching::Keyed`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
	Int(i64),
	Str(Cow<'static, str>),
}
impl From<i64> for Key {
	fn from(key: i64) -> Self {
		Key::Int(key)
	}
}
impl From<i32> for Key {
	fn from(key: i32) -> Self {
		Key::Int(key.into())
	}
}
impl From<&'static str> for Key {
	fn from(key: &'static str) -> Self {
		Key::Str(Cow::Borrowed(key))
	}
}
impl From<String> for Key {
	fn from(key: String) -> Self {
		Key::Str(Cow::Owned(key))
	}
}

/// A lightweight description of a desired element or text run.
///
/// Nodes are immutable once built. Their DOM binding lives in the [`DomPatcher`](`crate::DomPatcher`) that materialized them.
#[derive(Debug, Clone)]
pub struct VNode {
	id: NodeId,
	node_type: NodeType,
	props: Props,
	children: Vec<VNode>,
	key: Option<Key>,
}
impl VNode {
	/// An element node. Text children must already be wrapped, see [`h`] for the convenient form.
	#[must_use]
	pub fn element(selector: impl Into<Cow<'static, str>>, props: Props, children: Vec<VNode>) -> Self {
		Self {
			id: NodeId::next(),
			node_type: NodeType::Element(selector.into()),
			props,
			children,
			key: None,
		}
	}

	/// A text node with additional `props`. `nodeValue` is set to `value`.
	#[must_use]
	pub fn text_with_props(value: impl Into<String>, props: Props) -> Self {
		Self {
			id: NodeId::next(),
			node_type: NodeType::Text,
			props: props.set("nodeValue", value.into()),
			children: Vec::new(),
			key: None,
		}
	}

	#[must_use]
	pub fn with_key(mut self, key: impl Into<Key>) -> Self {
		self.key = Some(key.into());
		self
	}

	#[must_use]
	pub fn id(&self) -> NodeId {
		self.id
	}

	#[must_use]
	pub fn node_type(&self) -> &NodeType {
		&self.node_type
	}

	#[must_use]
	pub fn props(&self) -> &Props {
		&self.props
	}

	#[must_use]
	pub fn children(&self) -> &[VNode] {
		&self.children
	}

	#[must_use]
	pub fn key(&self) -> Option<&Key> {
		self.key.as_ref()
	}

	#[must_use]
	pub fn is_text(&self) -> bool {
		self.node_type.is_text()
	}
}
impl From<&str> for VNode {
	fn from(value: &str) -> Self {
		text(value)
	}
}
impl From<String> for VNode {
	fn from(value: String) -> Self {
		text(value)
	}
}

/// Builds an element node. String children become text nodes.
///
/// ```
/// use vnode_dom::{h, Props};
///
/// let list = h("ul#items", Props::new(), vec![h("li", Props::new().class("done", true), vec!["1"])]);
/// assert_eq!(list.children().len(), 1);
/// assert!(list.children()[0].children()[0].is_text());
/// ```
#[must_use]
pub fn h<C: Into<VNode>>(selector: impl Into<Cow<'static, str>>, props: Props, children: impl IntoIterator<Item = C>) -> VNode {
	VNode::element(selector, props, children.into_iter().map(Into::into).collect())
}

/// Builds a text node.
#[must_use]
pub fn text(value: impl Into<String>) -> VNode {
	VNode::text_with_props(value, Props::new())
}
