//! Loading existing DOM content into virtual nodes.

use crate::{props::Props, selector::selector_of, vnode::VNode};

/// Describes `element` as a childless, prop-less [`VNode`] whose type is `element`'s selector (see [`selector_of`]).
///
/// Only the tag, `id` and `class` attribute are read. Patching against the result therefore reuses `element`
/// iff the next node has exactly that selector, and appends the next node's children after any existing content.
#[must_use]
pub fn load_element(element: &web_sys::Element) -> VNode {
	VNode::element(selector_of(element), Props::new(), Vec::new())
}
