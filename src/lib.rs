#![doc(html_root_url = "https://docs.rs/vnode-dom/0.1.0")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! A minimal virtual DOM.
//!
//! Describe the UI as a tree of [`VNode`]s (usually built with [`h`]), then let a [`DomPatcher`]
//! [materialize](`DomPatcher::materialize`) it into [`web_sys`] nodes and [patch](`DomPatcher::patch`)
//! the live document towards each next tree.
//!
//! Children are matched by position and node type unless [`ChildMatching::Keyed`] is configured.

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

mod bindings;
mod diff;
mod error;
pub mod keyed;
mod listeners;
pub mod load;
mod options;
mod props;
mod rc_hash_map;
mod redact;
pub mod selector;
mod vnode;

pub use diff::{DomPatcher, PatchTarget};
pub use error::{PatchError, PropError};
pub use options::{ChildMatching, KeyFn, PatcherOptions};
pub use props::{event_name, ClassMap, Deferred, EventHandler, Props, RefCallback, StyleMap, Value};
pub use vnode::{h, text, Key, NodeId, NodeType, VNode};
