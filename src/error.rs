use thiserror::Error;
use wasm_bindgen::JsValue;

/// Fatal failures of a [`DomPatcher`](`crate::DomPatcher`) call.
///
/// None of these are retryable: the DOM may have been partially updated already
/// and the caller should not patch again without fixing the tree first.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PatchError {
	/// Wholesale replacement was requested for a node that has no parent in the live document.
	#[error("can't replace <{tag}>: its DOM node has no parent")]
	DetachedRoot { tag: String },

	/// A previous [`VNode`](`crate::VNode`) was reconciled but was never materialized by this patcher.
	#[error("<{tag}> was never materialized by this patcher")]
	Unbound { tag: String },

	#[error("depth limit ({limit}) reached")]
	DepthLimit { limit: usize },

	/// A DOM call that produces or places a node threw.
	#[error("{operation} failed: {message}")]
	Dom { operation: &'static str, message: String },
}

impl PatchError {
	pub(crate) fn dom(operation: &'static str, error: &JsValue) -> Self {
		Self::Dom {
			operation,
			message: js_message(error),
		}
	}
}

/// Rejected prop keys.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropError {
	#[error("{key:?} is not an event handler key (expected `on` followed by an event name)")]
	NotAnEventKey { key: String },

	#[error("{key:?} derives the invalid event name {name:?}")]
	InvalidEventName { key: String, name: String },
}

pub(crate) fn js_message(value: &JsValue) -> String {
	value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
