//! Node properties: passthrough values, class flags, inline styles, event handlers and the element `ref`.

use crate::error::PropError;
use core::{
	fmt::{self, Debug, Formatter},
	future::Future,
	pin::Pin,
};
use hashbrown::HashMap;
use std::rc::Rc;
use wasm_bindgen::JsValue;

/// A passthrough prop value, assigned directly as a property of the DOM node.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	Null,
	Bool(bool),
	Number(f64),
	Str(String),
}
impl Value {
	pub(crate) fn to_js(&self) -> JsValue {
		match self {
			Value::Null => JsValue::NULL,
			Value::Bool(b) => JsValue::from_bool(*b),
			Value::Number(n) => JsValue::from_f64(*n),
			Value::Str(s) => JsValue::from_str(s),
		}
	}

	#[must_use]
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::Str(s) => Some(s.as_str()),
			_ => None,
		}
	}
}
impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Value::Str(value.to_owned())
	}
}
impl From<String> for Value {
	fn from(value: String) -> Self {
		Value::Str(value)
	}
}
impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Value::Bool(value)
	}
}
impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Value::Number(value)
	}
}
impl From<i32> for Value {
	fn from(value: i32) -> Self {
		Value::Number(value.into())
	}
}
impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(value: Option<T>) -> Self {
		value.map_or(Value::Null, Into::into)
	}
}

/// An event listener callback.
///
/// Handlers compare by identity: cloning keeps the identity, wrapping the same closure twice doesn't.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn(web_sys::Event)>);
impl EventHandler {
	pub fn new(handler: impl 'static + Fn(web_sys::Event)) -> Self {
		Self(Rc::new(handler))
	}

	pub fn call(&self, event: web_sys::Event) {
		(self.0)(event)
	}

	#[must_use]
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}

	pub(crate) fn identity(&self) -> HandlerIdentity {
		HandlerIdentity(Rc::as_ptr(&self.0).cast::<()>() as usize)
	}
}
impl Debug for EventHandler {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("EventHandler").field(&Rc::as_ptr(&self.0).cast::<()>()).finish()
	}
}

/// Address of a live [`EventHandler`] allocation.
///
/// Only stable while a clone of the handler is held, which the listener registry does for as long as the identity is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct HandlerIdentity(usize);

/// Deferred work returned by a [`RefCallback`]. It's spawned, never awaited.
pub type Deferred = Pin<Box<dyn Future<Output = Result<(), JsValue>>>>;

/// Called once with each element materialized from a node carrying it.
#[derive(Clone)]
pub struct RefCallback(Rc<dyn Fn(&web_sys::Element) -> Option<Deferred>>);
impl RefCallback {
	pub fn new(callback: impl 'static + Fn(&web_sys::Element)) -> Self {
		Self(Rc::new(move |element| {
			callback(element);
			None
		}))
	}

	/// A callback that continues asynchronously. Rejections are logged.
	pub fn deferred<F, Fut>(callback: F) -> Self
	where
		F: 'static + Fn(web_sys::Element) -> Fut,
		Fut: 'static + Future<Output = Result<(), JsValue>>,
	{
		Self(Rc::new(move |element| Some(Box::pin(callback(element.clone())) as Deferred)))
	}

	pub(crate) fn invoke(&self, element: &web_sys::Element) -> Option<Deferred> {
		(self.0)(element)
	}
}
impl Debug for RefCallback {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("RefCallback").field(&Rc::as_ptr(&self.0).cast::<()>()).finish()
	}
}

/// Class name → active flag.
pub type ClassMap = HashMap<String, bool>;

/// Style property name → value. `None` is applied as an empty string.
pub type StyleMap = HashMap<String, Option<String>>;

/// The props of a [`VNode`](`crate::VNode`).
///
/// `class` and `style` are optional as a whole: a missing map and an empty one both clear every previous entry when diffed,
/// but only a present map is reported by [`Props::class_map`] and [`Props::style_map`].
#[derive(Debug, Clone, Default)]
pub struct Props {
	values: HashMap<String, Value>,
	class: Option<ClassMap>,
	style: Option<StyleMap>,
	handlers: HashMap<String, EventHandler>,
	reference: Option<RefCallback>,
}
impl Props {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets a passthrough property, like `id`, `title`, `disabled` or `nodeValue`.
	#[must_use]
	pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.values.insert(key.into(), value.into());
		self
	}

	#[must_use]
	pub fn class(mut self, name: impl Into<String>, active: bool) -> Self {
		self.class.get_or_insert_with(ClassMap::new).insert(name.into(), active);
		self
	}

	/// Replaces the class map. An empty iterator yields a present but empty map.
	#[must_use]
	pub fn classes<K, I>(mut self, classes: I) -> Self
	where
		K: Into<String>,
		I: IntoIterator<Item = (K, bool)>,
	{
		self.class = Some(classes.into_iter().map(|(name, active)| (name.into(), active)).collect());
		self
	}

	#[must_use]
	pub fn style(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.style.get_or_insert_with(StyleMap::new).insert(name.into(), Some(value.into()));
		self
	}

	/// Replaces the style map. An empty iterator yields a present but empty map.
	#[must_use]
	pub fn styles<K, V, I>(mut self, styles: I) -> Self
	where
		K: Into<String>,
		V: Into<String>,
		I: IntoIterator<Item = (K, Option<V>)>,
	{
		self.style = Some(styles.into_iter().map(|(name, value)| (name.into(), value.map(Into::into))).collect());
		self
	}

	/// Binds `handler` under an `on…` key, e.g. `"onClick"`.
	///
	/// The key is validated when the props are applied; invalid keys are skipped with a warning.
	#[must_use]
	pub fn on(self, key: impl Into<String>, handler: impl 'static + Fn(web_sys::Event)) -> Self {
		self.on_handler(key, EventHandler::new(handler))
	}

	#[must_use]
	pub fn on_handler(mut self, key: impl Into<String>, handler: EventHandler) -> Self {
		self.handlers.insert(key.into(), handler);
		self
	}

	#[must_use]
	pub fn with_ref(mut self, reference: RefCallback) -> Self {
		self.reference = Some(reference);
		self
	}

	#[must_use]
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.values.get(key)
	}

	#[must_use]
	pub fn node_value(&self) -> Option<&str> {
		self.get("nodeValue").and_then(Value::as_str)
	}

	pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.values.iter().map(|(k, v)| (k.as_str(), v))
	}

	#[must_use]
	pub fn class_map(&self) -> Option<&ClassMap> {
		self.class.as_ref()
	}

	#[must_use]
	pub fn style_map(&self) -> Option<&StyleMap> {
		self.style.as_ref()
	}

	pub fn handlers(&self) -> impl Iterator<Item = (&str, &EventHandler)> {
		self.handlers.iter().map(|(k, v)| (k.as_str(), v))
	}

	#[must_use]
	pub fn handler(&self, key: &str) -> Option<&EventHandler> {
		self.handlers.get(key)
	}

	#[must_use]
	pub fn reference(&self) -> Option<&RefCallback> {
		self.reference.as_ref()
	}
}

/// Derives the native event name from a handler key: `"onClick"` → `"click"`.
///
/// # Errors
///
/// If `key` doesn't start with `on`, or the remainder isn't an ASCII letter followed by ASCII alphanumerics.
pub fn event_name(key: &str) -> Result<String, PropError> {
	let rest = key.strip_prefix("on").ok_or_else(|| PropError::NotAnEventKey { key: key.to_owned() })?;
	let name = rest.to_ascii_lowercase();
	let starts_with_letter = name.chars().next().map_or(false, |c| c.is_ascii_alphabetic());
	if starts_with_letter && name.chars().all(|c| c.is_ascii_alphanumeric()) {
		Ok(name)
	} else {
		Err(PropError::InvalidEventName { key: key.to_owned(), name })
	}
}
