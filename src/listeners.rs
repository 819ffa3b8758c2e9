use crate::{
	props::{event_name, EventHandler, HandlerIdentity, Props},
	rc_hash_map::{CountSaturatedError, RcHashMap},
};
use tracing::{error, trace, warn};
use wasm_bindgen::{closure::Closure, JsCast};

/// Native listener closures, shared between all event bindings of the same [`EventHandler`].
///
/// The closure of a handler stays alive while at least one binding references it, and is freed by [`ListenerRegistry::purge`].
#[derive(Debug, Default)]
pub(crate) struct ListenerRegistry {
	handles: RcHashMap<HandlerIdentity, u16, Closure<dyn Fn(web_sys::Event)>>,
}
impl ListenerRegistry {
	pub fn attach(&mut self, target: &web_sys::EventTarget, key: &str, handler: &EventHandler) {
		let name = match event_name(key) {
			Ok(name) => name,
			Err(error) => return warn!("Skipping event handler: {}", error),
		};

		let listener = self.handles.increment_or_insert_with(handler.identity(), || {
			let handler = handler.clone();
			trace!("Created listener closure.");
			Closure::wrap(Box::new(move |event: web_sys::Event| handler.call(event)) as Box<dyn Fn(web_sys::Event)>)
		});
		let listener = match listener {
			Ok(listener) => listener,
			Err(CountSaturatedError) => return error!("Too many (more than 65k) active bindings of the same event handler. Not attaching {:?}.", name),
		};

		match target.add_event_listener_with_callback(&name, listener.as_ref().unchecked_ref()) {
			Ok(()) => trace!("Attached {:?} listener.", name),
			Err(error) => error!("Failed to add event listener {:?}: {:?}", name, error),
		}
	}

	pub fn detach(&mut self, target: &web_sys::EventTarget, key: &str, handler: &EventHandler) {
		let name = match event_name(key) {
			Ok(name) => name,
			// Never attached.
			Err(_) => return,
		};

		match self.handles.weak_decrement(&handler.identity()) {
			Ok(Some(listener)) => match target.remove_event_listener_with_callback(&name, listener.as_ref().unchecked_ref()) {
				Ok(()) => trace!("Detached {:?} listener.", name),
				Err(error) => error!("Failed to remove event listener {:?}: {:?}", name, error),
			},
			Ok(None) => warn!("Tried to detach {:?} listener that was never attached.", name),
			Err(CountSaturatedError) => error!("Tried to detach {:?} listener more often than it was attached.", name),
		}
	}

	/// Releases the bindings in `props` without touching the DOM, for nodes that are being discarded.
	///
	/// Returns how many bindings were released.
	pub fn release(&mut self, props: &Props) -> usize {
		let mut count = 0;
		for (key, handler) in props.handlers() {
			if event_name(key).is_err() {
				continue;
			}
			match self.handles.weak_decrement(&handler.identity()) {
				Ok(Some(_)) => count += 1,
				Ok(None) => warn!("Tried to release a listener that was never attached."),
				Err(CountSaturatedError) => error!("Tried to release a listener more often than it was attached."),
			}
		}
		count
	}

	/// Frees listener closures without remaining bindings.
	pub fn purge(&mut self) -> usize {
		self.handles.purge_weak()
	}

	pub fn len(&self) -> usize {
		self.handles.len()
	}

	pub fn capacity(&self) -> usize {
		self.handles.capacity()
	}
}
