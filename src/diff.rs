use crate::{
	bindings::BindingTable,
	error::{js_message, PatchError},
	keyed::{self, DuplicateKey, Edit},
	listeners::ListenerRegistry,
	load::load_element,
	options::{ChildMatching, KeyFn, PatcherOptions},
	props::{Props, RefCallback},
	redact::Redacted,
	selector::{parse_selector, Selector},
	vnode::{NodeType, VNode},
};
use js_sys::Reflect;
use tracing::{debug, error, info, instrument, trace, trace_span, warn};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
const MATHML_NAMESPACE: &str = "http://www.w3.org/1998/Math/MathML";

/// The previous state passed to [`DomPatcher::patch`].
#[derive(Debug, Clone)]
pub enum PatchTarget<'a> {
	/// A tree this patcher materialized or reconciled before.
	VNode(&'a VNode),
	/// A live element that wasn't rendered by this patcher, typically the mount point.
	///
	/// It's wrapped as by [`load_element`] first.
	Element(web_sys::Element),
}
impl<'a> From<&'a VNode> for PatchTarget<'a> {
	fn from(vnode: &'a VNode) -> Self {
		Self::VNode(vnode)
	}
}
impl From<web_sys::Element> for PatchTarget<'_> {
	fn from(element: web_sys::Element) -> Self {
		Self::Element(element)
	}
}
impl From<&web_sys::Element> for PatchTarget<'_> {
	fn from(element: &web_sys::Element) -> Self {
		Self::Element(element.clone())
	}
}

/// Materializes [`VNode`] trees into a [`web_sys::Document`] and patches them in place.
///
/// The patcher owns the bindings from virtual nodes to the DOM nodes they produced,
/// and the native closures behind all event listeners it attached.
///
/// # Correct Use
///
/// Each [`DomPatcher::patch`] call must receive as previous tree the one that was last rendered into that location
/// by the same patcher.
///
/// Event listeners attached by a patcher start throwing errors into JavaScript if the instance is dropped
/// while their elements are still part of the document.
#[derive(Debug)]
pub struct DomPatcher {
	document: web_sys::Document,
	options: PatcherOptions,
	bindings: BindingTable,
	listeners: ListenerRegistry,
}
impl DomPatcher {
	#[must_use]
	pub fn new(document: web_sys::Document) -> Self {
		Self::with_options(document, PatcherOptions::default())
	}

	#[must_use]
	#[instrument(skip(document))]
	pub fn with_options(document: web_sys::Document, options: PatcherOptions) -> Self {
		Self {
			document,
			options,
			bindings: BindingTable::default(),
			listeners: ListenerRegistry::default(),
		}
	}

	/// A patcher for the document of the global `window`.
	///
	/// # Errors
	///
	/// Iff there is no global `window` or it has no document, e.g. inside a worker.
	pub fn for_window() -> Result<Self, PatchError> {
		let document = web_sys::window().and_then(|window| window.document()).ok_or_else(|| PatchError::Dom {
			operation: "window.document",
			message: "no global document".to_owned(),
		})?;
		Ok(Self::new(document))
	}

	#[must_use]
	pub fn options(&self) -> &PatcherOptions {
		&self.options
	}

	/// The DOM node `vnode` is currently bound to.
	///
	/// A previous node's binding is released once a patch moves it onto the next node.
	#[must_use]
	pub fn dom(&self, vnode: &VNode) -> Option<&web_sys::Node> {
		self.bindings.get(vnode)
	}

	#[must_use]
	pub fn binding_count(&self) -> usize {
		self.bindings.len()
	}

	/// Number of distinct event handlers with live listener closures.
	#[must_use]
	pub fn listener_count(&self) -> usize {
		self.listeners.len()
	}

	/// Wraps `element` as by [`load_element`] and binds it, so that it can be passed to [`DomPatcher::patch`] as previous tree.
	pub fn adopt(&mut self, element: &web_sys::Element) -> VNode {
		let vnode = load_element(element);
		self.bindings.bind(&vnode, element.as_ref());
		vnode
	}

	/// Creates the DOM subtree for `vnode` and binds each node in it.
	///
	/// The result isn't inserted anywhere. Its bindings are only released once a later [`DomPatcher::patch`] removes or replaces it.
	///
	/// # Errors
	///
	/// If the platform refuses to create or append a node, or the tree is nested deeper than the depth limit.
	#[instrument(skip(self, vnode), fields(node = %vnode.node_type()))]
	pub fn materialize(&mut self, vnode: &VNode) -> Result<web_sys::Node, PatchError> {
		let result = self.create(vnode, Namespace::Html, self.options.depth_limit);
		self.finish_pass();
		result
	}

	/// Applies the difference between `previous` and `next` props to `node`.
	///
	/// Failing property writes are logged and skipped.
	#[instrument(skip(self, previous, next))]
	pub fn apply_props<'a>(&mut self, node: &'a web_sys::Node, previous: &Props, next: &Props) -> &'a web_sys::Node {
		self.update_props(node, previous, next);
		self.finish_pass();
		node
	}

	/// Updates the DOM from `old` to match `next`, binding `next` and its descendants.
	///
	/// # Errors
	///
	/// - [`PatchError::DetachedRoot`] if `old` and `next` differ in type and `old`'s DOM node has no parent,
	/// - [`PatchError::Unbound`] if a node of `old` was never materialized by this patcher,
	/// - [`PatchError::DepthLimit`] and [`PatchError::Dom`] as for [`DomPatcher::materialize`].
	///
	/// The DOM may already be partially updated when an error is returned.
	#[instrument(skip(self, old, next), fields(next = %next.node_type()))]
	pub fn patch<'a>(&mut self, old: impl Into<PatchTarget<'a>>, next: &VNode) -> Result<(), PatchError> {
		let adopted = match old.into() {
			PatchTarget::VNode(old) => {
				let result = self.patch_node(old, next, self.options.depth_limit);
				self.finish_pass();
				return result;
			}
			PatchTarget::Element(element) => self.adopt(&element),
		};
		trace!(old = %adopted.node_type(), "Adopted live element.");

		let result = self.patch_node(&adopted, next, self.options.depth_limit);
		if result.is_err() {
			// Nothing outside this call can refer to the synthesized wrapper.
			self.bindings.unbind(&adopted);
		}
		self.finish_pass();
		result
	}

	fn finish_pass(&mut self) {
		let freed = self.listeners.purge();
		if freed > 0 {
			trace!("Freed {} listener closure(s).", freed);
		}
		info!(
			"Listener closure count/cached capacity: {}/{}, bound nodes: {}",
			self.listeners.len(),
			self.listeners.capacity(),
			self.bindings.len()
		);
	}

	fn depth_check(&self, depth_limit: usize) -> Result<(), PatchError> {
		if depth_limit == 0 {
			error!("Depth limit reached");
			Err(PatchError::DepthLimit { limit: self.options.depth_limit })
		} else {
			Ok(())
		}
	}

	fn bound(&self, vnode: &VNode) -> Result<web_sys::Node, PatchError> {
		self.bindings.get(vnode).cloned().ok_or_else(|| {
			error!(node = %vnode.node_type(), "Expected a bound node.");
			PatchError::Unbound {
				tag: vnode.node_type().to_string(),
			}
		})
	}

	fn create(&mut self, vnode: &VNode, namespace: Namespace, depth_limit: usize) -> Result<web_sys::Node, PatchError> {
		self.depth_check(depth_limit)?;

		let selector = match vnode.node_type() {
			NodeType::Text => {
				let text = vnode.props().node_value().unwrap_or_default();
				let span = trace_span!("Creating text node", text = ?Redacted(text));
				let _enter = span.enter();

				if vnode.props().reference().is_some() {
					trace!("Not invoking `ref` of text node.");
				}

				let node: web_sys::Node = self.document.create_text_node(text).into();
				self.update_props(&node, &Props::new(), vnode.props());
				self.bindings.bind(vnode, &node);
				return Ok(node);
			}
			NodeType::Element(selector) => selector,
		};

		let Selector { tag, id, class_name } = parse_selector(selector);
		let namespace = namespace.for_element(tag);
		let span = trace_span!("Creating element", tag, ?namespace, children = vnode.children().len());
		let _enter = span.enter();

		let element = match namespace.uri() {
			None => self.document.create_element(tag),
			Some(uri) => self.document.create_element_ns(Some(uri), tag),
		}
		.map_err(|error| {
			error!("Failed to create <{}>: {:?}", tag, error);
			PatchError::dom("createElement", &error)
		})?;
		if let Some(id) = id {
			element.set_id(id);
		}
		if let Some(class_name) = class_name {
			if let Err(error) = element.set_attribute("class", &class_name) {
				warn!("Could not set class {:?}: {:?}", Redacted(&class_name), error);
			}
		}

		let node: &web_sys::Node = element.as_ref();
		self.update_props(node, &Props::new(), vnode.props());

		let child_namespace = namespace.for_children(tag);
		for child in vnode.children() {
			let child_node = self.create(child, child_namespace, depth_limit - 1)?;
			node.append_child(&child_node).map_err(|error| PatchError::dom("appendChild", &error))?;
		}

		self.bindings.bind(vnode, node);
		if let Some(reference) = vnode.props().reference() {
			invoke_ref(reference, &element);
		}
		Ok(node.clone())
	}

	#[allow(clippy::similar_names)]
	fn update_props(&mut self, node: &web_sys::Node, previous: &Props, next: &Props) {
		#[instrument(skip(value))]
		fn set_property(node: &web_sys::Node, key: &str, value: &JsValue) {
			match Reflect::set(node, &JsValue::from_str(key), value) {
				Ok(true) => trace!(value = ?Redacted(value), "Set property."),
				Ok(false) => warn!("Property {:?} is read-only.", key),
				Err(error) => warn!("Could not set property {:?}: {}", key, js_message(&error)),
			}
		}

		#[instrument(skip(value))]
		fn set_style(node: &web_sys::Node, name: &str, value: &str) {
			let style = match Reflect::get(node, &JsValue::from_str("style")) {
				Ok(style) if style.is_object() => style,
				_ => return warn!("Node has no inline style. Skipping {:?}.", name),
			};
			if let Err(error) = Reflect::set(&style, &JsValue::from_str(name), &JsValue::from_str(value)) {
				warn!("Could not set style {:?}: {}", name, js_message(&error));
			}
		}

		#[instrument]
		fn set_class(node: &web_sys::Node, name: &str, active: bool) {
			let element = match node.dyn_ref::<web_sys::Element>() {
				Some(element) => element,
				None => return warn!("Only elements have classes. Skipping {:?}.", name),
			};
			let class_list = element.class_list();
			let result = if active { class_list.add_1(name) } else { class_list.remove_1(name) };
			if let Err(error) = result {
				warn!("Could not update class {:?}: {}", name, js_message(&error));
			}
		}

		let target: &web_sys::EventTarget = node.as_ref();

		// Stale event listeners.
		for (key, handler) in previous.handlers() {
			if next.handler(key).map_or(true, |next| !next.ptr_eq(handler)) {
				self.listeners.detach(target, key, handler);
			}
		}

		// Stale style entries.
		if let Some(previous_style) = previous.style_map() {
			for name in previous_style.keys() {
				if next.style_map().map_or(true, |next_style| !next_style.contains_key(name)) {
					set_style(node, name, "");
				}
			}
		}

		// Stale class entries.
		if let Some(previous_class) = previous.class_map() {
			for name in previous_class.keys() {
				if next.class_map().map_or(true, |next_class| !next_class.contains_key(name)) {
					set_class(node, name, false);
				}
			}
		}

		// Removed plain props.
		for (key, _) in previous.values() {
			if next.get(key).is_none() {
				set_property(node, key, &JsValue::from_str(""));
			}
		}

		// Added or changed plain props.
		for (key, value) in next.values() {
			if previous.get(key) != Some(value) {
				set_property(node, key, &value.to_js());
			}
		}

		if let Some(next_class) = next.class_map() {
			let previous_class = previous.class_map();
			for (name, &active) in next_class {
				if previous_class.and_then(|previous_class| previous_class.get(name)) != Some(&active) {
					set_class(node, name, active);
				}
			}
		}

		if let Some(next_style) = next.style_map() {
			let previous_style = previous.style_map();
			for (name, value) in next_style {
				if previous_style.and_then(|previous_style| previous_style.get(name)) != Some(value) {
					set_style(node, name, value.as_deref().unwrap_or_default());
				}
			}
		}

		// New or changed event listeners.
		for (key, handler) in next.handlers() {
			if previous.handler(key).map_or(true, |previous| !previous.ptr_eq(handler)) {
				self.listeners.attach(target, key, handler);
			}
		}
	}

	fn patch_node(&mut self, old: &VNode, next: &VNode, depth_limit: usize) -> Result<(), PatchError> {
		self.depth_check(depth_limit)?;

		if old.node_type() == next.node_type() {
			return self.patch_in_place(old, next, depth_limit);
		}

		let span = trace_span!("Replacing mismatching", old = %old.node_type(), next = %next.node_type());
		let _enter = span.enter();

		let old_dom = self.bound(old)?;
		let parent = old_dom.parent_node().ok_or_else(|| {
			error!("Can't replace a node without parent.");
			PatchError::DetachedRoot {
				tag: old.node_type().to_string(),
			}
		})?;

		let new_dom = self.create(next, Namespace::of_container(&parent), depth_limit)?;
		parent
			.insert_before(&new_dom, old_dom.next_sibling().as_ref())
			.map_err(|error| PatchError::dom("insertBefore", &error))?;
		parent.remove_child(&old_dom).map_err(|error| PatchError::dom("removeChild", &error))?;
		self.discard(old, &old_dom);
		Ok(())
	}

	/// Reuses `old`'s DOM node for `next`, which must have the same type.
	fn patch_in_place(&mut self, old: &VNode, next: &VNode, depth_limit: usize) -> Result<(), PatchError> {
		debug_assert_eq!(old.node_type(), next.node_type());
		self.depth_check(depth_limit)?;

		let span = trace_span!("Patching in place", node = %next.node_type(), same_node = old.id() == next.id());
		let _enter = span.enter();

		let dom = self.bound(old)?;
		self.update_props(&dom, old.props(), next.props());
		if old.id() != next.id() {
			self.bindings.unbind(old);
		}
		self.bindings.bind(next, &dom);

		if next.is_text() {
			return Ok(());
		}
		self.patch_children(&dom, old.children(), next.children(), depth_limit - 1)
	}

	fn patch_children(&mut self, container: &web_sys::Node, old: &[VNode], new: &[VNode], depth_limit: usize) -> Result<(), PatchError> {
		if old.is_empty() && new.is_empty() {
			return Ok(());
		}
		self.depth_check(depth_limit)?;

		let key_fn = match &self.options.child_matching {
			ChildMatching::Keyed(key_fn) => Some(key_fn.clone()),
			ChildMatching::Positional => None,
		};
		if let Some(key_fn) = key_fn {
			if self.patch_keyed_children(container, old, new, &key_fn, depth_limit)? {
				return Ok(());
			}
		}
		self.patch_positional_children(container, old, new, depth_limit)
	}

	fn patch_positional_children(&mut self, container: &web_sys::Node, old: &[VNode], new: &[VNode], depth_limit: usize) -> Result<(), PatchError> {
		let span = trace_span!("Diffing children", old = old.len(), new = new.len());
		let _enter = span.enter();
		let namespace = Namespace::of_container(container);

		let mut old_i = 0;
		let mut new_i = 0;
		while old_i < old.len() && new_i < new.len() {
			let old_child = &old[old_i];
			// The candidate is looked up at the old cursor.
			match new.get(old_i) {
				Some(candidate) if candidate.node_type() == old_child.node_type() => {
					self.patch_in_place(old_child, candidate, depth_limit)?;
					old_i += 1;
					new_i += 1;
				}
				Some(candidate) if !self.bindings.is_bound(candidate) => {
					trace!(old_i, new_i, node = %candidate.node_type(), "Inserting");
					let reference = self.bound(old_child)?;
					let node = self.create(candidate, namespace, depth_limit)?;
					container
						.insert_before(&node, Some(&reference))
						.map_err(|error| PatchError::dom("insertBefore", &error))?;
					new_i += 1;
				}
				_ => {
					trace!(old_i, new_i, node = %old_child.node_type(), "Removing");
					self.remove_child(container, old_child)?;
					old_i += 1;
				}
			}
		}

		for old_child in &old[old_i..] {
			self.remove_child(container, old_child)?;
		}

		for new_child in &new[new_i..] {
			let node = self.create(new_child, namespace, depth_limit)?;
			container.append_child(&node).map_err(|error| PatchError::dom("appendChild", &error))?;
		}
		Ok(())
	}

	/// Returns `Ok(false)` without touching the DOM if the children aren't fully and uniquely keyed.
	fn patch_keyed_children(&mut self, container: &web_sys::Node, old: &[VNode], new: &[VNode], key_fn: &KeyFn, depth_limit: usize) -> Result<bool, PatchError> {
		let span = trace_span!("Diffing keyed children", old = old.len(), new = new.len());
		let _enter = span.enter();

		let old_keys: Option<Vec<_>> = old.iter().map(|child| key_fn(child).map(|key| (key, child.node_type()))).collect();
		let new_keys: Option<Vec<_>> = new.iter().map(|child| key_fn(child).map(|key| (key, child.node_type()))).collect();
		let (old_keys, new_keys) = match (old_keys, new_keys) {
			(Some(old_keys), Some(new_keys)) => (old_keys, new_keys),
			_ => {
				debug!("Not every child has a key. Matching positionally.");
				return Ok(false);
			}
		};

		let plan = match keyed::plan(&old_keys, &new_keys) {
			Ok(plan) => plan,
			Err(DuplicateKey { new_idx }) => {
				warn!(key = ?Redacted(&new_keys[new_idx].0), "Duplicate key. Matching positionally.");
				return Ok(false);
			}
		};
		trace!(stats = ?plan.stats, "Planned keyed transition.");

		for edit in &plan.edits {
			if let Edit::Delete { old_idx } = *edit {
				self.remove_child(container, &old[old_idx])?;
			}
		}

		let namespace = Namespace::of_container(container);
		let mut next_sibling: Option<web_sys::Node> = None;
		for edit in plan.placements().rev() {
			let node = match *edit {
				Edit::Keep { old_idx, new_idx } => {
					self.patch_in_place(&old[old_idx], &new[new_idx], depth_limit)?;
					self.bound(&new[new_idx])?
				}
				Edit::Move { old_idx, new_idx } => {
					self.patch_in_place(&old[old_idx], &new[new_idx], depth_limit)?;
					let node = self.bound(&new[new_idx])?;
					container
						.insert_before(&node, next_sibling.as_ref())
						.map_err(|error| PatchError::dom("insertBefore", &error))?;
					node
				}
				Edit::Insert { new_idx } => {
					let node = self.create(&new[new_idx], namespace, depth_limit)?;
					container
						.insert_before(&node, next_sibling.as_ref())
						.map_err(|error| PatchError::dom("insertBefore", &error))?;
					node
				}
				Edit::Delete { .. } => continue,
			};
			next_sibling = Some(node);
		}
		Ok(true)
	}

	fn remove_child(&mut self, container: &web_sys::Node, old_child: &VNode) -> Result<(), PatchError> {
		let dom = self.bound(old_child)?;
		container.remove_child(&dom).map_err(|error| PatchError::dom("removeChild", &error))?;
		self.discard(old_child, &dom);
		Ok(())
	}

	/// Releases listeners and bindings of a subtree that was removed from the document.
	fn discard(&mut self, vnode: &VNode, removed: &web_sys::Node) {
		fn release_listeners(listeners: &mut ListenerRegistry, vnode: &VNode) -> usize {
			listeners.release(vnode.props()) + vnode.children().iter().map(|child| release_listeners(listeners, child)).sum::<usize>()
		}

		let released = release_listeners(&mut self.listeners, vnode);
		if released > 0 {
			trace!("Released {} event binding(s) of the removed subtree.", released);
		}
		self.bindings.unbind_tree(vnode, removed);
	}
}

fn invoke_ref(reference: &RefCallback, element: &web_sys::Element) {
	let span = trace_span!("Invoking ref");
	let _enter = span.enter();
	if let Some(deferred) = reference.invoke(element) {
		trace!("Spawning deferred ref.");
		spawn_local(async move {
			if let Err(error) = deferred.await {
				error!("Deferred ref failed: {}", js_message(&error));
			}
		});
	}
}

/// The namespace new elements are created in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Namespace {
	Html,
	Svg,
	MathMl,
}
impl Namespace {
	fn uri(self) -> Option<&'static str> {
		match self {
			Namespace::Html => None,
			Namespace::Svg => Some(SVG_NAMESPACE),
			Namespace::MathMl => Some(MATHML_NAMESPACE),
		}
	}

	/// The namespace of an element with `tag` inside `self`.
	fn for_element(self, tag: &str) -> Self {
		match tag {
			"svg" => Namespace::Svg,
			"math" => Namespace::MathMl,
			_ => self,
		}
	}

	/// The namespace of children of an element with `tag` in `self`.
	fn for_children(self, tag: &str) -> Self {
		match (self, tag) {
			(Namespace::Svg, "foreignObject") => Namespace::Html,
			_ => self,
		}
	}

	fn of_container(container: &web_sys::Node) -> Self {
		let element = match container.dyn_ref::<web_sys::Element>() {
			Some(element) => element,
			None => return Namespace::Html,
		};
		let namespace = match element.namespace_uri().as_deref() {
			Some(SVG_NAMESPACE) => Namespace::Svg,
			Some(MATHML_NAMESPACE) => Namespace::MathMl,
			_ => Namespace::Html,
		};
		namespace.for_children(&element.local_name())
	}
}
