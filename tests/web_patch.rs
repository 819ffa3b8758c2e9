#![cfg(target_arch = "wasm32")]

use std::{cell::Cell, rc::Rc};
use vnode_dom::{h, text, ChildMatching, PatchError, PatcherOptions, Props, VNode};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{HtmlElement, HtmlInputElement};

wasm_bindgen_test_configure!(run_in_browser);

use web_setup_::{as_node, body, fresh_container, patcher, patcher_with};

fn child_tags(element: &web_sys::Element) -> Vec<String> {
	let children = element.children();
	(0..children.length()).filter_map(|i| children.item(i)).map(|child| child.tag_name()).collect()
}

#[wasm_bindgen_test]
fn mount_reuses_matching_container() {
	let mut patcher = patcher();
	let container = fresh_container();

	let first = h("div", Props::new(), vec![h("p", Props::new(), vec!["First"])]);
	patcher.patch(&container, &first).unwrap();
	assert_eq!(container.inner_html(), "<p>First</p>");
	assert!(patcher.dom(&first).unwrap().is_same_node(Some(as_node(&container))));

	let second = h("div", Props::new(), vec![h("p", Props::new(), vec!["Second"])]);
	patcher.patch(&first, &second).unwrap();
	assert_eq!(container.inner_html(), "<p>Second</p>");
	assert!(patcher.dom(&first).is_none());
	assert!(patcher.dom(&second).unwrap().is_same_node(Some(as_node(&container))));
}

#[wasm_bindgen_test]
fn mount_replaces_mismatching_container() {
	let mut patcher = patcher();
	let container = fresh_container();

	let vnode = h("section#app", Props::new(), vec!["Hello"]);
	patcher.patch(&container, &vnode).unwrap();

	assert!(!body().contains(Some(as_node(&container))));
	let section = body().first_element_child().unwrap();
	assert_eq!(section.tag_name(), "SECTION");
	assert_eq!(section.id(), "app");
	assert_eq!(section.text_content().as_deref(), Some("Hello"));
}

#[wasm_bindgen_test]
fn mount_reads_id_and_class_attributes() {
	let mut patcher = patcher();
	let container = fresh_container();
	container.set_id("app");
	container.set_attribute("class", " a  b ").unwrap();

	let same = h("div#app.a.b", Props::new(), vec!["reused"]);
	patcher.patch(&container, &same).unwrap();
	assert!(body().contains(Some(as_node(&container))));
	assert!(patcher.dom(&same).unwrap().is_same_node(Some(as_node(&container))));
	assert_eq!(container.text_content().as_deref(), Some("reused"));

	let container = fresh_container();
	container.set_id("app");
	container.set_attribute("class", "a b").unwrap();

	let fewer_classes = h("div#app.a", Props::new(), vec!["replaced"]);
	patcher.patch(&container, &fewer_classes).unwrap();
	assert!(!body().contains(Some(as_node(&container))));
	let replacement = body().first_element_child().unwrap();
	assert!(patcher.dom(&fewer_classes).unwrap().is_same_node(Some(as_node(&replacement))));
	assert_eq!(replacement.id(), "app");
	assert_eq!(replacement.class_name(), "a");
}

#[wasm_bindgen_test]
fn failed_mount_releases_adopted_element() {
	let mut patcher = patcher();
	let orphan = web_setup_::document().create_element("div").unwrap();

	let result = patcher.patch(&orphan, &VNode::element("span", Props::new(), vec![]));
	assert!(matches!(result, Err(PatchError::DetachedRoot { .. })));
	assert_eq!(patcher.binding_count(), 0);
}

#[wasm_bindgen_test]
fn type_change_replaces_node() {
	let mut patcher = patcher();
	let container = fresh_container();

	let first = h("div", Props::new(), vec![h("span", Props::new(), vec!["x"])]);
	patcher.patch(&container, &first).unwrap();
	let span = patcher.dom(&first.children()[0]).unwrap().clone();

	let second = h("div", Props::new(), vec![h("div", Props::new(), vec!["x"])]);
	patcher.patch(&first, &second).unwrap();

	assert_eq!(container.inner_html(), "<div>x</div>");
	assert!(span.parent_node().is_none());
}

#[wasm_bindgen_test]
fn props_are_updated_in_place() {
	let mut patcher = patcher();
	let container = fresh_container();

	let first = h("div", Props::new(), vec![VNode::element("input", Props::new().set("value", "A"), vec![])]);
	patcher.patch(&container, &first).unwrap();
	let input: HtmlInputElement = container.first_element_child().unwrap().dyn_into().unwrap();
	assert_eq!(input.value(), "A");
	assert!(!input.disabled());

	let second = h("div", Props::new(), vec![VNode::element("input", Props::new().set("value", "B").set("disabled", true), vec![])]);
	patcher.patch(&first, &second).unwrap();

	assert!(container.first_element_child().unwrap().is_same_node(Some(as_node(&input))));
	assert_eq!(input.value(), "B");
	assert!(input.disabled());
}

#[wasm_bindgen_test]
fn text_is_updated_in_place() {
	let mut patcher = patcher();
	let container = fresh_container();

	let first = h("div", Props::new(), vec!["before"]);
	patcher.patch(&container, &first).unwrap();
	let text_node = container.first_child().unwrap();

	let second = h("div", Props::new(), vec!["after"]);
	patcher.patch(&first, &second).unwrap();

	assert!(container.first_child().unwrap().is_same_node(Some(&text_node)));
	assert_eq!(text_node.node_value().as_deref(), Some("after"));
}

#[wasm_bindgen_test]
fn text_and_element_children_swap() {
	let mut patcher = patcher();
	let container = fresh_container();

	let first = h("div", Props::new(), vec!["hello"]);
	patcher.patch(&container, &first).unwrap();

	let second = h("div", Props::new(), vec![h("b", Props::new(), vec!["hi"])]);
	patcher.patch(&first, &second).unwrap();
	assert_eq!(container.inner_html(), "<b>hi</b>");

	let third = h("div", Props::new(), vec!["bye"]);
	patcher.patch(&second, &third).unwrap();
	assert_eq!(container.inner_html(), "bye");
}

#[wasm_bindgen_test]
fn appended_child() {
	let mut patcher = patcher();
	let container = fresh_container();

	let first = h("div", Props::new(), vec![h("ul", Props::new(), vec![h("li", Props::new(), vec!["a"])])]);
	patcher.patch(&container, &first).unwrap();
	let first_li = patcher.dom(&first.children()[0].children()[0]).unwrap().clone();

	let second = h("div", Props::new(), vec![h("ul", Props::new(), vec![h("li", Props::new(), vec!["a"]), h("li", Props::new(), vec!["b"])])]);
	patcher.patch(&first, &second).unwrap();

	assert_eq!(container.inner_html(), "<ul><li>a</li><li>b</li></ul>");
	assert!(patcher.dom(&second.children()[0].children()[0]).unwrap().is_same_node(Some(&first_li)));
}

#[wasm_bindgen_test]
fn removed_child() {
	let mut patcher = patcher();
	let container = fresh_container();

	let first = h("div", Props::new(), vec![h("li", Props::new(), vec!["a"]), h("li", Props::new(), vec!["b"])]);
	patcher.patch(&container, &first).unwrap();
	let second_li = patcher.dom(&first.children()[1]).unwrap().clone();
	let bound_before = patcher.binding_count();

	let second = h("div", Props::new(), vec![h("li", Props::new(), vec!["a"])]);
	patcher.patch(&first, &second).unwrap();

	assert_eq!(container.inner_html(), "<li>a</li>");
	assert!(second_li.parent_node().is_none());
	assert!(patcher.dom(&first.children()[1]).is_none());
	assert_eq!(patcher.binding_count(), bound_before - 2);
}

#[wasm_bindgen_test]
fn same_tree_is_a_no_op() {
	let mut patcher = patcher();
	let container = fresh_container();

	let tree = h("div", Props::new().set("title", "t"), vec![h("p", Props::new(), vec!["unchanged"])]);
	patcher.patch(&container, &tree).unwrap();
	let paragraph = container.first_element_child().unwrap();
	let bound = patcher.binding_count();

	patcher.patch(&tree, &tree).unwrap();

	assert!(container.first_element_child().unwrap().is_same_node(Some(as_node(&paragraph))));
	assert_eq!(container.inner_html(), "<p>unchanged</p>");
	assert_eq!(patcher.binding_count(), bound);
	assert!(patcher.dom(&tree).is_some());
}

#[wasm_bindgen_test]
fn replaced_subtree_leaves_document() {
	let mut patcher = patcher();
	let container = fresh_container();

	let first = h("div", Props::new(), vec![h("section", Props::new(), vec![h("p", Props::new(), vec!["old"])])]);
	patcher.patch(&container, &first).unwrap();
	let section = patcher.dom(&first.children()[0]).unwrap().clone();
	assert!(body().contains(Some(&section)));

	let second = h("div", Props::new(), vec![h("article", Props::new(), vec!["new"])]);
	patcher.patch(&first, &second).unwrap();

	assert!(!body().contains(Some(&section)));
	assert_eq!(container.inner_html(), "<article>new</article>");
}

#[wasm_bindgen_test]
fn detached_root_cannot_be_replaced() {
	let mut patcher = patcher();
	let span = VNode::element("span", Props::new(), vec![]);
	patcher.materialize(&span).unwrap();

	let result = patcher.patch(&span, &VNode::element("div", Props::new(), vec![]));
	assert!(matches!(result, Err(PatchError::DetachedRoot { .. })));
}

#[wasm_bindgen_test]
fn unbound_previous_tree() {
	let mut patcher = patcher();
	let never_rendered = VNode::element("div", Props::new(), vec![]);

	let result = patcher.patch(&never_rendered, &VNode::element("div", Props::new(), vec![]));
	assert!(matches!(result, Err(PatchError::Unbound { .. })));
}

#[wasm_bindgen_test]
fn removed_listeners_are_released() {
	let mut patcher = patcher();
	let container = fresh_container();
	let clicks = Rc::new(Cell::new(0));

	let button = {
		let clicks = Rc::clone(&clicks);
		h("button", Props::new().on("onClick", move |_| clicks.set(clicks.get() + 1)), vec!["Click"])
	};
	let first = h("div", Props::new(), vec![button]);
	patcher.patch(&container, &first).unwrap();
	assert_eq!(patcher.listener_count(), 1);

	let element: HtmlElement = container.first_element_child().unwrap().dyn_into().unwrap();
	element.click();
	assert_eq!(clicks.get(), 1);

	let second = h("div", Props::new(), Vec::<VNode>::new());
	patcher.patch(&first, &second).unwrap();
	assert_eq!(patcher.listener_count(), 0);
	assert_eq!(container.inner_html(), "");
}

#[wasm_bindgen_test]
fn positional_insert_and_delete() {
	let mut patcher = patcher();
	let container = fresh_container();

	let first = h("div", Props::new(), vec![h("p", Props::new(), vec!["p"]), h("span", Props::new(), vec!["span"])]);
	patcher.patch(&container, &first).unwrap();

	let second = h("div", Props::new(), vec![h("div", Props::new(), vec!["div"]), h("p", Props::new(), vec!["p"])]);
	patcher.patch(&first, &second).unwrap();

	assert_eq!(child_tags(&container), ["DIV", "P"]);
	assert_eq!(container.inner_html(), "<div>div</div><p>p</p>");
	for child in second.children() {
		assert!(patcher.dom(child).unwrap().parent_node().is_some());
	}
}

#[wasm_bindgen_test]
fn keyed_reorder_moves_nodes() {
	let mut patcher = patcher_with(PatcherOptions::new().child_matching(ChildMatching::by_key()));
	let container = fresh_container();
	let item = |key: &'static str| h("li", Props::new(), vec![key]).with_key(key);

	let first = h("div", Props::new(), vec![item("a"), item("b"), item("c")]);
	patcher.patch(&container, &first).unwrap();
	let nodes: Vec<web_sys::Node> = first.children().iter().map(|child| patcher.dom(child).unwrap().clone()).collect();

	let second = h("div", Props::new(), vec![item("c"), item("a"), item("b")]);
	patcher.patch(&first, &second).unwrap();

	assert_eq!(container.text_content().as_deref(), Some("cab"));
	assert!(patcher.dom(&second.children()[0]).unwrap().is_same_node(Some(&nodes[2])));
	assert!(patcher.dom(&second.children()[1]).unwrap().is_same_node(Some(&nodes[0])));
	assert!(patcher.dom(&second.children()[2]).unwrap().is_same_node(Some(&nodes[1])));
}

#[wasm_bindgen_test]
fn keyed_insert_and_remove() {
	let mut patcher = patcher_with(PatcherOptions::new().child_matching(ChildMatching::by_key()));
	let container = fresh_container();
	let item = |key: i32| h("li", Props::new(), vec![key.to_string()]).with_key(key);

	let first = h("div", Props::new(), vec![item(1), item(2), item(3)]);
	patcher.patch(&container, &first).unwrap();
	let kept = patcher.dom(&first.children()[2]).unwrap().clone();
	let dropped = patcher.dom(&first.children()[1]).unwrap().clone();

	let second = h("div", Props::new(), vec![item(4), item(1), item(3)]);
	patcher.patch(&first, &second).unwrap();

	assert_eq!(container.text_content().as_deref(), Some("413"));
	assert!(patcher.dom(&second.children()[2]).unwrap().is_same_node(Some(&kept)));
	assert!(dropped.parent_node().is_none());
}

#[wasm_bindgen_test]
fn missing_keys_fall_back_to_positions() {
	let mut patcher = patcher_with(PatcherOptions::new().child_matching(ChildMatching::by_key()));
	let container = fresh_container();

	let first = h("div", Props::new(), vec![text("a"), text("b")]);
	patcher.patch(&container, &first).unwrap();

	let second = h("div", Props::new(), vec![text("b"), text("a").with_key("a")]);
	patcher.patch(&first, &second).unwrap();

	assert_eq!(container.text_content().as_deref(), Some("ba"));
}
