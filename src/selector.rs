//! Tag-like node types of the form `tag#id.class1.class2`.

/// The parts of an element selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector<'a> {
	pub tag: &'a str,
	pub id: Option<&'a str>,
	/// Space-separated, ready to be assigned as `className`.
	pub class_name: Option<String>,
}

/// Splits `selector` into tag, id and classes.
///
/// The tag is everything before the first `#` or `.`, and defaults to `div` if empty.
/// A later `#` segment replaces an earlier one. Empty class segments are skipped.
#[must_use]
pub fn parse_selector(selector: &str) -> Selector<'_> {
	let tag_end = selector.find(|c| c == '#' || c == '.').unwrap_or(selector.len());
	let tag = match &selector[..tag_end] {
		"" => "div",
		tag => tag,
	};

	let mut id = None;
	let mut classes = Vec::new();
	let mut rest = &selector[tag_end..];
	while let Some(marker) = rest.chars().next() {
		let body = &rest[1..];
		let end = body.find(|c| c == '#' || c == '.').unwrap_or(body.len());
		let segment = &body[..end];
		match marker {
			'#' => id = Some(segment).filter(|id| !id.is_empty()),
			_ if !segment.is_empty() => classes.push(segment),
			_ => (),
		}
		rest = &body[end..];
	}

	Selector {
		tag,
		id,
		class_name: if classes.is_empty() { None } else { Some(classes.join(" ")) },
	}
}

/// Builds the selector describing `element`'s current tag, `id` and `class` attribute.
#[must_use]
pub fn selector_of(element: &web_sys::Element) -> String {
	compose_selector(&element.tag_name(), &element.id(), element.get_attribute("class").as_deref())
}

fn compose_selector(tag_name: &str, id: &str, class_name: Option<&str>) -> String {
	let mut selector = tag_name.to_ascii_lowercase();
	if !id.is_empty() {
		selector.push('#');
		selector.push_str(id);
	}
	for class in class_name.into_iter().flat_map(str::split_whitespace) {
		selector.push('.');
		selector.push_str(class);
	}
	selector
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tag_only() {
		assert_eq!(parse_selector("div"), Selector { tag: "div", id: None, class_name: None });
	}

	#[test]
	fn tag_with_id() {
		assert_eq!(parse_selector("section#main"), Selector { tag: "section", id: Some("main"), class_name: None });
	}

	#[test]
	fn tag_with_class() {
		assert_eq!(
			parse_selector("span.highlight"),
			Selector {
				tag: "span",
				id: None,
				class_name: Some("highlight".to_owned())
			}
		);
	}

	#[test]
	fn tag_with_id_and_classes() {
		assert_eq!(
			parse_selector("button#submit.primary"),
			Selector {
				tag: "button",
				id: Some("submit"),
				class_name: Some("primary".to_owned())
			}
		);
		assert_eq!(
			parse_selector("div#main.container.wide"),
			Selector {
				tag: "div",
				id: Some("main"),
				class_name: Some("container wide".to_owned())
			}
		);
	}

	#[test]
	fn odd_selectors() {
		assert_eq!(parse_selector("#app").tag, "div");
		assert_eq!(parse_selector("p..a.").class_name.as_deref(), Some("a"));
		assert_eq!(parse_selector("p.a#x.b").id, Some("x"));
		assert_eq!(parse_selector("p.a#x.b").class_name.as_deref(), Some("a b"));
		assert_eq!(parse_selector("p#").id, None);
	}

	#[test]
	fn composed_selectors_parse_back() {
		let selector = compose_selector("DIV", "app", Some("  container  wide "));
		assert_eq!(selector, "div#app.container.wide");
		assert_eq!(
			parse_selector(&selector),
			Selector {
				tag: "div",
				id: Some("app"),
				class_name: Some("container wide".to_owned())
			}
		);
		assert_eq!(compose_selector("UL", "", None), "ul");
	}
}
