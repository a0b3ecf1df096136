//! Markup value tree.
//!
//! Live view regions and collected fragments are both represented as plain
//! values: an [`Element`] owns its attributes (in document order) and its
//! children. Transformations never mutate a tree in place; they build a fresh
//! one through [`Element::rewrite`].
//!
//! The JSON form is compact: text nodes are bare strings, elements are
//! objects with `tag`, optional `attrs` and optional `children`.
//!
//! ```
//! use rsnap_common::markup::{Element, Node};
//!
//! let card = Element::new("div")
//!     .with_attr("class", "card")
//!     .with_child(Element::new("p").with_text("a < b"));
//! assert_eq!(card.to_html(), r#"<div class="card"><p>a &lt; b</p></div>"#);
//! assert_eq!(Node::from(card).text_content(), "a < b");
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Elements that never have a closing tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// How text children are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextMode {
    /// Entity-escaped character data.
    Escaped,
    /// Script source: kept verbatim except closing-tag sequences.
    Script,
    /// Style sheet: `<` written as the CSS escape `\3c `.
    Style,
}

impl TextMode {
    fn for_tag(tag: &str) -> Self {
        match tag {
            "script" => TextMode::Script,
            "style" => TextMode::Style,
            _ => TextMode::Escaped,
        }
    }
}

/// A node in the markup tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    /// Character data.
    Text(String),
    /// A nested element.
    Element(Element),
}

impl Node {
    /// Concatenated text of this node and all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                for child in &el.children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// The element inside this node, if any.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    /// Serialize to HTML.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out, TextMode::Escaped);
        out
    }

    fn write_html(&self, out: &mut String, mode: TextMode) {
        match (self, mode) {
            (Node::Text(text), TextMode::Escaped) => out.push_str(&html_escape(text)),
            (Node::Text(text), TextMode::Script) => push_script_text(out, text),
            (Node::Text(text), TextMode::Style) => out.push_str(&text.replace('<', "\\3c ")),
            (Node::Element(el), _) => el.write_html(out),
        }
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.to_string())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_html())
    }
}

/// Outcome of visiting one element during [`Element::rewrite`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
    /// Keep the element and keep descending into its children.
    Keep,
    /// Substitute the element (and its subtree) with another node.
    Replace(Node),
    /// Drop the element and its subtree.
    Remove,
}

/// A markup element.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Element {
    /// Lower-case tag name.
    #[serde(deserialize_with = "lowercase_tag")]
    pub tag: String,
    /// Attributes in document order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attrs: IndexMap<String, String>,
    /// Child nodes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Element {
    /// Create an empty element.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attrs: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Set an attribute (builder form).
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Append a child (builder form).
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append a text child (builder form).
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Get an attribute value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Set or replace an attribute, keeping its original position.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(name.into(), value.into());
    }

    /// Remove an attribute.
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        self.attrs.shift_remove(name)
    }

    /// The `id` attribute.
    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// Whitespace-separated class names.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    /// Check for a class name.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Add a class name unless already present.
    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let joined = match self.attr("class") {
            Some(existing) if !existing.trim().is_empty() => {
                format!("{} {}", existing.trim(), class)
            }
            _ => class.to_string(),
        };
        self.set_attr("class", joined);
    }

    /// Direct child elements.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Concatenated text of all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }

    /// First descendant (excluding `self`) matching `pred`, depth-first in document order.
    pub fn find<P>(&self, pred: P) -> Option<&Element>
    where
        P: Fn(&Element) -> bool,
    {
        self.find_inner(&pred)
    }

    fn find_inner<P>(&self, pred: &P) -> Option<&Element>
    where
        P: Fn(&Element) -> bool,
    {
        for child in self.child_elements() {
            if pred(child) {
                return Some(child);
            }
            if let Some(found) = child.find_inner(pred) {
                return Some(found);
            }
        }
        None
    }

    /// All descendants (excluding `self`) matching `pred`, in document order.
    pub fn find_all<P>(&self, pred: P) -> Vec<&Element>
    where
        P: Fn(&Element) -> bool,
    {
        let mut out = Vec::new();
        self.find_all_inner(&pred, &mut out);
        out
    }

    fn find_all_inner<'a, P>(&'a self, pred: &P, out: &mut Vec<&'a Element>)
    where
        P: Fn(&Element) -> bool,
    {
        for child in self.child_elements() {
            if pred(child) {
                out.push(child);
            }
            child.find_all_inner(pred, out);
        }
    }

    /// Find a descendant by `id`.
    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        self.find(|el| el.id() == Some(id))
    }

    /// Build a new tree by visiting every descendant element.
    ///
    /// `visit` decides per element; kept elements are cloned shallowly and
    /// their children visited in turn. Text nodes are copied as-is. The root
    /// itself is always kept.
    pub fn rewrite<F>(&self, visit: &mut F) -> Element
    where
        F: FnMut(&Element) -> Rewrite,
    {
        let mut children = Vec::with_capacity(self.children.len());
        for child in &self.children {
            match child {
                Node::Text(text) => children.push(Node::Text(text.clone())),
                Node::Element(el) => match visit(el) {
                    Rewrite::Keep => children.push(Node::Element(el.rewrite(visit))),
                    Rewrite::Replace(node) => children.push(node),
                    Rewrite::Remove => {}
                },
            }
        }
        Element {
            tag: self.tag.clone(),
            attrs: self.attrs.clone(),
            children,
        }
    }

    /// Count descendants (excluding `self`) matching `pred`.
    pub fn count<P>(&self, pred: P) -> usize
    where
        P: Fn(&Element) -> bool,
    {
        self.find_all(pred).len()
    }

    /// Whether this element is a void element.
    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.tag.as_str())
    }

    /// Serialize this element including its own tag.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    /// Serialize only the children.
    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        self.write_children(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&html_escape(value));
            out.push('"');
        }
        out.push('>');
        if self.is_void() {
            return;
        }
        self.write_children(out);
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }

    fn write_children(&self, out: &mut String) {
        let mode = TextMode::for_tag(&self.tag);
        for child in &self.children {
            child.write_html(out, mode);
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_html())
    }
}

/// Tag names compare in lower case whatever case the capture used.
fn lowercase_tag<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|tag| tag.to_ascii_lowercase())
}

/// Write script text so no `</script` or `</style` sequence can end the element.
fn push_script_text(out: &mut String, text: &str) {
    let lower = text.to_ascii_lowercase();
    let mut written = 0;
    for (idx, _) in lower.match_indices("</") {
        let rest = &lower[idx + 2..];
        if rest.starts_with("script") || rest.starts_with("style") {
            out.push_str(&text[written..idx]);
            out.push_str("<\\/");
            written = idx + 2;
        }
    }
    out.push_str(&text[written..]);
}

/// Escape HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
