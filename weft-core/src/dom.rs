//! Headless Markup Tree
//!
//! A minimal element/text tree that implements [`RenderTarget`] and
//! [`SubtreeScanner`], so the engine can be driven without a browser. Nodes
//! are shared handles (`Arc<RwLock<_>>`); cloning a handle does not clone
//! the node.
//!
//! Scanning an element visits its descendants (not the element itself).
//! Scanning a selection (`[Element]`, e.g. the result of [`Element::select`])
//! visits the selected elements themselves. Each visited element yields:
//!
//! - every attribute named `@class.<name>` becomes a class-toggle binding;
//! - every other attribute named `@<name>` whose value contains a variable
//!   token becomes an attribute binding;
//! - every direct text child containing a token becomes a `nodeValue`
//!   binding, except inside `script`, `style`, `noscript` and `iframe`.

use std::fmt;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use parking_lot::RwLock;
use tracing::trace;

use crate::binding::{
    BindRequest, RenderTarget, SubtreeScanner, TargetRef, ATTRIBUTE_PREFIX, CLASS_PREFIX,
    INNER_TEXT, NODE_VALUE,
};
use crate::template::Template;

/// Elements whose text is never bound.
const OPAQUE_TAGS: [&str; 4] = ["script", "style", "noscript", "iframe"];

/// Content property replacing an element's children with text.
const TEXT_CONTENT: &str = "textContent";

/// A node in the tree.
#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Text(Text),
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl From<Text> for Node {
    fn from(text: Text) -> Self {
        Self::Text(text)
    }
}

/// A text node handle.
#[derive(Clone, Default)]
pub struct Text {
    value: Arc<RwLock<String>>,
}

impl Text {
    /// Create a text node.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: Arc::new(RwLock::new(value.into())),
        }
    }

    /// Current text.
    pub fn value(&self) -> String {
        self.value.read().clone()
    }

    /// Replace the text.
    pub fn set_value(&self, value: impl Into<String>) {
        *self.value.write() = value.into();
    }

    /// This node as a render target.
    pub fn as_target(&self) -> TargetRef {
        Arc::new(self.clone())
    }
}

impl fmt::Debug for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Text").field(&*self.value.read()).finish()
    }
}

impl RenderTarget for Text {
    fn set_field(&self, _field: &str, content: &str) {
        self.set_value(content);
    }

    fn set_attribute(&self, name: &str, _value: &str) {
        trace!(name, "text nodes have no attributes");
    }

    fn toggle_class(&self, class: &str, _present: bool) {
        trace!(class, "text nodes have no classes");
    }
}

#[derive(Debug, Default)]
struct ElementData {
    tag: String,
    attributes: IndexMap<String, String>,
    properties: IndexMap<String, String>,
    classes: IndexSet<String>,
    children: Vec<Node>,
}

/// An element handle.
#[derive(Clone)]
pub struct Element {
    data: Arc<RwLock<ElementData>>,
}

impl Element {
    /// Create an element. Tag names are stored lowercase.
    pub fn new(tag: &str) -> Self {
        Self {
            data: Arc::new(RwLock::new(ElementData {
                tag: tag.to_ascii_lowercase(),
                ..ElementData::default()
            })),
        }
    }

    /// Builder: set an attribute.
    pub fn with_attribute(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.write().attributes.insert(name.into(), value.into());
        self
    }

    /// Builder: add a class.
    pub fn with_class(self, class: impl Into<String>) -> Self {
        self.data.write().classes.insert(class.into());
        self
    }

    /// Builder: append a text child.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.append(Text::new(text));
        self
    }

    /// Builder: append a child node.
    pub fn with_child(self, child: impl Into<Node>) -> Self {
        self.append(child);
        self
    }

    /// Append a child node.
    pub fn append(&self, child: impl Into<Node>) {
        self.data.write().children.push(child.into());
    }

    /// Lowercase tag name.
    pub fn tag(&self) -> String {
        self.data.read().tag.clone()
    }

    /// Attribute value, if set.
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.data.read().attributes.get(name).cloned()
    }

    /// Attributes in insertion order.
    pub fn attributes(&self) -> Vec<(String, String)> {
        self.data
            .read()
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Value assigned to a non-text property, if any.
    pub fn property(&self, name: &str) -> Option<String> {
        self.data.read().properties.get(name).cloned()
    }

    /// Whether the element carries `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.data.read().classes.contains(class)
    }

    /// Classes in insertion order.
    pub fn classes(&self) -> Vec<String> {
        self.data.read().classes.iter().cloned().collect()
    }

    /// Direct children.
    pub fn children(&self) -> Vec<Node> {
        self.data.read().children.clone()
    }

    /// Direct text children.
    pub fn text_nodes(&self) -> Vec<Text> {
        self.data
            .read()
            .children
            .iter()
            .filter_map(|child| match child {
                Node::Text(text) => Some(text.clone()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in self.children() {
            match child {
                Node::Text(text) => out.push_str(&text.value()),
                Node::Element(element) => out.push_str(&element.text_content()),
            }
        }
        out
    }

    /// All descendant elements in document order, excluding `self`.
    pub fn descendants(&self) -> Vec<Element> {
        let mut out = Vec::new();
        self.collect_descendants(&mut out);
        out
    }

    fn collect_descendants(&self, out: &mut Vec<Element>) {
        for child in self.children() {
            if let Node::Element(element) = child {
                out.push(element.clone());
                element.collect_descendants(out);
            }
        }
    }

    /// Descendants matching a simple selector: `*`, `#id`, `.class` or a tag name.
    pub fn select(&self, selector: &str) -> Vec<Element> {
        self.descendants()
            .into_iter()
            .filter(|element| element.matches(selector))
            .collect()
    }

    fn matches(&self, selector: &str) -> bool {
        if selector == "*" {
            true
        } else if let Some(id) = selector.strip_prefix('#') {
            self.attribute("id").as_deref() == Some(id)
        } else if let Some(class) = selector.strip_prefix('.') {
            self.has_class(class)
        } else {
            self.data.read().tag.eq_ignore_ascii_case(selector)
        }
    }

    /// This element as a render target.
    pub fn as_target(&self) -> TargetRef {
        Arc::new(self.clone())
    }

    fn is_opaque(&self) -> bool {
        let data = self.data.read();
        OPAQUE_TAGS.contains(&data.tag.as_str())
    }

    fn scan_element(&self, requests: &mut Vec<BindRequest>) {
        for (name, value) in self.attributes() {
            if !name.starts_with(ATTRIBUTE_PREFIX) {
                continue;
            }
            if !name.starts_with(CLASS_PREFIX) && Template::compile(&value).is_static() {
                continue;
            }
            requests.push(BindRequest::new(self.as_target(), name, value));
        }

        if self.is_opaque() {
            return;
        }

        for text in self.text_nodes() {
            let value = text.value();
            if Template::compile(&value).is_static() {
                continue;
            }
            requests.push(BindRequest::new(text.as_target(), NODE_VALUE, value));
        }
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.data.read();
        f.debug_struct("Element")
            .field("tag", &data.tag)
            .field("attributes", &data.attributes)
            .field("classes", &data.classes)
            .field("children", &data.children.len())
            .finish()
    }
}

impl RenderTarget for Element {
    fn set_field(&self, field: &str, content: &str) {
        let mut data = self.data.write();
        if field == INNER_TEXT || field == TEXT_CONTENT {
            data.children = vec![Node::Text(Text::new(content))];
        } else {
            data.properties.insert(field.to_string(), content.to_string());
        }
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.data
            .write()
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    fn toggle_class(&self, class: &str, present: bool) {
        let mut data = self.data.write();
        if present {
            data.classes.insert(class.to_string());
        } else {
            data.classes.shift_remove(class);
        }
    }
}

impl SubtreeScanner for Element {
    fn scan(&self) -> Vec<BindRequest> {
        let mut requests = Vec::new();
        for element in self.descendants() {
            element.scan_element(&mut requests);
        }
        requests
    }
}

impl SubtreeScanner for [Element] {
    fn scan(&self) -> Vec<BindRequest> {
        let mut requests = Vec::new();
        for element in self {
            element.scan_element(&mut requests);
        }
        requests
    }
}

impl SubtreeScanner for Vec<Element> {
    fn scan(&self) -> Vec<BindRequest> {
        self.as_slice().scan()
    }
}
