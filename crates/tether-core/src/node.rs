#![forbid(unsafe_code)]

//! Shared node handles.
//!
//! A [`Node`] is a cheap `Rc` handle; cloning it yields another handle to the
//! **same** node. Parents own their children, children refer back to their
//! parent weakly, so dropping the root handle releases the whole tree.
//!
//! # Invariants
//!
//! 1. A node has at most one parent; `append_child` detaches it first.
//! 2. Appending a fragment moves the fragment's children, never the
//!    fragment itself.
//! 3. Text nodes never have children.
//! 4. Listeners for one event type fire in registration order.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::document::escape_html;
use crate::error::{DomError, Result};
use crate::event::{CLICK, Event, INPUT, Listener, ListenerResult};
use crate::selector::Selector;

/// Elements serialized without a closing tag and parsed without children.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Whether `tag` names a void element.
#[must_use]
pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Element,
    Text,
    Fragment,
}

/// A single `name="value"` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

struct ElementData {
    tag: String,
    attributes: Vec<Attribute>,
    /// Live form value; `None` until written, falling back to the attribute.
    value: Option<String>,
}

enum NodeData {
    Element(ElementData),
    Text(String),
    Fragment,
}

struct NodeInner {
    data: RefCell<NodeData>,
    parent: RefCell<Weak<NodeInner>>,
    children: RefCell<Vec<Node>>,
    listeners: RefCell<Vec<(String, Listener)>>,
}

/// Handle to a node in a document tree.
#[derive(Clone)]
pub struct Node {
    inner: Rc<NodeInner>,
}

impl Node {
    fn from_data(data: NodeData) -> Self {
        Self {
            inner: Rc::new(NodeInner {
                data: RefCell::new(data),
                parent: RefCell::new(Weak::new()),
                children: RefCell::new(Vec::new()),
                listeners: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Create a detached element. The tag name is lowercased.
    #[must_use]
    pub fn element(tag: &str) -> Self {
        Self::from_data(NodeData::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
            value: None,
        }))
    }

    /// Create a detached text node.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::from_data(NodeData::Text(content.into()))
    }

    /// Create an empty fragment.
    #[must_use]
    pub fn fragment() -> Self {
        Self::from_data(NodeData::Fragment)
    }

    #[must_use]
    pub fn node_type(&self) -> NodeType {
        match &*self.inner.data.borrow() {
            NodeData::Element(_) => NodeType::Element,
            NodeData::Text(_) => NodeType::Text,
            NodeData::Fragment => NodeType::Fragment,
        }
    }

    #[must_use]
    pub fn is_element(&self) -> bool {
        self.node_type() == NodeType::Element
    }

    #[must_use]
    pub fn is_text(&self) -> bool {
        self.node_type() == NodeType::Text
    }

    #[must_use]
    pub fn is_fragment(&self) -> bool {
        self.node_type() == NodeType::Fragment
    }

    /// Whether both handles refer to the same node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Lowercased tag name, for elements.
    #[must_use]
    pub fn tag_name(&self) -> Option<String> {
        match &*self.inner.data.borrow() {
            NodeData::Element(el) => Some(el.tag.clone()),
            _ => None,
        }
    }

    // ── Tree ────────────────────────────────────────────────────────

    #[must_use]
    pub fn parent(&self) -> Option<Node> {
        self.inner
            .parent
            .borrow()
            .upgrade()
            .map(|inner| Node { inner })
    }

    /// Snapshot of the child list.
    #[must_use]
    pub fn children(&self) -> Vec<Node> {
        self.inner.children.borrow().clone()
    }

    #[must_use]
    pub fn child_count(&self) -> usize {
        self.inner.children.borrow().len()
    }

    #[must_use]
    pub fn first_child(&self) -> Option<Node> {
        self.inner.children.borrow().first().cloned()
    }

    /// Whether `other` is this node or one of its descendants.
    #[must_use]
    pub fn contains(&self, other: &Node) -> bool {
        let mut cursor = Some(other.clone());
        while let Some(node) = cursor {
            if node.ptr_eq(self) {
                return true;
            }
            cursor = node.parent();
        }
        false
    }

    /// Append `child` as the last child, detaching it from its old parent.
    ///
    /// Appending a fragment moves its children and leaves it empty.
    pub fn append_child(&self, child: &Node) -> Result<()> {
        if self.is_text() {
            return Err(DomError::hierarchy("text nodes cannot have children"));
        }
        if child.contains(self) {
            return Err(DomError::hierarchy(
                "cannot append a node into its own subtree",
            ));
        }
        if child.is_fragment() {
            for grandchild in child.take_children() {
                self.adopt(grandchild);
            }
            return Ok(());
        }
        child.detach();
        self.adopt(child.clone());
        Ok(())
    }

    /// Remove `child` from this node. Returns `false` if it was not a child.
    pub fn remove_child(&self, child: &Node) -> bool {
        let is_child = child.parent().is_some_and(|p| p.ptr_eq(self));
        if is_child {
            child.detach();
        }
        is_child
    }

    /// Detach this node from its parent, if any.
    pub fn detach(&self) {
        if let Some(parent) = self.parent() {
            parent
                .inner
                .children
                .borrow_mut()
                .retain(|c| !c.ptr_eq(self));
        }
        *self.inner.parent.borrow_mut() = Weak::new();
    }

    fn adopt(&self, child: Node) {
        *child.inner.parent.borrow_mut() = Rc::downgrade(&self.inner);
        self.inner.children.borrow_mut().push(child);
    }

    fn take_children(&self) -> Vec<Node> {
        let children = std::mem::take(&mut *self.inner.children.borrow_mut());
        for child in &children {
            *child.inner.parent.borrow_mut() = Weak::new();
        }
        children
    }

    // ── Text ────────────────────────────────────────────────────────

    /// Text of this node, or the concatenated text of its descendants.
    #[must_use]
    pub fn text_content(&self) -> String {
        if let NodeData::Text(text) = &*self.inner.data.borrow() {
            return text.clone();
        }
        let mut out = String::new();
        for child in self.children() {
            out.push_str(&child.text_content());
        }
        out
    }

    /// Replace the text of a text node, or the children of any other node
    /// with a single text node.
    pub fn set_text_content(&self, text: &str) {
        if let NodeData::Text(content) = &mut *self.inner.data.borrow_mut() {
            content.clear();
            content.push_str(text);
            return;
        }
        drop(self.take_children());
        if !text.is_empty() {
            self.adopt(Node::text(text));
        }
    }

    // ── Attributes ──────────────────────────────────────────────────

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<String> {
        match &*self.inner.data.borrow() {
            NodeData::Element(el) => el
                .attributes
                .iter()
                .find(|a| a.name == name)
                .map(|a| a.value.clone()),
            _ => None,
        }
    }

    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Attributes in source order.
    #[must_use]
    pub fn attributes(&self) -> Vec<Attribute> {
        match &*self.inner.data.borrow() {
            NodeData::Element(el) => el.attributes.clone(),
            _ => Vec::new(),
        }
    }

    /// Set or replace an attribute. Ignored on non-elements.
    pub fn set_attribute(&self, name: &str, value: &str) {
        if let NodeData::Element(el) = &mut *self.inner.data.borrow_mut() {
            match el.attributes.iter_mut().find(|a| a.name == name) {
                Some(attr) => value.clone_into(&mut attr.value),
                None => el.attributes.push(Attribute {
                    name: name.to_string(),
                    value: value.to_string(),
                }),
            }
        }
    }

    /// Remove an attribute. Returns whether it was present.
    pub fn remove_attribute(&self, name: &str) -> bool {
        if let NodeData::Element(el) = &mut *self.inner.data.borrow_mut() {
            let before = el.attributes.len();
            el.attributes.retain(|a| a.name != name);
            return el.attributes.len() != before;
        }
        false
    }

    #[must_use]
    pub fn id(&self) -> Option<String> {
        self.attribute("id")
    }

    #[must_use]
    pub fn class_list(&self) -> Vec<String> {
        self.attribute("class")
            .map(|c| c.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    // ── Form value ──────────────────────────────────────────────────

    /// Live value of a form element: the last written value, else the
    /// `value` attribute, else empty.
    #[must_use]
    pub fn value(&self) -> String {
        match &*self.inner.data.borrow() {
            NodeData::Element(el) => el.value.clone().unwrap_or_else(|| {
                el.attributes
                    .iter()
                    .find(|a| a.name == "value")
                    .map(|a| a.value.clone())
                    .unwrap_or_default()
            }),
            _ => String::new(),
        }
    }

    /// Write the live value without dispatching any event.
    pub fn set_value(&self, value: &str) {
        if let NodeData::Element(el) = &mut *self.inner.data.borrow_mut() {
            el.value = Some(value.to_string());
        }
    }

    // ── Events ──────────────────────────────────────────────────────

    pub fn add_event_listener(
        &self,
        kind: &str,
        listener: impl Fn(&Event) -> ListenerResult + 'static,
    ) {
        self.inner
            .listeners
            .borrow_mut()
            .push((kind.to_string(), Rc::new(listener)));
    }

    #[must_use]
    pub fn listener_count(&self, kind: &str) -> usize {
        self.inner
            .listeners
            .borrow()
            .iter()
            .filter(|(k, _)| k == kind)
            .count()
    }

    /// Call every listener registered for the event's type on this node.
    ///
    /// Listeners run synchronously in registration order over a snapshot
    /// taken before the first call. The first failure aborts dispatch.
    pub fn dispatch_event(&self, event: &Event) -> Result<()> {
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .filter(|(k, _)| k == event.kind())
            .map(|(_, l)| Rc::clone(l))
            .collect();
        #[cfg(feature = "tracing")]
        tracing::trace!(
            message = "dom.dispatch",
            event = event.kind(),
            listeners = listeners.len()
        );
        for listener in listeners {
            listener(event).map_err(|source| DomError::Listener {
                event: event.kind().to_string(),
                source,
            })?;
        }
        Ok(())
    }

    /// Simulate a user edit: write the value, then dispatch `input`.
    pub fn user_input(&self, text: &str) -> Result<()> {
        self.set_value(text);
        self.dispatch_event(&Event::new(INPUT, self))
    }

    /// Dispatch a `click` event at this node.
    pub fn click(&self) -> Result<()> {
        self.dispatch_event(&Event::new(CLICK, self))
    }

    // ── Lookup ──────────────────────────────────────────────────────

    /// First descendant (document order) matching `selector`.
    pub fn query_selector(&self, selector: &str) -> Result<Option<Node>> {
        let selector = Selector::parse(selector)?;
        Ok(self.find(&selector))
    }

    /// All descendants (document order) matching `selector`.
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<Node>> {
        let selector = Selector::parse(selector)?;
        let mut out = Vec::new();
        self.collect_matches(&selector, &mut out);
        Ok(out)
    }

    #[must_use]
    pub fn find(&self, selector: &Selector) -> Option<Node> {
        for child in self.children() {
            if selector.matches(&child) {
                return Some(child);
            }
            if let Some(found) = child.find(selector) {
                return Some(found);
            }
        }
        None
    }

    fn collect_matches(&self, selector: &Selector, out: &mut Vec<Node>) {
        for child in self.children() {
            if selector.matches(&child) {
                out.push(child.clone());
            }
            child.collect_matches(selector, out);
        }
    }

    // ── Serialization ───────────────────────────────────────────────

    /// Serialize this node and its subtree.
    #[must_use]
    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    /// Serialize the children of this node.
    #[must_use]
    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for child in self.children() {
            child.write_html(&mut out);
        }
        out
    }

    fn write_html(&self, out: &mut String) {
        let (tag, attributes, value) = match &*self.inner.data.borrow() {
            NodeData::Text(text) => {
                out.push_str(&escape_html(text));
                return;
            }
            NodeData::Fragment => (None, Vec::new(), None),
            NodeData::Element(el) => (
                Some(el.tag.clone()),
                el.attributes.clone(),
                el.value.clone(),
            ),
        };
        let Some(tag) = tag else {
            out.push_str(&self.inner_html());
            return;
        };
        out.push('<');
        out.push_str(&tag);
        for attr in attributes.iter().filter(|a| value.is_none() || a.name != "value") {
            push_attr(out, &attr.name, &attr.value);
        }
        if let Some(value) = &value {
            push_attr(out, "value", value);
        }
        out.push('>');
        if is_void_element(&tag) {
            return;
        }
        for child in self.children() {
            child.write_html(out);
        }
        out.push_str("</");
        out.push_str(&tag);
        out.push('>');
    }
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_html(value));
    out.push('"');
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.inner.data.borrow() {
            NodeData::Element(el) => f
                .debug_struct("Element")
                .field("tag", &el.tag)
                .field("attributes", &el.attributes.len())
                .field("children", &self.child_count())
                .finish(),
            NodeData::Text(text) => f.debug_tuple("Text").field(text).finish(),
            NodeData::Fragment => f
                .debug_struct("Fragment")
                .field("children", &self.child_count())
                .finish(),
        }
    }
}
