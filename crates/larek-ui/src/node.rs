//! # UI Tree
//!
//! A small, thread-safe element tree with the slice of DOM behavior the
//! storefront views rely on.
//!
//! ## Handles and Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Node handles                                   │
//! │                                                                         │
//! │   Node = Arc<Mutex<Element>>          WeakNode = Weak<Mutex<Element>>   │
//! │                                                                         │
//! │   parent ──(strong)──► children                                         │
//! │   child  ──(weak)────► parent                                           │
//! │                                                                         │
//! │   Listeners that need to reach their own node (or an ancestor) hold a   │
//! │   WeakNode, otherwise the node would keep itself alive.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Event Dispatch
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   button.click()                                                        │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │   button listeners ──► .modal__content listeners ──► .modal listeners  │
//! │                               │                                         │
//! │                     stop_propagation() ends the walk after this node    │
//! │                                                                         │
//! │   No element lock is held while a listener runs, so listeners may       │
//! │   freely read and mutate any node, including the target.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::debug;

use crate::selector::Selector;

// =============================================================================
// Events
// =============================================================================

/// The event types the views listen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomEventKind {
    Click,
    Input,
    Submit,
    KeyDown,
}

/// An event travelling from its target up to the root.
pub struct DomEvent {
    kind: DomEventKind,
    target: Node,
    key: Option<String>,
    default_prevented: AtomicBool,
    propagation_stopped: AtomicBool,
}

impl DomEvent {
    pub fn kind(&self) -> DomEventKind {
        self.kind
    }

    /// The node the event was dispatched on.
    pub fn target(&self) -> &Node {
        &self.target
    }

    /// The key name for `KeyDown` events.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn prevent_default(&self) {
        self.default_prevented.store(true, Ordering::Relaxed);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.load(Ordering::Relaxed)
    }

    /// Stops the event after the listeners of the current node.
    pub fn stop_propagation(&self) {
        self.propagation_stopped.store(true, Ordering::Relaxed);
    }

    fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.load(Ordering::Relaxed)
    }
}

/// A node event listener.
pub type Listener = Arc<dyn Fn(&DomEvent) + Send + Sync>;

// =============================================================================
// Element
// =============================================================================

#[derive(Default)]
struct Element {
    tag: String,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    text: String,
    value: String,
    children: Vec<Node>,
    parent: Weak<Mutex<Element>>,
    listeners: Vec<(DomEventKind, Listener)>,
}

/// Shared handle to an element. Clones refer to the same element.
#[derive(Clone)]
pub struct Node(Arc<Mutex<Element>>);

/// Non-owning handle to an element.
#[derive(Clone, Default)]
pub struct WeakNode(Weak<Mutex<Element>>);

impl WeakNode {
    pub fn upgrade(&self) -> Option<Node> {
        self.0.upgrade().map(Node)
    }

    /// True if this handle points at `node`.
    pub fn is(&self, node: &Node) -> bool {
        std::ptr::eq(self.0.as_ptr(), Arc::as_ptr(&node.0))
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Node {}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let el = self.0.lock();
        f.debug_struct("Node")
            .field("tag", &el.tag)
            .field("classes", &el.classes)
            .field("children", &el.children.len())
            .finish()
    }
}

impl Node {
    /// Creates a detached element.
    pub fn new(tag: &str) -> Node {
        Node(Arc::new(Mutex::new(Element {
            tag: tag.to_ascii_lowercase(),
            ..Element::default()
        })))
    }

    // =========================================================================
    // Builders
    // =========================================================================

    pub fn with_class(self, class: &str) -> Node {
        self.add_class(class);
        self
    }

    pub fn with_attr(self, name: &str, value: &str) -> Node {
        self.set_attr(name, value);
        self
    }

    pub fn with_text(self, text: &str) -> Node {
        self.set_text(text);
        self
    }

    pub fn with_child(self, child: Node) -> Node {
        self.append_child(&child);
        self
    }

    pub fn with_children(self, children: impl IntoIterator<Item = Node>) -> Node {
        for child in children {
            self.append_child(&child);
        }
        self
    }

    // =========================================================================
    // Identity
    // =========================================================================

    pub fn tag(&self) -> String {
        self.0.lock().tag.clone()
    }

    pub fn downgrade(&self) -> WeakNode {
        WeakNode(Arc::downgrade(&self.0))
    }

    // =========================================================================
    // Classes and Attributes
    // =========================================================================

    pub fn classes(&self) -> Vec<String> {
        self.0.lock().classes.clone()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.0.lock().classes.iter().any(|c| c == class)
    }

    pub fn add_class(&self, class: &str) {
        let mut el = self.0.lock();
        if !el.classes.iter().any(|c| c == class) {
            el.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&self, class: &str) {
        self.0.lock().classes.retain(|c| c != class);
    }

    /// Flips `class`, or sets it to `force` when given. Returns whether the
    /// class is present afterwards.
    pub fn toggle_class(&self, class: &str, force: Option<bool>) -> bool {
        let present = force.unwrap_or_else(|| !self.has_class(class));
        if present {
            self.add_class(class);
        } else {
            self.remove_class(class);
        }
        present
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        self.0.lock().attrs.get(name).cloned()
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.0.lock().attrs.contains_key(name)
    }

    pub fn set_attr(&self, name: &str, value: &str) {
        self.0
            .lock()
            .attrs
            .insert(name.to_string(), value.to_string());
    }

    pub fn remove_attr(&self, name: &str) {
        self.0.lock().attrs.remove(name);
    }

    pub fn is_disabled(&self) -> bool {
        self.has_attr("disabled")
    }

    pub fn set_disabled(&self, disabled: bool) {
        if disabled {
            self.set_attr("disabled", "disabled");
        } else {
            self.remove_attr("disabled");
        }
    }

    // =========================================================================
    // Content
    // =========================================================================

    /// Text content: this node's text followed by its descendants' text.
    pub fn text(&self) -> String {
        let (mut text, children) = {
            let el = self.0.lock();
            (el.text.clone(), el.children.clone())
        };
        for child in children {
            text.push_str(&child.text());
        }
        text
    }

    /// Replaces all content (children included) with `text`.
    pub fn set_text(&self, text: &str) {
        self.replace_children(Vec::new());
        self.0.lock().text = text.to_string();
    }

    /// Current value of an input.
    pub fn value(&self) -> String {
        self.0.lock().value.clone()
    }

    pub fn set_value(&self, value: &str) {
        self.0.lock().value = value.to_string();
    }

    // =========================================================================
    // Tree
    // =========================================================================

    pub fn children(&self) -> Vec<Node> {
        self.0.lock().children.clone()
    }

    pub fn parent(&self) -> Option<Node> {
        self.0.lock().parent.upgrade().map(Node)
    }

    /// Appends `child`, moving it out of its previous parent.
    pub fn append_child(&self, child: &Node) {
        if child == self {
            return;
        }
        child.detach();
        child.0.lock().parent = Arc::downgrade(&self.0);
        self.0.lock().children.push(child.clone());
    }

    /// Removes every child and appends `children` in order.
    pub fn replace_children(&self, children: impl IntoIterator<Item = Node>) {
        let old = std::mem::take(&mut self.0.lock().children);
        for child in old {
            child.0.lock().parent = Weak::new();
        }
        for child in children {
            self.append_child(&child);
        }
    }

    /// Removes this node from its parent.
    pub fn detach(&self) {
        let parent = {
            let mut el = self.0.lock();
            std::mem::take(&mut el.parent).upgrade()
        };
        if let Some(parent) = parent {
            parent.lock().children.retain(|c| c != self);
        }
    }

    /// Copies this subtree. Listeners are not copied and the copy has no
    /// parent.
    pub fn deep_clone(&self) -> Node {
        let (tag, classes, attrs, text, value, children) = {
            let el = self.0.lock();
            (
                el.tag.clone(),
                el.classes.clone(),
                el.attrs.clone(),
                el.text.clone(),
                el.value.clone(),
                el.children.clone(),
            )
        };
        let copy = Node(Arc::new(Mutex::new(Element {
            tag,
            classes,
            attrs,
            text,
            value,
            ..Element::default()
        })));
        for child in children {
            copy.append_child(&child.deep_clone());
        }
        copy
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// First descendant matching `selector`, in document order.
    pub fn query(&self, selector: &str) -> Option<Node> {
        let parsed = parse_or_log(selector)?;
        let mut found = None;
        self.walk(&mut |node| {
            if node.matches(&parsed) {
                found = Some(node.clone());
                false
            } else {
                true
            }
        });
        found
    }

    /// Every descendant matching `selector`, in document order.
    pub fn query_all(&self, selector: &str) -> Vec<Node> {
        let Some(parsed) = parse_or_log(selector) else {
            return Vec::new();
        };
        let mut found = Vec::new();
        self.walk(&mut |node| {
            if node.matches(&parsed) {
                found.push(node.clone());
            }
            true
        });
        found
    }

    /// True if this node itself matches `selector`.
    pub fn is(&self, selector: &str) -> bool {
        parse_or_log(selector).is_some_and(|parsed| self.matches(&parsed))
    }

    fn matches(&self, selector: &Selector) -> bool {
        let el = self.0.lock();
        selector.matches(&el.tag, &el.classes, &el.attrs)
    }

    /// Pre-order walk over descendants; the visitor returns false to stop.
    fn walk(&self, visit: &mut dyn FnMut(&Node) -> bool) -> bool {
        for child in self.children() {
            if !visit(&child) || !child.walk(visit) {
                return false;
            }
        }
        true
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Registers a listener for `kind` events targeted at this node or
    /// bubbling up through it.
    pub fn on<F>(&self, kind: DomEventKind, listener: F)
    where
        F: Fn(&DomEvent) + Send + Sync + 'static,
    {
        self.0.lock().listeners.push((kind, Arc::new(listener)));
    }

    /// Dispatches an event at this node and bubbles it to the root.
    ///
    /// Returns false if a listener called `prevent_default`.
    pub fn dispatch(&self, kind: DomEventKind, key: Option<&str>) -> bool {
        let event = DomEvent {
            kind,
            target: self.clone(),
            key: key.map(str::to_string),
            default_prevented: AtomicBool::new(false),
            propagation_stopped: AtomicBool::new(false),
        };

        let mut current = Some(self.clone());
        while let Some(node) = current {
            let listeners: Vec<Listener> = node
                .0
                .lock()
                .listeners
                .iter()
                .filter(|(k, _)| *k == kind)
                .map(|(_, l)| l.clone())
                .collect();

            for listener in listeners {
                listener(&event);
            }

            if event.propagation_stopped() {
                break;
            }
            current = node.parent();
        }

        !event.default_prevented()
    }

    /// Clicks the node. Disabled elements swallow the click.
    pub fn click(&self) -> bool {
        if self.is_disabled() {
            return true;
        }
        self.dispatch(DomEventKind::Click, None)
    }

    /// Sets the value, then fires an `Input` event, as typing would.
    pub fn input(&self, value: &str) -> bool {
        self.set_value(value);
        self.dispatch(DomEventKind::Input, None)
    }

    pub fn submit(&self) -> bool {
        self.dispatch(DomEventKind::Submit, None)
    }

    pub fn key_down(&self, key: &str) -> bool {
        self.dispatch(DomEventKind::KeyDown, Some(key))
    }

    // =========================================================================
    // Serialization
    // =========================================================================

    /// Serializes the subtree as HTML.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        let (tag, classes, attrs, text, value, children) = {
            let el = self.0.lock();
            (
                el.tag.clone(),
                el.classes.clone(),
                el.attrs.clone(),
                el.text.clone(),
                el.value.clone(),
                el.children.clone(),
            )
        };

        out.push('<');
        out.push_str(&tag);
        if !classes.is_empty() {
            out.push_str(" class=\"");
            out.push_str(&escape(&classes.join(" ")));
            out.push('"');
        }
        for (name, val) in &attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape(val));
            out.push('"');
        }
        if !value.is_empty() {
            out.push_str(" value=\"");
            out.push_str(&escape(&value));
            out.push('"');
        }
        out.push('>');

        if is_void(&tag) {
            return;
        }

        out.push_str(&escape(&text));
        for child in children {
            child.write_html(out);
        }
        out.push_str("</");
        out.push_str(&tag);
        out.push('>');
    }
}

fn parse_or_log(selector: &str) -> Option<Selector> {
    let parsed = Selector::parse(selector);
    if parsed.is_none() {
        debug!(selector, "Unsupported selector");
    }
    parsed
}

fn is_void(tag: &str) -> bool {
    matches!(tag, "img" | "input" | "br" | "hr")
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn card() -> Node {
        Node::new("div")
            .with_class("card")
            .with_child(Node::new("h2").with_class("card__title").with_text("Title"))
            .with_child(
                Node::new("button")
                    .with_class("card__button")
                    .with_attr("name", "card"),
            )
    }

    #[test]
    fn test_query_finds_descendants_in_order() {
        let root = Node::new("section")
            .with_child(card())
            .with_child(card());

        assert_eq!(root.query_all(".card").len(), 2);
        let title = root.query(".card__title").unwrap();
        assert_eq!(title.text(), "Title");
        assert!(root.query(r#"button[name="card"]"#).is_some());
        assert!(root.query(".missing").is_none());
        assert!(root.query("div > p").is_none());
    }

    #[test]
    fn test_query_excludes_root() {
        let node = card();
        assert!(node.is(".card"));
        assert!(node.query(".card").is_none());
    }

    #[test]
    fn test_text_content_and_set_text() {
        let node = card();
        assert_eq!(node.text(), "Title");
        node.set_text("flat");
        assert!(node.children().is_empty());
        assert_eq!(node.text(), "flat");
    }

    #[test]
    fn test_append_moves_between_parents() {
        let a = Node::new("ul");
        let b = Node::new("ul");
        let li = Node::new("li");

        a.append_child(&li);
        b.append_child(&li);

        assert!(a.children().is_empty());
        assert_eq!(b.children(), vec![li.clone()]);
        assert_eq!(li.parent(), Some(b));
    }

    #[test]
    fn test_replace_children() {
        let list = Node::new("ul").with_child(Node::new("li"));
        let old = list.children()[0].clone();
        list.replace_children(vec![Node::new("p"), Node::new("p")]);

        assert_eq!(list.children().len(), 2);
        assert!(old.parent().is_none());
    }

    #[test]
    fn test_toggle_class() {
        let node = Node::new("div");
        assert!(node.toggle_class("modal_active", None));
        assert!(!node.toggle_class("modal_active", None));
        assert!(node.toggle_class("modal_active", Some(true)));
        assert!(node.toggle_class("modal_active", Some(true)));
        assert_eq!(node.classes(), vec!["modal_active".to_string()]);
    }

    #[test]
    fn test_events_bubble_to_ancestors() {
        let root = card();
        let button = root.query(".card__button").unwrap();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        button.on(DomEventKind::Click, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let counter = hits.clone();
        let expected = button.downgrade();
        root.on(DomEventKind::Click, move |event| {
            assert!(expected.is(event.target()));
            counter.fetch_add(10, Ordering::SeqCst);
        });

        button.click();
        assert_eq!(hits.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn test_stop_propagation_and_prevent_default() {
        let root = card();
        let button = root.query(".card__button").unwrap();
        let reached_root = Arc::new(AtomicBool::new(false));

        button.on(DomEventKind::Submit, |event| {
            event.prevent_default();
            event.stop_propagation();
        });
        let flag = reached_root.clone();
        root.on(DomEventKind::Submit, move |_| flag.store(true, Ordering::SeqCst));

        assert!(!button.submit());
        assert!(!reached_root.load(Ordering::SeqCst));
    }

    #[test]
    fn test_disabled_button_ignores_clicks() {
        let button = Node::new("button");
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        button.on(DomEventKind::Click, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        button.set_disabled(true);
        button.click();
        button.set_disabled(false);
        button.click();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_listener_may_mutate_target() {
        let button = Node::new("button");
        let weak = button.downgrade();
        button.on(DomEventKind::Click, move |_| {
            if let Some(node) = weak.upgrade() {
                node.toggle_class("button_alt-active", None);
            }
        });

        button.click();
        assert!(button.has_class("button_alt-active"));
    }

    #[test]
    fn test_input_sets_value_then_fires() {
        let input = Node::new("input").with_attr("name", "email");
        let seen = Arc::new(Mutex::new(String::new()));
        let out = seen.clone();
        input.on(DomEventKind::Input, move |event| {
            *out.lock() = event.target().value();
        });

        input.input("a@b.co");
        assert_eq!(*seen.lock(), "a@b.co");
    }

    #[test]
    fn test_deep_clone_is_independent() {
        let original = card();
        let copy = original.deep_clone();
        copy.query(".card__title").unwrap().set_text("Changed");

        assert_eq!(original.query(".card__title").unwrap().text(), "Title");
        assert!(copy.parent().is_none());
    }

    #[test]
    fn test_to_html() {
        let node = Node::new("p")
            .with_class("basket__empty")
            .with_attr("data-id", "1")
            .with_text("Tom & Jerry");
        assert_eq!(
            node.to_html(),
            r#"<p class="basket__empty" data-id="1">Tom &amp; Jerry</p>"#
        );

        let img = Node::new("img").with_attr("src", "/a.svg");
        assert_eq!(img.to_html(), r#"<img src="/a.svg">"#);
    }
}
