//! # View Components
//!
//! The binding contract shared by every view.
//!
//! ## Composition
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       How a view is put together                        │
//! │                                                                         │
//! │   ┌──────────────────────────┐                                          │
//! │   │  ConcreteView            │                                          │
//! │   │  ├── Binder              │  root node + required child lookup       │
//! │   │  ├── child Nodes         │  resolved ONCE in the constructor        │
//! │   │  └── FormBehavior?       │  only for forms                          │
//! │   └──────────────────────────┘                                          │
//! │                                                                         │
//! │   View::render(None)        ──► returns the root, changes nothing       │
//! │   View::render(Some(state)) ──► applies every Some field, returns root  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All setters take `&self`: nodes are shared handles, so a view can be
//! held in an `Arc` and rendered from any event handler.

use std::fmt::Display;

use crate::error::{UiError, UiResult};
use crate::node::Node;

// =============================================================================
// Binder
// =============================================================================

/// A root node plus required-child lookup.
#[derive(Debug, Clone)]
pub struct Binder {
    root: Node,
    context: String,
}

impl Binder {
    /// Binds to `root`. `context` names the view in error messages.
    pub fn new(root: Node, context: &str) -> Self {
        Binder {
            root,
            context: context.to_string(),
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Looks up a required child.
    ///
    /// ## Errors
    /// `UiError::MissingElement` if nothing matches; callers propagate it
    /// out of their constructor.
    pub fn ensure(&self, selector: &str) -> UiResult<Node> {
        self.root
            .query(selector)
            .ok_or_else(|| UiError::missing(selector, self.context.clone()))
    }

    /// Looks up an optional child.
    pub fn find(&self, selector: &str) -> Option<Node> {
        self.root.query(selector)
    }
}

/// Finds a required node under `root`.
pub fn ensure_element(root: &Node, selector: &str) -> UiResult<Node> {
    root.query(selector)
        .ok_or_else(|| UiError::missing(selector, format!("<{}>", root.tag())))
}

/// Clones the first element inside `<template id="...">`.
///
/// ## Errors
/// `UiError::MissingElement` if the template or its content is missing.
pub fn clone_template(document: &Node, id: &str) -> UiResult<Node> {
    let selector = format!("template#{id}");
    let template = document
        .query(&selector)
        .ok_or_else(|| UiError::missing(&selector, "document"))?;
    let content = template
        .children()
        .into_iter()
        .next()
        .ok_or_else(|| UiError::missing("*", format!("<template#{id}>")))?;
    Ok(content.deep_clone())
}

// =============================================================================
// Setters
// =============================================================================

pub fn set_text(node: &Node, value: impl Display) {
    node.set_text(&value.to_string());
}

pub fn set_disabled(node: &Node, disabled: bool) {
    node.set_disabled(disabled);
}

pub fn set_hidden(node: &Node) {
    node.set_attr("hidden", "hidden");
}

pub fn set_visible(node: &Node) {
    node.remove_attr("hidden");
}

pub fn set_image(node: &Node, src: &str, alt: Option<&str>) {
    node.set_attr("src", src);
    if let Some(alt) = alt.filter(|a| !a.is_empty()) {
        node.set_attr("alt", alt);
    }
}

pub fn toggle_class(node: &Node, class: &str, force: Option<bool>) -> bool {
    node.toggle_class(class, force)
}

// =============================================================================
// View Trait
// =============================================================================

/// A component that owns a root node and renders partial state onto it.
pub trait View {
    /// Partial state: every field is optional and only `Some` fields are
    /// applied.
    type State;

    fn root(&self) -> &Node;

    /// Applies the `Some` fields of `state`.
    fn apply(&self, state: Self::State);

    /// Applies `state` if given and returns the root for mounting.
    fn render(&self, state: Option<Self::State>) -> Node {
        if let Some(state) = state {
            self.apply(state);
        }
        self.root().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Label {
        binder: Binder,
        text: Node,
    }

    #[derive(Default)]
    struct LabelState {
        text: Option<String>,
        hidden: Option<bool>,
    }

    impl Label {
        fn new(root: Node) -> UiResult<Self> {
            let binder = Binder::new(root, "label");
            let text = binder.ensure(".label__text")?;
            Ok(Label { binder, text })
        }
    }

    impl View for Label {
        type State = LabelState;

        fn root(&self) -> &Node {
            self.binder.root()
        }

        fn apply(&self, state: LabelState) {
            if let Some(text) = state.text {
                set_text(&self.text, text);
            }
            match state.hidden {
                Some(true) => set_hidden(self.root()),
                Some(false) => set_visible(self.root()),
                None => {}
            }
        }
    }

    fn label_root() -> Node {
        Node::new("div").with_child(Node::new("span").with_class("label__text").with_text("old"))
    }

    #[test]
    fn test_missing_child_fails_construction() {
        let err = Label::new(Node::new("div")).unwrap_err();
        assert_eq!(err, UiError::missing(".label__text", "label"));
    }

    #[test]
    fn test_render_without_state_is_noop() {
        let label = Label::new(label_root()).unwrap();
        let root = label.render(None);
        assert_eq!(&root, label.root());
        assert_eq!(root.text(), "old");
    }

    #[test]
    fn test_render_applies_partial_state() {
        let label = Label::new(label_root()).unwrap();
        label.render(Some(LabelState {
            text: Some("new".into()),
            ..LabelState::default()
        }));
        assert_eq!(label.root().text(), "new");
        assert!(!label.root().has_attr("hidden"));

        label.render(Some(LabelState {
            hidden: Some(true),
            ..LabelState::default()
        }));
        assert_eq!(label.root().text(), "new");
        assert!(label.root().has_attr("hidden"));
    }

    #[test]
    fn test_clone_template() {
        let document = Node::new("body").with_child(
            Node::new("template")
                .with_attr("id", "card-basket")
                .with_child(Node::new("li").with_class("basket__item")),
        );

        let a = clone_template(&document, "card-basket").unwrap();
        let b = clone_template(&document, "card-basket").unwrap();
        assert!(a.is(".basket__item"));
        assert_ne!(a, b);

        assert!(clone_template(&document, "missing").is_err());
    }

    #[test]
    fn test_set_image_keeps_alt_when_empty() {
        let img = Node::new("img");
        set_image(&img, "/a.svg", Some("A"));
        set_image(&img, "/b.svg", Some(""));
        assert_eq!(img.attr("src").as_deref(), Some("/b.svg"));
        assert_eq!(img.attr("alt").as_deref(), Some("A"));
    }
}
