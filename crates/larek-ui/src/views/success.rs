//! Order confirmation shown after a successful checkout.

use crate::component::{set_text, Binder, View};
use crate::error::UiResult;
use crate::node::{DomEventKind, Node};

#[derive(Debug, Clone)]
pub struct SuccessView {
    binder: Binder,
    close: Node,
    title: Node,
    description: Node,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuccessState {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl SuccessView {
    pub fn new<F>(root: Node, on_close: F) -> UiResult<Self>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let binder = Binder::new(root, "success");
        let close = binder.ensure(".order-success__close")?;
        let title = binder.ensure(".order-success__title")?;
        let description = binder.ensure(".order-success__description")?;

        close.on(DomEventKind::Click, move |_| on_close());

        Ok(SuccessView {
            binder,
            close,
            title,
            description,
        })
    }

    pub fn close_button(&self) -> &Node {
        &self.close
    }
}

impl View for SuccessView {
    type State = SuccessState;

    fn root(&self) -> &Node {
        self.binder.root()
    }

    fn apply(&self, state: SuccessState) {
        if let Some(title) = state.title {
            set_text(&self.title, title);
        }
        if let Some(description) = state.description {
            set_text(&self.description, description);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_render_and_close() {
        let root = Node::new("div")
            .with_child(Node::new("h2").with_class("order-success__title"))
            .with_child(Node::new("p").with_class("order-success__description"))
            .with_child(Node::new("button").with_class("order-success__close"));
        let closed = Arc::new(AtomicBool::new(false));
        let flag = closed.clone();

        let view = SuccessView::new(root, move || flag.store(true, Ordering::SeqCst)).unwrap();
        view.render(Some(SuccessState {
            title: Some("Order placed".into()),
            description: Some("Written off 30 synapses".into()),
        }));

        assert_eq!(view.root().text(), "Order placedWritten off 30 synapses");
        view.close_button().click();
        assert!(closed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_missing_description_fails() {
        let root = Node::new("div")
            .with_child(Node::new("h2").with_class("order-success__title"))
            .with_child(Node::new("button").with_class("order-success__close"));
        assert!(SuccessView::new(root, || {}).is_err());
    }
}
