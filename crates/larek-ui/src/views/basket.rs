//! Basket modal content: item list, total and the checkout button.

use larek_core::events::{EventBus, ShopEvent};

use crate::component::{set_disabled, set_text, Binder, View};
use crate::error::UiResult;
use crate::node::{DomEventKind, Node};

/// Shown in place of the list when the basket is empty.
pub const EMPTY_BASKET_TEXT: &str = "Basket is empty";

#[derive(Debug, Clone)]
pub struct BasketView {
    binder: Binder,
    list: Node,
    total: Node,
    button: Node,
}

#[derive(Debug, Clone, Default)]
pub struct BasketState {
    /// Rendered basket rows.
    pub items: Option<Vec<Node>>,
    /// Formatted total.
    pub total: Option<String>,
}

impl BasketView {
    pub fn new(root: Node, events: EventBus) -> UiResult<Self> {
        let binder = Binder::new(root, "basket");
        let list = binder.ensure(".basket__list")?;
        let total = binder.ensure(".basket__price")?;
        let button = binder.ensure(".basket__button")?;

        let start = events.trigger(ShopEvent::OrderStart);
        button.on(DomEventKind::Click, move |_| start());

        let view = BasketView {
            binder,
            list,
            total,
            button,
        };
        view.set_items(Vec::new());
        Ok(view)
    }

    /// Replaces the rows. An empty list shows a placeholder and disables
    /// checkout.
    pub fn set_items(&self, items: Vec<Node>) {
        if items.is_empty() {
            self.list
                .replace_children([Node::new("p").with_text(EMPTY_BASKET_TEXT)]);
            set_disabled(&self.button, true);
            return;
        }
        self.list.replace_children(items);
        set_disabled(&self.button, false);
    }

    pub fn set_total(&self, total: &str) {
        set_text(&self.total, total);
    }

    pub fn list(&self) -> &Node {
        &self.list
    }

    pub fn checkout_button(&self) -> &Node {
        &self.button
    }
}

impl View for BasketView {
    type State = BasketState;

    fn root(&self) -> &Node {
        self.binder.root()
    }

    fn apply(&self, state: BasketState) {
        if let Some(items) = state.items {
            self.set_items(items);
        }
        if let Some(total) = state.total {
            self.set_total(&total);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use larek_core::events::EventKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn basket_root() -> Node {
        Node::new("div")
            .with_class("basket")
            .with_child(Node::new("ul").with_class("basket__list"))
            .with_child(Node::new("button").with_class("basket__button"))
            .with_child(Node::new("span").with_class("basket__price"))
    }

    #[test]
    fn test_starts_empty_and_disabled() {
        let basket = BasketView::new(basket_root(), EventBus::new()).unwrap();
        assert_eq!(basket.list().text(), EMPTY_BASKET_TEXT);
        assert!(basket.checkout_button().is_disabled());
    }

    #[test]
    fn test_items_enable_checkout() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        bus.on(EventKind::OrderStart, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let basket = BasketView::new(basket_root(), bus).unwrap();
        basket.render(Some(BasketState {
            items: Some(vec![Node::new("li"), Node::new("li")]),
            total: Some("30 synapses".into()),
        }));

        assert_eq!(basket.list().children().len(), 2);
        assert_eq!(basket.root().query(".basket__price").unwrap().text(), "30 synapses");
        assert!(!basket.checkout_button().is_disabled());

        basket.checkout_button().click();
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        basket.set_items(Vec::new());
        assert!(basket.checkout_button().is_disabled());
        basket.checkout_button().click();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
