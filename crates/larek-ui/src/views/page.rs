//! Page chrome: header basket counter, gallery and the scroll-lock wrapper.

use larek_core::events::{EventBus, ShopEvent};

use crate::component::{set_text, Binder, View};
use crate::error::UiResult;
use crate::node::{DomEventKind, Node};

/// Class that freezes page scrolling while a modal is open.
pub const LOCKED_CLASS: &str = "page__wrapper_locked";

#[derive(Debug, Clone)]
pub struct PageView {
    binder: Binder,
    counter: Node,
    gallery: Node,
    basket: Node,
    wrapper: Node,
}

#[derive(Debug, Clone, Default)]
pub struct PageState {
    pub counter: Option<usize>,
    /// Gallery cards, replacing the current ones.
    pub catalog: Option<Vec<Node>>,
    pub locked: Option<bool>,
}

impl PageView {
    pub fn new(root: Node, events: EventBus) -> UiResult<Self> {
        let binder = Binder::new(root, "page");
        let counter = binder.ensure(".header__basket-counter")?;
        let gallery = binder.ensure(".gallery")?;
        let basket = binder.ensure(".header__basket")?;
        let wrapper = binder.ensure(".page__wrapper")?;

        let show_basket = events.trigger(ShopEvent::BasketShow);
        basket.on(DomEventKind::Click, move |_| show_basket());

        Ok(PageView {
            binder,
            counter,
            gallery,
            basket,
            wrapper,
        })
    }

    pub fn set_counter(&self, count: usize) {
        set_text(&self.counter, count);
    }

    pub fn set_catalog(&self, cards: Vec<Node>) {
        self.gallery.replace_children(cards);
    }

    pub fn set_locked(&self, locked: bool) {
        self.wrapper.toggle_class(LOCKED_CLASS, Some(locked));
    }

    pub fn gallery(&self) -> &Node {
        &self.gallery
    }

    pub fn basket_button(&self) -> &Node {
        &self.basket
    }

    pub fn counter(&self) -> &Node {
        &self.counter
    }

    pub fn is_locked(&self) -> bool {
        self.wrapper.has_class(LOCKED_CLASS)
    }
}

impl View for PageView {
    type State = PageState;

    fn root(&self) -> &Node {
        self.binder.root()
    }

    fn apply(&self, state: PageState) {
        if let Some(count) = state.counter {
            self.set_counter(count);
        }
        if let Some(cards) = state.catalog {
            self.set_catalog(cards);
        }
        if let Some(locked) = state.locked {
            self.set_locked(locked);
        }
    }
}
