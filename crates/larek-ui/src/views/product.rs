//! Product cards: gallery card, preview card, basket row.

use larek_core::types::ProductCategory;

use crate::component::{set_disabled, set_image, set_text, Binder, View};
use crate::error::UiResult;
use crate::node::{DomEventKind, Node};

const TITLE: &str = ".card__title";
const IMAGE: &str = ".card__image";
const CATEGORY: &str = ".card__category";
const PRICE: &str = ".card__price";
const BUTTON: &str = ".card__button";
const DESCRIPTION: &str = ".card__text";
const INDEX: &str = ".basket__item-index";
const DELETE: &str = ".basket__item-delete";

// =============================================================================
// Buy Button Status
// =============================================================================

/// What the buy button offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuyStatus {
    Available,
    InBasket,
    /// The product has no price.
    Unavailable,
}

impl BuyStatus {
    pub fn of(for_sale: bool, in_basket: bool) -> Self {
        match (for_sale, in_basket) {
            (false, _) => BuyStatus::Unavailable,
            (true, true) => BuyStatus::InBasket,
            (true, false) => BuyStatus::Available,
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            BuyStatus::Available => "Add to basket",
            BuyStatus::InBasket => "Already in basket",
            BuyStatus::Unavailable => "Unavailable",
        }
    }

    pub const fn disabled(&self) -> bool {
        !matches!(self, BuyStatus::Available)
    }
}

// =============================================================================
// Product View
// =============================================================================

/// Gallery card or, built with [`ProductView::preview`], the full preview.
#[derive(Debug, Clone)]
pub struct ProductView {
    binder: Binder,
    title: Node,
    image: Node,
    category: Node,
    price: Node,
    button: Option<Node>,
    description: Option<Node>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductState {
    pub title: Option<String>,
    pub image: Option<String>,
    /// Backend category label; also selects the modifier class.
    pub category: Option<String>,
    /// Formatted price text.
    pub price: Option<String>,
    pub status: Option<BuyStatus>,
    pub description: Option<String>,
}

impl ProductView {
    /// Binds a gallery card. `on_click` fires from the card's button, or
    /// from the whole card when it has none.
    pub fn new<F>(root: Node, on_click: F) -> UiResult<Self>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let binder = Binder::new(root, "product card");
        let title = binder.ensure(TITLE)?;
        let image = binder.ensure(IMAGE)?;
        let category = binder.ensure(CATEGORY)?;
        let price = binder.ensure(PRICE)?;
        let button = binder.find(BUTTON);

        let target = button.clone().unwrap_or_else(|| binder.root().clone());
        target.on(DomEventKind::Click, move |_| on_click());

        Ok(ProductView {
            binder,
            title,
            image,
            category,
            price,
            button,
            description: None,
        })
    }

    /// Binds the preview card, which also requires a description node.
    pub fn preview<F>(root: Node, on_click: F) -> UiResult<Self>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut view = Self::new(root, on_click)?;
        view.description = Some(view.binder.ensure(DESCRIPTION)?);
        Ok(view)
    }

    pub fn set_category(&self, label: &str) {
        set_text(&self.category, label);
        let kind = ProductCategory::from_label(label);
        for other in ProductCategory::ALL {
            let class = format!("card__category_{}", other.modifier());
            self.category.toggle_class(&class, Some(other == kind));
        }
    }

    pub fn set_status(&self, status: BuyStatus) {
        if let Some(button) = &self.button {
            set_text(button, status.label());
            set_disabled(button, status.disabled());
        }
    }

    pub fn button(&self) -> Option<&Node> {
        self.button.as_ref()
    }
}

impl View for ProductView {
    type State = ProductState;

    fn root(&self) -> &Node {
        self.binder.root()
    }

    fn apply(&self, state: ProductState) {
        if let Some(title) = state.title {
            set_text(&self.title, &title);
        }
        if let Some(image) = state.image {
            let alt = self.title.text();
            set_image(&self.image, &image, Some(&alt));
        }
        if let Some(category) = state.category {
            self.set_category(&category);
        }
        if let Some(price) = state.price {
            set_text(&self.price, price);
        }
        if let Some(status) = state.status {
            self.set_status(status);
        }
        if let (Some(node), Some(description)) = (&self.description, state.description) {
            set_text(node, description);
        }
    }
}

// =============================================================================
// Basket Item View
// =============================================================================

/// One row of the basket list.
#[derive(Debug, Clone)]
pub struct BasketItemView {
    binder: Binder,
    index: Node,
    title: Node,
    price: Node,
    delete: Node,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasketItemState {
    /// 1-based position in the list.
    pub index: Option<usize>,
    pub title: Option<String>,
    pub price: Option<String>,
}

impl BasketItemView {
    pub fn new<F>(root: Node, on_delete: F) -> UiResult<Self>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let binder = Binder::new(root, "basket item");
        let index = binder.ensure(INDEX)?;
        let title = binder.ensure(TITLE)?;
        let price = binder.ensure(PRICE)?;
        let delete = binder.ensure(DELETE)?;

        delete.on(DomEventKind::Click, move |_| on_delete());

        Ok(BasketItemView {
            binder,
            index,
            title,
            price,
            delete,
        })
    }

    pub fn delete_button(&self) -> &Node {
        &self.delete
    }
}

impl View for BasketItemView {
    type State = BasketItemState;

    fn root(&self) -> &Node {
        self.binder.root()
    }

    fn apply(&self, state: BasketItemState) {
        if let Some(index) = state.index {
            set_text(&self.index, index);
        }
        if let Some(title) = state.title {
            set_text(&self.title, title);
        }
        if let Some(price) = state.price {
            set_text(&self.price, price);
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
