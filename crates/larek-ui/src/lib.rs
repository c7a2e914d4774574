//! # larek-ui: Views for the Larek Storefront
//!
//! An in-memory element tree and the components that bind storefront
//! state onto it.
//!
//! ## Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          larek-ui                                       │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  views::*  +  form::{OrderForm, ContactsForm}                    │  │
//! │  │  Page, Product, BasketItem, Basket, Modal, Success               │  │
//! │  └──────────────────────────────┬───────────────────────────────────┘  │
//! │                                 │ composed from                         │
//! │  ┌──────────────────────────────▼───────────────────────────────────┐  │
//! │  │  component::{Binder, View}     form::FormBehavior                │  │
//! │  └──────────────────────────────┬───────────────────────────────────┘  │
//! │                                 │                                       │
//! │  ┌──────────────────────────────▼───────────────────────────────────┐  │
//! │  │  node::Node  (tree, selectors, events with bubbling, HTML)       │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Views never call into application state. User actions leave a view
//! either as a `ShopEvent` on the bus or through a callback supplied by
//! whoever built the view.
//!
//! ## Example
//! ```rust
//! use larek_core::events::EventBus;
//! use larek_ui::component::View;
//! use larek_ui::node::Node;
//! use larek_ui::views::{BasketState, BasketView};
//!
//! let root = Node::new("div")
//!     .with_child(Node::new("ul").with_class("basket__list"))
//!     .with_child(Node::new("span").with_class("basket__price"))
//!     .with_child(Node::new("button").with_class("basket__button"));
//!
//! let basket = BasketView::new(root, EventBus::new()).unwrap();
//! basket.render(Some(BasketState {
//!     total: Some("0 synapses".into()),
//!     ..BasketState::default()
//! }));
//! assert!(basket.checkout_button().is_disabled());
//! ```

pub mod component;
pub mod error;
pub mod form;
pub mod node;
pub mod selector;
pub mod views;

pub use component::{Binder, View};
pub use error::{UiError, UiResult};
pub use form::{ContactsForm, FormBehavior, FormState, OrderForm};
pub use node::{DomEvent, DomEventKind, Node, WeakNode};
