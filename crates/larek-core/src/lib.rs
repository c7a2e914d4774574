//! # larek-core: Pure State and Event Logic for the Larek Storefront
//!
//! This crate is the **heart** of the storefront. It owns the catalog,
//! basket, draft order and validation results, and the event bus that
//! keeps views in sync with them.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Larek Storefront Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    larek-ui (views + forms)                     │   │
//! │  │    Gallery ──► Preview ──► Basket ──► Order form ──► Contacts   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ ShopEvent                              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ larek-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  events   │  │   state   │  │ checkout  │  │ validation│  │   │
//! │  │   │ EventBus  │  │ AppState  │  │  steps    │  │  rules    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO RENDERING                           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │ KeyValueStore                          │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              larek-client (REST + local storage)                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Order, PaymentMethod, FormErrors)
//! - [`money`] - Integer price type
//! - [`error`] - Domain error types
//! - [`validation`] - Order field rules
//! - [`events`] - Typed publish/subscribe bus
//! - [`model`] - Observable base shared by stateful models
//! - [`state`] - `AppState`, the single source of storefront data
//! - [`checkout`] - Checkout step machine
//! - [`storage`] - Best-effort snapshot persistence contract
//!
//! ## Example Usage
//!
//! ```rust
//! use larek_core::events::{EventBus, EventKind, EventPattern};
//! use larek_core::state::AppState;
//! use larek_core::types::OrderField;
//!
//! let bus = EventBus::new();
//! bus.on(EventPattern::Kind(EventKind::OrderReady), |_event| Ok(()));
//!
//! let state = AppState::new(bus.clone());
//! state.set_order_field(OrderField::Address, "123 Main St").unwrap();
//! state.set_order_field(OrderField::Payment, "cash").unwrap();
//! assert!(state.is_previous_form_valid());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod events;
pub mod model;
pub mod money;
pub mod state;
pub mod storage;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use checkout::{CheckoutFlow, CheckoutStep};
pub use error::{CoreError, CoreResult, ValidationError};
pub use events::{EventBus, EventKind, EventPattern, FormName, ShopEvent, SubscriptionId};
pub use money::Money;
pub use state::AppState;
pub use storage::{KeyValueStore, MemoryStore, SnapshotStorage};
pub use types::*;
