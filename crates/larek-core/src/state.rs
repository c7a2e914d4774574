//! # Application State
//!
//! `AppState` is the single source of truth for catalog, basket, draft
//! order and validation results. Views never touch it directly; the
//! presenter calls its methods and re-renders on the events it emits.
//!
//! ## Operations and Events
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    AppState operations                                  │
//! │                                                                         │
//! │  Operation              State change              Event emitted         │
//! │  ─────────              ────────────              ─────────────         │
//! │  set_products()    ───► catalog replaced     ───► ProductsChanged       │
//! │  add_to_basket()   ───► basket ∪ {id}        ───► (none)                │
//! │  remove_from_basket()─► basket ∖ {id}        ───► BasketShow            │
//! │  clear_basket()    ───► basket = ∅           ───► ProductsChanged       │
//! │  set_order_field() ───► order[field] = value ───► FormInvalid           │
//! │                                                   + OrderReady if valid │
//! │  validate_order()  ───► form_errors          ───► FormInvalid           │
//! │  clear_order_fields()─► order reset, cache ∅ ───► OrderCleared          │
//! │                                                                         │
//! │  Every mutating call saves a snapshot when storage is attached.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Locking
//! All methods take `&self`. The internal lock is released before any
//! event is emitted, so handlers are free to read the state back (for
//! example the basket view reading `basket()` on `BasketShow`).

use std::collections::BTreeMap;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::error::CoreResult;
use crate::events::{EventBus, ShopEvent};
use crate::model::Observable;
use crate::money::Money;
use crate::storage::SnapshotStorage;
use crate::types::{FormErrors, Order, OrderField, Product};
use crate::validation;

#[derive(Debug, Default)]
struct StateData {
    products: Vec<Product>,
    basket: Vec<Product>,
    order: Order,
    form_errors: FormErrors,
    valid_fields: BTreeMap<OrderField, String>,
}

/// The storefront's application state.
#[derive(Debug)]
pub struct AppState {
    model: Observable,
    data: Mutex<StateData>,
    storage: Option<SnapshotStorage>,
}

impl AppState {
    /// Creates empty state publishing on `events`.
    pub fn new(events: EventBus) -> Self {
        AppState {
            model: Observable::new(events),
            data: Mutex::new(StateData::default()),
            storage: None,
        }
    }

    /// Creates state restored from `storage`, which also receives every
    /// later snapshot.
    ///
    /// ## Restore Rules
    /// - Basket and draft order come from the checkout snapshot
    /// - Empty draft fields are refilled from the last known valid fields
    /// - The catalog always starts empty; `set_products` reconciles
    ///   basket markers once it loads
    pub fn with_storage(events: EventBus, storage: SnapshotStorage) -> Self {
        let snapshot = storage.load_checkout();
        let valid_fields = storage.load_valid_fields();

        let mut order = snapshot.order;
        for (field, value) in &valid_fields {
            if order.field(*field).is_empty() {
                // Cached values were valid when stored; a bad payment string
                // can only come from a hand-edited file.
                let _ = order.set_field(*field, value);
            }
        }

        let mut basket: Vec<Product> = Vec::with_capacity(snapshot.basket.len());
        for mut product in snapshot.basket {
            if basket.iter().any(|p| p.id == product.id) {
                continue;
            }
            product.in_basket = true;
            basket.push(product);
        }

        info!(
            basket = basket.len(),
            valid_fields = valid_fields.len(),
            "Restored checkout snapshot"
        );

        AppState {
            model: Observable::new(events),
            data: Mutex::new(StateData {
                products: Vec::new(),
                basket,
                order,
                form_errors: FormErrors::new(),
                valid_fields,
            }),
            storage: Some(storage),
        }
    }

    /// The bus this state publishes on.
    pub fn events(&self) -> &EventBus {
        self.model.events()
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Replaces the catalog and emits `ProductsChanged`.
    ///
    /// Basket entries are reconciled against the new catalog by id: entries
    /// still in the catalog are refreshed and their catalog product marked
    /// `in_basket`; entries no longer sold are dropped.
    pub fn set_products(&self, products: Vec<Product>) {
        let (products, order, basket) = {
            let mut data = self.data.lock();

            let mut catalog = products;
            for product in catalog.iter_mut() {
                product.in_basket = data.basket.iter().any(|b| b.id == product.id);
            }

            let before = data.basket.len();
            let refreshed: Vec<Product> = data
                .basket
                .iter()
                .filter_map(|b| catalog.iter().find(|p| p.id == b.id).cloned())
                .collect();
            if refreshed.len() != before {
                debug!(
                    dropped = before - refreshed.len(),
                    "Dropped basket entries missing from catalog"
                );
            }

            data.basket = refreshed;
            data.products = catalog;
            (data.products.clone(), data.order.clone(), data.basket.clone())
        };

        info!(count = products.len(), "Catalog loaded");
        self.persist_checkout(&order, &basket);
        self.model
            .emit_changes(ShopEvent::ProductsChanged { products });
    }

    /// Returns the catalog.
    pub fn products(&self) -> Vec<Product> {
        self.data.lock().products.clone()
    }

    /// Looks up a catalog product by id.
    pub fn product(&self, id: &str) -> Option<Product> {
        self.data.lock().products.iter().find(|p| p.id == id).cloned()
    }

    // =========================================================================
    // Basket
    // =========================================================================

    /// Returns the basket in insertion order.
    pub fn basket(&self) -> Vec<Product> {
        self.data.lock().basket.clone()
    }

    /// Number of basket entries.
    pub fn basket_len(&self) -> usize {
        self.data.lock().basket.len()
    }

    /// True if a product with `id` is in the basket.
    pub fn is_in_basket(&self, id: &str) -> bool {
        self.data.lock().basket.iter().any(|p| p.id == id)
    }

    /// Adds a product, keyed by id. Adding it again is a no-op.
    ///
    /// Returns true if the basket changed.
    pub fn add_to_basket(&self, product: &Product) -> bool {
        let snapshot = {
            let mut data = self.data.lock();
            if data.basket.iter().any(|p| p.id == product.id) {
                return false;
            }

            let mut entry = product.clone();
            entry.in_basket = true;
            data.basket.push(entry);
            set_marker(&mut data.products, &product.id, true);
            (data.order.clone(), data.basket.clone())
        };

        debug!(id = %product.id, size = snapshot.1.len(), "Added to basket");
        self.persist_checkout(&snapshot.0, &snapshot.1);
        true
    }

    /// Removes a product by id and emits `BasketShow`, even when the
    /// product was not in the basket.
    ///
    /// Returns true if the basket changed.
    pub fn remove_from_basket(&self, product: &Product) -> bool {
        let (removed, order, basket) = {
            let mut data = self.data.lock();
            let before = data.basket.len();
            data.basket.retain(|p| p.id != product.id);
            let removed = data.basket.len() != before;
            if removed {
                set_marker(&mut data.products, &product.id, false);
            }
            (removed, data.order.clone(), data.basket.clone())
        };

        debug!(id = %product.id, removed, "Removed from basket");
        if removed {
            self.persist_checkout(&order, &basket);
        }
        self.model.emit_changes(ShopEvent::BasketShow);
        removed
    }

    /// Empties the basket and emits `ProductsChanged` so "in basket"
    /// badges refresh.
    pub fn clear_basket(&self) {
        let (products, order) = {
            let mut data = self.data.lock();
            data.basket.clear();
            for product in data.products.iter_mut() {
                product.in_basket = false;
            }
            (data.products.clone(), data.order.clone())
        };

        debug!("Basket cleared");
        self.persist_checkout(&order, &[]);
        self.model
            .emit_changes(ShopEvent::ProductsChanged { products });
    }

    /// Sum of basket prices. Products without a price count as zero.
    pub fn total_price(&self) -> Money {
        let data = self.data.lock();
        Money::sum_priced(data.basket.iter().map(|p| &p.price))
    }

    // =========================================================================
    // Draft Order
    // =========================================================================

    /// Returns a copy of the draft order.
    pub fn order(&self) -> Order {
        self.data.lock().order.clone()
    }

    /// Errors from the most recent validation pass.
    pub fn form_errors(&self) -> FormErrors {
        self.data.lock().form_errors.clone()
    }

    /// The last known valid field values.
    pub fn valid_order_fields(&self) -> BTreeMap<OrderField, String> {
        self.data.lock().valid_fields.clone()
    }

    /// Assigns a draft field and validates it.
    ///
    /// Emits `FormInvalid` with the field-scoped errors, then `OrderReady`
    /// with the draft snapshot if the field passed. A failing field is
    /// removed from the last known valid set.
    ///
    /// ## Errors
    /// Only an unparseable payment value is an error; failed rules are
    /// reported through `FormInvalid` and the `false` return.
    pub fn set_order_field(&self, field: OrderField, value: &str) -> CoreResult<bool> {
        {
            let mut data = self.data.lock();
            data.order.set_field(field, value)?;
        }
        debug!(%field, "Order field set");

        let errors = self.validate_order(field);
        let valid = errors.is_empty();

        let (order, basket, valid_fields) = {
            let mut data = self.data.lock();
            if valid {
                let cached = if field.is_address_step() {
                    vec![OrderField::Address, OrderField::Payment]
                } else {
                    vec![field]
                };
                for f in cached {
                    let current = data.order.field(f);
                    data.valid_fields.insert(f, current);
                }
            } else {
                data.valid_fields.remove(&field);
            }
            (
                data.order.clone(),
                data.basket.clone(),
                data.valid_fields.clone(),
            )
        };

        self.persist_checkout(&order, &basket);
        self.persist_valid_fields(&valid_fields);

        if valid {
            self.model.emit_changes(ShopEvent::OrderReady(order));
        }
        Ok(valid)
    }

    /// Runs field-scoped validation, stores the result and emits
    /// `FormInvalid` (also when the mapping is empty).
    pub fn validate_order(&self, field: OrderField) -> FormErrors {
        let errors = {
            let mut data = self.data.lock();
            let errors = validation::validate_order_field(&data.order, field);
            data.form_errors = errors.clone();
            errors
        };

        self.model
            .emit_changes(ShopEvent::FormInvalid(errors.clone()));
        errors
    }

    /// True iff the address is filled and a payment method is selected.
    pub fn is_previous_form_valid(&self) -> bool {
        let data = self.data.lock();
        validation::validate_address_step(&data.order).is_ok()
    }

    /// True iff both email and phone satisfy their rules.
    pub fn is_contacts_valid(&self) -> bool {
        validation::contacts_valid(&self.data.lock().order)
    }

    /// Resets the draft order to its empty shape.
    pub fn clear_order(&self) {
        let basket = {
            let mut data = self.data.lock();
            data.order = Order::default();
            data.basket.clone()
        };
        self.persist_checkout(&Order::default(), &basket);
    }

    /// Resets the draft order, forgets the last known valid fields and
    /// emits `OrderCleared`.
    pub fn clear_order_fields(&self) {
        let basket = {
            let mut data = self.data.lock();
            data.order = Order::default();
            data.form_errors = FormErrors::new();
            data.valid_fields.clear();
            data.basket.clone()
        };

        debug!("Order fields cleared");
        self.persist_checkout(&Order::default(), &basket);
        self.persist_valid_fields(&BTreeMap::new());
        self.model.emit_changes(ShopEvent::OrderCleared);
    }

    /// Builds the submission payload: the draft with `items` (basket ids in
    /// basket order) and `total` computed from the basket.
    pub fn prepare_order(&self) -> Order {
        let mut data = self.data.lock();
        let items: Vec<String> = data.basket.iter().map(|p| p.id.clone()).collect();
        let total = Money::sum_priced(data.basket.iter().map(|p| &p.price));
        data.order.items = items;
        data.order.total = total;
        data.order.clone()
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    fn persist_checkout(&self, order: &Order, basket: &[Product]) {
        if let Some(storage) = &self.storage {
            storage.save_checkout(order, basket);
        }
    }

    fn persist_valid_fields(&self, fields: &BTreeMap<OrderField, String>) {
        if let Some(storage) = &self.storage {
            storage.save_valid_fields(fields);
        }
    }
}

fn set_marker(products: &mut [Product], id: &str, in_basket: bool) {
    if let Some(product) = products.iter_mut().find(|p| p.id == id) {
        product.in_basket = in_basket;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
