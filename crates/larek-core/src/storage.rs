//! # Snapshot Storage
//!
//! Best-effort persistence of the basket and draft order across reloads.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Snapshot storage contract                          │
//! │                                                                         │
//! │  key "larek.checkout"          { order, basket, savedAt }               │
//! │  key "larek.validOrderFields"  { validOrderFields }                     │
//! │                                                                         │
//! │  load:  missing ──► empty state                                         │
//! │         corrupt ──► empty state + warn!                                 │
//! │         store error ──► empty state + warn!                             │
//! │                                                                         │
//! │  save:  store error ──► warn!, never returned to the caller             │
//! │                                                                         │
//! │  The snapshot is advisory: the catalog from the backend is always the  │
//! │  authority, and stale entries are reconciled by product id.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The raw key/value backend is the [`KeyValueStore`] trait so this crate
//! stays free of I/O; larek-client provides the file-backed implementation.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CoreResult;
use crate::types::{Order, OrderField, Product};

/// Key holding the order and basket snapshot.
pub const CHECKOUT_KEY: &str = "larek.checkout";

/// Key holding the last known valid order fields.
pub const VALID_FIELDS_KEY: &str = "larek.validOrderFields";

// =============================================================================
// Key/Value Store
// =============================================================================

/// A string key/value store in the spirit of browser local storage.
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, or `None` if the key is absent.
    fn get(&self, key: &str) -> CoreResult<Option<String>>;

    /// Stores a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> CoreResult<()>;

    /// Deletes a key. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> CoreResult<()>;
}

/// In-memory store, used in tests and when persistence is disabled.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> CoreResult<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

// =============================================================================
// Snapshots
// =============================================================================

/// Order and basket as persisted under [`CHECKOUT_KEY`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSnapshot {
    #[serde(default)]
    pub order: Order,

    #[serde(default)]
    pub basket: Vec<Product>,

    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

/// Last known valid fields as persisted under [`VALID_FIELDS_KEY`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidFieldsSnapshot {
    #[serde(default)]
    valid_order_fields: BTreeMap<OrderField, String>,
}

// =============================================================================
// Snapshot Storage
// =============================================================================

/// Typed, fault-tolerant access to the two snapshot keys.
#[derive(Clone)]
pub struct SnapshotStorage {
    store: Arc<dyn KeyValueStore>,
}

impl fmt::Debug for SnapshotStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotStorage").finish_non_exhaustive()
    }
}

impl SnapshotStorage {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        SnapshotStorage { store }
    }

    /// Storage backed by a fresh [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Loads the order/basket snapshot; empty on any failure.
    pub fn load_checkout(&self) -> CheckoutSnapshot {
        self.load_json(CHECKOUT_KEY)
    }

    /// Saves the order/basket snapshot, stamping `saved_at`.
    pub fn save_checkout(&self, order: &Order, basket: &[Product]) {
        let snapshot = CheckoutSnapshot {
            order: order.clone(),
            basket: basket.to_vec(),
            saved_at: Some(Utc::now()),
        };
        self.save_json(CHECKOUT_KEY, &snapshot);
    }

    /// Loads the last known valid fields; empty on any failure.
    pub fn load_valid_fields(&self) -> BTreeMap<OrderField, String> {
        self.load_json::<ValidFieldsSnapshot>(VALID_FIELDS_KEY)
            .valid_order_fields
    }

    /// Saves the last known valid fields.
    pub fn save_valid_fields(&self, fields: &BTreeMap<OrderField, String>) {
        let snapshot = ValidFieldsSnapshot {
            valid_order_fields: fields.clone(),
        };
        self.save_json(VALID_FIELDS_KEY, &snapshot);
    }

    fn load_json<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key, "No stored snapshot");
                return T::default();
            }
            Err(e) => {
                warn!(key, error = %e, "Failed to read snapshot, starting empty");
                return T::default();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(key, error = %e, "Corrupt snapshot ignored");
            T::default()
        })
    }

    fn save_json<T: Serialize>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "Failed to encode snapshot");
                return;
            }
        };

        if let Err(e) = self.store.set(key, &raw) {
            warn!(key, error = %e, "Failed to save snapshot");
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
