//! # Larek Storefront
//!
//! The orchestration layer: configuration, logging, templates and the
//! presenter that ties `larek-core`, `larek-ui` and `larek-client`
//! together.
//!
//! ## Module Organization
//! ```text
//! larek_storefront/
//! ├── lib.rs          ◄─── You are here (startup wiring)
//! ├── config.rs       ◄─── StorefrontConfig (toml + env)
//! ├── error.rs        ◄─── AppError
//! ├── templates.rs    ◄─── Document skeleton and <template>s
//! └── presenter.rs    ◄─── Bus handlers, order queue
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Storefront Startup                                │
//! │                                                                         │
//! │  1. Initialize Logging                                                  │
//! │     • tracing-subscriber with env filter, logs to stderr                │
//! │     • Default: info,larek=debug; override with RUST_LOG                 │
//! │                                                                         │
//! │  2. Load Configuration                                                  │
//! │     • defaults → storefront.toml → LAREK_* env → validate               │
//! │                                                                         │
//! │  3. Open Local Storage                                                  │
//! │     • FileStore in the storage dir; AppState restores its snapshot      │
//! │                                                                         │
//! │  4. Build Presenter                                                     │
//! │     • HttpShopApi, document from templates, views bound                 │
//! │                                                                         │
//! │  5. Load Catalog and render the page                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod presenter;
pub mod templates;

use std::sync::Arc;

use larek_client::{FileStore, HttpShopApi};
use larek_core::{AppState, EventBus, SnapshotStorage};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub use config::StorefrontConfig;
pub use error::{AppError, AppResult};
pub use presenter::Presenter;

/// Installs the global tracing subscriber.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,larek=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Opens storage and builds a presenter for `config`.
///
/// Without a storage directory the state lives in memory only.
pub fn build_presenter(config: &StorefrontConfig) -> AppResult<Presenter> {
    let bus = EventBus::new();

    let state = match config.storage.resolve_dir() {
        Some(dir) => {
            let store = FileStore::new(dir)?;
            AppState::with_storage(bus, SnapshotStorage::new(Arc::new(store)))
        }
        None => {
            warn!("No storage directory available, basket will not persist");
            AppState::new(bus)
        }
    };

    let api = HttpShopApi::new(&config.api.base_url, &config.api.cdn_url)?;
    info!(base_url = %api.base_url(), "Using shop API");

    Presenter::new(
        templates::document(),
        Arc::new(state),
        Arc::new(api),
        config.display.clone(),
    )
}
