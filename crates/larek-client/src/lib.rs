//! # larek-client: Network and Local Storage
//!
//! The I/O layer of the storefront.
//!
//! - [`api`] - `ShopApi` trait and the reqwest-backed `HttpShopApi`
//! - [`store`] - `FileStore`, the file-backed `KeyValueStore`
//! - [`error`] - `ClientError`
//!
//! ## Example
//! ```rust,no_run
//! use larek_client::api::{HttpShopApi, ShopApi};
//!
//! # async fn example() -> Result<(), larek_client::ClientError> {
//! let api = HttpShopApi::new(
//!     "https://larek-api.nomoreparties.co/api/weblarek",
//!     "https://larek-api.nomoreparties.co/content/weblarek",
//! )?;
//! let catalog = api.get_products().await?;
//! println!("{} products", catalog.items.len());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod error;
pub mod store;

pub use api::{HttpShopApi, ShopApi};
pub use error::{ClientError, ClientResult};
pub use store::FileStore;
