//! # Shop API
//!
//! The two backend calls the storefront makes.
//!
//! ## Response Handling
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Response → Result mapping                            │
//! │                                                                         │
//! │  status    body                          result                         │
//! │  ──────    ────                          ──────                         │
//! │  2xx       { total, items }          ──► Ok(ProductList)                │
//! │  2xx       { id, total }             ──► Ok(OrderResult)                │
//! │  2xx       { error: "..." }          ──► Err(Rejected("..."))           │
//! │  non-2xx   { error: "..." }          ──► Err(Status { message: "..." }) │
//! │  non-2xx   anything else             ──► Err(Status { message:          │
//! │                                              status text })             │
//! │  2xx       not the expected JSON     ──► Err(Decode)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Product image paths come back relative to the CDN; [`HttpShopApi`]
//! resolves them before returning the catalog.

use async_trait::async_trait;
use larek_core::types::{Order, OrderResult, ProductList};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::error::{ClientError, ClientResult};

/// Backend operations used by the presenter.
#[async_trait]
pub trait ShopApi: Send + Sync {
    /// Fetches the catalog.
    async fn get_products(&self) -> ClientResult<ProductList>;

    /// Submits an order.
    async fn make_order(&self, order: &Order) -> ClientResult<OrderResult>;
}

// =============================================================================
// HTTP Implementation
// =============================================================================

/// `ShopApi` over HTTP with JSON bodies.
#[derive(Debug, Clone)]
pub struct HttpShopApi {
    client: reqwest::Client,
    base_url: String,
    cdn_url: String,
}

impl HttpShopApi {
    /// Creates a client for `base_url`, resolving images against `cdn_url`.
    ///
    /// ## Errors
    /// `InvalidUrl` if either URL is not http(s); `Transport` if the
    /// underlying client cannot be built.
    pub fn new(base_url: &str, cdn_url: &str) -> ClientResult<Self> {
        for url in [base_url, cdn_url] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ClientError::InvalidUrl(url.to_string()));
            }
        }

        let client = reqwest::Client::builder().build()?;

        Ok(HttpShopApi {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            cdn_url: cdn_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Prefixes a relative image path with the CDN URL.
    pub fn resolve_image(&self, image: &str) -> String {
        resolve_image(&self.cdn_url, image)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl ShopApi for HttpShopApi {
    async fn get_products(&self) -> ClientResult<ProductList> {
        let url = self.url("/product");
        debug!(%url, "Fetching catalog");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        let mut list: ProductList = decode(status, &body)?;
        for product in list.items.iter_mut() {
            product.image = self.resolve_image(&product.image);
        }

        info!(count = list.items.len(), total = list.total, "Catalog fetched");
        Ok(list)
    }

    async fn make_order(&self, order: &Order) -> ClientResult<OrderResult> {
        let url = self.url("/order");
        debug!(%url, items = order.items.len(), total = %order.total, "Posting order");

        let response = self.client.post(&url).json(order).send().await?;
        let status = response.status();
        let body = response.text().await?;

        let result = decode_order(status, &body)?;
        info!(id = %result.id, total = %result.total, "Order accepted");
        Ok(result)
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Maps a status and body onto `T` or the matching error.
pub fn decode<T: DeserializeOwned>(status: StatusCode, body: &str) -> ClientResult<T> {
    if !status.is_success() {
        let message = error_field(body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        });
        return Err(ClientError::Status {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(body).map_err(|e| ClientError::Decode(e.to_string()))
}

/// Like [`decode`], but a success body carrying `error` is a rejection.
pub fn decode_order(status: StatusCode, body: &str) -> ClientResult<OrderResult> {
    if status.is_success() {
        if let Some(message) = error_field(body) {
            return Err(ClientError::Rejected(message));
        }
    }
    decode(status, body)
}

/// Extracts a string `error` field from a JSON object body.
fn error_field(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("error")?.as_str().map(str::to_string)
}

fn resolve_image(cdn_url: &str, image: &str) -> String {
    if image.is_empty() || image.starts_with("http://") || image.starts_with("https://") {
        return image.to_string();
    }
    format!(
        "{}/{}",
        cdn_url.trim_end_matches('/'),
        image.trim_start_matches('/')
    )
}

// =============================================================================
// Unit Tests
// =============================================================================
