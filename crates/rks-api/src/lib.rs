//! rks-api
//!
//! Store API boundary: the [`StoreApi`] trait the cart talks to, and the
//! reqwest-backed [`HttpStoreApi`] that calls the storefront REST service.
//!
//! Endpoints used:
//! - `GET {base}/stock/{id}`    -> `{ "id": 1, "amount": 3 }`
//! - `GET {base}/products/{id}` -> `{ "id": 1, "title": "...", "price": 179.9, "image": "..." }`
//!
//! No caching, no retries, no timeouts. A failed call is reported once and
//! the caller decides what to do.

pub mod error;

pub use error::ApiError;

use rks_schemas::{CatalogProduct, ProductId, Stock};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

/// Default base URL of the storefront API (json-server dev setup).
pub const DEFAULT_BASE_URL: &str = "http://localhost:3333";

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Read-only view of the remote store used by the cart.
///
/// Object-safe so the cart can hold an `Arc<dyn StoreApi>`.
#[async_trait::async_trait]
pub trait StoreApi: Send + Sync {
    /// Human-readable adapter name (e.g. `"http"`).
    fn name(&self) -> &'static str;

    /// Current maximum purchasable quantity for `id`.
    async fn fetch_stock(&self, id: ProductId) -> Result<Stock, ApiError>;

    /// Catalog details for `id`.
    async fn fetch_product(&self, id: ProductId) -> Result<CatalogProduct, ApiError>;
}

// ---------------------------------------------------------------------------
// HTTP adapter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct HttpStoreApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpStoreApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, resource: &str, id: ProductId) -> String {
        format!("{}/{}/{}", self.base_url.trim_end_matches('/'), resource, id)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, ApiError> {
        debug!(%url, "store api GET");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url,
            });
        }

        resp.json::<T>()
            .await
            .map_err(|e| ApiError::Decode(format!("{url}: {e}")))
    }
}

impl Default for HttpStoreApi {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Stock payload as served. Some deployments omit `id`; the requested id
/// fills the gap. A present `id` must match the requested one.
#[derive(Debug, Deserialize)]
struct StockBody {
    #[serde(default)]
    id: Option<ProductId>,
    amount: u32,
}

#[async_trait::async_trait]
impl StoreApi for HttpStoreApi {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch_stock(&self, id: ProductId) -> Result<Stock, ApiError> {
        let url = self.url("stock", id);
        let body: StockBody = self.get_json(url.clone()).await?;
        match body.id {
            Some(got) if got != id => Err(ApiError::Decode(format!(
                "{url}: stock record is for product {got}"
            ))),
            _ => Ok(Stock {
                id,
                amount: body.amount,
            }),
        }
    }

    async fn fetch_product(&self, id: ProductId) -> Result<CatalogProduct, ApiError> {
        self.get_json(self.url("products", id)).await
    }
}
