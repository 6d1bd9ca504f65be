//! CartStore: the owned cart state container.
//!
//! Invariants held by every operation:
//! - the published snapshot is unique by product id and every amount is >= 1
//! - a new snapshot is persisted before it is published; if persisting fails
//!   the previous snapshot stays both in memory and on disk
//! - writers are serialized by `write_gate` for the whole
//!   read -> check stock -> persist -> publish sequence, so no operation
//!   computes its next snapshot from a stale one

use std::sync::Arc;

use anyhow::Result;
use rks_api::StoreApi;
use rks_schemas::{Cart, ProductId};
use rks_storage::KeyValueStorage;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::error::{CartError, FailureCause};
use crate::notify::{Notice, Notifier};
use crate::persist;

/// Arguments of [`CartStore::update_product_amount`].
///
/// `amount` is signed so out-of-range requests (0, negatives) reach the
/// store and are reported, rather than being unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    pub amount: i64,
}

pub struct CartStore {
    api: Arc<dyn StoreApi>,
    storage: Arc<dyn KeyValueStorage>,
    notifier: Arc<dyn Notifier>,
    key: String,
    current: RwLock<Arc<Cart>>,
    write_gate: Mutex<()>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("api", &self.api.name())
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Build the store, seeding it from the snapshot persisted under `key`.
    ///
    /// Fails if the storage cannot be read or the snapshot is corrupt.
    pub fn open(
        key: impl Into<String>,
        api: Arc<dyn StoreApi>,
        storage: Arc<dyn KeyValueStorage>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let key = key.into();
        let initial = persist::load_snapshot(storage.as_ref(), &key)?;
        debug!(key = %key, entries = initial.len(), "cart snapshot loaded");

        Ok(Self {
            api,
            storage,
            notifier,
            key,
            current: RwLock::new(Arc::new(initial)),
            write_gate: Mutex::new(()),
        })
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    /// Current published snapshot.
    pub async fn cart(&self) -> Arc<Cart> {
        Arc::clone(&*self.current.read().await)
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Add one unit of `product_id`, appending it if not yet in the cart.
    pub async fn add_product(&self, product_id: ProductId) -> Result<(), CartError> {
        let _w = self.write_gate.lock().await;
        let result = self.try_add(product_id).await;
        self.settle("add_product", result)
    }

    /// Drop the entry for `product_id`.
    pub async fn remove_product(&self, product_id: ProductId) -> Result<(), CartError> {
        let _w = self.write_gate.lock().await;
        let result = self.try_remove(product_id).await;
        self.settle("remove_product", result)
    }

    /// Set the quantity of an entry already in the cart.
    pub async fn update_product_amount(&self, req: UpdateProductAmount) -> Result<(), CartError> {
        let _w = self.write_gate.lock().await;
        let result = self.try_update(req).await;
        self.settle("update_product_amount", result)
    }

    // -----------------------------------------------------------------------
    // Internals (caller holds write_gate)
    // -----------------------------------------------------------------------

    async fn try_add(&self, product_id: ProductId) -> Result<Arc<Cart>, CartError> {
        let failed = |cause: FailureCause| CartError::AddProductFailed { product_id, cause };

        let cart = self.cart().await;
        let existing = cart.amount_of(product_id);

        let stock = self
            .api
            .fetch_stock(product_id)
            .await
            .map_err(|e| failed(e.into()))?;

        let candidate = u64::from(existing) + 1;
        if candidate > u64::from(stock.amount) {
            return Err(CartError::OutOfStock {
                product_id,
                requested: candidate,
                available: stock.amount,
            });
        }
        // candidate <= stock.amount, so it fits in u32.
        let candidate = candidate as u32;

        let next = if existing > 0 {
            cart.with_amount(product_id, candidate)
                .ok_or_else(|| failed(FailureCause::Inconsistent("entry vanished".to_string())))?
        } else {
            let product = self
                .api
                .fetch_product(product_id)
                .await
                .map_err(|e| failed(e.into()))?;
            if product.id != product_id {
                return Err(failed(FailureCause::Inconsistent(format!(
                    "asked for product {product_id}, store returned {}",
                    product.id
                ))));
            }
            cart.with_appended(product.into_cart_entry(1)).ok_or_else(|| {
                failed(FailureCause::Inconsistent("entry already present".to_string()))
            })?
        };

        self.commit(next).await.map_err(failed)
    }

    async fn try_remove(&self, product_id: ProductId) -> Result<Arc<Cart>, CartError> {
        let cart = self.cart().await;
        let next = cart
            .without(product_id)
            .ok_or(CartError::ProductNotFound { product_id })?;

        self.commit(next)
            .await
            .map_err(|cause| CartError::RemoveProductFailed { product_id, cause })
    }

    async fn try_update(&self, req: UpdateProductAmount) -> Result<Arc<Cart>, CartError> {
        let UpdateProductAmount { product_id, amount } = req;
        let failed = |cause: FailureCause| CartError::UpdateAmountFailed { product_id, cause };

        if amount < 1 {
            return Err(CartError::InvalidAmount { product_id, amount });
        }

        let cart = self.cart().await;
        if !cart.contains(product_id) {
            return Err(CartError::ProductNotFound { product_id });
        }

        let stock = self
            .api
            .fetch_stock(product_id)
            .await
            .map_err(|e| failed(e.into()))?;

        if amount > i64::from(stock.amount) {
            return Err(CartError::OutOfStock {
                product_id,
                requested: amount as u64,
                available: stock.amount,
            });
        }
        // 1 <= amount <= stock.amount, so it fits in u32.
        let amount = amount as u32;

        let next = cart
            .with_amount(product_id, amount)
            .ok_or_else(|| failed(FailureCause::Inconsistent("entry vanished".to_string())))?;

        self.commit(next).await.map_err(failed)
    }

    /// Persist `next`, then publish it. Nothing is published on error.
    async fn commit(&self, next: Cart) -> Result<Arc<Cart>, FailureCause> {
        persist::save_snapshot(self.storage.as_ref(), &self.key, &next)?;

        let next = Arc::new(next);
        *self.current.write().await = Arc::clone(&next);
        Ok(next)
    }

    fn settle(
        &self,
        op: &'static str,
        result: Result<Arc<Cart>, CartError>,
    ) -> Result<(), CartError> {
        match result {
            Ok(cart) => {
                info!(op, entries = cart.len(), "cart updated");
                Ok(())
            }
            Err(err) => {
                match err.cause() {
                    Some(cause) => {
                        warn!(op, product_id = %err.product_id(), %cause, "{err}")
                    }
                    None => {
                        debug!(op, product_id = %err.product_id(), kind = ?err.kind(), "{err}")
                    }
                }
                self.notifier.notify(Notice::from(&err));
                Err(err)
            }
        }
    }
}
