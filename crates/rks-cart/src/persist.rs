//! Cart snapshot <-> key-value storage.

use anyhow::{Context, Result};
use rks_schemas::Cart;
use rks_storage::{KeyValueStorage, StorageError};

/// Read the persisted snapshot under `key`. Absent or blank means empty cart.
pub fn load_snapshot(storage: &dyn KeyValueStorage, key: &str) -> Result<Cart> {
    let raw = storage
        .get_item(key)
        .with_context(|| format!("failed to read cart snapshot '{key}'"))?;

    match raw {
        None => Ok(Cart::new()),
        Some(raw) if raw.trim().is_empty() => Ok(Cart::new()),
        Some(raw) => serde_json::from_str(&raw)
            .with_context(|| format!("cart snapshot '{key}' is corrupt")),
    }
}

/// Overwrite the snapshot under `key` with `cart`.
pub fn save_snapshot(
    storage: &dyn KeyValueStorage,
    key: &str,
    cart: &Cart,
) -> Result<(), StorageError> {
    let body = serde_json::to_string(cart).map_err(|e| StorageError::Encode(e.to_string()))?;
    storage.set_item(key, &body)
}
