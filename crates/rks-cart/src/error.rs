//! Cart operation failures.
//!
//! `Display` is the user-facing message delivered to the notice channel.
//! Generic failures keep their underlying cause as `source()`.

use std::fmt;

use rks_api::ApiError;
use rks_schemas::ProductId;
use rks_storage::StorageError;
use serde::{Deserialize, Serialize};

/// Stable tag for each failure kind (carried on notices).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartErrorKind {
    OutOfStock,
    ProductNotFound,
    InvalidAmount,
    AddProductFailed,
    UpdateAmountFailed,
    RemoveProductFailed,
}

impl CartErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CartErrorKind::OutOfStock => "out_of_stock",
            CartErrorKind::ProductNotFound => "product_not_found",
            CartErrorKind::InvalidAmount => "invalid_amount",
            CartErrorKind::AddProductFailed => "add_product_failed",
            CartErrorKind::UpdateAmountFailed => "update_amount_failed",
            CartErrorKind::RemoveProductFailed => "remove_product_failed",
        }
    }
}

/// What went wrong underneath a generic failure.
#[derive(Debug)]
pub enum FailureCause {
    Api(ApiError),
    Storage(StorageError),
    /// The store API answered with data the cart cannot accept.
    Inconsistent(String),
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureCause::Api(e) => write!(f, "store api: {e}"),
            FailureCause::Storage(e) => write!(f, "storage: {e}"),
            FailureCause::Inconsistent(msg) => write!(f, "inconsistent data: {msg}"),
        }
    }
}

impl std::error::Error for FailureCause {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FailureCause::Api(e) => Some(e),
            FailureCause::Storage(e) => Some(e),
            FailureCause::Inconsistent(_) => None,
        }
    }
}

impl From<ApiError> for FailureCause {
    fn from(e: ApiError) -> Self {
        FailureCause::Api(e)
    }
}

impl From<StorageError> for FailureCause {
    fn from(e: StorageError) -> Self {
        FailureCause::Storage(e)
    }
}

#[derive(Debug)]
pub enum CartError {
    /// Requested quantity exceeds what the store reports as available.
    OutOfStock {
        product_id: ProductId,
        requested: u64,
        available: u32,
    },
    /// Remove/update target is not in the cart.
    ProductNotFound { product_id: ProductId },
    /// Requested quantity is below 1.
    InvalidAmount { product_id: ProductId, amount: i64 },
    AddProductFailed {
        product_id: ProductId,
        cause: FailureCause,
    },
    UpdateAmountFailed {
        product_id: ProductId,
        cause: FailureCause,
    },
    RemoveProductFailed {
        product_id: ProductId,
        cause: FailureCause,
    },
}

impl CartError {
    pub fn kind(&self) -> CartErrorKind {
        match self {
            CartError::OutOfStock { .. } => CartErrorKind::OutOfStock,
            CartError::ProductNotFound { .. } => CartErrorKind::ProductNotFound,
            CartError::InvalidAmount { .. } => CartErrorKind::InvalidAmount,
            CartError::AddProductFailed { .. } => CartErrorKind::AddProductFailed,
            CartError::UpdateAmountFailed { .. } => CartErrorKind::UpdateAmountFailed,
            CartError::RemoveProductFailed { .. } => CartErrorKind::RemoveProductFailed,
        }
    }

    pub fn product_id(&self) -> ProductId {
        match self {
            CartError::OutOfStock { product_id, .. }
            | CartError::ProductNotFound { product_id }
            | CartError::InvalidAmount { product_id, .. }
            | CartError::AddProductFailed { product_id, .. }
            | CartError::UpdateAmountFailed { product_id, .. }
            | CartError::RemoveProductFailed { product_id, .. } => *product_id,
        }
    }

    pub fn cause(&self) -> Option<&FailureCause> {
        match self {
            CartError::AddProductFailed { cause, .. }
            | CartError::UpdateAmountFailed { cause, .. }
            | CartError::RemoveProductFailed { cause, .. } => Some(cause),
            _ => None,
        }
    }
}

impl fmt::Display for CartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            CartError::OutOfStock { .. } => "Requested quantity is out of stock",
            CartError::ProductNotFound { .. } => "Product is not in the cart",
            CartError::InvalidAmount { .. } => "Quantity must be at least 1",
            CartError::AddProductFailed { .. } => "Error adding product",
            CartError::UpdateAmountFailed { .. } => "Error changing product quantity",
            CartError::RemoveProductFailed { .. } => "Error removing product",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for CartError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause().map(|c| c as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_failure_keeps_cause_as_source() {
        let err = CartError::AddProductFailed {
            product_id: ProductId(3),
            cause: ApiError::Transport("connection refused".to_string()).into(),
        };
        assert_eq!(err.to_string(), "Error adding product");
        assert_eq!(err.kind(), CartErrorKind::AddProductFailed);

        let src = std::error::Error::source(&err).unwrap();
        assert_eq!(src.to_string(), "store api: transport error: connection refused");
    }

    #[test]
    fn domain_failures_have_no_source() {
        let err = CartError::OutOfStock {
            product_id: ProductId(1),
            requested: 6,
            available: 5,
        };
        assert!(std::error::Error::source(&err).is_none());
        assert_eq!(err.product_id(), ProductId(1));
    }

    #[test]
    fn kind_serializes_snake_case() {
        let s = serde_json::to_string(&CartErrorKind::OutOfStock).unwrap();
        assert_eq!(s, "\"out_of_stock\"");
        assert_eq!(CartErrorKind::OutOfStock.as_str(), "out_of_stock");
    }
}
