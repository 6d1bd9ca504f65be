//! rks-schemas
//!
//! Shared value types for the storefront cart: catalog products, stock
//! records, cart entries and the immutable [`Cart`] snapshot.
//!
//! Nothing here performs I/O. Snapshot transitions return a new [`Cart`]
//! and leave the receiver untouched, so callers can publish the result
//! atomically or drop it.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Catalog identity of a product (stable integer id from the store API).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl ProductId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// Remote payloads
// ---------------------------------------------------------------------------

/// Product as served by `GET /products/{id}` (no cart quantity).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: ProductId,
    pub title: String,
    pub price: f64,
    /// Absolute image URL.
    pub image: String,
}

impl CatalogProduct {
    /// Turn a catalog record into a cart entry holding `amount` units.
    pub fn into_cart_entry(self, amount: u32) -> Product {
        Product {
            id: self.id,
            title: self.title,
            price: self.price,
            image: self.image,
            amount,
        }
    }
}

/// Stock record as served by `GET /stock/{id}`.
///
/// `amount` is the maximum purchasable quantity at the time of the fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub id: ProductId,
    pub amount: u32,
}

// ---------------------------------------------------------------------------
// Cart entry
// ---------------------------------------------------------------------------

/// One cart line. `amount` is the quantity in the cart and is always >= 1
/// while the entry is part of a [`Cart`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: f64,
    pub image: String,
    pub amount: u32,
}

impl Product {
    /// `price * amount` for this line.
    pub fn subtotal(&self) -> f64 {
        self.price * f64::from(self.amount)
    }
}

// ---------------------------------------------------------------------------
// Snapshot errors
// ---------------------------------------------------------------------------

/// Invariant violations found while building a [`Cart`] from raw entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// Two entries carry the same product id.
    DuplicateId(ProductId),
    /// An entry has `amount == 0`.
    ZeroAmount(ProductId),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::DuplicateId(id) => write!(f, "duplicate cart entry for product {id}"),
            SnapshotError::ZeroAmount(id) => write!(f, "cart entry for product {id} has amount 0"),
        }
    }
}

impl std::error::Error for SnapshotError {}

// ---------------------------------------------------------------------------
// Cart snapshot
// ---------------------------------------------------------------------------

/// Immutable, ordered cart snapshot, unique by product id.
///
/// Serializes as a bare JSON array of [`Product`] (the persisted format).
/// Deserialization re-checks the invariants and rejects snapshots with
/// duplicate ids or zero amounts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Product>", into = "Vec<Product>")]
pub struct Cart {
    entries: Vec<Product>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from raw entries, enforcing uniqueness and amount >= 1.
    pub fn from_entries(entries: Vec<Product>) -> Result<Self, SnapshotError> {
        for (i, p) in entries.iter().enumerate() {
            if p.amount == 0 {
                return Err(SnapshotError::ZeroAmount(p.id));
            }
            if entries[..i].iter().any(|q| q.id == p.id) {
                return Err(SnapshotError::DuplicateId(p.id));
            }
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[Product] {
        &self.entries
    }

    /// Distinct products in the cart.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.entries.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Quantity currently held for `id` (0 when absent).
    pub fn amount_of(&self, id: ProductId) -> u32 {
        self.get(id).map(|p| p.amount).unwrap_or(0)
    }

    pub fn subtotal(&self, id: ProductId) -> Option<f64> {
        self.get(id).map(Product::subtotal)
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(Product::subtotal).sum()
    }

    /// New snapshot with `entry` appended.
    ///
    /// Returns `None` if the id is already present or the amount is 0.
    pub fn with_appended(&self, entry: Product) -> Option<Cart> {
        if entry.amount == 0 || self.contains(entry.id) {
            return None;
        }
        let mut entries = self.entries.clone();
        entries.push(entry);
        Some(Cart { entries })
    }

    /// New snapshot with the amount of `id` replaced, position preserved.
    ///
    /// Returns `None` if `id` is absent or `amount` is 0.
    pub fn with_amount(&self, id: ProductId, amount: u32) -> Option<Cart> {
        if amount == 0 || !self.contains(id) {
            return None;
        }
        let entries = self
            .entries
            .iter()
            .map(|p| {
                if p.id == id {
                    Product {
                        amount,
                        ..p.clone()
                    }
                } else {
                    p.clone()
                }
            })
            .collect();
        Some(Cart { entries })
    }

    /// New snapshot without the entry for `id`. Returns `None` if absent.
    pub fn without(&self, id: ProductId) -> Option<Cart> {
        if !self.contains(id) {
            return None;
        }
        let entries = self.entries.iter().filter(|p| p.id != id).cloned().collect();
        Some(Cart { entries })
    }
}

impl TryFrom<Vec<Product>> for Cart {
    type Error = SnapshotError;

    fn try_from(entries: Vec<Product>) -> Result<Self, Self::Error> {
        Cart::from_entries(entries)
    }
}

impl From<Cart> for Vec<Product> {
    fn from(cart: Cart) -> Self {
        cart.entries
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
