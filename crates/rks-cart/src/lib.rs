//! rks-cart
//!
//! Storefront cart state: an owned [`CartStore`] that keeps the cart in
//! memory, mirrors it to key-value storage on every change, and checks the
//! remote stock before any quantity goes up.
//!
//! Callers inject the collaborators:
//! - [`rks_api::StoreApi`] for stock and catalog lookups
//! - [`rks_storage::KeyValueStorage`] for the persisted snapshot
//! - [`Notifier`] for user-facing failure notices

pub mod error;
pub mod notify;
pub mod persist;
pub mod store;

pub use error::{CartError, CartErrorKind, FailureCause};
pub use notify::{BroadcastNotifier, Notice, Notifier, TracingNotifier};
pub use store::{CartStore, UpdateProductAmount};

pub use rks_schemas::{Cart, CatalogProduct, Product, ProductId, Stock};
