//! rks-testkit
//!
//! In-process doubles for cart scenario tests:
//! - [`FakeStoreApi`]: scripted catalog + stock, call counters, outage switch
//! - [`RecordingNotifier`]: keeps every notice for assertions
//! - [`FlakyStorage`]: memory storage whose writes can be made to fail
//!
//! Test-only crate. Never list it under a production `[dependencies]`.

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use rks_api::{ApiError, StoreApi};
use rks_cart::{CartStore, Notice, Notifier};
use rks_schemas::{CatalogProduct, ProductId, Stock};
use rks_storage::{KeyValueStorage, MemoryStorage, StorageError};

pub const CART_KEY: &str = "@RocketShoes:cart";

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|p| p.into_inner())
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Catalog record with deterministic title/image for `id`.
pub fn sneaker(id: u64, price: f64) -> CatalogProduct {
    CatalogProduct {
        id: ProductId(id),
        title: format!("Tênis modelo {id}"),
        price,
        image: format!("https://rocketseat-cdn.s3-sa-east-1.amazonaws.com/modulo-redux/tenis{id}.jpg"),
    }
}

// ---------------------------------------------------------------------------
// FakeStoreApi
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct FakeStoreApi {
    catalog: Mutex<BTreeMap<ProductId, CatalogProduct>>,
    stock: Mutex<BTreeMap<ProductId, u32>>,
    offline: AtomicBool,
    stock_calls: AtomicUsize,
    product_calls: AtomicUsize,
}

impl FakeStoreApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `product` with `stock` units available.
    pub fn with_product(self, product: CatalogProduct, stock: u32) -> Self {
        self.put_product(product, stock);
        self
    }

    pub fn put_product(&self, product: CatalogProduct, stock: u32) {
        lock(&self.stock).insert(product.id, stock);
        lock(&self.catalog).insert(product.id, product);
    }

    /// Serve `product` (and `stock`) when `id` is requested, even if
    /// `product.id` differs.
    pub fn put_product_under(&self, id: ProductId, product: CatalogProduct, stock: u32) {
        lock(&self.stock).insert(id, stock);
        lock(&self.catalog).insert(id, product);
    }

    /// Stock without a catalog record (product details lookup will 404).
    pub fn set_stock(&self, id: ProductId, amount: u32) {
        lock(&self.stock).insert(id, amount);
    }

    /// While offline every call fails with a transport error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn stock_calls(&self) -> usize {
        self.stock_calls.load(Ordering::SeqCst)
    }

    pub fn product_calls(&self) -> usize {
        self.product_calls.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<(), ApiError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ApiError::Transport("connection refused".to_string()));
        }
        Ok(())
    }

    fn not_found(resource: &str, id: ProductId) -> ApiError {
        ApiError::Status {
            status: 404,
            url: format!("fake://{resource}/{id}"),
        }
    }
}

#[async_trait::async_trait]
impl StoreApi for FakeStoreApi {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn fetch_stock(&self, id: ProductId) -> Result<Stock, ApiError> {
        self.stock_calls.fetch_add(1, Ordering::SeqCst);
        // Suspension point, like a real network call.
        tokio::task::yield_now().await;
        self.check_online()?;
        lock(&self.stock)
            .get(&id)
            .map(|&amount| Stock { id, amount })
            .ok_or_else(|| Self::not_found("stock", id))
    }

    async fn fetch_product(&self, id: ProductId) -> Result<CatalogProduct, ApiError> {
        self.product_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.check_online()?;
        lock(&self.catalog)
            .get(&id)
            .cloned()
            .ok_or_else(|| Self::not_found("products", id))
    }
}

// ---------------------------------------------------------------------------
// RecordingNotifier
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        lock(&self.notices).clone()
    }

    pub fn messages(&self) -> Vec<String> {
        lock(&self.notices).iter().map(|n| n.message.clone()).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        lock(&self.notices).push(notice);
    }
}

// ---------------------------------------------------------------------------
// FlakyStorage
// ---------------------------------------------------------------------------

/// Memory storage with a switch that makes `set_item` fail.
#[derive(Debug, Default)]
pub struct FlakyStorage {
    inner: MemoryStorage,
    fail_writes: AtomicBool,
}

impl FlakyStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(json: &str) -> Self {
        Self {
            inner: MemoryStorage::with_items([(CART_KEY, json)]),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Raw persisted cart snapshot, if any.
    pub fn raw_snapshot(&self) -> Option<String> {
        self.inner.get_item(CART_KEY).ok().flatten()
    }
}

impl KeyValueStorage for FlakyStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Io {
                path: PathBuf::from("flaky://storage"),
                source: io::Error::new(io::ErrorKind::Other, "disk full"),
            });
        }
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove_item(key)
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// A store wired to fakes, with handles kept for assertions.
pub struct Harness {
    pub store: CartStore,
    pub api: Arc<FakeStoreApi>,
    pub storage: Arc<FlakyStorage>,
    pub notices: Arc<RecordingNotifier>,
}

impl Harness {
    pub fn new(api: FakeStoreApi) -> Self {
        Self::with_storage(api, FlakyStorage::new())
    }

    pub fn with_storage(api: FakeStoreApi, storage: FlakyStorage) -> Self {
        let api = Arc::new(api);
        let storage = Arc::new(storage);
        let notices = Arc::new(RecordingNotifier::new());
        let store = CartStore::open(
            CART_KEY,
            Arc::clone(&api) as Arc<dyn StoreApi>,
            Arc::clone(&storage) as Arc<dyn KeyValueStorage>,
            Arc::clone(&notices) as Arc<dyn Notifier>,
        )
        .unwrap_or_else(|e| panic!("harness store failed to open: {e:#}"));
        Self {
            store,
            api,
            storage,
            notices,
        }
    }

    /// Decode whatever is persisted right now (empty cart if nothing).
    pub fn persisted(&self) -> rks_schemas::Cart {
        match self.storage.raw_snapshot() {
            Some(raw) => decode_snapshot(&raw),
            None => rks_schemas::Cart::new(),
        }
    }
}

fn decode_snapshot(raw: &str) -> rks_schemas::Cart {
    rks_cart::persist::load_snapshot(&MemoryStorage::with_items([(CART_KEY, raw)]), CART_KEY)
        .unwrap_or_else(|e| panic!("persisted snapshot does not decode: {e:#}"))
}
