//! Command handler modules for rks.
//!
//! Shared wiring (config -> store) lives here; command logic lives in the
//! submodules.

pub mod cart;
pub mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use rks_api::{HttpStoreApi, StoreApi};
use rks_cart::{CartStore, Notice, Notifier};
use rks_config::{AppConfig, UnusedKeyPolicy};
use rks_storage::{FileStorage, KeyValueStorage};
use tracing::info;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Prints one line per notice on stderr, the CLI's stand-in for a toast.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        eprintln!(
            "notice kind={} product_id={} message=\"{}\"",
            notice.kind.as_str(),
            notice.product_id,
            notice.message
        );
    }
}

/// Resolve config from layered YAML (if any) plus environment overrides.
pub fn resolve_config(config_paths: &[String]) -> Result<AppConfig> {
    let mut app = if config_paths.is_empty() {
        AppConfig::default()
    } else {
        let refs: Vec<&str> = config_paths.iter().map(String::as_str).collect();
        let loaded = rks_config::load_layered_yaml(&refs)?;
        rks_config::report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn)?;
        info!(config_hash = %loaded.config_hash, "config loaded");
        loaded.app
    };

    app.apply_env(|k| std::env::var(k).ok());
    app.validate().context("invalid config after environment overrides")?;
    Ok(app)
}

/// Build the cart store the CLI operates on.
pub fn open_store(config_paths: &[String]) -> Result<CartStore> {
    let cfg = resolve_config(config_paths)?;

    let api = HttpStoreApi::new(cfg.api.base_url.clone());
    let storage = FileStorage::new(cfg.storage.path.clone());

    CartStore::open(
        cfg.storage.cart_key.clone(),
        Arc::new(api) as Arc<dyn StoreApi>,
        Arc::new(storage) as Arc<dyn KeyValueStorage>,
        Arc::new(ConsoleNotifier) as Arc<dyn Notifier>,
    )
    .with_context(|| format!("open cart store at {}", cfg.storage.path.display()))
}
