//! rks-config
//!
//! Layered YAML configuration for the cart client.
//!
//! Docs are merged in order (earlier = base, later = override, maps merge
//! deeply, everything else replaces). The merged document is hashed over its
//! canonical JSON form and then decoded into [`AppConfig`]; every key is
//! optional and falls back to the dev defaults.
//!
//! ```yaml
//! api:
//!   base_url: "http://localhost:3333"
//! storage:
//!   path: ".rks/storage.json"
//!   cart_key: "@RocketShoes:cart"
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

/// Storage key the storefront has always used for the cart snapshot.
pub const DEFAULT_CART_KEY: &str = "@RocketShoes:cart";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3333";
pub const DEFAULT_STORAGE_PATH: &str = ".rks/storage.json";

/// Environment variable that overrides `api.base_url`.
pub const ENV_API_BASE_URL: &str = "RKS_API_BASE_URL";

// ---------------------------------------------------------------------------
// Typed config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Backing file for the key-value store.
    pub path: PathBuf,
    /// Key the cart snapshot is persisted under.
    pub cart_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STORAGE_PATH),
            cart_key: DEFAULT_CART_KEY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Apply environment overrides. `lookup` is `std::env::var` in the binary.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_BASE_URL).filter(|s| !s.trim().is_empty()) {
            tracing::debug!(var = ENV_API_BASE_URL, "api.base_url overridden from env");
            self.api.base_url = url.trim().to_string();
        }
    }

    /// Reject values no adapter can use. Run again after `apply_env`.
    pub fn validate(&self) -> Result<()> {
        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            bail!("api.base_url must be an http(s) URL (got '{url}')");
        }
        if self.storage.cart_key.trim().is_empty() {
            bail!("storage.cart_key must not be empty");
        }
        if self.storage.path.as_os_str().is_empty() {
            bail!("storage.path must not be empty");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Layered loading
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
    pub app: AppConfig,
}

pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let mut docs: Vec<String> = Vec::new();
    for p in paths {
        let raw =
            fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}"))?;
        docs.push(raw);
    }

    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged = serde_json::json!({});
    for raw in yaml_docs {
        let v_yaml: serde_yaml::Value = serde_yaml::from_str(raw).context("invalid yaml")?;
        // An empty document parses as null; treat it as "no overrides".
        if v_yaml.is_null() {
            continue;
        }
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        merged = deep_merge(merged, v_json);
    }

    let app: AppConfig =
        serde_json::from_value(merged.clone()).context("config does not match schema")?;
    app.validate()?;

    let canonical_json = canonicalize_json(&merged)?;
    let config_hash = sha256_hex(canonical_json.as_bytes());
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
        app,
    })
}

fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (k, b_val) in b_map {
                let a_val = a_map.remove(&k).unwrap_or(Value::Null);
                a_map.insert(k, deep_merge(a_val, b_val));
            }
            Value::Object(a_map)
        }
        (_, b_other) => b_other,
    }
}

fn canonicalize_json(v: &Value) -> Result<String> {
    // serde_json::Map is BTreeMap-backed (no preserve_order), so keys serialize sorted.
    serde_json::to_string(v).context("canonical json serialize failed")
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

// ---------------------------------------------------------------------------
// Unused-key guard
// ---------------------------------------------------------------------------

/// JSON-pointer prefixes the client actually reads.
pub const CONSUMED_POINTERS: &[&str] = &["/api/base_url", "/storage/path", "/storage/cart_key"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKeyPolicy {
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnusedKeyReport {
    /// Sorted leaf pointers not covered by [`CONSUMED_POINTERS`].
    pub unused_leaf_pointers: Vec<String>,
}

impl UnusedKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unused_leaf_pointers.is_empty()
    }
}

/// Report config leaves nobody reads.
///
/// Typed decoding already rejects unknown keys inside `api` and `storage`;
/// this catches stray top-level sections, which serde ignores.
pub fn report_unused_keys(config_json: &Value, policy: UnusedKeyPolicy) -> Result<UnusedKeyReport> {
    let mut leaves: Vec<String> = Vec::new();
    collect_leaf_pointers(config_json, "", &mut leaves);

    let consumed: BTreeSet<&str> = CONSUMED_POINTERS.iter().copied().collect();
    let mut unused: Vec<String> = leaves
        .into_iter()
        .filter(|lp| !consumed.iter().any(|cp| is_prefix_pointer(cp, lp)))
        // `{}` root with no leaves shows up as "/"; nothing to report.
        .filter(|lp| lp != "/")
        .collect();
    unused.sort();
    unused.dedup();

    let report = UnusedKeyReport {
        unused_leaf_pointers: unused,
    };

    match policy {
        UnusedKeyPolicy::Fail if !report.is_clean() => bail!(
            "CONFIG_UNUSED_KEYS: {} unused config leaf key(s): {:?}",
            report.unused_leaf_pointers.len(),
            report.unused_leaf_pointers
        ),
        UnusedKeyPolicy::Warn if !report.is_clean() => {
            tracing::warn!(keys = ?report.unused_leaf_pointers, "unused config keys");
        }
        _ => {}
    }

    Ok(report)
}

/// "/a/b" covers "/a/b" and "/a/b/c" but not "/a/bc".
fn is_prefix_pointer(prefix: &str, leaf: &str) -> bool {
    if leaf == prefix {
        return true;
    }
    leaf.starts_with(prefix) && leaf[prefix.len()..].starts_with('/')
}

fn collect_leaf_pointers(v: &Value, prefix: &str, out: &mut Vec<String>) {
    match v {
        Value::Object(map) if !map.is_empty() => {
            for (k, vv) in map.iter() {
                let next = format!("{}/{}", prefix, escape_pointer_token(k));
                collect_leaf_pointers(vv, &next, out);
            }
        }
        Value::Array(arr) if !arr.is_empty() => {
            for (i, vv) in arr.iter().enumerate() {
                let next = format!("{}/{}", prefix, i);
                collect_leaf_pointers(vv, &next, out);
            }
        }
        _ => {
            let p = if prefix.is_empty() {
                "/".to_string()
            } else {
                prefix.to_string()
            };
            out.push(p);
        }
    }
}

fn escape_pointer_token(s: &str) -> String {
    s.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_pointer_respects_segment_boundary() {
        assert!(is_prefix_pointer("/api/base_url", "/api/base_url"));
        assert!(is_prefix_pointer("/storage", "/storage/path"));
        assert!(!is_prefix_pointer("/storage/path", "/storage/paths"));
    }

    #[test]
    fn deep_merge_overrides_leaves_and_keeps_siblings() {
        let a = serde_json::json!({"storage": {"path": "a.json", "cart_key": "k"}});
        let b = serde_json::json!({"storage": {"path": "b.json"}});
        let m = deep_merge(a, b);
        assert_eq!(m["storage"]["path"], "b.json");
        assert_eq!(m["storage"]["cart_key"], "k");
    }

    #[test]
    fn env_override_applies_trimmed_value() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(|k| (k == ENV_API_BASE_URL).then(|| " https://api.shop.test ".to_string()));
        assert_eq!(cfg.api.base_url, "https://api.shop.test");
    }

    #[test]
    fn env_override_ignores_blank() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(|_| Some("   ".to_string()));
        assert_eq!(cfg.api.base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn env_override_is_subject_to_validation() {
        let mut cfg = AppConfig::default();
        cfg.validate().unwrap();

        cfg.apply_env(|k| (k == ENV_API_BASE_URL).then(|| "not-a-url".to_string()));
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("api.base_url"), "got {err}");
    }
}
