use anyhow::Result;
use rks_config::UnusedKeyPolicy;

/// Execute `rks config-hash <paths...>`.
pub fn config_hash(paths: &[String]) -> Result<()> {
    let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
    let loaded = rks_config::load_layered_yaml(&refs)?;
    let report = rks_config::report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn)?;

    println!("config_hash={}", loaded.config_hash);
    println!("unused_keys={}", report.unused_leaf_pointers.len());
    println!("{}", loaded.canonical_json);
    Ok(())
}
