//! `rks cart ...` against a mock store API and a temp storage file.
//!
//! GREEN when:
//! - `cart show` on a fresh storage prints an empty cart
//! - `cart add` persists across invocations and `cart show` lists the entry
//! - `cart set-amount` above stock fails non-zero with the out-of-stock notice
//! - `cart set-amount 0` fails with the invalid-amount notice
//! - `cart remove` of an absent id fails with the not-found notice
//! - `config-hash` prints a 64-hex hash
//! - a non-http `RKS_API_BASE_URL` fails as a config error before any cart work

use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use httpmock::prelude::*;
use predicates::prelude::*;
use serde_json::json;

fn write_config(dir: &Path) -> String {
    let storage = dir.join("storage.json");
    let cfg = dir.join("rks.yaml");
    std::fs::write(
        &cfg,
        format!(
            "storage:\n  path: \"{}\"\n  cart_key: \"@RocketShoes:cart\"\n",
            storage.display().to_string().replace('\\', "/")
        ),
    )
    .unwrap();
    cfg.to_string_lossy().to_string()
}

fn rks(cfg: &str, base_url: &str) -> Command {
    let mut cmd = Command::cargo_bin("rks").unwrap();
    cmd.env("RKS_API_BASE_URL", base_url)
        .env("RUST_LOG", "warn")
        .arg("--config")
        .arg(cfg);
    cmd
}

fn mock_catalog(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET).path("/stock/1");
        then.status(200).json_body(json!({ "id": 1, "amount": 2 }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/products/1");
        then.status(200).json_body(json!({
            "id": 1,
            "title": "Tênis de Caminhada Leve Confortável",
            "price": 179.9,
            "image": "https://rocketseat-cdn.s3-sa-east-1.amazonaws.com/modulo-redux/tenis1.jpg"
        }));
    });
}

#[test]
fn show_on_fresh_storage_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = write_config(dir.path());
    let server = MockServer::start();

    rks(&cfg, &server.base_url())
        .args(["cart", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cart_entries=0 total=0.00"));
}

#[test]
fn add_persists_and_limits_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = write_config(dir.path());
    let server = MockServer::start();
    mock_catalog(&server);

    rks(&cfg, &server.base_url())
        .args(["cart", "add", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cart_ok=true product_id=1 amount=1"));

    rks(&cfg, &server.base_url())
        .args(["cart", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tênis de Caminhada Leve Confortável"))
        .stdout(predicate::str::contains("cart_entries=1 total=179.90"));

    rks(&cfg, &server.base_url())
        .args(["cart", "set-amount", "1", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("kind=out_of_stock"))
        .stderr(predicate::str::contains("Requested quantity is out of stock"));

    rks(&cfg, &server.base_url())
        .args(["cart", "set-amount", "1", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("kind=invalid_amount"));

    rks(&cfg, &server.base_url())
        .args(["cart", "set-amount", "1", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("amount=2"));
}

#[test]
fn remove_absent_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = write_config(dir.path());
    let server = MockServer::start();

    rks(&cfg, &server.base_url())
        .args(["cart", "remove", "9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("kind=product_not_found"))
        .stderr(predicate::str::contains("Product is not in the cart"));
}

#[test]
fn config_hash_prints_hex_digest() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = write_config(dir.path());

    rks(&cfg, "http://localhost:3333")
        .args(["config-hash", cfg.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::is_match("config_hash=[0-9a-f]{64}").unwrap())
        .stdout(predicate::str::contains("unused_keys=0"));
}

#[test]
fn bad_env_base_url_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = write_config(dir.path());

    rks(&cfg, "not-a-url")
        .args(["cart", "add", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("api.base_url must be an http(s) URL"))
        .stderr(predicate::str::contains("Error adding product").not());

    assert!(!dir.path().join("storage.json").exists());
}
