//! `rks cart ...` handlers.

use anyhow::{Context, Result};
use rks_cart::{CartStore, UpdateProductAmount};
use rks_schemas::ProductId;

/// Execute `rks cart show`.
pub async fn show(store: &CartStore) -> Result<()> {
    let cart = store.cart().await;

    if !cart.is_empty() {
        println!("{:>6}  {:>6}  {:>10}  {:>10}  title", "id", "amount", "price", "subtotal");
        for p in cart.entries() {
            println!(
                "{:>6}  {:>6}  {:>10.2}  {:>10.2}  {}",
                p.id,
                p.amount,
                p.price,
                p.subtotal(),
                p.title
            );
        }
    }
    println!("cart_entries={} total={:.2}", cart.len(), cart.total());
    Ok(())
}

/// Execute `rks cart add <id>`.
pub async fn add(store: &CartStore, product_id: u64) -> Result<()> {
    let id = ProductId(product_id);
    store
        .add_product(id)
        .await
        .with_context(|| format!("cart add failed for product {id}"))?;
    print_ok(store, id).await;
    Ok(())
}

/// Execute `rks cart remove <id>`.
pub async fn remove(store: &CartStore, product_id: u64) -> Result<()> {
    let id = ProductId(product_id);
    store
        .remove_product(id)
        .await
        .with_context(|| format!("cart remove failed for product {id}"))?;
    print_ok(store, id).await;
    Ok(())
}

/// Execute `rks cart set-amount <id> <amount>`.
pub async fn set_amount(store: &CartStore, product_id: u64, amount: i64) -> Result<()> {
    let id = ProductId(product_id);
    store
        .update_product_amount(UpdateProductAmount {
            product_id: id,
            amount,
        })
        .await
        .with_context(|| format!("cart set-amount failed for product {id}"))?;
    print_ok(store, id).await;
    Ok(())
}

async fn print_ok(store: &CartStore, id: ProductId) {
    let cart = store.cart().await;
    println!(
        "cart_ok=true product_id={} amount={} cart_entries={}",
        id,
        cart.amount_of(id),
        cart.len()
    );
}
