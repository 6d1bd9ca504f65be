//! remove_product / update_product_amount
//!
//! GREEN when:
//! - remove deletes exactly the matching entry and persists the result
//! - remove of an absent id is ProductNotFound with the cart untouched
//! - update 1 -> 3 under stock 10 changes only that entry, order preserved
//! - amounts < 1 are InvalidAmount and never reach the network
//! - amounts above stock are OutOfStock
//! - updating an absent id is ProductNotFound
//! - api/storage failures are UpdateAmountFailed / RemoveProductFailed

use rks_cart::{CartError, CartErrorKind, ProductId, UpdateProductAmount};
use rks_testkit::{sneaker, FakeStoreApi, Harness};

async fn three_entry_harness(stock: u32) -> Harness {
    let h = Harness::new(
        FakeStoreApi::new()
            .with_product(sneaker(1, 179.9), stock)
            .with_product(sneaker(2, 139.9), stock)
            .with_product(sneaker(3, 219.9), stock),
    );
    for id in 1..=3 {
        h.store.add_product(ProductId(id)).await.unwrap();
    }
    h
}

fn ids(cart: &rks_cart::Cart) -> Vec<u64> {
    cart.entries().iter().map(|p| p.id.get()).collect()
}

// ---------------------------------------------------------------------------
// remove_product
// ---------------------------------------------------------------------------

#[tokio::test]
async fn remove_deletes_matching_entry_only() {
    let h = three_entry_harness(10).await;

    h.store.remove_product(ProductId(2)).await.unwrap();

    let cart = h.store.cart().await;
    assert_eq!(ids(&cart), vec![1, 3]);
    assert_eq!(h.persisted(), *cart);
    assert!(h.notices.notices().is_empty());
}

#[tokio::test]
async fn remove_absent_is_product_not_found() {
    let h = three_entry_harness(10).await;
    let before = h.store.cart().await;
    let calls = h.api.stock_calls();

    let err = h.store.remove_product(ProductId(99)).await.unwrap_err();
    assert!(matches!(err, CartError::ProductNotFound { product_id } if product_id == ProductId(99)));

    assert_eq!(h.store.cart().await, before);
    assert_eq!(h.api.stock_calls(), calls, "remove never calls the api");
    assert_eq!(h.notices.messages(), vec!["Product is not in the cart".to_string()]);
}

#[tokio::test]
async fn remove_with_failing_storage_keeps_entry() {
    let h = three_entry_harness(10).await;
    h.storage.set_fail_writes(true);

    let err = h.store.remove_product(ProductId(1)).await.unwrap_err();
    assert_eq!(err.kind(), CartErrorKind::RemoveProductFailed);
    assert_eq!(ids(&*h.store.cart().await), vec![1, 2, 3]);
    assert_eq!(ids(&h.persisted()), vec![1, 2, 3]);
}

// ---------------------------------------------------------------------------
// update_product_amount
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_sets_amount_and_preserves_others() {
    let h = three_entry_harness(10).await;
    let before = h.store.cart().await;

    h.store
        .update_product_amount(UpdateProductAmount {
            product_id: ProductId(2),
            amount: 3,
        })
        .await
        .unwrap();

    let cart = h.store.cart().await;
    assert_eq!(ids(&cart), vec![1, 2, 3]);
    assert_eq!(cart.amount_of(ProductId(2)), 3);
    assert_eq!(cart.get(ProductId(1)), before.get(ProductId(1)));
    assert_eq!(cart.get(ProductId(3)), before.get(ProductId(3)));
    assert_eq!(h.persisted(), *cart);
}

#[tokio::test]
async fn update_can_lower_amount() {
    let h = three_entry_harness(10).await;
    let req = |amount| UpdateProductAmount {
        product_id: ProductId(1),
        amount,
    };

    h.store.update_product_amount(req(4)).await.unwrap();
    h.store.update_product_amount(req(1)).await.unwrap();
    assert_eq!(h.store.cart().await.amount_of(ProductId(1)), 1);
}

#[tokio::test]
async fn update_below_one_is_invalid_amount_without_network() {
    let h = three_entry_harness(10).await;
    let before = h.store.cart().await;
    let calls = h.api.stock_calls();

    for amount in [0, -1, i64::MIN] {
        let err = h
            .store
            .update_product_amount(UpdateProductAmount {
                product_id: ProductId(1),
                amount,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), CartErrorKind::InvalidAmount);
    }

    assert_eq!(h.store.cart().await, before);
    assert_eq!(h.api.stock_calls(), calls);
    assert_eq!(h.notices.notices().len(), 3);
}

#[tokio::test]
async fn update_above_stock_is_out_of_stock() {
    let h = three_entry_harness(4).await;
    let before = h.store.cart().await;

    let err = h
        .store
        .update_product_amount(UpdateProductAmount {
            product_id: ProductId(3),
            amount: 5,
        })
        .await
        .unwrap_err();
    assert!(
        matches!(err, CartError::OutOfStock { requested: 5, available: 4, .. }),
        "got {err:?}"
    );
    assert_eq!(h.store.cart().await, before);

    // exactly at the limit is fine
    h.store
        .update_product_amount(UpdateProductAmount {
            product_id: ProductId(3),
            amount: 4,
        })
        .await
        .unwrap();
    assert_eq!(h.store.cart().await.amount_of(ProductId(3)), 4);
}

#[tokio::test]
async fn update_absent_is_product_not_found() {
    let h = three_entry_harness(10).await;
    let err = h
        .store
        .update_product_amount(UpdateProductAmount {
            product_id: ProductId(42),
            amount: 2,
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CartErrorKind::ProductNotFound);
    assert_eq!(h.store.cart().await.len(), 3);
}

#[tokio::test]
async fn update_during_outage_is_update_failed() {
    let h = three_entry_harness(10).await;
    let before = h.store.cart().await;
    h.api.set_offline(true);

    let err = h
        .store
        .update_product_amount(UpdateProductAmount {
            product_id: ProductId(1),
            amount: 2,
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CartErrorKind::UpdateAmountFailed);
    assert_eq!(err.to_string(), "Error changing product quantity");
    assert_eq!(h.store.cart().await, before);
    assert_eq!(h.persisted(), *before);
}

#[tokio::test]
async fn update_with_failing_storage_is_update_failed() {
    let h = three_entry_harness(10).await;
    h.storage.set_fail_writes(true);

    let err = h
        .store
        .update_product_amount(UpdateProductAmount {
            product_id: ProductId(1),
            amount: 2,
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CartErrorKind::UpdateAmountFailed);
    assert_eq!(h.store.cart().await.amount_of(ProductId(1)), 1);
}
