//! Integration tests for the cart store inside a storefront session.
//!
//! These run against `MemoryStore`, so they exercise the reducer, the
//! subscriber channel, the snapshot writer, and toasts without touching disk.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use rust_decimal::Decimal;

use doko_core::CouponCode;
use doko_integration_tests::{id, product};
use doko_state::{CartError, EngineConfig, MemoryStore, StorefrontSession};

async fn open(storage: &Arc<MemoryStore>) -> StorefrontSession {
    StorefrontSession::open(storage.clone(), &EngineConfig::default()).await
}

// =============================================================================
// Totals
// =============================================================================

#[tokio::test]
async fn test_three_topis_total() {
    let storage = Arc::new(MemoryStore::new());
    let mut session = open(&storage).await;

    session
        .cart_mut()
        .add_item(product("sku-1", "Dhaka Topi", 1749), 1)
        .unwrap();
    session
        .cart_mut()
        .add_item(product("sku-1", "Dhaka Topi", 1749), 2)
        .unwrap();

    let cart = session.cart();
    assert_eq!(cart.items().len(), 1);
    assert_eq!(cart.count(), 3);
    assert_eq!(cart.total().amount(), Decimal::from(5247));
    assert_eq!(cart.total().to_string(), "Rs. 5,247");
}

#[tokio::test]
async fn test_checkout_summary_charges_delivery_below_threshold() {
    let storage = Arc::new(MemoryStore::new());
    let mut session = open(&storage).await;
    session
        .cart_mut()
        .add_item(product("sku-1", "Dhaka Topi", 1749), 2)
        .unwrap();

    let summary = session.checkout_summary();
    assert_eq!(summary.subtotal.amount(), Decimal::from(3498));
    assert_eq!(summary.shipping.amount(), Decimal::from(150));
    assert_eq!(summary.total.amount(), Decimal::from(3648));
    assert_eq!(summary.item_label(), "2 items");

    session
        .cart_mut()
        .set_quantity(&id("sku-1"), 3)
        .unwrap();
    let summary = session.checkout_summary();
    assert!(summary.shipping.is_zero());
    assert_eq!(summary.delivery_label(), "Free delivery");
}

#[tokio::test]
async fn test_empty_cart_summary_is_zero() {
    let session = open(&Arc::new(MemoryStore::new())).await;
    let summary = session.checkout_summary();
    assert!(summary.total.is_zero());
    assert_eq!(summary.item_count, 0);
}

// =============================================================================
// Quantity Edits
// =============================================================================

#[tokio::test]
async fn test_set_quantity_zero_removes_line() {
    let storage = Arc::new(MemoryStore::new());
    let mut session = open(&storage).await;
    session
        .cart_mut()
        .add_item(product("sku-1", "Dhaka Topi", 1749), 2)
        .unwrap();

    assert!(session.cart_mut().set_quantity(&id("sku-1"), 0).unwrap());
    assert!(session.cart().items().is_empty());
    assert!(session.cart().total().is_zero());
}

#[tokio::test]
async fn test_negative_quantity_is_rejected_and_state_kept() {
    let storage = Arc::new(MemoryStore::new());
    let mut session = open(&storage).await;
    session
        .cart_mut()
        .add_item(product("sku-1", "Dhaka Topi", 1749), 2)
        .unwrap();
    let changes = session.cart().subscribe();

    let result = session.cart_mut().set_quantity(&id("sku-1"), -1);
    assert!(matches!(result, Err(CartError::InvalidQuantity(_))));
    assert_eq!(session.cart().count(), 2);
    assert!(!changes.has_changed().unwrap());
}

#[tokio::test]
async fn test_remove_absent_product_is_noop() {
    let mut session = open(&Arc::new(MemoryStore::new())).await;
    assert!(!session.cart_mut().remove_item(&id("sku-404")));
}

// =============================================================================
// Subscribers, Toasts, Persistence
// =============================================================================

#[tokio::test]
async fn test_subscriber_sees_every_change() {
    let mut session = open(&Arc::new(MemoryStore::new())).await;
    let mut changes = session.cart().subscribe();

    session
        .cart_mut()
        .add_item(product("sku-1", "Dhaka Topi", 1749), 1)
        .unwrap();
    changes.changed().await.unwrap();
    assert_eq!(changes.borrow_and_update().count(), 1);

    session.cart_mut().clear();
    changes.changed().await.unwrap();
    assert!(changes.borrow_and_update().is_empty());
}

#[tokio::test]
async fn test_add_publishes_toast() {
    let mut session = open(&Arc::new(MemoryStore::new())).await;
    let mut toasts = session.notifications();

    session
        .cart_mut()
        .add_item(product("sku-1", "Dhaka Topi", 1749), 1)
        .unwrap();

    let toast = toasts.recv().await.unwrap();
    assert_eq!(toast.message, "Dhaka Topi added to cart!");
    assert_eq!(toast.duration.as_millis(), 3000);
}

#[tokio::test]
async fn test_coupon_survives_clear_and_reopen() {
    let storage = Arc::new(MemoryStore::new());
    let mut session = open(&storage).await;
    session
        .cart_mut()
        .add_item(product("sku-1", "Dhaka Topi", 1749), 1)
        .unwrap();
    session
        .cart_mut()
        .apply_coupon(CouponCode::parse("dashain10").unwrap());
    session.cart_mut().clear();
    session.close().await;

    let session = open(&storage).await;
    assert!(session.cart().items().is_empty());
    assert_eq!(
        session.cart().state().applied_coupon().map(CouponCode::as_str),
        Some("DASHAIN10")
    );
}
