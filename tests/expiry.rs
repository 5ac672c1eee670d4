//! Timed coupon-error expiry: a standing error clears after the TTL unless
//! superseded or explicitly cleared first. Runs on a paused tokio clock.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use shopcart::application::engine::CartEngine;
use shopcart::domain::coupon::CouponError;
use shopcart::domain::product::{Price, Product};
use shopcart::infrastructure::in_memory::InMemoryKvStore;
use std::sync::Arc;
use std::time::Duration;

fn product(id: u64, price: Decimal) -> Product {
    Product {
        id,
        title: format!("Item {id}"),
        price: Price::new(price).unwrap(),
        image: String::new(),
    }
}

#[tokio::test(start_paused = true)]
async fn test_error_clears_after_ttl() {
    let engine = CartEngine::load(Arc::new(InMemoryKvStore::new())).await;
    engine.set_coupon_code("BOGUS").await;
    engine.apply_coupon().await;
    assert_eq!(
        engine.snapshot().await.coupon_error,
        Some(CouponError::Invalid)
    );

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(
        engine.snapshot().await.coupon_error,
        Some(CouponError::Invalid)
    );

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(engine.snapshot().await.coupon_error, None);
}

#[tokio::test(start_paused = true)]
async fn test_new_error_restarts_the_clock() {
    let engine = CartEngine::load(Arc::new(InMemoryKvStore::new())).await;
    engine.set_coupon_code("BOGUS").await;
    engine.apply_coupon().await;

    // 2s in, supersede with a fresh error; the old expiry must not fire at
    // the 3s mark.
    tokio::time::sleep(Duration::from_secs(2)).await;
    engine.apply_coupon().await;
    assert_eq!(
        engine.snapshot().await.coupon_error,
        Some(CouponError::Invalid)
    );

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(
        engine.snapshot().await.coupon_error,
        Some(CouponError::Invalid)
    );

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(engine.snapshot().await.coupon_error, None);
}

#[tokio::test(start_paused = true)]
async fn test_explicit_clear_cancels_expiry() {
    let engine = CartEngine::load(Arc::new(InMemoryKvStore::new())).await;
    engine.add_to_cart(&product(1, dec!(50)), 1).await;
    engine.set_coupon_code("BOGUS").await;
    engine.apply_coupon().await;

    // A cart edit clears the error immediately and cancels the pending
    // expiry; advancing past the TTL must not publish another snapshot.
    engine.update_quantity(1, 2).await;
    let mut updates = engine.subscribe();
    assert_eq!(engine.snapshot().await.coupon_error, None);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(engine.snapshot().await.coupon_error, None);
    assert!(!updates.has_changed().unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_expiry_notifies_subscribers() {
    let engine = CartEngine::load(Arc::new(InMemoryKvStore::new())).await;
    engine.set_coupon_code("BOGUS").await;
    engine.apply_coupon().await;

    let mut updates = engine.subscribe();
    tokio::time::sleep(Duration::from_secs(4)).await;

    assert!(updates.has_changed().unwrap());
    assert_eq!(updates.borrow_and_update().coupon_error, None);
}

#[tokio::test(start_paused = true)]
async fn test_custom_ttl() {
    let engine = CartEngine::load_with_error_ttl(
        Arc::new(InMemoryKvStore::new()),
        Duration::from_millis(100),
    )
    .await;
    engine.apply_coupon().await;
    assert_eq!(
        engine.snapshot().await.coupon_error,
        Some(CouponError::Empty)
    );

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(engine.snapshot().await.coupon_error, None);
}
