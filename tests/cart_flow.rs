use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use shopcart::application::engine::{CartEngine, KEY_CART, KEY_COUPON_APPLIED, KEY_COUPON_CODE};
use shopcart::domain::coupon::CouponError;
use shopcart::domain::ports::KeyValueStore;
use shopcart::domain::product::{Price, Product};
use shopcart::infrastructure::in_memory::InMemoryKvStore;
use std::sync::Arc;

fn product(id: u64, price: Decimal) -> Product {
    Product {
        id,
        title: format!("Item {id}"),
        price: Price::new(price).unwrap(),
        image: format!("https://img.example/{id}.png"),
    }
}

#[tokio::test]
async fn test_totals_consistent_across_a_long_session() {
    let engine = CartEngine::load(Arc::new(InMemoryKvStore::new())).await;

    engine.add_to_cart(&product(1, dec!(9.99)), 2).await;
    engine.add_to_cart(&product(2, dec!(25)), 1).await;
    engine.add_to_cart(&product(1, dec!(12.5)), 1).await;
    engine.update_quantity(2, 4).await;
    engine.remove_from_cart(1).await;
    engine.update_quantity(2, -3).await;

    let snapshot = engine.snapshot().await;
    for item in &snapshot.cart {
        assert_eq!(item.total, item.price.value() * Decimal::from(item.quantity));
    }
    // Only item 2 remains, clamped to quantity 1.
    assert_eq!(snapshot.cart.len(), 1);
    assert_eq!(snapshot.cart[0].quantity, 1);
    assert_eq!(snapshot.grand_total, dec!(25));
}

#[tokio::test]
async fn test_auto_revocation_flow() {
    let engine = CartEngine::load(Arc::new(InMemoryKvStore::new())).await;
    engine.add_to_cart(&product(1, dec!(70)), 1).await;
    engine.add_to_cart(&product(2, dec!(80)), 1).await;
    engine.set_coupon_code("SAVE10").await;
    engine.apply_coupon().await;
    assert!(engine.snapshot().await.is_coupon_applied);

    engine.remove_from_cart(2).await;

    let snapshot = engine.snapshot().await;
    assert!(!snapshot.is_coupon_applied);
    assert_eq!(snapshot.coupon_code, "");
    assert_eq!(snapshot.coupon_error, Some(CouponError::AutoRevoked));
    assert_eq!(
        snapshot.coupon_error.unwrap().to_string(),
        "Coupon removed: Cart total dropped below $100."
    );
}

#[tokio::test]
async fn test_round_trip_persistence() {
    let store = Arc::new(InMemoryKvStore::new());

    let engine = CartEngine::load(Arc::clone(&store) as Arc<dyn KeyValueStore>).await;
    engine.add_to_cart(&product(1, dec!(120)), 2).await;
    engine.add_to_cart(&product(2, dec!(5.25)), 3).await;
    engine.set_coupon_code("SAVE10").await;
    engine.apply_coupon().await;
    let before = engine.snapshot().await;
    drop(engine);

    let reloaded = CartEngine::load(store).await;
    let after = reloaded.snapshot().await;

    assert_eq!(after.cart, before.cart);
    assert_eq!(after.coupon_code, before.coupon_code);
    assert_eq!(after.is_coupon_applied, before.is_coupon_applied);
    assert_eq!(after.grand_total, before.grand_total);
}

#[tokio::test]
async fn test_load_revokes_stale_persisted_coupon() {
    // A previous session applied the coupon, but the persisted cart no
    // longer clears the threshold.
    let store = Arc::new(InMemoryKvStore::new());
    store
        .set(
            KEY_CART,
            r#"[{"id":1,"title":"Item 1","price":"80","image":"","quantity":1,"total":"80"}]"#
                .to_string(),
        )
        .await
        .unwrap();
    store
        .set(KEY_COUPON_CODE, "SAVE10".to_string())
        .await
        .unwrap();
    store
        .set(KEY_COUPON_APPLIED, "true".to_string())
        .await
        .unwrap();

    let engine = CartEngine::load(Arc::clone(&store) as Arc<dyn KeyValueStore>).await;

    let snapshot = engine.snapshot().await;
    assert!(!snapshot.is_coupon_applied);
    assert_eq!(snapshot.coupon_error, Some(CouponError::AutoRevoked));
    assert_eq!(snapshot.grand_total, dec!(80));

    // The corrected coupon state is written back.
    assert_eq!(
        store.get(KEY_COUPON_APPLIED).await.unwrap().as_deref(),
        Some("false")
    );
    assert_eq!(store.get(KEY_COUPON_CODE).await.unwrap().as_deref(), Some(""));
}

#[tokio::test]
async fn test_watch_subscription_sees_each_settled_state() {
    let engine = CartEngine::load(Arc::new(InMemoryKvStore::new())).await;
    let mut updates = engine.subscribe();

    engine.add_to_cart(&product(1, dec!(10)), 1).await;
    assert!(updates.has_changed().unwrap());
    assert_eq!(updates.borrow_and_update().grand_total, dec!(10));

    engine.update_quantity(1, 3).await;
    assert_eq!(updates.borrow_and_update().grand_total, dec!(30));
}
