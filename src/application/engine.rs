use crate::domain::cart::{Cart, LineItem};
use crate::domain::coupon::{self, CouponError, CouponState};
use crate::domain::ports::KeyValueStore;
use crate::domain::product::Product;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::task::AbortHandle;
use tracing::{debug, warn};

/// Persistence key for the JSON-encoded line-item array.
pub const KEY_CART: &str = "cart";
/// Persistence key for the raw pending coupon code.
pub const KEY_COUPON_CODE: &str = "couponCode";
/// Persistence key for the applied flag, stored as `"true"`/`"false"`.
pub const KEY_COUPON_APPLIED: &str = "isCouponApplied";

/// How long a standing coupon error stays visible before it auto-clears.
pub const ERROR_TTL: Duration = Duration::from_secs(3);

/// Read-only view of the engine state published after every operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub cart: Vec<LineItem>,
    pub grand_total: Decimal,
    pub coupon_code: String,
    pub is_coupon_applied: bool,
    pub coupon_error: Option<CouponError>,
}

struct Inner {
    cart: Cart,
    coupon: CouponState,
    grand_total: Decimal,
    // Pending auto-expiry of the current coupon error, if any. Re-armed or
    // aborted whenever the error changes.
    error_expiry: Option<AbortHandle>,
}

impl Inner {
    fn snapshot(&self) -> Snapshot {
        Snapshot {
            cart: self.cart.items().to_vec(),
            grand_total: self.grand_total,
            coupon_code: self.coupon.code.clone(),
            is_coupon_applied: self.coupon.applied,
            coupon_error: self.coupon.error,
        }
    }
}

/// The cart/coupon state engine.
///
/// Owns the cart, the coupon state, and the derived grand total. Every
/// mutating operation runs as one critical section behind a single mutex,
/// then settles: revalidate coupon eligibility, recompute the grand total,
/// persist through the key-value port (best effort), publish a [`Snapshot`]
/// to subscribers, and re-arm the coupon-error expiry timer.
pub struct CartEngine {
    inner: Arc<Mutex<Inner>>,
    store: Arc<dyn KeyValueStore>,
    snapshots: Arc<watch::Sender<Snapshot>>,
    error_ttl: Duration,
}

impl CartEngine {
    /// Initializes the engine from whatever the store holds, defaulting each
    /// key independently on absence, parse failure, or read failure. A
    /// persisted coupon that is no longer eligible is revoked immediately,
    /// with the advisory error standing.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        Self::load_with_error_ttl(store, ERROR_TTL).await
    }

    /// Same as [`load`](Self::load) with a custom error-expiry delay.
    pub async fn load_with_error_ttl(store: Arc<dyn KeyValueStore>, error_ttl: Duration) -> Self {
        let cart = match store.get(KEY_CART).await {
            Ok(Some(raw)) => match serde_json::from_str::<Cart>(&raw) {
                Ok(cart) => cart,
                Err(error) => {
                    warn!(%error, "persisted cart is unreadable, starting empty");
                    Cart::default()
                }
            },
            Ok(None) => Cart::default(),
            Err(error) => {
                warn!(%error, key = KEY_CART, "store read failed, starting empty");
                Cart::default()
            }
        };
        let code = match store.get(KEY_COUPON_CODE).await {
            Ok(Some(code)) => code,
            Ok(None) => String::new(),
            Err(error) => {
                warn!(%error, key = KEY_COUPON_CODE, "store read failed");
                String::new()
            }
        };
        let applied = match store.get(KEY_COUPON_APPLIED).await {
            Ok(value) => value.as_deref() == Some("true"),
            Err(error) => {
                warn!(%error, key = KEY_COUPON_APPLIED, "store read failed");
                false
            }
        };

        let inner = Inner {
            cart,
            coupon: CouponState {
                code,
                applied,
                error: None,
            },
            grand_total: Decimal::ZERO,
            error_expiry: None,
        };
        let (snapshots, _) = watch::channel(inner.snapshot());
        let engine = Self {
            inner: Arc::new(Mutex::new(inner)),
            store,
            snapshots: Arc::new(snapshots),
            error_ttl,
        };

        // Mount-time pass: revoke a stale coupon, derive the total, write the
        // (possibly corrected) state back, and publish the first snapshot.
        let mut inner = engine.inner.lock().await;
        engine.settle(&mut inner, true).await;
        drop(inner);

        engine
    }

    /// Subscribes to snapshot updates. The receiver always holds the latest
    /// published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.subscribe()
    }

    /// Current state, read atomically.
    pub async fn snapshot(&self) -> Snapshot {
        self.inner.lock().await.snapshot()
    }

    /// Merges `quantity` of `product` into the cart. `quantity >= 1` is the
    /// caller's precondition and is not clamped here, unlike
    /// [`update_quantity`](Self::update_quantity).
    pub async fn add_to_cart(&self, product: &Product, quantity: u32) {
        let mut inner = self.inner.lock().await;
        inner.cart.add(product, quantity);
        inner.coupon.error = None;
        self.settle(&mut inner, true).await;
    }

    /// Sets the quantity of a line item, clamped to a minimum of 1. Unknown
    /// ids are a no-op (the error clear and resettle still run).
    pub async fn update_quantity(&self, id: u64, quantity: i64) {
        let mut inner = self.inner.lock().await;
        inner.cart.update_quantity(id, quantity);
        inner.coupon.error = None;
        self.settle(&mut inner, true).await;
    }

    /// Removes a line item if present. Idempotent.
    pub async fn remove_from_cart(&self, id: u64) {
        let mut inner = self.inner.lock().await;
        inner.cart.remove(id);
        inner.coupon.error = None;
        self.settle(&mut inner, true).await;
    }

    /// Empties the cart through the same settle protocol as removal.
    pub async fn clear_cart(&self) {
        let mut inner = self.inner.lock().await;
        inner.cart.clear();
        inner.coupon.error = None;
        self.settle(&mut inner, true).await;
    }

    /// Sets the pending coupon code text. No validation and no effect on the
    /// cart or the total.
    pub async fn set_coupon_code(&self, code: impl Into<String>) {
        let mut inner = self.inner.lock().await;
        inner.coupon.code = code.into();
        self.persist_coupon(&inner).await;
        self.snapshots.send_replace(inner.snapshot());
    }

    /// Validates and applies the pending code. Failures land in the snapshot
    /// as a coupon error; the engine stays fully usable either way.
    pub async fn apply_coupon(&self) {
        let mut inner = self.inner.lock().await;
        let pre_discount = inner.cart.pre_discount_total();
        inner.coupon.try_apply(pre_discount);
        self.settle(&mut inner, false).await;
    }

    /// Unconditionally removes any applied coupon and clears the pending
    /// code and error.
    pub async fn remove_coupon(&self) {
        let mut inner = self.inner.lock().await;
        inner.coupon.remove();
        self.settle(&mut inner, false).await;
    }

    /// Post-mutation pipeline shared by every operation. Runs under the
    /// state lock: the revocation check runs after the operation's own error
    /// handling, so a revocation error always wins over a cleared one.
    async fn settle(&self, inner: &mut Inner, persist_cart: bool) {
        let pre_discount = inner.cart.pre_discount_total();
        if inner.coupon.revoke_if_ineligible(pre_discount) {
            debug!(%pre_discount, "coupon auto-revoked");
        }
        inner.grand_total = coupon::grand_total(pre_discount, inner.coupon.applied);

        if persist_cart {
            match serde_json::to_string(&inner.cart) {
                Ok(json) => self.write(KEY_CART, json).await,
                Err(error) => warn!(%error, "cart serialization failed, skipping write"),
            }
        }
        self.persist_coupon(inner).await;

        self.snapshots.send_replace(inner.snapshot());
        self.arm_error_expiry(inner);
    }

    async fn persist_coupon(&self, inner: &Inner) {
        self.write(KEY_COUPON_CODE, inner.coupon.code.clone()).await;
        self.write(KEY_COUPON_APPLIED, inner.coupon.applied.to_string())
            .await;
    }

    // Fire-and-forget: persistence failures are logged, never surfaced.
    async fn write(&self, key: &str, value: String) {
        if let Err(error) = self.store.set(key, value).await {
            warn!(%error, key, "persistence write failed");
        }
    }

    /// Cancels any pending error expiry and, if an error is standing,
    /// schedules a single-shot task that clears it after the TTL.
    fn arm_error_expiry(&self, inner: &mut Inner) {
        if let Some(pending) = inner.error_expiry.take() {
            pending.abort();
        }
        if inner.coupon.error.is_none() {
            return;
        }

        let state = Arc::clone(&self.inner);
        let snapshots = Arc::clone(&self.snapshots);
        let ttl = self.error_ttl;
        let task = tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            // Aborts land on the awaits above/below, so a task that reaches
            // the clear is still the current one.
            let mut inner = state.lock().await;
            inner.coupon.error = None;
            inner.error_expiry = None;
            snapshots.send_replace(inner.snapshot());
        });
        inner.error_expiry = Some(task.abort_handle());
    }
}
