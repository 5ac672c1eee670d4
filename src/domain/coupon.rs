use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The only coupon code the engine accepts, matched case-sensitively.
pub const VALID_CODE: &str = "SAVE10";

/// Pre-discount total above which (exclusive) the coupon may be applied.
pub const ELIGIBILITY_THRESHOLD: Decimal = Decimal::ONE_HUNDRED;

/// User-facing, non-fatal coupon errors. These are engine *state*, surfaced
/// through the snapshot as a message string; they are never raised.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CouponError {
    #[error("Coupon code should not be empty.")]
    Empty,
    #[error("Invalid coupon code.")]
    Invalid,
    #[error("Cart total must be over $100 to apply this coupon.")]
    BelowThreshold,
    #[error("Coupon removed: Cart total dropped below $100.")]
    AutoRevoked,
}

/// Pending coupon text plus whether a coupon is currently applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CouponState {
    pub code: String,
    pub applied: bool,
    pub error: Option<CouponError>,
}

impl CouponState {
    /// Attempts to apply the pending code against the given pre-discount
    /// total. Validation short-circuits on the first failing check; on
    /// success the stored code is normalized to the trimmed matched text so
    /// `applied` always implies `code == VALID_CODE`.
    pub fn try_apply(&mut self, pre_discount: Decimal) {
        let trimmed = self.code.trim();
        if trimmed.is_empty() {
            self.error = Some(CouponError::Empty);
            return;
        }
        if trimmed != VALID_CODE {
            self.error = Some(CouponError::Invalid);
            return;
        }
        if pre_discount <= ELIGIBILITY_THRESHOLD {
            self.error = Some(CouponError::BelowThreshold);
            return;
        }
        self.code = trimmed.to_string();
        self.applied = true;
        self.error = None;
    }

    /// User-initiated removal: unconditionally unapplied, code and error
    /// cleared.
    pub fn remove(&mut self) {
        self.applied = false;
        self.code.clear();
        self.error = None;
    }

    /// Engine-initiated revocation, run after every cart mutation and at
    /// load: if a coupon is applied but the cart no longer exceeds the
    /// threshold, drop it and leave the advisory error standing. Returns
    /// whether a revocation happened.
    pub fn revoke_if_ineligible(&mut self, pre_discount: Decimal) -> bool {
        if self.applied && pre_discount <= ELIGIBILITY_THRESHOLD {
            self.applied = false;
            self.code.clear();
            self.error = Some(CouponError::AutoRevoked);
            return true;
        }
        false
    }
}

/// Grand total as a pure function of the pre-discount total and whether the
/// coupon is applied: 10% off, capped at $50.
pub fn grand_total(pre_discount: Decimal, applied: bool) -> Decimal {
    if applied {
        let discount = (pre_discount * dec!(0.10)).min(dec!(50));
        pre_discount - discount
    } else {
        pre_discount
    }
}
