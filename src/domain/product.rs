use crate::error::CartError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A non-negative unit price.
///
/// Wrapper around `rust_decimal::Decimal` so a negative price cannot enter
/// the cart through a validated constructor. Serializes transparently as the
/// inner decimal.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Price(Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self, CartError> {
        if value >= Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(CartError::Validation(
                "price must not be negative".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Price {
    type Error = CartError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

/// A catalog product as supplied by the UI collaborator.
///
/// Read-only input to the engine; the engine never fetches products itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub title: String,
    pub price: Price,
    pub image: String,
}
