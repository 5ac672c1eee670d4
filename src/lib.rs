//! Shopping cart engine with a single promotional coupon and best-effort
//! key-value persistence.
//!
//! The crate is split hexagonally: `domain` holds the cart/coupon model and
//! the storage port, `application` hosts the [`CartEngine`] that orchestrates
//! mutations and publishes state snapshots, `infrastructure` provides the
//! key-value store implementations, and `interfaces` adapts CSV action
//! scripts at the edge.
//!
//! [`CartEngine`]: application::engine::CartEngine

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
