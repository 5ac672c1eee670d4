//! Application layer: the [`engine::CartEngine`] orchestrating cart and
//! coupon mutations, derived-total recomputation, persistence sync, and
//! snapshot notification over a `tokio::sync::watch` channel.

pub mod engine;
