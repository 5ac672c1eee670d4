//! Pure cart/coupon model and the storage port. Nothing in here performs IO
//! besides the port trait itself.

pub mod cart;
pub mod coupon;
pub mod ports;
pub mod product;
