//! Key-value store implementations behind the [`KeyValueStore`] port.
//!
//! [`KeyValueStore`]: crate::domain::ports::KeyValueStore

pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
