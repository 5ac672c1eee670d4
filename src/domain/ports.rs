use async_trait::async_trait;
use std::io;

/// String key-value persistence port, matching the browser-local-storage
/// shape of the original host: opaque string keys and values, last write
/// wins, no transactions.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> io::Result<Option<String>>;
    async fn set(&self, key: &str, value: String) -> io::Result<()>;
}
