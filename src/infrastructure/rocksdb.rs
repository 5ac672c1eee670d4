use crate::domain::ports::KeyValueStore;
use async_trait::async_trait;
use rocksdb::{DB, Options};
use std::io;
use std::path::Path;
use std::sync::Arc;

/// A persistent key-value store backed by RocksDB.
///
/// Values are UTF-8 strings in the default column family, mirroring the
/// string-to-string contract of the port. `Clone` shares the underlying
/// `Arc<DB>`.
#[derive(Clone)]
pub struct RocksDbKvStore {
    db: Arc<DB>,
}

impl RocksDbKvStore {
    /// Opens or creates a RocksDB instance at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        let db = DB::open(&opts, path).map_err(io::Error::other)?;
        Ok(Self { db: Arc::new(db) })
    }
}

#[async_trait]
impl KeyValueStore for RocksDbKvStore {
    async fn get(&self, key: &str) -> io::Result<Option<String>> {
        match self.db.get(key.as_bytes()).map_err(io::Error::other)? {
            Some(bytes) => {
                let value = String::from_utf8(bytes)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: String) -> io::Result<()> {
        self.db
            .put(key.as_bytes(), value.as_bytes())
            .map_err(io::Error::other)
    }
}
