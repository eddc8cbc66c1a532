//! Durable key-value store: named JSON blobs that survive restarts
//!
//! Every content collection is persisted as one snapshot under a fixed key.
//! Two backends are provided: [`FileKvStore`] (one file per key) and
//! [`MemoryKvStore`] (process memory, used by tests and `backend = "memory"`).
//! Both accept an optional byte quota so a full store fails a save instead of
//! silently dropping data.

pub mod file;
pub mod memory;

pub use file::FileKvStore;
pub use memory::MemoryKvStore;

use crate::config::{StorageBackend, StorageConfig};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Durable blob storage keyed by logical name
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Load the blob stored under `key`, `None` if nothing was ever saved
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replace the blob stored under `key`
    async fn save(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Remove `key`; removing a missing key is not an error
    async fn remove(&self, key: &str) -> Result<()>;

    /// Backend name for logs
    fn backend_name(&self) -> &'static str;
}

/// Open the backend selected by the storage configuration
pub async fn open(config: &StorageConfig) -> Result<Arc<dyn KvStore>> {
    let store: Arc<dyn KvStore> = match config.backend {
        StorageBackend::File => Arc::new(
            FileKvStore::new(config.data_dir.clone())
                .await?
                .with_quota(config.quota_bytes),
        ),
        StorageBackend::Memory => Arc::new(MemoryKvStore::new().with_quota(config.quota_bytes)),
    };
    tracing::info!(backend = store.backend_name(), "Opened durable store");
    Ok(store)
}

/// Keys are used as file names, so only a conservative alphabet is allowed
pub(crate) fn validate_key(key: &str) -> Result<()> {
    if key.is_empty()
        || !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(Error::Persistence(format!("invalid key '{}'", key)));
    }
    Ok(())
}

/// Check a write of `new_len` bytes replacing `old_len` against a quota
pub(crate) fn check_quota(
    quota: Option<u64>,
    used: u64,
    old_len: u64,
    new_len: u64,
) -> Result<()> {
    if let Some(limit) = quota {
        let projected = used.saturating_sub(old_len) + new_len;
        if projected > limit {
            return Err(Error::Persistence(format!(
                "quota exceeded: {} bytes needed, {} allowed",
                projected, limit
            )));
        }
    }
    Ok(())
}
