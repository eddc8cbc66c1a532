//! In-memory key-value store

use super::{check_quota, validate_key, KvStore};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Key-value store held in process memory
#[derive(Default)]
pub struct MemoryKvStore {
    values: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    quota: Option<u64>,
    saves: AtomicUsize,
}

impl MemoryKvStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the total size of all stored values
    pub fn with_quota(mut self, quota: Option<u64>) -> Self {
        self.quota = quota;
        self
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        validate_key(key)?;
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, value: &[u8]) -> Result<()> {
        validate_key(key)?;
        let mut values = self.values.write().await;
        let used: u64 = values.values().map(|v| v.len() as u64).sum();
        let old_len = values.get(key).map(|v| v.len() as u64).unwrap_or(0);
        check_quota(self.quota, used, old_len, value.len() as u64)?;
        values.insert(key.to_string(), value.to_vec());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        self.values.write().await.remove(key);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
