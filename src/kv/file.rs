//! File-backed key-value store
//!
//! Directory layout:
//! ```text
//! ~/.storehub/data/
//! ├── x450_team_members.json
//! ├── x450_memories.json
//! └── ...
//! ```
//!
//! Writes land in a `.tmp` sibling first and are renamed into place, so a
//! crash mid-write leaves the previous value readable.

use super::{check_quota, validate_key, KvStore};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Key-value store with one JSON file per key
pub struct FileKvStore {
    dir: PathBuf,
    quota: Option<u64>,
    /// Serializes quota accounting against concurrent writers
    write_lock: Mutex<()>,
}

impl FileKvStore {
    /// Create a store rooted at `dir`, creating the directory if needed
    pub async fn new(dir: PathBuf) -> std::io::Result<Self> {
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            quota: None,
            write_lock: Mutex::new(()),
        })
    }

    /// Limit the total size of all stored values
    pub fn with_quota(mut self, quota: Option<u64>) -> Self {
        self.quota = quota;
        self
    }

    /// Root directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Total bytes of all stored values
    async fn used_bytes(&self) -> Result<u64> {
        let mut total = 0;
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            total += entry.metadata().await?.len();
        }
        Ok(total)
    }
}

#[async_trait]
impl KvStore for FileKvStore {
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        validate_key(key)?;
        match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, key: &str, value: &[u8]) -> Result<()> {
        validate_key(key)?;
        let _guard = self.write_lock.lock().await;
        let path = self.path_for(key);

        if self.quota.is_some() {
            let old_len = match tokio::fs::metadata(&path).await {
                Ok(meta) => meta.len(),
                Err(_) => 0,
            };
            check_quota(self.quota, self.used_bytes().await?, old_len, value.len() as u64)?;
        }

        let tmp = self.dir.join(format!("{}.json.tmp", key));
        tokio::fs::write(&tmp, value)
            .await
            .map_err(|e| Error::Persistence(format!("write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| Error::Persistence(format!("rename {}: {}", path.display(), e)))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        let _guard = self.write_lock.lock().await;
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Persistence(format!("remove {}: {}", key, e))),
        }
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}
