//! Durable snapshot storage.
//!
//! A storage backend holds named records, each an opaque byte snapshot of a
//! whole collection. Writes replace the record atomically: a reader sees
//! either the previous snapshot or the new one, never a torn write.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::error::StoreError;

/// Backend for named snapshot records.
#[async_trait]
pub trait SnapshotStorage: Send + Sync {
    /// Returns the record's bytes, or `None` if it was never written.
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Replaces the record.
    async fn save(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;

    /// Deletes the record. Removing a missing record is not an error.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Record names become file names, so they are restricted to `[a-z0-9_]`.
fn check_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::UnknownRecord(key.to_string()))
    }
}

/// One `<key>.json` file per record in a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Opens (and creates if needed) the data directory.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::io(dir.display().to_string(), e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

#[async_trait]
impl SnapshotStorage for FileStorage {
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        check_key(key)?;
        match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(key, e)),
        }
    }

    async fn save(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        check_key(key)?;
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));

        let mut file = tokio::fs::File::create(&tmp)
            .await
            .map_err(|e| StoreError::io(key, e))?;
        file.write_all(bytes)
            .await
            .map_err(|e| StoreError::io(key, e))?;
        file.sync_all().await.map_err(|e| StoreError::io(key, e))?;
        drop(file);

        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| StoreError::io(key, e))?;

        tracing::trace!(key, bytes = bytes.len(), "Record written");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        check_key(key)?;
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(key, e)),
        }
    }
}

/// In-process storage for tests and ephemeral runs.
///
/// Writes can be made to fail on demand, globally or per record.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: RwLock<HashMap<String, Vec<u8>>>,
    fail_writes: AtomicBool,
    failing_keys: RwLock<HashSet<String>>,
    writes: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `save`/`remove` fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes writes to one record fail until cleared.
    pub async fn fail_writes_to(&self, key: &str) {
        self.failing_keys.write().await.insert(key.to_string());
    }

    pub async fn clear_failures(&self) {
        self.set_fail_writes(false);
        self.failing_keys.write().await.clear();
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Puts raw bytes in place without going through the failure switches.
    pub async fn insert_raw(&self, key: &str, bytes: impl Into<Vec<u8>>) {
        self.records
            .write()
            .await
            .insert(key.to_string(), bytes.into());
    }

    async fn check_writable(&self, key: &str) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) || self.failing_keys.read().await.contains(key)
        {
            return Err(StoreError::io(
                key,
                std::io::Error::new(ErrorKind::Other, "simulated storage failure"),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl SnapshotStorage for MemoryStorage {
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        check_key(key)?;
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        check_key(key)?;
        self.check_writable(key).await?;
        self.records
            .write()
            .await
            .insert(key.to_string(), bytes.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        check_key(key)?;
        self.check_writable(key).await?;
        self.records.write().await.remove(key);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
