//! In-memory storage backend
//!
//! Holds file bytes in process memory. It never exposes local paths, so it behaves like a
//! remote object store from a processing job's point of view.

use crate::{StorageBackend, StorageError, StorageResult};
use mediabench_types::LogicalPath;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Non-local storage backed by a map of logical paths to bytes.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: RwLock<HashMap<LogicalPath, Vec<u8>>>,
    copies: AtomicU64,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `data` at `path`, replacing any previous content.
    pub fn put(&self, path: &LogicalPath, data: impl Into<Vec<u8>>) {
        self.files.write().insert(path.clone(), data.into());
    }

    pub fn contains(&self, path: &LogicalPath) -> bool {
        self.files.read().contains_key(path)
    }

    /// Number of successful [`StorageBackend::copy_locally`] calls so far.
    pub fn copy_count(&self) -> u64 {
        self.copies.load(Ordering::Relaxed)
    }
}

impl StorageBackend for MemoryStorage {
    fn is_local(&self) -> bool {
        false
    }

    fn local_path(&self, _path: &LogicalPath) -> StorageResult<PathBuf> {
        Err(StorageError::NotLocal)
    }

    fn copy_locally(&self, path: &LogicalPath, destination: &Path) -> StorageResult<()> {
        // Clone out so the write to disk does not hold the lock.
        let data = self
            .files
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(path.clone()))?;

        fs::write(destination, &data).map_err(|e| StorageError::io(destination, e))?;
        self.copies.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(
            path = %path,
            destination = %destination.display(),
            bytes = data.len(),
            "Copied file out of memory storage"
        );
        Ok(())
    }
}
