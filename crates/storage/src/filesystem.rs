//! Filesystem-based storage backend
//!
//! Stores files under a base directory, one filesystem directory per logical path
//! component: `{base_dir}/{component}/.../{file_name}`.

use crate::{StorageBackend, StorageError, StorageResult};
use mediabench_types::LogicalPath;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Directory-backed storage.
///
/// A storage built with [`FileSystemStorage::new`] exposes its files' real paths, so
/// processing reads them in place. One built with [`FileSystemStorage::detached`] keeps
/// the same on-disk layout but reports itself as non-local, which forces every read to go
/// through a copy (useful when the base directory is a slow or shared mount).
#[derive(Debug, Clone)]
pub struct FileSystemStorage {
    base_dir: PathBuf,
    expose_local_paths: bool,
}

impl FileSystemStorage {
    /// Create a local storage rooted at `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            expose_local_paths: true,
        }
    }

    /// Create a storage rooted at `base_dir` that does not hand out local paths.
    pub fn detached(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            expose_local_paths: false,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Write `data` at `path`, creating intermediate directories.
    pub fn put(&self, path: &LogicalPath, data: &[u8]) -> StorageResult<()> {
        let file_path = self.file_path(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }
        fs::write(&file_path, data).map_err(|e| StorageError::io(&file_path, e))?;

        tracing::trace!(path = %path, size = data.len(), "Stored file");
        Ok(())
    }

    fn file_path(&self, path: &LogicalPath) -> PathBuf {
        self.base_dir.join(path.to_relative_path())
    }
}

impl StorageBackend for FileSystemStorage {
    fn is_local(&self) -> bool {
        self.expose_local_paths
    }

    fn local_path(&self, path: &LogicalPath) -> StorageResult<PathBuf> {
        if !self.expose_local_paths {
            return Err(StorageError::NotLocal);
        }
        Ok(self.file_path(path))
    }

    fn copy_locally(&self, path: &LogicalPath, destination: &Path) -> StorageResult<()> {
        let source = self.file_path(path);

        // Map ENOENT on the source to NotFound; a missing destination directory is still
        // reported as an I/O error on the destination.
        let bytes = fs::copy(&source, destination).map_err(|e| {
            if e.kind() == ErrorKind::NotFound && !source.is_file() {
                StorageError::NotFound(path.clone())
            } else {
                StorageError::io(destination, e)
            }
        })?;

        tracing::debug!(
            path = %path,
            destination = %destination.display(),
            bytes,
            "Copied file out of filesystem storage"
        );
        Ok(())
    }
}
