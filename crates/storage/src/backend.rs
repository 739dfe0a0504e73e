//! Storage backend capability trait

use crate::StorageResult;
use mediabench_types::LogicalPath;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Trait for storage backends a processing job can read from.
///
/// All implementations must be thread-safe (Send + Sync) so a backend can be shared
/// between concurrent jobs. Every method is blocking; async callers should run them on
/// a blocking pool.
pub trait StorageBackend: Send + Sync {
    /// Whether logical paths map directly onto local filesystem paths.
    fn is_local(&self) -> bool;

    /// Resolve a logical path to the real local path of the stored file.
    ///
    /// Performs no I/O: the returned path is not checked for existence.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StorageError::NotLocal`] when [`Self::is_local`] is false.
    fn local_path(&self, path: &LogicalPath) -> StorageResult<PathBuf>;

    /// Copy the stored file's bytes to `destination`, overwriting any existing file.
    ///
    /// Works for every backend, local or not. On error the destination may be absent
    /// or partially written.
    fn copy_locally(&self, path: &LogicalPath, destination: &Path) -> StorageResult<()>;
}

impl<T: StorageBackend + ?Sized> StorageBackend for &T {
    fn is_local(&self) -> bool {
        (**self).is_local()
    }

    fn local_path(&self, path: &LogicalPath) -> StorageResult<PathBuf> {
        (**self).local_path(path)
    }

    fn copy_locally(&self, path: &LogicalPath, destination: &Path) -> StorageResult<()> {
        (**self).copy_locally(path, destination)
    }
}

impl<T: StorageBackend + ?Sized> StorageBackend for Box<T> {
    fn is_local(&self) -> bool {
        (**self).is_local()
    }

    fn local_path(&self, path: &LogicalPath) -> StorageResult<PathBuf> {
        (**self).local_path(path)
    }

    fn copy_locally(&self, path: &LogicalPath, destination: &Path) -> StorageResult<()> {
        (**self).copy_locally(path, destination)
    }
}

impl<T: StorageBackend + ?Sized> StorageBackend for Arc<T> {
    fn is_local(&self) -> bool {
        (**self).is_local()
    }

    fn local_path(&self, path: &LogicalPath) -> StorageResult<PathBuf> {
        (**self).local_path(path)
    }

    fn copy_locally(&self, path: &LogicalPath, destination: &Path) -> StorageResult<()> {
        (**self).copy_locally(path, destination)
    }
}
