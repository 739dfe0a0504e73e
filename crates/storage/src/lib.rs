//! mediabench storage backends
//!
//! Processing jobs read their inputs from a storage backend. Some backends keep files on
//! the local disk and can hand out a real path; others (object stores, in-memory stores,
//! detached mounts) can only copy bytes out to a local destination.
//!
//! The [`StorageBackend`] trait captures exactly that capability and nothing more:
//!
//! - [`StorageBackend::is_local`] reports whether logical paths map onto local files
//! - [`StorageBackend::local_path`] resolves a logical path without touching the disk
//! - [`StorageBackend::copy_locally`] copies a file's bytes to a local destination
//!
//! ## Example Usage
//!
//! ```no_run
//! use mediabench_storage::{FileSystemStorage, StorageBackend};
//! use mediabench_types::LogicalPath;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = FileSystemStorage::new("/srv/media");
//! let path = LogicalPath::parse("uploads/cat.jpg")?;
//!
//! assert!(storage.is_local());
//! let local = storage.local_path(&path)?;
//! # Ok(())
//! # }
//! ```

mod backend;
mod filesystem;
mod memory;

pub use backend::StorageBackend;
pub use filesystem::FileSystemStorage;
pub use memory::MemoryStorage;

use mediabench_types::LogicalPath;
use std::path::PathBuf;

/// Errors that can occur during storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The logical path does not name a stored file
    #[error("File not found in storage: {0}")]
    NotFound(LogicalPath),

    /// A local path was requested from a backend that does not expose one
    #[error("Storage backend does not expose local paths")]
    NotLocal,

    /// Reading the source or writing the destination failed
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
