use mediabench_storage::StorageError;
use mediabench_types::{LogicalPath, PathError};
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum WorkbenchError {
    #[error("failed to create directory {}: {source}", path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(
        "refusing to destroy {} outside workbench base {}",
        path.display(),
        base.display()
    )]
    ScopeViolation { path: PathBuf, base: PathBuf },
    #[error("failed to destroy workbench {}: {source}", path.display())]
    Destruction {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to copy {logical_path} to {}: {source}", destination.display())]
    Copy {
        logical_path: LogicalPath,
        destination: PathBuf,
        #[source]
        source: StorageError,
    },
    #[error("invalid file name: {0}")]
    InvalidName(#[from] PathError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("blocking workbench task failed: {0}")]
    BlockingTask(#[from] tokio::task::JoinError),
}

impl WorkbenchError {
    /// Whether retrying the same call may succeed.
    ///
    /// Destruction and copy failures are environmental; a scope violation or a bad name
    /// will fail the same way every time.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Destruction { .. } | Self::Copy { .. })
    }
}

pub type WorkbenchResult<T> = std::result::Result<T, WorkbenchError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_retryable_kinds() {
        let destruction = WorkbenchError::Destruction {
            path: PathBuf::from("/tmp/wb/x"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "busy"),
        };
        let copy = WorkbenchError::Copy {
            logical_path: LogicalPath::parse("a.jpg").unwrap(),
            destination: PathBuf::from("/tmp/wb/x/a.jpg"),
            source: StorageError::NotLocal,
        };
        let scope = WorkbenchError::ScopeViolation {
            path: PathBuf::from("/etc"),
            base: PathBuf::from("/tmp/wb"),
        };

        assert!(destruction.is_retryable());
        assert!(copy.is_retryable());
        assert!(!scope.is_retryable());
        assert!(!WorkbenchError::InvalidName(PathError::Empty).is_retryable());
    }

    #[test]
    fn test_scope_violation_display() {
        let err = WorkbenchError::ScopeViolation {
            path: PathBuf::from("/etc"),
            base: PathBuf::from("/tmp/wb"),
        };
        assert_eq!(
            err.to_string(),
            "refusing to destroy /etc outside workbench base /tmp/wb"
        );
    }
}
