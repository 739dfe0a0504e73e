//! Async workbench leases.
//!
//! Workbench operations are blocking filesystem calls. In an async job runner they run on
//! tokio's blocking pool through a [`WorkbenchLease`], never on a runtime worker.
//!
//! A lease destroys its workbench on every exit path: [`WorkbenchLease::release`] on
//! success, and `Drop` when the job errors out, its task is cancelled, or the runtime
//! shuts down. `Drop` removes the directory synchronously on the dropping thread.

use crate::error::WorkbenchResult;
use crate::localize::{localize, LocalizeOptions, Localized};
use crate::workbench::WorkbenchManager;
use mediabench_storage::StorageBackend;
use mediabench_types::LogicalPath;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task;

/// A workbench owned by one async job.
#[derive(Debug)]
pub struct WorkbenchLease {
    manager: Arc<WorkbenchManager>,
    path: PathBuf,
    released: bool,
}

impl WorkbenchLease {
    /// Creates a workbench on the blocking pool and wraps it in a lease.
    pub async fn acquire(manager: Arc<WorkbenchManager>) -> WorkbenchResult<Self> {
        let path = {
            let manager = Arc::clone(&manager);
            task::spawn_blocking(move || manager.create_workbench()).await??
        };

        Ok(Self {
            manager,
            path,
            released: false,
        })
    }

    /// Absolute path of the leased workbench.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Localizes a file into this workbench on the blocking pool.
    pub async fn localize<S>(
        &self,
        backend: Arc<S>,
        logical_path: LogicalPath,
        options: LocalizeOptions,
    ) -> WorkbenchResult<Localized>
    where
        S: StorageBackend + ?Sized + 'static,
    {
        let workbench = self.path.clone();
        task::spawn_blocking(move || localize(&workbench, &*backend, &logical_path, &options))
            .await?
    }

    /// Destroys the workbench and waits for the outcome.
    pub async fn release(mut self) -> WorkbenchResult<()> {
        self.released = true;
        let manager = Arc::clone(&self.manager);
        let path = self.path.clone();
        task::spawn_blocking(move || manager.destroy_workbench(&path)).await?
    }
}

impl Drop for WorkbenchLease {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        // Destroyed inline: a shutting-down runtime discards new blocking tasks.
        if let Err(e) = self.manager.destroy_workbench(&self.path) {
            tracing::warn!(
                workbench = %self.path.display(),
                error = %e,
                "Failed to destroy abandoned workbench"
            );
        }
    }
}
