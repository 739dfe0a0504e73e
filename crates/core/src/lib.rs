//! # mediabench core
//!
//! Scratch space for media-processing jobs.
//!
//! A job asks a [`WorkbenchManager`] for a workbench (a fresh directory of its own), uses
//! [`localize()`] to get every input file as a plain local path, processes, and hands the
//! workbench back for destruction:
//!
//! ```no_run
//! use mediabench_core::{LocalizeOptions, WorkbenchConfig, WorkbenchManager};
//! use mediabench_storage::FileSystemStorage;
//! use mediabench_types::{FileName, LogicalPath};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = WorkbenchManager::new(&WorkbenchConfig::default())?;
//! let storage = FileSystemStorage::detached("/mnt/media");
//!
//! let workbench = manager.scoped()?;
//! let input = workbench.localize(
//!     &storage,
//!     &LogicalPath::parse("uploads/cat.jpg")?,
//!     &LocalizeOptions::new().with_name(FileName::new("source")?),
//! )?;
//! // ... process input.path ...
//! workbench.destroy()?;
//! # Ok(())
//! # }
//! ```
//!
//! Async job runners use [`WorkbenchLease`], which moves the same blocking work onto
//! tokio's blocking pool.
//!
//! **No storage concerns**: where file bytes live is the business of
//! `mediabench-storage` backends.

pub mod config;
pub mod constants;
pub mod error;
pub mod lease;
pub mod localize;
pub mod paths;
pub mod workbench;

pub use config::{default_base_dir, WorkbenchConfig};
pub use error::{WorkbenchError, WorkbenchResult};
pub use lease::WorkbenchLease;
pub use localize::{destination_name, localize, LocalizeOptions, Localized};
pub use workbench::{ScopedWorkbench, WorkbenchManager};
