//! Workbench allocation and destruction.
//!
//! A workbench is a scratch directory owned by exactly one processing job. The
//! [`WorkbenchManager`] creates workbenches as uniquely named children of its base
//! directory and is the only thing allowed to delete them.
//!
//! ```text
//! <base_dir>/                      # created when the manager is built
//! ├── 3f2a9c1e0b7d4e6f8a1b2c3d4e5f6a7b/   # one workbench per job
//! │   ├── source.jpg               # files staged by `localize`
//! │   └── ...                      # anything else the job writes
//! └── 9b8c7d6e5f4a4b3c2d1e0f9a8b7c6d5e/
//! ```
//!
//! The manager keeps no registry of live workbenches. Whether a path may be destroyed is
//! decided by where it is, checked every time [`WorkbenchManager::destroy_workbench`] runs.

use crate::config::WorkbenchConfig;
use crate::constants::MAX_CREATE_ATTEMPTS;
use crate::error::{WorkbenchError, WorkbenchResult};
use crate::localize::{localize, LocalizeOptions, Localized};
use crate::paths;
use mediabench_storage::StorageBackend;
use mediabench_types::LogicalPath;
use std::{
    fs,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};
use uuid::Uuid;

/// Creates and destroys workbenches under one base directory.
///
/// Cheap to clone; clones share the same base directory. Safe to use from many threads at
/// once: uniqueness comes from exclusive directory creation, not from locking.
#[derive(Clone, Debug)]
pub struct WorkbenchManager {
    base_dir: PathBuf,
}

impl WorkbenchManager {
    /// Creates a manager for the configured base directory, creating it if needed.
    ///
    /// The stored base directory is absolute and canonical, so every workbench path the
    /// manager hands out is canonical too.
    ///
    /// # Errors
    ///
    /// Returns [`WorkbenchError::DirectoryCreation`] if the base directory cannot be
    /// created or resolved.
    pub fn new(config: &WorkbenchConfig) -> WorkbenchResult<Self> {
        Self::with_base_dir(config.base_dir())
    }

    /// Creates a manager rooted at `base_dir`, creating the directory if needed.
    pub fn with_base_dir(base_dir: impl AsRef<Path>) -> WorkbenchResult<Self> {
        let requested = base_dir.as_ref();
        let creation_error = |source: io::Error| WorkbenchError::DirectoryCreation {
            path: requested.to_path_buf(),
            source,
        };

        let absolute = paths::absolutize(requested).map_err(creation_error)?;
        fs::create_dir_all(&absolute).map_err(creation_error)?;
        let base_dir = absolute.canonicalize().map_err(creation_error)?;

        tracing::debug!(base_dir = %base_dir.display(), "Workbench manager ready");
        Ok(Self { base_dir })
    }

    /// The canonical base directory all workbenches live in.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Creates a new, empty, uniquely named workbench and returns its absolute path.
    ///
    /// # Errors
    ///
    /// Returns [`WorkbenchError::DirectoryCreation`] on permission or disk errors, or if
    /// no unused name was found after a few attempts.
    pub fn create_workbench(&self) -> WorkbenchResult<PathBuf> {
        let path = create_unique_dir(&self.base_dir, || Uuid::new_v4().simple().to_string())?;
        tracing::debug!(workbench = %path.display(), "Created workbench");
        Ok(path)
    }

    /// Creates a workbench that is destroyed when the returned guard goes out of scope.
    pub fn scoped(&self) -> WorkbenchResult<ScopedWorkbench<'_>> {
        Ok(ScopedWorkbench {
            manager: self,
            path: self.create_workbench()?,
            released: false,
        })
    }

    /// Deletes a workbench and everything in it.
    ///
    /// `workbench` is made absolute and normalized, then must lie strictly inside the base
    /// directory; the base directory itself is never destroyed. A path that no longer
    /// exists counts as already destroyed, so a failed destruction can simply be retried.
    ///
    /// # Errors
    ///
    /// - [`WorkbenchError::ScopeViolation`] if the path is outside the base directory.
    ///   Nothing is touched.
    /// - [`WorkbenchError::Destruction`] if recursive removal fails part way; some of the
    ///   tree may already be gone.
    pub fn destroy_workbench(&self, workbench: &Path) -> WorkbenchResult<()> {
        let target = self.resolve_in_scope(workbench)?;

        match fs::remove_dir_all(&target) {
            Ok(()) => {
                tracing::debug!(workbench = %target.display(), "Destroyed workbench");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(workbench = %target.display(), "Workbench already absent");
                Ok(())
            }
            Err(source) => Err(WorkbenchError::Destruction {
                path: target,
                source,
            }),
        }
    }

    /// True if `path` would pass the scope check in [`Self::destroy_workbench`].
    pub fn contains(&self, path: &Path) -> bool {
        self.resolve_in_scope(path).is_ok()
    }

    /// Normalizes `path` and checks it against the base directory.
    ///
    /// The path is normalized lexically. When its parent directory exists, the parent is
    /// canonicalized too, so a symlinked directory inside the base cannot redirect removal
    /// to somewhere outside it. The final component is never followed: removing a symlink
    /// removes the link, not its target.
    fn resolve_in_scope(&self, path: &Path) -> WorkbenchResult<PathBuf> {
        let violation = |path: PathBuf| WorkbenchError::ScopeViolation {
            path,
            base: self.base_dir.clone(),
        };

        let target = paths::absolutize(path).map_err(|_| violation(path.to_path_buf()))?;

        let resolved = match (target.parent(), target.file_name()) {
            (Some(parent), Some(name)) => match parent.canonicalize() {
                Ok(parent) => parent.join(name),
                Err(e) if e.kind() == ErrorKind::NotFound => target.clone(),
                Err(_) => return Err(violation(target.clone())),
            },
            _ => target.clone(),
        };

        if !paths::is_strictly_within(&resolved, &self.base_dir) {
            return Err(violation(target));
        }

        Ok(resolved)
    }
}

/// Creates a uniquely named directory directly under `base_dir`.
///
/// Names come from `name_source`. Creation is exclusive, so a name that already exists
/// (from a collision or a concurrent caller) is skipped, up to [`MAX_CREATE_ATTEMPTS`].
pub(crate) fn create_unique_dir(
    base_dir: &Path,
    mut name_source: impl FnMut() -> String,
) -> WorkbenchResult<PathBuf> {
    for _attempt in 0..MAX_CREATE_ATTEMPTS {
        let candidate = base_dir.join(name_source());

        match create_private_dir(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(source) => {
                return Err(WorkbenchError::DirectoryCreation {
                    path: candidate,
                    source,
                })
            }
        }
    }

    Err(WorkbenchError::DirectoryCreation {
        path: base_dir.to_path_buf(),
        source: io::Error::new(
            ErrorKind::AlreadyExists,
            format!(
                "failed to allocate a unique workbench after {} attempts",
                MAX_CREATE_ATTEMPTS
            ),
        ),
    })
}

/// Exclusive, non-recursive create; owner-only on Unix.
fn create_private_dir(path: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(path)
}

/// A workbench tied to the lifetime of a guard.
///
/// Dropping the guard destroys the workbench, logging (not panicking) on failure. Call
/// [`ScopedWorkbench::destroy`] instead to observe the error.
#[derive(Debug)]
pub struct ScopedWorkbench<'a> {
    manager: &'a WorkbenchManager,
    path: PathBuf,
    released: bool,
}

impl ScopedWorkbench<'_> {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Localizes a file into this workbench. See [`crate::localize()`].
    pub fn localize<S>(
        &self,
        backend: &S,
        logical_path: &LogicalPath,
        options: &LocalizeOptions,
    ) -> WorkbenchResult<Localized>
    where
        S: StorageBackend + ?Sized,
    {
        localize(&self.path, backend, logical_path, options)
    }

    /// Destroys the workbench now and reports the outcome.
    pub fn destroy(mut self) -> WorkbenchResult<()> {
        self.released = true;
        self.manager.destroy_workbench(&self.path)
    }
}

impl Drop for ScopedWorkbench<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.manager.destroy_workbench(&self.path) {
            tracing::warn!(
                workbench = %self.path.display(),
                error = %e,
                "Failed to destroy workbench on drop"
            );
        }
    }
}
