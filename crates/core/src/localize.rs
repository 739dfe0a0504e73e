//! File localization.
//!
//! Processing tools want plain local paths. [`localize`] turns a file in any storage
//! backend into one: a local backend's own path is returned untouched, anything else is
//! copied into the job's workbench first.
//!
//! There is no caching. Localizing the same remote file twice copies it twice, and two
//! files that map to the same destination name overwrite each other; pick override names
//! accordingly.

use crate::constants::EXTENSION_SEPARATOR;
use crate::error::{WorkbenchError, WorkbenchResult};
use mediabench_storage::StorageBackend;
use mediabench_types::{FileName, LogicalPath};
use std::path::{Path, PathBuf};

/// How to name a file that has to be copied into a workbench.
///
/// Options only matter for non-local backends; a local file is never renamed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizeOptions {
    override_name: Option<FileName>,
    keep_extension: bool,
}

impl Default for LocalizeOptions {
    fn default() -> Self {
        Self {
            override_name: None,
            keep_extension: true,
        }
    }
}

impl LocalizeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy under `name` instead of the source's own file name.
    ///
    /// With [`Self::keep_extension`] enabled (the default), pass a bare name such as
    /// `source`; the source's extension is appended for you.
    pub fn with_name(mut self, name: FileName) -> Self {
        self.override_name = Some(name);
        self
    }

    pub fn keep_extension(mut self, keep: bool) -> Self {
        self.keep_extension = keep;
        self
    }

    pub fn override_name(&self) -> Option<&FileName> {
        self.override_name.as_ref()
    }

    pub fn keeps_extension(&self) -> bool {
        self.keep_extension
    }
}

/// Outcome of a [`localize`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Localized {
    /// Absolute local path of the file.
    pub path: PathBuf,
    /// Whether bytes were copied into the workbench.
    pub copied: bool,
}

/// Name a copied file will get inside the workbench.
///
/// - no override: the source's file name, unchanged
/// - override, extension kept, source has one: `<override>.<extension>`
/// - otherwise: the override, verbatim
pub fn destination_name(source: &FileName, options: &LocalizeOptions) -> WorkbenchResult<FileName> {
    let Some(name) = options.override_name() else {
        return Ok(source.clone());
    };

    match source.extension() {
        Some(ext) if options.keeps_extension() => Ok(FileName::new(format!(
            "{}{}{}",
            name, EXTENSION_SEPARATOR, ext
        ))?),
        _ => Ok(name.clone()),
    }
}

/// Make `logical_path` available as a local file.
///
/// If `backend` is local, its own path is returned and nothing is copied; that path belongs
/// to the backend, so treat it as read-only. Otherwise the file is copied to a single
/// entry directly under `workbench`, named per [`destination_name`].
///
/// # Errors
///
/// - [`WorkbenchError::Storage`] if a local backend cannot resolve the path
/// - [`WorkbenchError::InvalidName`] if the derived destination name is not a valid segment
/// - [`WorkbenchError::Copy`] if the backend fails to copy; the destination may then be
///   absent or partially written
pub fn localize<S>(
    workbench: &Path,
    backend: &S,
    logical_path: &LogicalPath,
    options: &LocalizeOptions,
) -> WorkbenchResult<Localized>
where
    S: StorageBackend + ?Sized,
{
    if backend.is_local() {
        let path = backend.local_path(logical_path)?;
        tracing::trace!(path = %logical_path, local = %path.display(), "File already local");
        return Ok(Localized {
            path,
            copied: false,
        });
    }

    let name = destination_name(logical_path.file_name(), options)?;
    let destination = workbench.join(name.as_str());

    backend
        .copy_locally(logical_path, &destination)
        .map_err(|source| WorkbenchError::Copy {
            logical_path: logical_path.clone(),
            destination: destination.clone(),
            source,
        })?;

    tracing::debug!(
        path = %logical_path,
        destination = %destination.display(),
        "Localized file into workbench"
    );

    Ok(Localized {
        path: destination,
        copied: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediabench_storage::{FileSystemStorage, MemoryStorage, StorageError, StorageResult};
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Non-local backend that records every copy request and writes a marker file.
    #[derive(Default)]
    struct RecordingStorage {
        copies: Mutex<Vec<(LogicalPath, PathBuf)>>,
    }

    impl StorageBackend for RecordingStorage {
        fn is_local(&self) -> bool {
            false
        }

        fn local_path(&self, _path: &LogicalPath) -> StorageResult<PathBuf> {
            Err(StorageError::NotLocal)
        }

        fn copy_locally(&self, path: &LogicalPath, destination: &Path) -> StorageResult<()> {
            self.copies
                .lock()
                .unwrap()
                .push((path.clone(), destination.to_path_buf()));
            fs::write(destination, path.to_string()).map_err(|e| StorageError::Io {
                path: destination.to_path_buf(),
                source: e,
            })
        }
    }

    /// Local backend that must never be asked to copy.
    struct LocalOnlyStorage;

    impl StorageBackend for LocalOnlyStorage {
        fn is_local(&self) -> bool {
            true
        }

        fn local_path(&self, path: &LogicalPath) -> StorageResult<PathBuf> {
            Ok(Path::new("/srv/media").join(path.to_relative_path()))
        }

        fn copy_locally(&self, _path: &LogicalPath, _destination: &Path) -> StorageResult<()> {
            panic!("local backends must not be copied from");
        }
    }

    fn logical(components: &[&str]) -> LogicalPath {
        LogicalPath::new(components.iter().copied()).unwrap()
    }

    fn name(input: &str) -> FileName {
        FileName::new(input).unwrap()
    }

    #[test]
    fn test_local_backend_returns_own_path() {
        let temp = TempDir::new().unwrap();
        let path = logical(&["a", "b", "foo.jpg"]);

        let result = localize(temp.path(), &LocalOnlyStorage, &path, &LocalizeOptions::new()).unwrap();

        assert_eq!(
            result,
            Localized {
                path: PathBuf::from("/srv/media/a/b/foo.jpg"),
                copied: false,
            }
        );
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_local_backend_ignores_override_name() {
        let temp = TempDir::new().unwrap();
        let options = LocalizeOptions::new().with_name(name("source"));

        let result =
            localize(temp.path(), &LocalOnlyStorage, &logical(&["foo.jpg"]), &options).unwrap();
        assert_eq!(result.path, PathBuf::from("/srv/media/foo.jpg"));
        assert!(!result.copied);
    }

    #[test]
    fn test_remote_backend_copies_under_source_name() {
        let temp = TempDir::new().unwrap();
        let backend = RecordingStorage::default();
        let path = logical(&["a", "b", "foo.jpg"]);

        let result = localize(temp.path(), &backend, &path, &LocalizeOptions::new()).unwrap();

        let expected = temp.path().join("foo.jpg");
        assert_eq!(
            result,
            Localized {
                path: expected.clone(),
                copied: true,
            }
        );

        let copies = backend.copies.lock().unwrap();
        assert_eq!(copies.len(), 1);
        assert_eq!(copies[0], (path.clone(), expected.clone()));
        assert_eq!(fs::read_to_string(&expected).unwrap(), "a/b/foo.jpg");
    }

    #[test]
    fn test_override_without_extension() {
        let temp = TempDir::new().unwrap();
        let backend = RecordingStorage::default();
        let options = LocalizeOptions::new()
            .with_name(name("source"))
            .keep_extension(false);

        let result = localize(temp.path(), &backend, &logical(&["a", "foo.jpg"]), &options).unwrap();

        assert_eq!(result.path, temp.path().join("source"));
        assert!(result.copied);
    }

    #[test]
    fn test_override_keeps_extension_with_single_separator() {
        let temp = TempDir::new().unwrap();
        let backend = RecordingStorage::default();
        let options = LocalizeOptions::new().with_name(name("source"));

        let result = localize(temp.path(), &backend, &logical(&["a", "foo.jpg"]), &options).unwrap();

        assert_eq!(result.path, temp.path().join("source.jpg"));
    }

    #[test]
    fn test_override_source_without_extension() {
        let temp = TempDir::new().unwrap();
        let backend = RecordingStorage::default();
        let options = LocalizeOptions::new().with_name(name("source"));

        let result = localize(temp.path(), &backend, &logical(&["a", "README"]), &options).unwrap();

        assert_eq!(result.path, temp.path().join("source"));
    }

    #[test]
    fn test_destination_name_rules() {
        let keep = LocalizeOptions::new().with_name(name("source"));
        let drop = keep.clone().keep_extension(false);

        let cases = [
            ("foo.jpg", LocalizeOptions::new(), "foo.jpg"),
            ("archive.tar.gz", keep.clone(), "source.gz"),
            (".hidden", keep.clone(), "source"),
            ("trailing.", keep.clone(), "source"),
            ("foo.jpg", drop.clone(), "source"),
        ];

        for (source, options, expected) in cases {
            let result = destination_name(&name(source), &options).unwrap();
            assert_eq!(result.as_str(), expected, "destination for {}", source);
        }
    }

    #[test]
    fn test_repeated_localize_copies_again() {
        let temp = TempDir::new().unwrap();
        let backend = MemoryStorage::new();
        let path = logical(&["media", "cat.jpg"]);
        backend.put(&path, b"first".to_vec());

        let first = localize(temp.path(), &backend, &path, &LocalizeOptions::new()).unwrap();
        backend.put(&path, b"second".to_vec());
        let second = localize(temp.path(), &backend, &path, &LocalizeOptions::new()).unwrap();

        assert_eq!(first.path, second.path);
        assert_eq!(backend.copy_count(), 2);
        assert_eq!(fs::read(&second.path).unwrap(), b"second");
    }

    #[test]
    fn test_copy_failure_propagates() {
        let temp = TempDir::new().unwrap();
        let backend = MemoryStorage::new();
        let path = logical(&["missing.jpg"]);

        let err = localize(temp.path(), &backend, &path, &LocalizeOptions::new()).unwrap_err();
        assert!(err.is_retryable());

        match err {
            WorkbenchError::Copy {
                destination,
                source,
                ..
            } => {
                assert_eq!(destination, temp.path().join("missing.jpg"));
                assert!(matches!(source, StorageError::NotFound(_)));
            }
            other => panic!("expected copy failure, got {:?}", other),
        }
    }

    #[test]
    fn test_detached_filesystem_storage_is_copied() {
        let temp = TempDir::new().unwrap();
        let store_dir = temp.path().join("store");
        let workbench = temp.path().join("wb");
        fs::create_dir_all(&workbench).unwrap();

        let path = logical(&["uploads", "clip.webm"]);
        let storage = FileSystemStorage::detached(&store_dir);
        storage.put(&path, b"frames").unwrap();

        let options = LocalizeOptions::new().with_name(name("input"));
        let result = localize(&workbench, &storage, &path, &options).unwrap();

        assert!(result.copied);
        assert_eq!(result.path, workbench.join("input.webm"));
        assert_eq!(fs::read(&result.path).unwrap(), b"frames");
    }

    #[test]
    fn test_works_through_trait_object() {
        let temp = TempDir::new().unwrap();
        let backend: Box<dyn StorageBackend> = Box::new(MemoryStorage::new());

        let result = localize(temp.path(), &*backend, &logical(&["x.png"]), &LocalizeOptions::new());
        assert!(matches!(result, Err(WorkbenchError::Copy { .. })));
    }
}
