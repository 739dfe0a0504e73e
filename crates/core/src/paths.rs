//! Lexical path helpers for scope checks.
//!
//! Scope checks must not depend on the target existing (a half-deleted workbench still has
//! to pass or fail the same check), so these helpers work on path text alone and never
//! resolve symlinks.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Make `path` absolute against the current directory and fold `.` and `..` components.
///
/// `..` at the root stays at the root, the same as the kernel's own resolution.
pub fn absolutize(path: &Path) -> io::Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::Prefix(prefix) => normalized.push(prefix.as_os_str()),
            Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            Component::Normal(part) => normalized.push(part),
        }
    }

    Ok(normalized)
}

/// True if `path` lies strictly below `base`, compared component by component.
///
/// `base` itself is not within `base`, and `/tmp/wb-evil` is not within `/tmp/wb`.
pub fn is_strictly_within(path: &Path, base: &Path) -> bool {
    path != base && path.starts_with(base)
}
