//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into the
//! [`crate::WorkbenchManager`]. The library never reads environment variables itself;
//! binaries read [`crate::constants::WORKBENCH_DIR_ENV`] and hand the raw value to
//! [`WorkbenchConfig::from_env_value`].

use crate::constants::DEFAULT_WORKBENCH_DIR_NAME;
use std::path::{Path, PathBuf};

/// Workbench configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkbenchConfig {
    base_dir: PathBuf,
}

impl WorkbenchConfig {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Build a configuration from an optional raw value (typically an environment variable).
    ///
    /// If `value` is `None` or empty/whitespace, the [`default_base_dir`] is used.
    pub fn from_env_value(value: Option<String>) -> Self {
        let base_dir = value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_base_dir);

        Self { base_dir }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self::new(default_base_dir())
    }
}

/// `<platform temp dir>/mediabench_workbench`.
pub fn default_base_dir() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_WORKBENCH_DIR_NAME)
}
