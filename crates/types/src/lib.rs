//! Validated path value types shared by the storage backends and the workbench core.
//!
//! Storage backends address files by a [`LogicalPath`]: an ordered list of [`FileName`]
//! segments that may or may not correspond to a real filesystem location. Both types are
//! validated at construction so that nothing downstream has to re-check for traversal
//! segments or embedded separators.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Errors that can occur when creating validated path types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// A file name was empty
    #[error("File name cannot be empty")]
    Empty,

    /// A logical path had no components at all
    #[error("Logical path must contain at least one component")]
    NoComponents,

    /// The name is `.` or `..`
    #[error("File name '{0}' is reserved")]
    Reserved(String),

    /// The name contains a path separator or NUL byte
    #[error("File name '{0}' contains a separator or NUL character")]
    InvalidCharacter(String),
}

/// A single path segment.
///
/// A `FileName` never contains `/`, `\` or NUL, and is never `.` or `..`, so joining it
/// onto a directory always yields a direct child of that directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileName(String);

impl FileName {
    /// Creates a new `FileName`, rejecting anything that is not exactly one path segment.
    ///
    /// Unlike free text, names are not trimmed: `" a.jpg"` is a valid, distinct name.
    pub fn new(input: impl Into<String>) -> Result<Self, PathError> {
        let input = input.into();
        if input.is_empty() {
            return Err(PathError::Empty);
        }
        if input == "." || input == ".." {
            return Err(PathError::Reserved(input));
        }
        if input.contains(['/', '\\', '\0']) {
            return Err(PathError::InvalidCharacter(input));
        }
        Ok(Self(input))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the extension, without its leading dot.
    ///
    /// Follows the usual dotfile rules: `".bashrc"` and `"..hidden"` have no extension,
    /// `"archive.tar.gz"` has `"gz"`, and a trailing dot (`"notes."`) counts as no
    /// extension.
    pub fn extension(&self) -> Option<&str> {
        self.split_extension().1
    }

    /// Returns the name without its extension.
    pub fn stem(&self) -> &str {
        self.split_extension().0
    }

    fn split_extension(&self) -> (&str, Option<&str>) {
        // Leading dots belong to the stem: "..hidden" has no extension.
        let leading = self.0.len() - self.0.trim_start_matches('.').len();
        match self.0[leading..].rfind('.') {
            None => (&self.0, None),
            Some(idx) if leading + idx + 1 == self.0.len() => (&self.0, None),
            Some(idx) => {
                let idx = leading + idx;
                (&self.0[..idx], Some(&self.0[idx + 1..]))
            }
        }
    }
}

impl fmt::Display for FileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FileName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for FileName {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl serde::Serialize for FileName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for FileName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FileName::new(s).map_err(serde::de::Error::custom)
    }
}

/// A file's location inside a storage backend's namespace.
///
/// The final component is the file's name; everything before it is the "directory" part,
/// which a backend may or may not map onto real directories.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogicalPath(Vec<FileName>);

impl LogicalPath {
    /// Builds a logical path from its components, validating each one.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::NoComponents`] for an empty iterator, or the first component's
    /// validation error.
    pub fn new<I, S>(components: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let components = components
            .into_iter()
            .map(FileName::new)
            .collect::<Result<Vec<_>, _>>()?;

        if components.is_empty() {
            return Err(PathError::NoComponents);
        }

        Ok(Self(components))
    }

    /// Parses a `/`-separated path such as `media/2024/cat.jpg`.
    ///
    /// Empty segments (leading, trailing or doubled slashes) are rejected rather than
    /// silently skipped.
    pub fn parse(input: &str) -> Result<Self, PathError> {
        if input.is_empty() {
            return Err(PathError::NoComponents);
        }
        Self::new(input.split('/'))
    }

    pub fn components(&self) -> &[FileName] {
        &self.0
    }

    /// The final component.
    pub fn file_name(&self) -> &FileName {
        // Construction guarantees at least one component.
        &self.0[self.0.len() - 1]
    }

    /// The components joined as a relative filesystem path.
    pub fn to_relative_path(&self) -> PathBuf {
        self.0.iter().map(FileName::as_str).collect()
    }
}

impl fmt::Display for LogicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, component) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str("/")?;
            }
            f.write_str(component.as_str())?;
        }
        Ok(())
    }
}

impl FromStr for LogicalPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl serde::Serialize for LogicalPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for LogicalPath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        LogicalPath::parse(&s).map_err(serde::de::Error::custom)
    }
}
