//! Constants used throughout the mediabench core crate.

/// Directory name, under the platform temp directory, used when no base directory is configured.
pub const DEFAULT_WORKBENCH_DIR_NAME: &str = "mediabench_workbench";

/// Environment variable binaries read to override the workbench base directory.
pub const WORKBENCH_DIR_ENV: &str = "MEDIABENCH_WORKBENCH_DIR";

/// How many fresh names `create_workbench` tries before giving up on collisions.
pub const MAX_CREATE_ATTEMPTS: usize = 5;

/// Separator placed between an override name and a kept extension.
pub const EXTENSION_SEPARATOR: char = '.';
