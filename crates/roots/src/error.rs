//! Root configuration error types.

use publish_resolver_common::PathError;
use thiserror::Error;

/// Errors raised while loading a project's storage roots.
#[derive(Debug, Error, Clone)]
pub enum RootConfigError {
    /// The roots file could not be read.
    #[error(transparent)]
    Path(#[from] PathError),

    /// The roots file is not valid YAML or has the wrong shape.
    #[error("Cannot parse roots file {path}: {message}")]
    Parse { path: String, message: String },

    /// A root entry is unusable.
    #[error("Invalid root {name}: {reason}")]
    InvalidRoot { name: String, reason: String },

    /// The project root has no directory name to join onto storage paths.
    #[error("Project root {path} has no directory name")]
    InvalidProjectRoot { path: String },
}
