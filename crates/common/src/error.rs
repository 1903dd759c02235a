//! Shared error types used across publish-resolver crates.

use thiserror::Error;

/// Path-related errors shared across crates.
#[derive(Debug, Error, Clone)]
pub enum PathError {
    /// A required file does not exist.
    #[error("File not found: {path}")]
    NotFound {
        /// The missing file.
        path: String,
    },

    /// IO error occurred while accessing path.
    #[error("IO error at {path}: {message}")]
    IoError {
        /// Path where error occurred.
        path: String,
        /// Error message.
        message: String,
    },
}

impl PathError {
    /// Create a PathError from std::io::Error.
    ///
    /// `NotFound` IO errors map to [`PathError::NotFound`].
    ///
    /// # Arguments
    /// * `path` - Path where the error occurred
    /// * `err` - The underlying IO error
    pub fn from_io(path: impl Into<String>, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { path: path.into() },
            _ => Self::IoError {
                path: path.into(),
                message: err.to_string(),
            },
        }
    }
}
