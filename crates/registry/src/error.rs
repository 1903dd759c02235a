//! Error types for registry operations.

use publish_resolver_common::PathError;
use thiserror::Error;

/// Errors that can occur during registry operations.
#[derive(Error, Debug, Clone)]
pub enum RegistryError {
    /// Entity does not exist.
    #[error("{entity_type} {id} not found")]
    NotFound { entity_type: String, id: i64 },

    /// SQLite database error (embedded registry).
    #[error("SQLite error: {0}")]
    Sqlite(String),

    /// Record payload could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Record is missing its type or id.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Remote registry call failed.
    #[error("Registry request failed: {message}")]
    Remote { message: String },

    /// Connection configuration file could not be read.
    #[error(transparent)]
    ConfigFile(#[from] PathError),

    /// Connection configuration file is malformed.
    #[error("Cannot load config file {path}: {message}")]
    Config { path: String, message: String },

    /// Connection configuration file lacks a required field.
    #[error("Missing required field '{field}' in config {path}")]
    MissingConfigField { path: String, field: &'static str },

    /// The API script user is unknown to the registry.
    #[error("Could not find the registry user for script '{script}'")]
    ScriptUserNotFound { script: String },
}

impl From<rusqlite::Error> for RegistryError {
    fn from(err: rusqlite::Error) -> Self {
        RegistryError::Sqlite(err.to_string())
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        RegistryError::Serialization(err.to_string())
    }
}
