//! Error types for publish operations.

use publish_resolver_registry::RegistryError;
use publish_resolver_roots::RootConfigError;
use thiserror::Error;

/// Errors that can occur while finding or registering publishes.
#[derive(Error, Debug, Clone)]
pub enum PublishError {
    /// A project root has no matching storage in the registry.
    #[error(
        "Unable to locate LocalStorage matching root name {storage}. Ensure that all project \
         roots defined in the project's roots file have matching storages in the registry."
    )]
    ConfigurationMismatch { storage: String },

    /// The requested publish type does not exist for the project.
    #[error("Publish type '{label}' not found")]
    UnknownClassification { label: String },

    /// Registration options failed validation.
    #[error("Invalid publish options: {message}")]
    InvalidOptions { message: String },

    /// The project's roots could not be loaded.
    #[error("Root configuration error: {0}")]
    Roots(#[from] RootConfigError),

    /// A registry call failed.
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}
