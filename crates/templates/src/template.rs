//! Template engine contract.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::TemplateError;

/// A parametrized path.
pub trait Template: Send + Sync {
    /// Template name, used in logs and errors.
    fn name(&self) -> &str;

    /// Fields whose value varies per rendered instance (e.g. frame number).
    fn abstract_fields(&self) -> Vec<String>;

    /// Extract field values from a path.
    ///
    /// # Arguments
    /// * `path` - Slash-normalized path
    ///
    /// # Returns
    /// Field name to value, or `None` if the path does not match.
    fn extract_fields(&self, path: &str) -> Option<HashMap<String, String>>;

    /// Build a path from field values.
    ///
    /// Fields missing from `fields` take the template's default value.
    ///
    /// # Errors
    /// Returns [`TemplateError::MissingField`] if a field has neither a value
    /// nor a default.
    fn render(&self, fields: &HashMap<String, String>) -> Result<String, TemplateError>;
}

/// Finds the template a path belongs to.
pub trait TemplateMatcher: Send + Sync {
    /// Find the template matching a path.
    ///
    /// # Arguments
    /// * `path` - Slash-normalized path
    fn template_from_path(&self, path: &str) -> Option<Arc<dyn Template>>;
}
