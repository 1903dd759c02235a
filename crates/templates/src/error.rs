//! Template error types.

use thiserror::Error;

/// Errors raised while building or rendering templates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// The template definition string could not be parsed.
    #[error("Invalid definition for template {template}: {reason}")]
    InvalidDefinition { template: String, reason: String },

    /// A field pattern is not a valid regular expression.
    #[error("Invalid pattern for field {field} in template {template}: {reason}")]
    InvalidPattern {
        template: String,
        field: String,
        reason: String,
    },

    /// A field has neither a value nor a default at render time.
    #[error("Template {template} cannot be rendered without a value for {field}")]
    MissingField { template: String, field: String },
}
