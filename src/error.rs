//! Error types for httpdoc

use std::io;
use thiserror::Error;

/// Result type for httpdoc operations
pub type Result<T> = std::result::Result<T, HttpDocError>;

/// Errors returned by configuration loading and document generation.
///
/// Assertion failures during a recorded exchange are not errors in this
/// sense; they are reported through a [`Reporter`](crate::validate::Reporter).
#[derive(Debug, Error)]
pub enum HttpDocError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Template could not be parsed
    #[error("Template parsing error: {0}")]
    Template(String),

    /// Template could not be rendered with the document
    #[error("Template rendering error: {0}")]
    Render(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<handlebars::TemplateError> for HttpDocError {
    fn from(err: handlebars::TemplateError) -> Self {
        HttpDocError::Template(err.to_string())
    }
}

impl From<handlebars::RenderError> for HttpDocError {
    fn from(err: handlebars::RenderError) -> Self {
        HttpDocError::Render(err.to_string())
    }
}
