//! Error types for template resolution and composition.

use thiserror::Error;

/// Result type alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors that can occur while resolving, rendering or composing templates.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// One or more members of a template set are missing.
    ///
    /// Carries every missing piece, one message per line.
    #[error("{}", messages.join("\n"))]
    Resolution { model: String, messages: Vec<String> },

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Rendering of {template} failed: {message}")]
    Render { template: String, message: String },

    #[error("Template {template} failed to compile: {message}")]
    Compile { template: String, message: String },

    #[error("Duplicate template identifier: {0}")]
    DuplicateTemplate(String),

    #[error("Duplicate resource name: {name} ({first} and {second})")]
    DuplicateResource {
        name: String,
        first: String,
        second: String,
    },

    #[error("Resource {0} is not valid UTF-8")]
    InvalidEncoding(String),

    #[error("Invalid template package: {0}")]
    InvalidPackage(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TemplateError {
    /// Missing-resource messages when this is a resolution failure.
    pub fn missing(&self) -> &[String] {
        match self {
            Self::Resolution { messages, .. } => messages,
            _ => &[],
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ResourceNotFound(_))
    }
}
