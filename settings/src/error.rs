//! Error types for settings documents.

use argbind_core::SchemaError;
use thiserror::Error;

/// Errors that can occur while saving or loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The document was saved for a different configuration type.
    #[error("settings are for '{found}', expected '{expected}'")]
    TypeMismatch { expected: String, found: String },

    /// A stored property does not fit its field.
    #[error("invalid value for '{name}': {message}")]
    InvalidProperty { name: String, message: String },

    /// The configuration type's schema could not be built.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Convenience alias for results with [`SettingsError`].
pub type Result<T> = std::result::Result<T, SettingsError>;
