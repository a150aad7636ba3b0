//! Builder error types.

use thiserror::Error;
use turbo_backend::BackendError;

/// Errors surfaced by the builder.
///
/// Structural edits never fail: the mutation engine returns the tree
/// unchanged instead. These errors come from field validation, document
/// loading and backend calls.
#[derive(Error, Debug)]
pub enum BuilderError {
    /// Widget not found.
    #[error("Widget not found: {0}")]
    WidgetNotFound(String),

    /// Row not found.
    #[error("Row not found: {0}")]
    RowNotFound(String),

    /// The field is not part of the node's schema.
    #[error("Unknown field {field} for {kind}")]
    UnknownField { kind: String, field: String },

    /// The value does not satisfy the field's constraints.
    #[error("Invalid value for {field}: {message}")]
    InvalidField { field: String, message: String },

    /// Two nodes of a loaded page share an id.
    #[error("Duplicate node id: {0}")]
    DuplicateId(String),

    /// A loaded row's columns do not follow its preset.
    #[error("Invalid layout for row {row}: {message}")]
    InvalidLayout { row: String, message: String },

    /// Row preset id not in the preset table.
    #[error("Unknown row preset: {0}")]
    UnknownPreset(String),

    /// Saved document written by a newer builder.
    #[error("Unsupported document version {found} (supported up to {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// No backend configured for this session.
    #[error("No backend configured")]
    BackendUnavailable,

    /// Backend call failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl BuilderError {
    /// Shorthand for a validation failure.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        BuilderError::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for BuilderError {
    fn from(e: serde_json::Error) -> Self {
        BuilderError::SerializationError(e.to_string())
    }
}
