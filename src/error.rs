//! Error types for relationship and palette resolution

use thiserror::Error;

/// Errors that can occur while resolving conditions or building palettes
#[derive(Debug, Error)]
pub enum RelationshipError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    #[error("Missing field reference: '{field}' in legend '{legend}'")]
    MissingFieldReference { legend: String, field: String },

    #[error("Malformed merge: {0}")]
    MalformedMerge(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RelationshipError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedConfiguration(msg.into())
    }

    pub fn missing_field(legend: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingFieldReference {
            legend: legend.into(),
            field: field.into(),
        }
    }

    pub fn malformed_merge(msg: impl Into<String>) -> Self {
        Self::MalformedMerge(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, RelationshipError>;
