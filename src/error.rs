//! Error types for validator lookup and document validation

use serde_json::Value;
use thiserror::Error;

use crate::engine::Violation;

/// Result type for validation operations
pub type Result<T> = std::result::Result<T, ValidateError>;

/// Validator cache and validation errors
#[derive(Error, Debug)]
pub enum ValidateError {
    /// The requested sub-path does not resolve to a fragment of the schema
    #[error("Invalid schema path: no schema fragment at '{schema_path}'")]
    InvalidSchemaPath { schema_path: String },

    /// The document was rejected by the validator for `schema_path`
    #[error("Validation failed at schema path '{schema_path}': {} violation(s)", .violations.len())]
    ValidationFailed {
        violations: Vec<Violation>,
        schema_path: String,
        document: Value,
        /// Full root body of the owning schema
        schema: Value,
    },

    #[error("Schema compile error at '{schema_path}': {reason}")]
    Compile { schema_path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

impl ValidateError {
    /// Whether this is a document rejection rather than a lookup or setup fault
    pub fn is_validation_failure(&self) -> bool {
        matches!(self, ValidateError::ValidationFailed { .. })
    }

    /// Rule violations carried by a `ValidationFailed`, empty otherwise
    pub fn violations(&self) -> &[Violation] {
        match self {
            ValidateError::ValidationFailed { violations, .. } => violations,
            _ => &[],
        }
    }
}
