//! Validation engine seam
//!
//! The cache never looks inside a compiled validator: it only needs
//! "compile this fragment" and "check this document". [`JsonSchemaEngine`]
//! provides both on top of the `jsonschema` crate.

use std::fmt;
use std::sync::Arc;

use jsonschema::{Draft, JSONSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::EngineConfig;
use crate::error::{Result, ValidateError};

/// A single rule violation reported by a compiled validator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// JSON Pointer to the violating value in the document
    pub instance_path: String,
    /// JSON Pointer to the schema keyword that rejected it
    pub schema_path: String,
    /// Human-readable description
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

/// A compiled, reusable validation function
pub trait CompiledValidator: Send + Sync {
    /// Check a document, returning every violation on rejection
    fn check(&self, document: &Value) -> std::result::Result<(), Vec<Violation>>;
}

/// Compiles schema fragments into validators
pub trait ValidationEngine: Send + Sync {
    /// Compile a fragment; `schema_path` is only used for error context
    fn compile(&self, fragment: &Value, schema_path: &str) -> Result<Arc<dyn CompiledValidator>>;
}

/// Supported JSON Schema drafts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SchemaDraft {
    Draft4,
    Draft6,
    #[default]
    Draft7,
}

impl From<SchemaDraft> for Draft {
    fn from(draft: SchemaDraft) -> Self {
        match draft {
            SchemaDraft::Draft4 => Draft::Draft4,
            SchemaDraft::Draft6 => Draft::Draft6,
            SchemaDraft::Draft7 => Draft::Draft7,
        }
    }
}

/// Engine backed by the `jsonschema` crate
#[derive(Debug, Clone, Default)]
pub struct JsonSchemaEngine {
    draft: SchemaDraft,
}

impl JsonSchemaEngine {
    pub fn new(draft: SchemaDraft) -> Self {
        Self { draft }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.draft)
    }

    pub fn draft(&self) -> SchemaDraft {
        self.draft
    }
}

impl ValidationEngine for JsonSchemaEngine {
    fn compile(&self, fragment: &Value, schema_path: &str) -> Result<Arc<dyn CompiledValidator>> {
        let compiled = JSONSchema::options()
            .with_draft(self.draft.into())
            .compile(fragment)
            .map_err(|e| ValidateError::Compile {
                schema_path: schema_path.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Arc::new(JsonSchemaValidator { compiled }))
    }
}

struct JsonSchemaValidator {
    compiled: JSONSchema,
}

impl CompiledValidator for JsonSchemaValidator {
    fn check(&self, document: &Value) -> std::result::Result<(), Vec<Violation>> {
        self.compiled.validate(document).map_err(|errors| {
            errors
                .map(|e| Violation {
                    instance_path: e.instance_path.to_string(),
                    schema_path: e.schema_path.to_string(),
                    message: e.to_string(),
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compile_and_check() {
        let engine = JsonSchemaEngine::default();
        let validator = engine
            .compile(&json!({"type": "object", "required": ["age"]}), "")
            .unwrap();

        assert!(validator.check(&json!({"age": 1})).is_ok());

        let violations = validator.check(&json!({})).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].instance_path, "");
        assert!(violations[0].message.contains("age"));
    }

    #[test]
    fn test_violation_paths() {
        let engine = JsonSchemaEngine::new(SchemaDraft::Draft4);
        let validator = engine
            .compile(
                &json!({"type": "object", "properties": {"age": {"type": "number"}}}),
                "",
            )
            .unwrap();

        let violations = validator.check(&json!({"age": "x"})).unwrap_err();
        assert_eq!(violations[0].instance_path, "/age");
        assert_eq!(violations[0].schema_path, "/properties/age/type");
        assert!(violations[0].to_string().starts_with("/age: "));
    }

    #[test]
    fn test_compile_error() {
        let engine = JsonSchemaEngine::default();
        let result = engine.compile(&json!({"type": 42}), "age");
        match result {
            Err(ValidateError::Compile { schema_path, .. }) => assert_eq!(schema_path, "age"),
            Err(other) => panic!("Expected Compile error, got {:?}", other),
            Ok(_) => panic!("Expected Compile error"),
        }
    }
}
