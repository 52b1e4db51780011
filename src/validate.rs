//! Document validation against cached validators

use std::sync::Arc;

use serde_json::Value;

use crate::cache::ValidatorCache;
use crate::checksum::SchemaHash;
use crate::engine::CompiledValidator;
use crate::error::{Result, ValidateError};
use crate::schema::{Schema, SchemaSource};

/// Validation contract for schema owners
pub trait Validatable {
    /// Cached (or freshly compiled) validator for `schema_path`
    fn validator(&self, schema_path: &str) -> Result<Arc<dyn CompiledValidator>>;

    /// Full root body, attached to rejections for context
    fn schema_body(&self) -> &Value;

    /// Validate `document` against the fragment at `schema_path`
    ///
    /// Returns the document unchanged on success. On rejection the document
    /// moves into the `ValidationFailed` error.
    fn validate(&self, document: Value, schema_path: &str) -> Result<Value> {
        let validator = self.validator(schema_path)?;
        match validator.check(&document) {
            Ok(()) => Ok(document),
            Err(violations) => Err(ValidateError::ValidationFailed {
                violations,
                schema_path: schema_path.to_string(),
                document,
                schema: self.schema_body().clone(),
            }),
        }
    }

    /// Check without taking ownership; lookup errors still propagate
    fn is_valid(&self, document: &Value, schema_path: &str) -> Result<bool> {
        Ok(self.validator(schema_path)?.check(document).is_ok())
    }
}

/// A schema bound to a shared validator cache
#[derive(Clone)]
pub struct ValidatingSchema {
    schema: Arc<Schema>,
    cache: Arc<ValidatorCache>,
}

impl ValidatingSchema {
    pub fn new(schema: impl Into<Arc<Schema>>, cache: Arc<ValidatorCache>) -> Self {
        Self {
            schema: schema.into(),
            cache,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn name(&self) -> Option<&str> {
        self.schema.name.as_deref()
    }

    pub fn hash(&self) -> &SchemaHash {
        self.schema.hash()
    }

    pub fn cache(&self) -> &Arc<ValidatorCache> {
        &self.cache
    }
}

impl std::fmt::Debug for ValidatingSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatingSchema")
            .field("name", &self.schema.name)
            .field("hash", &self.schema.hash().short())
            .finish()
    }
}

impl Validatable for ValidatingSchema {
    fn validator(&self, schema_path: &str) -> Result<Arc<dyn CompiledValidator>> {
        self.cache.get_or_compile(self.schema.as_ref(), schema_path)
    }

    fn schema_body(&self) -> &Value {
        self.schema.body()
    }
}
