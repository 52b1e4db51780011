//! Schema types and sub-path resolution

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

use crate::checksum::SchemaHash;
use crate::error::{Result, ValidateError};

/// What the validator cache needs to know about a schema
///
/// Implementors must be immutable once hashed: the same hash must always
/// resolve every sub-path to the same fragment.
pub trait SchemaSource {
    /// Stable content hash, used as the first-level cache key
    fn hash(&self) -> &SchemaHash;

    /// The full root schema body
    fn body(&self) -> &Value;

    /// Resolve a sub-path into a schema fragment; `""` is the root
    fn fragment(&self, schema_path: &str) -> Option<&Value>;
}

/// A single JSON schema definition
#[derive(Debug, Clone, Serialize)]
pub struct Schema {
    /// Optional human-readable name (e.g., a collection name)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The schema body
    content: Value,
    /// SHA256 of the content, computed once at construction
    hash: SchemaHash,
}

impl Schema {
    /// Create a new schema
    pub fn new(content: Value) -> Self {
        let hash = SchemaHash::from_json(&content);
        Self {
            name: None,
            content,
            hash,
        }
    }

    /// Create a new schema with a name
    pub fn named(name: impl Into<String>, content: Value) -> Self {
        let mut schema = Self::new(content);
        schema.name = Some(name.into());
        schema
    }

    /// Load a schema body from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let mut schema: Schema = text.parse()?;
        schema.name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.trim_end_matches(".schema").to_string());
        Ok(schema)
    }

    /// Get the schema body
    pub fn content(&self) -> &Value {
        &self.content
    }
}

impl FromStr for Schema {
    type Err = ValidateError;

    fn from_str(s: &str) -> Result<Self> {
        let content: Value = serde_json::from_str(s)?;
        Ok(Self::new(content))
    }
}

impl SchemaSource for Schema {
    fn hash(&self) -> &SchemaHash {
        &self.hash
    }

    fn body(&self) -> &Value {
        &self.content
    }

    fn fragment(&self, schema_path: &str) -> Option<&Value> {
        resolve_object_path(&self.content, schema_path)
    }
}

/// Walk a dotted object path through nested `properties`
///
/// `"a.b"` resolves to `properties.a.properties.b`. Empty segments never
/// resolve.
pub fn resolve_object_path<'a>(root: &'a Value, schema_path: &str) -> Option<&'a Value> {
    if schema_path.is_empty() {
        return Some(root);
    }
    schema_path.split('.').try_fold(root, |node, segment| {
        if segment.is_empty() {
            return None;
        }
        node.get("properties")?.get(segment)
    })
}
