//! Schema Validator Cache
//!
//! Compiles JSON Schema validators lazily, once per schema content hash and
//! sub-path, and shares them across every owner of an identical schema.
//!
//! ## Features
//!
//! - **Content-Keyed Cache**: Validators are keyed by SHA256 of the schema body
//! - **Compile Once**: Each `(hash, sub-path)` pair compiles at most once, even under contention
//! - **Sub-Path Validation**: Validate values against nested `properties` fragments
//! - **Background Warm-Up**: Root validators pre-compile off the caller's path
//!
//! ## Architecture
//!
//! ```text
//! SchemaFactory ──create──► ValidatingSchema ──validate──► ValidatorCache ──compile──► ValidationEngine
//!       │                                                     ▲
//!       └──warm_up──► WarmupScheduler ─────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use schema_validator_cache::{SchemaFactory, Validatable, ValidatorConfig};
//! use serde_json::json;
//!
//! let factory = SchemaFactory::from_config(&ValidatorConfig::default()).unwrap();
//! let people = factory.create_named("people", json!({
//!     "type": "object",
//!     "properties": { "age": { "type": "number" } }
//! }));
//!
//! let doc = people.validate(json!({"age": 5}), "").unwrap();
//! let age = people.validate(json!(5), "age").unwrap();
//! ```

pub mod cache;
pub mod checksum;
pub mod config;
pub mod engine;
pub mod error;
pub mod factory;
pub mod schema;
pub mod validate;
pub mod warmup;

pub use cache::{CacheStats, CachedValidator, ValidatorCache};
pub use checksum::SchemaHash;
pub use config::{ValidatorConfig, WarmupMode};
pub use engine::{CompiledValidator, JsonSchemaEngine, SchemaDraft, ValidationEngine, Violation};
pub use error::{Result, ValidateError};
pub use factory::SchemaFactory;
pub use schema::{Schema, SchemaSource};
pub use validate::{Validatable, ValidatingSchema};
pub use warmup::{DeferredScheduler, IdleWorker, NoopScheduler, WarmupScheduler};
