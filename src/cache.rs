//! Validator Cache
//!
//! Two-level memoization of compiled validators:
//!
//! ```text
//! SchemaHash ──► sub-path ──► compiled validator
//!   "9f3c…"        ""            Arc<dyn CompiledValidator>
//!                  "age"         Arc<dyn CompiledValidator>
//!   "41ab…"        ""            Arc<dyn CompiledValidator>
//! ```
//!
//! Keys are content hashes, so structurally distinct schema owners with
//! identical bodies share validators. Entries are never evicted.
//!
//! ## Thread Safety
//!
//! The map sits behind an `RwLock`; each `(hash, path)` pair owns a
//! `OnceCell` slot. The write lock is held only long enough to insert the
//! slot, and compilation runs inside the slot's initializer, so concurrent
//! callers for the same pair wait for a single compile while callers for
//! other pairs proceed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::checksum::SchemaHash;
use crate::config::ValidatorConfig;
use crate::engine::{CompiledValidator, JsonSchemaEngine, ValidationEngine};
use crate::error::{Result, ValidateError};
use crate::schema::SchemaSource;

/// A compiled validator plus bookkeeping
#[derive(Clone)]
pub struct CachedValidator {
    pub validator: Arc<dyn CompiledValidator>,
    pub schema_path: String,
    pub compiled_at: DateTime<Utc>,
}

impl std::fmt::Debug for CachedValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedValidator")
            .field("schema_path", &self.schema_path)
            .field("compiled_at", &self.compiled_at)
            .finish_non_exhaustive()
    }
}

type Slot = Arc<OnceCell<CachedValidator>>;

/// Counters describing cache behaviour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub compilations: u64,
    pub compile_failures: u64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    compilations: AtomicU64,
    compile_failures: AtomicU64,
}

/// Shared cache of compiled validators keyed by schema hash and sub-path
pub struct ValidatorCache {
    engine: Arc<dyn ValidationEngine>,
    entries: RwLock<HashMap<SchemaHash, HashMap<String, Slot>>>,
    counters: Counters,
}

impl Default for ValidatorCache {
    fn default() -> Self {
        Self::new(Arc::new(JsonSchemaEngine::default()))
    }
}

impl ValidatorCache {
    /// Create an empty cache compiling with `engine`
    pub fn new(engine: Arc<dyn ValidationEngine>) -> Self {
        Self {
            engine,
            entries: RwLock::new(HashMap::new()),
            counters: Counters::default(),
        }
    }

    /// Create an empty cache with a `jsonschema` engine built from config
    pub fn from_config(config: &ValidatorConfig) -> Self {
        Self::new(Arc::new(JsonSchemaEngine::from_config(&config.engine)))
    }

    /// Get the compiled validator for `schema_path` of `source`, compiling
    /// it on first request
    ///
    /// Returns `InvalidSchemaPath` without touching the cache when the path
    /// does not resolve.
    pub fn get_or_compile<S>(&self, source: &S, schema_path: &str) -> Result<Arc<dyn CompiledValidator>>
    where
        S: SchemaSource + ?Sized,
    {
        let hash = source.hash();

        if let Some(cached) = self.lookup(hash, schema_path) {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            debug!(
                schema_hash = hash.short(),
                schema_path = schema_path,
                "Validator cache hit"
            );
            return Ok(cached.validator);
        }
        self.counters.misses.fetch_add(1, Ordering::Relaxed);

        let fragment = source
            .fragment(schema_path)
            .ok_or_else(|| ValidateError::InvalidSchemaPath {
                schema_path: schema_path.to_string(),
            })?;

        let slot = self.slot(hash, schema_path);
        let cached = slot.get_or_try_init(|| {
            let validator = self.engine.compile(fragment, schema_path).map_err(|e| {
                self.counters.compile_failures.fetch_add(1, Ordering::Relaxed);
                warn!(
                    schema_hash = hash.short(),
                    schema_path = schema_path,
                    error = %e,
                    "Failed to compile schema fragment"
                );
                e
            })?;
            self.counters.compilations.fetch_add(1, Ordering::Relaxed);
            info!(
                schema_hash = hash.short(),
                schema_path = schema_path,
                "Validator compiled and cached"
            );
            Ok::<_, ValidateError>(CachedValidator {
                validator,
                schema_path: schema_path.to_string(),
                compiled_at: Utc::now(),
            })
        })?;

        Ok(Arc::clone(&cached.validator))
    }

    /// Get a compiled entry without compiling
    pub fn get(&self, hash: &SchemaHash, schema_path: &str) -> Option<CachedValidator> {
        self.lookup(hash, schema_path)
    }

    /// Whether a compiled validator exists for the pair
    pub fn contains(&self, hash: &SchemaHash, schema_path: &str) -> bool {
        self.lookup(hash, schema_path).is_some()
    }

    /// Number of compiled validators across all schemas
    pub fn len(&self) -> usize {
        let entries = self.read_entries();
        entries
            .values()
            .flat_map(|paths| paths.values())
            .filter(|slot| slot.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of distinct schema hashes with at least one compiled validator
    pub fn schema_count(&self) -> usize {
        let entries = self.read_entries();
        entries
            .values()
            .filter(|paths| paths.values().any(|slot| slot.get().is_some()))
            .count()
    }

    /// Compiled sub-paths for a schema hash, sorted
    pub fn schema_paths(&self, hash: &SchemaHash) -> Vec<String> {
        let entries = self.read_entries();
        let mut paths: Vec<String> = entries
            .get(hash)
            .map(|paths| {
                paths
                    .iter()
                    .filter(|(_, slot)| slot.get().is_some())
                    .map(|(path, _)| path.clone())
                    .collect()
            })
            .unwrap_or_default();
        paths.sort();
        paths
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            compilations: self.counters.compilations.load(Ordering::Relaxed),
            compile_failures: self.counters.compile_failures.load(Ordering::Relaxed),
        }
    }

    fn lookup(&self, hash: &SchemaHash, schema_path: &str) -> Option<CachedValidator> {
        let entries = self.read_entries();
        entries
            .get(hash)
            .and_then(|paths| paths.get(schema_path))
            .and_then(|slot| slot.get().cloned())
    }

    fn slot(&self, hash: &SchemaHash, schema_path: &str) -> Slot {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let paths = entries.entry(hash.clone()).or_default();
        Arc::clone(paths.entry(schema_path.to_string()).or_default())
    }

    fn read_entries(&self) -> std::sync::RwLockReadGuard<'_, HashMap<SchemaHash, HashMap<String, Slot>>> {
        // Slots are only ever inserted, so a poisoned map is still consistent.
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use serde_json::json;

    fn person() -> Schema {
        Schema::new(json!({
            "type": "object",
            "required": ["age"],
            "properties": {
                "age": { "type": "number" }
            }
        }))
    }

    #[test]
    fn test_compile_once_then_hit() {
        let cache = ValidatorCache::default();
        let schema = person();

        let first = cache.get_or_compile(&schema, "").unwrap();
        let second = cache.get_or_compile(&schema, "").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        let stats = cache.stats();
        assert_eq!(stats.compilations, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_equal_hash_shares_validator() {
        let cache = ValidatorCache::default();
        let a = person();
        let b = Schema::named("other-collection", a.content().clone());

        let va = cache.get_or_compile(&a, "age").unwrap();
        let vb = cache.get_or_compile(&b, "age").unwrap();

        assert!(Arc::ptr_eq(&va, &vb));
        assert_eq!(cache.stats().compilations, 1);
        assert_eq!(cache.schema_count(), 1);
    }

    #[test]
    fn test_sub_paths_are_separate_entries() {
        let cache = ValidatorCache::default();
        let schema = person();

        cache.get_or_compile(&schema, "").unwrap();
        cache.get_or_compile(&schema, "age").unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.schema_paths(schema.hash()), vec!["".to_string(), "age".to_string()]);
        assert_eq!(cache.get(schema.hash(), "age").unwrap().schema_path, "age");
    }

    #[test]
    fn test_invalid_path_creates_no_entry() {
        let cache = ValidatorCache::default();
        let schema = person();

        let err = cache.get_or_compile(&schema, "nonexistent.path").err().unwrap();
        match err {
            ValidateError::InvalidSchemaPath { schema_path } => {
                assert_eq!(schema_path, "nonexistent.path");
            }
            other => panic!("Expected InvalidSchemaPath, got {:?}", other),
        }
        assert!(!cache.contains(schema.hash(), "nonexistent.path"));
        assert!(cache.is_empty());
        assert_eq!(cache.stats().compilations, 0);
    }

    #[test]
    fn test_compile_failure_is_retried() {
        let cache = ValidatorCache::default();
        let broken = Schema::new(json!({"type": 42}));

        assert!(cache.get_or_compile(&broken, "").is_err());
        assert!(cache.get_or_compile(&broken, "").is_err());

        let stats = cache.stats();
        assert_eq!(stats.compile_failures, 2);
        assert_eq!(stats.compilations, 0);
        assert!(!cache.contains(broken.hash(), ""));
    }
}
