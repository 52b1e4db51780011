//! Schema Factory
//!
//! Creates validating schema owners bound to one shared cache and fires the
//! warm-up trigger for every creation.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::cache::ValidatorCache;
use crate::config::ValidatorConfig;
use crate::error::Result;
use crate::schema::{Schema, SchemaSource};
use crate::validate::ValidatingSchema;
use crate::warmup::{scheduler_from_config, warm_up, WarmupScheduler};

/// Builds [`ValidatingSchema`]s that share a [`ValidatorCache`]
#[derive(Clone)]
pub struct SchemaFactory {
    cache: Arc<ValidatorCache>,
    scheduler: Arc<dyn WarmupScheduler>,
}

impl SchemaFactory {
    pub fn new(cache: Arc<ValidatorCache>, scheduler: Arc<dyn WarmupScheduler>) -> Self {
        Self { cache, scheduler }
    }

    /// Wire engine, cache and warm-up scheduler from configuration
    pub fn from_config(config: &ValidatorConfig) -> Result<Self> {
        let cache = Arc::new(ValidatorCache::from_config(config));
        let scheduler = scheduler_from_config(&config.warmup)?;
        Ok(Self::new(cache, scheduler))
    }

    pub fn cache(&self) -> &Arc<ValidatorCache> {
        &self.cache
    }

    /// Create a schema owner from a JSON body
    pub fn create(&self, body: Value) -> ValidatingSchema {
        self.register(Schema::new(body))
    }

    /// Create a named schema owner from a JSON body
    pub fn create_named(&self, name: impl Into<String>, body: Value) -> ValidatingSchema {
        self.register(Schema::named(name, body))
    }

    /// Bind an existing schema to the shared cache
    ///
    /// Schedules the root validator warm-up and returns immediately.
    pub fn register(&self, schema: Schema) -> ValidatingSchema {
        let schema = Arc::new(schema);
        debug!(
            schema_hash = schema.hash().short(),
            schema_name = schema.name.as_deref().unwrap_or(""),
            "Schema created, scheduling warm-up"
        );
        warm_up(self.scheduler.as_ref(), &self.cache, &schema);
        ValidatingSchema::new(schema, Arc::clone(&self.cache))
    }
}
