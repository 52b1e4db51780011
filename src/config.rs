//! Configuration for the validator cache
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (validators.toml)
//! - Environment variables (SCHEMA_VALIDATOR__*)
//!
//! ## Example config file (validators.toml):
//! ```toml
//! [engine]
//! draft = "draft7"
//!
//! [warmup]
//! mode = "background"
//! thread_name = "schema-warmup"
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::engine::SchemaDraft;
use crate::error::Result;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Validation engine settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Warm-up settings
    #[serde(default)]
    pub warmup: WarmupConfig,
}

/// Validation engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// JSON Schema draft used to compile every fragment
    #[serde(default)]
    pub draft: SchemaDraft,
}

/// How root validators are pre-compiled when a schema is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WarmupMode {
    /// Compile on a background worker thread
    #[default]
    Background,
    /// Queue until the host drains the queue at an idle point
    Deferred,
    /// No warm-up; validators compile on first use
    Disabled,
}

/// Warm-up configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarmupConfig {
    #[serde(default)]
    pub mode: WarmupMode,

    /// Name of the background worker thread
    #[serde(default = "default_thread_name")]
    pub thread_name: String,
}

fn default_thread_name() -> String {
    "schema-warmup".to_string()
}

impl Default for WarmupConfig {
    fn default() -> Self {
        Self {
            mode: WarmupMode::Background,
            thread_name: default_thread_name(),
        }
    }
}

impl ValidatorConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, optionally from a specific file
    pub fn load_from(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = [
            "validators.toml",
            ".validators.toml",
            "config/validators.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "schema-validator") {
            let xdg_config = config_dir.config_dir().join("validators.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("SCHEMA_VALIDATOR")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = self.to_toml()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Render as TOML
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidateError;

    #[test]
    fn test_default_config() {
        let config = ValidatorConfig::default();
        assert_eq!(config.engine.draft, SchemaDraft::Draft7);
        assert_eq!(config.warmup.mode, WarmupMode::Background);
        assert_eq!(config.warmup.thread_name, "schema-warmup");
    }

    #[test]
    fn test_serialize_config() {
        let toml_str = ValidatorConfig::default().to_toml().unwrap();
        assert!(toml_str.contains("[engine]"));
        assert!(toml_str.contains("[warmup]"));
        assert!(toml_str.contains("draft = \"draft7\""));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[engine]\ndraft = \"draft4\"\n\n[warmup]\nmode = \"deferred\"\n",
        )
        .unwrap();

        let config = ValidatorConfig::load_from(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.engine.draft, SchemaDraft::Draft4);
        assert_eq!(config.warmup.mode, WarmupMode::Deferred);
        assert_eq!(config.warmup.thread_name, "schema-warmup");
    }

    #[test]
    fn test_bad_config_value_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[warmup]\nmode = \"sometimes\"\n").unwrap();

        match ValidatorConfig::load_from(Some(path.to_str().unwrap())) {
            Err(ValidateError::Config(_)) => {}
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.toml");
        let mut config = ValidatorConfig::default();
        config.warmup.mode = WarmupMode::Disabled;
        config.save(path.to_str().unwrap()).unwrap();

        let loaded = ValidatorConfig::load_from(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(loaded.warmup.mode, WarmupMode::Disabled);
    }
}
