//! Schema Validator CLI
//!
//! Validates JSON documents against a schema (or one of its sub-paths)
//! through the shared validator cache.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use schema_validator_cache::{Schema, SchemaFactory, Validatable, ValidateError, ValidatorConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-validator")]
#[command(about = "Validate JSON documents against cached schema validators")]
struct Cli {
    /// Config file (defaults to validators.toml lookup)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate documents against a schema
    Validate {
        /// Schema file (JSON)
        #[arg(short, long)]
        schema: PathBuf,
        /// Dotted sub-path into the schema (empty for the root)
        #[arg(short, long, default_value = "")]
        path: String,
        /// Document files (JSON)
        #[arg(required = true)]
        documents: Vec<PathBuf>,
    },

    /// Print the effective configuration
    Config,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    }
}

/// Returns whether every document was accepted
fn run(cli: Cli) -> Result<bool> {
    let config = ValidatorConfig::load_from(cli.config.as_deref())
        .context("failed to load configuration")?;

    match cli.command {
        Commands::Validate { schema, path, documents } => {
            let factory = SchemaFactory::from_config(&config)?;
            let schema = Schema::from_file(&schema)
                .with_context(|| format!("failed to load schema {:?}", schema))?;
            let owner = factory.register(schema);

            let mut all_valid = true;
            for doc_path in &documents {
                let text = std::fs::read_to_string(doc_path)
                    .with_context(|| format!("failed to read {:?}", doc_path))?;
                let document: serde_json::Value = serde_json::from_str(&text)
                    .with_context(|| format!("{:?} is not valid JSON", doc_path))?;

                match owner.validate(document, &path) {
                    Ok(_) => println!("✅ {} - valid", doc_path.display()),
                    Err(ValidateError::ValidationFailed { violations, .. }) => {
                        all_valid = false;
                        println!("❌ {} - {} violation(s)", doc_path.display(), violations.len());
                        for violation in &violations {
                            println!("   └─ {}", violation);
                        }
                    }
                    Err(e) => return Err(e.into()),
                }
            }

            let stats = factory.cache().stats();
            tracing::debug!(
                hits = stats.hits,
                misses = stats.misses,
                compilations = stats.compilations,
                "Validator cache stats"
            );
            Ok(all_valid)
        }

        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(true)
        }
    }
}
