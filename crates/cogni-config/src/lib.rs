//! # cogni-config
//!
//! Process-wide configuration: active branch, active namespace, the SQL
//! engine connection, the vector index location, and the fixed embedding
//! dimension. Loaded from a layered stack (defaults, an optional TOML
//! file, then `COGNI_*` environment variables), the way the rest of this
//! codebase's crates load configuration.

mod error;
pub mod sql;

pub use error::{ConfigError, Result};
pub use sql::SqlConnectionConfig;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const EMBEDDING_DIMENSION: usize = 384;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Config {
    #[serde(default = "default_branch")]
    pub current_branch: String,
    #[serde(default = "default_namespace")]
    pub current_namespace: String,
    pub sql: SqlConnectionConfig,
    /// Filesystem path or URI for the vector index (LanceDB table
    /// location).
    pub vector_index_path: String,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default = "default_health_check_interval_secs")]
    pub health_check_interval_secs: u64,
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_namespace() -> String {
    cogni_core_namespace_default().to_string()
}

/// Kept as a free function (rather than depending on `cogni-core`) to
/// avoid a circular workspace dependency; config is the foundation layer.
fn cogni_core_namespace_default() -> &'static str {
    "legacy"
}

fn default_health_check_interval_secs() -> u64 {
    60
}

/// Loads configuration from (in increasing precedence order): built-in
/// defaults, an optional TOML file at `path`, then `COGNI_*` environment
/// variables.
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load(path: Option<&std::path::Path>) -> Result<Config> {
        let mut builder = config::Config::builder().add_source(config::Environment::with_prefix("COGNI").separator("__"));

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let raw = builder.build()?;
        let config: Config = raw.try_deserialize()?;
        Ok(config)
    }

    pub fn load_from_str(content: &str) -> Result<Config> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}
