//! Configuration loading and management.
//!
//! Configuration is loaded from multiple sources with the following precedence
//! (highest to lowest):
//!
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. `.sql-converter.toml` in current directory
//! 4. `~/.config/sql-dialect-converter/config.toml`
//! 5. Default values
//!
//! # Configuration File Format
//!
//! ```toml
//! [conversion]
//! source = "teradata"
//! target = "db2"
//!
//! [batch]
//! workers = 4
//!
//! [rules]
//! disabled = ["schema-qualify-hint"]
//!
//! [rules.severity]
//! date-literal = "error"
//!
//! [connections.warehouse]
//! kind = "db2"
//! host = "localhost"
//! port = "50000"
//! database = "BLUDB"
//! username = "db2inst1"
//! password = "secret"
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `SQL_CONVERTER_SOURCE` | Default source dialect |
//! | `SQL_CONVERTER_TARGET` | Default target dialect |
//! | `SQL_CONVERTER_WORKERS` | Worker threads for batch conversion |

use std::{collections::HashMap, env, fs, path::PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::{
    dialect::Dialect,
    error::{AppResult, config_error},
    probe::ConnectionSpec
};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub conversion:  ConversionConfig,
    #[serde(default)]
    pub batch:       BatchConfig,
    #[serde(default)]
    pub rules:       RulesConfig,
    /// Named database connections for `probe`
    #[serde(default)]
    pub connections: IndexMap<String, ConnectionSpec>
}

/// Rules configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RulesConfig {
    /// Disabled rule IDs
    #[serde(default)]
    pub disabled: Vec<String>,
    /// Severity overrides (rule_id -> severity)
    #[serde(default)]
    pub severity: HashMap<String, String>
}

/// Default dialects when the command line does not name them
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConversionConfig {
    pub source: Option<Dialect>,
    pub target: Option<Dialect>
}

/// Batch conversion settings
#[derive(Debug, Clone, Deserialize, Default)]
pub struct BatchConfig {
    /// Worker threads; defaults to the number of CPUs
    pub workers: Option<usize>
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|e| config_error(format!("Invalid config file: {}", e)))
    }

    /// Load configuration from file and environment
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables
    /// 2. Config file in current directory (.sql-converter.toml)
    /// 3. Config file in home directory
    ///    (~/.config/sql-dialect-converter/config.toml)
    /// 4. Default values
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        // Try to load from home directory config
        if let Some(home) = env::var_os("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("sql-dialect-converter")
                .join("config.toml");

            if home_config.exists() {
                config = Self::read_file(&home_config)?;
            }
        }

        // Try to load from current directory config (overrides home config)
        let local_config = PathBuf::from(".sql-converter.toml");
        if local_config.exists() {
            config = Self::read_file(&local_config)?;
        }

        config.apply_env(|key| env::var(key).ok())?;
        Ok(config)
    }

    fn read_file(path: &PathBuf) -> AppResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| config_error(format!("Failed to read config file: {}", e)))?;
        Self::from_toml_str(&content)
    }

    /// Override settings from environment variables.
    ///
    /// `lookup` returns the value of a variable; tests pass a map instead of
    /// the process environment.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> AppResult<()> {
        if let Some(source) = lookup("SQL_CONVERTER_SOURCE") {
            self.conversion.source = Some(
                source
                    .parse()
                    .map_err(|e| config_error(format!("SQL_CONVERTER_SOURCE: {}", e)))?
            );
        }

        if let Some(target) = lookup("SQL_CONVERTER_TARGET") {
            self.conversion.target = Some(
                target
                    .parse()
                    .map_err(|e| config_error(format!("SQL_CONVERTER_TARGET: {}", e)))?
            );
        }

        if let Some(workers) = lookup("SQL_CONVERTER_WORKERS") {
            let workers = workers.trim().parse::<usize>().map_err(|_| {
                config_error(format!(
                    "SQL_CONVERTER_WORKERS must be a positive integer, got '{}'",
                    workers
                ))
            })?;
            self.batch.workers = Some(workers);
        }

        if self.batch.workers == Some(0) {
            return Err(config_error("batch.workers must be at least 1"));
        }

        Ok(())
    }
}
