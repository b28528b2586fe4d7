// src/config.rs

//! Manages tool configuration: loading from TOML, defaults and validation.

use crate::core::storage::sqlite::{DEFAULT_FLAG_TABLE, validate_table_name};
use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// The file looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_PATH: &str = "json_data.toml";

/// A raw representation of the config file before validation.
#[derive(Deserialize)]
struct RawConfig {
    #[serde(default = "default_database")]
    database: String,
    #[serde(default = "default_flag_table")]
    flag_table: String,
    #[serde(default = "default_log_level")]
    log_level: String,
}

fn default_database() -> String {
    "instrument_data.sqlite3".to_string()
}
fn default_flag_table() -> String {
    DEFAULT_FLAG_TABLE.to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

/// The final, validated configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Path of the SQLite database holding instrument data.
    pub database: String,
    /// Table holding one row per CommentID with its JSON `Data`.
    pub flag_table: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            flag_table: default_flag_table(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Creates a new `Config` instance by reading and parsing a TOML file.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at '{path}'"))?;
        Self::from_toml(&contents).with_context(|| format!("Invalid config in '{path}'"))
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let raw_config: RawConfig =
            toml::from_str(contents).context("Failed to parse TOML configuration")?;

        let config = Config {
            database: raw_config.database,
            flag_table: raw_config.flag_table,
            log_level: raw_config.log_level,
        };

        config.validate()?;
        Ok(config)
    }

    /// Loads the configuration for a run.
    ///
    /// An explicit path must exist. Without one, `json_data.toml` in the working
    /// directory is used if present, otherwise the defaults.
    pub fn load(explicit_path: Option<&str>) -> Result<Self> {
        match explicit_path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_PATH).is_file() => {
                Self::from_file(DEFAULT_CONFIG_PATH)
            }
            None => {
                debug!("no configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Validates the resolved configuration to ensure logical consistency.
    pub fn validate(&self) -> Result<()> {
        if self.database.trim().is_empty() {
            return Err(anyhow!("database cannot be empty"));
        }
        validate_table_name(&self.flag_table)
            .map_err(|e| anyhow!("flag_table is not usable: {e}"))?;
        Ok(())
    }
}
