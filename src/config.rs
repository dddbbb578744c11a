//! Experiment configuration.
//!
//! Everything is optional; a config file only needs the keys it changes:
//!
//! ```yaml
//! log_dir: "results/run-07"
//! file_pattern: "log-{iter}-{id}.txt"
//! columns: [id, addr, uPdr, dPdr, pdr, aHopD, dc]
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;

use color_eyre::eyre::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::analysis::derived::{DerivedStat, DEFAULT_COLUMNS};
use crate::analysis::log_parser::DEFAULT_FILE_PATTERN;

/// Analysis configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding the per-node logs
    pub log_dir: PathBuf,
    /// Log naming convention with `{iter}` and `{id}` placeholders
    pub file_pattern: String,
    /// Derived columns to report, in order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("."),
            file_pattern: DEFAULT_FILE_PATTERN.to_string(),
            columns: None,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid file pattern: {0}")]
    InvalidPattern(String),
    #[error("Invalid column selection: {0}")]
    InvalidColumns(String),
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.file_pattern.is_empty() {
            return Err(ConfigError::InvalidPattern(
                "file_pattern cannot be empty".to_string(),
            ));
        }
        if !self.file_pattern.contains("{id}") {
            return Err(ConfigError::InvalidPattern(format!(
                "'{}' has no {{id}} placeholder",
                self.file_pattern
            )));
        }
        self.column_selection()?;
        Ok(())
    }

    /// The configured columns, or the default selection
    pub fn column_selection(&self) -> Result<Vec<DerivedStat>, ConfigError> {
        let Some(names) = &self.columns else {
            return Ok(DEFAULT_COLUMNS.to_vec());
        };
        if names.is_empty() {
            return Err(ConfigError::InvalidColumns(
                "columns cannot be empty".to_string(),
            ));
        }
        names
            .iter()
            .map(|name| {
                DerivedStat::from_str(name)
                    .map_err(|_| ConfigError::InvalidColumns(format!("unknown column '{}'", name)))
            })
            .collect()
    }
}

/// Load and validate configuration from a YAML file
pub fn load_config(config_path: &Path) -> Result<Config> {
    info!("Loading configuration from: {:?}", config_path);

    let content = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    let config: Config = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

    config.validate()?;
    Ok(config)
}
