//! Configuration management for duckpad.
//!
//! Handles loading configuration from TOML files and environment variables,
//! covering the engine binary and default database target.

use crate::error::{DuckpadError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for duckpad.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Engine invocation settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Defaults applied when CLI arguments are absent.
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// Engine invocation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Engine binary name or path, resolved through PATH when bare.
    #[serde(default = "default_binary")]
    pub binary: String,
}

fn default_binary() -> String {
    "duckdb".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
        }
    }
}

/// Defaults applied when CLI arguments are absent.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    /// Database target used when --db is not given.
    pub database: Option<String>,
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("duckpad")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    ///
    /// A missing file yields the default configuration.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| DuckpadError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            DuckpadError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Applies environment variable overrides (DUCKPAD_ENGINE).
    pub fn apply_env_overrides(&mut self) {
        if let Ok(binary) = std::env::var("DUCKPAD_ENGINE") {
            if !binary.is_empty() {
                self.engine.binary = binary;
            }
        }
    }
}
