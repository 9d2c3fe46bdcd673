//! Command-line argument parsing for duckpad.
//!
//! Uses clap to parse CLI arguments and resolve the script text, database
//! target, and output format.

use crate::config::Config;
use crate::error::{DuckpadError, Result};
use crate::output::RenderFormat;
use crate::query::DbTarget;
use clap::Parser;
use std::path::PathBuf;

/// A lightweight DuckDB SQL script runner.
#[derive(Parser, Debug)]
#[command(name = "duckpad")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the SQL script to run ("-" reads from stdin)
    #[arg(value_name = "SCRIPT")]
    pub script: Option<PathBuf>,

    /// Run a SQL string instead of a script file
    #[arg(short = 'c', long, value_name = "SQL", conflicts_with = "script")]
    pub command: Option<String>,

    /// Database target: a file path, or :memory: for a transient database
    #[arg(long, value_name = "TARGET")]
    pub db: Option<String>,

    /// Engine binary to invoke (overrides config)
    #[arg(long, value_name = "PATH")]
    pub engine: Option<String>,

    /// Output format for results
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub output: String,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write logs to a file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Parses the output format from the --output argument.
    pub fn parse_output_format(&self) -> std::result::Result<RenderFormat, String> {
        self.output.parse()
    }

    /// Resolves the database target from --db, then the config default,
    /// then the in-memory sentinel.
    pub fn db_target(&self, config_default: Option<&str>) -> DbTarget {
        match self.db.as_deref().or(config_default) {
            Some(target) => DbTarget::parse(target),
            None => DbTarget::InMemory,
        }
    }

    /// Resolves the script text from -c, a script file, or stdin.
    pub fn script_text(&self) -> Result<String> {
        if let Some(sql) = &self.command {
            return Ok(sql.clone());
        }

        match &self.script {
            Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
                .map_err(|e| {
                    DuckpadError::config(format!("Failed to read script {}: {e}", path.display()))
                }),
            _ => std::io::read_to_string(std::io::stdin())
                .map_err(|e| DuckpadError::config(format!("Failed to read stdin: {e}"))),
        }
    }
}
