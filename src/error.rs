//! Error types for duckpad.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for duckpad operations.
#[derive(Error, Debug)]
#[allow(dead_code)] // Not every variant is constructed by the binary
pub enum DuckpadError {
    /// Engine spawn errors (binary missing, not executable, etc.)
    #[error("Spawn error: {0}")]
    Spawn(String),

    /// Statement execution errors (engine exited non-zero, syntax errors, etc.)
    #[error("Execution error: {0}")]
    Execution(String),

    /// Result file decode errors (artifact missing, truncated, not Arrow IPC).
    #[error("Result read error: {0}")]
    ResultRead(String),

    /// Configuration errors (invalid config file, bad CLI arguments, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

#[allow(dead_code)] // Constructors mirror the variants
impl DuckpadError {
    /// Creates a spawn error with the given message.
    pub fn spawn(msg: impl Into<String>) -> Self {
        Self::Spawn(msg.into())
    }

    /// Creates an execution error with the given message.
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// Creates a result read error with the given message.
    pub fn result_read(msg: impl Into<String>) -> Self {
        Self::ResultRead(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Spawn(_) => "Spawn Error",
            Self::Execution(_) => "Execution Error",
            Self::ResultRead(_) => "Result Read Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using DuckpadError.
pub type Result<T> = std::result::Result<T, DuckpadError>;
