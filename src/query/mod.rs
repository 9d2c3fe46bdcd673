//! Query execution for duckpad.
//!
//! This module isolates statement classification and out-of-process
//! execution against the engine from the rest of the application.

mod classify;
mod executor;

pub use classify::is_result_producing;
pub use executor::{QueryExecutor, QueryResult};

use std::fmt;
use std::path::PathBuf;

/// A database target for statement execution.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DbTarget {
    /// Transient in-memory database, discarded when the engine exits.
    #[default]
    InMemory,
    /// Persistent database file.
    File(PathBuf),
}

impl DbTarget {
    /// Engine sentinel naming the in-memory target.
    pub const IN_MEMORY_SENTINEL: &'static str = ":memory:";

    /// Parses a target from its command-line form.
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed == Self::IN_MEMORY_SENTINEL {
            Self::InMemory
        } else {
            Self::File(PathBuf::from(trimmed))
        }
    }

    /// Returns the argument form passed to the engine binary.
    pub fn as_arg(&self) -> String {
        match self {
            Self::InMemory => Self::IN_MEMORY_SENTINEL.to_string(),
            Self::File(path) => path.display().to_string(),
        }
    }

    /// Returns true for the transient in-memory target.
    #[allow(dead_code)] // Kept for API completeness
    pub fn is_in_memory(&self) -> bool {
        matches!(self, Self::InMemory)
    }
}

impl fmt::Display for DbTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_arg())
    }
}
