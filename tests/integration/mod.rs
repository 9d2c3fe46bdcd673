//! Shared helpers for integration tests.

mod executor_test;
mod pipeline_test;

use std::process::Command;

/// Returns true if a duckdb binary is runnable from PATH.
pub fn duckdb_available() -> bool {
    Command::new("duckdb")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Returns true if the engine can load its Arrow export extension.
///
/// Installing the community extension may need network access on first use,
/// so result-exporting tests probe for it instead of assuming it.
pub fn arrow_export_available() -> bool {
    Command::new("duckdb")
        .arg(":memory:")
        .arg("-json")
        .arg("-c")
        .arg("INSTALL arrow FROM community;\nLOAD arrow;\nSELECT 1 AS ok;")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
