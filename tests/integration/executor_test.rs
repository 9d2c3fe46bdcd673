//! Executor integration tests against a real engine.
//!
//! Covers statement execution, the export/read round trip, and artifact
//! lifecycle.

use duckpad::query::{DbTarget, QueryExecutor};
use duckpad::results::read_result_file;
use serde_json::json;

use super::{arrow_export_available, duckdb_available};

#[tokio::test]
async fn test_effect_only_statement_in_memory() {
    if !duckdb_available() {
        eprintln!("Skipping test: duckdb not found in PATH");
        return;
    }

    let executor = QueryExecutor::new();
    let result = executor
        .execute("CREATE TABLE t (x INT)", &DbTarget::InMemory)
        .await;

    assert!(result.success, "error: {:?}", result.error);
    assert!(result.result_path.is_none());
    assert!(result.row_count.is_none());
    assert!(result.error.is_none());
}

#[tokio::test]
async fn test_select_exports_and_reads_back() {
    if !duckdb_available() || !arrow_export_available() {
        eprintln!("Skipping test: duckdb with Arrow export not available");
        return;
    }

    let executor = QueryExecutor::new();
    let result = executor.execute("SELECT 1 as n", &DbTarget::InMemory).await;

    assert!(result.success, "error: {:?}", result.error);
    assert_eq!(result.row_count, Some(1));
    let path = result.result_path.expect("expected an artifact path");

    let table = read_result_file(&path).unwrap();
    assert_eq!(table.columns, vec!["n"]);
    assert_eq!(table.row_count, 1);
    assert_eq!(table.rows[0]["n"], json!(1));

    executor.dispose();
    assert!(!path.exists(), "dispose must delete the artifact");
}

#[tokio::test]
async fn test_missing_table_reports_engine_error() {
    if !duckdb_available() || !arrow_export_available() {
        eprintln!("Skipping test: duckdb with Arrow export not available");
        return;
    }

    let executor = QueryExecutor::new();
    let result = executor
        .execute("SELECT * FROM missing_table", &DbTarget::InMemory)
        .await;

    assert!(!result.success);
    assert!(result.result_path.is_none());
    let error = result.error.expect("expected engine diagnostics");
    assert!(error.contains("missing_table"), "stderr was: {error}");
}

#[tokio::test]
async fn test_null_cells_round_trip_to_null() {
    if !duckdb_available() || !arrow_export_available() {
        eprintln!("Skipping test: duckdb with Arrow export not available");
        return;
    }

    let executor = QueryExecutor::new();
    let result = executor
        .execute("SELECT NULL AS a, 42 AS b", &DbTarget::InMemory)
        .await;

    assert!(result.success, "error: {:?}", result.error);
    let path = result.result_path.expect("expected an artifact path");

    let table = read_result_file(&path).unwrap();
    assert_eq!(table.columns, vec!["a", "b"]);
    assert_eq!(table.rows[0]["a"], serde_json::Value::Null);
    assert_eq!(table.rows[0]["b"], json!(42));

    executor.dispose();
}

#[tokio::test]
async fn test_execution_time_is_measured() {
    if !duckdb_available() {
        eprintln!("Skipping test: duckdb not found in PATH");
        return;
    }

    let executor = QueryExecutor::new();
    let result = executor
        .execute("CREATE TABLE timed (x INT)", &DbTarget::InMemory)
        .await;

    assert!(result.success, "error: {:?}", result.error);
    // Wall-clock from invocation to exit; zero is implausible but allowed.
    assert!(result.execution_time_ms < 60_000);
}
