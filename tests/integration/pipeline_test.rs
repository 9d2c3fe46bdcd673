//! End-to-end session tests: script in, tables out.

use duckpad::query::DbTarget;
use duckpad::session::{Session, StatementOutcome};
use serde_json::json;

use super::{arrow_export_available, duckdb_available};

#[tokio::test]
async fn test_script_against_persistent_database() {
    if !duckdb_available() || !arrow_export_available() {
        eprintln!("Skipping test: duckdb with Arrow export not available");
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("pipeline.db");
    let session = Session::new(DbTarget::parse(db_path.to_str().unwrap()));

    let script = "CREATE TABLE t (x INTEGER);\nINSERT INTO t VALUES (7);\nSELECT x FROM t;";
    let outcomes = session.run_script(script).await;

    assert_eq!(outcomes.len(), 3);
    assert!(matches!(outcomes[0], StatementOutcome::Effect { .. }));
    assert!(matches!(outcomes[1], StatementOutcome::Effect { .. }));
    match &outcomes[2] {
        StatementOutcome::Table { table, .. } => {
            assert_eq!(table.columns, vec!["x"]);
            assert_eq!(table.row_count, 1);
            assert_eq!(table.rows[0]["x"], json!(7));
        }
        other => panic!("Expected Table outcome, got {other:?}"),
    }

    session.dispose();
    assert!(db_path.exists(), "persistent database file must remain");
}

#[tokio::test]
async fn test_semicolon_in_string_survives_pipeline() {
    if !duckdb_available() || !arrow_export_available() {
        eprintln!("Skipping test: duckdb with Arrow export not available");
        return;
    }

    let session = Session::new(DbTarget::InMemory);
    let outcomes = session.run_script("SELECT 'a;b' AS s;").await;

    assert_eq!(outcomes.len(), 1);
    match &outcomes[0] {
        StatementOutcome::Table { table, .. } => {
            assert_eq!(table.rows[0]["s"], json!("a;b"));
        }
        other => panic!("Expected Table outcome, got {other:?}"),
    }

    session.dispose();
}

#[tokio::test]
async fn test_failure_does_not_stop_later_statements() {
    if !duckdb_available() || !arrow_export_available() {
        eprintln!("Skipping test: duckdb with Arrow export not available");
        return;
    }

    let session = Session::new(DbTarget::InMemory);
    let outcomes = session
        .run_script("SELECT * FROM missing_table;\nSELECT 2 AS n;")
        .await;

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes[0].is_failure());
    match &outcomes[1] {
        StatementOutcome::Table { table, .. } => {
            assert_eq!(table.rows[0]["n"], json!(2));
        }
        other => panic!("Expected Table outcome, got {other:?}"),
    }

    session.dispose();
}
