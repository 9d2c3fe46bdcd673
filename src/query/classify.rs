//! Statement classification by leading keyword.
//!
//! A statement is result-producing when it opens with a keyword that yields
//! a row set; only those statements are exported through an Arrow artifact.
//! Everything else (DDL and DML) runs for its effect alone.

/// Keywords that open a result-producing statement.
const RESULT_KEYWORDS: [&str; 4] = ["SELECT", "WITH", "TABLE", "VALUES"];

/// Returns true if the statement yields a row set to materialize.
pub fn is_result_producing(sql: &str) -> bool {
    let normalized = sql.trim().to_uppercase();
    RESULT_KEYWORDS
        .iter()
        .any(|keyword| normalized.starts_with(keyword))
}
