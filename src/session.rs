//! Script session management.
//!
//! A [`Session`] owns one database target and one executor, and runs whole
//! scripts through the pipeline: split, execute statement by statement in
//! order, read exported artifacts back. There is no process-global registry;
//! callers hold the session and dispose it explicitly.

use tracing::debug;

use crate::error::DuckpadError;
use crate::query::{DbTarget, QueryExecutor, QueryResult};
use crate::results::{read_result_file, ResultTable};
use crate::script::{split_statements, Statement};

/// The outcome of running one statement through the full pipeline.
///
/// Execution failure and result-read failure are distinct kinds so a caller
/// can tell "the statement failed" from "the statement succeeded but its
/// results could not be materialized".
#[derive(Debug)]
pub enum StatementOutcome {
    /// Result-producing statement with a materialized table.
    Table {
        statement: Statement,
        result: QueryResult,
        table: ResultTable,
    },
    /// Statement that completed without a result set.
    Effect {
        statement: Statement,
        result: QueryResult,
    },
    /// The engine reported failure (or the statement was interrupted).
    ExecutionFailed {
        statement: Statement,
        result: QueryResult,
    },
    /// Execution succeeded but the exported artifact could not be decoded.
    ResultUnreadable {
        statement: Statement,
        result: QueryResult,
        error: DuckpadError,
    },
}

impl StatementOutcome {
    /// Returns the statement this outcome belongs to.
    pub fn statement(&self) -> &Statement {
        match self {
            Self::Table { statement, .. }
            | Self::Effect { statement, .. }
            | Self::ExecutionFailed { statement, .. }
            | Self::ResultUnreadable { statement, .. } => statement,
        }
    }

    /// Returns true for outcomes a caller should treat as failures.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::ExecutionFailed { .. } | Self::ResultUnreadable { .. }
        )
    }
}

/// One script-execution session against a single database target.
pub struct Session {
    target: DbTarget,
    executor: QueryExecutor,
}

impl Session {
    /// Creates a session with a default executor.
    #[allow(dead_code)] // The binary configures its executor explicitly
    pub fn new(target: DbTarget) -> Self {
        Self::with_executor(target, QueryExecutor::new())
    }

    /// Creates a session with the given executor.
    pub fn with_executor(target: DbTarget, executor: QueryExecutor) -> Self {
        Self { target, executor }
    }

    /// Returns the session's database target.
    #[allow(dead_code)] // Kept for API completeness
    pub fn target(&self) -> &DbTarget {
        &self.target
    }

    /// Splits a script and runs every statement in order.
    ///
    /// Statements are serialized against the target: each subprocess runs
    /// to completion before the next one starts, so effects commit in
    /// script order.
    pub async fn run_script(&self, script: &str) -> Vec<StatementOutcome> {
        let statements = split_statements(script);
        debug!(
            "Running {} statements against {}",
            statements.len(),
            self.target
        );

        let mut outcomes = Vec::with_capacity(statements.len());
        for statement in statements {
            outcomes.push(self.run_statement(statement).await);
        }
        outcomes
    }

    /// Runs one statement and, when it exported a row set, reads it back.
    pub async fn run_statement(&self, statement: Statement) -> StatementOutcome {
        let result = self.executor.execute(&statement.text, &self.target).await;

        if !result.success {
            return StatementOutcome::ExecutionFailed { statement, result };
        }

        match result.result_path.clone() {
            Some(path) => match read_result_file(&path) {
                Ok(table) => StatementOutcome::Table {
                    statement,
                    result,
                    table,
                },
                Err(error) => StatementOutcome::ResultUnreadable {
                    statement,
                    result,
                    error,
                },
            },
            None => StatementOutcome::Effect { statement, result },
        }
    }

    /// Deletes every live artifact this session's executor still owns.
    pub fn dispose(&self) {
        self.executor.dispose();
    }
}
