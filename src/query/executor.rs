//! Out-of-process statement execution.
//!
//! Each statement runs in a fresh engine subprocess against the session's
//! database target. Result-producing statements export their row set to a
//! uniquely named Arrow artifact in the temp directory; the executor owns
//! every artifact it creates until disposal. Execution never returns `Err`
//! to the caller; all failure modes are captured in the [`QueryResult`].

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Mutex;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::query::{is_result_producing, DbTarget};

/// Prefix for Arrow artifact files in the temp directory.
const ARTIFACT_PREFIX: &str = "duckpad_arrow_";

/// Engine binary resolved through PATH when no path is configured.
const DEFAULT_ENGINE_BINARY: &str = "duckdb";

/// Message attached to results whose statement was cancelled mid-flight.
const INTERRUPTED_MESSAGE: &str =
    "Statement interrupted; it may have partially executed and its outcome is unknown";

/// The structured outcome of executing one statement.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryResult {
    /// Whether the engine completed the statement successfully.
    pub success: bool,

    /// Path to the exported Arrow artifact, present only for
    /// result-producing statements whose artifact exists on disk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_path: Option<PathBuf>,

    /// Exported row count; `-1` means "succeeded, count unknown".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<i64>,

    /// Engine diagnostics when `success` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// True when the statement was cancelled before completion.
    pub interrupted: bool,

    /// End-to-end wall-clock time from invocation to process exit.
    pub execution_time_ms: u64,
}

impl QueryResult {
    fn failure(error: impl Into<String>, execution_time_ms: u64) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            execution_time_ms,
            ..Self::default()
        }
    }

    fn interrupted(execution_time_ms: u64) -> Self {
        Self {
            success: false,
            error: Some(INTERRUPTED_MESSAGE.to_string()),
            interrupted: true,
            execution_time_ms,
            ..Self::default()
        }
    }
}

/// Executes statements by spawning the engine binary.
///
/// The live-artifact set is the executor's only mutable state: paths are
/// registered before the subprocess starts so cleanup can occur even when
/// execution fails later. Artifacts handed back via `result_path` stay
/// registered until [`QueryExecutor::dispose`] runs or the caller removes
/// them, so long-lived sessions must dispose to bound disk usage.
pub struct QueryExecutor {
    engine_path: String,
    artifacts: Mutex<HashSet<PathBuf>>,
}

impl QueryExecutor {
    /// Creates an executor using the default engine binary from PATH.
    pub fn new() -> Self {
        Self::with_engine_path(DEFAULT_ENGINE_BINARY)
    }

    /// Creates an executor invoking the given engine binary.
    pub fn with_engine_path(path: impl Into<String>) -> Self {
        Self {
            engine_path: path.into(),
            artifacts: Mutex::new(HashSet::new()),
        }
    }

    /// Returns the engine binary this executor invokes.
    #[allow(dead_code)] // Kept for API completeness
    pub fn engine_path(&self) -> &str {
        &self.engine_path
    }

    /// Executes one statement to completion.
    pub async fn execute(&self, sql: &str, target: &DbTarget) -> QueryResult {
        self.execute_with_token(sql, target, &CancellationToken::new())
            .await
    }

    /// Executes one statement, honoring a cancellation token.
    ///
    /// The token is checked before spawning and awaited concurrently with
    /// process exit. On cancellation the subprocess is killed, the artifact
    /// cleaned up, and an interrupted result returned; the statement may
    /// have partially executed and is never retried.
    pub async fn execute_with_token(
        &self,
        sql: &str,
        target: &DbTarget,
        cancel: &CancellationToken,
    ) -> QueryResult {
        let started = Instant::now();

        let artifact = if is_result_producing(sql) {
            Some(self.register_artifact())
        } else {
            None
        };
        let script = match &artifact {
            Some(path) => build_export_script(sql, path),
            None => build_effect_script(sql),
        };

        if cancel.is_cancelled() {
            self.discard(&artifact);
            return QueryResult::interrupted(elapsed_ms(started));
        }

        debug!("Running statement against {}", target);

        let mut command = Command::new(&self.engine_path);
        command
            .arg(target.as_arg())
            .arg("-json")
            .arg("-c")
            .arg(&script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                self.discard(&artifact);
                return QueryResult::failure(
                    format!("Failed to launch engine '{}': {e}", self.engine_path),
                    elapsed_ms(started),
                );
            }
        };

        // Both pipes must drain while waiting; a full pipe buffer stalls
        // the child.
        let stdout_task = tokio::spawn(drain(child.stdout.take()));
        let stderr_task = tokio::spawn(drain(child.stderr.take()));

        let status = tokio::select! {
            status = child.wait() => status,
            _ = cancel.cancelled() => {
                let _ = child.start_kill();
                let _ = child.wait().await;
                stdout_task.abort();
                stderr_task.abort();
                self.discard(&artifact);
                warn!("Statement cancelled; outcome unknown");
                return QueryResult::interrupted(elapsed_ms(started));
            }
        };

        let stdout = stdout_task.await.unwrap_or_default();
        let stderr = stderr_task.await.unwrap_or_default();
        let execution_time_ms = elapsed_ms(started);

        let status = match status {
            Ok(status) => status,
            Err(e) => {
                self.discard(&artifact);
                return QueryResult::failure(
                    format!("Failed to await engine '{}': {e}", self.engine_path),
                    execution_time_ms,
                );
            }
        };

        if !status.success() {
            self.discard(&artifact);
            let message = if stderr.trim().is_empty() {
                "Unknown error occurred".to_string()
            } else {
                stderr.trim().to_string()
            };
            return QueryResult::failure(message, execution_time_ms);
        }

        match artifact {
            Some(path) => {
                // An unparsable report line degrades to "count unknown";
                // the export itself may still be valid.
                let row_count = parse_row_count(&stdout).unwrap_or(-1);
                let result_path = path.exists().then_some(path);
                QueryResult {
                    success: true,
                    result_path,
                    row_count: Some(row_count),
                    execution_time_ms,
                    ..QueryResult::default()
                }
            }
            None => QueryResult {
                success: true,
                execution_time_ms,
                ..QueryResult::default()
            },
        }
    }

    /// Removes one artifact from the live set and deletes it best-effort.
    ///
    /// Deleting an already-missing file is not an error.
    pub fn remove_artifact(&self, path: &Path) {
        if let Ok(mut artifacts) = self.artifacts.lock() {
            artifacts.remove(path);
        }
        if let Err(e) = std::fs::remove_file(path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove artifact {}: {e}", path.display());
            }
        }
    }

    /// Deletes every artifact in the live set and clears it.
    pub fn dispose(&self) {
        let drained: Vec<PathBuf> = match self.artifacts.lock() {
            Ok(mut artifacts) => artifacts.drain().collect(),
            Err(_) => return,
        };

        for path in drained {
            match std::fs::remove_file(&path) {
                Ok(()) => debug!("Removed artifact {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove artifact {}: {e}", path.display()),
            }
        }
    }

    /// Generates a collision-resistant artifact path and registers it.
    fn register_artifact(&self) -> PathBuf {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let suffix = Uuid::new_v4().simple().to_string();
        let file_name = format!("{ARTIFACT_PREFIX}{millis}_{}.arrow", &suffix[..8]);
        let path = std::env::temp_dir().join(file_name);

        if let Ok(mut artifacts) = self.artifacts.lock() {
            artifacts.insert(path.clone());
        }
        path
    }

    fn discard(&self, artifact: &Option<PathBuf>) {
        if let Some(path) = artifact {
            self.remove_artifact(path);
        }
    }

    #[cfg(test)]
    fn artifact_count(&self) -> usize {
        self.artifacts.lock().map(|a| a.len()).unwrap_or(0)
    }
}

impl Default for QueryExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for QueryExecutor {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Builds the engine script for a result-producing statement: load the
/// Arrow export capability, copy the row set to the artifact, then report
/// the exported row count as the final output line.
fn build_export_script(sql: &str, artifact: &Path) -> String {
    format!(
        "INSTALL arrow FROM community;\n\
         LOAD arrow;\n\
         COPY ({sql}) TO '{path}' (FORMAT ARROWS);\n\
         SELECT count(*) AS row_count FROM read_arrow('{path}');",
        path = artifact.display()
    )
}

/// Builds the engine script for an effect-only statement: run it verbatim,
/// then report a zero row count.
fn build_effect_script(sql: &str) -> String {
    format!("{sql};\nSELECT 0 AS row_count;")
}

/// Parses the row count from the last non-blank line of engine output.
///
/// The engine emits one JSON value per line; the report decodes to either
/// an array of one object or a bare object carrying `row_count`.
fn parse_row_count(stdout: &str) -> Option<i64> {
    let line = stdout.lines().rev().find(|l| !l.trim().is_empty())?;
    let value: serde_json::Value = serde_json::from_str(line.trim()).ok()?;
    let object = match value {
        serde_json::Value::Array(items) => items.into_iter().next()?,
        other => other,
    };
    object.get("row_count")?.as_i64()
}

async fn drain<R>(pipe: Option<R>) -> String
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut text = String::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_string(&mut text).await;
    }
    text
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
