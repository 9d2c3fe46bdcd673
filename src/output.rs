//! Transport-agnostic rendering of statement outcomes.
//!
//! Converts pipeline outcomes into text tables or JSON lines for the CLI.
//! Rendering carries no pipeline logic; it only formats what the session
//! produced.

use serde_json::{json, Value as JsonValue};

use crate::results::ResultTable;
use crate::session::StatementOutcome;

/// Output format for rendered results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderFormat {
    /// Aligned text tables.
    #[default]
    Text,
    /// One JSON object per statement.
    Json,
}

impl std::str::FromStr for RenderFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {s}. Expected: text or json")),
        }
    }
}

/// Renders one statement outcome in the requested format.
pub fn render_outcome(outcome: &StatementOutcome, format: RenderFormat) -> String {
    match format {
        RenderFormat::Text => render_text(outcome),
        RenderFormat::Json => render_json(outcome).to_string(),
    }
}

fn render_text(outcome: &StatementOutcome) -> String {
    match outcome {
        StatementOutcome::Table { result, table, .. } => {
            format!(
                "{}\n({} row{}, {} ms)",
                format_table(table),
                table.row_count,
                if table.row_count == 1 { "" } else { "s" },
                result.execution_time_ms
            )
        }
        StatementOutcome::Effect { result, .. } => {
            format!("OK ({} ms)", result.execution_time_ms)
        }
        StatementOutcome::ExecutionFailed { result, .. } => {
            let message = result.error.as_deref().unwrap_or("unknown failure");
            if result.interrupted {
                format!("Interrupted: {message}")
            } else {
                format!("Execution Error: {message}")
            }
        }
        StatementOutcome::ResultUnreadable { error, .. } => {
            format!("{}: {error}", error.category())
        }
    }
}

fn render_json(outcome: &StatementOutcome) -> JsonValue {
    let statement = outcome.statement();
    let base = json!({
        "statement": statement.text,
        "start_line": statement.start_line,
        "start_char": statement.start_char,
        "end_line": statement.end_line,
        "end_char": statement.end_char,
    });

    let mut object = base;
    match outcome {
        StatementOutcome::Table { result, table, .. } => {
            object["success"] = json!(true);
            object["row_count"] = json!(table.row_count);
            object["columns"] = json!(table.columns);
            object["rows"] = json!(table.rows);
            object["execution_time_ms"] = json!(result.execution_time_ms);
        }
        StatementOutcome::Effect { result, .. } => {
            object["success"] = json!(true);
            object["execution_time_ms"] = json!(result.execution_time_ms);
        }
        StatementOutcome::ExecutionFailed { result, .. } => {
            object["success"] = json!(false);
            object["interrupted"] = json!(result.interrupted);
            object["error"] = json!(result.error);
            object["execution_time_ms"] = json!(result.execution_time_ms);
        }
        StatementOutcome::ResultUnreadable { result, error, .. } => {
            object["success"] = json!(false);
            object["error"] = json!(error.to_string());
            object["execution_time_ms"] = json!(result.execution_time_ms);
        }
    }
    object
}

/// Formats a result table as aligned text columns.
fn format_table(table: &ResultTable) -> String {
    let mut widths: Vec<usize> = table.columns.iter().map(|c| c.chars().count()).collect();

    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| {
            table
                .columns
                .iter()
                .map(|column| cell_text(row.get(column).unwrap_or(&JsonValue::Null)))
                .collect()
        })
        .collect();

    for row in &rows {
        for (index, cell) in row.iter().enumerate() {
            widths[index] = widths[index].max(cell.chars().count());
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(
        table
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{:<width$}", c, width = widths[i]))
            .collect::<Vec<_>>()
            .join(" | "),
    );
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in &rows {
        lines.push(
            row.iter()
                .enumerate()
                .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
                .collect::<Vec<_>>()
                .join(" | "),
        );
    }

    lines.join("\n")
}

/// Renders a single normalized cell for text display.
fn cell_text(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "NULL".to_string(),
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
