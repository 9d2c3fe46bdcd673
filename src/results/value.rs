//! Column value normalization.
//!
//! The decode layer produces a closed, tagged [`ColumnValue`] for every cell
//! rather than handing opaque engine types to callers; normalization is a
//! total match over that enum, converting each variant into a JSON-safe
//! value suitable for rendering or serialization.

use base64::Engine as _;
use serde_json::{Number, Value as JsonValue};

/// Largest integer magnitude a double-precision float represents exactly
/// (2^53 - 1). Wider integers are carried as exact decimal strings.
pub const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_991;

/// A decoded cell value, one variant per engine value class.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    /// SQL NULL.
    Null,
    /// Boolean.
    Bool(bool),
    /// Any integer type, widened to 64 bits.
    Int64(i64),
    /// Any floating-point type, widened to 64 bits.
    Float64(f64),
    /// Canonical text of a fixed-point decimal.
    DecimalText(String),
    /// ISO-8601 text of a date, time, or timestamp.
    TemporalText(String),
    /// Plain text.
    Utf8(String),
    /// Variable-width binary data.
    Binary(Vec<u8>),
}

/// Converts a decoded cell into a JSON-safe value.
///
/// Rules, in order:
/// - `Null` maps to JSON null, unconditionally.
/// - Integers within the safe double range become numbers; wider ones become
///   their exact decimal string (never silently truncated).
/// - Decimals are round-tripped through text: if the canonical text parses
///   as a finite float it becomes a number, otherwise the text is kept.
/// - Temporal values are already ISO-8601 text and pass through as strings.
/// - Binary data is rendered as base64.
pub fn normalize(value: ColumnValue) -> JsonValue {
    match value {
        ColumnValue::Null => JsonValue::Null,
        ColumnValue::Bool(b) => JsonValue::Bool(b),
        ColumnValue::Int64(i) => {
            if (-MAX_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(&i) {
                JsonValue::Number(Number::from(i))
            } else {
                JsonValue::String(i.to_string())
            }
        }
        ColumnValue::Float64(f) => match Number::from_f64(f) {
            Some(n) => JsonValue::Number(n),
            // NaN and infinities have no JSON representation; keep the text.
            None => JsonValue::String(f.to_string()),
        },
        ColumnValue::DecimalText(text) => match text.parse::<f64>() {
            Ok(parsed) if parsed.is_finite() => match Number::from_f64(parsed) {
                Some(n) => JsonValue::Number(n),
                None => JsonValue::String(text),
            },
            _ => JsonValue::String(text),
        },
        ColumnValue::TemporalText(text) => JsonValue::String(text),
        ColumnValue::Utf8(text) => JsonValue::String(text),
        ColumnValue::Binary(bytes) => {
            JsonValue::String(base64::engine::general_purpose::STANDARD.encode(bytes))
        }
    }
}
