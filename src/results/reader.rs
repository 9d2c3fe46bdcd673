//! Arrow IPC result file decoding.
//!
//! Reads the artifact file a query exported, producing column names, a row
//! count, and normalized row objects. The reader never deletes the file it
//! reads; artifact cleanup belongs to the executor exclusively.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use arrow::array::{
    Array, BinaryArray, BooleanArray, Date32Array, Date64Array, Decimal128Array, Decimal256Array,
    FixedSizeBinaryArray, Float32Array, Float64Array, Int16Array, Int32Array, Int64Array,
    Int8Array, LargeBinaryArray, LargeStringArray, StringArray, Time32MillisecondArray,
    Time32SecondArray, Time64MicrosecondArray, Time64NanosecondArray, TimestampMicrosecondArray,
    TimestampMillisecondArray, TimestampNanosecondArray, TimestampSecondArray, UInt16Array,
    UInt32Array, UInt64Array, UInt8Array,
};
use arrow::datatypes::{DataType, SchemaRef, TimeUnit};
use arrow::ipc::reader::{FileReader, StreamReader};
use arrow::record_batch::RecordBatch;
use serde::Serialize;
use serde_json::{Map as JsonMap, Value as JsonValue};
use tracing::debug;

use crate::error::{DuckpadError, Result};
use crate::results::value::{normalize, ColumnValue};

/// A fully materialized, normalized result set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultTable {
    /// Column names in engine schema order.
    pub columns: Vec<String>,
    /// Row objects; each map iterates its keys in schema order.
    pub rows: Vec<JsonMap<String, JsonValue>>,
    /// Authoritative row count; always equals `rows.len()`.
    pub row_count: usize,
}

/// Reads an Arrow IPC file into a [`ResultTable`].
///
/// Fails with [`DuckpadError::ResultRead`] if the file is missing, truncated,
/// or not a valid Arrow IPC file. Every cell is normalized through the closed
/// [`ColumnValue`] variant set; no engine-native value escapes.
pub fn read_result_file(path: &Path) -> Result<ResultTable> {
    let (schema, batches) = decode_ipc(path)?;

    let columns: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();
    let declared_rows: usize = batches.iter().map(RecordBatch::num_rows).sum();

    let mut rows = Vec::with_capacity(declared_rows);
    for batch in &batches {
        for row in 0..batch.num_rows() {
            let mut object = JsonMap::with_capacity(columns.len());
            for (index, name) in columns.iter().enumerate() {
                let value = column_value(batch.column(index).as_ref(), row)?;
                object.insert(name.clone(), normalize(value));
            }
            rows.push(object);
        }
    }

    // A mismatch here means a batch lied about its length; surface it as a
    // decode error rather than a silently short table.
    if rows.len() != declared_rows {
        return Err(DuckpadError::result_read(format!(
            "decoded {} rows but the file declares {}",
            rows.len(),
            declared_rows
        )));
    }

    debug!(
        "Read {} rows x {} columns from {}",
        declared_rows,
        columns.len(),
        path.display()
    );

    Ok(ResultTable {
        columns,
        rows,
        row_count: declared_rows,
    })
}

/// Opens an Arrow IPC file and collects its schema and record batches.
///
/// The engine exports the stream format; the seekable file format is accepted
/// as a fallback so hand-produced artifacts also read.
fn decode_ipc(path: &Path) -> Result<(SchemaRef, Vec<RecordBatch>)> {
    let file = File::open(path).map_err(|e| {
        DuckpadError::result_read(format!("cannot open result file {}: {e}", path.display()))
    })?;

    match StreamReader::try_new(BufReader::new(file), None) {
        Ok(reader) => {
            let schema = reader.schema();
            let batches = reader
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| {
                    DuckpadError::result_read(format!(
                        "truncated or corrupt result file {}: {e}",
                        path.display()
                    ))
                })?;
            Ok((schema, batches))
        }
        Err(stream_err) => {
            let file = File::open(path).map_err(|e| {
                DuckpadError::result_read(format!(
                    "cannot open result file {}: {e}",
                    path.display()
                ))
            })?;
            let reader = FileReader::try_new(file, None).map_err(|_| {
                DuckpadError::result_read(format!(
                    "{} is not a valid Arrow IPC file: {stream_err}",
                    path.display()
                ))
            })?;
            let schema = reader.schema();
            let batches = reader
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| {
                    DuckpadError::result_read(format!(
                        "truncated or corrupt result file {}: {e}",
                        path.display()
                    ))
                })?;
            Ok((schema, batches))
        }
    }
}

/// Decodes one cell into the closed [`ColumnValue`] set.
///
/// Narrow engine types widen into the set (small ints to `Int64`, `Float32`
/// to `Float64`, all temporal units to ISO-8601 text). A column type outside
/// the set is a decode error, not a silent skip.
fn column_value(array: &dyn Array, row: usize) -> Result<ColumnValue> {
    if matches!(array.data_type(), DataType::Null) || array.is_null(row) {
        return Ok(ColumnValue::Null);
    }

    let value = match array.data_type() {
        DataType::Boolean => ColumnValue::Bool(downcast::<BooleanArray>(array)?.value(row)),

        DataType::Int8 => ColumnValue::Int64(downcast::<Int8Array>(array)?.value(row) as i64),
        DataType::Int16 => ColumnValue::Int64(downcast::<Int16Array>(array)?.value(row) as i64),
        DataType::Int32 => ColumnValue::Int64(downcast::<Int32Array>(array)?.value(row) as i64),
        DataType::Int64 => ColumnValue::Int64(downcast::<Int64Array>(array)?.value(row)),
        DataType::UInt8 => ColumnValue::Int64(downcast::<UInt8Array>(array)?.value(row) as i64),
        DataType::UInt16 => ColumnValue::Int64(downcast::<UInt16Array>(array)?.value(row) as i64),
        DataType::UInt32 => ColumnValue::Int64(downcast::<UInt32Array>(array)?.value(row) as i64),
        DataType::UInt64 => {
            let raw = downcast::<UInt64Array>(array)?.value(row);
            match i64::try_from(raw) {
                Ok(v) => ColumnValue::Int64(v),
                // Beyond i64: keep the exact decimal text.
                Err(_) => ColumnValue::Utf8(raw.to_string()),
            }
        }

        DataType::Float32 => {
            ColumnValue::Float64(downcast::<Float32Array>(array)?.value(row) as f64)
        }
        DataType::Float64 => ColumnValue::Float64(downcast::<Float64Array>(array)?.value(row)),

        DataType::Decimal128(_, _) => {
            ColumnValue::DecimalText(downcast::<Decimal128Array>(array)?.value_as_string(row))
        }
        DataType::Decimal256(_, _) => {
            ColumnValue::DecimalText(downcast::<Decimal256Array>(array)?.value_as_string(row))
        }

        DataType::Date32 => temporal_date(downcast::<Date32Array>(array)?.value_as_date(row))?,
        DataType::Date64 => temporal_date(downcast::<Date64Array>(array)?.value_as_date(row))?,

        DataType::Time32(TimeUnit::Second) => {
            temporal_time(downcast::<Time32SecondArray>(array)?.value_as_time(row))?
        }
        DataType::Time32(TimeUnit::Millisecond) => {
            temporal_time(downcast::<Time32MillisecondArray>(array)?.value_as_time(row))?
        }
        DataType::Time64(TimeUnit::Microsecond) => {
            temporal_time(downcast::<Time64MicrosecondArray>(array)?.value_as_time(row))?
        }
        DataType::Time64(TimeUnit::Nanosecond) => {
            temporal_time(downcast::<Time64NanosecondArray>(array)?.value_as_time(row))?
        }

        DataType::Timestamp(unit, tz) => {
            let datetime = match unit {
                TimeUnit::Second => {
                    downcast::<TimestampSecondArray>(array)?.value_as_datetime(row)
                }
                TimeUnit::Millisecond => {
                    downcast::<TimestampMillisecondArray>(array)?.value_as_datetime(row)
                }
                TimeUnit::Microsecond => {
                    downcast::<TimestampMicrosecondArray>(array)?.value_as_datetime(row)
                }
                TimeUnit::Nanosecond => {
                    downcast::<TimestampNanosecondArray>(array)?.value_as_datetime(row)
                }
            };
            temporal_datetime(datetime, tz.is_some())?
        }

        DataType::Utf8 => ColumnValue::Utf8(downcast::<StringArray>(array)?.value(row).to_string()),
        DataType::LargeUtf8 => {
            ColumnValue::Utf8(downcast::<LargeStringArray>(array)?.value(row).to_string())
        }

        DataType::Binary => {
            ColumnValue::Binary(downcast::<BinaryArray>(array)?.value(row).to_vec())
        }
        DataType::LargeBinary => {
            ColumnValue::Binary(downcast::<LargeBinaryArray>(array)?.value(row).to_vec())
        }
        DataType::FixedSizeBinary(_) => {
            ColumnValue::Binary(downcast::<FixedSizeBinaryArray>(array)?.value(row).to_vec())
        }

        other => {
            return Err(DuckpadError::result_read(format!(
                "unsupported column type {other} in result file"
            )))
        }
    };

    Ok(value)
}

fn downcast<T: Array + 'static>(array: &dyn Array) -> Result<&T> {
    array.as_any().downcast_ref::<T>().ok_or_else(|| {
        DuckpadError::result_read(format!(
            "column data does not match its declared type {}",
            array.data_type()
        ))
    })
}

fn temporal_date(date: Option<chrono::NaiveDate>) -> Result<ColumnValue> {
    let date = date.ok_or_else(|| DuckpadError::result_read("date value out of range"))?;
    Ok(ColumnValue::TemporalText(date.format("%Y-%m-%d").to_string()))
}

fn temporal_time(time: Option<chrono::NaiveTime>) -> Result<ColumnValue> {
    let time = time.ok_or_else(|| DuckpadError::result_read("time value out of range"))?;
    Ok(ColumnValue::TemporalText(time.format("%H:%M:%S%.f").to_string()))
}

fn temporal_datetime(datetime: Option<chrono::NaiveDateTime>, utc: bool) -> Result<ColumnValue> {
    let datetime =
        datetime.ok_or_else(|| DuckpadError::result_read("timestamp value out of range"))?;
    let mut text = datetime.format("%Y-%m-%dT%H:%M:%S%.f").to_string();
    if utc {
        // Zone-aware engine timestamps are stored as UTC instants.
        text.push('Z');
    }
    Ok(ColumnValue::TemporalText(text))
}
