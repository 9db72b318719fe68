/// Combines per-chunk tables into one `DischargeSeries`.
///
/// Rows are concatenated in chunk order, timestamps are parsed, and the
/// discharge column is coerced to a number. A cell that is not a number
/// becomes a missing reading; it never fails the whole series. Rows that
/// fall on a shared chunk boundary are kept as delivered, duplicates and all.

use crate::ingest::tabular::{ChunkTable, parse_timestamp};
use crate::model::{DischargeRow, DischargeSeries, StreamflowError};

/// Coerces a discharge cell to cfs, or `None` for flags, blanks and junk.
pub fn coerce_discharge(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Converts one chunk's rows: timestamps parsed, discharge coerced.
///
/// # Errors
/// - `StreamflowError::ChunkParse` if a timestamp cell cannot be parsed; the
///   error carries the sub-range of the offending chunk.
pub fn normalize_table(table: ChunkTable) -> Result<Vec<DischargeRow>, StreamflowError> {
    let range = table.chunk.range();
    table
        .rows
        .into_iter()
        .map(|raw| -> Result<DischargeRow, StreamflowError> {
            let timestamp = parse_timestamp(&raw.timestamp).ok_or_else(|| StreamflowError::ChunkParse {
                range,
                reason: format!("unrecognized timestamp '{}'", raw.timestamp),
            })?;
            Ok(DischargeRow {
                discharge: coerce_discharge(&raw.discharge),
                station_id: raw.station_id,
                timestamp,
            })
        })
        .collect()
}

/// Orders normalized rows into a series.
pub fn into_series(mut rows: Vec<DischargeRow>) -> DischargeSeries {
    // Stable: equal timestamps keep their chunk order.
    rows.sort_by_key(|r| r.timestamp);
    DischargeSeries::from_sorted(rows)
}

/// Builds a timestamp-ordered series from chunk tables.
///
/// # Errors
/// - `StreamflowError::ChunkParse` from the first chunk with a bad timestamp.
pub fn accumulate(tables: Vec<ChunkTable>) -> Result<DischargeSeries, StreamflowError> {
    let capacity = tables.iter().map(|t| t.rows.len()).sum();
    let mut rows: Vec<DischargeRow> = Vec::with_capacity(capacity);

    for table in tables {
        rows.extend(normalize_table(table)?);
    }

    Ok(into_series(rows))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
