/// Series export: CSV and JSON writers plus a one-glance summary.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::io::Write;
use thiserror::Error;

use crate::model::DischargeSeries;

/// Timestamp format for CSV output.
pub const CSV_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON write failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes `station,timestamp,discharge` rows. Missing discharge is an empty field.
pub fn write_csv<W: Write>(series: &DischargeSeries, writer: W) -> Result<(), ExportError> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(["station", "timestamp", "discharge"])?;

    for row in series {
        let timestamp = row.timestamp.format(CSV_TIMESTAMP_FORMAT).to_string();
        let discharge = row.discharge.map(|q| q.to_string()).unwrap_or_default();
        out.write_record([row.station_id.as_str(), timestamp.as_str(), discharge.as_str()])?;
    }

    out.flush()?;
    Ok(())
}

/// Writes the rows as a pretty-printed JSON array; missing discharge is `null`.
pub fn write_json<W: Write>(series: &DischargeSeries, mut writer: W) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(&mut writer, series.rows())?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub rows: usize,
    pub missing: usize,
    pub min_discharge: Option<f64>,
    pub max_discharge: Option<f64>,
    pub first: Option<NaiveDateTime>,
    pub last: Option<NaiveDateTime>,
    pub duplicate_timestamps: usize,
}

pub fn summarize(series: &DischargeSeries) -> SeriesSummary {
    let values = series.iter().filter_map(|r| r.discharge);
    let (min, max) = values.fold((None, None), |(min, max): (Option<f64>, Option<f64>), q| {
        (
            Some(min.map_or(q, |m| m.min(q))),
            Some(max.map_or(q, |m| m.max(q))),
        )
    });

    SeriesSummary {
        rows: series.len(),
        missing: series.missing_count(),
        min_discharge: min,
        max_discharge: max,
        first: series.first().map(|r| r.timestamp),
        last: series.last().map(|r| r.timestamp),
        duplicate_timestamps: series.duplicate_timestamps().len(),
    }
}

impl std::fmt::Display for SeriesSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} rows ({} missing)", self.rows, self.missing)?;
        if let (Some(first), Some(last)) = (self.first, self.last) {
            write!(
                f,
                ", {} to {}",
                first.format(CSV_TIMESTAMP_FORMAT),
                last.format(CSV_TIMESTAMP_FORMAT)
            )?;
        }
        if let (Some(min), Some(max)) = (self.min_discharge, self.max_discharge) {
            write!(f, ", discharge {:.1}-{:.1} cfs", min, max)?;
        }
        if self.duplicate_timestamps > 0 {
            write!(f, ", {} duplicate timestamps", self.duplicate_timestamps)?;
        }
        Ok(())
    }
}
