/// Core data types for the streamflow retrieval service.
///
/// This module defines the shared domain model imported by all other modules:
/// query chunks handed to the transport, the normalized discharge rows, the
/// assembled series, and the error taxonomy. It contains no I/O.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Upstream query constants
// ---------------------------------------------------------------------------

/// DWR measurement type for streamflow discharge, in cubic feet per second.
pub const MTYPE_DISCHARGE: &str = "DISCHRG";

/// DWR interval code for the finest resolution the export service offers.
pub const DEFAULT_INTERVAL: &str = "1";

/// Longest span, in days, the export service accepts for a single request.
pub const MAX_CHUNK_DAYS: i64 = 365;

/// Literal format for user-supplied dates and for the START/END query params.
pub const DATE_FORMAT: &str = "%Y/%m/%d";

// ---------------------------------------------------------------------------
// Query types
// ---------------------------------------------------------------------------

/// Inclusive date sub-range covered by one upstream request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChunkRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ChunkRange {
    /// Number of days between the two boundaries.
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

impl fmt::Display for ChunkRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..{}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

/// One upstream query description. Created per consecutive boundary pair,
/// consumed by a `Transport`, discarded after use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryChunk {
    pub station_id: String,
    pub measurement_type: String,
    pub interval: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl QueryChunk {
    pub fn range(&self) -> ChunkRange {
        ChunkRange {
            start: self.start,
            end: self.end,
        }
    }
}

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// A single discharge measurement after normalization.
///
/// `discharge` is `None` when the source text could not be coerced to a
/// number (e.g. "Ice", "Eqp", blank). Missing is a value, not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DischargeRow {
    pub station_id: String,
    pub timestamp: NaiveDateTime,
    pub discharge: Option<f64>, // cfs
}

/// Timestamp-ordered discharge readings for one retrieval.
///
/// Built by `ingest::accumulate` and read-only afterwards. Readings that share
/// a timestamp across chunk boundaries are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DischargeSeries {
    rows: Vec<DischargeRow>,
}

impl DischargeSeries {
    /// Wraps rows that are already sorted by timestamp.
    pub(crate) fn from_sorted(rows: Vec<DischargeRow>) -> Self {
        debug_assert!(rows.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        Self { rows }
    }

    pub fn rows(&self) -> &[DischargeRow] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DischargeRow> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first(&self) -> Option<&DischargeRow> {
        self.rows.first()
    }

    pub fn last(&self) -> Option<&DischargeRow> {
        self.rows.last()
    }

    /// Count of rows whose discharge could not be coerced to a number.
    pub fn missing_count(&self) -> usize {
        self.rows.iter().filter(|r| r.discharge.is_none()).count()
    }

    /// Timestamps that appear more than once, in ascending order.
    ///
    /// Adjacent chunks share a boundary date, so a reading on that date can
    /// be returned by both requests.
    pub fn duplicate_timestamps(&self) -> Vec<NaiveDateTime> {
        let mut dupes: Vec<NaiveDateTime> = self
            .rows
            .windows(2)
            .filter(|w| w[0].timestamp == w[1].timestamp)
            .map(|w| w[0].timestamp)
            .collect();
        dupes.dedup();
        dupes
    }

    pub fn into_rows(self) -> Vec<DischargeRow> {
        self.rows
    }
}

impl<'a> IntoIterator for &'a DischargeSeries {
    type Item = &'a DischargeRow;
    type IntoIter = std::slice::Iter<'a, DischargeRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Failures raised by a `Transport` for a single chunk.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be sent or the body could not be read.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Non-2xx HTTP response from the export service.
    #[error("HTTP error: {0}")]
    Status(u16),
    /// The service answered with an empty body.
    #[error("empty response body")]
    EmptyBody,
    /// Any other transport-specific failure.
    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

/// Errors that can arise while retrieving and assembling a discharge series.
#[derive(Debug, Error)]
pub enum StreamflowError {
    /// A date argument did not match `YYYY/MM/DD`.
    #[error("invalid date '{input}': expected YYYY/MM/DD")]
    InvalidDateFormat { input: String },

    /// The requested end date precedes the start date.
    #[error("invalid range: end {end} precedes start {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// The transport failed for one sub-range.
    #[error("fetch failed for {range}: {source}")]
    ChunkFetch {
        range: ChunkRange,
        #[source]
        source: TransportError,
    },

    /// A fetched body did not match the expected table schema.
    #[error("unexpected table for {range}: {reason}")]
    ChunkParse { range: ChunkRange, reason: String },

    /// No directory entry matched a station query.
    #[error("no station matches '{0}'")]
    StationNotFound(String),

    /// The station directory could not be loaded.
    #[error("station directory unavailable: {0}")]
    StationSource(String),
}

impl StreamflowError {
    /// The sub-range a chunk-level error belongs to, if any.
    pub fn chunk_range(&self) -> Option<ChunkRange> {
        match self {
            StreamflowError::ChunkFetch { range, .. } | StreamflowError::ChunkParse { range, .. } => {
                Some(*range)
            }
            _ => None,
        }
    }
}
