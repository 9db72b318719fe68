/// Structured logging for the streamflow service
///
/// Library code logs through `tracing` macros with station and sub-range
/// fields. The binary installs a `tracing-subscriber` formatter filtered by
/// `RUST_LOG`. Chunk failures are classified so that a station with no data
/// for a year reads differently in the log from an endpoint outage.

use std::fmt;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::model::{StreamflowError, TransportError};
use crate::retrieval::ChunkFailure;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "streamflow_service=info";

/// Installs the global subscriber. Log lines go to stderr so that exported
/// data on stdout stays clean.
pub fn init_logging(verbose: bool) {
    let fallback = if verbose {
        "streamflow_service=debug"
    } else {
        DEFAULT_FILTER
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// The station simply has nothing for that range (decommissioned,
    /// seasonal, record starts later).
    Expected,
    /// Service degradation or a format change on the upstream side.
    Unexpected,
    /// Cannot tell from the error alone.
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Classifies a chunk-level error.
pub fn classify_chunk_failure(err: &StreamflowError) -> FailureType {
    match err {
        StreamflowError::ChunkFetch { source, .. } => match source {
            TransportError::EmptyBody => FailureType::Expected,
            TransportError::Status(404) => FailureType::Expected,
            TransportError::Status(code) if *code >= 500 => FailureType::Unexpected,
            TransportError::Status(_) => FailureType::Unknown,
            TransportError::Request(e) if e.is_timeout() || e.is_connect() => FailureType::Unexpected,
            TransportError::Request(_) | TransportError::Unavailable(_) => FailureType::Unknown,
        },
        // A body that no longer matches the schema means the export format moved.
        StreamflowError::ChunkParse { .. } => FailureType::Unexpected,
        _ => FailureType::Unknown,
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Logs a chunk failure at a level matching its classification.
pub fn log_chunk_failure(station_id: &str, failure: &ChunkFailure) {
    let failure_type = classify_chunk_failure(&failure.error);
    let range = failure.range.to_string();

    match failure_type {
        FailureType::Expected => {
            debug!(station = station_id, %range, kind = %failure_type, "chunk skipped: {}", failure.error)
        }
        FailureType::Unexpected => {
            error!(station = station_id, %range, kind = %failure_type, "chunk failed: {}", failure.error)
        }
        FailureType::Unknown => {
            warn!(station = station_id, %range, kind = %failure_type, "chunk failed: {}", failure.error)
        }
    }
}

/// Logs the outcome of one retrieval.
pub fn log_fetch_summary(station_id: &str, total: usize, successful: usize, failed: usize, rows: usize) {
    if failed == 0 {
        info!(station = station_id, chunks = total, rows, "retrieval complete");
    } else if successful == 0 {
        error!(station = station_id, chunks = total, failed, "retrieval failed: no chunk succeeded");
    } else {
        warn!(
            station = station_id,
            chunks = total,
            successful,
            failed,
            rows,
            "retrieval incomplete"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChunkRange;
    use chrono::NaiveDate;

    fn range() -> ChunkRange {
        ChunkRange {
            start: NaiveDate::from_ymd_opt(2010, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2011, 1, 1).unwrap(),
        }
    }

    fn fetch_error(source: TransportError) -> StreamflowError {
        StreamflowError::ChunkFetch { range: range(), source }
    }

    #[test]
    fn test_failure_classification() {
        assert_eq!(classify_chunk_failure(&fetch_error(TransportError::EmptyBody)), FailureType::Expected);
        assert_eq!(classify_chunk_failure(&fetch_error(TransportError::Status(404))), FailureType::Expected);
        assert_eq!(classify_chunk_failure(&fetch_error(TransportError::Status(503))), FailureType::Unexpected);
        assert_eq!(classify_chunk_failure(&fetch_error(TransportError::Status(403))), FailureType::Unknown);
        assert_eq!(
            classify_chunk_failure(&fetch_error(TransportError::Unavailable("offline".into()))),
            FailureType::Unknown
        );

        let parse = StreamflowError::ChunkParse { range: range(), reason: "found 1".into() };
        assert_eq!(classify_chunk_failure(&parse), FailureType::Unexpected);

        let not_chunk = StreamflowError::StationNotFound("Bailey".into());
        assert_eq!(classify_chunk_failure(&not_chunk), FailureType::Unknown);
    }

    #[test]
    fn test_failure_type_display() {
        assert_eq!(FailureType::Unexpected.to_string(), "UNEXPECTED");
    }

    #[test]
    fn test_logging_helpers_do_not_panic_without_subscriber() {
        let failure = ChunkFailure { range: range(), error: fetch_error(TransportError::Status(500)) };
        log_chunk_failure("BOCOROCO", &failure);
        log_fetch_summary("BOCOROCO", 3, 2, 1, 100);
        log_fetch_summary("BOCOROCO", 3, 0, 3, 0);
        init_logging(false);
        init_logging(true);
    }
}
