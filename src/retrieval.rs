/// Streamflow retrieval: date strings in, discharge series out.
///
/// Composes the ingest pieces in order:
///   parse dates → partition → assemble chunks → fetch (one chunk at a time)
///   → parse table → accumulate
///
/// Requests are strictly sequential. Chunk N+1 is not requested until chunk
/// N has been fetched and parsed, and the series is built in date order.
/// Date and range errors are raised before the transport is touched.

use tracing::{debug, info};

use crate::config::{FailureMode, ServiceConfig};
use crate::ingest::accumulate::{into_series, normalize_table};
use crate::ingest::dwr::{DwrClient, Transport};
use crate::ingest::partition::{parse_date, partition_with_span};
use crate::ingest::tabular::parse_table;
use crate::logging;
use crate::model::{ChunkRange, DischargeRow, DischargeSeries, QueryChunk, StreamflowError, TransportError};

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// One chunk that could not be fetched or parsed in best-effort mode.
#[derive(Debug)]
pub struct ChunkFailure {
    pub range: ChunkRange,
    pub error: StreamflowError,
}

/// Outcome of a retrieval: the series from every successful chunk, plus
/// the chunks that failed. `failures` is always empty in fail-fast mode.
#[derive(Debug)]
pub struct FetchReport {
    pub station_id: String,
    pub chunks_requested: usize,
    pub series: DischargeSeries,
    pub failures: Vec<ChunkFailure>,
}

impl FetchReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

/// Parses the dates and lays out the chunks for a retrieval. Needs no
/// transport, so a dry run never builds an HTTP client.
///
/// A zero-length range (`start == end`) plans no chunks.
pub fn plan_chunks(
    config: &ServiceConfig,
    station_id: &str,
    start: &str,
    end: &str,
) -> Result<Vec<QueryChunk>, StreamflowError> {
    let start = parse_date(start)?;
    let end = parse_date(end)?;
    let boundaries = partition_with_span(start, end, config.max_span_days)?;
    Ok(config.assembler().assemble(station_id, &boundaries))
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct StreamflowClient<T> {
    transport: T,
    config: ServiceConfig,
}

impl StreamflowClient<DwrClient> {
    /// Client backed by the live DWR export service.
    pub fn from_config(config: ServiceConfig) -> Result<Self, TransportError> {
        let transport = DwrClient::new(&config)?;
        Ok(Self::new(transport, config))
    }
}

impl<T: Transport> StreamflowClient<T> {
    pub fn new(transport: T, config: ServiceConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The chunks a retrieval would request, without requesting them.
    pub fn plan(&self, station_id: &str, start: &str, end: &str) -> Result<Vec<QueryChunk>, StreamflowError> {
        plan_chunks(&self.config, station_id, start, end)
    }

    /// Retrieves a complete series, failing on the first chunk error.
    ///
    /// # Errors
    /// - `InvalidDateFormat` / `InvalidRange` before any request.
    /// - `ChunkFetch` / `ChunkParse` for the first failing sub-range; no
    ///   later chunk is requested.
    pub fn get_streamflow(&self, station_id: &str, start: &str, end: &str) -> Result<DischargeSeries, StreamflowError> {
        let report = self.run(station_id, start, end, FailureMode::FailFast)?;
        Ok(report.series)
    }

    /// Retrieves a series using the configured failure mode.
    pub fn fetch(&self, station_id: &str, start: &str, end: &str) -> Result<FetchReport, StreamflowError> {
        self.run(station_id, start, end, self.config.failure_mode)
    }

    fn run(&self, station_id: &str, start: &str, end: &str, mode: FailureMode) -> Result<FetchReport, StreamflowError> {
        let chunks = self.plan(station_id, start, end)?;
        info!(
            station = station_id,
            start,
            end,
            chunks = chunks.len(),
            ?mode,
            "retrieving streamflow"
        );

        let mut rows: Vec<DischargeRow> = Vec::new();
        let mut successful = 0;
        let mut failures: Vec<ChunkFailure> = Vec::new();

        for chunk in &chunks {
            match self.fetch_chunk(chunk) {
                Ok(chunk_rows) => {
                    debug!(station = station_id, range = %chunk.range(), rows = chunk_rows.len(), "chunk fetched");
                    rows.extend(chunk_rows);
                    successful += 1;
                }
                Err(error) => match mode {
                    FailureMode::FailFast => {
                        logging::log_fetch_summary(station_id, chunks.len(), successful, 1, 0);
                        return Err(error);
                    }
                    FailureMode::BestEffort => {
                        let failure = ChunkFailure { range: chunk.range(), error };
                        logging::log_chunk_failure(station_id, &failure);
                        failures.push(failure);
                    }
                },
            }
        }

        let series = into_series(rows);
        logging::log_fetch_summary(station_id, chunks.len(), successful, failures.len(), series.len());

        Ok(FetchReport {
            station_id: station_id.to_string(),
            chunks_requested: chunks.len(),
            series,
            failures,
        })
    }

    /// Fetches, schema-checks and normalizes one chunk. A bad timestamp
    /// fails only this chunk.
    fn fetch_chunk(&self, chunk: &QueryChunk) -> Result<Vec<DischargeRow>, StreamflowError> {
        let fetch_error = |source| StreamflowError::ChunkFetch {
            range: chunk.range(),
            source,
        };

        let body = self.transport.fetch(chunk).map_err(fetch_error)?;
        if body.trim().is_empty() {
            return Err(fetch_error(TransportError::EmptyBody));
        }

        let table = parse_table(chunk, &body)?;
        normalize_table(table)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
