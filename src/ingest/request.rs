/// Query chunk assembly and export URL construction.
///
/// Turns a boundary sequence from `partition` into one `QueryChunk` per
/// consecutive pair, and renders a chunk as the GET URL for the DWR
/// surface-water export service:
///   https://dwr.state.co.us/SurfaceWater/data/export_tabular.aspx
///
/// Nothing here touches the network.

use chrono::NaiveDate;

use crate::model::{DATE_FORMAT, DEFAULT_INTERVAL, MTYPE_DISCHARGE, QueryChunk};

// ---------------------------------------------------------------------------
// Chunk assembly
// ---------------------------------------------------------------------------

/// Query template shared by every chunk of one retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestAssembler {
    pub measurement_type: String,
    pub interval: String,
}

impl Default for RequestAssembler {
    fn default() -> Self {
        Self {
            measurement_type: MTYPE_DISCHARGE.to_string(),
            interval: DEFAULT_INTERVAL.to_string(),
        }
    }
}

impl RequestAssembler {
    pub fn new(measurement_type: impl Into<String>, interval: impl Into<String>) -> Self {
        Self {
            measurement_type: measurement_type.into(),
            interval: interval.into(),
        }
    }

    /// Emits one chunk per adjacent boundary pair, in boundary order.
    ///
    /// Equal adjacent boundaries describe a zero-length range and produce no
    /// chunk, so `[d, d]` assembles to an empty list.
    pub fn assemble(&self, station_id: &str, boundaries: &[NaiveDate]) -> Vec<QueryChunk> {
        boundaries
            .windows(2)
            .filter(|pair| pair[0] != pair[1])
            .map(|pair| QueryChunk {
                station_id: station_id.to_string(),
                measurement_type: self.measurement_type.clone(),
                interval: self.interval.clone(),
                start: pair[0],
                end: pair[1],
            })
            .collect()
    }
}

/// Assembles discharge chunks with the default measurement type and interval.
pub fn assemble(station_id: &str, boundaries: &[NaiveDate]) -> Vec<QueryChunk> {
    RequestAssembler::default().assemble(station_id, boundaries)
}

// ---------------------------------------------------------------------------
// URL construction
// ---------------------------------------------------------------------------

pub const EXPORT_BASE_URL: &str = "https://dwr.state.co.us/SurfaceWater/data/export_tabular.aspx";

/// Builds the export service URL for one chunk.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use streamflow_service::ingest::request::{assemble, build_export_url, EXPORT_BASE_URL};
///
/// let bounds = [
///     NaiveDate::from_ymd_opt(2015, 10, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2016, 9, 30).unwrap(),
/// ];
/// let chunks = assemble("PLABAICO", &bounds);
/// let url = build_export_url(EXPORT_BASE_URL, &chunks[0]);
/// assert!(url.contains("ID=PLABAICO"));
/// ```
pub fn build_export_url(base_url: &str, chunk: &QueryChunk) -> String {
    format!(
        "{}?ID={}&MTYPE={}&INTERVAL={}&START={}&END={}",
        base_url,
        urlencoding::encode(&chunk.station_id),
        urlencoding::encode(&chunk.measurement_type),
        urlencoding::encode(&chunk.interval),
        chunk.start.format(DATE_FORMAT),
        chunk.end.format(DATE_FORMAT)
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
