/// streamflow_service: Colorado DWR streamflow retrieval over arbitrary date ranges.
///
/// # Module structure
///
/// ```text
/// streamflow_service
/// ├── model       — shared data types (QueryChunk, DischargeSeries, StreamflowError, …)
/// ├── config      — service configuration loader (streamflow.toml)
/// ├── stations    — DWR station directory and name lookup
/// ├── logging     — tracing setup and chunk failure classification
/// ├── retrieval   — StreamflowClient: dates in, discharge series out
/// ├── export      — CSV / JSON writers and series summary
/// └── ingest
///     ├── partition  — split a date range into ≤365-day boundaries
///     ├── request    — boundaries → query chunks, export URL construction
///     ├── dwr        — Transport trait + blocking HTTP client
///     ├── tabular    — tab-delimited response parsing
///     ├── accumulate — chunk tables → ordered DischargeSeries
///     └── fixtures (test only) — representative export responses
/// ```
pub mod config;
pub mod export;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod retrieval;
pub mod stations;

pub use model::{DischargeRow, DischargeSeries, StreamflowError};
pub use retrieval::StreamflowClient;
