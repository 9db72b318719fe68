/// Transport for the Colorado DWR surface-water export service.
///
/// `Transport` is the seam between the chunking core and the network: the
/// core hands it one `QueryChunk` at a time and gets back the raw response
/// body. `DwrClient` is the blocking HTTP implementation used in production;
/// tests substitute their own.

use std::time::Duration;

use tracing::debug;

use crate::config::ServiceConfig;
use crate::ingest::request::build_export_url;
use crate::model::{QueryChunk, TransportError};

/// Fetches the raw tabular body for one chunk.
pub trait Transport {
    fn fetch(&self, chunk: &QueryChunk) -> Result<String, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn fetch(&self, chunk: &QueryChunk) -> Result<String, TransportError> {
        (**self).fetch(chunk)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn fetch(&self, chunk: &QueryChunk) -> Result<String, TransportError> {
        (**self).fetch(chunk)
    }
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

/// Blocking HTTP client for the export endpoint.
pub struct DwrClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl DwrClient {
    /// Builds a client from the `[service]` configuration.
    pub fn new(config: &ServiceConfig) -> Result<Self, TransportError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Transport for DwrClient {
    fn fetch(&self, chunk: &QueryChunk) -> Result<String, TransportError> {
        let url = build_export_url(&self.base_url, chunk);
        debug!(%url, "requesting export");

        let response = self.http.get(&url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        Ok(response.text()?)
    }
}
