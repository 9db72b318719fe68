/// Service configuration loader - parses streamflow.toml
///
/// Keeps the upstream endpoint, query template and station directory out of
/// the code so a moved endpoint or a new station does not need a rebuild.
///
/// ```toml
/// [service]
/// base_url = "https://dwr.state.co.us/SurfaceWater/data/export_tabular.aspx"
/// max_span_days = 365
/// failure_mode = "fail_fast"
///
/// [[station]]
/// abbrev = "PLABAICO"
/// name = "NORTH FORK SOUTH PLATTE RIVER AT BAILEY, CO"
/// ```

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::ingest::request::{EXPORT_BASE_URL, RequestAssembler};
use crate::model::{DEFAULT_INTERVAL, MAX_CHUNK_DAYS, MTYPE_DISCHARGE};
use crate::stations::Station;

pub const DEFAULT_CONFIG_PATH: &str = "streamflow.toml";
pub const ENV_CONFIG_PATH: &str = "STREAMFLOW_CONFIG";
pub const ENV_BASE_URL: &str = "STREAMFLOW_BASE_URL";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// ---------------------------------------------------------------------------
// Configuration types
// ---------------------------------------------------------------------------

/// What to do when one chunk's request fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    /// Abort the retrieval on the first failed chunk.
    #[default]
    FailFast,
    /// Skip the failed chunk, keep going, and report it.
    BestEffort,
}

/// Upstream endpoint and retrieval settings from the `[service]` table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    pub measurement_type: String,
    pub interval: String,
    /// Longest sub-range per request; the service refuses more than 365.
    pub max_span_days: i64,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub failure_mode: FailureMode,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: EXPORT_BASE_URL.to_string(),
            measurement_type: MTYPE_DISCHARGE.to_string(),
            interval: DEFAULT_INTERVAL.to_string(),
            max_span_days: MAX_CHUNK_DAYS,
            timeout_secs: 60,
            user_agent: concat!("streamflow_service/", env!("CARGO_PKG_VERSION")).to_string(),
            failure_mode: FailureMode::FailFast,
        }
    }
}

impl ServiceConfig {
    /// Checks values the service would otherwise reject at request time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_CHUNK_DAYS).contains(&self.max_span_days) {
            return Err(ConfigError::Invalid(format!(
                "max_span_days must be between 1 and {}, got {}",
                MAX_CHUNK_DAYS, self.max_span_days
            )));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::Invalid(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be positive".to_string()));
        }
        if self.measurement_type.trim().is_empty() {
            return Err(ConfigError::Invalid("measurement_type must not be empty".to_string()));
        }
        Ok(())
    }

    /// Query template for chunk assembly.
    pub fn assembler(&self) -> RequestAssembler {
        RequestAssembler::new(self.measurement_type.clone(), self.interval.clone())
    }
}

/// Root configuration structure for TOML parsing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamflowConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub station: Vec<Station>,
}

impl StreamflowConfig {
    /// Parses and validates configuration text.
    pub fn from_toml_str(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: StreamflowConfig = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.service.validate()?;
        Ok(config)
    }

    /// Applies environment overrides. `lookup` is `std::env::var` in
    /// production and a map in tests.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.service.base_url = url;
            self.service.validate()?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Loads configuration from `path`.
pub fn load_config(path: impl AsRef<Path>) -> Result<StreamflowConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    StreamflowConfig::from_toml_str(&contents, path)
}

/// Loads configuration the way the binary does.
///
/// Reads `.env` if present, then `$STREAMFLOW_CONFIG` (must exist) or
/// `streamflow.toml` (defaults when absent), then applies
/// `$STREAMFLOW_BASE_URL`.
pub fn load_config_from_env() -> Result<StreamflowConfig, ConfigError> {
    dotenv::dotenv().ok();

    let mut config = match env::var(ENV_CONFIG_PATH) {
        Ok(path) => load_config(&path)?,
        Err(_) => load_default_file(Path::new(DEFAULT_CONFIG_PATH))?,
    };

    config.apply_env_overrides(|key| env::var(key).ok())?;
    Ok(config)
}

/// Loads `path` if it exists, otherwise built-in defaults.
pub fn load_default_file(path: &Path) -> Result<StreamflowConfig, ConfigError> {
    if path.exists() {
        let config = load_config(path)?;
        info!(path = %path.display(), stations = config.station.len(), "loaded configuration");
        Ok(config)
    } else {
        warn!(path = %path.display(), "no configuration file, using defaults");
        Ok(StreamflowConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    const SAMPLE: &str = r#"
[service]
base_url = "https://example.test/export_tabular.aspx"
max_span_days = 180
failure_mode = "best_effort"

[[station]]
abbrev = "PLABAICO"
name = "NORTH FORK SOUTH PLATTE RIVER AT BAILEY, CO"
division = 1

[[station]]
abbrev = "BOCOROCO"
name = "BOULDER CREEK NEAR ORODELL, CO"
"#;

    fn parse(text: &str) -> Result<StreamflowConfig, ConfigError> {
        StreamflowConfig::from_toml_str(text, Path::new("test.toml"))
    }

    #[test]
    fn test_parse_sample_config() {
        let config = parse(SAMPLE).expect("sample should parse");
        assert_eq!(config.service.base_url, "https://example.test/export_tabular.aspx");
        assert_eq!(config.service.max_span_days, 180);
        assert_eq!(config.service.failure_mode, FailureMode::BestEffort);
        // Keys not given fall back to defaults.
        assert_eq!(config.service.measurement_type, MTYPE_DISCHARGE);
        assert_eq!(config.service.timeout_secs, 60);
        assert_eq!(config.station.len(), 2);
        assert_eq!(config.station[0].division, Some(1));
        assert_eq!(config.station[1].division, None);
    }

    #[test]
    fn test_empty_config_is_all_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config.service, ServiceConfig::default());
        assert!(config.station.is_empty());
        assert_eq!(config.service.failure_mode, FailureMode::FailFast);
    }

    #[test]
    fn test_span_longer_than_a_year_is_rejected() {
        let result = parse("[service]\nmax_span_days = 400\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))), "got {:?}", result);
        let result = parse("[service]\nmax_span_days = 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_non_http_base_url_is_rejected() {
        let result = parse("[service]\nbase_url = \"ftp://dwr.state.co.us\"\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_unknown_failure_mode_is_parse_error() {
        let result = parse("[service]\nfailure_mode = \"sometimes\"\n");
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_env_override_replaces_base_url() {
        let mut config = parse(SAMPLE).unwrap();
        let env: HashMap<&str, &str> = [(ENV_BASE_URL, "http://localhost:8080/export")].into();
        config
            .apply_env_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.service.base_url, "http://localhost:8080/export");
    }

    #[test]
    fn test_env_override_is_validated() {
        let mut config = parse(SAMPLE).unwrap();
        let result = config.apply_env_overrides(|_| Some("not a url".to_string()));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = load_config(file.path()).expect("temp config should load");
        assert_eq!(config.station.len(), 2);
    }

    #[test]
    fn test_load_config_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_load_default_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_default_file(&dir.path().join(DEFAULT_CONFIG_PATH)).unwrap();
        assert_eq!(config.service, ServiceConfig::default());
    }

    #[test]
    fn test_assembler_uses_configured_template() {
        let config = parse("[service]\nmeasurement_type = \"GAGE_HT\"\ninterval = \"2\"\n").unwrap();
        let assembler = config.service.assembler();
        assert_eq!(assembler.measurement_type, "GAGE_HT");
        assert_eq!(assembler.interval, "2");
    }
}
