/// Station directory for the DWR surface-water network.
///
/// Maps DWR station abbreviations (e.g. `PLABAICO`) to their names so callers
/// can ask for "Bailey" instead of remembering the abbreviation. The
/// directory is an explicit value: it loads once from its `StationSource`
/// when opened and only reloads when `refresh` is called.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use tracing::info;

use crate::model::StreamflowError;

// ---------------------------------------------------------------------------
// Station metadata
// ---------------------------------------------------------------------------

/// Metadata for a single DWR streamflow station.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Station {
    /// DWR station abbreviation, the `ID` query parameter.
    pub abbrev: String,
    /// Official station name.
    pub name: String,
    /// DWR water division (1-7).
    #[serde(default)]
    pub division: Option<u32>,
    #[serde(default)]
    pub water_district: Option<u32>,
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.abbrev)
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Where a directory gets its station list from.
pub trait StationSource {
    fn load_stations(&self) -> Result<Vec<Station>, StreamflowError>;
}

impl<T: StationSource + ?Sized> StationSource for &T {
    fn load_stations(&self) -> Result<Vec<Station>, StreamflowError> {
        (**self).load_stations()
    }
}

/// Stations already in memory, typically the `[[station]]` tables of the
/// loaded configuration.
pub struct StaticStations(pub Vec<Station>);

impl StationSource for StaticStations {
    fn load_stations(&self) -> Result<Vec<Station>, StreamflowError> {
        Ok(self.0.clone())
    }
}

/// A TOML file of `[[station]]` tables, re-read on every load.
pub struct StationFile {
    pub path: PathBuf,
}

#[derive(Deserialize)]
struct StationFileContents {
    #[serde(default)]
    station: Vec<Station>,
}

impl StationSource for StationFile {
    fn load_stations(&self) -> Result<Vec<Station>, StreamflowError> {
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            StreamflowError::StationSource(format!("failed to read {}: {}", self.path.display(), e))
        })?;
        let parsed: StationFileContents = toml::from_str(&contents).map_err(|e| {
            StreamflowError::StationSource(format!("failed to parse {}: {}", self.path.display(), e))
        })?;
        Ok(parsed.station)
    }
}

// ---------------------------------------------------------------------------
// Directory
// ---------------------------------------------------------------------------

pub struct StationDirectory<S> {
    source: S,
    stations: Vec<Station>,
    loaded_at: DateTime<Utc>,
}

impl<S: StationSource> StationDirectory<S> {
    /// Loads the station list from `source`.
    pub fn open(source: S) -> Result<Self, StreamflowError> {
        let stations = source.load_stations()?;
        info!(stations = stations.len(), "station directory loaded");
        Ok(Self {
            source,
            stations,
            loaded_at: Utc::now(),
        })
    }

    /// Reloads from the source, returning the new station count. On error
    /// the previous list is kept.
    pub fn refresh(&mut self) -> Result<usize, StreamflowError> {
        let stations = self.source.load_stations()?;
        info!(
            before = self.stations.len(),
            after = stations.len(),
            "station directory refreshed"
        );
        self.stations = stations;
        self.loaded_at = Utc::now();
        Ok(self.stations.len())
    }

    pub fn list(&self) -> &[Station] {
        &self.stations
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Looks up a station by abbreviation, ignoring case.
    pub fn find(&self, abbrev: &str) -> Option<&Station> {
        let abbrev = abbrev.trim();
        self.stations
            .iter()
            .find(|s| s.abbrev.eq_ignore_ascii_case(abbrev))
    }

    /// Resolves a free-text query to a station.
    ///
    /// An exact abbreviation wins; otherwise the first station whose name
    /// contains the query (case-insensitive) in directory order.
    ///
    /// # Errors
    /// - `StreamflowError::StationNotFound` if nothing matches.
    pub fn lookup_station(&self, query: &str) -> Result<&Station, StreamflowError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(StreamflowError::StationNotFound(query.to_string()));
        }
        if let Some(station) = self.find(trimmed) {
            return Ok(station);
        }

        let needle = trimmed.to_lowercase();
        self.stations
            .iter()
            .find(|s| s.name.to_lowercase().contains(&needle))
            .ok_or_else(|| StreamflowError::StationNotFound(query.to_string()))
    }

    /// All stations whose name or abbreviation contains `query`.
    pub fn search(&self, query: &str) -> Vec<&Station> {
        let needle = query.trim().to_lowercase();
        self.stations
            .iter()
            .filter(|s| {
                s.name.to_lowercase().contains(&needle) || s.abbrev.to_lowercase().contains(&needle)
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
