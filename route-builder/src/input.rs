//! Loading a reconstruction job from disk.
//!
//! A job is one JSON document holding the catalogs and the trace:
//!
//! ```json
//! {
//!   "stations": [{"name": "Ulm Hbf", "number": 8000170, "codes": ["🇩🇪TU"]}],
//!   "tracks": [{"route_number": 4700, "electrified": true, "kind": "main",
//!               "from_km": 0.0, "to_km": 6.1, "length": 6.1}],
//!   "trace": [{"latitude": 48.39, "longitude": 9.98}],
//!   "hints": [{"latitude": 48.39, "longitude": 9.98}],
//!   "waypoints": [{"distance_from_start": 0.0, "code": "🇩🇪TU",
//!                  "is_stop": true, "next_route_number": 4700}]
//! }
//! ```
//!
//! Everything except `stations` may be omitted.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::catalog::{CatalogError, StationCatalog};
use crate::domain::{CodeWaypoint, PathCatalog, Station, TracePoint, Track, WaypointHint};

/// Errors loading a job.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// A reconstruction job as stored on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct InputBundle {
    pub stations: Vec<Station>,
    #[serde(default)]
    pub tracks: Vec<Track>,
    #[serde(default)]
    pub trace: Vec<TracePoint>,
    #[serde(default)]
    pub hints: Vec<WaypointHint>,
    /// Station codes to assemble a route along, with route numbers per hop.
    #[serde(default)]
    pub waypoints: Option<Vec<CodeWaypoint>>,
}

impl InputBundle {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| InputError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| InputError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Split into the catalogs and the trace.
    ///
    /// Fails if two stations share a code.
    pub fn into_parts(self) -> Result<Parts, InputError> {
        Ok(Parts {
            stations: StationCatalog::from_stations(self.stations)?,
            paths: PathCatalog::from_tracks(self.tracks),
            trace: self.trace,
            hints: self.hints,
            waypoints: self.waypoints,
        })
    }
}

/// A loaded job, ready to run.
#[derive(Debug)]
pub struct Parts {
    pub stations: StationCatalog,
    pub paths: PathCatalog,
    pub trace: Vec<TracePoint>,
    pub hints: Vec<WaypointHint>,
    pub waypoints: Option<Vec<CodeWaypoint>>,
}
