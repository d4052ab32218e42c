//! Domain types for route reconstruction.
//!
//! This module contains the core value types: locations, stations, tracks
//! and routes. Types with invariants enforce them at construction time, so
//! code that receives them can trust their validity.

mod country;
mod error;
mod location;
mod route;
mod station;
mod track;

pub use country::{Country, InvalidCountryCode};
pub use error::DomainError;
pub use location::{Location, Positioned, TracePoint, WaypointHint};
pub use route::{CodeWaypoint, Route};
pub use station::{
    CodeTuple, InvalidStationCode, MAX_CODE_BYTES, PathLocation, Station, StationCode,
    StationKind,
};
pub use track::{Path, PathCatalog, Track, TrackKind, median_high};
