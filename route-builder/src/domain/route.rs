//! Routes: ordered waypoints and the tracks between them.

use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::{StationCode, Track};

/// A station along a route, positioned by distance from the start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeWaypoint {
    /// Cumulative distance from the start of the route (km).
    pub distance_from_start: f64,
    pub code: StationCode,
    /// Whether the train is scheduled to stop here.
    pub is_stop: bool,
    /// Route number to follow to the next waypoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_route_number: Option<u32>,
}

impl CodeWaypoint {
    pub fn new(distance_from_start: f64, code: StationCode, is_stop: bool) -> Self {
        Self {
            distance_from_start,
            code,
            is_stop,
            next_route_number: None,
        }
    }

    /// Set the route number used for the hop leaving this waypoint.
    pub fn with_next_route(mut self, route_number: u32) -> Self {
        self.next_route_number = Some(route_number);
        self
    }
}

/// A fully assembled route.
///
/// Holds one non-empty track list per pair of consecutive waypoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    waypoints: Vec<CodeWaypoint>,
    hops: Vec<Vec<Track>>,
}

impl Route {
    /// Create a route, validating the hop structure.
    pub fn new(waypoints: Vec<CodeWaypoint>, hops: Vec<Vec<Track>>) -> Result<Self, DomainError> {
        let expected = waypoints.len().saturating_sub(1);
        if hops.len() != expected {
            return Err(DomainError::HopCountMismatch {
                waypoints: waypoints.len(),
                expected,
                actual: hops.len(),
            });
        }
        if let Some(idx) = hops.iter().position(Vec::is_empty) {
            return Err(DomainError::EmptyHop(idx));
        }
        Ok(Self { waypoints, hops })
    }

    /// Build a route whose hop structure the caller already guarantees.
    pub(crate) fn from_parts(waypoints: Vec<CodeWaypoint>, hops: Vec<Vec<Track>>) -> Self {
        debug_assert_eq!(hops.len(), waypoints.len().saturating_sub(1));
        debug_assert!(hops.iter().all(|hop| !hop.is_empty()));
        Self { waypoints, hops }
    }

    pub fn waypoints(&self) -> &[CodeWaypoint] {
        &self.waypoints
    }

    /// Tracks per hop; `hops()[i]` connects waypoint `i` to `i + 1`.
    pub fn hops(&self) -> &[Vec<Track>] {
        &self.hops
    }

    /// Iterate `(from, to, tracks)` for each hop.
    pub fn legs(&self) -> impl Iterator<Item = (&CodeWaypoint, &CodeWaypoint, &[Track])> {
        self.waypoints
            .windows(2)
            .zip(&self.hops)
            .map(|(pair, tracks)| (&pair[0], &pair[1], tracks.as_slice()))
    }

    /// Total length of all known segments (km).
    pub fn track_length(&self) -> f64 {
        self.hops.iter().flatten().map(|t| t.length).sum()
    }
}
