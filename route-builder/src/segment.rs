//! Cutting a GPS trace at the stations it passes.

use tracing::debug;

use crate::domain::{CodeWaypoint, Location, Positioned, Station};

/// Default distance (km) within which a trace point counts as passing a hint.
pub const STOP_RADIUS_KM: f64 = 0.08;

/// Points of a trace leading up to a station.
#[derive(Debug, Clone, PartialEq)]
pub struct Leg<'a, P> {
    /// Trace points since the previous cut, excluding the point at the station.
    pub points: &'a [P],
    pub station: Station,
}

/// A trace split at the stations it passes.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceSegmentation<'a, P> {
    /// One waypoint per matched station, in trace order.
    pub waypoints: Vec<CodeWaypoint>,
    /// One leg per matched station, in trace order.
    pub legs: Vec<Leg<'a, P>>,
    /// Points from the last cut to the end of the trace.
    pub trailing: &'a [P],
}

impl<'a, P: Positioned> TraceSegmentation<'a, P> {
    /// Number of trace pieces: every leg plus the trailing remainder.
    pub fn piece_count(&self) -> usize {
        self.legs.len() + 1
    }
}

/// Walk `points` once, cutting the trace wherever it passes a hinted station.
///
/// Distances accumulate geodesically from the first point. At each point the
/// remaining hints are tested in order and the first one within `radius_km`
/// is consumed, so every hint matches at most once. Hints the trace never
/// passes are dropped.
pub fn segment<'a, P: Positioned>(
    points: &'a [P],
    mut hints: Vec<(Location, Station)>,
    radius_km: f64,
) -> TraceSegmentation<'a, P> {
    let mut waypoints = Vec::new();
    let mut legs = Vec::new();
    let mut distance = 0.0;
    let mut previous: Option<Location> = None;
    let mut last_cut = 0;

    for (index, point) in points.iter().enumerate() {
        let here = point.location();
        if let Some(previous) = previous {
            distance += previous.distance_km(&here);
        }
        previous = Some(here);

        let Some(hit) = hints
            .iter()
            .position(|(hint, _)| hint.distance_km(&here) < radius_km)
        else {
            continue;
        };

        let (_, station) = hints.remove(hit);
        debug!(
            code = %station.primary_code(),
            distance_km = distance,
            index,
            "trace passes station"
        );
        waypoints.push(CodeWaypoint::new(
            distance,
            station.primary_code().clone(),
            true,
        ));
        legs.push(Leg {
            points: &points[last_cut..index],
            station,
        });
        last_cut = index;
    }

    for (hint, station) in &hints {
        debug!(
            code = %station.primary_code(),
            lat = hint.latitude,
            lon = hint.longitude,
            "trace never passes hinted station"
        );
    }

    TraceSegmentation {
        waypoints,
        legs,
        trailing: &points[last_cut..],
    }
}
