//! Track lookup for a single hop between two waypoints.

use std::collections::HashMap;

use tracing::warn;

use crate::catalog::StationCatalog;
use crate::domain::{CodeWaypoint, Path, PathCatalog, StationCode, Track, TrackKind};

/// Finds the tracks between consecutive waypoints.
///
/// Remembers the last track it resolved on every route, which seeds the
/// attributes of synthesized tracks later in the same assembly.
pub struct TrackSegmentResolver<'a> {
    stations: &'a StationCatalog,
    paths: &'a PathCatalog,
    last_resolved: HashMap<u32, Track>,
}

impl<'a> TrackSegmentResolver<'a> {
    pub fn new(stations: &'a StationCatalog, paths: &'a PathCatalog) -> Self {
        Self {
            stations,
            paths,
            last_resolved: HashMap::new(),
        }
    }

    /// Tracks used from `from` to `to`. Never empty.
    ///
    /// Falls back, in order, to:
    /// - a synthesized track when kilometre positions are missing or no
    ///   catalogued track covers the hop
    /// - an unknown placeholder when the route itself is missing
    pub fn resolve_hop(&mut self, from: &CodeWaypoint, to: &CodeWaypoint) -> Vec<Track> {
        let Some(route_number) = from.next_route_number else {
            warn!(from = %from.code, to = %to.code, "hop has no route number");
            return vec![Track::unknown(Track::NO_ROUTE)];
        };

        let Some(path) = self.paths.get(route_number) else {
            warn!(
                route_number,
                from = %from.code,
                to = %to.code,
                "unknown route number, cannot tell electrification or track kind"
            );
            return vec![Track::unknown(route_number)];
        };

        let from_km = self.km_of(&from.code, route_number);
        let to_km = self.km_of(&to.code, route_number);

        if let (Some(a), Some(b)) = (from_km, to_km) {
            let (start, end) = (a.min(b), a.max(b));
            let tracks: Vec<Track> = path
                .tracks
                .iter()
                .filter(|t| t.overlaps(start, end))
                .cloned()
                .collect();

            if let Some(last) = tracks.last() {
                self.last_resolved.insert(route_number, last.clone());
                return tracks;
            }
            warn!(route_number, start, end, "no catalogued track covers hop");
        }

        vec![self.synthesize(path, from, to, to_km.or(from_km))]
    }

    fn km_of(&self, code: &StationCode, route_number: u32) -> Option<f64> {
        let Some(station) = self.stations.by_code(code) else {
            warn!(%code, "waypoint station not in catalog");
            return None;
        };
        station.km_on_route(route_number)
    }

    fn synthesize(
        &self,
        path: &Path,
        from: &CodeWaypoint,
        to: &CodeWaypoint,
        to_km: Option<f64>,
    ) -> Track {
        let route_number = path.route_number;
        warn!(
            route_number,
            from = %from.code,
            to = %to.code,
            "cannot place hop on a track, carrying over attributes"
        );

        let last = self.last_resolved.get(&route_number);
        let (electrified, kind) = match last {
            Some(track) => (track.electrified, track.kind),
            None => {
                warn!(route_number, "no track resolved on this route yet, using route median");
                (
                    path.median_electrified().unwrap_or(false),
                    path.median_kind().unwrap_or(TrackKind::Unknown),
                )
            }
        };

        Track {
            route_number,
            electrified,
            kind,
            from_km: last.and_then(|t| t.to_km),
            to_km,
            length: 0.0,
        }
    }
}
