//! Route assembly from an ordered list of station codes.
//!
//! Every pair of consecutive waypoints becomes one hop, and every hop gets
//! at least one track. Gaps in the track data never abort assembly: they
//! degrade to synthesized or placeholder tracks and are logged at warn.

mod tracks;

use tracing::debug;

use crate::catalog::StationCatalog;
use crate::domain::{CodeWaypoint, PathCatalog, Route};

pub use tracks::TrackSegmentResolver;

/// Assemble a route along `waypoints`.
///
/// Yields one hop per consecutive waypoint pair; a single waypoint (or none)
/// yields a route without hops.
pub fn assemble(waypoints: &[CodeWaypoint], stations: &StationCatalog, paths: &PathCatalog) -> Route {
    let mut resolver = TrackSegmentResolver::new(stations, paths);

    let hops = waypoints
        .windows(2)
        .map(|pair| resolver.resolve_hop(&pair[0], &pair[1]))
        .collect::<Vec<_>>();

    debug!(
        waypoints = waypoints.len(),
        hops = hops.len(),
        tracks = hops.iter().map(Vec::len).sum::<usize>(),
        "assembled route"
    );

    Route::from_parts(waypoints.to_vec(), hops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CodeTuple, PathLocation, Station, StationCode, Track, TrackKind};

    fn code(s: &str) -> StationCode {
        StationCode::parse(s).unwrap()
    }

    fn station(c: &str, positions: &[(u32, f64)]) -> Station {
        let mut station = Station::new(c, 1, CodeTuple::single(code(c)));
        station.path_locations = positions
            .iter()
            .map(|(route, km)| PathLocation::new(*route, *km))
            .collect();
        station
    }

    fn track(route: u32, from: f64, to: f64, electrified: bool, kind: TrackKind) -> Track {
        Track {
            route_number: route,
            electrified,
            kind,
            from_km: Some(from),
            to_km: Some(to),
            length: to - from,
        }
    }

    fn wp(km: f64, c: &str, route: Option<u32>) -> CodeWaypoint {
        let w = CodeWaypoint::new(km, code(c), true);
        match route {
            Some(r) => w.with_next_route(r),
            None => w,
        }
    }

    #[test]
    fn two_stations_on_one_route() {
        let stations =
            StationCatalog::from_stations(vec![station("A", &[(100, 5.0)]), station("B", &[(100, 12.0)])])
                .unwrap();
        let paths = PathCatalog::from_tracks(vec![
            track(100, 0.0, 6.0, true, TrackKind::Main),
            track(100, 6.0, 10.0, true, TrackKind::Main),
            track(100, 10.0, 15.0, true, TrackKind::Main),
        ]);

        let route = assemble(&[wp(0.0, "A", Some(100)), wp(7.0, "B", None)], &stations, &paths);

        assert_eq!(route.hops().len(), 1);
        assert_eq!(route.hops()[0].len(), 3);
        assert_eq!(route.track_length(), 15.0);
    }

    #[test]
    fn unknown_route_number() {
        let stations =
            StationCatalog::from_stations(vec![station("A", &[]), station("B", &[])]).unwrap();

        let route = assemble(
            &[wp(0.0, "A", Some(999)), wp(3.0, "B", None)],
            &stations,
            &PathCatalog::new(),
        );

        assert_eq!(route.hops(), &[vec![Track::unknown(999)]]);
    }

    #[test]
    fn single_waypoint_has_no_hops() {
        let route = assemble(&[wp(0.0, "A", Some(1))], &StationCatalog::new(), &PathCatalog::new());
        assert_eq!(route.waypoints().len(), 1);
        assert!(route.hops().is_empty());
    }

    #[test]
    fn no_waypoints() {
        let route = assemble(&[], &StationCatalog::new(), &PathCatalog::new());
        assert!(route.waypoints().is_empty());
        assert!(route.hops().is_empty());
    }

    #[test]
    fn last_track_carries_across_hops() {
        let stations = StationCatalog::from_stations(vec![
            station("A", &[(1, 0.0)]),
            station("B", &[(1, 4.0), (2, 0.0)]),
            station("C", &[(2, 3.0)]),
            station("D", &[]),
        ])
        .unwrap();
        let paths = PathCatalog::from_tracks(vec![
            track(1, 0.0, 2.0, false, TrackKind::Branch),
            track(1, 2.0, 5.0, true, TrackKind::Suburban),
            track(1, 5.0, 9.0, false, TrackKind::Branch),
            track(2, 0.0, 3.0, false, TrackKind::Main),
        ]);

        // Route 1 is left for route 2 in between, then rejoined without km data
        let route = assemble(
            &[
                wp(0.0, "A", Some(1)),
                wp(4.0, "B", Some(2)),
                wp(7.0, "C", Some(1)),
                wp(9.0, "D", None),
            ],
            &stations,
            &paths,
        );

        assert_eq!(route.hops().len(), 3);
        let last = &route.hops()[2];
        assert_eq!(last.len(), 1);
        assert!(last[0].electrified);
        assert_eq!(last[0].kind, TrackKind::Suburban);
        assert_eq!(last[0].from_km, Some(5.0));
        assert_eq!(last[0].to_km, None);
    }

    #[test]
    fn waypoints_are_kept_in_order() {
        let stations = StationCatalog::from_stations(vec![station("A", &[]), station("B", &[])]).unwrap();
        let waypoints = vec![wp(0.0, "A", None), wp(1.0, "B", None), wp(2.0, "A", None)];

        let route = assemble(&waypoints, &stations, &PathCatalog::new());

        assert_eq!(route.waypoints(), waypoints.as_slice());
        assert_eq!(route.hops().len(), 2);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::{CodeTuple, PathLocation, Station, StationCode, Track, TrackKind};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn one_nonempty_hop_per_pair(
            stops in prop::collection::vec(
                (0usize..5, prop::option::of(1u32..5)),
                0..15,
            ),
            kms in prop::collection::vec(prop::option::of(0.0f64..30.0), 5),
        ) {
            let stations = StationCatalog::from_stations((0..5).map(|i| {
                let code = StationCode::parse(&format!("S{i}")).unwrap();
                let mut station = Station::new(format!("S{i}"), i as u64, CodeTuple::single(code));
                if let Some(km) = kms[i] {
                    station.path_locations = (1..4).map(|r| PathLocation::new(r, km)).collect();
                }
                station
            }))
            .unwrap();
            // Route 4 is never catalogued
            let paths = PathCatalog::from_tracks((1..4).flat_map(|r| {
                [
                    Track { route_number: r, electrified: true, kind: TrackKind::Main,
                            from_km: Some(0.0), to_km: Some(10.0), length: 10.0 },
                    Track { route_number: r, electrified: false, kind: TrackKind::Branch,
                            from_km: Some(10.0), to_km: Some(20.0), length: 10.0 },
                ]
            }));
            let waypoints: Vec<CodeWaypoint> = stops
                .iter()
                .enumerate()
                .map(|(i, (s, route))| CodeWaypoint {
                    distance_from_start: i as f64,
                    code: StationCode::parse(&format!("S{s}")).unwrap(),
                    is_stop: true,
                    next_route_number: *route,
                })
                .collect();

            let route = assemble(&waypoints, &stations, &paths);

            prop_assert_eq!(route.hops().len(), waypoints.len().saturating_sub(1));
            prop_assert!(route.hops().iter().all(|hop| !hop.is_empty()));
        }
    }
}
