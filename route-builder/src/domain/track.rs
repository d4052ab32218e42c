//! Physical track segments and the lines they make up.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Classification of a line segment.
///
/// The ordering is meaningful: the median-high fallback picks a kind by
/// sorting, so variants are declared from least to most significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    /// No usable classification.
    Unknown,
    /// Branch line ("Nebenbahn").
    Branch,
    /// Main line ("Hauptbahn").
    Main,
    /// Dedicated suburban line (S-Bahn).
    Suburban,
    /// High-speed line.
    HighSpeed,
}

/// One physical segment of a line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub route_number: u32,
    pub electrified: bool,
    pub kind: TrackKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_km: Option<f64>,
    /// Length in kilometres. Synthesized tracks have length zero.
    pub length: f64,
}

impl Track {
    /// Route number reserved for placeholders of hops that have no route.
    ///
    /// No catalogued line uses it: [`PathCatalog::from_tracks`] drops
    /// segments that claim it.
    pub const NO_ROUTE: u32 = 0;

    /// Placeholder for a hop whose route number is missing or unknown.
    ///
    /// Pass [`Track::NO_ROUTE`] when the hop has no route number at all.
    pub fn unknown(route_number: u32) -> Self {
        Self {
            route_number,
            electrified: false,
            kind: TrackKind::Unknown,
            from_km: None,
            to_km: None,
            length: 0.0,
        }
    }

    /// Whether this track belongs to an actual route.
    pub fn has_route(&self) -> bool {
        self.route_number != Self::NO_ROUTE
    }

    /// Kilometre bounds ordered so that the first is not greater than the second.
    ///
    /// A segment with one bound missing is treated as a point at the other.
    pub fn km_bounds(&self) -> Option<(f64, f64)> {
        match (self.from_km, self.to_km) {
            (Some(a), Some(b)) => Some((a.min(b), a.max(b))),
            (Some(a), None) | (None, Some(a)) => Some((a, a)),
            (None, None) => None,
        }
    }

    /// Whether this segment shares at least one kilometre with `[start, end]`.
    ///
    /// Both intervals are closed, so touching at an endpoint counts.
    pub fn overlaps(&self, start: f64, end: f64) -> bool {
        match self.km_bounds() {
            Some((from, to)) => from <= end && to >= start,
            None => false,
        }
    }
}

/// All segments of one route number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub route_number: u32,
    pub tracks: Vec<Track>,
}

impl Path {
    pub fn new(route_number: u32, tracks: Vec<Track>) -> Self {
        Self {
            route_number,
            tracks,
        }
    }

    /// Median-high electrification over all segments of the line.
    pub fn median_electrified(&self) -> Option<bool> {
        median_high(self.tracks.iter().map(|t| t.electrified))
    }

    /// Median-high track kind over all segments of the line.
    pub fn median_kind(&self) -> Option<TrackKind> {
        median_high(self.tracks.iter().map(|t| t.kind))
    }
}

/// The upper median of a sequence: the element at index `n / 2` once sorted.
///
/// For booleans this is `true` exactly when at least half of the values are.
pub fn median_high<T: Ord>(values: impl IntoIterator<Item = T>) -> Option<T> {
    let mut values: Vec<T> = values.into_iter().collect();
    if values.is_empty() {
        return None;
    }
    values.sort();
    let mid = values.len() / 2;
    values.into_iter().nth(mid)
}

/// Lookup from route number to its [`Path`].
#[derive(Debug, Clone, Default)]
pub struct PathCatalog {
    paths: HashMap<u32, Path>,
}

impl PathCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group a flat list of segments into one path per route number.
    ///
    /// Segments within a path are ordered by their lower kilometre bound;
    /// segments without any bound keep their relative order at the end.
    /// Segments on [`Track::NO_ROUTE`] are dropped.
    pub fn from_tracks(tracks: impl IntoIterator<Item = Track>) -> Self {
        let mut by_route: HashMap<u32, Vec<Track>> = HashMap::new();
        for track in tracks {
            if !track.has_route() {
                warn!(?track, "track has the reserved route number, dropping it");
                continue;
            }
            by_route.entry(track.route_number).or_default().push(track);
        }

        let paths = by_route
            .into_iter()
            .map(|(route_number, mut tracks)| {
                tracks.sort_by(|a, b| {
                    let a = a.km_bounds().map_or(f64::INFINITY, |(from, _)| from);
                    let b = b.km_bounds().map_or(f64::INFINITY, |(from, _)| from);
                    a.total_cmp(&b)
                });
                (route_number, Path::new(route_number, tracks))
            })
            .collect();

        Self { paths }
    }

    /// Add or replace the path for its route number.
    pub fn insert(&mut self, path: Path) -> Option<Path> {
        self.paths.insert(path.route_number, path)
    }

    pub fn get(&self, route_number: u32) -> Option<&Path> {
        self.paths.get(&route_number)
    }

    pub fn contains(&self, route_number: u32) -> bool {
        self.paths.contains_key(&route_number)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl FromIterator<Path> for PathCatalog {
    fn from_iter<I: IntoIterator<Item = Path>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().map(|p| (p.route_number, p)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn median_high_picks_upper_middle() {
        assert_eq!(median_high([1, 3, 2]), Some(2));
        assert_eq!(median_high([1, 2, 3, 4]), Some(3));
        assert_eq!(median_high(Vec::<i32>::new()), None);
    }

    #[test]
    fn median_high_bools_ties_go_true() {
        assert_eq!(median_high([true, false]), Some(true));
        assert_eq!(median_high([true, false, false]), Some(false));
        assert_eq!(median_high([true, true, false]), Some(true));
    }

    #[test]
    fn path_medians() {
        let path = Path::new(
            4000,
            vec![
                track(4000, 0.0, 5.0, true, TrackKind::Main),
                track(4000, 5.0, 9.0, true, TrackKind::HighSpeed),
                track(4000, 9.0, 12.0, false, TrackKind::Main),
            ],
        );
        assert_eq!(path.median_electrified(), Some(true));
        assert_eq!(path.median_kind(), Some(TrackKind::Main));
    }

    #[test]
    fn overlap_is_inclusive() {
        let t = track(1, 6.0, 10.0, true, TrackKind::Main);
        assert!(t.overlaps(10.0, 12.0));
        assert!(t.overlaps(0.0, 6.0));
        assert!(t.overlaps(7.0, 8.0));
        assert!(!t.overlaps(10.5, 12.0));
    }

    #[test]
    fn overlap_normalizes_reversed_bounds() {
        let t = track(1, 10.0, 6.0, true, TrackKind::Main);
        assert_eq!(t.km_bounds(), Some((6.0, 10.0)));
        assert!(t.overlaps(7.0, 8.0));
    }

    #[test]
    fn track_without_bounds_never_overlaps() {
        assert!(!Track::unknown(1).overlaps(0.0, 100.0));
    }

    #[test]
    fn reserved_route_is_never_catalogued() {
        let catalog = PathCatalog::from_tracks(vec![
            track(Track::NO_ROUTE, 0.0, 5.0, true, TrackKind::Main),
            track(7, 0.0, 5.0, true, TrackKind::Main),
        ]);

        assert_eq!(catalog.len(), 1);
        assert!(!catalog.contains(Track::NO_ROUTE));
        assert!(!Track::unknown(Track::NO_ROUTE).has_route());
        assert!(Track::unknown(7).has_route());
    }

    #[test]
    fn from_tracks_groups_and_sorts() {
        let catalog = PathCatalog::from_tracks(vec![
            track(100, 10.0, 15.0, true, TrackKind::Main),
            track(200, 0.0, 3.0, false, TrackKind::Branch),
            track(100, 0.0, 6.0, true, TrackKind::Main),
            track(100, 6.0, 10.0, true, TrackKind::Main),
        ]);

        assert_eq!(catalog.len(), 2);
        let froms: Vec<f64> = catalog
            .get(100)
            .unwrap()
            .tracks
            .iter()
            .filter_map(|t| t.from_km)
            .collect();
        assert_eq!(froms, vec![0.0, 6.0, 10.0]);
        assert_eq!(catalog.get(200).unwrap().tracks.len(), 1);
        assert!(!catalog.contains(300));
    }
}
