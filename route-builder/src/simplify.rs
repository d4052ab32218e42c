//! Polyline simplification for trace legs.
//!
//! Douglas–Peucker over latitude/longitude, but with the deviation test done
//! in kilometres: the planar perpendicular distance (in degrees) is scaled by
//! the ratio of geodesic to planar length of the chord being tested. The
//! scale is recomputed for every chord, so it only has to hold locally.

use tracing::trace;

use crate::domain::{Location, Positioned};

/// Chord length (km) up to which the local linear scale is a sound
/// approximation of geodesic distance. Longer chords still work but the
/// measured deviation drifts, mostly in longitude at high latitudes.
pub const LINEARIZATION_RADIUS_KM: f64 = 50.0;

/// Simplify `points`, dropping every point that deviates from its chord by
/// at most `tolerance_km`.
///
/// The first and last points are always kept and order is preserved. With a
/// tolerance of zero only points lying exactly on their chord are dropped.
///
/// ```
/// use route_builder::domain::Location;
/// use route_builder::simplify::simplify;
///
/// let line = [
///     Location::new(52.0, 13.0),
///     Location::new(52.0, 13.1),
///     Location::new(52.0, 13.2),
/// ];
/// let kept: Vec<_> = simplify(&line, 0.1).collect();
/// assert_eq!(kept, vec![&line[0], &line[2]]);
/// ```
pub fn simplify<P: Positioned>(points: &[P], tolerance_km: f64) -> impl Iterator<Item = &P> {
    let keep = keep_mask(points, tolerance_km);
    points
        .iter()
        .zip(keep)
        .filter_map(|(point, keep)| keep.then_some(point))
}

/// Which points survive simplification.
fn keep_mask<P: Positioned>(points: &[P], tolerance_km: f64) -> Vec<bool> {
    let mut keep = vec![true; points.len()];
    if points.len() < 3 {
        return keep;
    }

    let locations: Vec<Location> = points.iter().map(Positioned::location).collect();
    let mut pending = vec![(0, locations.len() - 1)];

    while let Some((first, last)) = pending.pop() {
        if last - first < 2 {
            continue;
        }

        let chord = Chord::new(locations[first], locations[last]);
        let (farthest, deviation) = (first + 1..last)
            .map(|i| (i, chord.deviation_km(&locations[i])))
            .fold((first + 1, f64::NEG_INFINITY), |best, candidate| {
                if candidate.1 > best.1 { candidate } else { best }
            });

        if deviation > tolerance_km {
            pending.push((first, farthest));
            pending.push((farthest, last));
        } else {
            keep[first + 1..last].fill(false);
        }
    }

    keep
}

/// A straight segment between two kept points, with its local km scale.
struct Chord {
    start: Location,
    end: Location,
    planar_length: f64,
    km_per_degree: f64,
}

impl Chord {
    fn new(start: Location, end: Location) -> Self {
        let planar_length = start.planar_distance(&end);
        let geodesic_length = start.distance_km(&end);

        if geodesic_length > LINEARIZATION_RADIUS_KM {
            trace!(
                length_km = geodesic_length,
                limit_km = LINEARIZATION_RADIUS_KM,
                "chord exceeds linearization radius"
            );
        }

        let km_per_degree = if planar_length > 0.0 {
            geodesic_length / planar_length
        } else {
            0.0
        };

        Self {
            start,
            end,
            planar_length,
            km_per_degree,
        }
    }

    /// Distance (km) of `point` from the line through the chord.
    fn deviation_km(&self, point: &Location) -> f64 {
        if self.planar_length == 0.0 {
            // Closed loop: measure from the shared endpoint
            return self.start.distance_km(point);
        }

        let (x0, y0) = (point.latitude, point.longitude);
        let (x1, y1) = (self.start.latitude, self.start.longitude);
        let (x2, y2) = (self.end.latitude, self.end.longitude);

        let cross = (x2 - x1) * (y1 - y0) - (x1 - x0) * (y2 - y1);
        let planar = cross.abs() / self.planar_length;

        planar * self.km_per_degree
    }
}
