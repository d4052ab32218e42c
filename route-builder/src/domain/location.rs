//! Geographic positions.

use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use geo::{Distance, Geodesic, Point};
use serde::{Deserialize, Serialize};

/// A point on the earth's surface in decimal degrees (WGS84).
///
/// Equality and hashing compare the raw coordinate values, so two locations
/// are the same key only if they were built from identical floats.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Geodesic distance to `other` in kilometres.
    pub fn distance_km(&self, other: &Location) -> f64 {
        Geodesic.distance(self.to_point(), other.to_point()) / 1000.0
    }

    /// Planar distance in degree space, treating (lat, lon) as Cartesian.
    pub fn planar_distance(&self, other: &Location) -> f64 {
        (self.latitude - other.latitude).hypot(self.longitude - other.longitude)
    }

    /// OpenStreetMap link for eyeballing a location while debugging data.
    pub fn osm_url(&self) -> String {
        format!(
            "https://openstreetmap.org/#map=17/{}/{}&layers=T",
            self.latitude, self.longitude
        )
    }

    fn to_point(self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.latitude.to_bits() == other.latitude.to_bits()
            && self.longitude.to_bits() == other.longitude.to_bits()
    }
}

impl Eq for Location {}

impl Hash for Location {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.latitude.to_bits().hash(state);
        self.longitude.to_bits().hash(state);
    }
}

/// Anything that sits at a single geographic position.
pub trait Positioned {
    fn location(&self) -> Location;
}

impl Positioned for Location {
    fn location(&self) -> Location {
        *self
    }
}

/// One sample of a recorded GPS trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TracePoint {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
}

impl TracePoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation: None,
            time: None,
        }
    }
}

impl Positioned for TracePoint {
    fn location(&self) -> Location {
        Location::new(self.latitude, self.longitude)
    }
}

/// A raw waypoint marker from a trace annotation.
///
/// The hint only says "there is a station somewhere around here"; its
/// identity is established by reverse geocoding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaypointHint {
    pub latitude: f64,
    pub longitude: f64,
}

impl WaypointHint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl Positioned for WaypointHint {
    fn location(&self) -> Location {
        Location::new(self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn distance_to_self_is_zero() {
        let berlin = Location::new(52.5251, 13.3694);
        assert_eq!(berlin.distance_km(&berlin), 0.0);
    }

    #[test]
    fn distance_berlin_hamburg() {
        let berlin = Location::new(52.5251, 13.3694);
        let hamburg = Location::new(53.5530, 10.0069);
        let d = berlin.distance_km(&hamburg);
        // Roughly 255 km as the crow flies
        assert!((250.0..260.0).contains(&d), "got {d}");
    }

    #[test]
    fn one_degree_of_latitude() {
        let a = Location::new(50.0, 8.0);
        let b = Location::new(51.0, 8.0);
        let d = a.distance_km(&b);
        assert!((111.0..111.5).contains(&d), "got {d}");
    }

    #[test]
    fn planar_distance_is_euclidean_in_degrees() {
        let a = Location::new(0.0, 0.0);
        let b = Location::new(3.0, 4.0);
        assert_eq!(a.planar_distance(&b), 5.0);
    }

    #[test]
    fn hash_consistent_with_eq() {
        let mut set = HashSet::new();
        set.insert(Location::new(48.1, 11.5));
        assert!(set.contains(&Location::new(48.1, 11.5)));
        assert!(!set.contains(&Location::new(48.1, 11.6)));
    }

    #[test]
    fn trace_point_location() {
        let p = TracePoint::new(47.0, 7.5);
        assert_eq!(p.location(), Location::new(47.0, 7.5));
    }
}
