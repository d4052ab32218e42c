//! Reverse geocoding of waypoint hints.
//!
//! A waypoint hint is only a coordinate. To find out which station it
//! marks, we ask a reverse geocoder for railway places (stations, stops,
//! halts) nearby, or for settlements when no railway place is found.
//!
//! Key characteristics:
//! - The geocoder is an external, rate-limited service; see [`RateLimited`]
//! - "Nothing found" is a normal answer, surfaced as `None`
//! - Failures after retries are logged and also surfaced as `None`

mod client;
mod error;
mod groups;
mod rate_limit;

use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

use crate::domain::Location;

pub use client::{GeocoderConfig, PhotonClient};
pub use error::GeocodeError;
pub use groups::{group_from_category, largest_group};
pub use rate_limit::{RateLimitConfig, RateLimited};

/// Place categories that identify railway stations.
pub const RAILWAY_CATEGORIES: &[&str] = &["stop", "station", "halt"];

/// Place categories used when no railway place is found.
pub const SETTLEMENT_CATEGORIES: &[&str] =
    &["city", "town", "borough", "hamlet", "village", "municipality"];

/// A place returned by the geocoder.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Display name; some places have none.
    pub name: Option<String>,
    /// Place category label (OSM value, e.g. "station").
    pub category: String,
    /// ISO 3166-1 alpha-2 code of the country the place is in.
    pub country_code: Option<String>,
    /// The place's identifier in the geocoder's source data (OSM id).
    pub external_id: u64,
    pub location: Location,
}

impl Candidate {
    /// Station group of this place's category.
    pub fn group(&self) -> Option<u8> {
        group_from_category(&self.category)
    }
}

/// One reverse geocoding request.
#[derive(Debug, Clone)]
pub struct ReverseQuery {
    pub location: Location,
    /// Maximum number of places to return.
    pub limit: u8,
    /// Only places in one of these categories are returned.
    pub categories: &'static [&'static str],
    pub language: Option<String>,
    pub timeout: Duration,
}

/// A reverse geocoding capability.
///
/// This abstraction allows resolution to be tested with canned answers.
pub trait ReverseGeocoder {
    /// Places near `query.location`, nearest first.
    ///
    /// Returns `Ok(None)` when the service has nothing to report.
    fn reverse(
        &self,
        query: &ReverseQuery,
    ) -> impl Future<Output = Result<Option<Vec<Candidate>>, GeocodeError>>;
}

/// Finds candidate stations for waypoint hints.
pub struct GeoMatcher<G> {
    geocoder: G,
    config: GeocoderConfig,
}

impl<G: ReverseGeocoder> GeoMatcher<G> {
    pub fn new(geocoder: G, config: GeocoderConfig) -> Self {
        Self { geocoder, config }
    }

    /// Places near `point`: railway places, or settlements if `want_settlements`.
    ///
    /// Returns `None` when the geocoder found nothing or kept failing.
    pub async fn find_candidates(
        &self,
        point: Location,
        want_settlements: bool,
    ) -> Option<Vec<Candidate>> {
        let query = ReverseQuery {
            location: point,
            limit: self.config.limit,
            categories: if want_settlements {
                SETTLEMENT_CATEGORIES
            } else {
                RAILWAY_CATEGORIES
            },
            language: self.config.language.clone(),
            timeout: self.config.timeout(),
        };

        let candidates = match self.geocoder.reverse(&query).await {
            Ok(Some(candidates)) if !candidates.is_empty() => candidates,
            Ok(_) => return None,
            Err(e) => {
                warn!(
                    lat = point.latitude,
                    lon = point.longitude,
                    error = %e,
                    "reverse geocoding failed"
                );
                return None;
            }
        };

        for candidate in candidates.iter().filter(|c| c.name.is_none()) {
            info!(
                external_id = candidate.external_id,
                category = %candidate.category,
                "candidate without name"
            );
        }

        Some(candidates)
    }

    /// Access the underlying geocoder.
    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }
}
