//! Photon reverse geocoding client.
//!
//! Talks to a Photon-compatible `/reverse` endpoint, which answers with a
//! GeoJSON feature collection of OpenStreetMap places around a point.

use std::time::Duration;

use serde::Deserialize;

use crate::domain::Location;

use super::error::GeocodeError;
use super::{Candidate, ReverseGeocoder, ReverseQuery};

/// Default base URL for the public Photon instance.
const DEFAULT_BASE_URL: &str = "https://photon.komoot.io";

/// Default number of places to request per lookup.
const DEFAULT_LIMIT: u8 = 6;

/// Configuration for the geocoder.
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    /// Base URL of the Photon instance
    pub base_url: String,
    /// Maximum number of nearby places per lookup
    pub limit: u8,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Preferred language for place names; `None` uses the local name
    pub language: Option<String>,
}

impl GeocoderConfig {
    /// Create a config pointing at the public Photon instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom base URL (for self-hosted instances or tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the language used for place names.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Set the number of places requested per lookup.
    pub fn with_limit(mut self, limit: u8) -> Self {
        self.limit = limit;
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            limit: DEFAULT_LIMIT,
            timeout_secs: 10,
            language: None,
        }
    }
}

/// GeoJSON feature collection returned by Photon.
#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Geometry,
    properties: Properties,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    /// `[longitude, latitude]`
    coordinates: [f64; 2],
}

#[derive(Debug, Deserialize)]
struct Properties {
    osm_id: u64,
    osm_value: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    countrycode: Option<String>,
}

impl From<Feature> for Candidate {
    fn from(feature: Feature) -> Self {
        let [longitude, latitude] = feature.geometry.coordinates;
        Candidate {
            name: feature.properties.name,
            category: feature.properties.osm_value,
            country_code: feature.properties.countrycode,
            external_id: feature.properties.osm_id,
            location: Location::new(latitude, longitude),
        }
    }
}

/// Parse a Photon response body into candidates.
///
/// An empty feature collection means "nothing found" and yields `None`.
fn parse_response(body: &str) -> Result<Option<Vec<Candidate>>, GeocodeError> {
    let collection: FeatureCollection =
        serde_json::from_str(body).map_err(|e| GeocodeError::Json {
            message: e.to_string(),
        })?;

    if collection.features.is_empty() {
        return Ok(None);
    }

    Ok(Some(
        collection.features.into_iter().map(Candidate::from).collect(),
    ))
}

/// Client for a Photon reverse geocoding service.
#[derive(Debug, Clone)]
pub struct PhotonClient {
    http: reqwest::Client,
    base_url: String,
}

impl PhotonClient {
    /// Create a new Photon client.
    pub fn new(config: &GeocoderConfig) -> Result<Self, GeocodeError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("route-builder/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn query_params(query: &ReverseQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("lat", query.location.latitude.to_string()),
            ("lon", query.location.longitude.to_string()),
            ("limit", query.limit.to_string()),
        ];
        if let Some(language) = &query.language {
            params.push(("lang", language.clone()));
        }
        // ":value" matches the value under any OSM key
        for category in query.categories {
            params.push(("osm_tag", format!(":{category}")));
        }
        params
    }
}

impl ReverseGeocoder for PhotonClient {
    async fn reverse(&self, query: &ReverseQuery) -> Result<Option<Vec<Candidate>>, GeocodeError> {
        let url = format!("{}/reverse", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&Self::query_params(query))
            .timeout(query.timeout)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeocodeError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        parse_response(&body)
    }
}
