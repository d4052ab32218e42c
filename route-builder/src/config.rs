//! Reconstruction settings.

use std::str::FromStr;

use crate::geocode::{GeocoderConfig, RateLimitConfig};
use crate::segment::STOP_RADIUS_KM;

/// Parameters of one reconstruction run.
#[derive(Debug, Clone)]
pub struct ReconstructionConfig {
    /// Query settlements when no railway place is found near a waypoint.
    /// When off, such waypoints are dropped.
    pub fallback_to_settlement: bool,

    /// Distance (km) within which a trace point passes a station hint.
    pub stop_radius_km: f64,

    /// Maximum deviation (km) of dropped points when simplifying legs.
    pub simplify_tolerance_km: f64,
}

impl ReconstructionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settlement_fallback(mut self, enabled: bool) -> Self {
        self.fallback_to_settlement = enabled;
        self
    }

    pub fn with_stop_radius(mut self, km: f64) -> Self {
        self.stop_radius_km = km;
        self
    }

    pub fn with_simplify_tolerance(mut self, km: f64) -> Self {
        self.simplify_tolerance_km = km;
        self
    }
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            fallback_to_settlement: false,
            stop_radius_km: STOP_RADIUS_KM,
            simplify_tolerance_km: 0.01, // 10 m
        }
    }
}

/// Error for an environment variable that is set but can't be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value {value:?} for {key}")]
pub struct SettingsError {
    pub key: &'static str,
    pub value: String,
}

/// Everything the binary needs to run.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub geocoder: GeocoderConfig,
    pub rate_limit: RateLimitConfig,
    pub reconstruction: ReconstructionConfig,
}

impl Settings {
    /// Read settings from the process environment.
    ///
    /// Recognized variables: `PHOTON_URL`, `GEOCODER_LANGUAGE`,
    /// `FALLBACK_TO_SETTLEMENT` and `SIMPLIFY_TOLERANCE_KM`. Unset
    /// variables keep their defaults.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings from an arbitrary key-value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let mut settings = Self::default();

        if let Some(url) = lookup("PHOTON_URL") {
            settings.geocoder = settings.geocoder.with_base_url(url);
        }
        if let Some(language) = lookup("GEOCODER_LANGUAGE") {
            settings.geocoder = settings.geocoder.with_language(language);
        }
        if let Some(enabled) = parse_var::<bool>(&lookup, "FALLBACK_TO_SETTLEMENT")? {
            settings.reconstruction.fallback_to_settlement = enabled;
        }
        if let Some(km) = parse_var::<f64>(&lookup, "SIMPLIFY_TOLERANCE_KM")? {
            if !km.is_finite() || km < 0.0 {
                return Err(SettingsError {
                    key: "SIMPLIFY_TOLERANCE_KM",
                    value: km.to_string(),
                });
            }
            settings.reconstruction.simplify_tolerance_km = km;
        }

        Ok(settings)
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, SettingsError> {
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| SettingsError { key, value }),
    }
}
