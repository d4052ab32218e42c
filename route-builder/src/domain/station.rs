//! Station records and station code types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Location;
use super::error::DomainError;

/// Maximum encoded length of a station code, in bytes.
pub const MAX_CODE_BYTES: usize = 20;

/// Error returned when a station code is invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station code {code:?}: {reason}")]
pub struct InvalidStationCode {
    code: String,
    reason: &'static str,
}

/// A station code, prefixed by the flag of the country it belongs to.
///
/// Codes are at most 20 bytes when UTF-8 encoded. Flags alone take 8 bytes,
/// so the limit is tighter than it looks.
///
/// # Examples
///
/// ```
/// use route_builder::domain::StationCode;
///
/// let code = StationCode::parse("🇩🇪FF").unwrap();
/// assert_eq!(code.as_str(), "🇩🇪FF");
///
/// // Empty codes are rejected
/// assert!(StationCode::parse("").is_err());
///
/// // So are codes longer than 20 bytes
/// assert!(StationCode::parse("🇩🇪O1234567890123").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StationCode(String);

impl StationCode {
    /// Parse a station code, enforcing the byte length limit.
    pub fn parse(s: &str) -> Result<Self, InvalidStationCode> {
        if s.is_empty() {
            return Err(InvalidStationCode {
                code: s.to_string(),
                reason: "must not be empty",
            });
        }

        if s.len() > MAX_CODE_BYTES {
            return Err(InvalidStationCode {
                code: s.to_string(),
                reason: "must be at most 20 bytes",
            });
        }

        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationCode({})", self.0)
    }
}

impl fmt::Display for StationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for StationCode {
    type Error = InvalidStationCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<StationCode> for String {
    fn from(code: StationCode) -> Self {
        code.0
    }
}

/// Non-empty, ordered tuple of unique station codes.
///
/// The first code is the station's primary code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<StationCode>", into = "Vec<StationCode>")]
pub struct CodeTuple(Vec<StationCode>);

impl CodeTuple {
    pub fn new(codes: Vec<StationCode>) -> Result<Self, DomainError> {
        if codes.is_empty() {
            return Err(DomainError::EmptyCodeTuple);
        }
        for (i, code) in codes.iter().enumerate() {
            if codes[..i].contains(code) {
                return Err(DomainError::DuplicateCode(code.clone()));
            }
        }
        Ok(Self(codes))
    }

    /// A tuple holding a single code.
    pub fn single(code: StationCode) -> Self {
        Self(vec![code])
    }

    pub fn primary(&self) -> &StationCode {
        &self.0[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &StationCode> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, code: &StationCode) -> bool {
        self.0.contains(code)
    }

    /// Append the codes of `other` that are not already present.
    pub fn union(&self, other: &CodeTuple) -> CodeTuple {
        let mut codes = self.0.clone();
        for code in other.iter() {
            if !codes.contains(code) {
                codes.push(code.clone());
            }
        }
        CodeTuple(codes)
    }
}

impl TryFrom<Vec<StationCode>> for CodeTuple {
    type Error = DomainError;

    fn try_from(value: Vec<StationCode>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CodeTuple> for Vec<StationCode> {
    fn from(codes: CodeTuple) -> Self {
        codes.0
    }
}

/// Operational kind of a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StationKind {
    /// Passenger station or halt.
    Station,
    /// Junction without passenger service (German "Abzweig").
    Junction,
    /// Operational point without passenger service.
    Operational,
}

/// Where a station sits along one line: route number and kilometre marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathLocation {
    pub route_number: u32,
    pub km: f64,
}

impl PathLocation {
    pub fn new(route_number: u32, km: f64) -> Self {
        Self { route_number, km }
    }
}

/// A station in the reference dataset.
///
/// Stations are treated as values: to change one, build a replacement
/// (see [`Station::with_location`]) and swap it into the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub name: String,
    pub number: u64,
    pub codes: CodeTuple,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Priority class; lower is more important, see `geocode::largest_group`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<StationKind>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path_locations: Vec<PathLocation>,
}

impl Station {
    /// Create a station with only the mandatory fields set.
    pub fn new(name: impl Into<String>, number: u64, codes: CodeTuple) -> Self {
        Self {
            name: name.into(),
            number,
            codes,
            location: None,
            group: None,
            kind: None,
            path_locations: Vec::new(),
        }
    }

    pub fn primary_code(&self) -> &StationCode {
        self.codes.primary()
    }

    /// Copy of this station with `location` attached.
    pub fn with_location(&self, location: Location) -> Self {
        Self {
            location: Some(location),
            ..self.clone()
        }
    }

    /// Kilometre marker of this station on the given route, if known.
    ///
    /// The first entry for the route wins when a station lists several.
    pub fn km_on_route(&self, route_number: u32) -> Option<f64> {
        self.path_locations
            .iter()
            .find(|p| p.route_number == route_number)
            .map(|p| p.km)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any ASCII string of 1..=20 bytes is a valid code
        #[test]
        fn short_ascii_always_parses(s in "[A-Z0-9 ]{1,20}") {
            prop_assert!(StationCode::parse(&s).is_ok());
        }

        /// Anything over 20 bytes is rejected
        #[test]
        fn long_rejected(s in "[A-Z0-9]{21,40}") {
            prop_assert!(StationCode::parse(&s).is_err());
        }
    }
}
