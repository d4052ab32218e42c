//! Binding waypoint hints to catalog stations.
//!
//! Given the geocoder's candidates for one waypoint, the resolver either
//! binds the waypoint to an existing catalog station (matched by normalized
//! name) or synthesizes a new station from the best candidate.
//!
//! Each existing station can be bound by name at most once per run: any
//! binding consumes the station's entry in the name lookup table, including
//! a reuse through its code. Synthesized stations are never entered into that
//! table, so later waypoints cannot silently collide with them by name.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::catalog::{CatalogError, StationCatalog, StationId};
use crate::domain::{
    CodeTuple, Country, InvalidCountryCode, InvalidStationCode, Location, Station, StationCode,
};
use crate::geocode::{Candidate, largest_group};
use crate::normalize::normalize;

/// Prefix for numbers of stations synthesized from geocoder places.
///
/// 69 is not a UIC country code, so these numbers never clash with
/// imported ones.
const SYNTHETIC_NUMBER_PREFIX: &str = "69";

/// Marker between the flag and the external id in synthesized codes ("O" for OSM).
const SYNTHETIC_CODE_MARKER: char = 'O';

/// Fatal resolution errors.
///
/// These are violated preconditions in the input data, not lookup misses.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Resolution was asked to pick from nothing
    #[error("no candidates to resolve from")]
    NoCandidates,

    /// The best candidate has no country to build a code from
    #[error("candidate {external_id} has no country code")]
    MissingCountry { external_id: u64 },

    #[error(transparent)]
    InvalidCountry(#[from] InvalidCountryCode),

    /// The synthesized code doesn't fit the code length limit
    #[error(transparent)]
    InvalidCode(#[from] InvalidStationCode),

    /// The synthesized station number doesn't fit into 64 bits
    #[error("station number for candidate {external_id} overflows")]
    NumberOverflow { external_id: u64 },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// How a waypoint was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// Bound to an existing station that already had a location.
    Matched,
    /// Bound to an existing station, which received the waypoint's location.
    Enriched,
    /// A new station was synthesized from the best candidate.
    Synthesized,
    /// The best candidate's code already belongs to a station, either one
    /// synthesized earlier in this run or one from the imported catalog.
    /// A station without a location receives the waypoint's.
    Reused,
}

/// Result of resolving one waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub id: StationId,
    pub outcome: ResolveOutcome,
}

/// Resolves waypoints against a station catalog for the duration of one run.
pub struct StationResolver<'a> {
    catalog: &'a mut StationCatalog,
    /// Normalized name → station not yet bound in this run.
    by_name: HashMap<String, StationId>,
}

impl<'a> StationResolver<'a> {
    /// Create a resolver over `catalog`.
    ///
    /// When several stations share a normalized name, the one added to the
    /// catalog last is the one that can be matched.
    pub fn new(catalog: &'a mut StationCatalog) -> Self {
        let by_name = catalog
            .iter()
            .map(|(id, station)| (normalize(&station.name), id))
            .collect();
        Self { catalog, by_name }
    }

    /// Whether a station with this name can still be bound in this run.
    pub fn is_available(&self, name: &str) -> bool {
        self.by_name.contains_key(&normalize(name))
    }

    pub fn catalog(&self) -> &StationCatalog {
        self.catalog
    }

    /// Bind the waypoint at `point` to a station, given nearby `candidates`.
    pub fn resolve(
        &mut self,
        point: Location,
        candidates: &[Candidate],
    ) -> Result<Resolved, ResolveError> {
        if let Some(resolved) = self.bind_existing(point, candidates)? {
            return Ok(resolved);
        }

        let names: Vec<&str> = candidates.iter().filter_map(|c| c.name.as_deref()).collect();
        info!(?names, "no candidate matches a known station, creating one");

        self.synthesize(point, candidates)
    }

    fn bind_existing(
        &mut self,
        point: Location,
        candidates: &[Candidate],
    ) -> Result<Option<Resolved>, ResolveError> {
        for name in candidates.iter().filter_map(|c| c.name.as_deref()) {
            let Some(id) = self.by_name.remove(&normalize(name)) else {
                continue;
            };
            let Some(station) = self.catalog.get(id) else {
                continue;
            };

            if station.location.is_some() {
                debug!(code = %station.primary_code(), name, "matched station");
                return Ok(Some(Resolved {
                    id,
                    outcome: ResolveOutcome::Matched,
                }));
            }

            self.enrich(id, point)?;
            return Ok(Some(Resolved {
                id,
                outcome: ResolveOutcome::Enriched,
            }));
        }
        Ok(None)
    }

    /// Give station `id` the waypoint's location.
    fn enrich(&mut self, id: StationId, point: Location) -> Result<(), ResolveError> {
        let Some(station) = self.catalog.get(id) else {
            return Ok(());
        };
        let enriched = station.with_location(point);
        debug!(
            code = %enriched.primary_code(),
            lat = point.latitude,
            lon = point.longitude,
            "adding location to station"
        );
        self.catalog.replace(id, enriched)?;
        Ok(())
    }

    fn synthesize(
        &mut self,
        point: Location,
        candidates: &[Candidate],
    ) -> Result<Resolved, ResolveError> {
        let station = station_from_candidates(candidates)?;

        if let Some(id) = self.catalog.id_by_code(station.primary_code()) {
            info!(code = %station.primary_code(), "place already known, reusing its station");
            // Reusing counts as binding: the station can't be matched by name afterwards
            self.by_name.retain(|_, bound| *bound != id);
            if self.catalog.get(id).is_some_and(|s| s.location.is_none()) {
                self.enrich(id, point)?;
            }
            return Ok(Resolved {
                id,
                outcome: ResolveOutcome::Reused,
            });
        }

        debug!(?station, "new station");
        let id = self.catalog.push(station)?;
        Ok(Resolved {
            id,
            outcome: ResolveOutcome::Synthesized,
        })
    }
}

/// Build a station from the best (first) candidate.
///
/// The code is `<flag>O<external id>`, the number is the external id
/// prefixed with "69", and the group is the best group among all candidates.
pub fn station_from_candidates(candidates: &[Candidate]) -> Result<Station, ResolveError> {
    let best = candidates.first().ok_or(ResolveError::NoCandidates)?;

    let country_code = best
        .country_code
        .as_deref()
        .ok_or(ResolveError::MissingCountry {
            external_id: best.external_id,
        })?;
    let country = Country::parse(country_code)?;

    let code = StationCode::parse(&format!(
        "{}{}{}",
        country.flag(),
        SYNTHETIC_CODE_MARKER,
        best.external_id
    ))?;

    let number = format!("{SYNTHETIC_NUMBER_PREFIX}{}", best.external_id)
        .parse::<u64>()
        .map_err(|_| ResolveError::NumberOverflow {
            external_id: best.external_id,
        })?;

    let name = best.name.clone().unwrap_or_else(|| code.to_string());

    let mut station = Station::new(name, number, CodeTuple::single(code));
    station.location = Some(best.location);
    station.group = largest_group(candidates.iter().map(Candidate::group));
    Ok(station)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::mock::candidate;

    fn code(s: &str) -> StationCode {
        StationCode::parse(s).unwrap()
    }

    fn here() -> Location {
        Location::new(48.1402, 11.5600)
    }

    fn catalog() -> StationCatalog {
        let mut munich = Station::new("München Hbf", 8000261, CodeTuple::single(code("🇩🇪MH")));
        munich.location = Some(Location::new(48.1403, 11.5583));
        let pasing = Station::new("München-Pasing", 8004158, CodeTuple::single(code("🇩🇪MP")));
        StationCatalog::from_stations(vec![munich, pasing]).unwrap()
    }

    #[test]
    fn matches_by_normalized_name() {
        let mut catalog = catalog();
        let mut resolver = StationResolver::new(&mut catalog);

        let resolved = resolver
            .resolve(here(), &[candidate(Some("MÜNCHEN HBF"), "station", 1, here())])
            .unwrap();

        assert_eq!(resolved.outcome, ResolveOutcome::Matched);
        assert_eq!(
            resolver.catalog().get(resolved.id).unwrap().primary_code(),
            &code("🇩🇪MH")
        );
        assert!(!resolver.is_available("München Hbf"));
        assert!(resolver.is_available("München Pasing"));
    }

    #[test]
    fn first_matching_candidate_wins() {
        let mut catalog = catalog();
        let mut resolver = StationResolver::new(&mut catalog);

        let resolved = resolver
            .resolve(
                here(),
                &[
                    candidate(Some("Hackerbrücke"), "stop", 1, here()),
                    candidate(None, "halt", 2, here()),
                    candidate(Some("München Pasing"), "station", 3, here()),
                    candidate(Some("München Hbf"), "station", 4, here()),
                ],
            )
            .unwrap();

        assert_eq!(
            resolver.catalog().get(resolved.id).unwrap().primary_code(),
            &code("🇩🇪MP")
        );
        assert!(resolver.is_available("München Hbf"));
    }

    #[test]
    fn enriches_station_without_location() {
        let mut catalog = catalog();
        let mut resolver = StationResolver::new(&mut catalog);

        let resolved = resolver
            .resolve(here(), &[candidate(Some("München-Pasing"), "station", 1, Location::new(0.0, 0.0))])
            .unwrap();

        assert_eq!(resolved.outcome, ResolveOutcome::Enriched);
        drop(resolver);
        // The waypoint's location is used, not the candidate's
        assert_eq!(catalog.get(resolved.id).unwrap().location, Some(here()));
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn synthesizes_when_nothing_matches() {
        let mut catalog = catalog();
        let mut resolver = StationResolver::new(&mut catalog);
        let place = Location::new(48.15, 11.46);

        let resolved = resolver
            .resolve(
                here(),
                &[
                    candidate(Some("Laim"), "stop", 123456, place),
                    candidate(Some("Laim Pbf"), "station", 7, here()),
                ],
            )
            .unwrap();

        assert_eq!(resolved.outcome, ResolveOutcome::Synthesized);
        let station = resolver.catalog().get(resolved.id).unwrap().clone();
        assert_eq!(station.name, "Laim");
        assert_eq!(station.primary_code(), &code("🇩🇪O123456"));
        assert_eq!(station.number, 69123456);
        assert_eq!(station.location, Some(place));
        assert_eq!(station.group, Some(2));
        // Synthesized stations never join the name lookup
        assert!(!resolver.is_available("Laim"));
        assert_eq!(resolver.catalog().len(), 3);
    }

    #[test]
    fn rebinding_consumed_station_synthesizes() {
        let mut catalog = catalog();
        let mut resolver = StationResolver::new(&mut catalog);
        let candidates = [candidate(Some("München Hbf"), "station", 99, here())];

        let first = resolver.resolve(here(), &candidates).unwrap();
        let second = resolver.resolve(here(), &candidates).unwrap();

        assert_eq!(first.outcome, ResolveOutcome::Matched);
        assert_eq!(second.outcome, ResolveOutcome::Synthesized);
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn same_place_twice_is_reused() {
        let mut catalog = catalog();
        let mut resolver = StationResolver::new(&mut catalog);
        let candidates = [candidate(Some("Somewhere"), "halt", 5, here())];

        let first = resolver.resolve(here(), &candidates).unwrap();
        let second = resolver.resolve(here(), &candidates).unwrap();

        assert_eq!(second.outcome, ResolveOutcome::Reused);
        assert_eq!(first.id, second.id);
        assert_eq!(resolver.catalog().len(), 3);
    }

    #[test]
    fn reusing_imported_station_consumes_its_name() {
        // Kept from an earlier run, so it carries a synthesized code but no location
        let senden = Station::new("Senden", 6942, CodeTuple::single(code("🇩🇪O42")));
        let mut catalog = StationCatalog::from_stations(vec![senden]).unwrap();
        let mut resolver = StationResolver::new(&mut catalog);

        let first = resolver
            .resolve(here(), &[candidate(None, "halt", 42, here())])
            .unwrap();
        assert_eq!(first.outcome, ResolveOutcome::Reused);
        assert!(!resolver.is_available("Senden"));

        let elsewhere = Location::new(48.32, 10.06);
        let second = resolver
            .resolve(elsewhere, &[candidate(Some("Senden"), "station", 77, elsewhere)])
            .unwrap();
        assert_ne!(first.id, second.id, "same station bound twice in one run");
        assert_eq!(second.outcome, ResolveOutcome::Synthesized);

        drop(resolver);
        assert_eq!(catalog.get(first.id).unwrap().location, Some(here()));
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn reuse_keeps_existing_location() {
        let mut catalog = catalog();
        let mut resolver = StationResolver::new(&mut catalog);
        let place = Location::new(48.15, 11.46);

        let first = resolver
            .resolve(place, &[candidate(Some("Laim"), "stop", 5, place)])
            .unwrap();
        let second = resolver
            .resolve(here(), &[candidate(Some("Laim"), "stop", 5, place)])
            .unwrap();

        assert_eq!(second.outcome, ResolveOutcome::Reused);
        assert_eq!(
            resolver.catalog().get(first.id).unwrap().location,
            Some(place)
        );
    }

    #[test]
    fn unnamed_best_candidate_is_named_after_code() {
        let station = station_from_candidates(&[candidate(None, "halt", 42, here())]).unwrap();
        assert_eq!(station.name, "🇩🇪O42");
        assert_eq!(station.group, Some(5));
    }

    #[test]
    fn settlement_candidates_have_no_group() {
        let station =
            station_from_candidates(&[candidate(Some("Dachau"), "town", 42, here())]).unwrap();
        assert_eq!(station.group, None);
    }

    #[test]
    fn too_long_code_is_fatal() {
        // 8 bytes of flag + "O" + 12 digits = 21 bytes
        let err = station_from_candidates(&[candidate(Some("X"), "stop", 123_456_789_012, here())])
            .unwrap_err();
        assert!(matches!(err, ResolveError::InvalidCode(_)));
    }

    #[test]
    fn missing_or_bad_country_is_fatal() {
        let mut c = candidate(Some("X"), "stop", 1, here());
        c.country_code = None;
        assert_eq!(
            station_from_candidates(&[c.clone()]).unwrap_err(),
            ResolveError::MissingCountry { external_id: 1 }
        );

        c.country_code = Some("Deutschland".into());
        assert!(matches!(
            station_from_candidates(&[c]).unwrap_err(),
            ResolveError::InvalidCountry(_)
        ));
    }

    #[test]
    fn no_candidates_is_an_error() {
        let mut catalog = catalog();
        let mut resolver = StationResolver::new(&mut catalog);
        assert_eq!(
            resolver.resolve(here(), &[]).unwrap_err(),
            ResolveError::NoCandidates
        );
    }
}
