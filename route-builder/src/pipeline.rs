//! End-to-end reconstruction of a GPS trace.
//!
//! A run goes through these stages, in order:
//! 1. Each waypoint hint is reverse geocoded and bound to a catalog station
//!    (or a new one). Hints are handled strictly in trace order, so "first
//!    match wins" follows the trace, not network timing.
//! 2. The trace is cut at the resolved stations.
//! 3. Every leg is simplified.

use tracing::{debug, error, info};

use crate::catalog::{StationCatalog, StationId};
use crate::config::ReconstructionConfig;
use crate::domain::{CodeWaypoint, Location, Positioned, Station, WaypointHint};
use crate::geocode::{Candidate, GeoMatcher, ReverseGeocoder};
use crate::resolve::{ResolveError, ResolveOutcome, StationResolver};
use crate::segment::{Leg, segment};
use crate::simplify::simplify;

/// What happened to each waypoint hint during resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolutionReport {
    /// Hints that were bound to a station, in order.
    pub resolved: Vec<(Location, StationId, ResolveOutcome)>,
    /// Hints for which the geocoder found nothing.
    pub skipped: Vec<Location>,
}

impl ResolutionReport {
    /// Stations that received a location from a waypoint in this run.
    pub fn enriched(&self) -> impl Iterator<Item = StationId> + '_ {
        self.outcomes(ResolveOutcome::Enriched)
    }

    /// Stations created from geocoder places in this run.
    pub fn synthesized(&self) -> impl Iterator<Item = StationId> + '_ {
        self.outcomes(ResolveOutcome::Synthesized)
    }

    fn outcomes(&self, wanted: ResolveOutcome) -> impl Iterator<Item = StationId> + '_ {
        self.resolved
            .iter()
            .filter(move |(_, _, outcome)| *outcome == wanted)
            .map(|(_, id, _)| *id)
    }
}

/// A simplified leg of the trace.
#[derive(Debug, Clone, PartialEq)]
pub struct SimplifiedLeg<'a, P> {
    pub points: Vec<&'a P>,
    /// The station the leg leads up to.
    pub station: Station,
}

/// Result of reconstructing one trace.
#[derive(Debug, Clone)]
pub struct Reconstruction<'a, P> {
    /// Stations along the trace, in order.
    pub waypoints: Vec<CodeWaypoint>,
    pub legs: Vec<SimplifiedLeg<'a, P>>,
    /// Trace points after the last station, unsimplified.
    pub trailing: &'a [P],
    pub report: ResolutionReport,
}

/// Simplify every leg with the same tolerance.
pub fn simplify_legs<'a, P: Positioned>(
    legs: Vec<Leg<'a, P>>,
    tolerance_km: f64,
) -> Vec<SimplifiedLeg<'a, P>> {
    legs.into_iter()
        .map(|leg| SimplifiedLeg {
            points: simplify(leg.points, tolerance_km).collect(),
            station: leg.station,
        })
        .collect()
}

/// Collapse hints at identical positions, keeping the first occurrence's slot.
fn dedup_hints(hints: &[WaypointHint]) -> Vec<Location> {
    let mut locations: Vec<Location> = Vec::with_capacity(hints.len());
    for hint in hints {
        let location = hint.location();
        if !locations.contains(&location) {
            locations.push(location);
        }
    }
    locations
}

/// Reconstructs traces against a station catalog.
pub struct Reconstructor<G> {
    matcher: GeoMatcher<G>,
    config: ReconstructionConfig,
}

impl<G: ReverseGeocoder> Reconstructor<G> {
    pub fn new(matcher: GeoMatcher<G>, config: ReconstructionConfig) -> Self {
        Self { matcher, config }
    }

    pub fn config(&self) -> &ReconstructionConfig {
        &self.config
    }

    /// Bind every hint to a station, adding or updating stations in `catalog`.
    ///
    /// Hints the geocoder has nothing for are skipped and listed in the
    /// report. Returns the station for each resolved hint position, in order.
    /// Positions that resolve to a station already returned are kept in the
    /// report but left out of the result, so every station appears once.
    pub async fn resolve_hints(
        &self,
        hints: &[WaypointHint],
        catalog: &mut StationCatalog,
    ) -> Result<(Vec<(Location, Station)>, ResolutionReport), ResolveError> {
        let mut resolver = StationResolver::new(catalog);
        let mut report = ResolutionReport::default();
        let mut ids = Vec::new();

        for location in dedup_hints(hints) {
            let Some(candidates) = self.candidates_for(location).await else {
                report.skipped.push(location);
                continue;
            };

            let resolved = resolver.resolve(location, &candidates)?;
            report
                .resolved
                .push((location, resolved.id, resolved.outcome));
            if ids.iter().any(|(_, id)| *id == resolved.id) {
                debug!(
                    lat = location.latitude,
                    lon = location.longitude,
                    "hint resolves to a station seen earlier, dropping it"
                );
                continue;
            }
            ids.push((location, resolved.id));
        }

        // Read stations back once all replacements are done
        let catalog = resolver.catalog();
        let stations = ids
            .into_iter()
            .filter_map(|(location, id)| catalog.get(id).map(|s| (location, s.clone())))
            .collect();

        Ok((stations, report))
    }

    /// Railway places near `location`, or settlements if configured.
    async fn candidates_for(&self, location: Location) -> Option<Vec<Candidate>> {
        if let Some(candidates) = self.matcher.find_candidates(location, false).await {
            return Some(candidates);
        }

        if !self.config.fallback_to_settlement {
            error!(
                lat = location.latitude,
                lon = location.longitude,
                "no station found, ignoring waypoint"
            );
            debug!(url = %location.osm_url(), "unresolved waypoint");
            return None;
        }

        info!(
            lat = location.latitude,
            lon = location.longitude,
            "no station found, looking for a settlement"
        );
        debug!(url = %location.osm_url(), "unresolved waypoint");

        let candidates = self.matcher.find_candidates(location, true).await;
        if candidates.is_none() {
            error!(
                lat = location.latitude,
                lon = location.longitude,
                "no station or settlement found, ignoring waypoint"
            );
        }
        candidates
    }

    /// Resolve the hints, cut the trace at them and simplify every leg.
    pub async fn reconstruct<'a, P: Positioned>(
        &self,
        points: &'a [P],
        hints: &[WaypointHint],
        catalog: &mut StationCatalog,
    ) -> Result<Reconstruction<'a, P>, ResolveError> {
        let (stations, report) = self.resolve_hints(hints, catalog).await?;

        let segmentation = segment(points, stations, self.config.stop_radius_km);
        info!(
            hints = hints.len(),
            resolved = report.resolved.len(),
            skipped = report.skipped.len(),
            passed = segmentation.waypoints.len(),
            "reconstructed trace"
        );

        Ok(Reconstruction {
            waypoints: segmentation.waypoints,
            legs: simplify_legs(segmentation.legs, self.config.simplify_tolerance_km),
            trailing: segmentation.trailing,
            report,
        })
    }
}
