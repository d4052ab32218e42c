//! In-memory station catalog.
//!
//! Stations live in an arena and are addressed by a stable [`StationId`].
//! Updating a station means swapping in a replacement record for its id;
//! the catalog keeps a code index in sync and refuses any change that would
//! give two stations the same code.

mod error;

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::domain::{CodeTuple, Station, StationCode};

pub use error::CatalogError;

/// Stable handle to a station in a [`StationCatalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StationId(pub(crate) usize);

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Arena of stations with a global code index.
#[derive(Debug, Clone, Default)]
pub struct StationCatalog {
    slots: Vec<Option<Station>>,
    by_code: HashMap<StationCode, StationId>,
}

impl StationCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from imported stations, in order.
    ///
    /// Fails on the first code that appears on two stations.
    pub fn from_stations(stations: impl IntoIterator<Item = Station>) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        for station in stations {
            catalog.push(station)?;
        }
        Ok(catalog)
    }

    /// Add a station, returning its id.
    pub fn push(&mut self, station: Station) -> Result<StationId, CatalogError> {
        self.check_codes_free(&station.codes, None)?;
        let id = StationId(self.slots.len());
        self.index_codes(&station.codes, id);
        self.slots.push(Some(station));
        Ok(id)
    }

    /// Look up a live station by id.
    pub fn get(&self, id: StationId) -> Option<&Station> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    /// Look up a station by any of its codes.
    pub fn by_code(&self, code: &StationCode) -> Option<&Station> {
        self.id_by_code(code).and_then(|id| self.get(id))
    }

    pub fn id_by_code(&self, code: &StationCode) -> Option<StationId> {
        self.by_code.get(code).copied()
    }

    /// Swap in a replacement record for `id`, returning the old record.
    ///
    /// The replacement may carry different codes, as long as none of them
    /// belongs to another station.
    pub fn replace(&mut self, id: StationId, station: Station) -> Result<Station, CatalogError> {
        if self.get(id).is_none() {
            return Err(CatalogError::UnknownId(id));
        }
        self.check_codes_free(&station.codes, Some(id))?;

        let codes = station.codes.clone();
        let old = self.slots[id.0]
            .replace(station)
            .ok_or(CatalogError::UnknownId(id))?;
        for code in old.codes.iter() {
            self.by_code.remove(code);
        }
        self.index_codes(&codes, id);
        Ok(old)
    }

    /// Remove a station. Its id is never reused.
    pub fn remove(&mut self, id: StationId) -> Option<Station> {
        let station = self.slots.get_mut(id.0)?.take()?;
        for code in station.codes.iter() {
            self.by_code.remove(code);
        }
        Some(station)
    }

    /// Merge the stations owning `codes` into a single record.
    ///
    /// The first station's scalar fields win; missing optional fields are
    /// filled from the following stations, and codes and path locations are
    /// unioned in order. Codes that resolve to the same station are merged
    /// once. With fewer than two distinct stations nothing changes.
    pub fn merge(&mut self, codes: &[StationCode]) -> Result<StationId, CatalogError> {
        let mut ids: Vec<StationId> = Vec::new();
        for code in codes {
            let id = self
                .id_by_code(code)
                .ok_or_else(|| CatalogError::UnknownCode(code.clone()))?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }

        let Some((&first, rest)) = ids.split_first() else {
            return Err(CatalogError::NothingToMerge);
        };
        if rest.is_empty() {
            return Ok(first);
        }

        let mut merged = self.remove(first).ok_or(CatalogError::UnknownId(first))?;
        for &id in rest {
            let other = self.remove(id).ok_or(CatalogError::UnknownId(id))?;
            merged = merge_station(merged, other);
        }

        debug!(
            code = %merged.primary_code(),
            merged = rest.len() + 1,
            "merged stations"
        );
        self.push(merged)
    }

    /// Iterate live stations with their ids, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (StationId, &Station)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|s| (StationId(i), s)))
    }

    /// Number of live stations.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consume the catalog, yielding live stations in insertion order.
    pub fn into_stations(self) -> Vec<Station> {
        self.slots.into_iter().flatten().collect()
    }

    fn check_codes_free(&self, codes: &CodeTuple, owner: Option<StationId>) -> Result<(), CatalogError> {
        for code in codes.iter() {
            match self.by_code.get(code) {
                Some(id) if Some(*id) != owner => {
                    return Err(CatalogError::DuplicateCode(code.clone()));
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn index_codes(&mut self, codes: &CodeTuple, id: StationId) {
        for code in codes.iter() {
            self.by_code.insert(code.clone(), id);
        }
    }
}

fn merge_station(mut into: Station, other: Station) -> Station {
    into.codes = into.codes.union(&other.codes);
    into.location = into.location.or(other.location);
    into.group = into.group.or(other.group);
    into.kind = into.kind.or(other.kind);
    for location in other.path_locations {
        if !into.path_locations.contains(&location) {
            into.path_locations.push(location);
        }
    }
    into
}
