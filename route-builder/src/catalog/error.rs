//! Catalog error types.

use crate::domain::StationCode;

use super::StationId;

/// Errors from station catalog operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Another station already owns this code
    #[error("station code {0} is already in the catalog")]
    DuplicateCode(StationCode),

    /// The id does not refer to a live station
    #[error("no station with id {0}")]
    UnknownId(StationId),

    /// A code to look up or merge is not in the catalog
    #[error("no station with code {0}")]
    UnknownCode(StationCode),

    /// Merge was called without any codes
    #[error("no stations to merge")]
    NothingToMerge,
}
