//! Domain error types.
//!
//! These errors represent validation failures in the domain layer. They are
//! distinct from geocoding/IO errors.

use super::StationCode;

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// A station must carry at least one code
    #[error("code tuple must contain at least one code")]
    EmptyCodeTuple,

    /// A code appears twice in one station's code tuple
    #[error("duplicate station code {0}")]
    DuplicateCode(StationCode),

    /// Route hops don't line up with its waypoints
    #[error("route with {waypoints} waypoints needs {expected} hops, got {actual}")]
    HopCountMismatch {
        waypoints: usize,
        expected: usize,
        actual: usize,
    },

    /// A hop between two waypoints has no tracks at all
    #[error("hop {0} has no tracks")]
    EmptyHop(usize),
}
