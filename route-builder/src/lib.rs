//! Route and track reconstruction.
//!
//! Turns a raw GPS trace with a few noisy station hints into an ordered,
//! deduplicated list of stations with a simplified polyline per leg, and
//! places an ordered list of station codes onto catalogued track segments.

pub mod assemble;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod geocode;
pub mod input;
pub mod normalize;
pub mod pipeline;
pub mod resolve;
pub mod segment;
pub mod simplify;
