//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the unified environmental `Report` and its sections
//! - query/record types for the climate resolver
//! - `SensorVector`, `OptimalProfile` and `ScoringParameters` for scoring

pub mod report;
pub mod types;

pub use report::*;
pub use types::*;
