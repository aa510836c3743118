//! Remote environmental data.
//!
//! - `client`: the JSON source seam and its HTTP implementation
//! - `climate`: monthly climate resolution with year walk-back and fallback
//! - `providers`: weather, soil and terrain fetchers
//! - `aggregate`: fan-out/merge into one report

pub mod aggregate;
pub mod client;
pub mod climate;
pub mod providers;

pub use aggregate::*;
pub use client::{DEFAULT_TIMEOUT, HttpSource, JsonSource, Params, fetch};
pub use climate::*;
pub use providers::*;
