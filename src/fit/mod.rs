//! Crop fitness scoring.
//!
//! Responsibilities:
//!
//! - evaluate the weighted Gaussian fitness of one crop profile
//! - score every crop (parallel) and select the best with a fixed tie-break

pub mod fitness;
pub mod selection;

pub use fitness::*;
pub use selection::*;
