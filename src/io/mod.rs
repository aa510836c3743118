//! Input/output helpers.
//!
//! - crop reference dataset loading (`dataset`)
//! - report persistence round trip (`report_csv`)
//! - score and count exports (`export`)

pub mod dataset;
pub mod export;
pub mod report_csv;

pub use dataset::*;
pub use export::*;
pub use report_csv::*;
