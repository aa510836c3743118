//! Crop reference model.
//!
//! Turns the stacked reference dataset into one [`OptimalProfile`] per crop.
//!
//! [`OptimalProfile`]: crate::domain::OptimalProfile

pub mod profile;

pub use profile::*;
