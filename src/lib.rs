//! `cropfit` library crate.
//!
//! The binary (`cropfit`) is a thin wrapper around this library so that:
//!
//! - the fetch, model and scoring logic is testable without spawning processes
//! - remote sources can be swapped for in-memory fakes
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod models;
pub mod plot;
pub mod report;
