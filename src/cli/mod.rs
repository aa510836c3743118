//! Command-line parsing for the crop-fitness tool.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! fetch and scoring code. Dispatch lives in `app`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{Dimension, SensorVector};

pub mod prompt;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "cropfit",
    version,
    about = "Location environmental report and crop-fitness recommender"
)]
pub struct Cli {
    /// More log output (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the location report, complete the sensor readings and rank crops.
    Recommend(RecommendArgs),
    /// Fetch and print the location report only (optionally save it as CSV).
    Report(ReportArgs),
    /// Inspect the crop reference dataset.
    Crops(CropsArgs),
}

/// Where and when to look.
#[derive(Debug, Args, Clone)]
pub struct LocationArgs {
    /// Latitude in decimal degrees.
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude in decimal degrees.
    #[arg(long, allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Month of interest (1-12).
    #[arg(long)]
    pub month: Option<u32>,

    /// Year of interest (defaults to the current year; future months walk back).
    #[arg(long)]
    pub year: Option<i32>,

    /// How many years the climate search may look back.
    #[arg(long)]
    pub max_years_back: Option<u32>,

    /// Fetch report sections one after another instead of in parallel.
    #[arg(long)]
    pub sequential: bool,
}

/// Manual sensor readings. Given values replace fetched ones.
#[derive(Debug, Args, Clone, Default)]
pub struct SensorArgs {
    /// Instantaneous temperature (°C).
    #[arg(long, allow_negative_numbers = true)]
    pub temperature: Option<f64>,

    /// Ambient humidity (%).
    #[arg(long)]
    pub humidity: Option<f64>,

    /// Atmospheric pressure (hPa).
    #[arg(long)]
    pub pressure: Option<f64>,

    /// Monthly average temperature (°C).
    #[arg(long, allow_negative_numbers = true)]
    pub avg_temperature: Option<f64>,

    /// Total monthly precipitation (mm).
    #[arg(long)]
    pub precipitation: Option<f64>,

    /// Soil pH.
    #[arg(long)]
    pub ph: Option<f64>,
}

impl SensorArgs {
    pub fn to_sensor(&self) -> SensorVector {
        let mut s = SensorVector::default();
        s.set(Dimension::Temperature, self.temperature);
        s.set(Dimension::Humidity, self.humidity);
        s.set(Dimension::Pressure, self.pressure);
        s.set(Dimension::AvgTemperature, self.avg_temperature);
        s.set(Dimension::Precipitation, self.precipitation);
        s.set(Dimension::SoilPh, self.ph);
        s
    }
}

#[derive(Debug, Args, Clone)]
pub struct RecommendArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    #[command(flatten)]
    pub sensor: SensorArgs,

    /// Score a previously saved report CSV instead of fetching a new one.
    #[arg(long, conflicts_with_all = ["lat", "lon", "month", "year"])]
    pub from_report: Option<PathBuf>,

    /// Directory of crop reference CSV files (overrides CROPFIT_DATASET_DIR).
    #[arg(long)]
    pub dataset: Option<PathBuf>,

    /// Restrict scoring to this crop (repeatable, exact identifier).
    #[arg(long = "crop")]
    pub crops: Vec<String>,

    /// JSON file with scoring sigmas and weights.
    #[arg(long)]
    pub params: Option<PathBuf>,

    /// Show the top-N crops.
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Score bar width (columns).
    #[arg(long, default_value_t = 40)]
    pub width: usize,

    /// Print the full location report before the recommendation.
    #[arg(long)]
    pub show_report: bool,

    /// Save the fetched report as CSV.
    #[arg(long)]
    pub save_report: Option<PathBuf>,

    /// Export ranked scores to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Write per-crop row counts of the scored dataset.
    #[arg(long)]
    pub counts: Option<PathBuf>,

    /// Fail instead of prompting for missing sensor readings.
    #[arg(long)]
    pub no_prompt: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// Save the report as CSV.
    #[arg(long)]
    pub save: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct CropsArgs {
    /// Directory of crop reference CSV files (overrides CROPFIT_DATASET_DIR).
    #[arg(long)]
    pub dataset: Option<PathBuf>,

    /// List crop identifiers containing this text (case-insensitive).
    #[arg(long)]
    pub search: Option<String>,

    /// Write per-crop row counts to this file.
    #[arg(long)]
    pub counts: Option<PathBuf>,

    /// Print the optimal-condition profile of every crop.
    #[arg(long)]
    pub profiles: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommend_accepts_negative_coordinates_and_repeated_crops() {
        let cli = Cli::parse_from([
            "cropfit", "recommend", "--lat", "-33.9", "--lon", "18.4", "--month", "7", "--crop",
            "rice", "--crop", "maize", "--ph", "6.1", "-v",
        ]);
        let Command::Recommend(args) = cli.command else {
            panic!("expected recommend");
        };
        assert_eq!(args.location.lat, Some(-33.9));
        assert_eq!(args.crops, vec!["rice", "maize"]);
        assert_eq!(args.top, 10);
        assert_eq!(args.sensor.to_sensor().soil_ph, Some(6.1));
        assert_eq!(args.sensor.to_sensor().temperature, None);
        assert_eq!(cli.verbose, 1);
    }

    #[test]
    fn saved_report_conflicts_with_location() {
        let res = Cli::try_parse_from([
            "cropfit", "recommend", "--from-report", "r.csv", "--lat", "1.0",
        ]);
        assert!(res.is_err());
    }
}
