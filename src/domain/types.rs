//! Shared domain types.
//!
//! These types are kept small and serializable so they can be:
//!
//! - passed between the fetch layer, the reference model and the scorer
//! - loaded from JSON (scoring parameters)
//! - printed or exported without extra conversion layers

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, ScoreError};

/// One of the six observed dimensions used for scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dimension {
    /// Instantaneous temperature (°C).
    #[serde(rename = "T")]
    Temperature,
    /// Ambient relative humidity (%).
    #[serde(rename = "H")]
    Humidity,
    /// Atmospheric pressure (hPa).
    #[serde(rename = "P")]
    Pressure,
    /// Monthly-average temperature (°C).
    #[serde(rename = "T_avg")]
    AvgTemperature,
    /// Accumulated precipitation over the month (mm).
    #[serde(rename = "AP")]
    Precipitation,
    /// Soil pH.
    #[serde(rename = "pH")]
    SoilPh,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Dimension::Temperature,
        Dimension::Humidity,
        Dimension::Pressure,
        Dimension::AvgTemperature,
        Dimension::Precipitation,
        Dimension::SoilPh,
    ];

    /// Short key used in parameter files and diagnostics.
    pub fn key(self) -> &'static str {
        match self {
            Dimension::Temperature => "T",
            Dimension::Humidity => "H",
            Dimension::Pressure => "P",
            Dimension::AvgTemperature => "T_avg",
            Dimension::Precipitation => "AP",
            Dimension::SoilPh => "pH",
        }
    }

    /// Human-readable label for prompts and tables.
    pub fn display_name(self) -> &'static str {
        match self {
            Dimension::Temperature => "instantaneous temperature (°C)",
            Dimension::Humidity => "ambient humidity (%)",
            Dimension::Pressure => "atmospheric pressure (hPa)",
            Dimension::AvgTemperature => "monthly average temperature (°C)",
            Dimension::Precipitation => "total precipitation (mm)",
            Dimension::SoilPh => "soil pH",
        }
    }

    /// Plausible range for a manually entered value (inclusive).
    pub fn valid_range(self) -> (f64, f64) {
        match self {
            Dimension::Temperature | Dimension::AvgTemperature => (-50.0, 60.0),
            Dimension::Humidity => (0.0, 100.0),
            Dimension::Pressure => (900.0, 1100.0),
            Dimension::Precipitation => (0.0, 1000.0),
            Dimension::SoilPh => (0.0, 14.0),
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Point + month the climate resolver searches from.
#[derive(Debug, Clone, PartialEq)]
pub struct ClimateQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub month: u32,
    pub year: i32,
    /// Maximum number of candidate years tried (look-back budget).
    pub max_years_back: u32,
}

impl ClimateQuery {
    pub fn new(
        latitude: f64,
        longitude: f64,
        month: u32,
        year: i32,
        max_years_back: u32,
    ) -> Result<Self, AppError> {
        if !(1..=12).contains(&month) {
            return Err(AppError::new(2, format!("Invalid month {month}: expected 1-12.")));
        }
        if !(latitude.is_finite() && (-90.0..=90.0).contains(&latitude)) {
            return Err(AppError::new(2, format!("Invalid latitude {latitude}: expected -90..90.")));
        }
        if !(longitude.is_finite() && (-180.0..=180.0).contains(&longitude)) {
            return Err(AppError::new(
                2,
                format!("Invalid longitude {longitude}: expected -180..180."),
            ));
        }
        Ok(Self {
            latitude,
            longitude,
            month,
            year,
            max_years_back,
        })
    }

    /// The requested year moved backward until `(month, year)` is not after `today`.
    pub fn normalized_year(&self, today: NaiveDate) -> i32 {
        normalize_year(self.month, self.year, today)
    }
}

/// Latest year not after `year` for which `(month, year)` is not in the future.
pub fn normalize_year(month: u32, year: i32, today: NaiveDate) -> i32 {
    let current_year = today.year();
    let adjusted = year.min(current_year);
    if adjusted == current_year && month > today.month() {
        adjusted - 1
    } else {
        adjusted
    }
}

/// A successfully resolved month of climate data.
///
/// At least one of the two numeric fields is present; the resolver never
/// produces a record with both absent.
#[derive(Debug, Clone, PartialEq)]
pub struct ClimateRecord {
    /// `YYYYMMDD to YYYYMMDD`.
    pub date_range: String,
    pub avg_temperature: Option<f64>,
    pub total_precipitation: Option<f64>,
}

/// Six observed readings, each possibly absent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorVector {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub avg_temperature: Option<f64>,
    pub precipitation: Option<f64>,
    pub soil_ph: Option<f64>,
}

impl SensorVector {
    pub fn get(&self, dim: Dimension) -> Option<f64> {
        match dim {
            Dimension::Temperature => self.temperature,
            Dimension::Humidity => self.humidity,
            Dimension::Pressure => self.pressure,
            Dimension::AvgTemperature => self.avg_temperature,
            Dimension::Precipitation => self.precipitation,
            Dimension::SoilPh => self.soil_ph,
        }
    }

    /// Set a reading. Non-finite values are stored as absent.
    pub fn set(&mut self, dim: Dimension, value: Option<f64>) {
        let value = value.filter(|v| v.is_finite());
        match dim {
            Dimension::Temperature => self.temperature = value,
            Dimension::Humidity => self.humidity = value,
            Dimension::Pressure => self.pressure = value,
            Dimension::AvgTemperature => self.avg_temperature = value,
            Dimension::Precipitation => self.precipitation = value,
            Dimension::SoilPh => self.soil_ph = value,
        }
    }

    /// Dimensions without a reading, in `Dimension::ALL` order.
    pub fn missing(&self) -> Vec<Dimension> {
        Dimension::ALL
            .into_iter()
            .filter(|d| self.get(*d).is_none())
            .collect()
    }

    /// Fill every absent reading from `other`, keeping readings already present.
    pub fn fill_from(&mut self, other: &SensorVector) {
        for dim in Dimension::ALL {
            if self.get(dim).is_none() {
                self.set(dim, other.get(dim));
            }
        }
    }

    /// Convert into a fully populated vector, or report the first gap.
    pub fn complete(&self) -> Result<SensorReadings, ScoreError> {
        let take = |dim| self.get(dim).ok_or(ScoreError::MissingDimension(dim));
        Ok(SensorReadings {
            temperature: take(Dimension::Temperature)?,
            humidity: take(Dimension::Humidity)?,
            pressure: take(Dimension::Pressure)?,
            avg_temperature: take(Dimension::AvgTemperature)?,
            precipitation: take(Dimension::Precipitation)?,
            soil_ph: take(Dimension::SoilPh)?,
        })
    }
}

/// A fully populated sensor vector (precondition for scoring).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReadings {
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub avg_temperature: f64,
    pub precipitation: f64,
    pub soil_ph: f64,
}

impl SensorReadings {
    pub fn get(&self, dim: Dimension) -> f64 {
        match dim {
            Dimension::Temperature => self.temperature,
            Dimension::Humidity => self.humidity,
            Dimension::Pressure => self.pressure,
            Dimension::AvgTemperature => self.avg_temperature,
            Dimension::Precipitation => self.precipitation,
            Dimension::SoilPh => self.soil_ph,
        }
    }
}

/// Mean growing conditions for one crop, derived from the reference dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OptimalProfile {
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    pub rainfall: f64,
}

/// Profiles keyed by crop identifier.
///
/// A `BTreeMap` so iteration (and therefore the scoring tie-break) is
/// lexicographic by identifier.
pub type ProfileSet = BTreeMap<String, OptimalProfile>;

/// One value per scoring dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionTable {
    #[serde(rename = "T")]
    pub temperature: f64,
    #[serde(rename = "H")]
    pub humidity: f64,
    #[serde(rename = "P")]
    pub pressure: f64,
    #[serde(rename = "T_avg")]
    pub avg_temperature: f64,
    #[serde(rename = "AP")]
    pub precipitation: f64,
    #[serde(rename = "pH")]
    pub soil_ph: f64,
}

impl DimensionTable {
    pub fn get(&self, dim: Dimension) -> f64 {
        match dim {
            Dimension::Temperature => self.temperature,
            Dimension::Humidity => self.humidity,
            Dimension::Pressure => self.pressure,
            Dimension::AvgTemperature => self.avg_temperature,
            Dimension::Precipitation => self.precipitation,
            Dimension::SoilPh => self.soil_ph,
        }
    }

    /// Same value in every dimension.
    pub fn uniform(value: f64) -> Self {
        Self {
            temperature: value,
            humidity: value,
            pressure: value,
            avg_temperature: value,
            precipitation: value,
            soil_ph: value,
        }
    }
}

/// Gaussian kernel parameters.
///
/// Weights are not required to sum to 1; each scales its own term of the
/// exponent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringParameters {
    pub sigmas: DimensionTable,
    pub weights: DimensionTable,
}

impl Default for ScoringParameters {
    fn default() -> Self {
        Self {
            sigmas: DimensionTable {
                temperature: 2.0,
                humidity: 10.0,
                pressure: 10.0,
                avg_temperature: 2.0,
                precipitation: 20.0,
                soil_ph: 0.5,
            },
            weights: DimensionTable {
                temperature: 0.35,
                humidity: 0.30,
                pressure: 0.05,
                avg_temperature: 0.15,
                precipitation: 0.10,
                soil_ph: 0.05,
            },
        }
    }
}

impl ScoringParameters {
    /// Sigmas must be finite and > 0; weights finite and >= 0.
    pub fn validate(&self) -> Result<(), ScoreError> {
        for dim in Dimension::ALL {
            let sigma = self.sigmas.get(dim);
            if !(sigma.is_finite() && sigma > 0.0) {
                return Err(ScoreError::InvalidParameter(format!(
                    "sigma for {dim} must be finite and > 0 (got {sigma})"
                )));
            }
            let weight = self.weights.get(dim);
            if !(weight.is_finite() && weight >= 0.0) {
                return Err(ScoreError::InvalidParameter(format!(
                    "weight for {dim} must be finite and >= 0 (got {weight})"
                )));
            }
        }
        Ok(())
    }
}
