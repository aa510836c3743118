//! Runtime configuration.
//!
//! Settings come from the environment (a `.env` file is honored) and are then
//! overridden by CLI flags. The resolved values travel through the pipeline as
//! an explicit [`Session`]; nothing here is global.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::data::{DEFAULT_MAX_YEARS_BACK, DEFAULT_TIMEOUT, Dispatch};
use crate::domain::ScoringParameters;
use crate::error::AppError;

pub const ENV_WEATHER_KEY: &str = "OPENWEATHER_API_KEY";
pub const ENV_DATASET_DIR: &str = "CROPFIT_DATASET_DIR";
pub const ENV_MAX_YEARS_BACK: &str = "CROPFIT_MAX_YEARS_BACK";
pub const ENV_HTTP_TIMEOUT: &str = "CROPFIT_HTTP_TIMEOUT_SECS";

pub const DEFAULT_DATASET_DIR: &str = "data/crops";

/// Environment-derived settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub weather_api_key: Option<String>,
    pub dataset_dir: PathBuf,
    pub max_years_back: u32,
    pub http_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            weather_api_key: None,
            dataset_dir: PathBuf::from(DEFAULT_DATASET_DIR),
            max_years_back: DEFAULT_MAX_YEARS_BACK,
            http_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Settings {
    /// Load `.env` (if any) and read settings from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mut settings = Self::default();

        settings.weather_api_key = lookup(ENV_WEATHER_KEY)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        if let Some(dir) = lookup(ENV_DATASET_DIR).filter(|d| !d.trim().is_empty()) {
            settings.dataset_dir = PathBuf::from(dir.trim());
        }
        if let Some(raw) = lookup(ENV_MAX_YEARS_BACK) {
            settings.max_years_back = parse_var(ENV_MAX_YEARS_BACK, &raw)?;
        }
        if let Some(raw) = lookup(ENV_HTTP_TIMEOUT) {
            let secs: u64 = parse_var(ENV_HTTP_TIMEOUT, &raw)?;
            if secs == 0 {
                return Err(AppError::new(2, format!("{ENV_HTTP_TIMEOUT} must be > 0.")));
            }
            settings.http_timeout = Duration::from_secs(secs);
        }
        Ok(settings)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::new(2, format!("Invalid value for {name}: '{raw}'.")))
}

/// Read and validate scoring parameters from a JSON file.
///
/// The file holds `{"sigmas": {...}, "weights": {...}}` keyed by
/// `T`, `H`, `P`, `T_avg`, `AP`, `pH`.
pub fn load_parameters(path: &Path) -> Result<ScoringParameters, AppError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        AppError::new(2, format!("Failed to read parameters file '{}': {e}", path.display()))
    })?;
    parse_parameters(&text)
        .map_err(|e| AppError::new(e.exit_code(), format!("{} ({})", e, path.display())))
}

pub fn parse_parameters(text: &str) -> Result<ScoringParameters, AppError> {
    let params: ScoringParameters = serde_json::from_str(text)
        .map_err(|e| AppError::new(2, format!("Invalid scoring parameters JSON: {e}")))?;
    params.validate()?;
    Ok(params)
}

/// Everything one run needs, resolved up front.
#[derive(Debug, Clone)]
pub struct Session {
    pub settings: Settings,
    pub params: ScoringParameters,
    /// Crops to score; empty means all.
    pub selection: BTreeSet<String>,
    pub dispatch: Dispatch,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            params: ScoringParameters::default(),
            selection: BTreeSet::new(),
            dispatch: Dispatch::Parallel,
        }
    }
}
