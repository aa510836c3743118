//! Monthly climate lookup with a bounded backward search over years.
//!
//! For a point and a month the resolver tries the (past-normalized) requested
//! year first, then each earlier year, until one yields usable data:
//!
//! - daily `T2M` / `PRECTOT` come from NASA POWER; `-999` marks a missing day
//! - temperature is the mean of valid days, precipitation the sum
//! - if every precipitation day is missing, the Open-Meteo archive's
//!   `precipitation_sum` over the same window is used instead
//! - the first year with either value present wins (recency beats completeness)

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::data::client::{JsonSource, Params, fetch};
use crate::domain::{ClimateQuery, ClimateRecord};

pub const POWER_URL: &str = "https://power.larc.nasa.gov/api/temporal/daily/point";
pub const ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";

/// NASA POWER's missing-value code.
pub const POWER_SENTINEL: f64 = -999.0;

pub const DEFAULT_MAX_YEARS_BACK: u32 = 5;

const PARAM_TEMPERATURE: &str = "T2M";
const PARAM_PRECIPITATION: &str = "PRECTOT";

/// Every candidate year came back without usable data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("No climate data for month {month} in past {depth} years from {year}.")]
pub struct ClimateSearchExhausted {
    pub month: u32,
    pub year: i32,
    pub depth: u32,
}

#[derive(Debug, Deserialize)]
struct PowerResponse {
    properties: PowerProperties,
}

#[derive(Debug, Deserialize)]
struct PowerProperties {
    parameter: BTreeMap<String, BTreeMap<String, f64>>,
}

#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    daily: ArchiveDaily,
}

#[derive(Debug, Deserialize)]
struct ArchiveDaily {
    #[serde(default)]
    precipitation_sum: Vec<Option<f64>>,
}

/// First and last day of `month` in `year`.
pub fn month_window(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next.pred_opt()?))
}

pub struct ClimateResolver<'a, S: JsonSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: JsonSource + ?Sized> ClimateResolver<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Find the most recent year (at most `max_years_back` attempts) with usable data.
    pub fn resolve(
        &self,
        query: &ClimateQuery,
        today: NaiveDate,
    ) -> Result<ClimateRecord, ClimateSearchExhausted> {
        let mut year = query.normalized_year(today);
        if year != query.year {
            info!(
                month = query.month,
                requested = query.year,
                adjusted = year,
                "requested month is in the future; searching from an earlier year"
            );
        }

        for attempt in 0..query.max_years_back {
            debug!(attempt, year, month = query.month, "climate attempt");
            if let Some(record) = self.try_year(query, year) {
                return Ok(record);
            }
            year -= 1;
        }

        warn!(
            month = query.month,
            year = query.year,
            depth = query.max_years_back,
            "climate search exhausted"
        );
        Err(ClimateSearchExhausted {
            month: query.month,
            year: query.year,
            depth: query.max_years_back,
        })
    }

    fn try_year(&self, query: &ClimateQuery, year: i32) -> Option<ClimateRecord> {
        let (first, last) = month_window(year, query.month)?;
        let start = first.format("%Y%m%d").to_string();
        let end = last.format("%Y%m%d").to_string();

        let params: Params = vec![
            ("parameters", format!("{PARAM_TEMPERATURE},{PARAM_PRECIPITATION}")),
            ("community", "RE".to_string()),
            ("longitude", query.longitude.to_string()),
            ("latitude", query.latitude.to_string()),
            ("start", start.clone()),
            ("end", end.clone()),
            ("format", "JSON".to_string()),
        ];
        let response: PowerResponse = fetch(self.source, POWER_URL, &params)?;
        let parameters = response.properties.parameter;

        let temperatures = valid_days(parameters.get(PARAM_TEMPERATURE));
        let precipitation = valid_days(parameters.get(PARAM_PRECIPITATION));

        let avg_temperature = mean(&temperatures);
        let total_precipitation = if precipitation.is_empty() {
            debug!(year, "primary precipitation missing; trying archive");
            self.archive_precipitation(query, first, last)
        } else {
            Some(precipitation.iter().sum())
        };

        if avg_temperature.is_none() && total_precipitation.is_none() {
            return None;
        }

        Some(ClimateRecord {
            date_range: format!("{start} to {end}"),
            avg_temperature,
            total_precipitation,
        })
    }

    fn archive_precipitation(&self, query: &ClimateQuery, first: NaiveDate, last: NaiveDate) -> Option<f64> {
        let params: Params = vec![
            ("latitude", query.latitude.to_string()),
            ("longitude", query.longitude.to_string()),
            ("start_date", first.format("%Y-%m-%d").to_string()),
            ("end_date", last.format("%Y-%m-%d").to_string()),
            ("daily", "precipitation_sum".to_string()),
            ("timezone", "auto".to_string()),
        ];
        let response: ArchiveResponse = fetch(self.source, ARCHIVE_URL, &params)?;
        let values: Vec<f64> = response
            .daily
            .precipitation_sum
            .into_iter()
            .flatten()
            .filter(|v| v.is_finite())
            .collect();
        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum())
        }
    }
}

fn valid_days(series: Option<&BTreeMap<String, f64>>) -> Vec<f64> {
    series
        .map(|days| {
            days.values()
                .copied()
                .filter(|v| v.is_finite() && *v != POWER_SENTINEL)
                .collect()
        })
        .unwrap_or_default()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
