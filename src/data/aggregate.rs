//! Report aggregation.
//!
//! Fans out to the climate resolver and the three single-shot providers and
//! merges their sections into one [`Report`]. Sources fail independently: a
//! failed source only degrades its own section, and a report is always
//! produced. With [`Dispatch::Parallel`] the four sections (and the soil
//! properties) run behind a `rayon::join` barrier; the merged order is fixed.

use chrono::NaiveDate;
use tracing::info;

use crate::data::client::JsonSource;
use crate::data::climate::ClimateResolver;
use crate::data::providers::{Dispatch, fetch_soil, fetch_terrain, fetch_weather};
use crate::domain::{ClimateQuery, Fields, KEY_ERROR, Report, Section, Value};

/// Everything needed to build one report.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub query: ClimateQuery,
    pub weather_api_key: Option<String>,
    pub dispatch: Dispatch,
}

/// Build the unified report. Never fails; see module docs.
pub fn build_report(
    source: &(impl JsonSource + ?Sized),
    request: &ReportRequest,
    today: NaiveDate,
) -> Report {
    let q = &request.query;
    let (lat, lon) = (q.latitude, q.longitude);
    let key = request.weather_api_key.as_deref();

    let climate = || climate_section(source, q, today);
    let weather = || fetch_weather(source, key, lat, lon);
    let soil = || fetch_soil(source, lat, lon, request.dispatch);
    let elevation = || fetch_terrain(source, lat, lon);

    let report = match request.dispatch {
        Dispatch::Sequential => Report {
            climate: climate(),
            weather: weather(),
            soil: soil(),
            elevation: elevation(),
        },
        Dispatch::Parallel => {
            let ((climate, weather), (soil, elevation)) = rayon::join(
                || rayon::join(climate, weather),
                || rayon::join(soil, elevation),
            );
            Report {
                climate,
                weather,
                soil,
                elevation,
            }
        }
    };

    let degraded = report
        .sections()
        .filter(|(_, s)| !matches!(s, Section::Fields(_)))
        .count();
    info!(lat, lon, degraded, "report assembled");
    report
}

fn climate_section(
    source: &(impl JsonSource + ?Sized),
    query: &ClimateQuery,
    today: NaiveDate,
) -> Section {
    match ClimateResolver::new(source).resolve(query, today) {
        Ok(record) => record.into(),
        Err(exhausted) => Section::Fields(
            Fields::new().with(KEY_ERROR, Some(Value::Text(exhausted.to_string()))),
        ),
    }
}
