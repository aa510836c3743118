//! Single-shot providers: current weather, soil chemistry, terrain.
//!
//! Each fetcher turns its provider's response into a report [`Section`]. A
//! failed request never aborts anything; it only degrades that section (or,
//! for soil, that one property).

use rayon::prelude::*;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::data::client::{JsonSource, Params, fetch};
use crate::domain::{
    Fields, KEY_ELEVATION, KEY_HUMIDITY, KEY_LOCATION, KEY_PRESSURE, KEY_TEMPERATURE, Section, Value,
};

pub const WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const SOIL_URL: &str = "https://rest.isric.org/soilgrids/v2.0/properties/query";
pub const TERRAIN_URL: &str = "https://api.opentopodata.org/v1/srtm90m";

pub const SOIL_DEPTH: &str = "0-5cm";
pub const SOIL_PROPERTIES: [&str; 7] = ["phh2o", "soc", "clay", "silt", "sand", "cec", "cfvo"];

pub const NO_WEATHER: &str = "No weather data retrieved.";
pub const NO_SOIL: &str = "No soil data retrieved.";
pub const NO_ELEVATION: &str = "No elevation data retrieved.";

/// Sequential or fork-join dispatch of independent requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Sequential,
    Parallel,
}

#[derive(Debug, Deserialize)]
struct WeatherResponse {
    main: WeatherMain,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WeatherMain {
    temp: Option<f64>,
    humidity: Option<f64>,
    pressure: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TerrainResponse {
    #[serde(default)]
    results: Vec<TerrainResult>,
}

#[derive(Debug, Deserialize)]
struct TerrainResult {
    elevation: Option<f64>,
}

/// Current temperature, humidity and pressure at the point.
pub fn fetch_weather(
    source: &(impl JsonSource + ?Sized),
    api_key: Option<&str>,
    latitude: f64,
    longitude: f64,
) -> Section {
    let Some(api_key) = api_key.filter(|k| !k.is_empty()) else {
        warn!("no weather API key configured; skipping current weather");
        return Section::Message(NO_WEATHER.to_string());
    };

    let params: Params = vec![
        ("lat", latitude.to_string()),
        ("lon", longitude.to_string()),
        ("appid", api_key.to_string()),
        ("units", "metric".to_string()),
    ];
    let Some(resp) = fetch::<WeatherResponse>(source, WEATHER_URL, &params) else {
        return Section::Message(NO_WEATHER.to_string());
    };

    Section::Fields(
        Fields::new()
            .with(
                KEY_LOCATION,
                Some(Value::Text(resp.name.unwrap_or_else(|| "Unknown".to_string()))),
            )
            .with(KEY_TEMPERATURE, resp.main.temp.map(Value::Number))
            .with(KEY_HUMIDITY, resp.main.humidity.map(Value::Number))
            .with(KEY_PRESSURE, resp.main.pressure.map(Value::Number)),
    )
}

/// Mean of each soil property at the fixed depth band; one request per property.
///
/// Properties are independently nullable and always listed in
/// [`SOIL_PROPERTIES`] order, whichever dispatch mode is used.
pub fn fetch_soil(
    source: &(impl JsonSource + ?Sized),
    latitude: f64,
    longitude: f64,
    dispatch: Dispatch,
) -> Section {
    fetch_soil_properties(source, latitude, longitude, &SOIL_PROPERTIES, dispatch)
}

pub fn fetch_soil_properties(
    source: &(impl JsonSource + ?Sized),
    latitude: f64,
    longitude: f64,
    properties: &[&'static str],
    dispatch: Dispatch,
) -> Section {
    if properties.is_empty() {
        return Section::Message(NO_SOIL.to_string());
    }

    let one = |prop: &&'static str| soil_property(source, latitude, longitude, *prop);
    let values: Vec<Option<f64>> = match dispatch {
        Dispatch::Sequential => properties.iter().map(one).collect(),
        Dispatch::Parallel => properties.par_iter().map(one).collect(),
    };

    let mut fields = Fields::new();
    for (prop, value) in properties.iter().zip(values) {
        fields.insert(*prop, value.map(Value::Number));
    }
    Section::Fields(fields)
}

fn soil_property(
    source: &(impl JsonSource + ?Sized),
    latitude: f64,
    longitude: f64,
    prop: &'static str,
) -> Option<f64> {
    let params: Params = vec![
        ("lat", latitude.to_string()),
        ("lon", longitude.to_string()),
        ("property", prop.to_string()),
        ("depth", SOIL_DEPTH.to_string()),
        ("value", "mean".to_string()),
    ];
    let resp = source.get_json(SOIL_URL, &params)?;
    let value = resp
        .get("features")?
        .get(0)?
        .get("properties")?
        .get(prop)?
        .get(SOIL_DEPTH)?
        .get("mean")?
        .as_f64();
    if value.is_none() {
        debug!(prop, "soil property has no mean value");
    }
    value
}

/// Elevation of the point; the first result is used.
pub fn fetch_terrain(source: &(impl JsonSource + ?Sized), latitude: f64, longitude: f64) -> Section {
    let params: Params = vec![("locations", format!("{latitude},{longitude}"))];
    let Some(resp) = fetch::<TerrainResponse>(source, TERRAIN_URL, &params) else {
        return Section::Message(NO_ELEVATION.to_string());
    };
    match resp.results.first() {
        Some(first) => Section::Fields(
            Fields::new().with(KEY_ELEVATION, first.elevation.map(Value::Number)),
        ),
        None => Section::Message(NO_ELEVATION.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::data::client::testing::{ScriptedSource, param};

    fn soil_doc(prop: &str, mean: serde_json::Value) -> serde_json::Value {
        json!({"features": [{"properties": {prop: {"0-5cm": {"mean": mean}}}}]})
    }

    #[test]
    fn weather_maps_main_fields_and_location() {
        let source = ScriptedSource::new().route(WEATHER_URL, |_| {
            Some(json!({"name": "Ibadan", "main": {"temp": 27.5, "humidity": 80, "pressure": 1010}}))
        });
        let section = fetch_weather(&source, Some("k"), 7.4, 3.9);
        assert_eq!(section.number(KEY_TEMPERATURE), Some(27.5));
        assert_eq!(section.number(KEY_HUMIDITY), Some(80.0));
        assert_eq!(section.number(KEY_PRESSURE), Some(1010.0));
        assert_eq!(
            section.fields().unwrap().get(KEY_LOCATION),
            Some(&Value::Text("Ibadan".into()))
        );
        let calls = source.calls_to(WEATHER_URL);
        assert_eq!(param(&calls[0], "units"), Some("metric"));
    }

    #[test]
    fn weather_without_name_is_labelled_unknown_and_missing_fields_absent() {
        let source = ScriptedSource::new().route(WEATHER_URL, |_| Some(json!({"main": {"temp": 3.0}})));
        let section = fetch_weather(&source, Some("k"), 0.0, 0.0);
        let fields = section.fields().unwrap();
        assert_eq!(fields.get(KEY_LOCATION), Some(&Value::Text("Unknown".into())));
        assert!(fields.contains_key(KEY_HUMIDITY));
        assert_eq!(fields.get(KEY_HUMIDITY), None);
    }

    #[test]
    fn weather_failure_or_missing_key_yields_placeholder() {
        let source = ScriptedSource::new();
        assert_eq!(
            fetch_weather(&source, Some("k"), 0.0, 0.0),
            Section::Message(NO_WEATHER.into())
        );
        assert_eq!(
            fetch_weather(&source, None, 0.0, 0.0),
            Section::Message(NO_WEATHER.into())
        );
        assert_eq!(source.calls_to(WEATHER_URL).len(), 1);
    }

    #[test]
    fn soil_properties_fail_independently_and_keep_order() {
        let source = ScriptedSource::new().route(SOIL_URL, |params| {
            match param(params, "property") {
                Some("phh2o") => Some(soil_doc("phh2o", json!(6.4))),
                Some("clay") => Some(soil_doc("clay", json!(null))),
                Some("sand") => Some(json!({"features": []})),
                Some(p) => Some(soil_doc(p, json!(10.0))),
                None => None,
            }
        });

        for dispatch in [Dispatch::Sequential, Dispatch::Parallel] {
            let section = fetch_soil(&source, 1.0, 2.0, dispatch);
            let fields = section.fields().unwrap();
            let keys: Vec<_> = fields.iter().map(|(k, _)| k).collect();
            assert_eq!(keys, SOIL_PROPERTIES.to_vec());
            assert_eq!(section.number("phh2o"), Some(6.4));
            assert_eq!(section.number("clay"), None);
            assert_eq!(section.number("sand"), None);
            assert_eq!(section.number("cfvo"), Some(10.0));
        }
        assert_eq!(source.calls_to(SOIL_URL).len(), 2 * SOIL_PROPERTIES.len());
    }

    #[test]
    fn terrain_uses_first_result() {
        let source = ScriptedSource::new().route(TERRAIN_URL, |params| {
            assert_eq!(param(params, "locations"), Some("45.5,-73.25"));
            Some(json!({"results": [{"elevation": 36.0}, {"elevation": 99.0}]}))
        });
        let section = fetch_terrain(&source, 45.5, -73.25);
        assert_eq!(section.number(KEY_ELEVATION), Some(36.0));
    }

    #[test]
    fn terrain_without_results_yields_placeholder() {
        let source = ScriptedSource::new().route(TERRAIN_URL, |_| Some(json!({"results": []})));
        assert_eq!(
            fetch_terrain(&source, 0.0, 0.0),
            Section::Message(NO_ELEVATION.into())
        );
    }
}
