//! The unified environmental report.
//!
//! A `Report` always has all four sections. Each section is either a list of
//! fields (each possibly absent) or a human-readable placeholder message, so
//! callers never have to guess whether a section was fetched at all.

use crate::domain::types::{ClimateRecord, Dimension, SensorVector};

pub const SECTION_CLIMATE: &str = "Climate Data";
pub const SECTION_WEATHER: &str = "Weather Data";
pub const SECTION_SOIL: &str = "Soil Data (Depth 0-5cm)";
pub const SECTION_ELEVATION: &str = "Elevation Data";

pub const KEY_DATE_RANGE: &str = "Date Range";
pub const KEY_AVG_TEMPERATURE: &str = "Average Temperature (T2M)";
pub const KEY_TOTAL_PRECIPITATION: &str = "Total Precipitation (PRECTOT)";
pub const KEY_ERROR: &str = "Error";
pub const KEY_LOCATION: &str = "Location";
pub const KEY_TEMPERATURE: &str = "Temperature";
pub const KEY_HUMIDITY: &str = "Humidity";
pub const KEY_PRESSURE: &str = "Pressure";
pub const KEY_SOIL_PH: &str = "phh2o";
pub const KEY_ELEVATION: &str = "Elevation (meters)";

/// Which of the four report sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Climate,
    Weather,
    Soil,
    Elevation,
}

impl SectionKind {
    /// Merge order of the report.
    pub const ALL: [SectionKind; 4] = [
        SectionKind::Climate,
        SectionKind::Weather,
        SectionKind::Soil,
        SectionKind::Elevation,
    ];

    pub fn title(self) -> &'static str {
        match self {
            SectionKind::Climate => SECTION_CLIMATE,
            SectionKind::Weather => SECTION_WEATHER,
            SectionKind::Soil => SECTION_SOIL,
            SectionKind::Elevation => SECTION_ELEVATION,
        }
    }

    pub fn from_title(title: &str) -> Option<Self> {
        SectionKind::ALL.into_iter().find(|k| k.title() == title)
    }
}

/// A single report value.
///
/// Values re-read from a persisted report are always `Text`; `as_f64` parses
/// them so numeric consumers do not care which path produced the report.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v).filter(|v| v.is_finite()),
            Value::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(v) => write!(f, "{v}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// Ordered key → optional value pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
    entries: Vec<(String, Option<Value>)>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a field, keeping first-insertion order.
    pub fn insert(&mut self, key: impl Into<String>, value: Option<Value>) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: Option<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// The value for `key`; `None` both when the key is missing and when it is unset.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_ref())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One report section.
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    Fields(Fields),
    /// Failure or status placeholder.
    Message(String),
    /// A scalar section whose persisted value was empty.
    Unset,
}

impl Section {
    pub fn fields(&self) -> Option<&Fields> {
        match self {
            Section::Fields(f) => Some(f),
            _ => None,
        }
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.fields()?.get(key)?.as_f64()
    }
}

impl From<ClimateRecord> for Section {
    fn from(record: ClimateRecord) -> Self {
        Section::Fields(
            Fields::new()
                .with(KEY_DATE_RANGE, Some(Value::Text(record.date_range)))
                .with(KEY_AVG_TEMPERATURE, record.avg_temperature.map(Value::Number))
                .with(
                    KEY_TOTAL_PRECIPITATION,
                    record.total_precipitation.map(Value::Number),
                ),
        )
    }
}

/// Environmental observations for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub climate: Section,
    pub weather: Section,
    pub soil: Section,
    pub elevation: Section,
}

impl Report {
    pub fn section(&self, kind: SectionKind) -> &Section {
        match kind {
            SectionKind::Climate => &self.climate,
            SectionKind::Weather => &self.weather,
            SectionKind::Soil => &self.soil,
            SectionKind::Elevation => &self.elevation,
        }
    }

    pub fn section_mut(&mut self, kind: SectionKind) -> &mut Section {
        match kind {
            SectionKind::Climate => &mut self.climate,
            SectionKind::Weather => &mut self.weather,
            SectionKind::Soil => &mut self.soil,
            SectionKind::Elevation => &mut self.elevation,
        }
    }

    /// Sections in merge order.
    pub fn sections(&self) -> impl Iterator<Item = (SectionKind, &Section)> {
        SectionKind::ALL.into_iter().map(|k| (k, self.section(k)))
    }

    /// Reduce the report to a sensor vector. Missing or non-numeric values are absent.
    pub fn sensor_vector(&self) -> SensorVector {
        let mut s = SensorVector::default();
        s.set(Dimension::Temperature, self.weather.number(KEY_TEMPERATURE));
        s.set(Dimension::Humidity, self.weather.number(KEY_HUMIDITY));
        s.set(Dimension::Pressure, self.weather.number(KEY_PRESSURE));
        s.set(
            Dimension::AvgTemperature,
            self.climate.number(KEY_AVG_TEMPERATURE),
        );
        s.set(
            Dimension::Precipitation,
            self.climate.number(KEY_TOTAL_PRECIPITATION),
        );
        s.set(Dimension::SoilPh, self.soil.number(KEY_SOIL_PH));
        s
    }
}

impl Default for Report {
    fn default() -> Self {
        Self {
            climate: Section::Unset,
            weather: Section::Unset,
            soil: Section::Unset,
            elevation: Section::Unset,
        }
    }
}
