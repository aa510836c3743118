//! Per-crop optimal profiles.
//!
//! Rows are grouped by the negotiated identifier column and each group's four
//! feature columns are averaged. There is no minimum sample size: a crop with
//! a single row gets that row as its profile. Cells that are empty or not
//! numeric are skipped column by column; a crop with no numeric value at all
//! in a column gets `NaN` there.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::domain::{OptimalProfile, ProfileSet};
use crate::error::SchemaError;
use crate::io::dataset::{
    COL_HUMIDITY, COL_PH, COL_RAINFALL, COL_TEMPERATURE, CropTable, feature_columns,
    resolve_identifier_column,
};

#[derive(Debug, Clone, Copy, Default)]
struct Mean {
    sum: f64,
    n: usize,
}

impl Mean {
    fn push(&mut self, v: Option<f64>) {
        if let Some(v) = v {
            self.sum += v;
            self.n += 1;
        }
    }

    fn value(self) -> f64 {
        if self.n == 0 {
            f64::NAN
        } else {
            self.sum / self.n as f64
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    temperature: Mean,
    humidity: Mean,
    ph: Mean,
    rainfall: Mean,
}

/// Build one profile per distinct crop identifier.
pub fn build_profiles(table: &CropTable) -> Result<ProfileSet, SchemaError> {
    let id_name = resolve_identifier_column(table.columns())?;
    let id_col = table
        .column_index(&id_name)
        .ok_or_else(|| SchemaError::MissingFeatureColumn {
            column: id_name.clone(),
        })?;
    let cols = feature_columns(table)?;

    let number = |row: usize, name: &str| -> Option<f64> {
        let raw = table.cell(row, cols[name])?;
        raw.parse::<f64>().ok().filter(|v| v.is_finite())
    };

    let mut groups: BTreeMap<String, Accumulator> = BTreeMap::new();
    let mut unlabeled = 0usize;
    for row in 0..table.len() {
        let Some(id) = table.cell(row, id_col) else {
            unlabeled += 1;
            continue;
        };
        let acc = groups.entry(id.to_string()).or_default();
        acc.temperature.push(number(row, COL_TEMPERATURE));
        acc.humidity.push(number(row, COL_HUMIDITY));
        acc.ph.push(number(row, COL_PH));
        acc.rainfall.push(number(row, COL_RAINFALL));
    }
    if unlabeled > 0 {
        warn!(unlabeled, column = %id_name, "rows without a crop identifier were ignored");
    }

    let profiles: ProfileSet = groups
        .into_iter()
        .map(|(id, acc)| {
            let profile = OptimalProfile {
                temperature: acc.temperature.value(),
                humidity: acc.humidity.value(),
                ph: acc.ph.value(),
                rainfall: acc.rainfall.value(),
            };
            (id, profile)
        })
        .collect();

    debug!(crops = profiles.len(), column = %id_name, "built optimal profiles");
    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use approx::assert_relative_eq;

    use super::*;
    use crate::io::dataset::load_crop_tables;

    const HEADER: &str = "label,Temperature,Humidity,pH,Rainfall\n";

    #[test]
    fn pools_rows_across_files_per_crop() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("one.csv"),
            format!("{HEADER}rice,20,80,6.0,200\nrice,24,84,7.0,220\n"),
        )
        .unwrap();
        fs::write(
            dir.path().join("two.csv"),
            format!("{HEADER}chickpea,18,16,7.2,80\n"),
        )
        .unwrap();

        let profiles = build_profiles(&load_crop_tables(dir.path()).unwrap()).unwrap();
        assert_eq!(profiles.len(), 2);

        let rice = profiles["rice"];
        assert_relative_eq!(rice.temperature, 22.0);
        assert_relative_eq!(rice.humidity, 82.0);
        assert_relative_eq!(rice.ph, 6.5);
        assert_relative_eq!(rice.rainfall, 210.0);

        let chickpea = profiles["chickpea"];
        assert_relative_eq!(chickpea.temperature, 18.0);

        let order: Vec<_> = profiles.keys().cloned().collect();
        assert_eq!(order, vec!["chickpea", "rice"]);
    }

    #[test]
    fn missing_identifier_column_is_a_schema_error() {
        let mut table = CropTable::default();
        table.append(
            &["name".into(), "Temperature".into()],
            vec![vec!["x".into(), "1".into()]],
            "x.csv".into(),
        );
        assert!(matches!(
            build_profiles(&table),
            Err(SchemaError::NoIdentifierColumn { .. })
        ));
    }

    #[test]
    fn missing_feature_column_is_a_schema_error() {
        let mut table = CropTable::default();
        table.append(
            &["crop".into(), "Temperature".into(), "Humidity".into(), "pH".into()],
            vec![vec!["x".into(), "1".into(), "2".into(), "3".into()]],
            "x.csv".into(),
        );
        assert_eq!(
            build_profiles(&table).unwrap_err(),
            SchemaError::MissingFeatureColumn {
                column: "Rainfall".into()
            }
        );
    }

    #[test]
    fn malformed_cells_are_skipped_per_column() {
        let mut table = CropTable::default();
        let headers: Vec<String> = ["crop", "Temperature", "Humidity", "pH", "Rainfall"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let row = |v: [&str; 5]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        table.append(
            &headers,
            vec![
                row(["millet", "30", "n/a", "6", ""]),
                row(["millet", "32", "40", "", ""]),
            ],
            "x.csv".into(),
        );

        let p = build_profiles(&table).unwrap()["millet"];
        assert_relative_eq!(p.temperature, 31.0);
        assert_relative_eq!(p.humidity, 40.0);
        assert_relative_eq!(p.ph, 6.0);
        assert!(p.rainfall.is_nan());
    }
}
