//! Shared recommendation pipeline.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! dataset -> profiles -> report -> sensor vector -> completion -> scores -> ranking
//!
//! The front-end only supplies the remote source, the clock and the
//! completion step (prompt or fail), which keeps the whole flow testable.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::config::Session;
use crate::data::{JsonSource, ReportRequest, build_report};
use crate::domain::{ClimateQuery, ProfileSet, Report, SensorVector};
use crate::error::AppError;
use crate::fit::{Recommendation, recommend_crop};
use crate::io::{CropTable, load_crop_tables, resolve_identifier_column};
use crate::models::build_profiles;
use crate::report::{CropScore, rank_scores};

/// The reference dataset after selection, with its profiles.
#[derive(Debug, Clone)]
pub struct CropModel {
    pub table: CropTable,
    pub id_column: String,
    pub profiles: ProfileSet,
    /// Rows in the whole dataset, before any crop selection.
    pub total_rows: usize,
    /// Row count per crop in the whole dataset, before any crop selection.
    pub counts: Vec<(String, usize)>,
}

/// All computed outputs of a single `recommend` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub report: Report,
    /// Sensor vector as scored (after overrides and completion).
    pub sensor: SensorVector,
    pub recommendation: Recommendation,
    pub ranked: Vec<CropScore>,
}

/// Load the dataset, apply the crop selection and build profiles.
pub fn load_crop_model(session: &Session) -> Result<CropModel, AppError> {
    let dir = &session.settings.dataset_dir;
    let mut table = load_crop_tables(dir)?;
    if table.is_empty() {
        return Err(AppError::new(
            3,
            format!("No crop reference rows found in '{}'.", dir.display()),
        ));
    }

    let id_column = resolve_identifier_column(table.columns())?;
    let total_rows = table.len();
    let counts = table
        .column_index(&id_column)
        .map(|idx| table.crop_counts(idx))
        .unwrap_or_default();
    if !session.selection.is_empty() {
        apply_selection(&mut table, &id_column, &session.selection)?;
    }

    let profiles = build_profiles(&table)?;
    info!(crops = profiles.len(), rows = table.len(), "crop profiles built");
    Ok(CropModel {
        table,
        id_column,
        profiles,
        total_rows,
        counts,
    })
}

fn apply_selection(
    table: &mut CropTable,
    id_column: &str,
    selection: &BTreeSet<String>,
) -> Result<(), AppError> {
    let Some(idx) = table.column_index(id_column) else {
        return Ok(());
    };
    let known = table.crop_identifiers(idx);
    for crop in selection.iter().filter(|c| !known.contains(*c)) {
        warn!(crop = %crop, "selected crop not in dataset");
    }

    table.retain_crops(idx, selection);
    if table.is_empty() {
        return Err(AppError::new(
            3,
            format!(
                "None of the selected crops are in the dataset: {}.",
                selection.iter().cloned().collect::<Vec<_>>().join(", ")
            ),
        ));
    }
    Ok(())
}

/// Fetch the unified report for a point and month.
pub fn collect_report(
    session: &Session,
    source: &(impl JsonSource + ?Sized),
    query: ClimateQuery,
    today: NaiveDate,
) -> Report {
    let request = ReportRequest {
        query,
        weather_api_key: session.settings.weather_api_key.clone(),
        dispatch: session.dispatch,
    };
    build_report(source, &request, today)
}

/// Score a report against a crop model.
///
/// `overrides` replace readings taken from the report; `complete` is called
/// only if readings are still missing and must fill them (or fail).
pub fn recommend_from_report(
    session: &Session,
    model: &CropModel,
    report: Report,
    overrides: &SensorVector,
    complete: impl FnOnce(&mut SensorVector) -> Result<(), AppError>,
    top_n: usize,
) -> Result<RunOutput, AppError> {
    let mut sensor = *overrides;
    sensor.fill_from(&report.sensor_vector());

    if !sensor.missing().is_empty() {
        info!(missing = ?sensor.missing(), "sensor readings incomplete");
        complete(&mut sensor)?;
    }

    let recommendation = recommend_crop(&sensor, &model.profiles, &session.params)?;
    if !recommendation.best_score.is_finite() {
        return Err(AppError::new(
            4,
            format!("Non-finite fitness score for {}.", recommendation.best_crop),
        ));
    }
    let ranked = rank_scores(&recommendation, top_n);

    Ok(RunOutput {
        report,
        sensor,
        recommendation,
        ranked,
    })
}

/// Full pipeline: load the model first (fail fast on a bad dataset), then
/// fetch the report and score it.
pub fn run_recommend(
    session: &Session,
    source: &(impl JsonSource + ?Sized),
    query: ClimateQuery,
    today: NaiveDate,
    overrides: &SensorVector,
    complete: impl FnOnce(&mut SensorVector) -> Result<(), AppError>,
    top_n: usize,
) -> Result<(CropModel, RunOutput), AppError> {
    let model = load_crop_model(session)?;
    let report = collect_report(session, source, query, today);
    let run = recommend_from_report(session, &model, report, overrides, complete, top_n)?;
    Ok((model, run))
}
