//! Exports: ranked crop scores (CSV) and per-crop row counts (text).
//!
//! Both are meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::AppError;
use crate::report::CropScore;

/// Write ranked scores as `rank,crop,score`.
pub fn write_scores_csv(path: &Path, ranked: &[CropScore]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut w = csv::Writer::from_writer(file);
    let fail = |e: csv::Error| AppError::new(4, format!("Failed to write export CSV: {e}"));

    w.write_record(["rank", "crop", "score"]).map_err(fail)?;
    for (idx, row) in ranked.iter().enumerate() {
        w.write_record([(idx + 1).to_string(), row.crop.clone(), format!("{:.10}", row.score)])
            .map_err(fail)?;
    }
    w.flush()
        .map_err(|e| AppError::new(4, format!("Failed to write export CSV: {e}")))?;
    Ok(())
}

/// Write the total row count and the per-crop counts.
pub fn write_plant_counts(path: &Path, total: usize, counts: &[(String, usize)]) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create count file '{}': {e}", path.display())))?;

    writeln!(file, "Total number of plant rows: {total}")
        .map_err(|e| AppError::new(4, format!("Failed to write count file: {e}")))?;
    writeln!(file, "Counts per crop:")
        .map_err(|e| AppError::new(4, format!("Failed to write count file: {e}")))?;
    for (crop, n) in counts {
        writeln!(file, "{crop}: {n}")
            .map_err(|e| AppError::new(4, format!("Failed to write count file: {e}")))?;
    }
    Ok(())
}
