//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the fetch/scoring code stays clean and testable
//! - output changes are localized

use std::path::Path;

use crate::domain::{Dimension, ProfileSet, Report, Section, SensorVector};
use crate::fit::Recommendation;
use crate::report::CropScore;

/// Render the environmental report section by section.
pub fn format_report(report: &Report) -> String {
    let mut out = String::new();
    out.push_str("=== Location Report ===\n");
    for (kind, section) in report.sections() {
        out.push_str(&format!("\n[{}]\n", kind.title()));
        match section {
            Section::Fields(fields) => {
                for (key, value) in fields.iter() {
                    let shown = value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string());
                    out.push_str(&format!("  {key:<32} {shown}\n"));
                }
            }
            Section::Message(msg) => out.push_str(&format!("  {msg}\n")),
            Section::Unset => out.push_str("  (unset)\n"),
        }
    }
    out
}

/// The six readings used for scoring; absent ones are flagged.
pub fn format_sensor(sensor: &SensorVector) -> String {
    let mut out = String::from("Sensor readings:\n");
    for dim in Dimension::ALL {
        let shown = match sensor.get(dim) {
            Some(v) => format!("{v:.2}"),
            None => "missing".to_string(),
        };
        out.push_str(&format!("  {:<6} {:<34} {shown}\n", dim.key(), dim.display_name()));
    }
    out
}

/// Best crop + ranked table with score bars.
pub fn format_recommendation(rec: &Recommendation, ranked: &[CropScore], bar_width: usize) -> String {
    let mut out = String::new();
    out.push_str("=== Optimal Crop Recommendation ===\n");
    out.push_str(&format!(
        "Recommended Crop: {} (Fitness Score: {:.4})\n",
        rec.best_crop, rec.best_score
    ));
    out.push_str(&format!("Crops scored: {}\n\n", rec.scores.len()));
    out.push_str(&crate::plot::render_score_bars(ranked, bar_width));
    out
}

/// Profile table for dataset inspection.
pub fn format_profiles(profiles: &ProfileSet) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<24} {:>10} {:>10} {:>8} {:>10}\n",
        "crop", "temp", "humidity", "pH", "rainfall"
    ));
    out.push_str(&format!(
        "{:-<24} {:->10} {:->10} {:->8} {:->10}\n",
        "", "", "", "", ""
    ));
    for (crop, p) in profiles {
        out.push_str(&format!(
            "{:<24} {:>10.2} {:>10.2} {:>8.2} {:>10.2}\n",
            truncate(crop, 24),
            p.temperature,
            p.humidity,
            p.ph,
            p.rainfall
        ));
    }
    out
}

/// Row counts per crop (same layout as the plant-count export).
pub fn format_counts(total: usize, counts: &[(String, usize)], files: &[impl AsRef<Path>]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Files: {}\n",
        files
            .iter()
            .map(|p| p.as_ref().display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    ));
    out.push_str(&format!("Total number of plant rows: {total}\n"));
    out.push_str("Counts per crop:\n");
    for (crop, n) in counts {
        out.push_str(&format!("{crop}: {n}\n"));
    }
    out
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
