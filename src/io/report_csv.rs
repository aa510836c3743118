//! Flat `Section,Key,Value` persistence of a [`Report`].
//!
//! - field sections write one row per field
//! - message sections write a single row with an empty key
//! - an absent value is written as an empty cell and read back as absent
//!
//! Numbers are written as text and come back as `Value::Text`; consumers use
//! `Value::as_f64`, so the loss of typing does not matter to them.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use tracing::warn;

use crate::domain::{Fields, Report, Section, SectionKind, Value};
use crate::error::AppError;

const HEADER: [&str; 3] = ["Section", "Key", "Value"];

/// Write the report as CSV to any writer.
pub fn write_report<W: Write>(report: &Report, writer: W) -> Result<(), AppError> {
    let mut w = csv::Writer::from_writer(writer);
    let fail = |e: csv::Error| AppError::new(4, format!("Failed to write report CSV: {e}"));

    w.write_record(HEADER).map_err(fail)?;
    for (kind, section) in report.sections() {
        match section {
            Section::Fields(fields) => {
                for (key, value) in fields.iter() {
                    let cell = value.map(|v| v.to_string()).unwrap_or_default();
                    w.write_record([kind.title(), key, cell.as_str()]).map_err(fail)?;
                }
            }
            Section::Message(msg) => w.write_record([kind.title(), "", msg.as_str()]).map_err(fail)?,
            Section::Unset => w.write_record([kind.title(), "", ""]).map_err(fail)?,
        }
    }
    w.flush()
        .map_err(|e| AppError::new(4, format!("Failed to write report CSV: {e}")))?;
    Ok(())
}

/// Read a report written by [`write_report`].
///
/// Sections missing from the input stay `Section::Unset`; unknown section
/// names are skipped with a warning.
pub fn read_report<R: Read>(reader: R) -> Result<Report, AppError> {
    let mut r = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let mut report = Report::default();

    for (idx, result) in r.records().enumerate() {
        let line = idx + 2;
        let record =
            result.map_err(|e| AppError::new(2, format!("Invalid report CSV at line {line}: {e}")))?;
        let (Some(title), Some(key)) = (record.get(0), record.get(1)) else {
            warn!(line, "skipping short report row");
            continue;
        };
        let value = record.get(2).unwrap_or("");
        let Some(kind) = SectionKind::from_title(title) else {
            warn!(line, section = title, "skipping unknown report section");
            continue;
        };

        let unset = value.is_empty();
        let slot = report.section_mut(kind);
        if key.is_empty() {
            *slot = if unset {
                Section::Unset
            } else {
                Section::Message(value.to_string())
            };
            continue;
        }

        if !matches!(slot, Section::Fields(_)) {
            *slot = Section::Fields(Fields::new());
        }
        if let Section::Fields(fields) = slot {
            let v = (!unset).then(|| Value::Text(value.to_string()));
            fields.insert(key, v);
        }
    }
    Ok(report)
}

pub fn write_report_csv(path: &Path, report: &Report) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(4, format!("Failed to create report CSV '{}': {e}", path.display()))
    })?;
    write_report(report, file)
}

pub fn read_report_csv(path: &Path) -> Result<Report, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open report CSV '{}': {e}", path.display()))
    })?;
    read_report(file)
}
