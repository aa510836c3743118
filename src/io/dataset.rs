//! Crop reference dataset loading.
//!
//! Every `*.csv` file in the dataset directory is read; files without data
//! rows are discarded and the rest are stacked into one [`CropTable`]. Files
//! are expected to share a schema, but columns are unioned by name (cells a
//! file does not have are empty) so a stray extra column does not misalign
//! the stack.
//!
//! The crop-identifier column is negotiated from a fixed priority list; see
//! [`resolve_identifier_column`].

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{AppError, SchemaError};

/// Candidate identifier columns, highest priority first.
pub const IDENTIFIER_CANDIDATES: [&str; 4] = ["label", "crop", "common_name", "plant_name"];

pub const COL_TEMPERATURE: &str = "Temperature";
pub const COL_HUMIDITY: &str = "Humidity";
pub const COL_PH: &str = "pH";
pub const COL_RAINFALL: &str = "Rainfall";

/// Rows from every non-empty reference file, stacked.
#[derive(Debug, Clone, Default)]
pub struct CropTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
    files: Vec<PathBuf>,
}

impl CropTable {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column (case-insensitive).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.eq_ignore_ascii_case(name))
    }

    /// Cell text (trimmed, non-empty) for `row` and column `idx`.
    pub fn cell(&self, row: usize, idx: usize) -> Option<&str> {
        self.rows
            .get(row)?
            .get(idx)?
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Append rows of one parsed file.
    pub fn append(&mut self, headers: &[String], records: Vec<Vec<String>>, source: PathBuf) {
        let mapping: Vec<usize> = headers
            .iter()
            .map(|h| match self.column_index(h) {
                Some(idx) => idx,
                None => {
                    self.columns.push(h.clone());
                    for row in &mut self.rows {
                        row.push(None);
                    }
                    self.columns.len() - 1
                }
            })
            .collect();

        for record in records {
            let mut row = vec![None; self.columns.len()];
            for (value, &idx) in record.into_iter().zip(&mapping) {
                row[idx] = Some(value);
            }
            self.rows.push(row);
        }
        self.files.push(source);
    }

    /// Keep only rows whose identifier is in `selection`.
    pub fn retain_crops(&mut self, id_col: usize, selection: &BTreeSet<String>) {
        self.rows.retain(|row| {
            row.get(id_col)
                .and_then(|c| c.as_deref())
                .map(str::trim)
                .is_some_and(|id| selection.contains(id))
        });
    }

    /// Distinct crop identifiers (sorted).
    pub fn crop_identifiers(&self, id_col: usize) -> BTreeSet<String> {
        (0..self.len())
            .filter_map(|r| self.cell(r, id_col))
            .map(str::to_string)
            .collect()
    }

    /// Row count per crop, most rows first, ties by identifier.
    pub fn crop_counts(&self, id_col: usize) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for r in 0..self.len() {
            if let Some(id) = self.cell(r, id_col) {
                *counts.entry(id.to_string()).or_default() += 1;
            }
        }
        let mut out: Vec<(String, usize)> = counts.into_iter().collect();
        out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        out
    }
}

/// Pick the crop identifier column: the first candidate present wins.
pub fn resolve_identifier_column(columns: &[String]) -> Result<String, SchemaError> {
    for candidate in IDENTIFIER_CANDIDATES {
        if let Some(found) = columns.iter().find(|c| c.eq_ignore_ascii_case(candidate)) {
            return Ok(found.clone());
        }
    }
    Err(SchemaError::NoIdentifierColumn {
        candidates: IDENTIFIER_CANDIDATES.iter().map(|s| s.to_string()).collect(),
        columns: columns.to_vec(),
    })
}

/// Load and stack every non-empty `*.csv` in `dir` (sorted by file name).
///
/// Returns an empty table when the directory has no usable files.
pub fn load_crop_tables(dir: &Path) -> Result<CropTable, AppError> {
    let entries = fs::read_dir(dir).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to read crop dataset directory '{}': {e}", dir.display()),
        )
    })?;

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_csv(p))
        .collect();
    files.sort();

    if files.is_empty() {
        warn!(dir = %dir.display(), "no CSV files in crop dataset directory");
    }

    let mut table = CropTable::default();
    for path in files {
        let (headers, records) = read_csv_file(&path)?;
        if records.is_empty() {
            debug!(file = %path.display(), "skipping empty crop table");
            continue;
        }
        debug!(file = %path.display(), rows = records.len(), "loaded crop table");
        table.append(&headers, records, path);
    }

    info!(
        files = table.files().len(),
        rows = table.len(),
        columns = table.columns().len(),
        "crop dataset loaded"
    );
    Ok(table)
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn read_csv_file(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>), SchemaError> {
    let unreadable = |message: String| SchemaError::Unreadable {
        path: path.to_path_buf(),
        message,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| unreadable(e.to_string()))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| unreadable(e.to_string()))?
        .iter()
        .map(normalize_header_name)
        .collect();

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        match result {
            Ok(record) => records.push(record.iter().map(str::to_string).collect()),
            // +2: header line plus 1-based numbering.
            Err(e) => warn!(file = %path.display(), line = idx + 2, error = %e, "skipping malformed row"),
        }
    }
    Ok((headers, records))
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

/// Column lookup shared by the model builder.
pub(crate) fn feature_columns(table: &CropTable) -> Result<HashMap<&'static str, usize>, SchemaError> {
    let mut out = HashMap::new();
    for name in [COL_TEMPERATURE, COL_HUMIDITY, COL_PH, COL_RAINFALL] {
        let idx = table
            .column_index(name)
            .ok_or_else(|| SchemaError::MissingFeatureColumn {
                column: name.to_string(),
            })?;
        out.insert(name, idx);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write(dir: &Path, name: &str, body: &str) {
        let mut f = fs::File::create(dir.join(name)).unwrap();
        f.write_all(body.as_bytes()).unwrap();
    }

    #[test]
    fn identifier_priority_follows_candidate_order() {
        let cols = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(
            resolve_identifier_column(&cols(&["plant_name", "crop", "pH"])).unwrap(),
            "crop"
        );
        assert_eq!(
            resolve_identifier_column(&cols(&["Temperature", "LABEL"])).unwrap(),
            "LABEL"
        );
        let err = resolve_identifier_column(&cols(&["name", "Temperature"])).unwrap_err();
        assert!(matches!(err, SchemaError::NoIdentifierColumn { .. }));
    }

    #[test]
    fn loads_non_empty_csv_files_and_skips_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "a.csv",
            "\u{feff}label,Temperature,Humidity,pH,Rainfall\nrice,25,80,6.5,200\n",
        );
        write(dir.path(), "b.csv", "label,Temperature,Humidity,pH,Rainfall\n");
        write(dir.path(), "notes.txt", "label\nignored\n");
        write(
            dir.path(),
            "c.csv",
            "label,Temperature,Humidity,pH,Rainfall\nmaize,22,60,6.0,90\nmaize,24,62,6.2,110\n",
        );

        let table = load_crop_tables(dir.path()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.files().len(), 2);
        assert_eq!(table.columns()[0], "label");

        let id = table.column_index("label").unwrap();
        assert_eq!(
            table.crop_counts(id),
            vec![("maize".to_string(), 2), ("rice".to_string(), 1)]
        );
    }

    #[test]
    fn files_with_extra_columns_stack_by_name() {
        let mut table = CropTable::default();
        table.append(
            &["crop".into(), "pH".into()],
            vec![vec!["a".into(), "6".into()]],
            "x.csv".into(),
        );
        table.append(
            &["pH".into(), "crop".into(), "note".into()],
            vec![vec!["7".into(), "b".into(), "n".into()]],
            "y.csv".into(),
        );
        let crop = table.column_index("crop").unwrap();
        let ph = table.column_index("pH").unwrap();
        let note = table.column_index("note").unwrap();
        assert_eq!(table.cell(1, crop), Some("b"));
        assert_eq!(table.cell(1, ph), Some("7"));
        assert_eq!(table.cell(0, note), None);
    }

    #[test]
    fn missing_directory_is_a_configuration_error() {
        let err = load_crop_tables(Path::new("/definitely/not/here")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn retain_crops_filters_by_exact_identifier() {
        let mut table = CropTable::default();
        table.append(
            &["crop".into()],
            vec![vec!["rice".into()], vec!["maize".into()], vec!["rice ".into()]],
            "x.csv".into(),
        );
        let id = table.column_index("crop").unwrap();
        table.retain_crops(id, &BTreeSet::from(["rice".to_string()]));
        assert_eq!(table.len(), 2);
    }
}
