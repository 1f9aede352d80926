// Sheet files -> cleaned datasets.
//
// This is the only module that touches the filesystem on the input side.
// Everything after reading the text is the pure parse/clean pipeline.
use crate::config::Settings;
use crate::error::{DashboardError, Result};
use crate::fields::{aliases_for, FieldIndex};
use crate::fill::fill_down_in_place;
use crate::parser::parse_table;
use crate::types::{Dataset, Datasets};
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub sheets_loaded: usize,
    pub total_rows: usize,
    pub missing_files: Vec<String>,
    pub filled_cells: usize,
}

/// Parse `text` into a dataset named `name` and forward-fill the column
/// configured as `fill_column`, if the sheet has one. Returns the dataset and
/// the number of filled cells.
pub fn clean_sheet(name: &str, text: &str, settings: &Settings) -> (Dataset, usize) {
    let (headers, mut rows) = parse_table(text);
    let index = FieldIndex::new(headers.iter().map(String::as_str));
    let candidates = aliases_for(&settings.fill_column);
    let filled = match index.resolve(&candidates) {
        Some(column) => fill_down_in_place(&mut rows, column, &settings.expert_default),
        None => 0,
    };
    (Dataset::new(name, headers, rows), filled)
}

pub fn load_sheet_file(path: &Path, name: &str, settings: &Settings) -> Result<(Dataset, usize)> {
    let bytes = std::fs::read(path).map_err(|source| DashboardError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    // Non-UTF-8 bytes are replaced rather than failing the whole sheet.
    let text = String::from_utf8_lossy(&bytes);
    Ok(clean_sheet(name, &text, settings))
}

/// Load every sheet listed in `settings`. Missing files are reported and
/// skipped; any other read failure aborts the load.
pub fn load_sheets(settings: &Settings) -> Result<(Datasets, LoadReport)> {
    let mut datasets = Datasets::new();
    let mut report = LoadReport::default();

    for (name, file) in &settings.sheets {
        let path = settings.sheet_path(file);
        if !path.exists() {
            warn!(sheet = %name, path = %path.display(), "sheet file not found");
            report.missing_files.push(file.clone());
            continue;
        }
        let (dataset, filled) = load_sheet_file(&path, name, settings)?;
        info!(sheet = %name, rows = dataset.len(), filled, "sheet loaded");
        report.sheets_loaded += 1;
        report.total_rows += dataset.len();
        report.filled_cells += filled;
        datasets.insert(dataset);
    }

    Ok((datasets, report))
}
