use crate::error::Result;
use crate::types::Dataset;
use serde::Serialize;
use std::path::Path;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Export a dataset with its own headers, so forward-filled values end up in
/// the file.
pub fn write_dataset_csv(path: &Path, dataset: &Dataset) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(&dataset.headers)?;
    for row in &dataset.rows {
        wtr.write_record(dataset.headers.iter().map(|h| row.get(h).unwrap_or("")))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

/// Markdown preview of the first `max_rows` rows of a dataset.
pub fn render_dataset(dataset: &Dataset, max_rows: usize) -> String {
    if dataset.headers.is_empty() {
        return "(no rows)".to_string();
    }
    let mut builder = Builder::default();
    builder.push_record(dataset.headers.iter().cloned());
    for row in dataset.rows.iter().take(max_rows) {
        builder.push_record(dataset.headers.iter().map(|h| row.get(h).unwrap_or("").to_string()));
    }
    builder.build().with(Style::markdown()).to_string()
}
