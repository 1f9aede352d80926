// Forward-fill of categorical columns.
//
// Sheets often only write a group label (e.g. the assigned expert) on the
// first row of each group. Filling is strictly causal: a blank cell takes the
// last non-blank value seen above it, or the default before any value.
use crate::fields::FieldIndex;
use crate::types::Row;

/// Return a copy of `rows` with blanks in `column` forward-filled.
pub fn fill_down(rows: &[Row], column: &str, default_value: &str) -> Vec<Row> {
    let mut out = rows.to_vec();
    fill_down_in_place(&mut out, column, default_value);
    out
}

/// Forward-fill `column` directly in `rows`. Rows without the column are
/// skipped and do not affect the running value.
pub fn fill_down_in_place(rows: &mut [Row], column: &str, default_value: &str) -> usize {
    let mut last = default_value.to_string();
    let mut filled = 0usize;
    for row in rows.iter_mut() {
        let Some(value) = row.get(column) else {
            continue;
        };
        if value.trim().is_empty() {
            row.set(column, last.clone());
            filled += 1;
        } else {
            last = value.to_string();
        }
    }
    filled
}

/// Forward-fill the first column matching one of `candidates`. Returns the
/// rows unchanged when no candidate column exists.
pub fn fill_down_resolved(rows: &[Row], candidates: &[&str], default_value: &str) -> Vec<Row> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    match FieldIndex::from_row(first).resolve(candidates) {
        Some(column) => fill_down(rows, column, default_value),
        None => rows.to_vec(),
    }
}
