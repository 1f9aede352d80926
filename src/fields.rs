// Column and sheet name resolution.
//
// Spreadsheet exports rename columns between versions and locales
// ("Nombre de levées", "nombre levees", "Count"...). Every lookup goes
// through the alias table below so the matching policy lives in one place:
// names are compared after lowercasing, stripping diacritics and collapsing
// whitespace, and the first listed candidate that matches wins.
use crate::dates::parse_date;
use crate::types::Row;
use crate::util::parse_number;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Known spellings per logical field, in precedence order.
pub mod aliases {
    pub const DATE: &[&str] = &["Date", "Jour", "Date de levée", "Date levée", "Day"];
    pub const COUNT: &[&str] = &[
        "Nombre de levées",
        "Nombre levées",
        "Nb levées",
        "Levées",
        "Count",
        "Total",
        "Valeur",
        "Value",
    ];
    pub const EXPERT: &[&str] = &["Expert", "Expert assigné", "Assigned expert", "Responsable"];
    pub const TASK_ID: &[&str] = &["ID", "Task ID", "N°", "Numéro"];
    pub const TASK_LABEL: &[&str] = &["Tâche", "Task", "Libellé", "Label", "Nom", "Name"];
    pub const SECTION: &[&str] = &["Section", "Phase", "Groupe", "Catégorie", "Category"];
    pub const START: &[&str] = &["Début", "Date de début", "Date début", "Start", "Start date"];
    pub const END: &[&str] = &["Fin", "Date de fin", "Date fin", "Échéance", "End", "End date", "Deadline"];

    pub const KPI_SHEETS: &[&str] = &["Yields Projections", "Projections", "Levées", "KPI"];
    pub const TIMELINE_SHEETS: &[&str] = &["Planning", "Timeline", "Roadmap", "Gantt"];
}

static ALIAS_TABLE: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    HashMap::from([
        ("date", aliases::DATE),
        ("count", aliases::COUNT),
        ("expert", aliases::EXPERT),
        ("id", aliases::TASK_ID),
        ("label", aliases::TASK_LABEL),
        ("section", aliases::SECTION),
        ("start", aliases::START),
        ("end", aliases::END),
    ])
});

/// Spellings registered for a logical field name (`"count"`, `"expert"`...).
/// Unknown logical names resolve to themselves.
pub fn aliases_for(logical: &str) -> Vec<&str> {
    match ALIAS_TABLE.get(logical.trim().to_lowercase().as_str()) {
        Some(list) => list.to_vec(),
        None => vec![logical],
    }
}

/// Lowercase, strip diacritics, turn no-break spaces into spaces and
/// collapse runs of whitespace.
pub fn normalize_key(name: &str) -> String {
    let stripped: String = name
        .trim_start_matches('\u{FEFF}')
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();
    stripped
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '\u{A0}')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn compact_key(name: &str) -> String {
    normalize_key(name)
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// Sheet-name comparison: like `normalize_key`, but also blind to
/// separators, so "Yields Projections", "yields_projections" and
/// "YIELDS-PROJECTIONS" are the same sheet.
pub fn names_match(a: &str, b: &str) -> bool {
    let ka = compact_key(a);
    !ka.is_empty() && ka == compact_key(b)
}

/// Normalized header name -> header as it appears in the row.
///
/// Build it once per dataset (all rows of a parse share one shape) and reuse
/// it for every row.
#[derive(Debug, Clone, Default)]
pub struct FieldIndex {
    by_key: HashMap<String, String>,
}

impl FieldIndex {
    pub fn new<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut by_key = HashMap::new();
        for header in headers {
            // First header wins when two normalize to the same key.
            by_key
                .entry(normalize_key(header))
                .or_insert_with(|| header.to_string());
        }
        Self { by_key }
    }

    pub fn from_row(row: &Row) -> Self {
        Self::new(row.headers())
    }

    /// The actual header matched by the first candidate that exists.
    pub fn resolve(&self, candidates: &[&str]) -> Option<&str> {
        candidates
            .iter()
            .find_map(|c| self.by_key.get(&normalize_key(c)))
            .map(String::as_str)
    }

    pub fn text<'r>(&self, row: &'r Row, candidates: &[&str]) -> Option<&'r str> {
        let header = self.resolve(candidates)?;
        row.get(header)
    }

    pub fn numeric(&self, row: &Row, candidates: &[&str]) -> f64 {
        self.text(row, candidates)
            .and_then(parse_number)
            .unwrap_or(0.0)
    }

    pub fn date(&self, row: &Row, candidates: &[&str]) -> Option<NaiveDate> {
        self.text(row, candidates).and_then(parse_date)
    }
}

/// Numeric value of the first candidate column present in `row`; `0.0` when
/// no candidate matches or the value is not a number.
pub fn get_numeric_field(row: &Row, candidates: &[&str]) -> f64 {
    FieldIndex::from_row(row).numeric(row, candidates)
}

pub fn get_text_field<'r>(row: &'r Row, candidates: &[&str]) -> Option<&'r str> {
    FieldIndex::from_row(row).text(row, candidates)
}

pub fn get_date_field(row: &Row, candidates: &[&str]) -> Option<NaiveDate> {
    FieldIndex::from_row(row).date(row, candidates)
}
