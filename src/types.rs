use crate::fields::names_match;
use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use tabled::Tabled;

/// One parsed CSV record: header -> trimmed cell value, in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: Vec<(String, String)>,
}

impl Row {
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            cells: pairs.into_iter().collect(),
        }
    }

    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(k, _)| k == header)
            .map(|(_, v)| v.as_str())
    }

    /// Overwrite the value under `header`, appending the column when the row
    /// does not have it yet.
    pub fn set(&mut self, header: &str, value: impl Into<String>) {
        let value = value.into();
        match self.cells.iter_mut().find(|(k, _)| k == header) {
            Some((_, v)) => *v = value,
            None => self.cells.push((header.to_string(), value)),
        }
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

// Serialized as a JSON object that keeps column order.
impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (k, v) in &self.cells {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Rows of one logical sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Datasets keyed by sheet name. Lookups through `find` tolerate the usual
/// spelling drift of sheet names.
#[derive(Debug, Clone, Default)]
pub struct Datasets {
    by_name: BTreeMap<String, Dataset>,
}

impl Datasets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `dataset`, replacing any dataset with the same name.
    pub fn insert(&mut self, dataset: Dataset) -> Option<Dataset> {
        self.by_name.insert(dataset.name.clone(), dataset)
    }

    pub fn get(&self, name: &str) -> Option<&Dataset> {
        self.by_name.get(name)
    }

    /// First dataset matching an alias, aliases tried in order.
    pub fn find(&self, aliases: &[&str]) -> Option<&Dataset> {
        aliases.iter().find_map(|alias| {
            self.by_name
                .values()
                .find(|ds| names_match(&ds.name, alias))
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dataset> {
        self.by_name.values()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl FromIterator<Dataset> for Datasets {
    fn from_iter<I: IntoIterator<Item = Dataset>>(iter: I) -> Self {
        let mut out = Datasets::new();
        for ds in iter {
            out.insert(ds);
        }
        out
    }
}

/// One KPI snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpi {
    pub current: f64,
    pub target: f64,
    /// Progress towards `target`, 0–100.
    pub percentage: f64,
    /// Signed change against the preceding window of equal length.
    pub change_pct: f64,
    pub ref_date: NaiveDate,
}

impl Kpi {
    pub fn zeroed(target: f64, ref_date: NaiveDate) -> Self {
        Self {
            current: 0.0,
            target,
            percentage: 0.0,
            change_pct: 0.0,
            ref_date,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KpiSet {
    pub daily: Kpi,
    pub weekly: Kpi,
    pub monthly: Kpi,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineTask {
    pub id: String,
    pub label: String,
    pub section: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl TimelineTask {
    pub fn has_dates(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total_days: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTag {
    Neutral,
    Danger,
    Warning,
    Success,
}

impl ColorTag {
    pub fn as_str(self) -> &'static str {
        match self {
            ColorTag::Neutral => "neutral",
            ColorTag::Danger => "danger",
            ColorTag::Warning => "warning",
            ColorTag::Success => "success",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskBar {
    pub left_pct: f64,
    pub width_pct: f64,
}

/// Drawable geometry for one task. `bar` is `None` when the task has no
/// usable dates and only gets an "unspecified" marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskLayout {
    pub task: TimelineTask,
    pub bar: Option<TaskBar>,
    pub color_tag: ColorTag,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct KpiCardRow {
    #[serde(rename = "Period")]
    #[tabled(rename = "Period")]
    pub period: String,
    #[serde(rename = "Current")]
    #[tabled(rename = "Current")]
    pub current: String,
    #[serde(rename = "Target")]
    #[tabled(rename = "Target")]
    pub target: String,
    #[serde(rename = "Progress")]
    #[tabled(rename = "Progress")]
    pub progress: String,
    #[serde(rename = "Trend")]
    #[tabled(rename = "Trend")]
    pub trend: String,
    #[serde(rename = "AsOf")]
    #[tabled(rename = "AsOf")]
    pub as_of: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TimelineRow {
    #[serde(rename = "ID")]
    #[tabled(rename = "ID")]
    pub id: String,
    #[serde(rename = "Section")]
    #[tabled(rename = "Section")]
    pub section: String,
    #[serde(rename = "Task")]
    #[tabled(rename = "Task")]
    pub label: String,
    #[serde(rename = "Start")]
    #[tabled(rename = "Start")]
    pub start: String,
    #[serde(rename = "End")]
    #[tabled(rename = "End")]
    pub end: String,
    #[serde(rename = "LeftPct")]
    #[tabled(rename = "LeftPct")]
    pub left_pct: String,
    #[serde(rename = "WidthPct")]
    #[tabled(rename = "WidthPct")]
    pub width_pct: String,
    #[serde(rename = "Status")]
    #[tabled(rename = "Status")]
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub datasets: usize,
    pub total_rows: usize,
    pub kpis: KpiSet,
    pub timeline: Option<TimelineRange>,
}
