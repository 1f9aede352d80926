// The dashboard service: registered datasets plus the aggregation settings.
//
// One `Dashboard` is built by the caller and handed to whatever needs it;
// there is no process-wide instance.
use crate::config::Settings;
use crate::dates::today;
use crate::error::{DashboardError, Result};
use crate::fields::aliases;
use crate::kpi::{bucket_series, collect_points, BucketTotal, Granularity, KpiAggregator};
use crate::loader::{clean_sheet, load_sheets, LoadReport};
use crate::timeline::{compute_range, layout, tasks_from_rows};
use crate::types::{Dataset, Datasets, KpiSet, SummaryStats, TaskLayout, TimelineRange, TimelineTask};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

/// Everything a Gantt renderer needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineView {
    pub range: TimelineRange,
    pub tasks: Vec<TaskLayout>,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    settings: Settings,
    datasets: Datasets,
    aggregator: KpiAggregator,
}

impl Dashboard {
    pub fn new(settings: Settings) -> Self {
        let aggregator = KpiAggregator::new(settings.targets);
        Self {
            settings,
            datasets: Datasets::new(),
            aggregator,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn datasets(&self) -> &Datasets {
        &self.datasets
    }

    /// Register CSV text under `sheet`, replacing a previous version of the
    /// same sheet. Returns the number of rows kept.
    pub fn load_csv(&mut self, sheet: &str, text: &str) -> usize {
        let (dataset, filled) = clean_sheet(sheet, text, &self.settings);
        let rows = dataset.len();
        debug!(sheet, rows, filled, "sheet registered");
        self.datasets.insert(dataset);
        rows
    }

    /// (Re)load every configured sheet file. The previous datasets are
    /// replaced only when the load succeeds.
    pub fn load_dir(&mut self) -> Result<LoadReport> {
        let (datasets, report) = load_sheets(&self.settings)?;
        info!(
            sheets = report.sheets_loaded,
            rows = report.total_rows,
            missing = report.missing_files.len(),
            "datasets reloaded"
        );
        self.datasets = datasets;
        Ok(report)
    }

    /// Dataset by name, tolerating case, accents and separators.
    pub fn dataset(&self, name: &str) -> Result<&Dataset> {
        self.datasets
            .get(name)
            .or_else(|| self.datasets.find(&[name]))
            .ok_or_else(|| DashboardError::UnknownSheet(name.to_string()))
    }

    pub fn kpis(&self) -> KpiSet {
        self.kpis_as_of(today())
    }

    pub fn kpis_as_of(&self, as_of: NaiveDate) -> KpiSet {
        self.aggregator.calculate_as_of(&self.datasets, as_of)
    }

    /// Totals of the yields sheet per day, week or month.
    pub fn series(&self, granularity: Granularity) -> Vec<BucketTotal> {
        self.datasets
            .find(aliases::KPI_SHEETS)
            .map(|ds| bucket_series(&collect_points(ds), granularity))
            .unwrap_or_default()
    }

    pub fn timeline_tasks(&self) -> Vec<TimelineTask> {
        self.datasets
            .find(aliases::TIMELINE_SHEETS)
            .map(|ds| tasks_from_rows(&ds.rows))
            .unwrap_or_default()
    }

    pub fn timeline(&self) -> TimelineView {
        self.timeline_as_of(today())
    }

    pub fn timeline_as_of(&self, today: NaiveDate) -> TimelineView {
        let tasks = self.timeline_tasks();
        let range = compute_range(&tasks, today);
        TimelineView {
            range,
            tasks: layout(&tasks, &range, today),
        }
    }

    pub fn summary_as_of(&self, today: NaiveDate) -> SummaryStats {
        let tasks = self.timeline_tasks();
        SummaryStats {
            datasets: self.datasets.len(),
            total_rows: self.datasets.iter().map(Dataset::len).sum(),
            kpis: self.kpis_as_of(today),
            timeline: tasks
                .iter()
                .any(TimelineTask::has_dates)
                .then(|| compute_range(&tasks, today)),
        }
    }
}
