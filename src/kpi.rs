// KPI aggregation over the daily yields sheet.
//
// Each KPI compares the total of a trailing window ending on the reference
// date with the window of equal length right before it:
//   daily   = the reference day        vs the day before
//   weekly  = the trailing 7 days      vs the 7 days before
//   monthly = the trailing 30 days     vs the 30 days before
use crate::dates::{format_date, today};
use crate::fields::{aliases, FieldIndex};
use crate::types::{Dataset, Datasets, Kpi, KpiSet};
use crate::util::round_to;
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

const DAILY_DAYS: i64 = 1;
const WEEKLY_DAYS: i64 = 7;
const MONTHLY_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KpiTargets {
    pub daily: f64,
    pub weekly: f64,
    pub monthly: f64,
}

impl Default for KpiTargets {
    fn default() -> Self {
        KpiTargets {
            daily: 20.0,
            weekly: 100.0,
            monthly: 400.0,
        }
    }
}

/// Progress towards `target` in whole percent, clamped to 0–100.
/// A non-positive target always gives 0.
pub fn percentage(current: f64, target: f64) -> f64 {
    if target > 0.0 {
        (current / target * 100.0).round().clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Signed change from `previous` to `current`, one decimal. Growth from
/// nothing counts as +100%.
pub fn change_pct(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        if current > 0.0 {
            100.0
        } else {
            0.0
        }
    } else {
        round_to((current - previous) / previous * 100.0, 1)
    }
}

pub fn build_kpi(current: f64, previous: f64, target: f64, ref_date: NaiveDate) -> Kpi {
    Kpi {
        current,
        target,
        percentage: percentage(current, target),
        change_pct: change_pct(current, previous),
        ref_date,
    }
}

/// Dated values of a yields sheet. Rows without a parseable date are left
/// out; a missing or non-numeric value counts as 0.
pub fn collect_points(dataset: &Dataset) -> Vec<(NaiveDate, f64)> {
    let index = FieldIndex::new(dataset.headers.iter().map(String::as_str));
    let mut skipped = 0usize;
    let points: Vec<(NaiveDate, f64)> = dataset
        .rows
        .iter()
        .filter_map(|row| match index.date(row, aliases::DATE) {
            Some(date) => Some((date, index.numeric(row, aliases::COUNT))),
            None => {
                skipped += 1;
                None
            }
        })
        .collect();
    if skipped > 0 {
        debug!(sheet = %dataset.name, skipped, "rows without a usable date left out of KPIs");
    }
    points
}

/// Sum of values dated within the `days`-long window ending on `end`.
fn window_total(points: &[(NaiveDate, f64)], end: NaiveDate, days: i64) -> f64 {
    let start = end - Duration::days(days - 1);
    points
        .iter()
        .filter(|(d, _)| *d >= start && *d <= end)
        .map(|(_, v)| v)
        .sum()
}

fn window_kpi(points: &[(NaiveDate, f64)], as_of: NaiveDate, days: i64, target: f64) -> Kpi {
    let current = window_total(points, as_of, days);
    let previous = window_total(points, as_of - Duration::days(days), days);
    build_kpi(current, previous, target, as_of)
}

/// Computes KPI snapshots against a fixed set of targets.
#[derive(Debug, Clone, Default)]
pub struct KpiAggregator {
    targets: KpiTargets,
}

impl KpiAggregator {
    pub fn new(targets: KpiTargets) -> Self {
        Self { targets }
    }

    pub fn calculate(&self, datasets: &Datasets) -> KpiSet {
        self.calculate_as_of(datasets, today())
    }

    /// KPIs as of `as_of`. A missing yields sheet produces zeroed KPIs.
    pub fn calculate_as_of(&self, datasets: &Datasets, as_of: NaiveDate) -> KpiSet {
        match datasets.find(aliases::KPI_SHEETS) {
            Some(dataset) => self.snapshot(&collect_points(dataset), as_of),
            None => {
                warn!(
                    known = ?datasets.names().collect::<Vec<_>>(),
                    "no yields sheet registered, KPIs zeroed"
                );
                self.zeroed(as_of)
            }
        }
    }

    pub fn snapshot(&self, points: &[(NaiveDate, f64)], as_of: NaiveDate) -> KpiSet {
        KpiSet {
            daily: window_kpi(points, as_of, DAILY_DAYS, self.targets.daily),
            weekly: window_kpi(points, as_of, WEEKLY_DAYS, self.targets.weekly),
            monthly: window_kpi(points, as_of, MONTHLY_DAYS, self.targets.monthly),
        }
    }

    pub fn zeroed(&self, as_of: NaiveDate) -> KpiSet {
        KpiSet {
            daily: Kpi::zeroed(self.targets.daily, as_of),
            weekly: Kpi::zeroed(self.targets.weekly, as_of),
            monthly: Kpi::zeroed(self.targets.monthly, as_of),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    Month,
}

/// Total of one calendar bucket, for chart series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketTotal {
    pub period_start: NaiveDate,
    pub label: String,
    pub total: f64,
    pub count: usize,
}

fn bucket_start(date: NaiveDate, granularity: Granularity) -> NaiveDate {
    match granularity {
        Granularity::Day => date,
        Granularity::Week => date - Duration::days(date.weekday().num_days_from_monday() as i64),
        Granularity::Month => date.with_day(1).unwrap_or(date),
    }
}

fn bucket_label(start: NaiveDate, granularity: Granularity) -> String {
    match granularity {
        Granularity::Day => format_date(start),
        Granularity::Week => {
            let week = start.iso_week();
            format!("{}-W{:02}", week.year(), week.week())
        }
        Granularity::Month => start.format("%Y-%m").to_string(),
    }
}

/// Per-day, per-ISO-week (Monday start) or per-calendar-month totals in
/// chronological order. Empty buckets are not emitted.
pub fn bucket_series(points: &[(NaiveDate, f64)], granularity: Granularity) -> Vec<BucketTotal> {
    let mut buckets: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for (date, value) in points {
        let e = buckets.entry(bucket_start(*date, granularity)).or_insert((0.0, 0));
        e.0 += value;
        e.1 += 1;
    }
    buckets
        .into_iter()
        .map(|(start, (total, count))| BucketTotal {
            period_start: start,
            label: bucket_label(start, granularity),
            total,
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_table;
    use pretty_assertions::assert_eq;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sheet(name: &str, csv: &str) -> Datasets {
        let (headers, rows) = parse_table(csv);
        std::iter::once(Dataset::new(name, headers, rows)).collect()
    }

    #[test]
    fn zero_target_means_zero_percentage() {
        assert_eq!(percentage(500.0, 0.0), 0.0);
        assert_eq!(percentage(500.0, -3.0), 0.0);
        assert_eq!(percentage(0.0, 0.0), 0.0);
    }

    #[test]
    fn percentage_rounds_and_caps() {
        assert_eq!(percentage(1.0, 3.0), 33.0);
        assert_eq!(percentage(2.0, 3.0), 67.0);
        assert_eq!(percentage(30.0, 20.0), 100.0);
        assert_eq!(percentage(-5.0, 20.0), 0.0);
    }

    #[test]
    fn change_against_previous_period() {
        assert_eq!(change_pct(15.0, 10.0), 50.0);
        assert_eq!(change_pct(10.0, 15.0), -33.3);
        assert_eq!(change_pct(4.0, 0.0), 100.0);
        assert_eq!(change_pct(0.0, 0.0), 0.0);
    }

    #[test]
    fn windows_compare_equal_lengths() {
        let ds = sheet(
            "Yields Projections",
            "Date;Nombre de levées\n\
             15/03/2024;5\n\
             14/03/2024;4\n\
             10/03/2024;1\n\
             08/03/2024;2\n\
             01/03/2024;10\n\
             2024-02-10;7\n\
             pas de date;100\n",
        );
        let agg = KpiAggregator::new(KpiTargets { daily: 10.0, weekly: 20.0, monthly: 0.0 });
        let kpis = agg.calculate_as_of(&ds, ymd(2024, 3, 15));

        assert_eq!(kpis.daily.current, 5.0);
        assert_eq!(kpis.daily.change_pct, 25.0);
        assert_eq!(kpis.daily.percentage, 50.0);

        // 09/03..15/03 vs 02/03..08/03
        assert_eq!(kpis.weekly.current, 10.0);
        assert_eq!(kpis.weekly.change_pct, 400.0);
        assert_eq!(kpis.weekly.percentage, 50.0);

        // 15/02..15/03 vs 16/01..14/02
        assert_eq!(kpis.monthly.current, 22.0);
        assert_eq!(kpis.monthly.change_pct, 214.3);
        assert_eq!(kpis.monthly.percentage, 0.0);

        assert_eq!(kpis.monthly.ref_date, ymd(2024, 3, 15));
    }

    #[test]
    fn tolerant_sheet_lookup() {
        let ds = sheet("yields_projections", "Date,Count\n2024-03-15,3\n");
        let kpis = KpiAggregator::default().calculate_as_of(&ds, ymd(2024, 3, 15));
        assert_eq!(kpis.daily.current, 3.0);
    }

    #[test]
    fn missing_sheet_yields_zeroed_kpis() {
        let ds = sheet("Planning", "Tâche,Début,Fin\n");
        let agg = KpiAggregator::default();
        let as_of = ymd(2024, 3, 15);
        let kpis = agg.calculate_as_of(&ds, as_of);
        assert_eq!(kpis, agg.zeroed(as_of));
        assert_eq!(kpis.weekly.target, KpiTargets::default().weekly);
    }

    #[test]
    fn repeated_calculation_is_identical() {
        let ds = sheet("Levées", "Date,Nombre de levées\n2024-03-15,3\n2024-03-14,1 000\n");
        let agg = KpiAggregator::default();
        let as_of = ymd(2024, 3, 15);
        assert_eq!(agg.calculate_as_of(&ds, as_of), agg.calculate_as_of(&ds, as_of));
    }

    #[test]
    fn series_by_week_and_month() {
        let points = vec![
            (ymd(2024, 3, 11), 1.0),
            (ymd(2024, 3, 17), 2.0),
            (ymd(2024, 3, 18), 4.0),
            (ymd(2024, 4, 1), 8.0),
        ];
        let weeks = bucket_series(&points, Granularity::Week);
        assert_eq!(weeks.len(), 3);
        assert_eq!(weeks[0].label, "2024-W11");
        assert_eq!(weeks[0].total, 3.0);
        assert_eq!(weeks[0].count, 2);

        let months = bucket_series(&points, Granularity::Month);
        let labels: Vec<&str> = months.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["2024-03", "2024-04"]);
        assert_eq!(months[0].total, 7.0);

        let days = bucket_series(&points, Granularity::Day);
        assert_eq!(days.len(), 4);
        assert_eq!(days[0].period_start, ymd(2024, 3, 11));
    }
}
