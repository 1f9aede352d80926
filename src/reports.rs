use crate::dates::{format_date, format_opt_date};
use crate::kpi::BucketTotal;
use crate::timeline::group_by_section;
use crate::types::{Kpi, KpiCardRow, KpiSet, TaskLayout, TimelineRow};
use crate::util::{format_number, format_signed_pct};

fn card(period: &str, kpi: &Kpi) -> KpiCardRow {
    KpiCardRow {
        period: period.to_string(),
        current: format_number(kpi.current, 0),
        target: if kpi.target > 0.0 {
            format_number(kpi.target, 0)
        } else {
            "--".to_string()
        },
        progress: format!("{:.0}%", kpi.percentage),
        trend: format_signed_pct(kpi.change_pct),
        as_of: format_date(kpi.ref_date),
    }
}

/// One row per KPI card, daily first.
pub fn kpi_cards(kpis: &KpiSet) -> Vec<KpiCardRow> {
    vec![
        card("Daily", &kpis.daily),
        card("Weekly", &kpis.weekly),
        card("Monthly", &kpis.monthly),
    ]
}

/// Timeline rows grouped by section in sheet order, each section sorted by
/// start date (undated tasks last).
pub fn timeline_rows(tasks: &[TaskLayout]) -> Vec<TimelineRow> {
    let mut sorted: Vec<&TaskLayout> = Vec::with_capacity(tasks.len());
    for (_, mut members) in group_by_section(tasks, |t| t.task.section.as_str()) {
        members.sort_by_key(|t| (t.task.start.is_none(), t.task.start));
        sorted.extend(members);
    }
    sorted
        .into_iter()
        .map(|t| {
            let (left_pct, width_pct) = match t.bar {
                Some(bar) => (format_number(bar.left_pct, 2), format_number(bar.width_pct, 2)),
                None => ("--".to_string(), "--".to_string()),
            };
            TimelineRow {
                id: t.task.id.clone(),
                section: t.task.section.clone(),
                label: t.task.label.clone(),
                start: format_opt_date(t.task.start),
                end: format_opt_date(t.task.end),
                left_pct,
                width_pct,
                status: if t.bar.is_some() {
                    t.color_tag.as_str().to_string()
                } else {
                    "dates unspecified".to_string()
                },
            }
        })
        .collect()
}

/// Text sparkline of bucket totals, scaled to the largest bucket.
pub fn series_lines(series: &[BucketTotal], width: usize) -> Vec<String> {
    let max = series.iter().map(|b| b.total).fold(0.0_f64, f64::max);
    series
        .iter()
        .map(|b| {
            let len = if max > 0.0 {
                ((b.total.max(0.0) / max) * width as f64).round() as usize
            } else {
                0
            };
            format!("{:>10} {:<w$} {}", b.label, "#".repeat(len), format_number(b.total, 0), w = width)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kpi::build_kpi;
    use crate::types::{ColorTag, TaskBar, TimelineTask};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn cards_render_progress_and_trend() {
        let as_of = ymd(2024, 3, 15);
        let kpis = KpiSet {
            daily: build_kpi(1500.0, 1000.0, 3000.0, as_of),
            weekly: build_kpi(0.0, 4.0, 0.0, as_of),
            monthly: build_kpi(10.0, 0.0, 5.0, as_of),
        };
        let cards = kpi_cards(&kpis);
        assert_eq!(cards[0].current, "1,500");
        assert_eq!(cards[0].progress, "50%");
        assert_eq!(cards[0].trend, "+50%");
        assert_eq!(cards[1].target, "--");
        assert_eq!(cards[1].trend, "-100%");
        assert_eq!(cards[2].progress, "100%");
        assert_eq!(cards[2].as_of, "15/03/2024");
    }

    #[test]
    fn timeline_rows_sorted_and_marked() {
        let mk = |id: &str, section: &str, start: Option<NaiveDate>, bar: Option<TaskBar>| TaskLayout {
            task: TimelineTask {
                id: id.to_string(),
                label: id.to_string(),
                section: section.to_string(),
                start,
                end: start,
            },
            bar,
            color_tag: ColorTag::Warning,
        };
        let bar = Some(TaskBar { left_pct: 12.5, width_pct: 0.5 });
        let rows = timeline_rows(&[
            mk("b", "B", Some(ymd(2024, 1, 2)), bar),
            mk("a2", "A", None, None),
            mk("a1", "A", Some(ymd(2024, 1, 5)), bar),
        ]);
        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a1", "a2"]);
        assert_eq!(rows[1].left_pct, "12.50");
        assert_eq!(rows[1].status, "warning");
        assert_eq!(rows[2].status, "dates unspecified");
        assert_eq!(rows[2].start, "--");
    }

    #[test]
    fn sparkline_scales_to_max() {
        let series = vec![
            BucketTotal { period_start: ymd(2024, 3, 1), label: "2024-03".into(), total: 5.0, count: 1 },
            BucketTotal { period_start: ymd(2024, 4, 1), label: "2024-04".into(), total: 10.0, count: 2 },
        ];
        let lines = series_lines(&series, 10);
        assert!(lines[0].contains("#####"));
        assert!(!lines[0].contains("######"));
        assert!(lines[1].contains("##########"));
    }
}
