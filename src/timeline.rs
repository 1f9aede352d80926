// Gantt geometry for the planning sheet.
//
// Bars are positioned in percent of the visible range so the renderer can
// lay them out at any width. Tasks without both dates never contribute to
// the range and get a placeholder instead of a bar.
use crate::dates::{days_between, month_bounds};
use crate::fields::{aliases, FieldIndex};
use crate::types::{ColorTag, Row, TaskBar, TaskLayout, TimelineRange, TimelineTask};
use chrono::{Duration, NaiveDate};

/// Days of padding added on each side of the tasks' span.
pub const RANGE_PADDING_DAYS: i64 = 3;
/// Narrowest bar, in percent, so one-day tasks stay visible.
pub const MIN_BAR_WIDTH_PCT: f64 = 0.5;

const DANGER_WITHIN_DAYS: i64 = 14;
const WARNING_WITHIN_DAYS: i64 = 30;

/// Build tasks from planning rows. The id falls back to the 1-based row
/// position and the section to an empty string.
pub fn tasks_from_rows(rows: &[Row]) -> Vec<TimelineTask> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    let index = FieldIndex::from_row(first);
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let text = |candidates: &[&str]| {
                index
                    .text(row, candidates)
                    .map(str::to_string)
                    .filter(|s| !s.is_empty())
            };
            TimelineTask {
                id: text(aliases::TASK_ID).unwrap_or_else(|| (i + 1).to_string()),
                label: text(aliases::TASK_LABEL).unwrap_or_default(),
                section: text(aliases::SECTION).unwrap_or_default(),
                start: index.date(row, aliases::START),
                end: index.date(row, aliases::END),
            }
        })
        .collect()
}

/// Visible date range: earliest start to latest end over the fully dated
/// tasks, padded by three days on each side. Without any such task the
/// range is the calendar month containing `today`.
pub fn compute_range(tasks: &[TimelineTask], today: NaiveDate) -> TimelineRange {
    let mut min_start: Option<NaiveDate> = None;
    let mut max_end: Option<NaiveDate> = None;

    for task in tasks {
        if let (Some(start), Some(end)) = (task.start, task.end) {
            min_start = Some(min_start.map_or(start, |cur| cur.min(start)));
            max_end = Some(max_end.map_or(end, |cur| cur.max(end)));
        }
    }

    let (start, end) = match (min_start, max_end) {
        (Some(start), Some(end)) => (
            start - Duration::days(RANGE_PADDING_DAYS),
            end + Duration::days(RANGE_PADDING_DAYS),
        ),
        _ => month_bounds(today),
    };
    TimelineRange {
        start,
        end,
        total_days: days_between(start, end).max(1),
    }
}

/// Status colour from the days left until `end`.
pub fn color_tag(end: Option<NaiveDate>, today: NaiveDate) -> ColorTag {
    let Some(end) = end else {
        return ColorTag::Neutral;
    };
    let remaining = days_between(today, end);
    if remaining < 0 {
        ColorTag::Neutral
    } else if remaining <= DANGER_WITHIN_DAYS {
        ColorTag::Danger
    } else if remaining <= WARNING_WITHIN_DAYS {
        ColorTag::Warning
    } else {
        ColorTag::Success
    }
}

/// Bar position of one task, or `None` when a date is missing.
pub fn bar_for(task: &TimelineTask, range: &TimelineRange) -> Option<TaskBar> {
    let (start, end) = (task.start?, task.end?);
    let total = range.total_days as f64;
    let offset = days_between(range.start, start) as f64;
    let span = days_between(start, end) as f64;
    Some(TaskBar {
        left_pct: (offset / total * 100.0).max(0.0),
        width_pct: (span / total * 100.0).max(MIN_BAR_WIDTH_PCT),
    })
}

pub fn layout(tasks: &[TimelineTask], range: &TimelineRange, today: NaiveDate) -> Vec<TaskLayout> {
    tasks
        .iter()
        .map(|task| TaskLayout {
            task: task.clone(),
            bar: bar_for(task, range),
            color_tag: color_tag(task.end, today),
        })
        .collect()
}

/// Items grouped by section, sections in order of first appearance and
/// members in input order.
pub fn group_by_section<T, F>(items: &[T], section: F) -> Vec<(String, Vec<&T>)>
where
    F: Fn(&T) -> &str,
{
    let mut groups: Vec<(String, Vec<&T>)> = Vec::new();
    for item in items {
        let name = section(item);
        match groups.iter_mut().find(|(g, _)| g.as_str() == name) {
            Some((_, members)) => members.push(item),
            None => groups.push((name.to_string(), vec![item])),
        }
    }
    groups
}
