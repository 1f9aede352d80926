// Date normalization for spreadsheet exports.
//
// Exports mix `DD/MM/YYYY`, ISO `YYYY-MM-DD` and whatever the sheet's locale
// produced. Everything is reduced to a timezone-naive `NaiveDate`, so day
// differences are whole-day counts and never cross a DST transition.
//
// Slash-separated values are read day-first. Only when that reading is not a
// valid calendar date (e.g. `03/15/2024`) is the value re-read month-first.
// Values where both readings are valid (`03/04/2024`) stay day-first; this is
// a known ambiguity of the source data, not something to guess around.
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate};

const GENERIC_FORMATS: &[&str] = &["%B %d, %Y", "%b %d, %Y", "%d %B %Y", "%d %b %Y"];

/// Parse a cell value into a calendar date. Returns `None` for anything that
/// is not recognisably a date; callers render that as "unspecified".
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let s = value.trim();
    if s.is_empty() {
        return None;
    }
    // A trailing time component ("15/03/2024 08:30") is not significant.
    let head = s.split_whitespace().next().unwrap_or(s);

    if head.contains('/') {
        return parse_slashed(head);
    }
    if let Some(date) = parse_iso_prefix(s) {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    GENERIC_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

fn parse_slashed(s: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.split('/').collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit())) {
        return None;
    }
    let (a, b, c) = (parts[0], parts[1], parts[2]);

    if a.len() == 4 {
        // YYYY/MM/DD is never ambiguous.
        return NaiveDate::from_ymd_opt(a.parse().ok()?, b.parse().ok()?, c.parse().ok()?);
    }

    let year = match c.len() {
        4 => c.parse::<i32>().ok()?,
        2 => 2000 + c.parse::<i32>().ok()?,
        _ => return None,
    };
    let first: u32 = a.parse().ok()?;
    let second: u32 = b.parse().ok()?;

    NaiveDate::from_ymd_opt(year, second, first)
        .or_else(|| NaiveDate::from_ymd_opt(year, first, second))
}

fn parse_iso_prefix(s: &str) -> Option<NaiveDate> {
    let prefix = s.get(..10)?;
    if let Some(rest) = s.get(10..) {
        if !(rest.is_empty() || rest.starts_with('T') || rest.starts_with(' ')) {
            return None;
        }
    }
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

/// Render a date day-first (`DD/MM/YYYY`), matching the input policy so that
/// unambiguous values round-trip through `parse_date`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Render an optional date, using the dashboard's "unspecified" marker.
pub fn format_opt_date(date: Option<NaiveDate>) -> String {
    date.map(format_date).unwrap_or_else(|| "--".to_string())
}

/// Whole days from `from` to `to` (negative when `to` is earlier).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// First and last day of the calendar month containing `date`.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let next_first = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    let last = next_first
        .map(|d| d - Duration::days(1))
        .unwrap_or(first);
    (first, last)
}

/// The local calendar date. This is the only place the crate reads the
/// clock; the computations themselves take the reference date as input.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn day_first_when_day_exceeds_twelve() {
        assert_eq!(parse_date("15/03/2024"), Some(ymd(2024, 3, 15)));
    }

    #[test]
    fn ambiguous_slash_dates_stay_day_first() {
        assert_eq!(parse_date("03/04/2024"), Some(ymd(2024, 4, 3)));
    }

    #[test]
    fn falls_back_to_month_first_when_day_first_is_invalid() {
        assert_eq!(parse_date("03/15/2024"), Some(ymd(2024, 3, 15)));
    }

    #[test]
    fn iso_dates_and_datetimes() {
        assert_eq!(parse_date("2024-03-15"), Some(ymd(2024, 3, 15)));
        assert_eq!(parse_date("2024-03-15T10:20:00Z"), Some(ymd(2024, 3, 15)));
        assert_eq!(parse_date("2024-03-15 10:20"), Some(ymd(2024, 3, 15)));
    }

    #[test]
    fn trailing_time_and_short_years() {
        assert_eq!(parse_date("15/03/2024 08:30:00"), Some(ymd(2024, 3, 15)));
        assert_eq!(parse_date("15/03/24"), Some(ymd(2024, 3, 15)));
        assert_eq!(parse_date("2024/03/15"), Some(ymd(2024, 3, 15)));
    }

    #[test]
    fn generic_textual_dates() {
        assert_eq!(parse_date("March 15, 2024"), Some(ymd(2024, 3, 15)));
        assert_eq!(parse_date("15 Mar 2024"), Some(ymd(2024, 3, 15)));
    }

    #[test]
    fn invalid_values_are_none() {
        assert_eq!(parse_date("not-a-date"), None);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("32/13/2024"), None);
        assert_eq!(parse_date("2024-02-30"), None);
        assert_eq!(parse_date("1/2"), None);
        assert_eq!(parse_date("2024-03-15abc"), None);
    }

    #[test]
    fn format_round_trips_unambiguous_dates() {
        let d = ymd(2024, 3, 15);
        assert_eq!(format_date(d), "15/03/2024");
        assert_eq!(parse_date(&format_date(d)), Some(d));
        assert_eq!(format_opt_date(None), "--");
    }

    #[test]
    fn day_arithmetic() {
        assert_eq!(days_between(ymd(2024, 1, 7), ymd(2024, 2, 23)), 47);
        // Crosses the March DST switch in most European zones.
        assert_eq!(days_between(ymd(2024, 3, 30), ymd(2024, 4, 1)), 2);
        assert_eq!(days_between(ymd(2024, 4, 1), ymd(2024, 3, 30)), -2);
    }

    #[test]
    fn month_bounds_handle_december_and_leap_years() {
        assert_eq!(month_bounds(ymd(2024, 2, 10)), (ymd(2024, 2, 1), ymd(2024, 2, 29)));
        assert_eq!(month_bounds(ymd(2023, 12, 31)), (ymd(2023, 12, 1), ymd(2023, 12, 31)));
    }
}
