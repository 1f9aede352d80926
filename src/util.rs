// Utility helpers for number parsing, rounding and console formatting.
//
// Spreadsheet exports are inconsistent about how numbers are written, so all
// the "dirty" numeric handling lives here and the rest of the crate can work
// with plain `f64` values.
use num_format::{Locale, ToFormattedString};

/// Parse a cell value into `f64` while being forgiving about the way
/// spreadsheet exports format numbers.
///
/// - Trims and removes every whitespace character, including the no-break
///   and narrow no-break spaces French locales use as thousands separators
///   (`"1 234"` -> `1234`).
/// - Drops a trailing `%` or `€`.
/// - Commas are thousands separators when the value also has a `.` or
///   carries more than one comma (`"1,234,567"` -> `1234567`). A single
///   comma without a `.` is a decimal comma (`"12,5"` -> `12.5`,
///   `"1,234"` -> `1.234`).
/// - Returns `None` for empty or non-numeric text.
pub fn parse_number(s: &str) -> Option<f64> {
    let compact: String = s
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{202F}')
        .collect();
    let compact = compact.trim_end_matches(&['%', '€'][..]);
    if compact.is_empty() {
        return None;
    }
    let normalized = if compact.contains('.') || compact.matches(',').count() > 1 {
        compact.replace(',', "")
    } else {
        compact.replacen(',', ".", 1)
    };
    let value = normalized.parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus locale-aware thousands separators
    // (e.g. `1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// Signed percentage for trend badges: `+12.5%`, `-3%`, `0%`.
pub fn format_signed_pct(pct: f64) -> String {
    let body = if pct.fract() == 0.0 {
        format!("{:.0}", pct.abs())
    } else {
        format!("{:.1}", pct.abs())
    };
    if pct > 0.0 {
        format!("+{}%", body)
    } else if pct < 0.0 {
        format!("-{}%", body)
    } else {
        "0%".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_number_strips_thousands_spaces() {
        assert_eq!(parse_number("1 234"), Some(1234.0));
        assert_eq!(parse_number("1\u{a0}234\u{202f}567"), Some(1_234_567.0));
    }

    #[test]
    fn parse_number_accepts_decimal_comma() {
        assert_eq!(parse_number("12,5"), Some(12.5));
        assert_eq!(parse_number("1,234.50"), Some(1234.5));
    }

    #[test]
    fn parse_number_repeated_commas_are_thousands() {
        assert_eq!(parse_number("1,234,567"), Some(1_234_567.0));
        assert_eq!(parse_number("-12,000,000"), Some(-12_000_000.0));
    }

    #[test]
    fn parse_number_single_comma_is_decimal() {
        assert_eq!(parse_number("1,234"), Some(1.234));
        assert_eq!(parse_number("0,75"), Some(0.75));
    }

    #[test]
    fn parse_number_ignores_unit_suffix() {
        assert_eq!(parse_number("85 %"), Some(85.0));
        assert_eq!(parse_number("-4"), Some(-4.0));
    }

    #[test]
    fn parse_number_rejects_text() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("   "), None);
        assert_eq!(parse_number("n/a"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn round_to_one_decimal() {
        assert_eq!(round_to(33.333, 1), 33.3);
        assert_eq!(round_to(-12.55, 0), -13.0);
    }

    #[test]
    fn formats_with_separators() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-1500.0, 0), "-1,500");
        assert_eq!(format_int(9855), "9,855");
    }

    #[test]
    fn signed_pct() {
        assert_eq!(format_signed_pct(12.5), "+12.5%");
        assert_eq!(format_signed_pct(-100.0), "-100%");
        assert_eq!(format_signed_pct(0.0), "0%");
    }
}
