// CSV text -> header-keyed rows.
//
// Sheets arrive as exported CSV text, comma- or semicolon-delimited depending
// on the exporting locale. Parsing never fails: input that yields no header
// yields no rows.
use crate::types::Row;
use tracing::debug;

/// `;` when the header line uses semicolons and no commas, `,` otherwise.
pub fn detect_delimiter(header_line: &str) -> char {
    if header_line.contains(';') && !header_line.contains(',') {
        ';'
    } else {
        ','
    }
}

/// Split one line into raw (untrimmed) fields.
///
/// An opening `"` starts a quoted run and is not kept; inside quotes `""`
/// is a literal quote and a lone `"` closes the run. The delimiter only ends
/// a field outside quotes.
pub fn split_line(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '"' {
            if !in_quotes {
                in_quotes = true;
            } else if chars.peek() == Some(&'"') {
                field.push('"');
                chars.next();
            } else {
                in_quotes = false;
            }
        } else if c == delimiter && !in_quotes {
            fields.push(std::mem::take(&mut field));
        } else {
            field.push(c);
        }
    }
    fields.push(field);
    fields
}

fn clean_header(raw: &str) -> String {
    raw.trim()
        .trim_start_matches('\u{FEFF}')
        .replace('\u{A0}', " ")
        .trim()
        .to_string()
}

/// Repeated header names get a ` (2)`, ` (3)`... suffix so every column
/// stays addressable by name.
fn unique_headers(raw: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for header in raw {
        let mut name = header.clone();
        let mut n = 2;
        while out.contains(&name) {
            name = format!("{} ({})", header, n);
            n += 1;
        }
        out.push(name);
    }
    out
}

/// Headers and rows of a CSV document.
///
/// Rows that are entirely blank are dropped; short rows are padded with
/// empty values so every row carries every header.
pub fn parse_table(text: &str) -> (Vec<String>, Vec<Row>) {
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines = normalized.split('\n').filter(|l| !l.trim().is_empty());

    let Some(header_line) = lines.next() else {
        return (Vec::new(), Vec::new());
    };
    let delimiter = detect_delimiter(header_line);
    let headers = unique_headers(
        split_line(header_line, delimiter)
            .iter()
            .map(|h| clean_header(h))
            .collect(),
    );

    let mut rows = Vec::new();
    let mut blank = 0usize;
    for line in lines {
        let fields = split_line(line, delimiter);
        if fields.iter().all(|f| f.trim().is_empty()) {
            blank += 1;
            continue;
        }
        rows.push(Row::from_pairs(headers.iter().enumerate().map(|(i, h)| {
            let value = fields.get(i).map(|v| v.trim().to_string()).unwrap_or_default();
            (h.clone(), value)
        })));
    }

    debug!(
        delimiter = %delimiter,
        columns = headers.len(),
        rows = rows.len(),
        blank_rows = blank,
        "parsed csv text"
    );
    (headers, rows)
}

/// Rows of a CSV document. See `parse_table`.
pub fn parse(text: &str) -> Vec<Row> {
    parse_table(text).1
}

/// Serialize fields as one CSV line, quoting fields that contain the
/// delimiter, a quote or a line break (quotes doubled).
pub fn to_csv_line<S: AsRef<str>>(fields: &[S], delimiter: char) -> String {
    fields
        .iter()
        .map(|f| {
            let f = f.as_ref();
            if f.contains(delimiter) || f.contains('"') || f.contains('\n') || f.contains('\r') {
                format!("\"{}\"", f.replace('"', "\"\""))
            } else {
                f.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(&delimiter.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn comma_document_with_quotes() {
        let rows = parse("Name,Note\nAlice,\"Hello, world\"\nBob,\"He said \"\"hi\"\"\"\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Note"), Some("Hello, world"));
        assert_eq!(rows[1].get("Note"), Some("He said \"hi\""));
    }

    #[test]
    fn semicolon_detected_from_header_only() {
        assert_eq!(detect_delimiter("Date;Nombre"), ';');
        assert_eq!(detect_delimiter("Date;Nombre,total"), ',');
        assert_eq!(detect_delimiter("Date"), ',');
        let rows = parse("Date;Nombre\n15/03/2024;1,5\n");
        assert_eq!(rows[0].get("Nombre"), Some("1,5"));
    }

    #[test]
    fn bom_crlf_and_nbsp_headers() {
        let rows = parse("\u{FEFF}Date\u{A0}début , Count\r\n2024-01-01,3\r\n\r\n");
        let headers: Vec<&str> = rows[0].headers().collect();
        assert_eq!(headers, vec!["Date début", "Count"]);
        assert_eq!(rows[0].get("Count"), Some("3"));
    }

    #[test]
    fn blank_rows_dropped_and_short_rows_padded() {
        let rows = parse("a,b,c\n1\n,,\n  \n4,5,6,7\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("b"), Some(""));
        assert_eq!(rows[0].get("c"), Some(""));
        assert_eq!(rows[1].get("c"), Some("6"));
        assert_eq!(rows[1].len(), 3);
    }

    #[test]
    fn repeated_headers_stay_addressable() {
        let (headers, rows) = parse_table("a,a,b,a\n1,2,3,4\n");
        assert_eq!(headers, vec!["a", "a (2)", "b", "a (3)"]);
        assert_eq!(rows[0].get("a"), Some("1"));
        assert_eq!(rows[0].get("a (2)"), Some("2"));
        assert_eq!(rows[0].get("a (3)"), Some("4"));
        assert_eq!(rows[0].len(), 4);
    }

    #[test]
    fn values_are_trimmed() {
        let rows = parse("a,b\n  x  , \" y \"\n");
        assert_eq!(rows[0].get("a"), Some("x"));
        assert_eq!(rows[0].get("b"), Some("y"));
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(parse("").is_empty());
        assert!(parse("\u{FEFF}").is_empty());
        assert!(parse("\n \r\n").is_empty());
        let (headers, rows) = parse_table("only,header\n");
        assert_eq!(headers, vec!["only", "header"]);
        assert!(rows.is_empty());
    }

    #[test]
    fn quoted_delimiter_round_trips() {
        let values = ["plain", "a,b", "say \"x\"", "\"", "semi;colon"];
        let header = to_csv_line(&["h1", "h2", "h3", "h4", "h5"], ',');
        let line = to_csv_line(&values, ',');
        let rows = parse(&format!("{}\n{}\n", header, line));
        let parsed: Vec<&str> = rows[0].values().collect();
        assert_eq!(parsed, values.to_vec());
    }
}
