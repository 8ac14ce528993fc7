use crate::error::LoaderError;
use crate::sanitize::sanitize;
use chrono::NaiveDate;
use core_types::{DatedValue, ValueUnit};

/// How far into a response we look for markup before deciding it is data.
const MARKUP_SNIFF_CHARS: usize = 200;

const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

const HEADER_KEYWORDS: [&str; 3] = ["date", "return", "value"];

/// The outcome of parsing one source's delimited text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedRows {
    /// Rows that yielded a valid date and value, normalized to fractions, in source order.
    pub points: Vec<DatedValue>,
    /// Rows dropped for an unrecognised date, a non-numeric value or too few cells.
    pub dropped: usize,
    /// Rows whose date was written `DD.MM.YYYY` and converted.
    pub european_dates: usize,
    pub header_skipped: bool,
}

/// Detects HTML error pages served in place of a data file (SPA fallbacks, proxies).
pub fn looks_like_markup(text: &str) -> bool {
    let head: String = text
        .trim_start()
        .chars()
        .take(MARKUP_SNIFF_CHARS)
        .collect::<String>()
        .to_ascii_lowercase();
    head.starts_with("<!doctype html") || head.contains("<html")
}

/// Picks the delimiter that occurs most often on the first non-blank line, preferring the
/// comma on ties and when none occurs at all.
pub fn sniff_delimiter(text: &str) -> u8 {
    let Some(first_line) = text.lines().find(|line| !line.trim().is_empty()) else {
        return b',';
    };
    let mut best = b',';
    let mut best_count = 0;
    for delimiter in CANDIDATE_DELIMITERS {
        let count = first_line.bytes().filter(|b| *b == delimiter).count();
        if count > best_count {
            best = delimiter;
            best_count = count;
        }
    }
    best
}

/// Parses an ISO (`YYYY-MM-DD`) or European (`DD.MM.YYYY`) date.
///
/// The boolean is `true` when the European form was converted.
pub fn parse_date(raw: &str) -> Option<(NaiveDate, bool)> {
    let raw = raw.trim();
    if has_shape(raw, &[4, 2, 2], b'-') {
        return NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().map(|d| (d, false));
    }
    if has_shape(raw, &[2, 2, 4], b'.') {
        return NaiveDate::parse_from_str(raw, "%d.%m.%Y").ok().map(|d| (d, true));
    }
    None
}

/// Checks that `raw` is made of digit groups of exactly the given widths joined by `sep`.
fn has_shape(raw: &str, widths: &[usize], sep: u8) -> bool {
    let groups: Vec<&[u8]> = raw.as_bytes().split(|b| *b == sep).collect();
    groups.len() == widths.len()
        && groups
            .iter()
            .zip(widths)
            .all(|(group, width)| group.len() == *width && group.iter().all(u8::is_ascii_digit))
}

fn is_header(cells: &[&str]) -> bool {
    cells.iter().take(2).any(|cell| {
        let cell = cell.to_ascii_lowercase();
        HEADER_KEYWORDS.iter().any(|keyword| cell.contains(keyword))
    })
}

/// Parses delimited `[date, value, ...]` rows.
///
/// Fully blank rows are skipped, a leading header row is detected and discarded, and every
/// value is normalized from `unit` to a fraction. Malformed rows are counted and dropped;
/// only a structurally unreadable document is an error.
pub fn parse_delimited(text: &str, unit: ValueUnit) -> Result<ParsedRows, LoaderError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .delimiter(sniff_delimiter(text))
        .from_reader(text.as_bytes());

    let mut parsed = ParsedRows::default();
    let mut first_row = true;

    for record in reader.records() {
        let record = record?;
        let cells: Vec<&str> = record.iter().collect();
        if cells.iter().all(|cell| cell.is_empty()) {
            continue;
        }

        if first_row {
            first_row = false;
            if is_header(&cells) {
                parsed.header_skipped = true;
                continue;
            }
        }

        match parse_row(&cells, unit) {
            Some((point, european)) => {
                if european {
                    parsed.european_dates += 1;
                }
                parsed.points.push(point);
            }
            None => {
                tracing::debug!(row = ?cells, "Dropping malformed row.");
                parsed.dropped += 1;
            }
        }
    }

    Ok(parsed)
}

fn parse_row(cells: &[&str], unit: ValueUnit) -> Option<(DatedValue, bool)> {
    if cells.len() < 2 {
        return None;
    }
    let (date, european) = parse_date(cells[0])?;
    let raw = sanitize(cells[1])?;
    Some((DatedValue::new(date, unit.to_fraction(raw)), european))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn detects_markup_error_pages() {
        assert!(looks_like_markup("\n  <!DOCTYPE html><html><body>404</body></html>"));
        assert!(looks_like_markup("<HTML><head></head></HTML>"));
        assert!(!looks_like_markup("Date,Return\n2024-01-10,0.01\n"));
    }

    #[test]
    fn sniffs_common_delimiters() {
        assert_eq!(sniff_delimiter("date;value\n01.02.2024;0,5"), b';');
        assert_eq!(sniff_delimiter("\n\ndate\tvalue\n"), b'\t');
        assert_eq!(sniff_delimiter("2024-01-10,0.01"), b',');
        assert_eq!(sniff_delimiter("single-column"), b',');
        assert_eq!(sniff_delimiter(""), b',');
    }

    #[test]
    fn parses_iso_and_european_dates() {
        assert_eq!(parse_date("2024-01-10"), Some((date(2024, 1, 10), false)));
        assert_eq!(parse_date(" 16.01.2024 "), Some((date(2024, 1, 16), true)));
        assert_eq!(parse_date("2024/01/10"), None);
        assert_eq!(parse_date("1/10/2024"), None);
        assert_eq!(parse_date("2024-1-10"), None);
        assert_eq!(parse_date("2024-02-30"), None);
    }

    #[test]
    fn skips_header_and_blank_rows() {
        let text = "Date,Daily Return\n\n2024-01-10,-0.0005\n,,\n2024-01-11,0.0003\n";
        let parsed = parse_delimited(text, ValueUnit::Fraction).unwrap();

        assert!(parsed.header_skipped);
        assert_eq!(parsed.dropped, 0);
        assert_eq!(
            parsed.points,
            vec![
                DatedValue::new(date(2024, 1, 10), -0.0005),
                DatedValue::new(date(2024, 1, 11), 0.0003),
            ]
        );
    }

    #[test]
    fn headerless_files_keep_their_first_row() {
        let text = "2024-01-10,0.01\n2024-01-11,0.02";
        let parsed = parse_delimited(text, ValueUnit::Fraction).unwrap();
        assert!(!parsed.header_skipped);
        assert_eq!(parsed.points.len(), 2);
    }

    #[test]
    fn drops_malformed_rows_instead_of_zeroing_them() {
        let text = "2024-01-10,0.01\nnot-a-date,0.02\n2024-01-12,n/a\n\
                    2024-01-13\n2024-01-14,0.03,extra";
        let parsed = parse_delimited(text, ValueUnit::Fraction).unwrap();

        assert_eq!(parsed.dropped, 3);
        let values: Vec<f64> = parsed.points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![0.01, 0.03]);
    }

    #[test]
    fn converts_european_dates_and_percent_units() {
        let text = "Date;Rate;Comment\n02.01.2024;5.25;x\n01.02.2024;5.00;y\n";
        let parsed = parse_delimited(text, ValueUnit::Percent).unwrap();

        assert_eq!(parsed.european_dates, 2);
        assert_eq!(parsed.points[0].date, date(2024, 1, 2));
        assert!((parsed.points[0].value - 0.0525).abs() < 1e-12);
        assert!((parsed.points[1].value - 0.05).abs() < 1e-12);
    }

    #[test]
    fn quoted_values_with_separators_are_sanitized() {
        let text = "2024-01-16,\"4,668.21\"\n";
        let parsed = parse_delimited(text, ValueUnit::Fraction).unwrap();
        assert_eq!(parsed.points[0].value, 4_668.21);
    }
}
