//! Lenient numeric parsing for hand-maintained spreadsheets.

/// Parses numeric text that may carry thousands separators, currency symbols or a percent
/// sign.
///
/// Every character other than an ASCII digit, `+`, `-` or `.` is removed before parsing, so
/// `"3'000'000.00"` reads as `3000000.0` and `"-0.05%"` as `-0.05`. Returns `None` when
/// nothing numeric remains or when the remainder is not a well-formed float (`"1.2.3"`).
/// Callers drop the row on `None`; it never stands in for zero.
pub fn sanitize(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.'))
        .collect();

    if cleaned.is_empty() || cleaned == "+" || cleaned == "-" {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
