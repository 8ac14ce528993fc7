//! The built-in example dataset used when every candidate source for a series failed.
//!
//! It exists so that downstream stages always have rows to work with. It is not real data:
//! the series it produces is tagged `SeriesOrigin::Placeholder` and callers are expected to
//! surface that.

use crate::sanitize::sanitize;
use core_types::{DatedValue, Series, SeriesOrigin, SeriesRole, ValueUnit};

const EXAMPLE_CSV: &str = "\
Date,Start Balance,Gain / Loss,End Balance ,Basis Points ,Daily Gain / Loss
2024-01-10,3'000'000.00,-0.05,2'999'999.95,-0,-0.00%
2024-01-11,2'999'999.95,1.08,3'000'001.03,0,0.00%
2024-01-12,3'000'001.03,0.48,3'000'001.51,0,0.00%
2024-01-16,3'000'001.51,4'668.21,3'004'669.72,16,0.16%
2024-01-17,3'004'669.72,126.28,3'004'796.00,0,0.00%
";

const BASIS_POINTS_COLUMN: &str = "Basis Points";
const DAILY_PERCENT_COLUMN: &str = "Daily Gain / Loss";

/// Builds the placeholder series for `role`.
///
/// Each row's return is read from the basis-points column, falling back to the daily
/// percentage column, and normalized to a fraction.
pub fn placeholder_series(role: SeriesRole) -> Series {
    Series::new(role, SeriesOrigin::Placeholder, example_points())
}

fn example_points() -> Vec<DatedValue> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(EXAMPLE_CSV.as_bytes());

    let Ok(headers) = reader.headers().cloned() else {
        return Vec::new();
    };
    let column = |name: &str| headers.iter().position(|h| h == name);
    let (Some(bps_idx), Some(pct_idx)) = (column(BASIS_POINTS_COLUMN), column(DAILY_PERCENT_COLUMN))
    else {
        return Vec::new();
    };

    reader
        .records()
        .filter_map(Result::ok)
        .filter_map(|record| {
            let (date, _) = crate::parse::parse_date(record.get(0)?)?;
            let value = match record.get(bps_idx).and_then(sanitize) {
                Some(bps) => ValueUnit::BasisPoints.to_fraction(bps),
                None => ValueUnit::Percent.to_fraction(record.get(pct_idx).and_then(sanitize)?),
            };
            Some(DatedValue::new(date, value))
        })
        .collect()
}
