use crate::enums::{SeriesOrigin, SeriesRole};
use crate::error::CoreError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A single observation: a calendar date and a finite value expressed as a fraction.
///
/// The date serializes as ISO `YYYY-MM-DD` regardless of how the source wrote it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DatedValue {
    pub date: NaiveDate,
    pub value: f64,
}

impl DatedValue {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// An ordered sequence of observations sharing one role.
///
/// Dates are non-decreasing. Dates and values live together in `points`, so a series can
/// never hold a date without its value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    role: SeriesRole,
    origin: SeriesOrigin,
    points: Vec<DatedValue>,
}

impl Series {
    /// Builds a series, ordering the points by date.
    ///
    /// Non-finite values are dropped like any other malformed row. The sort is stable, so
    /// observations sharing a date keep their source order.
    pub fn new(role: SeriesRole, origin: SeriesOrigin, mut points: Vec<DatedValue>) -> Self {
        points.retain(|p| p.value.is_finite());
        points.sort_by_key(|p| p.date);
        Self { role, origin, points }
    }

    pub fn role(&self) -> SeriesRole {
        self.role
    }

    pub fn origin(&self) -> &SeriesOrigin {
        &self.origin
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.origin, SeriesOrigin::Placeholder)
    }

    pub fn points(&self) -> &[DatedValue] {
        &self.points
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date)),
            _ => None,
        }
    }
}

/// A calendar year-month, rendered as `YYYY-MM`.
///
/// Ordering is chronological, which matches the lexicographic order of the rendered form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self, CoreError> {
        if !(1..=12).contains(&month) {
            return Err(CoreError::InvalidInput(
                "period month".to_string(),
                month.to_string(),
            ));
        }
        if !(0..=9999).contains(&year) {
            return Err(CoreError::InvalidInput("period year".to_string(), year.to_string()));
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Calendar month, 1-based.
    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidInput("period".to_string(), s.to_string());
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        Period::new(year, month)
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// The compounded return of one calendar month, as a percentage (`1.5` means 1.5%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReturn {
    pub period: Period,
    pub return_pct: f64,
}

impl MonthlyReturn {
    pub fn new(period: Period, return_pct: f64) -> Self {
        Self { period, return_pct }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn series_orders_points_by_date_and_keeps_ties_stable() {
        let series = Series::new(
            SeriesRole::Returns,
            SeriesOrigin::Source("mem".into()),
            vec![
                DatedValue::new(date(2024, 1, 11), 0.2),
                DatedValue::new(date(2024, 1, 10), 0.1),
                DatedValue::new(date(2024, 1, 11), 0.3),
            ],
        );

        let values: Vec<f64> = series.values().collect();
        assert_eq!(values, vec![0.1, 0.2, 0.3]);
        assert_eq!(series.date_range(), Some((date(2024, 1, 10), date(2024, 1, 11))));
        assert!(!series.is_placeholder());
    }

    #[test]
    fn series_drops_non_finite_values() {
        let series = Series::new(
            SeriesRole::Benchmark,
            SeriesOrigin::Placeholder,
            vec![
                DatedValue::new(date(2024, 1, 10), f64::NAN),
                DatedValue::new(date(2024, 1, 11), f64::INFINITY),
                DatedValue::new(date(2024, 1, 12), 0.01),
            ],
        );
        assert_eq!(series.len(), 1);
        assert!(series.is_placeholder());
    }

    #[test]
    fn period_round_trips_through_its_text_form() {
        let period: Period = "2024-03".parse().unwrap();
        assert_eq!(period.year(), 2024);
        assert_eq!(period.month(), 3);
        assert_eq!(period.to_string(), "2024-03");
        assert_eq!(Period::from_date(date(2024, 3, 31)), period);
    }

    #[test]
    fn period_rejects_malformed_text() {
        assert!("2024-13".parse::<Period>().is_err());
        assert!("2024-3".parse::<Period>().is_err());
        assert!("24-03".parse::<Period>().is_err());
        assert!("2024/03".parse::<Period>().is_err());
    }

    #[test]
    fn period_order_is_chronological() {
        let mut periods: Vec<Period> = ["2025-01", "2024-12", "2024-02"]
            .iter()
            .map(|p| p.parse().unwrap())
            .collect();
        periods.sort();
        let rendered: Vec<String> = periods.iter().map(Period::to_string).collect();
        assert_eq!(rendered, vec!["2024-02", "2024-12", "2025-01"]);
    }

    #[test]
    fn dated_value_serializes_iso_date() {
        let json = serde_json::to_string(&DatedValue::new(date(2024, 1, 5), 0.5)).unwrap();
        assert_eq!(json, r#"{"date":"2024-01-05","value":0.5}"#);
    }
}
