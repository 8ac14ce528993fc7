use core_types::{MonthlyReturn, Period, Series};
use std::collections::BTreeMap;

/// Compounds a series of fractional returns into one percentage return per calendar month.
///
/// Within a month, `compounded = Π(1 + v) - 1`. The output holds each distinct year-month
/// exactly once, in chronological order.
pub fn aggregate_monthly(series: &Series) -> Vec<MonthlyReturn> {
    let mut growth: BTreeMap<Period, f64> = BTreeMap::new();
    for point in series.points() {
        *growth.entry(Period::from_date(point.date)).or_insert(1.0) *= 1.0 + point.value;
    }

    growth
        .into_iter()
        .map(|(period, factor)| MonthlyReturn::new(period, (factor - 1.0) * 100.0))
        .collect()
}
