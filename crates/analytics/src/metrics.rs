//! The individual statistics, as pure functions over plain values.
//!
//! Degenerate inputs (no data, zero variance, an empty downside set) produce a neutral
//! value instead of a division fault.

use core_types::{DatedValue, MonthlyReturn, Period};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const MONTHS_PER_YEAR: f64 = 12.0;

/// Historical-simulation value-at-risk: the `floor((1 - confidence) * n)`-th smallest value.
///
/// Returns `0.0` for empty input. With few observations this is simply the minimum.
pub fn historical_var(values: &[f64], confidence: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let index = ((1.0 - confidence) * sorted.len() as f64).floor().max(0.0) as usize;
    sorted[index.min(sorted.len() - 1)]
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Exactly zero when every value is the same, whatever rounding the mean picked up.
fn population_std(values: &[f64], mean: f64) -> f64 {
    if values.windows(2).all(|w| w[0] == w[1]) {
        return 0.0;
    }
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64).sqrt()
}

/// The monthly hurdle: the average annual risk-free rate divided by twelve.
///
/// An empty risk-free series is treated as a zero rate.
pub fn monthly_risk_free(annual_rates: &[f64]) -> f64 {
    if annual_rates.is_empty() {
        return 0.0;
    }
    mean(annual_rates) / MONTHS_PER_YEAR
}

/// Annualized Sharpe ratio of fractional monthly returns against a monthly hurdle.
pub fn sharpe_ratio(monthly: &[f64], rf_monthly: f64) -> f64 {
    if monthly.is_empty() {
        return 0.0;
    }
    let mean_monthly = mean(monthly);
    let annualized_std = population_std(monthly, mean_monthly) * MONTHS_PER_YEAR.sqrt();
    if annualized_std == 0.0 {
        return 0.0;
    }
    (mean_monthly - rf_monthly) * MONTHS_PER_YEAR / annualized_std
}

/// Annualized Sortino ratio: like Sharpe, but only months below the hurdle count as risk.
///
/// A flat return history carries no risk at all and scores `0.0`, as Sharpe does.
pub fn sortino_ratio(monthly: &[f64], rf_monthly: f64) -> f64 {
    if monthly.is_empty() || population_std(monthly, mean(monthly)) == 0.0 {
        return 0.0;
    }
    let shortfalls: Vec<f64> = monthly
        .iter()
        .filter(|r| **r < rf_monthly)
        .map(|r| (r - rf_monthly).powi(2))
        .collect();
    let downside = (shortfalls.iter().sum::<f64>() / shortfalls.len().max(1) as f64).sqrt();
    let annualized_downside = downside * MONTHS_PER_YEAR.sqrt();
    if annualized_downside == 0.0 {
        return 0.0;
    }
    (mean(monthly) - rf_monthly) * MONTHS_PER_YEAR / annualized_downside
}

/// The correlation of the fund's monthly returns to the benchmark's.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    pub value: f64,
    /// Number of (fund, benchmark) month pairs the value was computed from.
    pub aligned_pairs: usize,
    /// Set when at least one pair was matched by position instead of by period.
    pub approximate: bool,
}

/// Pearson correlation over months present in both series.
///
/// Months are matched on their exact period. With `allow_positional`, a fund month without
/// a benchmark counterpart is paired with the benchmark month at the same index instead,
/// and the result is flagged approximate. Fewer than two pairs yields `None`.
pub fn correlation(
    fund: &[MonthlyReturn],
    benchmark: &[MonthlyReturn],
    allow_positional: bool,
) -> Option<Correlation> {
    let by_period: HashMap<Period, f64> = benchmark
        .iter()
        .map(|m| (m.period, m.return_pct))
        .collect();

    let mut approximate = false;
    let pairs: Vec<(f64, f64)> = fund
        .iter()
        .enumerate()
        .filter_map(|(i, m)| match by_period.get(&m.period) {
            Some(b) => Some((m.return_pct, *b)),
            None if allow_positional => benchmark.get(i).map(|b| {
                approximate = true;
                (m.return_pct, b.return_pct)
            }),
            None => None,
        })
        .collect();

    if pairs.len() < 2 {
        return None;
    }

    let xs: Vec<f64> = pairs.iter().map(|(x, _)| *x).collect();
    let ys: Vec<f64> = pairs.iter().map(|(_, y)| *y).collect();
    let (mean_x, mean_y) = (mean(&xs), mean(&ys));
    let std_x = population_std(&xs, mean_x);
    let std_y = population_std(&ys, mean_y);
    let covariance = pairs
        .iter()
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum::<f64>()
        / pairs.len() as f64;

    let value = if std_x == 0.0 || std_y == 0.0 {
        0.0
    } else {
        covariance / (std_x * std_y)
    };

    Some(Correlation {
        value,
        aligned_pairs: pairs.len(),
        approximate,
    })
}

/// Running compounded return after each observation: `Π(1 + r) - 1`, stamped with its date.
pub fn cumulative_path(points: &[DatedValue]) -> Vec<DatedValue> {
    points
        .iter()
        .scan(1.0, |growth, point| {
            *growth *= 1.0 + point.value;
            Some(DatedValue::new(point.date, *growth - 1.0))
        })
        .collect()
}

/// Compounded return over all months, in percent. `None` with no months.
pub fn since_inception(monthly: &[MonthlyReturn]) -> Option<f64> {
    if monthly.is_empty() {
        return None;
    }
    let growth: f64 = monthly.iter().map(|m| 1.0 + m.return_pct / 100.0).product();
    Some((growth - 1.0) * 100.0)
}

/// Since-inception return scaled to a twelve-month horizon, in percent.
///
/// `None` with no months, and when the compounded loss exceeds 100% (the growth factor is
/// not positive, so it has no real fractional power).
pub fn annualized(monthly: &[MonthlyReturn]) -> Option<f64> {
    let growth = 1.0 + since_inception(monthly)? / 100.0;
    if growth <= 0.0 {
        return None;
    }
    let exponent = MONTHS_PER_YEAR / monthly.len() as f64;
    let value = (growth.powf(exponent) - 1.0) * 100.0;
    value.is_finite().then_some(value)
}

/// The month with the highest return; the earliest one wins a tie.
pub fn best_month(monthly: &[MonthlyReturn]) -> Option<MonthlyReturn> {
    monthly
        .iter()
        .copied()
        .reduce(|best, m| if m.return_pct > best.return_pct { m } else { best })
}

/// The month with the lowest return; the earliest one wins a tie.
pub fn worst_month(monthly: &[MonthlyReturn]) -> Option<MonthlyReturn> {
    monthly
        .iter()
        .copied()
        .reduce(|worst, m| if m.return_pct < worst.return_pct { m } else { worst })
}
