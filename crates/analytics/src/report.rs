use crate::metrics::Correlation;
use crate::table::TableRow;
use chrono::{DateTime, NaiveDate, Utc};
use core_types::{DatedValue, Metric, MonthlyReturn, SeriesRole};
use serde::{Deserialize, Serialize};

/// The headline statistics of the fund.
///
/// Every figure carries its own state, so a consumer can tell a computed zero from an input
/// that is still loading or missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    // I. Risk
    /// Historical VaR of the daily returns, in percent.
    pub daily_var: Metric<f64>,
    /// Historical VaR of the monthly returns, in percent.
    pub monthly_var: Metric<f64>,

    // II. Return
    pub best_month: Metric<MonthlyReturn>,
    pub worst_month: Metric<MonthlyReturn>,
    /// Compounded return over all months, in percent.
    pub since_inception: Metric<f64>,
    pub annualized_return: Metric<f64>,
    /// Date of the first observation of the returns series.
    pub inception_date: Metric<NaiveDate>,

    // III. Risk-adjusted & relative
    pub sharpe_ratio: Metric<f64>,
    pub sortino_ratio: Metric<f64>,
    pub correlation: Metric<Correlation>,
}

impl MetricsSnapshot {
    /// A snapshot in which every figure is `Pending`.
    pub fn pending() -> Self {
        Self {
            daily_var: Metric::Pending,
            monthly_var: Metric::Pending,
            best_month: Metric::Pending,
            worst_month: Metric::Pending,
            since_inception: Metric::Pending,
            annualized_return: Metric::Pending,
            inception_date: Metric::Pending,
            sharpe_ratio: Metric::Pending,
            sortino_ratio: Metric::Pending,
            correlation: Metric::Pending,
        }
    }
}

impl Default for MetricsSnapshot {
    fn default() -> Self {
        Self::pending()
    }
}

/// Everything the display layer needs, computed in one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub snapshot: MetricsSnapshot,
    pub monthly: Vec<MonthlyReturn>,
    pub table: Vec<TableRow>,
    /// Compounded return after each daily observation, as a fraction.
    pub cumulative: Vec<DatedValue>,
    /// Roles whose data is the built-in placeholder rather than a real source.
    pub degraded: Vec<SeriesRole>,
    pub generated_at: DateTime<Utc>,
}

impl PerformanceReport {
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}
