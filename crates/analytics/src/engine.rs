use crate::aggregate::aggregate_monthly;
use crate::error::AnalyticsError;
use crate::metrics::{
    annualized, best_month, correlation, cumulative_path, historical_var, monthly_risk_free,
    sharpe_ratio, since_inception, sortino_ratio, worst_month,
};
use crate::report::{MetricsSnapshot, PerformanceReport};
use crate::table::format_table;
use chrono::Utc;
use configuration::MetricsSettings;
use core_types::{Metric, MonthlyReturn, Series, SeriesRole, SeriesState};

/// A stateless calculator for deriving performance metrics from the loaded series.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    var_confidence: f64,
    allow_positional_correlation: bool,
}

fn no_months<T>() -> Metric<T> {
    Metric::unavailable("no monthly returns")
}

/// What a figure depending on `role` resolves to when that role has no usable series.
fn unsettled<T>(state: &SeriesState, role: SeriesRole) -> Metric<T> {
    match state {
        SeriesState::Pending => Metric::Pending,
        _ => Metric::unavailable(format!("{role} series not configured")),
    }
}

impl AnalyticsEngine {
    pub fn new(settings: &MetricsSettings) -> Result<Self, AnalyticsError> {
        let confidence = settings.var_confidence;
        if !(confidence > 0.0 && confidence < 1.0) {
            return Err(AnalyticsError::InvalidConfidence(confidence));
        }
        Ok(Self {
            var_confidence: confidence,
            allow_positional_correlation: settings.allow_positional_correlation,
        })
    }

    /// The main entry point for calculating performance metrics.
    ///
    /// Figures that depend only on the returns series are computed as soon as it is ready;
    /// Sharpe and Sortino additionally wait for the risk-free rate, the correlation for the
    /// benchmark.
    pub fn calculate(
        &self,
        returns: &SeriesState,
        risk_free: &SeriesState,
        benchmark: &SeriesState,
    ) -> PerformanceReport {
        let degraded: Vec<SeriesRole> = [returns, risk_free, benchmark]
            .into_iter()
            .filter_map(SeriesState::series)
            .filter(|series| series.is_placeholder())
            .map(Series::role)
            .collect();

        let Some(fund) = returns.series() else {
            let snapshot = match returns {
                SeriesState::Pending => MetricsSnapshot::pending(),
                _ => self.unavailable_snapshot(returns),
            };
            return PerformanceReport {
                snapshot,
                monthly: Vec::new(),
                table: Vec::new(),
                cumulative: Vec::new(),
                degraded,
                generated_at: Utc::now(),
            };
        };

        let monthly = aggregate_monthly(fund);
        let snapshot = self.snapshot(fund, &monthly, risk_free, benchmark);

        tracing::debug!(
            months = monthly.len(),
            observations = fund.len(),
            "Calculated performance metrics."
        );

        PerformanceReport {
            snapshot,
            table: format_table(&monthly),
            cumulative: cumulative_path(fund.points()),
            monthly,
            degraded,
            generated_at: Utc::now(),
        }
    }

    fn unavailable_snapshot(&self, returns: &SeriesState) -> MetricsSnapshot {
        let role = SeriesRole::Returns;
        MetricsSnapshot {
            daily_var: unsettled(returns, role),
            monthly_var: unsettled(returns, role),
            best_month: unsettled(returns, role),
            worst_month: unsettled(returns, role),
            since_inception: unsettled(returns, role),
            annualized_return: unsettled(returns, role),
            inception_date: unsettled(returns, role),
            sharpe_ratio: unsettled(returns, role),
            sortino_ratio: unsettled(returns, role),
            correlation: unsettled(returns, role),
        }
    }

    fn snapshot(
        &self,
        fund: &Series,
        monthly: &[MonthlyReturn],
        risk_free: &SeriesState,
        benchmark: &SeriesState,
    ) -> MetricsSnapshot {
        let daily_pct: Vec<f64> = fund.values().map(|v| v * 100.0).collect();
        let monthly_pct: Vec<f64> = monthly.iter().map(|m| m.return_pct).collect();

        let (sharpe, sortino) = match risk_free.series() {
            Some(rf) => {
                let rates: Vec<f64> = rf.values().collect();
                let rf_monthly = monthly_risk_free(&rates);
                let monthly_fraction: Vec<f64> = monthly_pct.iter().map(|p| p / 100.0).collect();
                (
                    Metric::Ready(sharpe_ratio(&monthly_fraction, rf_monthly)),
                    Metric::Ready(sortino_ratio(&monthly_fraction, rf_monthly)),
                )
            }
            None => (
                unsettled(risk_free, SeriesRole::RiskFree),
                unsettled(risk_free, SeriesRole::RiskFree),
            ),
        };

        let correlation = match benchmark.series() {
            Some(bench) => {
                let bench_monthly = aggregate_monthly(bench);
                match correlation(monthly, &bench_monthly, self.allow_positional_correlation) {
                    Some(corr) => Metric::Ready(corr),
                    None => Metric::unavailable("insufficient aligned data"),
                }
            }
            None => unsettled(benchmark, SeriesRole::Benchmark),
        };

        MetricsSnapshot {
            daily_var: Metric::Ready(historical_var(&daily_pct, self.var_confidence)),
            monthly_var: Metric::Ready(historical_var(&monthly_pct, self.var_confidence)),
            best_month: best_month(monthly).map_or_else(no_months, Metric::Ready),
            worst_month: worst_month(monthly).map_or_else(no_months, Metric::Ready),
            since_inception: since_inception(monthly).map_or_else(no_months, Metric::Ready),
            annualized_return: match annualized(monthly) {
                Some(value) => Metric::Ready(value),
                None if monthly.is_empty() => no_months(),
                None => Metric::unavailable("total loss exceeds 100%"),
            },
            inception_date: match fund.date_range() {
                Some((first, _)) => Metric::Ready(first),
                None => Metric::unavailable("no observations"),
            },
            sharpe_ratio: sharpe,
            sortino_ratio: sortino,
            correlation,
        }
    }
}
