use crate::error::EngineError;
use analytics::{AnalyticsEngine, PerformanceReport};
use configuration::{Settings, Sources};
use core_types::{SeriesRole, SeriesState};
use series_loader::SeriesLoader;
use tokio::sync::{broadcast, watch};

pub mod error;
pub mod feed;

pub use feed::SeriesFeed;

/// The central orchestrator of a refresh cycle.
///
/// A refresh loads the three series concurrently, publishes each one to the feed as soon as
/// it settles, and then computes a `PerformanceReport` from whatever the feed holds. The
/// previous state of a role stays visible to subscribers until its new load settles.
pub struct PerformanceEngine {
    loader: SeriesLoader,
    sources: Sources,
    analytics: AnalyticsEngine,
    feed: SeriesFeed,
}

impl PerformanceEngine {
    /// Creates a new `PerformanceEngine` with an explicit loader, e.g. one backed by a
    /// custom `SourceFetcher`.
    pub fn new(settings: &Settings, loader: SeriesLoader) -> Result<Self, EngineError> {
        Ok(Self {
            loader,
            sources: settings.sources.clone(),
            analytics: AnalyticsEngine::new(&settings.metrics)?,
            feed: SeriesFeed::new(),
        })
    }

    /// Creates an engine that fetches sources over HTTP and from disk.
    pub fn from_settings(settings: &Settings) -> Result<Self, EngineError> {
        let loader = SeriesLoader::from_settings(&settings.loader)?;
        Self::new(settings, loader)
    }

    pub fn subscribe(&self, role: SeriesRole) -> watch::Receiver<SeriesState> {
        self.feed.subscribe(role)
    }

    /// Runs one refresh cycle.
    ///
    /// Returns `EngineError::Cancelled` if `shutdown` fires (or has already fired) before
    /// every role settled; roles that settled before that keep their new state.
    pub async fn refresh(
        &self,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> Result<PerformanceReport, EngineError> {
        // Subscribe before checking, so a signal sent in between is seen by the loads.
        let mut returns_rx = shutdown.resubscribe();
        let mut risk_free_rx = shutdown.resubscribe();
        let mut benchmark_rx = shutdown.resubscribe();
        if !matches!(shutdown.try_recv(), Err(broadcast::error::TryRecvError::Empty)) {
            return Err(EngineError::Cancelled);
        }

        tracing::info!("Refreshing performance report...");
        let (returns, risk_free, benchmark) = tokio::join!(
            self.load_role(SeriesRole::Returns, &mut returns_rx),
            self.load_role(SeriesRole::RiskFree, &mut risk_free_rx),
            self.load_role(SeriesRole::Benchmark, &mut benchmark_rx),
        );
        returns?;
        risk_free?;
        benchmark?;

        let report = self.report_from_feed();
        if report.is_degraded() {
            tracing::warn!(
                degraded = ?report.degraded,
                "Report built on placeholder data for some series."
            );
        }
        tracing::info!(months = report.monthly.len(), "Performance report refreshed.");
        Ok(report)
    }

    async fn load_role(
        &self,
        role: SeriesRole,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> Result<(), EngineError> {
        let source_set = self.sources.for_role(role);
        if source_set.candidates.is_empty() {
            tracing::debug!(%role, "No sources configured.");
            self.feed.publish(role, SeriesState::NotConfigured);
            return Ok(());
        }

        let unit = source_set.unit_for(role);
        let series = self
            .loader
            .load_with_shutdown(role, &source_set.candidates, unit, shutdown)
            .await
            .ok_or(EngineError::Cancelled)?;
        self.feed.publish(role, SeriesState::Ready(series));
        Ok(())
    }

    /// Computes a report from the current state of the feed, settled or not.
    pub fn report_from_feed(&self) -> PerformanceReport {
        self.analytics.calculate(
            &self.feed.current(SeriesRole::Returns),
            &self.feed.current(SeriesRole::RiskFree),
            &self.feed.current(SeriesRole::Benchmark),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use configuration::{LoaderSettings, SourceSet};
    use core_types::{Metric, SeriesOrigin, ValueUnit};
    use series_loader::{LoaderError, SourceFetcher};
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    /// Serves fixed bodies; locators starting with `slow:` never answer in time.
    struct MemoryFetcher(HashMap<&'static str, &'static str>);

    #[async_trait]
    impl SourceFetcher for MemoryFetcher {
        async fn fetch(&self, locator: &str) -> Result<String, LoaderError> {
            if locator.starts_with("slow:") {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            self.0
                .get(locator)
                .map(|body| body.to_string())
                .ok_or(LoaderError::Status(404))
        }
    }

    fn engine(sources: Sources, files: &[(&'static str, &'static str)]) -> PerformanceEngine {
        let settings = Settings {
            sources,
            ..Settings::default()
        };
        let fetcher = Arc::new(MemoryFetcher(files.iter().copied().collect()));
        let loader = SeriesLoader::new(fetcher, &LoaderSettings::default());
        PerformanceEngine::new(&settings, loader).unwrap()
    }

    fn sources(returns: &[&str], risk_free: &[&str], benchmark: &[&str]) -> Sources {
        let set = |locators: &[&str]| SourceSet {
            candidates: locators.iter().map(|l| l.to_string()).collect(),
            unit: None,
        };
        Sources {
            returns: set(returns),
            risk_free: set(risk_free),
            benchmark: set(benchmark),
        }
    }

    #[tokio::test]
    async fn returns_only_configuration_produces_a_report() {
        let engine = engine(
            sources(&["Returns.csv"], &[], &[]),
            &[("Returns.csv", "Date,Return\n2024-01-10,-0.0005\n2024-01-11,0.0003\n")],
        );
        let (_tx, mut rx) = broadcast::channel(1);

        let report = engine.refresh(&mut rx).await.unwrap();

        assert_eq!(report.monthly.len(), 1);
        assert_eq!(report.monthly[0].period.to_string(), "2024-01");
        assert!(report.snapshot.daily_var.is_ready());
        assert!(matches!(report.snapshot.sharpe_ratio, Metric::Unavailable(_)));
        assert!(matches!(report.snapshot.correlation, Metric::Unavailable(_)));
        assert!(!report.is_degraded());
        assert_eq!(
            *engine.subscribe(SeriesRole::Benchmark).borrow(),
            SeriesState::NotConfigured
        );
    }

    #[tokio::test]
    async fn full_refresh_normalizes_units_and_flags_placeholders() {
        let engine = engine(
            sources(&["Returns.csv"], &["RF.csv"], &["missing.csv"]),
            &[
                ("Returns.csv", "2024-01-15,0.02\n2024-02-15,-0.01\n2024-03-15,0.03\n"),
                ("RF.csv", "Date,Rate\n02.01.2024,4.80\n"),
            ],
        );
        let mut risk_free = engine.subscribe(SeriesRole::RiskFree);
        let (_tx, mut rx) = broadcast::channel(1);

        let report = engine.refresh(&mut rx).await.unwrap();

        assert!(risk_free.has_changed().unwrap());
        let state = risk_free.borrow_and_update().clone();
        let rf = state.series().unwrap();
        assert_eq!(rf.origin(), &SeriesOrigin::Source("RF.csv".to_string()));
        assert!((rf.points()[0].value - ValueUnit::Percent.to_fraction(4.8)).abs() < 1e-12);

        assert!(report.snapshot.sharpe_ratio.is_ready());
        assert_eq!(report.degraded, vec![SeriesRole::Benchmark]);
        // The placeholder benchmark covers January 2024 only.
        assert_eq!(
            report.snapshot.correlation,
            Metric::Unavailable("insufficient aligned data".to_string())
        );
    }

    #[tokio::test]
    async fn refresh_after_shutdown_is_cancelled() {
        let engine = engine(
            sources(&["Returns.csv"], &[], &[]),
            &[("Returns.csv", "2024-01-10,0.01\n")],
        );
        let (tx, mut rx) = broadcast::channel(1);
        tx.send(()).unwrap();

        assert!(matches!(engine.refresh(&mut rx).await, Err(EngineError::Cancelled)));
        assert_eq!(engine.feed.current(SeriesRole::Returns), SeriesState::Pending);
    }

    #[tokio::test]
    async fn shutdown_interrupts_slow_sources_without_blocking_settled_roles() {
        let engine = engine(
            sources(&["Returns.csv"], &[], &["slow:SP500.csv"]),
            &[("Returns.csv", "2024-01-10,0.01\n")],
        );
        let (tx, mut rx) = broadcast::channel(1);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let _ = tx.send(());
        });

        let result = engine.refresh(&mut rx).await;

        assert!(matches!(result, Err(EngineError::Cancelled)));
        assert!(engine.feed.current(SeriesRole::Returns).series().is_some());
        assert_eq!(engine.feed.current(SeriesRole::Benchmark), SeriesState::Pending);
    }

    #[test]
    fn report_before_any_refresh_is_pending() {
        let engine = engine(sources(&["Returns.csv"], &[], &[]), &[]);
        let report = engine.report_from_feed();
        assert!(report.snapshot.daily_var.is_pending());
        assert!(report.monthly.is_empty());
    }
}
