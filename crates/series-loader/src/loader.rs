use crate::error::LoaderError;
use crate::fetcher::{DefaultFetcher, SourceFetcher};
use crate::parse::{ParsedRows, looks_like_markup, parse_delimited};
use crate::placeholder::placeholder_series;
use configuration::LoaderSettings;
use core_types::{Series, SeriesOrigin, SeriesRole, ValueUnit};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Loads one logical series from an ordered list of candidate sources.
#[derive(Clone)]
pub struct SeriesLoader {
    fetcher: Arc<dyn SourceFetcher>,
    fetch_timeout: Duration,
}

impl SeriesLoader {
    pub fn new(fetcher: Arc<dyn SourceFetcher>, settings: &LoaderSettings) -> Self {
        Self {
            fetcher,
            fetch_timeout: Duration::from_millis(settings.fetch_timeout_ms),
        }
    }

    /// Creates a loader that reads `http(s)://` locators over the network and everything
    /// else from disk.
    pub fn from_settings(settings: &LoaderSettings) -> Result<Self, LoaderError> {
        Ok(Self::new(Arc::new(DefaultFetcher::new(settings)?), settings))
    }

    /// Loads the series for `role`, falling back to the placeholder dataset when no
    /// candidate yields data. Never fails.
    pub async fn load(&self, role: SeriesRole, candidates: &[String], unit: ValueUnit) -> Series {
        self.run(role, candidates, unit, std::future::pending::<()>())
            .await
            .unwrap_or_else(|| placeholder_series(role))
    }

    /// Like `load`, but gives up as soon as `shutdown` fires (or its sender is dropped).
    ///
    /// The in-flight fetch is dropped and remaining candidates are skipped; `None` is
    /// returned in that case only.
    pub async fn load_with_shutdown(
        &self,
        role: SeriesRole,
        candidates: &[String],
        unit: ValueUnit,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> Option<Series> {
        let cancelled = async {
            let _ = shutdown.recv().await;
        };
        self.run(role, candidates, unit, cancelled).await
    }

    async fn run<C>(
        &self,
        role: SeriesRole,
        candidates: &[String],
        unit: ValueUnit,
        cancelled: C,
    ) -> Option<Series>
    where
        C: Future<Output = ()>,
    {
        tokio::pin!(cancelled);

        for (index, locator) in candidates.iter().enumerate() {
            let outcome = tokio::select! {
                biased;
                _ = &mut cancelled => {
                    tracing::info!(%role, candidate = %locator, "Series load cancelled.");
                    return None;
                }
                outcome = self.try_candidate(locator, unit) => outcome,
            };

            match outcome {
                Ok(parsed) => {
                    tracing::info!(
                        %role,
                        candidate = %locator,
                        rows = parsed.points.len(),
                        dropped = parsed.dropped,
                        european_dates = parsed.european_dates,
                        "Loaded series."
                    );
                    let origin = SeriesOrigin::Source(locator.clone());
                    return Some(Series::new(role, origin, parsed.points));
                }
                Err(e) => {
                    tracing::warn!(
                        %role,
                        candidate = %locator,
                        attempt = index + 1,
                        of = candidates.len(),
                        error = %e,
                        "Candidate source rejected."
                    );
                }
            }
        }

        tracing::warn!(
            %role,
            candidates = candidates.len(),
            "No candidate source produced data; substituting the placeholder dataset."
        );
        Some(placeholder_series(role))
    }

    /// Fetches and parses a single candidate under the fetch deadline.
    ///
    /// A candidate is accepted only if it yields at least one valid row.
    pub async fn try_candidate(
        &self,
        locator: &str,
        unit: ValueUnit,
    ) -> Result<ParsedRows, LoaderError> {
        let text = tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch(locator))
            .await
            .map_err(|_| LoaderError::Timeout(self.fetch_timeout.as_millis() as u64))??;

        if looks_like_markup(&text) {
            return Err(LoaderError::Markup);
        }

        let parsed = parse_delimited(&text, unit)?;
        if parsed.points.is_empty() {
            return Err(LoaderError::NoRows);
        }
        Ok(parsed)
    }
}
