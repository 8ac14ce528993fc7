use crate::AppState;
use engine::PerformanceEngine;
use engine::error::EngineError;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::time::{Duration, MissedTickBehavior, interval};

/// Keeps `state.report` current by refreshing it every `period` until `shutdown` fires.
///
/// Designed to run in a background task. A failed refresh is logged and the previous report
/// stays in place.
pub async fn run_refresh_loop(
    engine: Arc<PerformanceEngine>,
    state: Arc<AppState>,
    period: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    tracing::info!(period_secs = period.as_secs(), "Starting report refresh task.");
    // The first tick is immediate.
    let mut timer = interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.recv() => break,
            _ = timer.tick() => {}
        }

        match engine.refresh(&mut shutdown).await {
            Ok(report) => {
                *state.report.write().await = Some(report);
            }
            Err(EngineError::Cancelled) => break,
            Err(e) => {
                tracing::error!(error = %e, "Report refresh failed.");
            }
        }
    }

    tracing::info!("Report refresh task stopped.");
}
