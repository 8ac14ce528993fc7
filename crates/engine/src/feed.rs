use core_types::{SeriesRole, SeriesState};
use tokio::sync::watch;

/// One `watch` channel per logical series.
///
/// Subscribers see the latest settled state of each role independently, so a renderer can
/// show the returns-only figures while the benchmark is still loading.
#[derive(Debug)]
pub struct SeriesFeed {
    returns: watch::Sender<SeriesState>,
    risk_free: watch::Sender<SeriesState>,
    benchmark: watch::Sender<SeriesState>,
}

impl SeriesFeed {
    pub fn new() -> Self {
        Self {
            returns: watch::Sender::new(SeriesState::Pending),
            risk_free: watch::Sender::new(SeriesState::Pending),
            benchmark: watch::Sender::new(SeriesState::Pending),
        }
    }

    fn channel(&self, role: SeriesRole) -> &watch::Sender<SeriesState> {
        match role {
            SeriesRole::Returns => &self.returns,
            SeriesRole::RiskFree => &self.risk_free,
            SeriesRole::Benchmark => &self.benchmark,
        }
    }

    pub fn subscribe(&self, role: SeriesRole) -> watch::Receiver<SeriesState> {
        self.channel(role).subscribe()
    }

    /// Replaces the state of `role`. Succeeds whether or not anyone is subscribed.
    pub fn publish(&self, role: SeriesRole, state: SeriesState) {
        self.channel(role).send_replace(state);
    }

    /// A clone of the current state of `role`.
    pub fn current(&self, role: SeriesRole) -> SeriesState {
        self.channel(role).borrow().clone()
    }
}

impl Default for SeriesFeed {
    fn default() -> Self {
        Self::new()
    }
}
