use crate::structs::Series;
use serde::{Deserialize, Serialize};

/// The state of a single reported figure.
///
/// Consumers branch on the variant instead of sniffing placeholder strings.
/// Serialized as `{"state": "ready", "value": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Metric<T> {
    /// The figure was computed.
    Ready(T),
    /// An input series has not settled yet.
    Pending,
    /// The figure cannot be computed from the inputs; the payload says why.
    Unavailable(String),
}

impl<T> Metric<T> {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Metric::Unavailable(reason.into())
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Metric::Ready(_))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Metric::Pending)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Metric::Ready(value) => Some(value),
            _ => None,
        }
    }
}

/// The settlement state of one logical series, as published to subscribers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "series", rename_all = "snake_case")]
pub enum SeriesState {
    /// The load for this role has not finished yet.
    #[default]
    Pending,
    /// The load finished. The series may be the placeholder dataset.
    Ready(Series),
    /// No source is configured for this role, so nothing will ever be loaded.
    NotConfigured,
}

impl SeriesState {
    pub fn series(&self) -> Option<&Series> {
        match self {
            SeriesState::Ready(series) => Some(series),
            _ => None,
        }
    }
}
