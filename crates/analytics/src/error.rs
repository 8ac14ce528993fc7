use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("VaR confidence must be strictly between 0 and 1, got {0}")]
    InvalidConfidence(f64),
}
