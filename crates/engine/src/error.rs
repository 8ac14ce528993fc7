use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Loader error: {0}")]
    Loader(#[from] series_loader::LoaderError),

    #[error("Analytics error: {0}")]
    Analytics(#[from] analytics::AnalyticsError),

    #[error("Refresh cancelled by shutdown signal.")]
    Cancelled,
}
