use thiserror::Error;

/// Why a single candidate source was rejected.
///
/// These never escape `SeriesLoader::load`; they are logged and the loader moves on to the
/// next candidate.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Source answered with HTTP status {0}")]
    Status(u16),

    #[error("Failed to read source file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{0}' is a remote source and cannot be read from disk")]
    RemoteLocator(String),

    #[error("Source returned a markup page instead of delimited data")]
    Markup,

    #[error("Failed to parse delimited data: {0}")]
    Csv(#[from] csv::Error),

    #[error("Source contained no usable rows")]
    NoRows,

    #[error("Fetch did not complete within {0} ms")]
    Timeout(u64),
}
