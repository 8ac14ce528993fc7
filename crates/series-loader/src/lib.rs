//! # Series Loader
//!
//! Turns an ordered list of candidate sources into a `Series` for one role.
//!
//! Candidates are tried strictly in order. Transport failures, deadlines, markup error
//! pages and sources without a single usable row all move the loader on to the next
//! candidate. When every candidate fails the built-in placeholder dataset is returned,
//! tagged so that callers can show the degraded state. `SeriesLoader::load` therefore
//! always yields a series.

pub mod error;
pub mod fetcher;
pub mod loader;
pub mod parse;
pub mod placeholder;
pub mod sanitize;

pub use error::LoaderError;
pub use fetcher::{DefaultFetcher, FileFetcher, HttpFetcher, SourceFetcher, SourceLocator};
pub use loader::SeriesLoader;
pub use parse::{ParsedRows, parse_delimited};
pub use placeholder::placeholder_series;
pub use sanitize::sanitize;
