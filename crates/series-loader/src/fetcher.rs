use crate::error::LoaderError;
use async_trait::async_trait;
use configuration::LoaderSettings;
use reqwest::header::{CACHE_CONTROL, HeaderMap, HeaderValue};
use std::path::PathBuf;
use std::time::Duration;

/// Retrieves the raw text of a candidate source.
///
/// This trait is the seam between the loader and the outside world, allowing the
/// transport (HTTP, disk, or an in-memory fake in tests) to be swapped out.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, locator: &str) -> Result<String, LoaderError>;
}

/// A candidate source, classified by how it must be retrieved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocator {
    Http(String),
    File(PathBuf),
}

/// Strips `scheme` from the front of `locator`, ignoring ASCII case.
fn strip_scheme<'a>(locator: &'a str, scheme: &str) -> Option<&'a str> {
    let prefix = locator.get(..scheme.len())?;
    prefix
        .eq_ignore_ascii_case(scheme)
        .then(|| &locator[scheme.len()..])
}

impl SourceLocator {
    /// Schemes are matched case-insensitively; anything without `http(s)://` is a path.
    pub fn parse(locator: &str) -> Self {
        let locator = locator.trim();
        let remote = ["http://", "https://"]
            .into_iter()
            .any(|scheme| strip_scheme(locator, scheme).is_some());
        if remote {
            SourceLocator::Http(locator.to_string())
        } else {
            let path = strip_scheme(locator, "file://").unwrap_or(locator);
            SourceLocator::File(PathBuf::from(path))
        }
    }
}

/// Fetches `http(s)://` sources, bypassing intermediate caches.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(settings: &LoaderSettings) -> Result<Self, LoaderError> {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(settings.user_agent.clone())
            .timeout(Duration::from_millis(settings.fetch_timeout_ms))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl SourceFetcher for HttpFetcher {
    async fn fetch(&self, locator: &str) -> Result<String, LoaderError> {
        let response = self.client.get(locator).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoaderError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}

/// Reads sources from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileFetcher;

#[async_trait]
impl SourceFetcher for FileFetcher {
    async fn fetch(&self, locator: &str) -> Result<String, LoaderError> {
        let path = match SourceLocator::parse(locator) {
            SourceLocator::File(path) => path,
            SourceLocator::Http(url) => return Err(LoaderError::RemoteLocator(url)),
        };
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| LoaderError::Io {
                path: path.display().to_string(),
                source,
            })
    }
}

/// Dispatches each locator to the HTTP or file fetcher according to its scheme.
#[derive(Clone)]
pub struct DefaultFetcher {
    http: HttpFetcher,
    file: FileFetcher,
}

impl DefaultFetcher {
    pub fn new(settings: &LoaderSettings) -> Result<Self, LoaderError> {
        Ok(Self {
            http: HttpFetcher::new(settings)?,
            file: FileFetcher,
        })
    }
}

#[async_trait]
impl SourceFetcher for DefaultFetcher {
    async fn fetch(&self, locator: &str) -> Result<String, LoaderError> {
        match SourceLocator::parse(locator) {
            SourceLocator::Http(url) => self.http.fetch(&url).await,
            SourceLocator::File(_) => self.file.fetch(locator).await,
        }
    }
}
