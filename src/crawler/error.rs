use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

/// Why a single page fetch produced no links.
///
/// Neither variant is retried. The orchestrator logs it and treats the page as
/// having zero outgoing links.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-2xx status
    #[error("received status {status} fetching {url}: {body}")]
    BadResponse {
        url: Url,
        status: StatusCode,
        body: String,
    },
    /// DNS, connect, timeout or body read failure
    #[error("transport failure fetching {url}: {source}")]
    Transport {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    pub fn url(&self) -> &Url {
        match self {
            FetchError::BadResponse { url, .. } | FetchError::Transport { url, .. } => url,
        }
    }
}

/// Reasons a crawl refuses to start
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("number of workers must be greater than zero")]
    NoWorkers,
    #[error("number of workers must be at most {max}, got {requested}")]
    TooManyWorkers { requested: usize, max: usize },
    #[error("seed url must be an http(s) url with a host, got {0}")]
    UnsupportedSeed(Url),
}
