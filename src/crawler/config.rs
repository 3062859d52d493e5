use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use url::Url;

use super::error::CrawlError;

/// Default timeout for page requests in seconds
pub const LINK_REQUEST_TIMEOUT_SEC: u64 = 5;

/// Most workers the slot pool can hold
pub const MAX_WORKER_COUNT: usize = Semaphore::MAX_PERMITS;

/// Configuration for the crawler
pub struct CrawlerConfig {
    pub starting_url: Url,
    /// Number of fetches allowed in flight at once
    pub worker_count: usize,
    pub request_timeout: Duration,
}

impl CrawlerConfig {
    pub fn new(starting_url: Url) -> Self {
        Self {
            starting_url,
            worker_count: 1,
            request_timeout: Duration::from_secs(LINK_REQUEST_TIMEOUT_SEC),
        }
    }

    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<(), CrawlError> {
        if self.worker_count == 0 {
            return Err(CrawlError::NoWorkers);
        }
        if self.worker_count > MAX_WORKER_COUNT {
            return Err(CrawlError::TooManyWorkers {
                requested: self.worker_count,
                max: MAX_WORKER_COUNT,
            });
        }
        if !matches!(self.starting_url.scheme(), "http" | "https")
            || self.starting_url.host_str().is_none()
        {
            return Err(CrawlError::UnsupportedSeed(self.starting_url.clone()));
        }
        Ok(())
    }
}

pub type CrawlerConfigRef = Arc<CrawlerConfig>;
