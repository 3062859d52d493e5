pub mod config;
pub mod error;
pub mod filter;
pub mod pool;
pub mod state;
pub mod scrape;
pub mod runner;


pub use config::{CrawlerConfig, CrawlerConfigRef, LINK_REQUEST_TIMEOUT_SEC, MAX_WORKER_COUNT};
pub use error::{CrawlError, FetchError};
pub use filter::Filter;
pub use pool::{WorkerPool, WorkerSlot};
pub use state::{CrawlPhase, CrawlSummary, CrawlerState};
pub use scrape::{extract_links, resolve_link, LinkSource, PageFetcher};
pub use runner::crawl;
