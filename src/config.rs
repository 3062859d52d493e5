use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::crawler::{LINK_REQUEST_TIMEOUT_SEC, MAX_WORKER_COUNT};

/// Log levels as defined in log2 crate
#[derive(Debug, Serialize, Deserialize, Clone, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// Program arguments. `CrawlerConfig` describes only the crawl engine and is
/// built from this once the arguments check out.
#[derive(Parser, Debug, Serialize, Deserialize)]
#[command(author, version, about = "Prints every page reachable from a url within its base domain", long_about = None)]
pub struct Config {
    /// Url to start crawling from, e.g. https://example.com
    pub url: String,
    /// Number of pages fetched concurrently
    #[arg(short = 'n', long, default_value = "1")]
    pub workers: usize,
    /// Per-request timeout in seconds
    #[arg(long, default_value_t = LINK_REQUEST_TIMEOUT_SEC)]
    pub timeout_secs: u64,
    /// Write logs to this file instead of stdout
    #[arg(long)]
    pub log_file: Option<PathBuf>,
    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", value_enum)]
    pub log_level: LogLevel,
}

impl Config {
    pub fn new() -> Self {
        Self::parse()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.workers == 0 {
            anyhow::bail!("number of workers must be greater than zero");
        }
        if self.workers > MAX_WORKER_COUNT {
            anyhow::bail!("number of workers must be at most {}", MAX_WORKER_COUNT);
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout must be greater than zero");
        }
        self.seed_url()?;
        Ok(())
    }

    /// The seed as an absolute http(s) url
    pub fn seed_url(&self) -> anyhow::Result<Url> {
        let url = Url::parse(&self.url)
            .map_err(|e| anyhow::anyhow!("error parsing starting url '{}': {}", self.url, e))?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            anyhow::bail!("starting url must be an http(s) url with a host, got '{}'", self.url);
        }
        Ok(url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        write!(f, "{}", s)
    }
}
