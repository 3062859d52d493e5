use std::sync::Arc;

use anyhow::Result;
use log2::*;
use tokio_util::sync::CancellationToken;

use site_crawler::config;
use site_crawler::crawler::{self, CrawlerConfig, PageFetcher};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = config::Config::new();
    cfg.validate()?;
    let seed = cfg.seed_url()?;

    let logger = match &cfg.log_file {
        Some(path) => open(&path.to_string_lossy()),
        None => stdout(),
    };
    let _log2 = logger
        .module(true) // include module name
        .module_with_line(true) // include line number from module
        .module_filter(|module| module.starts_with("site_crawler")) // include only modules having this pattern
        .compress(false) // compress output
        .level(cfg.log_level.to_string())
        .start();

    let crawler_config = Arc::new(
        CrawlerConfig::new(seed)
            .with_worker_count(cfg.workers)
            .with_request_timeout(cfg.request_timeout()),
    );
    let fetcher = Arc::new(PageFetcher::from_config(&crawler_config));

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));

    let summary = crawler::crawl(crawler_config, fetcher, cancel, |url| println!("{}", url)).await?;
    if summary.cancelled {
        warn!("Crawl interrupted after {} pages", summary.admitted);
    }

    Ok(())
}

/// Cancels the crawl on Ctrl-C or SIGTERM
async fn cancel_on_signal(cancel: CancellationToken) {
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!("Failed to listen for Ctrl-C: {}", e);
                return;
            }
        }
        _ = terminate => {}
    }
    info!("Shutdown signal received");
    cancel.cancel();
}
