use std::sync::Arc;

use log2::*;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use url::Url;

use super::config::CrawlerConfigRef;
use super::error::{CrawlError, FetchError};
use super::pool::WorkerSlot;
use super::scrape::LinkSource;
use super::state::{CrawlPhase, CrawlSummary, CrawlerState};

/// What a worker hands back when its fetch is over. The slot travels with the
/// links so the coordinator frees it and enqueues them in the same step.
struct FetchReport {
    slot: WorkerSlot,
    target: Url,
    result: Result<Vec<Url>, FetchError>,
}

/// Crawls everything reachable from the configured seed within its base
/// domain, calling `on_admit` once per admitted url in admission order.
///
/// A single coordinator (this future) owns the queue, the filter and the pool;
/// fetches run as tasks and only talk back through their [`FetchReport`]. The
/// crawl ends when the queue is empty and every slot is free at the same time,
/// or when `cancel` fires. After cancellation nothing new is leased, running
/// fetches are awaited (each bounded by its request timeout) and their links
/// are dropped.
pub async fn crawl<S, F>(
    crawler_cfg_ref: CrawlerConfigRef,
    source: Arc<S>,
    cancel: CancellationToken,
    mut on_admit: F,
) -> Result<CrawlSummary, CrawlError>
where
    S: LinkSource,
    F: FnMut(&Url),
{
    crawler_cfg_ref.validate()?;

    let mut state = CrawlerState::new(crawler_cfg_ref.starting_url.clone(), crawler_cfg_ref.worker_count);
    let mut workers: JoinSet<FetchReport> = JoinSet::new();
    info!(
        "Crawling {} with {} workers, base domain {}",
        crawler_cfg_ref.starting_url,
        state.pool.size(),
        state.filter.base_domain()
    );

    while state.phase == CrawlPhase::Running {
        if cancel.is_cancelled() {
            begin_draining(&mut state);
            break;
        }

        while !cancel.is_cancelled() {
            let Some((slot, target)) = state.next_job() else {
                break;
            };
            debug!("Admitted {}", target);
            on_admit(&target);
            spawn_fetch(&mut workers, &source, slot, target);
        }

        // Checked after every report is folded in: an empty queue alone is
        // not enough while fetches can still push more work.
        if state.is_quiescent() {
            info!("Queue empty and all workers idle. Shutting down.");
            state.phase = CrawlPhase::Terminated;
            break;
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => begin_draining(&mut state),
            Some(joined) = workers.join_next() => {
                if let Some(links) = fold_report(&mut state, joined) {
                    state.enqueue(links);
                }
            }
        }
    }

    if state.phase == CrawlPhase::Draining {
        while let Some(joined) = workers.join_next().await {
            // links found after cancellation are not followed
            drop(fold_report(&mut state, joined));
        }
        state.phase = CrawlPhase::Terminated;
    }

    let summary = state.into_summary();
    info!(
        "Crawl finished: {} admitted, {} fetched, {} failed",
        summary.admitted, summary.fetched, summary.failed
    );
    Ok(summary)
}

fn begin_draining(state: &mut CrawlerState) {
    info!("Cancellation requested, draining {} in-flight fetches", state.pool.leased());
    state.phase = CrawlPhase::Draining;
    state.summary.cancelled = true;
}

fn spawn_fetch<S: LinkSource>(workers: &mut JoinSet<FetchReport>, source: &Arc<S>, slot: WorkerSlot, target: Url) {
    let source = Arc::clone(source);
    workers.spawn(async move {
        let result = source.fetch_links(&target).await;
        FetchReport { slot, target, result }
    });
}

/// Releases the slot of a finished fetch and returns the links it found.
/// Failures are logged and count as a page without links.
fn fold_report(state: &mut CrawlerState, joined: Result<FetchReport, JoinError>) -> Option<Vec<Url>> {
    let report = match joined {
        Ok(report) => report,
        Err(e) => {
            // a panicking fetch already gave its slot back while unwinding
            error!("Worker task failed: {}", e);
            state.summary.failed += 1;
            return None;
        }
    };

    let FetchReport { slot, target, result } = report;
    drop(slot);

    match result {
        Ok(links) => {
            trace!("Worker done with {}, {} links", target, links.len());
            state.summary.fetched += 1;
            Some(links)
        }
        Err(e) => {
            warn!("Failed to scrape {}: {}", target, e);
            state.summary.failed += 1;
            None
        }
    }
}
