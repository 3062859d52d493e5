use std::collections::VecDeque;
use log2::trace;
use url::Url;

use super::filter::Filter;
use super::pool::{WorkerPool, WorkerSlot};

/// Lifecycle of a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPhase {
    Running,
    /// Cancelled, waiting for in-flight fetches, nothing new is leased
    Draining,
    Terminated,
}

/// What a finished crawl reports back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Number of urls admitted, in the order they were printed
    pub admitted: usize,
    /// Fetches that returned a page
    pub fetched: usize,
    /// Fetches that ended in a bad response, a transport error or a panic
    pub failed: usize,
    /// Whether the crawl ran to quiescence or was cancelled
    pub cancelled: bool,
    pub phase: CrawlPhase,
}

/// State owned by the single crawl coordinator.
///
/// Workers never see any of this, they only send reports back.
pub struct CrawlerState {
    /// Targets waiting to go through the filter
    pub queue: VecDeque<Url>,
    pub filter: Filter,
    pub pool: WorkerPool,
    pub phase: CrawlPhase,
    pub summary: CrawlSummary,
}

impl CrawlerState {
    pub fn new(starting_url: Url, worker_count: usize) -> Self {
        let mut queue = VecDeque::new();
        let filter = Filter::new(&starting_url);
        queue.push_back(starting_url);

        Self {
            queue,
            filter,
            pool: WorkerPool::new(worker_count),
            phase: CrawlPhase::Running,
            summary: CrawlSummary {
                admitted: 0,
                fetched: 0,
                failed: 0,
                cancelled: false,
                phase: CrawlPhase::Running,
            },
        }
    }

    /// Leases a slot and pairs it with the next admitted target.
    ///
    /// Returns `None` when no slot is free or the queue runs dry; in the
    /// latter case the slot is dropped and goes straight back to the pool.
    pub fn next_job(&mut self) -> Option<(WorkerSlot, Url)> {
        if self.queue.is_empty() {
            return None;
        }
        let slot = self.pool.try_lease()?;

        while let Some(target) = self.queue.pop_front() {
            if self.filter.visit(&target) {
                self.summary.admitted += 1;
                return Some((slot, target));
            }
            trace!("Skipping {}", target);
        }
        None
    }

    pub fn enqueue(&mut self, links: Vec<Url>) {
        self.queue.extend(links);
    }

    /// Nothing queued and nothing in flight. Only valid as a fixpoint when
    /// checked after the last report has been folded in.
    pub fn is_quiescent(&self) -> bool {
        self.queue.is_empty() && self.pool.is_idle()
    }

    pub fn into_summary(mut self) -> CrawlSummary {
        self.summary.phase = self.phase;
        self.summary
    }
}
