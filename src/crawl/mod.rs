// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Concurrent crawling with a fixed pool of workers
// - Stays on the site: only links starting with the root URL are followed
// - Configurable depth limit
// - Every URL fetched at most once, even when many pages link to it
// - A sorted, de-duplicated list of URLs as the result
//
// Submodules:
// - config: what to crawl (CrawlConfig) and how (CrawlSettings)
// - pending: counts outstanding work so we know when we're done
// - visited: the shared set of URLs already claimed
// - queue: the coordinator (workers, intake queue, fetch tasks)
// - result: turns the visited set into the final list
// =============================================================================

mod config;
mod pending;
mod queue;
mod result;
mod visited;

// Re-export the crawling API
pub use config::{
    CrawlConfig, CrawlSettings, DEFAULT_MAX_RETRIES, DEFAULT_QUEUE_CAPACITY,
    DEFAULT_REQUEST_TIMEOUT, DEFAULT_RETRY_DELAY, DEFAULT_WORKER_COUNT,
};
pub use pending::{DoneGuard, PendingWork};
pub use queue::{crawl_webpage, crawl_with_settings, CrawlTarget, Crawler};
pub use result::CrawlResult;
pub use visited::VisitedSet;
