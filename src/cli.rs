// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// clap is a popular Rust library for parsing command-line arguments.
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Rust concepts:
// - Structs: Custom data types that group related data
// - Derive macros: Automatically generate code for our types
// =============================================================================

use clap::Parser;
use site_crawler::crawl::{
    CrawlSettings, DEFAULT_MAX_RETRIES, DEFAULT_QUEUE_CAPACITY, DEFAULT_REQUEST_TIMEOUT,
    DEFAULT_RETRY_DELAY, DEFAULT_WORKER_COUNT,
};
use std::time::Duration;

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure how the CLI behaves
#[derive(Parser, Debug)]
#[command(
    name = "site-crawler",
    version,
    about = "Crawl a website and list every page reachable from a root URL",
    long_about = "site-crawler follows <a href> links that stay under the root URL, \
                  up to a maximum depth, and prints the sorted list of pages it found."
)]
pub struct Cli {
    /// The url that you want to crawl
    #[arg(short, long, default_value = "https://www.example.com/")]
    pub url: String,

    /// The maximum number of links deep to traverse
    ///
    /// Depth 1 = the root page and the links on it
    /// Depth 2 = ... plus the links on those pages
    #[arg(short, long, default_value_t = 3)]
    pub depth: usize,

    /// Number of parallel workers reading the link queue
    #[arg(long, default_value_t = DEFAULT_WORKER_COUNT)]
    pub workers: usize,

    /// Size of the queue between page fetches and workers
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY)]
    pub queue_size: usize,

    /// How often a page is retried after a timeout or HTTP 429
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,

    /// Pause between retries, in milliseconds
    #[arg(long, default_value_t = DEFAULT_RETRY_DELAY.as_millis() as u64)]
    pub retry_delay_ms: u64,

    /// Timeout of a single HTTP request, in seconds
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs())]
    pub timeout_secs: u64,

    /// Output results in JSON format instead of a numbered list
    #[arg(long)]
    pub json: bool,

    /// Show debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// The crawl settings described by the flags
    pub fn settings(&self) -> CrawlSettings {
        CrawlSettings {
            worker_count: self.workers,
            queue_capacity: self.queue_size,
            max_retries: self.max_retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            request_timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}
