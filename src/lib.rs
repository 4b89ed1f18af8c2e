// src/lib.rs
// =============================================================================
// site-crawler: lists every page of a website reachable from a root URL.
//
// Quick example:
//   let result = site_crawler::crawl_webpage("https://example.com/", 2).await;
//   for url in &result.urls {
//       println!("{}", url);
//   }
//
// Modules:
// - crawl: the crawl coordinator and its building blocks
// - page: fetching one page and finding its links
// - error: everything that can go wrong
//
// The library only emits `tracing` events; installing a subscriber to
// print them is up to the binary (see main.rs).
// =============================================================================

pub mod crawl;
pub mod error;
pub mod page;

pub use crawl::{
    crawl_webpage, crawl_with_settings, CrawlConfig, CrawlResult, CrawlSettings, Crawler,
};
pub use error::CrawlError;
