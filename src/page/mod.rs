// src/page/mod.rs
// =============================================================================
// This module contains the work done for a single page.
//
// Submodules:
// - http: Downloads a page, retrying on timeouts and 429 responses
// - html: Finds the <a href> links in a downloaded page
//
// Neither knows about the crawl as a whole (depth limits, visited URLs);
// that lives in the crawl module.
// =============================================================================

mod html;
mod http;

pub use html::{discover_links, parse_links};
pub use http::Fetcher;
