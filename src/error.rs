// src/error.rs
// =============================================================================
// This module defines every way a crawl (or a single page of it) can fail.
//
// Two groups of errors:
// - InvalidInput: the root URL or depth was rejected before any request
// - Per-page failures: something went wrong fetching or reading ONE page.
//   These never stop the rest of the crawl; the coordinator records them
//   and hands them back once the run is finished.
//
// Rust concepts:
// - thiserror: A derive macro that writes the Display/Error impls for us
// - #[from]: Lets `?` convert a library error into our error automatically
// =============================================================================

use thiserror::Error;

// All errors produced by the crawler library
//
// The message text of the HTTP variants starts with "HTTP request failed"
// and the parse variant with "failed to parse" so log output stays
// recognisable across failure kinds.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The root URL or max depth was rejected
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The server kept timing out, even after all retries
    #[error("request to {url} timed out after {attempts} attempt(s)")]
    Timeout { url: String, attempts: u32 },

    /// The server kept answering 429 Too Many Requests, even after all retries
    #[error("HTTP request failed: {url} still rate limited after {attempts} attempt(s)")]
    RateLimited { url: String, attempts: u32 },

    /// Any other non-200 status code (never retried)
    #[error("HTTP request failed: {url} returned {status}")]
    HttpStatus { url: String, status: u16 },

    /// The 200 response body could not be read as a document
    #[error("failed to parse {url}: {reason}")]
    Parse { url: String, reason: String },

    /// Any other network-level error (DNS, refused connection, TLS, ...)
    #[error("failed to crawl {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The HTTP client itself could not be created
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

impl CrawlError {
    /// The URL this error belongs to, if it came from a single page
    pub fn url(&self) -> Option<&str> {
        match self {
            CrawlError::Timeout { url, .. }
            | CrawlError::RateLimited { url, .. }
            | CrawlError::HttpStatus { url, .. }
            | CrawlError::Parse { url, .. }
            | CrawlError::Transport { url, .. } => Some(url),
            CrawlError::InvalidInput(_) | CrawlError::Client(_) => None,
        }
    }
}
