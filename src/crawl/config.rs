// src/crawl/config.rs
// =============================================================================
// Configuration for one crawl run.
//
// Two structs:
// - CrawlConfig: WHAT to crawl (root URL + max depth). Validated once.
// - CrawlSettings: HOW to crawl (workers, queue size, retries, timeouts).
//   These used to be global constants; now they are passed in explicitly.
//
// Neither struct changes while a crawl is running.
// =============================================================================

use crate::error::CrawlError;
use std::time::Duration;
use url::Url;

/// Shortest root URL we accept ("http://a.b" is 10 characters)
const MIN_ROOT_URL_LEN: usize = 10;

/// Number of parallel workers draining the intake queue
pub const DEFAULT_WORKER_COUNT: usize = 5;

/// How many discovered links can wait in the intake queue at once
pub const DEFAULT_QUEUE_CAPACITY: usize = 5;

/// How many times a page is retried after a timeout or a 429
pub const DEFAULT_MAX_RETRIES: u32 = 10;

/// Fixed pause between two attempts at the same page
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(200);

/// Per-request timeout of the HTTP client
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// What to crawl
//
// Build it with CrawlConfig::new() so the root URL and depth are checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlConfig {
    root_url: String,
    max_depth: usize,
}

impl CrawlConfig {
    /// Validates the inputs of a crawl
    ///
    /// The root URL must be at least 10 characters, start with http:// or
    /// https://, and parse as an absolute URL. The depth must be at least 1.
    pub fn new(root_url: &str, max_depth: usize) -> Result<Self, CrawlError> {
        if root_url.len() < MIN_ROOT_URL_LEN {
            return Err(CrawlError::InvalidInput(format!(
                "root url '{}' is too short",
                root_url
            )));
        }

        if !root_url.starts_with("http://") && !root_url.starts_with("https://") {
            return Err(CrawlError::InvalidInput(format!(
                "root url '{}' must start with http:// or https://",
                root_url
            )));
        }

        // The prefix check above is what the crawl relies on; parsing just
        // rejects things like spaces in the host
        Url::parse(root_url)
            .map_err(|e| CrawlError::InvalidInput(format!("root url '{}': {}", root_url, e)))?;

        if max_depth == 0 {
            return Err(CrawlError::InvalidInput(
                "max depth must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            root_url: root_url.to_string(),
            max_depth,
        })
    }

    pub fn root_url(&self) -> &str {
        &self.root_url
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

// How to crawl
//
// Default::default() gives the values the crawler has always used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSettings {
    /// Workers triaging the intake queue (fetches run outside the workers)
    pub worker_count: usize,
    /// Capacity of the bounded intake queue
    pub queue_capacity: usize,
    /// Extra attempts after a timeout or 429 (total attempts = max_retries + 1)
    pub max_retries: u32,
    /// Fixed delay between attempts
    pub retry_delay: Duration,
    /// Timeout of a single HTTP request
    pub request_timeout: Duration,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl CrawlSettings {
    /// Zero workers or a zero-sized queue would hang the crawl, so both are
    /// bumped up to 1
    pub(crate) fn normalized(mut self) -> Self {
        self.worker_count = self.worker_count.max(1);
        self.queue_capacity = self.queue_capacity.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = CrawlConfig::new("https://example.com/", 3).unwrap();
        assert_eq!(config.root_url(), "https://example.com/");
        assert_eq!(config.max_depth(), 3);
    }

    #[test]
    fn test_reject_short_url() {
        let result = CrawlConfig::new("http://a", 1);
        assert!(matches!(result, Err(CrawlError::InvalidInput(_))));
    }

    #[test]
    fn test_reject_non_http_scheme() {
        let result = CrawlConfig::new("ftp://example.com/", 1);
        assert!(matches!(result, Err(CrawlError::InvalidInput(_))));
    }

    #[test]
    fn test_reject_zero_depth() {
        let result = CrawlConfig::new("https://example.com/", 0);
        assert!(matches!(result, Err(CrawlError::InvalidInput(_))));
    }

    #[test]
    fn test_reject_unparseable_url() {
        let result = CrawlConfig::new("http://exa mple.com/", 1);
        assert!(matches!(result, Err(CrawlError::InvalidInput(_))));
    }

    #[test]
    fn test_settings_normalized() {
        let settings = CrawlSettings {
            worker_count: 0,
            queue_capacity: 0,
            ..CrawlSettings::default()
        }
        .normalized();
        assert_eq!(settings.worker_count, 1);
        assert_eq!(settings.queue_capacity, 1);
        assert_eq!(settings.max_retries, DEFAULT_MAX_RETRIES);
    }
}
