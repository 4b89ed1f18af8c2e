// src/crawl/result.rs
// =============================================================================
// Turns the visited set into the final answer of a crawl.
//
// Steps:
// 1. Take every URL from the visited set
// 2. Add the root URL (it must always be in a successful result)
// 3. Sort and remove duplicates
//
// If one of the pages failed, the error travels next to the list. The
// list then holds everything that was discovered before the run finished.
// =============================================================================

use crate::error::CrawlError;
use serde::{Serialize, Serializer};
use std::collections::HashSet;

// The outcome of one crawl run
#[derive(Debug, Default, Serialize)]
pub struct CrawlResult {
    /// Sorted, unique absolute URLs
    pub urls: Vec<String>,
    /// The first fatal page error of the run, if any
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<CrawlError>,
}

impl CrawlResult {
    /// Builds the result from whatever the crawl visited
    pub fn collect(root_url: &str, visited: HashSet<String>, error: Option<CrawlError>) -> Self {
        let mut urls: Vec<String> = visited.into_iter().collect();
        urls.push(root_url.to_string());
        urls.sort();
        urls.dedup();

        Self { urls, error }
    }

    /// A result with no URLs and no error (used when the input is rejected)
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Splits the result into the usual Result shape, dropping the partial
    /// list when there was an error
    pub fn into_result(self) -> Result<Vec<String>, CrawlError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.urls),
        }
    }
}

// Errors are written to JSON as their message (or null)
fn serialize_error<S>(error: &Option<CrawlError>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match error {
        Some(err) => serializer.serialize_some(&err.to_string()),
        None => serializer.serialize_none(),
    }
}
