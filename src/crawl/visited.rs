// src/crawl/visited.rs
// =============================================================================
// The set of URLs this crawl has already claimed.
//
// This is the only mutable state shared by every worker. All access goes
// through one RwLock, and the important operation is insert_if_absent():
// "check if visited" and "mark as visited" happen under the same write
// lock, so two workers racing on the same URL can never both win.
//
// Entries are never removed while a crawl runs.
// =============================================================================

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: RwLock<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `url` as visited
    ///
    /// Returns true if this call was the first to insert it.
    pub fn insert_if_absent(&self, url: &str) -> bool {
        // A panicking worker cannot leave the set half-updated (insert is a
        // single call), so a poisoned lock is still safe to use
        let mut urls = self.urls.write().unwrap_or_else(PoisonError::into_inner);
        if urls.contains(url) {
            return false;
        }
        urls.insert(url.to_string())
    }

    /// Moves every URL out, leaving the set empty
    ///
    /// Only called once the crawl is over. Fetch tasks may still hold a
    /// reference to the set for a moment after finishing, so this takes
    /// &self instead of consuming it.
    pub fn take_all(&self) -> HashSet<String> {
        std::mem::take(&mut *self.urls.write().unwrap_or_else(PoisonError::into_inner))
    }
}
