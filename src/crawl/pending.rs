// src/crawl/pending.rs
// =============================================================================
// Counts the crawl work that is still queued or in flight.
//
// The crawl is finished exactly when this counter drops back to zero.
//
// Rules every caller follows:
// - add() BEFORE a target is pushed into the intake queue (including the
//   root), never after. Otherwise the count could touch zero while a link
//   is still travelling through the queue.
// - done() once that target has been fully handled: fetched and its links
//   queued, or dropped as filtered/duplicate/too deep/failed.
//   Fetch tasks hold a DoneGuard instead, so a task that panics or is
//   aborted still counts itself out.
//
// Rust concepts:
// - AtomicUsize: A number many tasks can change without a lock
// - Notify: Wakes up tasks waiting for "the count reached zero"
// - Drop: DoneGuard calls done() when it goes out of scope, even on panic
// =============================================================================

use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

#[derive(Debug, Default)]
pub struct PendingWork {
    count: AtomicUsize,
    idle: Notify,
}

impl PendingWork {
    pub fn new() -> Self {
        Self::default()
    }

    /// One more target has been scheduled
    pub fn add(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    /// One target has reached a terminal state
    pub fn done(&self) {
        let previous = self.count.fetch_sub(1, Ordering::SeqCst);
        debug_assert!(previous > 0, "pending work counter underflow");
        if previous == 1 {
            self.idle.notify_waiters();
        }
    }

    /// Calls done() when the returned guard is dropped
    pub fn done_on_drop(&self) -> DoneGuard<'_> {
        DoneGuard { pending: self }
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Waits until no work is left
    ///
    /// Returns immediately if the counter is already zero.
    pub async fn wait_idle(&self) {
        loop {
            // Register interest before reading the count, so a done() that
            // lands in between still wakes us
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.count() == 0 {
                return;
            }

            notified.await;
        }
    }
}

// Marks one target as finished when dropped
#[must_use = "the target is marked done as soon as the guard is dropped"]
pub struct DoneGuard<'a> {
    pending: &'a PendingWork,
}

impl Drop for DoneGuard<'_> {
    fn drop(&mut self) {
        self.pending.done();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_idle_when_empty() {
        let pending = PendingWork::new();
        pending.wait_idle().await;
        assert_eq!(pending.count(), 0);
    }

    #[tokio::test]
    async fn test_wakes_when_last_item_done() {
        let pending = Arc::new(PendingWork::new());
        pending.add();
        pending.add();

        let worker = {
            let pending = pending.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                pending.done();
                tokio::time::sleep(Duration::from_millis(20)).await;
                pending.done();
            })
        };

        tokio::time::timeout(Duration::from_secs(5), pending.wait_idle())
            .await
            .expect("wait_idle never returned");
        assert_eq!(pending.count(), 0);
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn test_guard_counts_out_a_panicking_task() {
        let pending = Arc::new(PendingWork::new());
        pending.add();

        let task = {
            let pending = pending.clone();
            tokio::spawn(async move {
                let _done = pending.done_on_drop();
                tokio::time::sleep(Duration::from_millis(10)).await;
                panic!("page handler blew up");
            })
        };

        tokio::time::timeout(Duration::from_secs(5), pending.wait_idle())
            .await
            .expect("wait_idle never returned after a panic");
        assert_eq!(pending.count(), 0);
        assert!(task.await.unwrap_err().is_panic());
    }
}
