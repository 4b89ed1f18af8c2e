// src/crawl/queue.rs
// =============================================================================
// This module coordinates a whole crawl run.
//
// How it works:
// 1. The root URL goes into the intake queue at depth 1
// 2. A fixed pool of workers takes links off the queue and, for each one:
//    a. turns "/path" into "<root>/path"
//    b. drops it if it doesn't start with the root URL (other sites)
//    c. drops it if another worker already claimed it (visited set)
//    d. records it without fetching if it is deeper than max_depth
//    e. otherwise spawns a fetch task for it
// 3. A fetch task downloads the page, finds its links and pushes them back
//    into the queue one level deeper
// 4. When the pending-work counter reaches zero, everything is done and the
//    visited set becomes the (sorted) result
//
// Workers never fetch themselves, so a slow page only holds up its own
// task. That also means more fetches can run at once than there are workers.
//
// Errors: a failed page only ends its own branch. The first error is kept
// and returned with the result; the rest of the crawl carries on.
//
// Rust concepts:
// - Arc: Shares the crawl state between many tasks
// - mpsc channel: A bounded queue with many senders and one receiver
// - tokio::select!: Waits for whichever of two things happens first
// =============================================================================

use super::config::{CrawlConfig, CrawlSettings};
use super::pending::PendingWork;
use super::result::CrawlResult;
use super::visited::VisitedSet;
use crate::error::CrawlError;
use crate::page::{parse_links, Fetcher};
use futures::future::join_all;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

// A link waiting to be crawled
//
// `url` may still be root-relative ("/docs") until a worker normalizes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    pub url: String,
    /// Number of hops from the root (the root itself is depth 1)
    pub depth: usize,
}

impl CrawlTarget {
    pub fn new(url: impl Into<String>, depth: usize) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }
}

// The crawl coordinator
//
// Example:
//   let config = CrawlConfig::new("https://example.com/", 2)?;
//   let result = Crawler::new(config, CrawlSettings::default())?.run().await;
pub struct Crawler {
    config: CrawlConfig,
    settings: CrawlSettings,
    fetcher: Fetcher,
}

// State shared by the workers and every fetch task of one run
struct CrawlState {
    config: CrawlConfig,
    fetcher: Fetcher,
    visited: VisitedSet,
    pending: PendingWork,
    first_error: Mutex<Option<CrawlError>>,
    intake: mpsc::Sender<CrawlTarget>,
}

type Intake = Arc<tokio::sync::Mutex<mpsc::Receiver<CrawlTarget>>>;

impl Crawler {
    /// Creates a crawler with its own HTTP client
    pub fn new(config: CrawlConfig, settings: CrawlSettings) -> Result<Self, CrawlError> {
        let settings = settings.normalized();
        let fetcher = Fetcher::new(&settings)?;
        Ok(Self::with_fetcher(config, settings, fetcher))
    }

    /// Creates a crawler around an existing fetcher
    pub fn with_fetcher(config: CrawlConfig, settings: CrawlSettings, fetcher: Fetcher) -> Self {
        Self {
            config,
            settings: settings.normalized(),
            fetcher,
        }
    }

    /// Runs the crawl to completion
    ///
    /// There is no way to stop a run early; it ends when every reachable
    /// link has been crawled, dropped or has failed.
    pub async fn run(self) -> CrawlResult {
        let (intake, receiver) = mpsc::channel(self.settings.queue_capacity);
        let receiver: Intake = Arc::new(tokio::sync::Mutex::new(receiver));

        let state = Arc::new(CrawlState {
            config: self.config,
            fetcher: self.fetcher,
            visited: VisitedSet::new(),
            pending: PendingWork::new(),
            first_error: Mutex::new(None),
            intake,
        });

        info!(
            root = state.config.root_url(),
            max_depth = state.config.max_depth(),
            workers = self.settings.worker_count,
            "starting crawl"
        );

        // Seed before starting the workers so they never see an idle counter
        // at startup
        let root = CrawlTarget::new(state.config.root_url(), 1);
        state.schedule(root).await;

        let workers: Vec<_> = (0..self.settings.worker_count)
            .map(|id| tokio::spawn(worker(id, state.clone(), receiver.clone())))
            .collect();

        state.pending.wait_idle().await;

        for joined in join_all(workers).await {
            if let Err(e) = joined {
                warn!("crawl worker ended abnormally: {}", e);
            }
        }

        let visited = state.visited.take_all();
        let error = state
            .first_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let result = CrawlResult::collect(state.config.root_url(), visited, error);
        info!(urls = result.urls.len(), failed = !result.is_ok(), "crawl finished");
        result
    }
}

// One member of the worker pool
//
// Pulls targets off the shared queue until the crawl has no pending work.
async fn worker(id: usize, state: Arc<CrawlState>, receiver: Intake) {
    loop {
        let next = tokio::select! {
            _ = state.pending.wait_idle() => None,
            target = async { receiver.lock().await.recv().await } => target,
        };

        match next {
            Some(target) => state.admit(target),
            None => break,
        }
    }

    debug!(worker = id, "worker stopped");
}

impl CrawlState {
    // Counts a target and pushes it into the intake queue
    //
    // The counter goes up BEFORE the send; see pending.rs for why.
    async fn schedule(&self, target: CrawlTarget) {
        self.pending.add();
        if let Err(e) = self.intake.send(target).await {
            // Only possible once the run is over and the queue is gone
            warn!(url = %e.0.url, "intake queue closed, dropping link");
            self.pending.done();
        }
    }

    // Decides what happens to one target taken off the queue
    //
    // Always ends with exactly one pending.done(): either right here, or by
    // the guard in the fetch task it spawns.
    fn admit(self: &Arc<Self>, target: CrawlTarget) {
        let url = self.normalize(&target.url);

        if !url.starts_with(self.config.root_url()) {
            debug!(url = %url, "skipping link outside the root url");
            self.pending.done();
            return;
        }

        if !self.visited.insert_if_absent(&url) {
            self.pending.done();
            return;
        }

        if target.depth > self.config.max_depth() {
            // Recorded as discovered, but not fetched
            debug!(url = %url, depth = target.depth, "max depth reached");
            self.pending.done();
            return;
        }

        info!(depth = target.depth, url = %url, "crawled");

        let state = Arc::clone(self);
        let target = CrawlTarget::new(url, target.depth);
        tokio::spawn(async move {
            state.process(target).await;
        });
    }

    // Fetches one accepted page and queues its links
    //
    // The guard marks the target done however this task ends, a panic
    // included, so the workers can't wait forever on a lost count.
    async fn process(&self, target: CrawlTarget) {
        let _done = self.pending.done_on_drop();

        match self.fetcher.fetch(&target.url).await {
            Ok(body) => {
                // Parsed and dropped before the sends below, since the parsed
                // document can't be held across an .await in a spawned task
                let children = parse_links(&body, target.depth);
                debug!(url = %target.url, links = children.len(), "page parsed");

                for child in children {
                    self.schedule(child).await;
                }
            }
            Err(err) => self.record_error(&target, err),
        }
    }

    // Keeps the first fatal error of the run; later ones are only logged
    fn record_error(&self, target: &CrawlTarget, err: CrawlError) {
        error!(url = err.url().unwrap_or(target.url.as_str()), "error {}", err);

        let mut slot = self
            .first_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            *slot = Some(err);
        }
    }

    // Rewrites "/path" as "<root>/path"; everything else is left alone
    //
    // If the root already ends with '/', one slash is dropped so that
    // "https://example.com/" + "/a" gives "https://example.com/a".
    fn normalize(&self, url: &str) -> String {
        if !url.starts_with('/') {
            return url.to_string();
        }

        let root = self.config.root_url();
        let root = root.strip_suffix('/').unwrap_or(root);
        format!("{}{}", root, url)
    }
}

// Crawls `root_url` up to `max_depth` with the default settings
//
// Invalid input (a root URL that is too short or not http(s), or a depth of
// zero) is not an error: a warning is logged and an empty result returned.
pub async fn crawl_webpage(root_url: &str, max_depth: usize) -> CrawlResult {
    crawl_with_settings(root_url, max_depth, CrawlSettings::default()).await
}

// Same as crawl_webpage(), with explicit settings
pub async fn crawl_with_settings(
    root_url: &str,
    max_depth: usize,
    settings: CrawlSettings,
) -> CrawlResult {
    let config = match CrawlConfig::new(root_url, max_depth) {
        Ok(config) => config,
        Err(e) => {
            warn!("{}", e);
            return CrawlResult::empty();
        }
    };

    match Crawler::new(config, settings) {
        Ok(crawler) => crawler.run().await,
        Err(e) => CrawlResult {
            urls: Vec::new(),
            error: Some(e),
        },
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why is the counter incremented before sending?
//    - Picture a page whose only link is sitting in the queue
//    - If we counted it after the send, a worker could finish the page's
//      own target first, the count would hit zero, and the crawl would end
//      while the link is still in the queue
//
// 2. Why can't two workers fetch the same URL?
//    - insert_if_absent() checks and inserts under one write lock
//    - Only the worker that actually inserted gets `true` back
//
// 3. Why do fetch tasks send into a bounded queue?
//    - The queue holds at most queue_capacity links
//    - A task with many links waits until workers make room
//    - Workers never send, so they always keep draining it
//
// 4. What does Arc::clone(self) do on `self: &Arc<Self>`?
//    - Makes another owner of the same shared state for the new task
//    - The state lives until the last task is done with it
//
// 5. How do workers know when to stop?
//    - tokio::select! waits on both "next link" and "no work left"
//    - When the pending count reaches zero every worker breaks its loop
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_settings() -> CrawlSettings {
        CrawlSettings {
            max_retries: 2,
            retry_delay: Duration::from_millis(5),
            request_timeout: Duration::from_secs(5),
            ..CrawlSettings::default()
        }
    }

    async fn mount_page(server: &MockServer, page: &str, html: &str, hits: u64) {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(ResponseTemplate::new(200).set_body_string(html.to_string()))
            .expect(hits)
            .mount(server)
            .await;
    }

    fn state_for(root: &str) -> CrawlState {
        let (intake, _receiver) = mpsc::channel(1);
        let settings = test_settings();
        CrawlState {
            config: CrawlConfig::new(root, 1).unwrap(),
            fetcher: Fetcher::new(&settings).unwrap(),
            visited: VisitedSet::new(),
            pending: PendingWork::new(),
            first_error: Mutex::new(None),
            intake,
        }
    }

    #[test]
    fn test_normalize_root_relative() {
        let state = state_for("https://example.com/");
        assert_eq!(state.normalize("/a"), "https://example.com/a");
        assert_eq!(state.normalize("/"), "https://example.com/");

        let state = state_for("https://example.com");
        assert_eq!(state.normalize("/a"), "https://example.com/a");
    }

    #[test]
    fn test_normalize_leaves_other_forms_alone() {
        let state = state_for("https://example.com/");
        assert_eq!(state.normalize("https://other.com/b"), "https://other.com/b");
        assert_eq!(state.normalize("../up"), "../up");
        assert_eq!(state.normalize("page.html"), "page.html");
    }

    #[tokio::test]
    async fn test_cross_origin_link_excluded() {
        let server = MockServer::start().await;
        let root = format!("{}/", server.uri());

        mount_page(
            &server,
            "/",
            r#"<a href="/a">A</a><a href="https://other.com/b">B</a>"#,
            1,
        )
        .await;
        // Depth 1: /a is recorded but never fetched
        mount_page(&server, "/a", "", 0).await;

        let result = crawl_with_settings(&root, 1, test_settings()).await;

        assert!(result.is_ok(), "unexpected error: {:?}", result.error);
        assert_eq!(result.urls, vec![root.clone(), format!("{}a", root)]);
    }

    #[tokio::test]
    async fn test_duplicate_hrefs_fetched_once() {
        let server = MockServer::start().await;
        let root = format!("{}/", server.uri());

        mount_page(&server, "/", r#"<a href="/a">1</a><a href="/a">2</a>"#, 1).await;
        mount_page(&server, "/a", r#"<a href="/">home</a>"#, 1).await;

        let result = crawl_with_settings(&root, 3, test_settings()).await;

        assert!(result.is_ok());
        assert_eq!(result.urls, vec![root.clone(), format!("{}a", root)]);
    }

    #[tokio::test]
    async fn test_depth_bound() {
        let server = MockServer::start().await;
        let root = format!("{}/", server.uri());

        mount_page(&server, "/", r#"<a href="/a">a</a>"#, 1).await;
        mount_page(&server, "/a", r#"<a href="/b">b</a>"#, 1).await;
        mount_page(&server, "/b", r#"<a href="/c">c</a>"#, 0).await;

        let result = crawl_with_settings(&root, 2, test_settings()).await;

        assert!(result.is_ok());
        assert_eq!(
            result.urls,
            vec![root.clone(), format!("{}a", root), format!("{}b", root)]
        );
    }

    #[tokio::test]
    async fn test_root_500_is_reported_without_retry() {
        let server = MockServer::start().await;
        let root = format!("{}/", server.uri());

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let result = crawl_with_settings(&root, 2, test_settings()).await;

        assert!(matches!(
            result.error,
            Some(CrawlError::HttpStatus { status: 500, .. })
        ));
        assert_eq!(result.urls, vec![root]);
    }

    #[tokio::test]
    async fn test_failed_branch_does_not_stop_others() {
        let server = MockServer::start().await;
        let root = format!("{}/", server.uri());

        mount_page(&server, "/", r#"<a href="/bad">x</a><a href="/ok">y</a>"#, 1).await;
        Mock::given(method("GET"))
            .and(path("/bad"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        mount_page(&server, "/ok", r#"<a href="/deep">z</a>"#, 1).await;
        mount_page(&server, "/deep", "", 1).await;

        let result = crawl_with_settings(&root, 3, test_settings()).await;

        assert!(matches!(
            result.error,
            Some(CrawlError::HttpStatus { status: 404, .. })
        ));
        assert!(result.urls.contains(&format!("{}deep", root)));
        assert!(result.urls.contains(&format!("{}bad", root)));
    }

    #[tokio::test]
    async fn test_rate_limited_page_retried_then_reported() {
        let server = MockServer::start().await;
        let root = format!("{}/", server.uri());

        mount_page(&server, "/", r#"<a href="/busy">busy</a>"#, 1).await;
        Mock::given(method("GET"))
            .and(path("/busy"))
            .respond_with(ResponseTemplate::new(429))
            .expect(3) // max_retries (2) + 1
            .mount(&server)
            .await;

        let result = crawl_with_settings(&root, 2, test_settings()).await;

        assert!(matches!(
            result.error,
            Some(CrawlError::RateLimited { attempts: 3, .. })
        ));
    }

    #[tokio::test]
    async fn test_densely_linked_pages_each_fetched_once() {
        let server = MockServer::start().await;
        let root = format!("{}/", server.uri());

        // Every page links to every other page (and to itself)
        let links: String = (0..12)
            .map(|i| format!(r#"<a href="/p{}">p{}</a>"#, i, i))
            .collect();
        let page = format!(r#"<a href="/">home</a>{}"#, links);

        mount_page(&server, "/", &page, 1).await;
        for i in 0..12 {
            mount_page(&server, &format!("/p{}", i), &page, 1).await;
        }

        let settings = CrawlSettings {
            worker_count: 3,
            queue_capacity: 2,
            ..test_settings()
        };
        let result = crawl_with_settings(&root, 4, settings).await;

        assert!(result.is_ok());
        assert_eq!(result.urls.len(), 13);
        assert!(result.urls.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_cycle_terminates() {
        let server = MockServer::start().await;
        let root = format!("{}/", server.uri());

        mount_page(&server, "/", r#"<a href="/a">a</a>"#, 1).await;
        mount_page(&server, "/a", r#"<a href="/">back</a><a href="/a">self</a>"#, 1).await;

        let result = tokio::time::timeout(
            Duration::from_secs(10),
            crawl_with_settings(&root, 50, test_settings()),
        )
        .await
        .expect("crawl did not finish");

        assert_eq!(result.urls, vec![root.clone(), format!("{}a", root)]);
    }

    #[tokio::test]
    async fn test_invalid_input_is_silent_noop() {
        let result = crawl_webpage("ftp://example.com/", 2).await;
        assert!(result.urls.is_empty());
        assert!(result.is_ok());

        let result = crawl_webpage("https://example.com/", 0).await;
        assert!(result.urls.is_empty());
        assert!(result.is_ok());

        let result = crawl_webpage("http://a", 1).await;
        assert!(result.urls.is_empty());
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_crawler_with_fetcher() {
        let server = MockServer::start().await;
        let root = format!("{}/", server.uri());
        mount_page(&server, "/", "<p>no links here</p>", 1).await;

        let settings = test_settings();
        let fetcher = Fetcher::new(&settings).unwrap();
        let config = CrawlConfig::new(&root, 1).unwrap();
        let result = Crawler::with_fetcher(config, settings, fetcher).run().await;

        assert_eq!(result.into_result().unwrap(), vec![root]);
    }
}
