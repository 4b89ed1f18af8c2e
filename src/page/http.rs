// src/page/http.rs
// =============================================================================
// This module downloads one page, retrying when the server is just busy.
//
// Retry policy (one shared budget per page):
// - Request timed out          -> wait, try again (up to max_retries times)
// - HTTP 429 Too Many Requests -> wait, try again (same budget)
// - HTTP 200                   -> read the body as text (in its charset)
// - Body stalls mid-way        -> same as a timeout, retried
// - Any other status           -> fail right away, no retry
// - Any other network error    -> fail right away, no retry
//
// The wait between attempts is a fixed delay, not exponential. A page is
// therefore requested at most max_retries + 1 times.
//
// Final failures are only logged at debug level here; the coordinator
// reports them once with the page they belong to.
//
// Rust concepts:
// - async/await: The retry sleep yields to other tasks instead of blocking
// - match guards: `Err(e) if e.is_timeout()` picks a branch by error kind
// =============================================================================

use crate::crawl::CrawlSettings;
use crate::error::CrawlError;
use encoding_rs::Encoding;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("site-crawler/", env!("CARGO_PKG_VERSION"));

// Downloads pages with the retry policy above
//
// Cloning a Fetcher is cheap: reqwest::Client is reference counted inside,
// so every fetch task gets its own handle to the same connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    max_retries: u32,
    retry_delay: Duration,
}

// What a single attempt decided
enum Attempt {
    Done(String),
    Retry(CrawlError),
}

impl Fetcher {
    /// Builds a fetcher from the crawl settings
    pub fn new(settings: &CrawlSettings) -> Result<Self, CrawlError> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self::with_client(client, settings.max_retries, settings.retry_delay))
    }

    /// Uses an existing client (handy for tests with short timeouts)
    pub fn with_client(client: Client, max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            client,
            max_retries,
            retry_delay,
        }
    }

    /// Fetches `url` and returns its body as text
    ///
    /// Errors are final for this page: retries have already been spent.
    pub async fn fetch(&self, url: &str) -> Result<String, CrawlError> {
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;

            let last_error = match self.attempt(url, attempts).await? {
                Attempt::Done(body) => return Ok(body),
                Attempt::Retry(err) => err,
            };

            // The first try is not a retry, hence `>` rather than `>=`
            if attempts > self.max_retries {
                warn!(url, attempts, "giving up: {}", last_error);
                return Err(last_error);
            }

            warn!(url, attempt = attempts, "retrying after {:?}", self.retry_delay);
            tokio::time::sleep(self.retry_delay).await;
        }
    }

    // Runs one GET and sorts the outcome into success, retry or failure
    async fn attempt(&self, url: &str, attempts: u32) -> Result<Attempt, CrawlError> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                // Usually a proxy or CDN throttling us before the server
                // answers at all
                debug!(url, attempt = attempts, "request timed out");
                return Ok(Attempt::Retry(CrawlError::Timeout {
                    url: url.to_string(),
                    attempts,
                }));
            }
            Err(e) => {
                debug!(url, "failed to crawl: {}", e);
                return Err(CrawlError::Transport {
                    url: url.to_string(),
                    source: e,
                });
            }
        };

        match response.status() {
            StatusCode::OK => {}
            StatusCode::TOO_MANY_REQUESTS => {
                debug!(url, attempt = attempts, "rate limited by server");
                return Ok(Attempt::Retry(CrawlError::RateLimited {
                    url: url.to_string(),
                    attempts,
                }));
            }
            status => {
                debug!(url, status = status.as_u16(), "failed to crawl");
                return Err(CrawlError::HttpStatus {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }
        }

        let charset = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(charset_of)
            .map(str::to_string);

        // The client timeout also covers reading the body, so a server that
        // stalls halfway through a page is retried like a slow handshake.
        // Any other broken connection is a network error, not a parse error.
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) if e.is_timeout() => {
                debug!(url, attempt = attempts, "timed out reading body");
                return Ok(Attempt::Retry(CrawlError::Timeout {
                    url: url.to_string(),
                    attempts,
                }));
            }
            Err(e) => {
                debug!(url, "failed to read body: {}", e);
                return Err(CrawlError::Transport {
                    url: url.to_string(),
                    source: e,
                });
            }
        };

        decode_body(&bytes, charset.as_deref())
            .map(Attempt::Done)
            .map_err(|reason| {
                debug!(url, "failed to parse: {}", reason);
                CrawlError::Parse {
                    url: url.to_string(),
                    reason,
                }
            })
    }
}

// Pulls the charset parameter out of a Content-Type header
//
// "text/html; charset=ISO-8859-1" -> Some("ISO-8859-1")
fn charset_of(content_type: &str) -> Option<&str> {
    content_type
        .split(';')
        .skip(1)
        .filter_map(|param| param.split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("charset"))
        .map(|(_, value)| value.trim().trim_matches('"'))
        .filter(|value| !value.is_empty())
}

// Turns the raw body into text
//
// - No charset declared: read as UTF-8, replacing bad bytes, the way a
//   browser would (the HTML parser never rejects a page either)
// - Charset declared: decode with it; a label we don't know, or bytes that
//   are invalid in the declared encoding, are a parse failure
fn decode_body(bytes: &[u8], charset: Option<&str>) -> Result<String, String> {
    let Some(label) = charset else {
        return Ok(String::from_utf8_lossy(bytes).into_owned());
    };

    let encoding = Encoding::for_label(label.as_bytes())
        .ok_or_else(|| format!("unsupported charset '{}'", label))?;

    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        return Err(format!("body is not valid {}", encoding.name()));
    }

    Ok(text.into_owned())
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a fixed delay instead of exponential backoff?
//    - The crawler is best-effort; a short, predictable pause is enough
//    - It also makes the worst case easy to compute:
//      (max_retries + 1) requests and max_retries * retry_delay of sleeping
//
// 2. What does e.is_timeout() check?
//    - reqwest marks errors caused by the client timeout
//    - Those are the only transport errors we retry
//
// 3. Why return Result<Attempt, CrawlError> from attempt()?
//    - Err(...) means "stop now, this page failed"
//    - Ok(Attempt::Retry(..)) means "this one is worth another go"
//    - Ok(Attempt::Done(..)) means "we have the page"
//    - The `?` in fetch() passes the final errors straight up
// -----------------------------------------------------------------------------
