//! HTTP fetching with TTL caching, retry logic, and per-host rate limiting.
//!
//! Resort pages and weather endpoints are unstable third-party services,
//! so every fetch goes through three layers:
//!
//! - [`FetchAsync`]: core trait defining an async URL fetch
//! - [`RetryFetch`]: decorator that adds retry logic to any `FetchAsync`
//!   implementation
//! - [`TtlCache`]: on-disk response cache keyed by URL, expiring by file
//!   age
//!
//! [`Fetcher`] composes these into the two clients the pipeline uses: one
//! for resort conditions pages (HTML, short TTL) and one for the weather
//! API (JSON, longer TTL). The caches are independent, so a cold weather
//! cache never forces a resort page refetch and vice versa.
//!
//! # Retry Strategy
//!
//! - Retries only transport errors and 5xx responses; a 4xx is final
//! - Exponential backoff starting at 1 second, capped at 30 seconds
//! - Random jitter (0-250ms) added to prevent thundering herd

use rand::{rng, Rng};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};
use url::Url;

use crate::settings;

/// Accept header sent when fetching resort conditions pages.
const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Accept header sent to the NWS API.
const JSON_ACCEPT: &str = "application/geo+json,application/json";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },

    #[error("invalid JSON from {url}: {source}")]
    Json {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// Whether a retry could plausibly succeed. Transport errors and
    /// server errors are transient; client errors and bad payloads are
    /// final.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Request { .. } => true,
            FetchError::Status { status, .. } => status.is_server_error(),
            FetchError::Json { .. } => false,
        }
    }
}

/// Trait for async URL fetching.
///
/// Implementors fetch a URL and return the response body. This
/// abstraction allows decorators (like retry logic) to wrap any
/// underlying client.
pub trait FetchAsync {
    /// Fetch a URL and return the response body as text.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Plain `reqwest`-backed fetcher with per-host request spacing.
///
/// The rate-limit map is shared between instances (conditions pages and
/// the weather API use separate clients but must not independently hammer
/// a host they happen to share).
pub struct HttpFetch {
    client: reqwest::Client,
    accept: &'static str,
    min_delay: Duration,
    last_request: Arc<Mutex<HashMap<String, Instant>>>,
}

impl HttpFetch {
    pub fn new(
        user_agent: &str,
        accept: &'static str,
        last_request: Arc<Mutex<HashMap<String, Instant>>>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(settings::REQUEST_TIMEOUT)
            .build()
            .expect("reqwest client with static configuration");
        Self {
            client,
            accept,
            min_delay: settings::RATE_LIMIT_DELAY,
            last_request,
        }
    }

    #[cfg(test)]
    fn without_rate_limit(user_agent: &str, accept: &'static str) -> Self {
        let mut fetcher = Self::new(user_agent, accept, Arc::new(Mutex::new(HashMap::new())));
        fetcher.min_delay = Duration::ZERO;
        fetcher
    }

    /// Sleep long enough to keep [`settings::RATE_LIMIT_DELAY`] between
    /// requests to the same host.
    async fn rate_limit(&self, url: &str) {
        let Some(host) = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
        else {
            return;
        };

        let mut last = self.last_request.lock().await;
        if let Some(prev) = last.get(&host) {
            let elapsed = prev.elapsed();
            if elapsed < self.min_delay {
                let wait = self.min_delay - elapsed;
                debug!(%host, ?wait, "Rate limiting");
                sleep(wait).await;
            }
        }
        last.insert(host, Instant::now());
    }
}

impl FetchAsync for HttpFetch {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.rate_limit(url).await;

        let response = self
            .client
            .get(url)
            .header(ACCEPT, self.accept)
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.5")
            .send()
            .await
            .map_err(|e| FetchError::Request {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        response.text().await.map_err(|e| FetchError::Request {
            url: url.to_string(),
            source: e,
        })
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`FetchAsync`]
/// implementation.
///
/// # Backoff Strategy
///
/// The delay between retries follows this formula:
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryFetch<T> {
    inner: T,
    max_retries: usize,
    base_delay: Duration,
    max_delay: Duration,
}

impl<T> RetryFetch<T>
where
    T: FetchAsync,
{
    pub fn new(inner: T, max_retries: usize, base_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: settings::RETRY_MAX_DELAY,
        }
    }
}

impl<T> FetchAsync for RetryFetch<T>
where
    T: FetchAsync,
{
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.fetch(url).await {
                Ok(body) => {
                    return Ok(body);
                }
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if !e.is_transient() || attempt > self.max_retries {
                        if e.is_transient() {
                            error!(
                                attempt,
                                max = self.max_retries,
                                elapsed_ms_attempt = attempt_dt.as_millis() as u128,
                                elapsed_ms_total = total_dt.as_millis() as u128,
                                error = %e,
                                "fetch exhausted retries"
                            );
                        }
                        return Err(e);
                    }

                    // backoff calc
                    let mut delay = self.base_delay.saturating_mul(1 << (attempt - 1));
                    if delay > self.max_delay {
                        delay = self.max_delay;
                    }
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + Duration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis() as u128,
                        elapsed_ms_total = total_dt.as_millis() as u128,
                        ?delay,
                        error = %e,
                        "fetch attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// On-disk response cache keyed by URL, expiring by file modification age.
///
/// Reads and writes are best effort: a cache failure degrades to a
/// network fetch, never to an error.
pub struct TtlCache {
    dir: PathBuf,
    ttl: Duration,
}

impl TtlCache {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            ttl,
        }
    }

    fn path_for(&self, url: &str) -> PathBuf {
        let digest = Sha256::digest(url.as_bytes());
        let key = &hex::encode(digest)[..16];
        self.dir.join(format!("{key}.cache"))
    }

    /// Return the cached body for `url` if present and not expired.
    pub fn get(&self, url: &str) -> Option<String> {
        let path = self.path_for(url);
        let meta = std::fs::metadata(&path).ok()?;
        let age = meta.modified().ok()?.elapsed().ok()?;
        if age > self.ttl {
            return None;
        }
        std::fs::read_to_string(&path).ok()
    }

    /// Store a response body for `url`.
    pub fn put(&self, url: &str, body: &str) {
        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            debug!(error = %e, "Cache dir create failed");
            return;
        }
        if let Err(e) = std::fs::write(self.path_for(url), body) {
            debug!(error = %e, "Cache write failed");
        }
    }

    /// Drop the cached entry for `url`, if any.
    pub fn invalidate(&self, url: &str) {
        let _ = std::fs::remove_file(self.path_for(url));
    }
}

/// The pipeline's fetch facade: a cached HTML client for resort pages and
/// a cached JSON client for the weather API.
pub struct Fetcher {
    pages: RetryFetch<HttpFetch>,
    pages_cache: TtlCache,
    api: RetryFetch<HttpFetch>,
    api_cache: TtlCache,
}

impl Fetcher {
    pub fn new(cache_dir: impl AsRef<Path>, user_agent: &str) -> Self {
        Self::with_ttls(
            cache_dir,
            user_agent,
            settings::CONDITIONS_CACHE_TTL,
            settings::NWS_CACHE_TTL,
        )
    }

    pub fn with_ttls(
        cache_dir: impl AsRef<Path>,
        user_agent: &str,
        page_ttl: Duration,
        api_ttl: Duration,
    ) -> Self {
        let cache_dir = cache_dir.as_ref();
        let last_request = Arc::new(Mutex::new(HashMap::new()));
        Self {
            pages: RetryFetch::new(
                HttpFetch::new(user_agent, HTML_ACCEPT, Arc::clone(&last_request)),
                settings::MAX_RETRIES,
                settings::RETRY_BASE_DELAY,
            ),
            pages_cache: TtlCache::new(cache_dir, page_ttl),
            api: RetryFetch::new(
                HttpFetch::new(user_agent, JSON_ACCEPT, last_request),
                settings::MAX_RETRIES,
                settings::RETRY_BASE_DELAY,
            ),
            api_cache: TtlCache::new(cache_dir.join("nws"), api_ttl),
        }
    }

    /// Fetch a resort conditions page, serving from cache within the TTL.
    pub async fn page_text(&self, url: &str) -> Result<String, FetchError> {
        if let Some(hit) = self.pages_cache.get(url) {
            debug!(%url, "Cache hit");
            return Ok(hit);
        }
        let body = self.pages.fetch(url).await?;
        self.pages_cache.put(url, &body);
        Ok(body)
    }

    /// Fetch and parse a weather API endpoint, serving from cache within
    /// the TTL. A cached entry that no longer parses is discarded and
    /// refetched.
    pub async fn api_json(&self, url: &str) -> Result<serde_json::Value, FetchError> {
        if let Some(hit) = self.api_cache.get(url) {
            match serde_json::from_str(&hit) {
                Ok(value) => {
                    debug!(%url, "Cache hit (JSON)");
                    return Ok(value);
                }
                Err(e) => {
                    warn!(%url, error = %e, "Corrupt cached JSON; refetching");
                    self.api_cache.invalidate(url);
                }
            }
        }

        let body = self.api.fetch(url).await?;
        let value = serde_json::from_str(&body).map_err(|e| FetchError::Json {
            url: url.to_string(),
            source: e,
        })?;
        self.api_cache.put(url, &body);
        Ok(value)
    }
}
