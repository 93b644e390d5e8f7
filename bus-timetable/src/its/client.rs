//! HTTP client for the transit information centre's timetable pages.
//!
//! Concurrency is bounded by a semaphore and every request holds its permit
//! for a short politeness delay afterwards, so the origin server sees at
//! most `max_concurrent` requests per delay window.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::trace;

use crate::domain::RouteIdentifier;

use super::PageSource;
use super::error::FetchError;

/// Default URL of the timetable listing page.
pub const DEFAULT_LISTING_URL: &str = "http://its.wonju.go.kr/bus/bus04.do";

/// Default URL of the per-route timetable page.
pub const DEFAULT_DETAIL_URL: &str = "http://its.wonju.go.kr/bus/bus04Detail.do";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 4;

/// Default pause after each request.
const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(500);

/// Query parameter carrying the route identifier on detail requests.
const DETAIL_QUERY_PARAM: &str = "no";

/// Configuration for the timetable client.
#[derive(Debug, Clone)]
pub struct ItsConfig {
    /// Listing page URL
    pub listing_url: String,
    /// Detail page URL
    pub detail_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Pause after each request
    pub request_delay: Duration,
}

impl ItsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listing_url(mut self, url: impl Into<String>) -> Self {
        self.listing_url = url.into();
        self
    }

    pub fn with_detail_url(mut self, url: impl Into<String>) -> Self {
        self.detail_url = url.into();
        self
    }

    /// Set maximum concurrent requests (at least one).
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n.max(1);
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }
}

impl Default for ItsConfig {
    fn default() -> Self {
        Self {
            listing_url: DEFAULT_LISTING_URL.to_string(),
            detail_url: DEFAULT_DETAIL_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
            request_delay: DEFAULT_REQUEST_DELAY,
        }
    }
}

/// Timetable page client.
#[derive(Debug, Clone)]
pub struct ItsClient {
    http: reqwest::Client,
    listing_url: String,
    detail_url: String,
    semaphore: Arc<Semaphore>,
    request_delay: Duration,
}

impl ItsClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ItsConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            listing_url: config.listing_url,
            detail_url: config.detail_url,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
            request_delay: config.request_delay,
        })
    }

    /// Send a request under a permit. The permit is held for the
    /// politeness delay afterwards, whether the request succeeded or not.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, FetchError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| FetchError::Closed)?;

        let result = Self::fetch(request).await;
        tokio::time::sleep(self.request_delay).await;
        result
    }

    async fn fetch(request: reqwest::RequestBuilder) -> Result<String, FetchError> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().to_string();

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url,
            });
        }

        // The site serves UTF-8 whatever its headers claim
        let bytes = response.bytes().await?;
        let body = String::from_utf8_lossy(&bytes).into_owned();
        trace!(url = %url, bytes = bytes.len(), "fetched page");

        Ok(body)
    }
}

impl PageSource for ItsClient {
    async fn listing(&self) -> Result<String, FetchError> {
        self.send(self.http.get(&self.listing_url)).await
    }

    async fn detail(&self, identifier: &RouteIdentifier) -> Result<String, FetchError> {
        let request = self
            .http
            .post(&self.detail_url)
            .query(&[(DETAIL_QUERY_PARAM, identifier.as_str())]);
        self.send(request).await
    }
}
