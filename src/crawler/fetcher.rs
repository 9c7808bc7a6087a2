//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests to fetch page content
//! - Redirect handling that never leaves the allowed domains
//! - Error classification
//! - Optional retry with exponential backoff

use crate::config::{CrawlConfig, RetryPolicy};
use crate::url::DomainFilter;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use url::Url;

/// A successfully fetched document
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// The URL that was requested
    pub requested_url: Url,

    /// Final URL after redirects
    pub final_url: Url,

    /// HTTP status code (always 2xx)
    pub status: u16,

    /// Content-Type header value
    pub content_type: Option<String>,

    /// Page body content
    pub body: String,
}

impl FetchedPage {
    /// Returns true if the body should be parsed as HTML
    ///
    /// A missing Content-Type is treated as HTML.
    pub fn is_html(&self) -> bool {
        match &self.content_type {
            None => true,
            Some(ct) => {
                let ct = ct.to_ascii_lowercase();
                ct.contains("text/html") || ct.contains("application/xhtml")
            }
        }
    }
}

/// Classified fetch failure
///
/// Both kinds are non-fatal to the crawl: the task is marked failed and the
/// crawl proceeds.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Connection, timeout, DNS, TLS or body read failure
    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    /// Non-2xx response status
    #[error("HTTP {status} for {url}")]
    Http { url: String, status: u16 },

    /// The crawl was cancelled while the fetch was pending
    #[error("Fetch of {url} cancelled")]
    Cancelled { url: String },
}

impl FetchError {
    /// Returns true if a retry could plausibly succeed
    ///
    /// Network errors, 5xx and 429 are transient; other statuses are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Http { status, .. } => *status >= 500 || *status == 429,
            Self::Cancelled { .. } => false,
        }
    }

    /// The URL the error belongs to
    pub fn url(&self) -> &str {
        match self {
            Self::Network { url, .. } | Self::Http { url, .. } | Self::Cancelled { url } => url,
        }
    }
}

/// Performs one HTTP GET
///
/// This is the boundary to the transport; the crawler only relies on this contract.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url`, following redirects
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are followed up to `max_redirects` hops, and only while they stay
/// inside the filter's allowed domains. A redirect that would leave them stops
/// the chain, so the 3xx response itself becomes the result.
///
/// # Example
///
/// ```no_run
/// use site_sweep::config::{CrawlConfig, Settings};
/// use site_sweep::crawler::build_http_client;
/// use site_sweep::url::DomainFilter;
///
/// let config = CrawlConfig::new("example.com", &Settings::default()).unwrap();
/// let client = build_http_client(&config, DomainFilter::from_config(&config)).unwrap();
/// ```
pub fn build_http_client(config: &CrawlConfig, filter: DomainFilter) -> Result<Client, reqwest::Error> {
    let max_redirects = config.max_redirects;
    let policy = Policy::custom(move |attempt| {
        if attempt.previous().len() > max_redirects {
            attempt.error("too many redirects")
        } else if filter.in_scope(attempt.url()) {
            attempt.follow()
        } else {
            attempt.stop()
        }
    });

    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.request_timeout)
        .connect_timeout(config.connect_timeout)
        .redirect(policy)
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`Fetcher`] backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a client built from the crawl configuration
    pub fn new(config: &CrawlConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(config, DomainFilter::from_config(config))?;
        Ok(Self { client })
    }

    /// Wraps an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        let final_url = response.url().clone();

        if !status.is_success() {
            return Err(FetchError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        let body = response.text().await.map_err(|e| classify_error(url, e))?;

        Ok(FetchedPage {
            requested_url: url.clone(),
            final_url,
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}

/// Maps a transport error to a [`FetchError`]
fn classify_error(url: &Url, e: reqwest::Error) -> FetchError {
    let message = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection refused".to_string()
    } else if e.is_redirect() {
        "Too many redirects".to_string()
    } else {
        e.to_string()
    };

    FetchError::Network {
        url: url.to_string(),
        message,
    }
}

/// Fetches a URL, retrying transient failures according to `policy`
///
/// Makes `1 + policy.max_retries` attempts at most, sleeping
/// `policy.delay_for(n)` before retry `n`. With [`RetryPolicy::none`] this is a
/// single fetch. Cancellation is observed while fetching and while sleeping.
pub async fn fetch_with_retry(
    fetcher: &dyn Fetcher,
    url: &Url,
    policy: &RetryPolicy,
    token: &CancellationToken,
) -> Result<FetchedPage, FetchError> {
    let cancelled = || FetchError::Cancelled {
        url: url.to_string(),
    };
    let mut attempt = 0;

    loop {
        let result = tokio::select! {
            _ = token.cancelled() => return Err(cancelled()),
            result = fetcher.fetch(url) => result,
        };

        match result {
            Err(e) if e.is_transient() && attempt < policy.max_retries => {
                attempt += 1;
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    "{} (retry {}/{} in {:?})",
                    e,
                    attempt,
                    policy.max_retries,
                    delay
                );
                tokio::select! {
                    _ = token.cancelled() => return Err(cancelled()),
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            other => return other,
        }
    }
}
