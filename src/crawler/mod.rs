//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - HTML parsing and link/asset extraction
//! - The frontier and politeness rate limiting
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod limiter;
mod parser;
mod scheduler;

pub use coordinator::{run_crawl, Coordinator, CrawlReport};
pub use fetcher::{build_http_client, fetch_with_retry, FetchError, FetchedPage, Fetcher, HttpFetcher};
pub use limiter::{RateLimiter, RatePermit};
pub use parser::{extract, Extracted};
pub use scheduler::{Admission, DropCounts, DropReason, Frontier, UrlTask};

use crate::config::CrawlConfig;
use crate::SweepError;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client
/// 2. Seed the frontier with the configured seed URL
/// 3. Fetch pages through the rate limiter
/// 4. Extract and follow in-scope links up to the depth limit
/// 5. Return the ordered pages and assets
///
/// # Arguments
///
/// * `config` - The crawl configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl finished or was stopped by its timeout
/// * `Err(SweepError)` - Crawl could not start
pub async fn crawl(config: CrawlConfig) -> Result<CrawlReport, SweepError> {
    run_crawl(config).await
}

/// Runs a crawl that stops early when `token` is cancelled
///
/// The partial result gathered so far is still returned.
pub async fn crawl_until_cancelled(
    config: CrawlConfig,
    token: CancellationToken,
) -> Result<CrawlReport, SweepError> {
    Coordinator::new(config)?
        .with_cancellation_token(token)
        .run()
        .await
}
