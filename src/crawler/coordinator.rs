//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Seeding the frontier
//! - Dispatching tasks to a bounded pool of fetch workers
//! - Feeding discovered links back into the frontier
//! - Recording pages and assets
//! - Cancellation and the optional crawl timeout

use crate::config::{CrawlConfig, RetryPolicy};
use crate::crawler::fetcher::{fetch_with_retry, FetchError, Fetcher, HttpFetcher};
use crate::crawler::limiter::RateLimiter;
use crate::crawler::parser::{extract, Extracted};
use crate::crawler::scheduler::{Frontier, UrlTask};
use crate::output::{CrawlResult, CrawlStats, ResultAggregator};
use crate::state::DedupStore;
use crate::url::canonicalize_url;
use crate::SweepError;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Result of a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Ordered pages and assets
    pub result: CrawlResult,

    /// Counters
    pub stats: CrawlStats,
}

/// What a worker hands back to the scheduler loop
#[derive(Debug)]
enum WorkerOutcome {
    Fetched {
        task: UrlTask,
        final_url: Url,
        extracted: Extracted,
    },
    Failed {
        task: UrlTask,
        error: FetchError,
    },
    Cancelled {
        task: UrlTask,
    },
}

/// Main crawler coordinator structure
///
/// The coordinator is the only consumer of worker outcomes: it alone offers links
/// to the frontier, claims assets and appends to the aggregator, so results are
/// recorded in a single, well-defined order.
pub struct Coordinator {
    config: CrawlConfig,
    frontier: Frontier,
    dedup: Arc<DedupStore>,
    limiter: RateLimiter,
    fetcher: Arc<dyn Fetcher>,
    aggregator: ResultAggregator,
    token: CancellationToken,
    stats: CrawlStats,
}

impl Coordinator {
    /// Creates a coordinator that fetches over HTTP
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run, with the seed enqueued
    /// * `Err(SweepError)` - The HTTP client could not be built
    pub fn new(config: CrawlConfig) -> Result<Self, SweepError> {
        let fetcher = HttpFetcher::new(&config)?;
        Self::with_fetcher(config, Arc::new(fetcher))
    }

    /// Creates a coordinator with a custom fetcher
    pub fn with_fetcher(config: CrawlConfig, fetcher: Arc<dyn Fetcher>) -> Result<Self, SweepError> {
        let dedup = Arc::new(DedupStore::new());
        let mut frontier = Frontier::from_config(&config, Arc::clone(&dedup));
        frontier.seed(config.seed.clone())?;

        let limiter = RateLimiter::from_config(&config);

        Ok(Self {
            config,
            frontier,
            dedup,
            limiter,
            fetcher,
            aggregator: ResultAggregator::new(),
            token: CancellationToken::new(),
            stats: CrawlStats::default(),
        })
    }

    /// Replaces the cancellation token, e.g. with a child of an application-wide token
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    /// A handle that stops the crawl when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Runs the crawl until the frontier is empty and every worker has finished
    ///
    /// This is the core crawling logic that:
    /// 1. Tops up the worker pool from the frontier, up to `concurrency`
    /// 2. Waits for the next worker to finish
    /// 3. Records the page and its assets, offers its links at depth + 1
    /// 4. Stops when nothing is queued or in flight
    ///
    /// When cancelled, no further tasks are dispatched, in-flight workers stop at
    /// their next suspension point, and the partial result is returned.
    pub async fn run(mut self) -> Result<CrawlReport, SweepError> {
        tracing::info!(
            "Starting crawl of {} (max depth {}, concurrency {})",
            self.config.seed,
            self.config.max_depth,
            self.config.concurrency
        );

        let start_time = Instant::now();
        let timer = self.config.crawl_timeout.map(|timeout| {
            let token = self.token.clone();
            tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                tracing::warn!("Crawl timeout of {:?} reached, stopping", timeout);
                token.cancel();
            })
        });

        let mut workers: JoinSet<WorkerOutcome> = JoinSet::new();

        loop {
            while !self.token.is_cancelled() && workers.len() < self.config.concurrency {
                let Some(task) = self.frontier.next_task()? else {
                    break;
                };
                self.dispatch(&mut workers, task);
            }

            if workers.is_empty() {
                if self.token.is_cancelled() {
                    tracing::info!("Crawl cancelled, {} URLs left in frontier", self.frontier.len());
                } else {
                    tracing::info!("Frontier is empty, crawl complete");
                }
                break;
            }

            match workers.join_next().await {
                Some(Ok(outcome)) => self.handle_outcome(outcome)?,
                Some(Err(e)) => tracing::error!("Worker task failed: {}", e),
                None => break,
            }

            let done = self.stats.visited + self.stats.failed();
            if done > 0 && done % 10 == 0 && self.stats.visited > 0 {
                let rate = self.stats.visited as f64 / start_time.elapsed().as_secs_f64();
                tracing::info!(
                    "Progress: {} pages crawled, {} in frontier, {} in flight, {:.2} pages/sec",
                    self.stats.visited,
                    self.frontier.len(),
                    workers.len(),
                    rate
                );
            }
        }

        self.stats.cancelled = self.token.is_cancelled();
        if let Some(timer) = timer {
            timer.abort();
        }

        self.stats.drops = self.frontier.drops();
        self.stats.elapsed = start_time.elapsed();

        tracing::info!("Crawl finished: {}", self.stats);

        Ok(CrawlReport {
            result: self.aggregator.finish(),
            stats: self.stats,
        })
    }

    /// Spawns a worker for one task
    fn dispatch(&mut self, workers: &mut JoinSet<WorkerOutcome>, task: UrlTask) {
        self.stats.dispatched += 1;
        self.stats.max_depth_reached = self.stats.max_depth_reached.max(task.depth);

        let fetcher = Arc::clone(&self.fetcher);
        let limiter = self.limiter.clone();
        let retry = self.config.retry;
        let token = self.token.clone();

        workers.spawn(run_worker(task, fetcher, limiter, retry, token));
    }

    /// Applies a worker's outcome to the frontier, the claims and the aggregator
    fn handle_outcome(&mut self, outcome: WorkerOutcome) -> Result<(), SweepError> {
        match outcome {
            WorkerOutcome::Fetched {
                task,
                final_url,
                extracted,
            } => {
                let final_url = canonicalize_url(final_url).unwrap_or_else(|_| task.url.clone());

                if final_url != task.url && !self.frontier.claim_redirect_target(&final_url) {
                    tracing::debug!(
                        "{} redirected to {}, which is already claimed",
                        task.url,
                        final_url
                    );
                    self.stats.duplicate_redirects += 1;
                    return self.frontier.mark_visited(&task);
                }

                for asset in &extracted.assets {
                    if self.dedup.try_record_asset(asset.as_str()) {
                        self.aggregator.record_asset(asset.as_str());
                        self.stats.assets += 1;
                    }
                }

                let next_depth = task.depth + 1;
                for link in extracted.links {
                    self.frontier.offer(link, next_depth);
                }

                self.frontier.mark_visited(&task)?;
                self.aggregator.record_page(final_url.as_str());
                self.stats.visited += 1;
            }

            WorkerOutcome::Failed { task, error } => {
                tracing::warn!("Failed {} (depth {}): {}", task.url, task.depth, error);
                match error {
                    FetchError::Network { .. } => self.stats.network_errors += 1,
                    FetchError::Http { .. } => self.stats.http_errors += 1,
                    FetchError::Cancelled { .. } => {}
                }
                self.frontier.mark_failed(&task)?;
            }

            WorkerOutcome::Cancelled { task } => {
                tracing::debug!("Cancelled {} before it completed", task.url);
                self.frontier.mark_failed(&task)?;
            }
        }

        Ok(())
    }
}

/// One fetch: acquire a permit, fetch (with retry), release, extract
async fn run_worker(
    task: UrlTask,
    fetcher: Arc<dyn Fetcher>,
    limiter: RateLimiter,
    retry: RetryPolicy,
    token: CancellationToken,
) -> WorkerOutcome {
    let host = task.url.host_str().unwrap_or_default().to_string();

    let Some(permit) = limiter.acquire_cancellable(&host, &token).await else {
        return WorkerOutcome::Cancelled { task };
    };

    tracing::info!("Visiting {}", task.url);
    let fetched = fetch_with_retry(fetcher.as_ref(), &task.url, &retry, &token).await;
    drop(permit);

    match fetched {
        Ok(page) => {
            tracing::info!("Visited {} ({})", page.final_url, page.status);
            let extracted = if page.is_html() {
                extract(&page.body, &page.final_url)
            } else {
                Extracted::default()
            };
            WorkerOutcome::Fetched {
                task,
                final_url: page.final_url,
                extracted,
            }
        }
        Err(FetchError::Cancelled { .. }) => WorkerOutcome::Cancelled { task },
        Err(error) => WorkerOutcome::Failed { task, error },
    }
}

/// Runs a complete crawl over HTTP
///
/// # Example
///
/// ```no_run
/// use site_sweep::config::{CrawlConfig, Settings};
/// use site_sweep::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = CrawlConfig::new("example.com", &Settings::default())?;
/// let report = run_crawl(config).await?;
/// println!("{} pages", report.result.pages.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: CrawlConfig) -> Result<CrawlReport, SweepError> {
    Coordinator::new(config)?.run().await
}
