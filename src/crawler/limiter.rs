//! Rate limiter for concurrent fetches
//!
//! This module handles:
//! - Global concurrency limiting via a semaphore
//! - Politeness pacing: base delay plus random jitter after each release
//! - Scoping the pacing to the whole crawl or to each host

use crate::config::{CrawlConfig, LimiterScope};
use crate::state::PacingState;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

/// Pacing key used when the scope is the whole crawl
const GLOBAL_KEY: &str = "*";

/// Bounds in-flight fetches and spaces them out
///
/// Cloning is cheap and every clone shares the same permits and pacing records.
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<LimiterInner>,
}

struct LimiterInner {
    semaphore: Arc<Semaphore>,
    concurrency: usize,
    pacing: Mutex<HashMap<String, PacingState>>,
    base_delay: Duration,
    jitter: Duration,
    scope: LimiterScope,
}

/// A held fetch slot
///
/// Dropping the permit records the release time for its scope and frees the slot,
/// whichever way the fetch ended.
pub struct RatePermit {
    key: String,
    inner: Arc<LimiterInner>,
    _permit: OwnedSemaphorePermit,
}

impl RateLimiter {
    /// Creates a new rate limiter
    ///
    /// # Arguments
    ///
    /// * `concurrency` - Maximum number of permits held at once (at least 1)
    /// * `base_delay` - Minimum gap after a release before the next acquisition
    /// * `jitter` - Upper bound of the random extra gap
    /// * `scope` - Whether pacing is shared or kept per host
    pub fn new(
        concurrency: usize,
        base_delay: Duration,
        jitter: Duration,
        scope: LimiterScope,
    ) -> Self {
        let concurrency = concurrency.max(1);
        Self {
            inner: Arc::new(LimiterInner {
                semaphore: Arc::new(Semaphore::new(concurrency)),
                concurrency,
                pacing: Mutex::new(HashMap::new()),
                base_delay,
                jitter,
                scope,
            }),
        }
    }

    /// Creates a rate limiter from a crawl configuration
    pub fn from_config(config: &CrawlConfig) -> Self {
        Self::new(
            config.concurrency,
            config.base_delay,
            config.jitter,
            config.limiter_scope,
        )
    }

    /// Waits for a fetch slot for `host`
    ///
    /// Blocks until fewer than `concurrency` permits are held and the pacing gap of
    /// the host's scope has elapsed.
    ///
    /// # Returns
    ///
    /// * `Some(RatePermit)` - The slot, released when dropped
    /// * `None` - The limiter was closed
    pub async fn acquire(&self, host: &str) -> Option<RatePermit> {
        let permit = Arc::clone(&self.inner.semaphore)
            .acquire_owned()
            .await
            .ok()?;
        let key = self.inner.key_for(host);

        loop {
            let wait = {
                let mut pacing = self.inner.pacing();
                let state = pacing.entry(key.clone()).or_default();
                match state.time_until_next_request(Instant::now()) {
                    Some(wait) => wait,
                    None => {
                        state.record_request();
                        break;
                    }
                }
            };

            tracing::trace!("Pacing {}: waiting {:?}", key, wait);
            tokio::time::sleep(wait).await;
        }

        Some(RatePermit {
            key,
            inner: Arc::clone(&self.inner),
            _permit: permit,
        })
    }

    /// Like [`acquire`](Self::acquire), but gives up when `token` is cancelled
    pub async fn acquire_cancellable(
        &self,
        host: &str,
        token: &CancellationToken,
    ) -> Option<RatePermit> {
        tokio::select! {
            _ = token.cancelled() => None,
            permit = self.acquire(host) => permit,
        }
    }

    /// Closes the limiter; pending and future acquisitions return `None`
    pub fn close(&self) {
        self.inner.semaphore.close();
    }

    /// Number of permits currently free
    pub fn available_permits(&self) -> usize {
        self.inner.semaphore.available_permits()
    }

    /// Configured maximum number of permits
    pub fn concurrency(&self) -> usize {
        self.inner.concurrency
    }

    /// Number of permits handed out so far for `host`'s scope
    pub fn request_count(&self, host: &str) -> u64 {
        let key = self.inner.key_for(host);
        self.inner
            .pacing()
            .get(&key)
            .map(|state| state.request_count)
            .unwrap_or(0)
    }

    /// Draws a pacing gap: the base delay plus a random amount up to the jitter bound
    pub fn draw_gap(&self) -> Duration {
        self.inner.draw_gap()
    }
}

impl LimiterInner {
    fn key_for(&self, host: &str) -> String {
        match self.scope {
            LimiterScope::Global => GLOBAL_KEY.to_string(),
            LimiterScope::PerHost => host.to_lowercase(),
        }
    }

    fn pacing(&self) -> MutexGuard<'_, HashMap<String, PacingState>> {
        self.pacing.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn draw_gap(&self) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        let extra = if jitter_ms == 0 {
            0
        } else {
            rand::random_range(0..=jitter_ms)
        };
        self.base_delay + Duration::from_millis(extra)
    }

    fn release(&self, key: &str) {
        let gap = self.draw_gap();
        let mut pacing = self.pacing();
        pacing
            .entry(key.to_string())
            .or_default()
            .record_release(Instant::now(), gap);
    }
}

impl RatePermit {
    /// The pacing key this permit belongs to
    pub fn scope_key(&self) -> &str {
        &self.key
    }
}

impl Drop for RatePermit {
    fn drop(&mut self) {
        // The semaphore permit is a field and is freed after this runs, so the next
        // holder always sees the new pacing record.
        self.inner.release(&self.key);
    }
}
