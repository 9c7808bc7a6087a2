use std::sync::{Mutex, MutexGuard, PoisonError};

/// Final ordered lists of a crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlResult {
    /// Page URLs in completion order of successful fetches
    pub pages: Vec<String>,

    /// Asset URLs in first-discovery order
    pub assets: Vec<String>,
}

impl CrawlResult {
    /// Creates a result from page and asset lists
    pub fn new(pages: Vec<String>, assets: Vec<String>) -> Self {
        Self { pages, assets }
    }
}

/// Append-only, thread-safe collector of crawl results
///
/// The snapshot is taken with [`finish`](ResultAggregator::finish), which consumes
/// the aggregator, so nothing can be appended after the crawl has terminated.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    pages: Mutex<Vec<String>>,
    assets: Mutex<Vec<String>>,
}

impl ResultAggregator {
    /// Creates an empty aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a page that was fetched successfully
    pub fn record_page(&self, url: &str) {
        lock(&self.pages).push(url.to_string());
    }

    /// Appends an asset on its first successful claim
    pub fn record_asset(&self, url: &str) {
        lock(&self.assets).push(url.to_string());
    }

    /// Number of pages recorded so far
    pub fn page_count(&self) -> usize {
        lock(&self.pages).len()
    }

    /// Number of assets recorded so far
    pub fn asset_count(&self) -> usize {
        lock(&self.assets).len()
    }

    /// Consumes the aggregator and returns the final snapshot
    pub fn finish(self) -> CrawlResult {
        CrawlResult {
            pages: self
                .pages
                .into_inner()
                .unwrap_or_else(PoisonError::into_inner),
            assets: self
                .assets
                .into_inner()
                .unwrap_or_else(PoisonError::into_inner),
        }
    }
}

fn lock(list: &Mutex<Vec<String>>) -> MutexGuard<'_, Vec<String>> {
    list.lock().unwrap_or_else(PoisonError::into_inner)
}
