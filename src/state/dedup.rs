use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Thread-safe claim store for visited pages and seen assets
///
/// Every claim is a single check-and-insert under the set's mutex, so when several
/// workers race on the same URL exactly one of them gets `true`. The two sets are
/// independent: claiming a URL as a page does not claim it as an asset.
#[derive(Debug, Default)]
pub struct DedupStore {
    visited: Mutex<HashSet<String>>,
    assets: Mutex<HashSet<String>>,
}

impl DedupStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a page URL
    ///
    /// Returns true iff this call is the first to claim the URL.
    pub fn try_visit(&self, url: &str) -> bool {
        lock(&self.visited).insert(url.to_string())
    }

    /// Claims an asset URL
    ///
    /// Returns true iff this call is the first to record the asset.
    pub fn try_record_asset(&self, url: &str) -> bool {
        lock(&self.assets).insert(url.to_string())
    }

    /// Returns true if the page URL has been claimed
    pub fn is_visited(&self, url: &str) -> bool {
        lock(&self.visited).contains(url)
    }

    /// Number of claimed page URLs
    pub fn visited_count(&self) -> usize {
        lock(&self.visited).len()
    }

    /// Number of recorded asset URLs
    pub fn asset_count(&self) -> usize {
        lock(&self.assets).len()
    }
}

// A panic while holding the lock cannot leave a HashSet half-inserted.
fn lock(set: &Mutex<HashSet<String>>) -> MutexGuard<'_, HashSet<String>> {
    set.lock().unwrap_or_else(PoisonError::into_inner)
}
