//! Crawl statistics
//!
//! Counters collected by the coordinator while the crawl runs, reported once
//! at the end.

use crate::crawler::DropCounts;
use std::fmt;
use std::time::Duration;

/// Summary counters for one crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Tasks handed to workers
    pub dispatched: u64,

    /// Pages fetched successfully
    pub visited: u64,

    /// Fetches that failed with a network error
    pub network_errors: u64,

    /// Fetches that failed with a non-2xx status
    pub http_errors: u64,

    /// Redirected fetches whose final URL was already owned by another task
    pub duplicate_redirects: u64,

    /// Distinct assets recorded
    pub assets: u64,

    /// Discoveries dropped before enqueueing
    pub drops: DropCounts,

    /// Highest depth that was dispatched
    pub max_depth_reached: u32,

    /// Whether the crawl was stopped before the frontier ran dry
    pub cancelled: bool,

    /// Wall-clock duration of the crawl
    pub elapsed: Duration,
}

impl CrawlStats {
    /// Total number of failed fetches
    pub fn failed(&self) -> u64 {
        self.network_errors + self.http_errors
    }

    /// Returns the success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        let finished = self.visited + self.failed();
        if finished == 0 {
            return 0.0;
        }
        (self.visited as f64 / finished as f64) * 100.0
    }

    /// Returns the crawl rate in pages per second
    pub fn pages_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.visited as f64 / secs
    }
}

impl fmt::Display for CrawlStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} visited, {} failed ({} network, {} http), {} assets, {} dropped \
             ({} depth, {} scope, {} duplicate), max depth {}, {:.2}s{}",
            self.visited,
            self.failed(),
            self.network_errors,
            self.http_errors,
            self.assets,
            self.drops.total(),
            self.drops.depth_exceeded,
            self.drops.out_of_scope,
            self.drops.already_claimed,
            self.max_depth_reached,
            self.elapsed.as_secs_f64(),
            if self.cancelled { ", cancelled" } else { "" }
        )
    }
}
