//! Frontier of pending URL tasks
//!
//! This module handles:
//! - FIFO queue management for URLs to crawl
//! - Admission of discovered URLs (depth limit, domain scope, dedup claim)
//! - The per-URL task lifecycle ledger
//! - Counting silently dropped discoveries

use crate::config::CrawlConfig;
use crate::state::{DedupStore, TaskState};
use crate::url::DomainFilter;
use crate::SweepError;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;
use url::Url;

/// A URL queued for fetching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTask {
    /// Canonical URL to fetch
    pub url: Url,

    /// Hops from the seed (seed = 0)
    pub depth: u32,

    /// Position in discovery order (seed = 0)
    pub order: u64,
}

/// Why a discovered URL was not enqueued
///
/// None of these are errors; the URL is simply not crawled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropReason {
    /// The URL would sit deeper than the configured maximum depth
    DepthExceeded,
    /// The URL's host is not one of the allowed domains
    OutOfScope,
    /// Another task already claimed the URL
    AlreadyClaimed,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::DepthExceeded => "depth exceeded",
            Self::OutOfScope => "out of scope",
            Self::AlreadyClaimed => "already claimed",
        };
        write!(f, "{}", text)
    }
}

/// Outcome of offering a URL to the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// The URL was claimed and enqueued
    Admitted(UrlTask),
    /// The URL was dropped
    Dropped(DropReason),
}

impl Admission {
    /// Returns true if the URL was enqueued
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted(_))
    }
}

/// Counts of dropped discoveries by reason
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DropCounts {
    pub depth_exceeded: u64,
    pub out_of_scope: u64,
    pub already_claimed: u64,
}

impl DropCounts {
    fn record(&mut self, reason: DropReason) {
        match reason {
            DropReason::DepthExceeded => self.depth_exceeded += 1,
            DropReason::OutOfScope => self.out_of_scope += 1,
            DropReason::AlreadyClaimed => self.already_claimed += 1,
        }
    }

    /// Total number of dropped discoveries
    pub fn total(&self) -> u64 {
        self.depth_exceeded + self.out_of_scope + self.already_claimed
    }
}

/// Frontier owns the queue of pending tasks and the admission policy
///
/// Every URL goes through [`offer`](Frontier::offer) (or [`seed`](Frontier::seed))
/// before it can be dispatched, so:
/// - no task deeper than `max_depth` is ever dispatched
/// - every dispatched task's host is in the allowed domain set
/// - a canonical URL is dispatched at most once
pub struct Frontier {
    /// Pending tasks in discovery order
    queue: VecDeque<UrlTask>,

    /// Lifecycle of every admitted URL
    states: HashMap<String, TaskState>,

    /// Scope check
    filter: DomainFilter,

    /// Shared page/asset claims
    dedup: Arc<DedupStore>,

    max_depth: u32,
    next_order: u64,
    drops: DropCounts,
}

impl Frontier {
    /// Creates an empty frontier
    ///
    /// # Arguments
    ///
    /// * `filter` - The domain filter for the crawl
    /// * `dedup` - The claim store shared with the rest of the crawl
    /// * `max_depth` - Maximum hops from the seed
    pub fn new(filter: DomainFilter, dedup: Arc<DedupStore>, max_depth: u32) -> Self {
        Self {
            queue: VecDeque::new(),
            states: HashMap::new(),
            filter,
            dedup,
            max_depth,
            next_order: 0,
            drops: DropCounts::default(),
        }
    }

    /// Creates an empty frontier from a crawl configuration
    pub fn from_config(config: &CrawlConfig, dedup: Arc<DedupStore>) -> Self {
        Self::new(DomainFilter::from_config(config), dedup, config.max_depth)
    }

    /// Admits the seed URL at depth 0
    ///
    /// # Returns
    ///
    /// * `Ok(UrlTask)` - The seed task, now enqueued
    /// * `Err(SweepError::SeedOutOfScope)` - The seed's host is not allowed
    pub fn seed(&mut self, url: Url) -> Result<UrlTask, SweepError> {
        let text = url.to_string();
        match self.offer(url, 0) {
            Admission::Admitted(task) => Ok(task),
            Admission::Dropped(_) => Err(SweepError::SeedOutOfScope { url: text }),
        }
    }

    /// Offers a discovered URL at the given depth
    ///
    /// The checks run in order: depth, scope, then the dedup claim. Only a URL
    /// that passes all three is claimed and enqueued.
    pub fn offer(&mut self, url: Url, depth: u32) -> Admission {
        let reason = if depth > self.max_depth {
            Some(DropReason::DepthExceeded)
        } else if !self.filter.in_scope(&url) {
            Some(DropReason::OutOfScope)
        } else if !self.dedup.try_visit(url.as_str()) {
            Some(DropReason::AlreadyClaimed)
        } else {
            None
        };

        if let Some(reason) = reason {
            tracing::debug!("Dropped {} at depth {}: {}", url, depth, reason);
            self.drops.record(reason);
            return Admission::Dropped(reason);
        }

        let task = UrlTask {
            url,
            depth,
            order: self.next_order,
        };
        self.next_order += 1;

        // A fresh claim means the ledger has never seen this URL.
        self.states
            .insert(task.url.to_string(), TaskState::Enqueued);
        self.queue.push_back(task.clone());

        Admission::Admitted(task)
    }

    /// Claims a URL that was reached through a redirect
    ///
    /// The final URL of a redirected fetch is recorded as a visited page, so it
    /// takes a dedup claim of its own.
    ///
    /// # Returns
    ///
    /// * `true` - The URL was unclaimed and now belongs to the redirected task
    /// * `false` - Some other task already owns the URL
    pub fn claim_redirect_target(&mut self, url: &Url) -> bool {
        if !self.dedup.try_visit(url.as_str()) {
            self.drops.record(DropReason::AlreadyClaimed);
            return false;
        }
        true
    }

    /// Pops the next task and marks it dispatched
    pub fn next_task(&mut self) -> Result<Option<UrlTask>, SweepError> {
        let Some(task) = self.queue.pop_front() else {
            return Ok(None);
        };

        debug_assert!(task.depth <= self.max_depth);
        debug_assert!(self.filter.in_scope(&task.url));

        self.transition(&task.url, TaskState::Dispatched)?;
        Ok(Some(task))
    }

    /// Marks a dispatched task as visited
    pub fn mark_visited(&mut self, task: &UrlTask) -> Result<(), SweepError> {
        self.transition(&task.url, TaskState::Visited)
    }

    /// Marks a dispatched task as failed
    pub fn mark_failed(&mut self, task: &UrlTask) -> Result<(), SweepError> {
        self.transition(&task.url, TaskState::Failed)
    }

    fn transition(&mut self, url: &Url, to: TaskState) -> Result<(), SweepError> {
        let key = url.as_str();
        let from = self.states.get(key).copied().unwrap_or(TaskState::Discovered);

        if !from.can_transition_to(to) {
            return Err(SweepError::InvalidTransition {
                url: key.to_string(),
                from,
                to,
            });
        }

        self.states.insert(key.to_string(), to);
        Ok(())
    }

    /// Current lifecycle state of a URL, if it was ever admitted
    pub fn state_of(&self, url: &str) -> Option<TaskState> {
        self.states.get(url).copied()
    }

    /// Number of tasks in a given state
    pub fn count_in_state(&self, state: TaskState) -> usize {
        self.states.values().filter(|s| **s == state).count()
    }

    /// Returns the number of queued tasks
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Counts of dropped discoveries
    pub fn drops(&self) -> DropCounts {
        self.drops
    }

    /// The configured maximum depth
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }
}
