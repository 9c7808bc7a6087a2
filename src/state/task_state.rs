/// Task state definitions for tracking crawl progress
///
/// This module defines all states a URL task moves through during a crawl.
use std::fmt;

/// Represents the current state of a URL task in the crawl process
///
/// ```text
/// Discovered -> Enqueued -> Dispatched -> Visited
///                                     \-> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    // ===== Active States =====
    /// URL has been found on a page but not yet admitted to the frontier
    Discovered,

    /// URL is queued and waiting for a worker
    Enqueued,

    /// URL has been handed to a worker
    Dispatched,

    // ===== Terminal States =====
    /// Page was fetched successfully
    Visited,

    /// Fetch failed (network error or non-2xx status); never retried by the scheduler
    Failed,
}

impl TaskState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Visited | Self::Failed)
    }

    /// Returns true if this is an active state (task may still be processed)
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Visited)
    }

    /// Returns true if `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: TaskState) -> bool {
        matches!(
            (self, next),
            (Self::Discovered, Self::Enqueued)
                | (Self::Enqueued, Self::Dispatched)
                | (Self::Dispatched, Self::Visited)
                | (Self::Dispatched, Self::Failed)
        )
    }

    /// Short lowercase name of the state
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovered => "discovered",
            Self::Enqueued => "enqueued",
            Self::Dispatched => "dispatched",
            Self::Visited => "visited",
            Self::Failed => "failed",
        }
    }

    /// Returns all possible task states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Discovered,
            Self::Enqueued,
            Self::Dispatched,
            Self::Visited,
            Self::Failed,
        ]
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
