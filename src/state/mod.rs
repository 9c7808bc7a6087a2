//! State module for tracking crawl progress
//!
//! This module provides the shared state of a crawl.
//!
//! # Components
//!
//! - `TaskState`: Lifecycle of a URL task (discovered, enqueued, dispatched, visited, failed)
//! - `DedupStore`: Atomic claims for visited pages and recorded assets
//! - `PacingState`: Politeness pacing for one rate-limiter scope

mod dedup;
mod pacing_state;
mod task_state;

// Re-export main types
pub use dedup::DedupStore;
pub use pacing_state::PacingState;
pub use task_state::TaskState;
