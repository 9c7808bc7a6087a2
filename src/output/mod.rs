//! Output module for collecting and reporting crawl results
//!
//! This module handles:
//! - Aggregating the ordered page and asset lists while the crawl runs
//! - Writing the `<domain>_log.txt` file
//! - Printing the console summary
//! - Crawl statistics

mod aggregator;
mod console;
mod log_file;
pub mod stats;

pub use aggregator::{CrawlResult, ResultAggregator};
pub use console::{format_console_summary, print_console_summary};
pub use log_file::{format_log, log_file_name, write_log, write_log_file};
pub use stats::CrawlStats;

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
