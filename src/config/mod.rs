//! Configuration module for Site-Sweep
//!
//! This module handles loading and validating the optional TOML settings file and
//! turning it, together with the target domain, into an immutable [`CrawlConfig`].
//!
//! # Example
//!
//! ```
//! use site_sweep::config::{CrawlConfig, Settings};
//!
//! let config = CrawlConfig::new("example.com", &Settings::default()).unwrap();
//! println!("Crawler will use max depth: {}", config.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CrawlConfig, CrawlerSettings, HttpSettings, LimiterScope, OutputSettings, RetryPolicy,
    Settings, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{load_settings, parse_settings};
