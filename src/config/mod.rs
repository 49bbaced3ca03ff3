//! Configuration module for Autoscout-Scraper
//!
//! This module handles loading, merging, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use autoscout_scraper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Will collect at most {} listings", config.scraper.max_records);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, OutputConfig, ProxySetting, ScraperConfig, DEFAULT_MAX_RECORDS,
    DEFAULT_PARALLEL_REQUESTS, DEFAULT_TIMEOUT_SECONDS, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_overlay,
    merge_values, parse_config, parse_config_with_overlay, resolve_start_urls,
};
pub use validation::{request_timeout, validate, validate_start_url};
