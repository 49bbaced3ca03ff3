//! Autoscout-Scraper: a vehicle listing harvester
//!
//! This crate expands AutoScout24 search-result pages into detail-page URLs,
//! fetches every detail page with bounded concurrency and proxy rotation,
//! extracts structured fields from the markup, normalizes them, and exports
//! the resulting records as JSON, CSV, XML, RSS or HTML.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod listing;
pub mod output;

use thiserror::Error;

/// Main error type for Autoscout-Scraper operations
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] extract::ExtractionError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Configuration-specific errors
///
/// All of these are fatal and are raised before any network activity.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("No start URLs provided (set `start-urls` or `urls-file`)")]
    NoStartUrls,
}

/// Result type alias for Autoscout-Scraper operations
pub type Result<T> = std::result::Result<T, ScraperError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, PageFetcher, ProxyRotator};
pub use listing::{normalize, DealerSummary, NormalizedRecord, RawRecord};
pub use output::OutputFormat;
