//! Crawler module for listing discovery and fetching
//!
//! This module contains the core crawling logic, including:
//! - Round-robin proxy rotation
//! - Single-attempt HTTP fetching with per-URL failure reporting
//! - Search-page parsing and pagination
//! - Overall crawl coordination on a bounded worker pool

mod coordinator;
mod expander;
mod fetcher;
mod frontier;
mod parser;
mod proxy;

pub use coordinator::Coordinator;
pub use expander::SearchPageExpander;
pub use fetcher::{build_http_client, FetchError, FetchErrorKind, PageFetcher};
pub use frontier::{classify_seed, Frontier, SeedKind};
pub use parser::{parse_search_page, resolve_link, SearchPage};
pub use proxy::{ProxyRotator, PROXY_ENV_VARS};

use crate::config::{validate, Config};
use crate::listing::NormalizedRecord;
use crate::ScraperError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the configuration
/// 2. Build the proxy rotator, HTTP clients and field extractor
/// 3. Expand search seeds into listing URLs
/// 4. Fetch, extract and normalize every listing concurrently
///
/// # Arguments
///
/// * `config` - The scraper configuration
/// * `seeds` - Resolved start URLs
///
/// # Returns
///
/// * `Ok(records)` - Collected records, in completion order
/// * `Err(ScraperError)` - Invalid configuration, or the crawler could not
///   be set up
pub async fn crawl(config: &Config, seeds: &[String]) -> Result<Vec<NormalizedRecord>, ScraperError> {
    validate(config)?;
    let coordinator = Coordinator::new(config)?;
    Ok(coordinator.run(seeds).await)
}
