//! Search-page expansion
//!
//! Walks the pagination of one search seed and collects detail-page URLs.
//! Pages are visited strictly in order since each next link comes from the
//! page before it.

use crate::crawler::fetcher::PageFetcher;
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::parse_search_page;
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

/// Expands search-result pages into listing URLs
pub struct SearchPageExpander {
    fetcher: Arc<PageFetcher>,
}

impl SearchPageExpander {
    /// Creates an expander that fetches through the given fetcher
    pub fn new(fetcher: Arc<PageFetcher>) -> Self {
        Self { fetcher }
    }

    /// Collects the listing URLs reachable from `start_url` via pagination
    ///
    /// The loop stops when there is no next link, when a page was already
    /// visited (pagination cycle), when a fetch fails, or when `max_records`
    /// URLs have been gathered. The cap is checked between pages, so the
    /// result may exceed it; the caller truncates.
    ///
    /// Failures never propagate: whatever was collected so far is returned.
    pub async fn expand(&self, start_url: &str, max_records: usize) -> Vec<String> {
        let mut collected = Frontier::new(max_records);
        let mut visited: HashSet<String> = HashSet::new();
        let mut current = Some(start_url.to_string());

        while let Some(page_url) = current.take() {
            if collected.is_full() {
                tracing::debug!("Record cap {} reached, stopping expansion", max_records);
                break;
            }

            if !visited.insert(page_url.clone()) {
                tracing::debug!("Search page {} already visited, stopping", page_url);
                break;
            }

            let base_url = match Url::parse(&page_url) {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!("Invalid search page URL {}: {}", page_url, e);
                    break;
                }
            };

            let html = match self.fetcher.fetch_next(&page_url).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!("{}", e);
                    break;
                }
            };

            let page = parse_search_page(&html, &base_url);
            let added = collected.extend(page.listing_urls);
            tracing::debug!(
                "Search page {} added {} new listing URLs ({} total)",
                page_url,
                added,
                collected.len()
            );

            current = page.next_page;
        }

        tracing::info!(
            "Expanded {} into {} listing URLs across {} pages",
            start_url,
            collected.len(),
            visited.len()
        );

        // The caller owns truncation to the cap
        collected.into_all_urls()
    }
}
