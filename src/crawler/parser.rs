//! Search-results page parser
//!
//! This module handles parsing a search-results page to extract:
//! - Links to listing detail pages (absolute URLs, first-seen order, deduplicated)
//! - The link to the next results page, if any

use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Anchors that point at a listing detail page
const LISTING_LINK_SELECTOR: &str =
    r#"a[href*="/angebote/"], a[href*="/offers/"], a[data-item-name="detail-page-link"]"#;

/// "Next page" candidates in priority order; the first match wins
const NEXT_PAGE_SELECTORS: &[&str] = &[
    r#"a[rel="next"]"#,
    r#"a[aria-label*="Next"]"#,
    r#"a[aria-label*="Weiter"]"#,
];

/// Extracted information from one search-results page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    /// Detail-page URLs found on the page, resolved against the page URL
    pub listing_urls: Vec<String>,

    /// Resolved link to the next results page
    pub next_page: Option<String>,
}

/// Parses a search-results page
///
/// # Arguments
///
/// * `html` - The page markup
/// * `base_url` - The URL the page was fetched from, used to resolve relative links
///
/// # Example
///
/// ```
/// use autoscout_scraper::crawler::parse_search_page;
/// use url::Url;
///
/// let html = r#"<a href="/offers/bmw-x5-1">X5</a><a rel="next" href="?page=2">Next</a>"#;
/// let base = Url::parse("https://www.autoscout24.com/lst/bmw").unwrap();
/// let page = parse_search_page(html, &base);
/// assert_eq!(page.listing_urls, vec!["https://www.autoscout24.com/offers/bmw-x5-1"]);
/// assert_eq!(page.next_page.as_deref(), Some("https://www.autoscout24.com/lst/bmw?page=2"));
/// ```
pub fn parse_search_page(html: &str, base_url: &Url) -> SearchPage {
    let document = Html::parse_document(html);

    let listing_urls = extract_listing_links(&document, base_url);
    let next_page = extract_next_page(&document, base_url);

    tracing::debug!(
        "Parsed search page {}: {} listing URLs, next page: {}",
        base_url,
        listing_urls.len(),
        if next_page.is_some() { "yes" } else { "no" }
    );

    SearchPage {
        listing_urls,
        next_page,
    }
}

/// Extracts detail-page links in document order, skipping exact duplicates
fn extract_listing_links(document: &Html, base_url: &Url) -> Vec<String> {
    let mut links: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    if let Ok(selector) = Selector::parse(LISTING_LINK_SELECTOR) {
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    if seen.insert(absolute_url.clone()) {
                        links.push(absolute_url);
                    }
                }
            }
        }
    }

    links
}

/// Tries each next-page candidate in order and resolves the first match
fn extract_next_page(document: &Html, base_url: &Url) -> Option<String> {
    NEXT_PAGE_SELECTORS
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .find_map(|selector| document.select(&selector).next())
        .and_then(|element| element.value().attr("href"))
        .and_then(|href| resolve_link(href, base_url))
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only links
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://www.autoscout24.com/lst/bmw?page=1").unwrap()
    }

    #[test]
    fn test_extract_relative_detail_links() {
        let html = r#"<html><body>
            <a href="/offers/bmw-x5-1">X5</a>
            <a href="/angebote/bmw-x3-2">X3</a>
            <a href="/about">About</a>
        </body></html>"#;
        let page = parse_search_page(html, &base_url());
        assert_eq!(
            page.listing_urls,
            vec![
                "https://www.autoscout24.com/offers/bmw-x5-1".to_string(),
                "https://www.autoscout24.com/angebote/bmw-x3-2".to_string(),
            ]
        );
    }

    #[test]
    fn test_data_item_name_anchor_is_a_listing() {
        let html = r#"<a data-item-name="detail-page-link" href="/cars/123">Car</a>"#;
        let page = parse_search_page(html, &base_url());
        assert_eq!(
            page.listing_urls,
            vec!["https://www.autoscout24.com/cars/123".to_string()]
        );
    }

    #[test]
    fn test_duplicate_links_are_skipped() {
        let html = r#"
            <a href="/offers/a-1"><img src="a.jpg"></a>
            <a href="/offers/a-1">Title</a>
            <a href="https://www.autoscout24.com/offers/a-1">Absolute</a>
            <a href="/offers/b-2">B</a>
        "#;
        let page = parse_search_page(html, &base_url());
        assert_eq!(page.listing_urls.len(), 2);
        assert_eq!(page.listing_urls[1], "https://www.autoscout24.com/offers/b-2");
    }

    #[test]
    fn test_no_next_page() {
        let html = r#"<a href="/offers/a-1">A</a>"#;
        let page = parse_search_page(html, &base_url());
        assert_eq!(page.next_page, None);
    }

    #[test]
    fn test_next_page_rel_next_wins() {
        let html = r#"
            <a aria-label="Next page" href="/lst/bmw?page=9">Next</a>
            <a rel="next" href="/lst/bmw?page=2">2</a>
        "#;
        let page = parse_search_page(html, &base_url());
        assert_eq!(
            page.next_page.as_deref(),
            Some("https://www.autoscout24.com/lst/bmw?page=2")
        );
    }

    #[test]
    fn test_next_page_german_label() {
        let html = r#"<a aria-label="Weiter zur Seite 2" href="?page=2">Weiter</a>"#;
        let page = parse_search_page(html, &base_url());
        assert_eq!(
            page.next_page.as_deref(),
            Some("https://www.autoscout24.com/lst/bmw?page=2")
        );
    }

    #[test]
    fn test_resolve_link_exclusions() {
        let base = base_url();
        assert_eq!(resolve_link("javascript:void(0)", &base), None);
        assert_eq!(resolve_link("mailto:dealer@example.com", &base), None);
        assert_eq!(resolve_link("tel:+49123", &base), None);
        assert_eq!(resolve_link("#top", &base), None);
        assert_eq!(resolve_link("   ", &base), None);
        assert_eq!(
            resolve_link("../offers/x-1", &base).as_deref(),
            Some("https://www.autoscout24.com/offers/x-1")
        );
    }
}
