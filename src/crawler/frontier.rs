//! Seed classification and the listing-URL frontier
//!
//! Seeds are split into detail URLs (fetched directly) and search URLs
//! (expanded through pagination). Every discovered detail URL goes through a
//! [`Frontier`], which keeps first-seen order, drops exact duplicates, and
//! knows when the record cap is reached.

use std::collections::HashSet;
use url::Url;

/// Path fragments that mark a listing detail page
const DETAIL_PATH_MARKERS: &[&str] = &["/angebote/", "/offers/"];

/// Kind of a seed URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeedKind {
    /// Points at one listing; fetched as-is
    Detail,
    /// A results page that must be expanded
    Search,
}

/// Classifies a seed by its URL path
///
/// A path containing `/angebote/` or `/offers/` (case-insensitive) is a
/// detail page. Everything else, including unparseable input, is a search
/// page.
///
/// # Examples
///
/// ```
/// use autoscout_scraper::crawler::{classify_seed, SeedKind};
///
/// assert_eq!(classify_seed("https://www.autoscout24.com/offers/bmw-x5-1"), SeedKind::Detail);
/// assert_eq!(classify_seed("https://www.autoscout24.com/lst/bmw"), SeedKind::Search);
/// ```
pub fn classify_seed(url: &str) -> SeedKind {
    let is_detail = Url::parse(url)
        .map(|parsed| {
            let path = parsed.path().to_lowercase();
            DETAIL_PATH_MARKERS.iter().any(|marker| path.contains(marker))
        })
        .unwrap_or(false);

    if is_detail {
        SeedKind::Detail
    } else {
        SeedKind::Search
    }
}

/// Ordered, deduplicated accumulator of listing URLs with a soft cap
#[derive(Debug, Clone)]
pub struct Frontier {
    urls: Vec<String>,
    seen: HashSet<String>,
    cap: usize,
}

impl Frontier {
    /// Creates an empty frontier that reports full at `cap` URLs
    pub fn new(cap: usize) -> Self {
        Self {
            urls: Vec::new(),
            seen: HashSet::new(),
            cap,
        }
    }

    /// Appends a URL unless it was seen before; returns true if added
    pub fn push(&mut self, url: String) -> bool {
        if self.seen.contains(&url) {
            return false;
        }
        self.seen.insert(url.clone());
        self.urls.push(url);
        true
    }

    /// Appends every URL in order, returning how many were new
    pub fn extend<I>(&mut self, urls: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        urls.into_iter().filter(|url| self.push(url.clone())).count()
    }

    /// True once the number of URLs reaches the cap
    pub fn is_full(&self) -> bool {
        self.urls.len() >= self.cap
    }

    /// Number of URLs collected so far (may exceed the cap)
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// True if no URL has been collected
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Returns every collected URL in first-seen order, ignoring the cap
    pub fn into_all_urls(self) -> Vec<String> {
        self.urls
    }

    /// Returns the URLs in first-seen order, truncated to the cap
    pub fn into_urls(mut self) -> Vec<String> {
        self.urls.truncate(self.cap);
        self.urls
    }
}
