//! Field extraction from listing detail pages
//!
//! A [`FieldExtractor`] turns one page's markup into a [`RawRecord`]. The
//! crawl pipeline only depends on this trait, so a different site integration
//! can be dropped in without touching fetching or normalization.

mod autoscout;
mod rules;

pub use autoscout::AutoScoutExtractor;
pub use rules::{FieldRule, RuleKind};

use crate::listing::RawRecord;
use thiserror::Error;

/// Errors raised while building or running an extractor
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Invalid selector '{selector}' for field {field}: {message}")]
    InvalidSelector {
        field: String,
        selector: String,
        message: String,
    },

    #[error("Failed to extract fields from {url}: {message}")]
    Fault { url: String, message: String },
}

/// Maps a detail page to a flat record of named fields
///
/// Implementations must be pure with respect to the markup: no network or
/// file access.
pub trait FieldExtractor: Send + Sync {
    /// Extracts every known field from `html`, fetched from `url`
    ///
    /// The returned record always contains `url`.
    fn extract(&self, html: &str, url: &str) -> Result<RawRecord, ExtractionError>;
}
