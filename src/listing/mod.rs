//! Listing records and their normalization
//!
//! This module contains:
//! - The raw record shape produced by field extractors
//! - The normalized record shape handed to exporters
//! - The normalizer deriving typed fields from noisy text
//! - Per-dealer aggregation of final records

mod dealers;
pub mod normalize;
mod record;

pub use dealers::{build_dealer_summary, print_dealer_summary, DealerSummary, UNKNOWN_DEALER};
pub use normalize::{clean_text, normalize};
pub use record::{NormalizedRecord, RawRecord, RawValue};
