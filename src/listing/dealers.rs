use crate::listing::record::NormalizedRecord;
use serde::Serialize;
use std::collections::BTreeMap;

/// Key used for listings without a dealer name
pub const UNKNOWN_DEALER: &str = "Unknown dealer";

/// Aggregate of the listings published by one dealer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DealerSummary {
    pub dealer_name: String,
    pub location: Option<String>,
    pub dealer_ratings: Option<String>,
    pub listing_count: usize,
}

/// Groups records by dealer name
///
/// Blank names are grouped under [`UNKNOWN_DEALER`]. `location` and
/// `dealer_ratings` always take the values of the last record seen for each
/// dealer, even when those are empty.
pub fn build_dealer_summary(records: &[NormalizedRecord]) -> BTreeMap<String, DealerSummary> {
    let mut summary: BTreeMap<String, DealerSummary> = BTreeMap::new();

    for record in records {
        let name = record
            .dealer_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(UNKNOWN_DEALER)
            .to_string();

        let entry = summary
            .entry(name.clone())
            .or_insert_with(|| DealerSummary {
                dealer_name: name,
                location: None,
                dealer_ratings: None,
                listing_count: 0,
            });

        entry.location = record.location.clone();
        entry.dealer_ratings = record.dealer_ratings.clone();
        entry.listing_count += 1;
    }

    summary
}

/// Prints a dealer summary table to stdout
pub fn print_dealer_summary(summary: &BTreeMap<String, DealerSummary>) {
    println!("=== Dealer Summary ({} dealers) ===\n", summary.len());

    let mut dealers: Vec<&DealerSummary> = summary.values().collect();
    dealers.sort_by(|a, b| b.listing_count.cmp(&a.listing_count));

    for dealer in dealers {
        println!(
            "  {} - {} listings ({}, ratings: {})",
            dealer.dealer_name,
            dealer.listing_count,
            dealer.location.as_deref().unwrap_or("unknown location"),
            dealer.dealer_ratings.as_deref().unwrap_or("n/a")
        );
    }
}
