//! Crawl statistics
//!
//! Counters gathered by the orchestrator during one run, and a plain-text
//! rendering of them.

use std::time::Duration;

/// Counters for one crawl run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Non-blank seed URLs processed
    pub seeds: usize,

    /// Listing URLs dispatched after deduplication and truncation
    pub listing_urls: usize,

    /// Records collected
    pub records: usize,

    /// Listing pages that could not be fetched
    pub fetch_failures: usize,

    /// Listing pages whose markup could not be turned into a record
    pub extraction_failures: usize,

    /// Tasks that panicked or were cancelled
    pub task_faults: usize,

    /// Wall-clock time of the run
    pub elapsed: Duration,
}

impl CrawlStatistics {
    /// Tasks that did not produce a record
    pub fn skipped(&self) -> usize {
        self.fetch_failures + self.extraction_failures + self.task_faults
    }

    /// Share of dispatched URLs that produced a record, in percent
    pub fn success_rate(&self) -> f64 {
        if self.listing_urls == 0 {
            0.0
        } else {
            (self.records as f64 / self.listing_urls as f64) * 100.0
        }
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Seed URLs: {}", stats.seeds);
    println!("  Listing URLs dispatched: {}", stats.listing_urls);
    println!("  Records collected: {}", stats.records);
    println!("  Elapsed: {:.2}s", stats.elapsed.as_secs_f64());
    println!();

    if stats.skipped() > 0 {
        println!("Skipped:");
        println!("  Fetch failures: {}", stats.fetch_failures);
        println!("  Extraction failures: {}", stats.extraction_failures);
        println!("  Task faults: {}", stats.task_faults);
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} listings)",
        stats.success_rate(),
        stats.records,
        stats.listing_urls
    );
}
