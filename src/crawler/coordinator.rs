//! Crawler coordinator - listing fetch orchestration
//!
//! Turns a mixed list of seed URLs into normalized records:
//! - Detail seeds are queued directly, search seeds are expanded first
//! - The combined URL list is deduplicated and truncated to the record cap
//! - Each URL is fetched, extracted and normalized on a bounded worker pool
//! - Failed or faulted tasks are logged and skipped, never propagated

use crate::config::{request_timeout, Config};
use crate::crawler::expander::SearchPageExpander;
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::frontier::{classify_seed, Frontier, SeedKind};
use crate::crawler::proxy::ProxyRotator;
use crate::extract::{AutoScoutExtractor, FieldExtractor};
use crate::listing::{normalize, NormalizedRecord};
use crate::output::CrawlStatistics;
use crate::ScraperError;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// What one fetch-extract-normalize task produced
#[derive(Debug)]
enum TaskOutcome {
    Record(Box<NormalizedRecord>),
    FetchFailed,
    ExtractionFailed,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    fetcher: Arc<PageFetcher>,
    expander: SearchPageExpander,
    extractor: Arc<dyn FieldExtractor>,
    max_records: usize,
    concurrency: usize,
}

impl Coordinator {
    /// Creates a coordinator from the scraper configuration
    ///
    /// Proxies come from the configuration first, then from the
    /// `HTTP_PROXIES` / `HTTPS_PROXIES` environment variables.
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - HTTP clients and extractor ready
    /// * `Err(ScraperError)` - Invalid timeout, or a client or selector
    ///   could not be built
    pub fn new(config: &Config) -> Result<Self, ScraperError> {
        let scraper = &config.scraper;

        let timeout = request_timeout(scraper.timeout_seconds)?;
        let rotator = Arc::new(ProxyRotator::from_env(&scraper.proxies.endpoints()));
        let fetcher = Arc::new(PageFetcher::new(&scraper.user_agent, timeout, rotator)?);
        let extractor: Arc<dyn FieldExtractor> = Arc::new(AutoScoutExtractor::new()?);

        Ok(Self::from_parts(
            fetcher,
            extractor,
            scraper.max_records,
            scraper.parallel_requests,
        ))
    }

    /// Assembles a coordinator from prebuilt parts
    ///
    /// A concurrency of zero is raised to one.
    pub fn from_parts(
        fetcher: Arc<PageFetcher>,
        extractor: Arc<dyn FieldExtractor>,
        max_records: usize,
        concurrency: usize,
    ) -> Self {
        Self {
            expander: SearchPageExpander::new(Arc::clone(&fetcher)),
            fetcher,
            extractor,
            max_records,
            concurrency: concurrency.max(1),
        }
    }

    /// Replaces the field extractor
    pub fn with_extractor(mut self, extractor: Arc<dyn FieldExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn max_records(&self) -> usize {
        self.max_records
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Resolves seeds into the deduplicated, capped list of listing URLs
    ///
    /// Seeds are processed in order. Detail seeds are kept verbatim, search
    /// seeds are expanded. Once the cap is reached, remaining seeds are not
    /// expanded at all.
    pub async fn prepare_listing_urls(&self, seeds: &[String]) -> Vec<String> {
        let mut frontier = Frontier::new(self.max_records);

        for seed in seeds.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            if frontier.is_full() {
                tracing::debug!("Record cap {} reached, skipping remaining seeds", self.max_records);
                break;
            }

            match classify_seed(seed) {
                SeedKind::Detail => {
                    frontier.push(seed.to_string());
                }
                SeedKind::Search => {
                    let found = self.expander.expand(seed, self.max_records).await;
                    frontier.extend(found);
                }
            }
        }

        let urls = frontier.into_urls();
        tracing::info!("Prepared {} listing URLs", urls.len());
        urls
    }

    /// Runs the crawl and returns the collected records
    ///
    /// Records come back in completion order.
    pub async fn run(&self, seeds: &[String]) -> Vec<NormalizedRecord> {
        let (records, stats) = self.run_with_stats(seeds).await;
        tracing::info!(
            "Crawl completed: {} records from {} listing URLs in {:?} ({} skipped)",
            stats.records,
            stats.listing_urls,
            stats.elapsed,
            stats.skipped()
        );
        records
    }

    /// Runs the crawl and returns the records together with run counters
    pub async fn run_with_stats(
        &self,
        seeds: &[String],
    ) -> (Vec<NormalizedRecord>, CrawlStatistics) {
        let start_time = Instant::now();
        let mut stats = CrawlStatistics {
            seeds: seeds.iter().filter(|s| !s.trim().is_empty()).count(),
            ..Default::default()
        };

        let urls = self.prepare_listing_urls(seeds).await;
        stats.listing_urls = urls.len();

        if urls.is_empty() {
            tracing::warn!("No listing URLs to fetch");
            stats.elapsed = start_time.elapsed();
            return (Vec::new(), stats);
        }

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for url in urls {
            let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                tracing::error!("Worker pool closed, {} not dispatched", url);
                stats.task_faults += 1;
                continue;
            };

            let fetcher = Arc::clone(&self.fetcher);
            let extractor = Arc::clone(&self.extractor);
            tasks.spawn(async move {
                let outcome = process_listing(&fetcher, extractor.as_ref(), &url).await;
                drop(permit);
                outcome
            });
        }

        let mut records = Vec::with_capacity(stats.listing_urls);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(TaskOutcome::Record(record)) => records.push(*record),
                Ok(TaskOutcome::FetchFailed) => stats.fetch_failures += 1,
                Ok(TaskOutcome::ExtractionFailed) => stats.extraction_failures += 1,
                Err(e) => {
                    tracing::error!("Listing task faulted: {}", e);
                    stats.task_faults += 1;
                }
            }
        }

        stats.records = records.len();
        stats.elapsed = start_time.elapsed();
        (records, stats)
    }
}

/// Fetches, extracts and normalizes one listing page
async fn process_listing(
    fetcher: &PageFetcher,
    extractor: &dyn FieldExtractor,
    url: &str,
) -> TaskOutcome {
    let html = match fetcher.fetch_next(url).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!("{}", e);
            return TaskOutcome::FetchFailed;
        }
    };

    match extractor.extract(&html, url) {
        Ok(raw) => {
            tracing::debug!("Extracted listing {}", url);
            TaskOutcome::Record(Box::new(normalize(&raw)))
        }
        Err(e) => {
            tracing::warn!("{}", e);
            TaskOutcome::ExtractionFailed
        }
    }
}
