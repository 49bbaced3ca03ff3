//! Integration tests for the scraper
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full expand, fetch, extract and export cycle end-to-end.

use autoscout_scraper::config::{Config, OutputConfig, ScraperConfig};
use autoscout_scraper::crawler::{crawl, Coordinator, PageFetcher, ProxyRotator};
use autoscout_scraper::extract::{AutoScoutExtractor, ExtractionError, FieldExtractor};
use autoscout_scraper::listing::{build_dealer_summary, RawRecord};
use autoscout_scraper::output::{export_records, OutputFormat};
use autoscout_scraper::{ConfigError, ScraperError};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Creates a test configuration with the given limits
fn create_test_config(max_records: usize, parallel_requests: usize) -> Config {
    Config {
        scraper: ScraperConfig {
            max_records,
            parallel_requests,
            timeout_seconds: 5.0,
            user_agent: "TestAgent/1.0".to_string(),
            ..Default::default()
        },
        output: OutputConfig::default(),
    }
}

fn detail_page(id: u32) -> String {
    format!(
        r#"<html><body>
          <h1 data-testid="heading">Car {id}</h1>
          <div data-testid="price-label">€ {id},500</div>
          <div data-testid="seller-name">Dealer {dealer}</div>
          <div data-testid="seller-address">City {id}</div>
          <div data-testid="mileage-label">{id}0,000 km</div>
          <ul data-testid="safety-features"><li>ABS</li><li>ESP</li></ul>
          <div data-testid="gallery"><img src="/img/{id}.jpg"></div>
        </body></html>"#,
        id = id,
        dealer = id % 2
    )
}

fn search_page(ids: &[u32], next: Option<&str>) -> String {
    let mut html = String::from("<html><body>");
    for id in ids {
        html.push_str(&format!(r#"<a href="/offers/car-{}">Car {}</a>"#, id, id));
    }
    if let Some(next) = next {
        html.push_str(&format!(r#"<a aria-label="Next page" href="{}">›</a>"#, next));
    }
    html.push_str("</body></html>");
    html
}

async fn mount_detail(server: &MockServer, id: u32) {
    Mock::given(method("GET"))
        .and(path(format!("/offers/car-{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page(id)))
        .mount(server)
        .await;
}

async fn mount_search(server: &MockServer, page: &str, body: String) {
    Mock::given(method("GET"))
        .and(path("/lst"))
        .and(query_param("page", page))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn detail_seeds(server: &MockServer, ids: &[u32]) -> Vec<String> {
    ids.iter()
        .map(|id| format!("{}/offers/car-{}", server.uri(), id))
        .collect()
}

fn sorted_titles(records: &[autoscout_scraper::NormalizedRecord]) -> Vec<String> {
    let mut titles: Vec<String> = records.iter().filter_map(|r| r.title.clone()).collect();
    titles.sort();
    titles
}

#[tokio::test]
async fn test_full_scrape_from_search_seed() {
    let server = MockServer::start().await;
    mount_search(&server, "1", search_page(&[1, 2, 3], Some("/lst?page=2"))).await;
    mount_search(&server, "2", search_page(&[3, 4], None)).await;
    for id in 1..=4 {
        mount_detail(&server, id).await;
    }

    let coordinator = Coordinator::new(&create_test_config(100, 4)).unwrap();
    let seeds = vec![format!("{}/lst?page=1", server.uri())];
    let (records, stats) = coordinator.run_with_stats(&seeds).await;

    assert_eq!(stats.seeds, 1);
    assert_eq!(stats.listing_urls, 4);
    assert_eq!(stats.records, 4);
    assert_eq!(stats.skipped(), 0);
    assert_eq!(sorted_titles(&records), vec!["Car 1", "Car 2", "Car 3", "Car 4"]);

    let car = records
        .iter()
        .find(|r| r.title.as_deref() == Some("Car 2"))
        .unwrap();
    assert_eq!(car.raw_price, Some(2500));
    assert_eq!(car.currency.as_deref(), Some("EUR"));
    assert_eq!(car.mileage_km, Some(20000));
    assert_eq!(car.safety, vec!["ABS", "ESP"]);
    assert_eq!(car.images, vec!["/img/2.jpg"]);
    assert_eq!(car.url, Some(format!("{}/offers/car-2", server.uri())));

    let summary = build_dealer_summary(&records);
    assert_eq!(summary["Dealer 0"].listing_count, 2);
    assert_eq!(summary["Dealer 1"].listing_count, 2);
}

#[tokio::test]
async fn test_record_cap_limits_dispatched_urls() {
    let server = MockServer::start().await;
    mount_search(&server, "1", search_page(&[1, 2, 3, 4, 5], Some("/lst?page=2"))).await;
    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(search_page(&[6], None)))
        .expect(0)
        .mount(&server)
        .await;
    for id in 1..=5 {
        mount_detail(&server, id).await;
    }

    let coordinator = Coordinator::new(&create_test_config(3, 2)).unwrap();
    let seeds = vec![format!("{}/lst?page=1", server.uri())];
    let (records, stats) = coordinator.run_with_stats(&seeds).await;

    assert_eq!(stats.listing_urls, 3);
    assert_eq!(sorted_titles(&records), vec!["Car 1", "Car 2", "Car 3"]);
}

#[tokio::test]
async fn test_single_fetch_failure_is_isolated() {
    let server = MockServer::start().await;
    for id in [1, 2, 4] {
        mount_detail(&server, id).await;
    }
    Mock::given(method("GET"))
        .and(path("/offers/car-3"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let coordinator = Coordinator::new(&create_test_config(10, 4)).unwrap();
    let (records, stats) = coordinator
        .run_with_stats(&detail_seeds(&server, &[1, 2, 3, 4]))
        .await;

    assert_eq!(records.len(), 3);
    assert_eq!(stats.fetch_failures, 1);
    assert_eq!(sorted_titles(&records), vec!["Car 1", "Car 2", "Car 4"]);
}

#[tokio::test]
async fn test_detail_and_search_seeds_are_deduplicated() {
    let server = MockServer::start().await;
    mount_search(&server, "1", search_page(&[1, 2], None)).await;
    for id in 1..=2 {
        Mock::given(method("GET"))
            .and(path(format!("/offers/car-{}", id)))
            .respond_with(ResponseTemplate::new(200).set_body_string(detail_page(id)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let coordinator = Coordinator::new(&create_test_config(10, 2)).unwrap();
    let mut seeds = detail_seeds(&server, &[1]);
    seeds.push(format!("{}/lst?page=1", server.uri()));
    seeds.push(String::new());

    let urls = coordinator.prepare_listing_urls(&seeds).await;
    assert_eq!(urls, detail_seeds(&server, &[1, 2]));

    let records = coordinator.run(&seeds).await;
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_unreachable_seed_yields_empty_run() {
    let coordinator = Coordinator::new(&create_test_config(10, 2)).unwrap();
    let seeds = vec!["http://127.0.0.1:1/lst".to_string()];

    let (records, stats) = coordinator.run_with_stats(&seeds).await;
    assert!(records.is_empty());
    assert_eq!(stats.listing_urls, 0);
}

/// Rejects pages whose URL contains "broken"
struct PickyExtractor {
    inner: AutoScoutExtractor,
}

impl FieldExtractor for PickyExtractor {
    fn extract(&self, html: &str, url: &str) -> Result<RawRecord, ExtractionError> {
        if url.contains("broken") {
            return Err(ExtractionError::Fault {
                url: url.to_string(),
                message: "unexpected markup".to_string(),
            });
        }
        self.inner.extract(html, url)
    }
}

/// Panics on pages whose URL contains "panic"
struct PanickingExtractor;

impl FieldExtractor for PanickingExtractor {
    fn extract(&self, _html: &str, url: &str) -> Result<RawRecord, ExtractionError> {
        if url.contains("panic") {
            panic!("extractor bug on {}", url);
        }
        Ok(RawRecord::new(url))
    }
}

#[tokio::test]
async fn test_extraction_failure_is_skipped() {
    let server = MockServer::start().await;
    mount_detail(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/offers/broken-2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page(2)))
        .mount(&server)
        .await;

    let extractor = PickyExtractor {
        inner: AutoScoutExtractor::new().unwrap(),
    };
    let coordinator = Coordinator::new(&create_test_config(10, 2))
        .unwrap()
        .with_extractor(Arc::new(extractor));

    let seeds = vec![
        format!("{}/offers/car-1", server.uri()),
        format!("{}/offers/broken-2", server.uri()),
    ];
    let (records, stats) = coordinator.run_with_stats(&seeds).await;

    assert_eq!(records.len(), 1);
    assert_eq!(stats.extraction_failures, 1);
}

#[tokio::test]
async fn test_task_panic_does_not_abort_siblings() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let rotator = Arc::new(ProxyRotator::configure(&[], &[]));
    let fetcher = Arc::new(PageFetcher::new("TestAgent/1.0", Duration::from_secs(5), rotator).unwrap());
    let coordinator = Coordinator::from_parts(fetcher, Arc::new(PanickingExtractor), 10, 3);

    let seeds = vec![
        format!("{}/offers/ok-1", server.uri()),
        format!("{}/offers/panic-2", server.uri()),
        format!("{}/offers/ok-3", server.uri()),
    ];
    let (records, stats) = coordinator.run_with_stats(&seeds).await;

    assert_eq!(records.len(), 2);
    assert_eq!(stats.task_faults, 1);
}

#[tokio::test]
async fn test_scrape_and_export_csv() {
    let server = MockServer::start().await;
    for id in 1..=2 {
        mount_detail(&server, id).await;
    }

    let records = crawl(&create_test_config(10, 2), &detail_seeds(&server, &[1, 2]))
        .await
        .unwrap();

    let dir = TempDir::new().unwrap();
    let out = dir.path().join("exports/listings.csv");
    export_records(&records, &out, OutputFormat::Csv).unwrap();

    let mut reader = csv::Reader::from_path(&out).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert!(headers.iter().any(|h| h == "rawPrice"));
    assert!(headers.iter().any(|h| h == "mileageKm"));
    assert_eq!(reader.records().count(), 2);
}

/// Serves detail pages after a fixed delay and records when each request arrived
struct SlowDetailResponder {
    delay: Duration,
    arrivals: Arc<Mutex<Vec<Instant>>>,
}

impl Respond for SlowDetailResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        self.arrivals.lock().unwrap().push(Instant::now());
        let id: u32 = request
            .url
            .path()
            .trim_start_matches("/offers/car-")
            .parse()
            .unwrap_or(0);
        ResponseTemplate::new(200)
            .set_body_string(detail_page(id))
            .set_delay(self.delay)
    }
}

/// Highest number of requests whose delayed responses overlapped
fn peak_in_flight(arrivals: &[Instant], delay: Duration) -> usize {
    let mut sorted = arrivals.to_vec();
    sorted.sort();
    (0..sorted.len())
        .map(|i| {
            sorted[i..]
                .iter()
                .take_while(|t| t.duration_since(sorted[i]) < delay)
                .count()
        })
        .max()
        .unwrap_or(0)
}

#[tokio::test]
async fn test_parallel_fetches_respect_concurrency_limit() {
    let server = MockServer::start().await;
    let delay = Duration::from_millis(150);
    let arrivals = Arc::new(Mutex::new(Vec::new()));
    Mock::given(method("GET"))
        .respond_with(SlowDetailResponder {
            delay,
            arrivals: Arc::clone(&arrivals),
        })
        .mount(&server)
        .await;

    let coordinator = Coordinator::new(&create_test_config(10, 2)).unwrap();
    let ids: Vec<u32> = (1..=8).collect();
    let (records, stats) = coordinator.run_with_stats(&detail_seeds(&server, &ids)).await;

    assert_eq!(records.len(), 8);
    assert_eq!(stats.skipped(), 0);

    let arrivals = arrivals.lock().unwrap();
    assert_eq!(arrivals.len(), 8);
    assert!(peak_in_flight(&arrivals, delay) <= 2);
}

#[tokio::test]
async fn test_requests_rotate_through_configured_proxies() {
    let first_proxy = MockServer::start().await;
    let second_proxy = MockServer::start().await;
    for proxy in [&first_proxy, &second_proxy] {
        Mock::given(method("GET"))
            .and(path("/offers/car-1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(detail_page(1)))
            .expect(2)
            .mount(proxy)
            .await;
    }

    let rotator = Arc::new(ProxyRotator::configure(
        &[first_proxy.uri(), second_proxy.uri()],
        &[],
    ));
    let fetcher = Arc::new(PageFetcher::new("TestAgent/1.0", Duration::from_secs(5), rotator).unwrap());
    let extractor = Arc::new(AutoScoutExtractor::new().unwrap());
    let coordinator = Coordinator::from_parts(fetcher, extractor, 10, 2);

    // The listing host does not resolve, so only a proxy can answer.
    let seeds: Vec<String> = (1..=4)
        .map(|n| format!("http://listings.invalid/offers/car-1?n={}", n))
        .collect();
    let (records, stats) = coordinator.run_with_stats(&seeds).await;

    assert_eq!(stats.fetch_failures, 0);
    assert_eq!(records.len(), 4);
    assert!(records.iter().all(|r| r.title.as_deref() == Some("Car 1")));
}

#[tokio::test]
async fn test_crawl_rejects_bad_timeout_before_fetching() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page(1)))
        .expect(0)
        .mount(&server)
        .await;

    for timeout in [-1.0, 1e20] {
        let mut config = create_test_config(10, 2);
        config.scraper.timeout_seconds = timeout;

        let result = crawl(&config, &detail_seeds(&server, &[1])).await;
        assert!(matches!(
            result,
            Err(ScraperError::Config(ConfigError::Validation(_)))
        ));
    }
}
