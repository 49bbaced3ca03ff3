//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the scraper, including:
//! - Building HTTP clients with the configured user agent and timeout
//! - One pre-built client per proxy endpoint so connections are reused
//! - Single-attempt GET requests (no retries at this layer)
//! - Error classification into a recoverable [`FetchError`]

use crate::crawler::proxy::ProxyRotator;
use reqwest::{Client, Proxy};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Why a single fetch failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchErrorKind {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("failed to read body: {0}")]
    Body(String),

    #[error("{0}")]
    Request(String),
}

/// A per-URL transport failure
///
/// Always recoverable: callers log it and skip the URL.
#[derive(Debug, Clone, Error)]
#[error("Failed to fetch {url}: {kind}")]
pub struct FetchError {
    pub url: String,
    pub kind: FetchErrorKind,
}

impl FetchError {
    fn new(url: &str, kind: FetchErrorKind) -> Self {
        Self {
            url: url.to_string(),
            kind,
        }
    }

    fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        let kind = if error.is_timeout() {
            FetchErrorKind::Timeout
        } else if error.is_connect() {
            FetchErrorKind::Connect(error.to_string())
        } else {
            FetchErrorKind::Request(error.to_string())
        };
        Self::new(url, kind)
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent sent with every request
/// * `timeout` - Overall request timeout
/// * `proxy` - Proxy endpoint, or `None` for a direct connection
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client (e.g. malformed proxy)
///
/// # Example
///
/// ```no_run
/// use autoscout_scraper::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client("Mozilla/5.0", Duration::from_secs(15), None).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &str,
    timeout: Duration,
    proxy: Option<&str>,
) -> Result<Client, reqwest::Error> {
    let builder = Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout)
        .gzip(true)
        .brotli(true);

    let builder = match proxy {
        Some(endpoint) => builder.proxy(Proxy::all(endpoint)?),
        None => builder.no_proxy(),
    };

    builder.build()
}

/// Performs single GET requests through the shared proxy rotator
pub struct PageFetcher {
    direct: Client,
    proxied: HashMap<String, Client>,
    rotator: Arc<ProxyRotator>,
}

impl PageFetcher {
    /// Creates a fetcher with one client per distinct proxy endpoint
    ///
    /// # Returns
    ///
    /// * `Ok(PageFetcher)` - All clients built
    /// * `Err(reqwest::Error)` - A client could not be built
    pub fn new(
        user_agent: &str,
        timeout: Duration,
        rotator: Arc<ProxyRotator>,
    ) -> Result<Self, reqwest::Error> {
        let direct = build_http_client(user_agent, timeout, None)?;

        let mut proxied = HashMap::new();
        for endpoint in rotator.endpoints() {
            if !proxied.contains_key(endpoint) {
                let client = build_http_client(user_agent, timeout, Some(endpoint))?;
                proxied.insert(endpoint.clone(), client);
            }
        }

        Ok(Self {
            direct,
            proxied,
            rotator,
        })
    }

    /// Fetches a URL through the next proxy from the rotator
    pub async fn fetch_next(&self, url: &str) -> Result<String, FetchError> {
        let proxy = self.rotator.next();
        self.fetch(url, proxy).await
    }

    /// Fetches a URL with a single GET request
    ///
    /// # Request Flow
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | 2xx with readable body | `Ok(body)` |
    /// | Non-2xx status | `FetchErrorKind::Status` |
    /// | Timeout | `FetchErrorKind::Timeout` |
    /// | Connection refused / TLS | `FetchErrorKind::Connect` |
    /// | Body read failure | `FetchErrorKind::Body` |
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to fetch
    /// * `proxy` - Proxy endpoint from the rotator, `None` for direct
    pub async fn fetch(&self, url: &str, proxy: Option<&str>) -> Result<String, FetchError> {
        let client = match proxy {
            Some(endpoint) => self.proxied.get(endpoint).ok_or_else(|| {
                FetchError::new(
                    url,
                    FetchErrorKind::Request(format!("no client configured for proxy {}", endpoint)),
                )
            })?,
            None => &self.direct,
        };

        tracing::trace!("GET {} via {}", url, proxy.unwrap_or("direct"));

        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(url, FetchErrorKind::Status(status.as_u16())));
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::new(url, FetchErrorKind::Timeout)
            } else {
                FetchError::new(url, FetchErrorKind::Body(e.to_string()))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const UA: &str = "TestAgent/1.0";

    fn direct_fetcher(timeout: Duration) -> PageFetcher {
        let rotator = Arc::new(ProxyRotator::configure(&[], &[]));
        PageFetcher::new(UA, timeout, rotator).unwrap()
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(UA, Duration::from_secs(5), None).is_ok());
        assert!(build_http_client(UA, Duration::from_secs(5), Some("http://127.0.0.1:3128")).is_ok());
    }

    #[test]
    fn test_fetcher_builds_client_per_proxy() {
        let rotator = Arc::new(ProxyRotator::configure(
            &["http://127.0.0.1:3128".to_string(), "http://127.0.0.1:3128".to_string()],
            &[],
        ));
        let fetcher = PageFetcher::new(UA, Duration::from_secs(5), rotator).unwrap();
        assert_eq!(fetcher.proxied.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_success_sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/offers/1"))
            .and(header("user-agent", UA))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = direct_fetcher(Duration::from_secs(5));
        let body = fetcher
            .fetch(&format!("{}/offers/1", server.uri()), None)
            .await
            .unwrap();
        assert_eq!(body, "<html>ok</html>");
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = direct_fetcher(Duration::from_secs(5));
        let url = format!("{}/offers/missing", server.uri());
        let err = fetcher.fetch(&url, None).await.unwrap_err();
        assert_eq!(err.kind, FetchErrorKind::Status(404));
        assert_eq!(err.url, url);
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let fetcher = direct_fetcher(Duration::from_millis(200));
        let err = fetcher
            .fetch(&format!("{}/slow", server.uri()), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, FetchErrorKind::Timeout);
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let fetcher = direct_fetcher(Duration::from_secs(2));
        let err = fetcher.fetch("http://127.0.0.1:1/offers/x", None).await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn test_fetch_unknown_proxy_is_error() {
        let fetcher = direct_fetcher(Duration::from_secs(2));
        let err = fetcher
            .fetch("http://127.0.0.1:1/", Some("http://not-configured:1"))
            .await
            .unwrap_err();
        assert!(matches!(err.kind, FetchErrorKind::Request(_)));
    }
}
