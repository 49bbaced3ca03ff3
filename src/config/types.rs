use crate::output::OutputFormat;
use serde::Deserialize;

/// Default cap on the number of listings collected per run
pub const DEFAULT_MAX_RECORDS: usize = 300;

/// Default number of concurrent detail-page fetches
pub const DEFAULT_PARALLEL_REQUESTS: usize = 8;

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECONDS: f64 = 15.0;

/// Browser-like user agent sent when none is configured
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Main configuration structure for Autoscout-Scraper
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperConfig {
    /// Search or detail URLs to start from
    #[serde(rename = "start-urls", alias = "urls", default)]
    pub start_urls: Vec<String>,

    /// Text file with one start URL per line, used when `start-urls` is empty
    #[serde(rename = "urls-file", default)]
    pub urls_file: Option<String>,

    /// Maximum number of listings to collect
    #[serde(rename = "max-records", default = "default_max_records")]
    pub max_records: usize,

    /// Number of detail pages fetched concurrently
    #[serde(rename = "parallel-requests", default = "default_parallel_requests")]
    pub parallel_requests: usize,

    /// Per-request timeout in seconds
    #[serde(rename = "timeout-seconds", default = "default_timeout_seconds")]
    pub timeout_seconds: f64,

    /// Outbound proxy endpoints, either a list or a comma-separated string
    #[serde(default)]
    pub proxies: ProxySetting,

    /// User agent sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            start_urls: Vec::new(),
            urls_file: None,
            max_records: DEFAULT_MAX_RECORDS,
            parallel_requests: DEFAULT_PARALLEL_REQUESTS,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            proxies: ProxySetting::default(),
            user_agent: default_user_agent(),
        }
    }
}

/// Proxy list as written in the config file
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ProxySetting {
    List(Vec<String>),
    Csv(String),
}

impl Default for ProxySetting {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl ProxySetting {
    /// Returns the configured endpoints, trimmed, with blank entries dropped
    pub fn endpoints(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            Self::List(items) => items.iter().map(String::as_str).collect(),
            Self::Csv(s) => s.split(',').collect(),
        };

        raw.into_iter()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Path of the export file; defaults to `data/output.<format>`
    #[serde(default)]
    pub file: Option<String>,

    /// Export format
    #[serde(default)]
    pub format: OutputFormat,
}

impl OutputConfig {
    /// Returns the export path, deriving it from the format when unset
    pub fn resolved_path(&self) -> String {
        match &self.file {
            Some(file) if !file.trim().is_empty() => file.clone(),
            _ => format!("data/output.{}", self.format.extension()),
        }
    }
}

fn default_max_records() -> usize {
    DEFAULT_MAX_RECORDS
}

fn default_parallel_requests() -> usize {
    DEFAULT_PARALLEL_REQUESTS
}

fn default_timeout_seconds() -> f64 {
    DEFAULT_TIMEOUT_SECONDS
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
