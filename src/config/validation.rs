use crate::config::types::{Config, OutputConfig, ScraperConfig};
use crate::ConfigError;
use std::time::Duration;
use url::Url;

/// Upper bound on concurrent detail-page fetches
const MAX_PARALLEL_REQUESTS: usize = 100;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_scraper_config(&config.scraper)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawl settings
fn validate_scraper_config(config: &ScraperConfig) -> Result<(), ConfigError> {
    if config.max_records < 1 {
        return Err(ConfigError::Validation(format!(
            "max_records must be >= 1, got {}",
            config.max_records
        )));
    }

    if config.parallel_requests < 1 || config.parallel_requests > MAX_PARALLEL_REQUESTS {
        return Err(ConfigError::Validation(format!(
            "parallel_requests must be between 1 and {}, got {}",
            MAX_PARALLEL_REQUESTS, config.parallel_requests
        )));
    }

    request_timeout(config.timeout_seconds)?;

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    for url in &config.start_urls {
        if !url.trim().is_empty() {
            validate_start_url(url.trim())?;
        }
    }

    Ok(())
}

/// Converts `timeout_seconds` into a request timeout
///
/// Rejects zero, negative, NaN and values too large for a [`Duration`].
pub fn request_timeout(seconds: f64) -> Result<Duration, ConfigError> {
    match Duration::try_from_secs_f64(seconds) {
        Ok(timeout) if !timeout.is_zero() => Ok(timeout),
        _ => Err(ConfigError::Validation(format!(
            "timeout_seconds must be a positive number of seconds, got {}",
            seconds
        ))),
    }
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if let Some(file) = &config.file {
        if file.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output file cannot be blank".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates a single seed URL: it must parse and use http or https
pub fn validate_start_url(url: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid start URL '{}': {}", url, e)))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Start URL '{}' must use http or https",
            url
        )));
    }

    Ok(())
}
