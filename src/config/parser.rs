use crate::config::types::Config;
use crate::config::validation::{validate, validate_start_url};
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use autoscout_scraper::config::load_config;
///
/// let config = load_config(Path::new("config.toml")).unwrap();
/// println!("Max records: {}", config.scraper.max_records);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let config = parse_config(path)?;
    validate(&config)?;
    Ok(config)
}

/// Reads and parses a configuration file without validating it
///
/// Used when command-line overrides still have to be applied.
pub fn parse_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Loads a base configuration and deep-merges an input file over it
///
/// Tables are merged key by key; any other value in the overlay replaces the
/// base value. The merged document is validated as a whole.
pub fn load_config_with_overlay(base: &Path, overlay: &Path) -> Result<Config, ConfigError> {
    let config = parse_config_with_overlay(base, overlay)?;
    validate(&config)?;
    Ok(config)
}

/// Deep-merges `overlay` over `base` without validating the result
pub fn parse_config_with_overlay(base: &Path, overlay: &Path) -> Result<Config, ConfigError> {
    let base_value: toml::Value = toml::from_str(&std::fs::read_to_string(base)?)?;
    let overlay_value: toml::Value = toml::from_str(&std::fs::read_to_string(overlay)?)?;

    Ok(merge_values(base_value, overlay_value).try_into()?)
}

/// Recursively merges `overlay` into `base`
pub fn merge_values(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => value,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so two runs can be matched to the same settings.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Resolves the seed URLs for a run
///
/// Explicit `start-urls` win. When none are set, the `urls-file` is read line
/// by line, skipping blanks and `#` comments. Every URL must be http(s).
///
/// # Returns
///
/// * `Ok(Vec<String>)` - Seeds in configured order
/// * `Err(ConfigError::NoStartUrls)` - Neither source yielded a URL
pub fn resolve_start_urls(config: &Config) -> Result<Vec<String>, ConfigError> {
    let mut urls: Vec<String> = config
        .scraper
        .start_urls
        .iter()
        .map(|u| u.trim())
        .filter(|u| !u.is_empty())
        .map(str::to_string)
        .collect();

    if urls.is_empty() {
        if let Some(file) = &config.scraper.urls_file {
            let path = Path::new(file);
            if path.exists() {
                urls = read_urls_file(path)?;
            } else {
                tracing::warn!("URLs file {} does not exist", path.display());
            }
        }
    }

    if urls.is_empty() {
        return Err(ConfigError::NoStartUrls);
    }

    for url in &urls {
        validate_start_url(url)?;
    }

    Ok(urls)
}

fn read_urls_file(path: &Path) -> Result<Vec<String>, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}
