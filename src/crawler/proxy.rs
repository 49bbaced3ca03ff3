//! Round-robin proxy rotation
//!
//! Endpoints come from explicit configuration first, then from the
//! `HTTP_PROXIES` and `HTTPS_PROXIES` environment variables (comma separated).
//! With no endpoints the rotator runs in direct mode and never yields a proxy.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Environment variables consulted for additional proxies, in merge order
pub const PROXY_ENV_VARS: [&str; 2] = ["HTTP_PROXIES", "HTTPS_PROXIES"];

/// Thread-safe round-robin supplier of proxy endpoints
///
/// A single instance is shared by every worker. The cursor is advanced with an
/// atomic `fetch_add`, so concurrent callers each receive their own slot in
/// the cycle.
#[derive(Debug, Default)]
pub struct ProxyRotator {
    endpoints: Vec<String>,
    cursor: AtomicUsize,
}

impl ProxyRotator {
    /// Builds a rotator from an explicit list followed by environment values
    ///
    /// # Arguments
    ///
    /// * `explicit` - Endpoints from configuration (take priority)
    /// * `env_values` - Raw comma-separated values, e.g. from `HTTP_PROXIES`
    ///
    /// Blank entries are dropped; duplicates are kept.
    pub fn configure(explicit: &[String], env_values: &[Option<String>]) -> Self {
        let from_env = env_values
            .iter()
            .flatten()
            .flat_map(|raw| raw.split(','))
            .map(str::to_string);

        let endpoints: Vec<String> = explicit
            .iter()
            .cloned()
            .chain(from_env)
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();

        if endpoints.is_empty() {
            tracing::info!("Proxy rotation disabled, using direct connections");
        } else {
            tracing::info!("Proxy rotation configured with {} endpoints", endpoints.len());
        }

        Self {
            endpoints,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Builds a rotator from an explicit list plus the process environment
    pub fn from_env(explicit: &[String]) -> Self {
        let env_values: Vec<Option<String>> = PROXY_ENV_VARS
            .iter()
            .map(|key| std::env::var(key).ok())
            .collect();
        Self::configure(explicit, &env_values)
    }

    /// Returns the next endpoint in the cycle, or `None` in direct mode
    pub fn next(&self) -> Option<&str> {
        if self.endpoints.is_empty() {
            return None;
        }
        let slot = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.endpoints
            .get(slot % self.endpoints.len())
            .map(String::as_str)
    }

    /// Returns true if at least one proxy is configured
    pub fn has_proxies(&self) -> bool {
        !self.endpoints.is_empty()
    }

    /// All configured endpoints in rotation order
    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }
}
