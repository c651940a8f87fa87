//! Configuration management for the storefront.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Default GraphQL endpoint
pub const DEFAULT_API_URL: &str = "http://localhost:3000/graphql";

/// Storefront configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorefrontConfig {
    /// GraphQL endpoint (`STOREFRONT_API_URL`)
    pub api_url: String,
    /// Per-request timeout (`STOREFRONT_REQUEST_TIMEOUT_SECS`); `None` waits forever
    pub request_timeout: Option<Duration>,
    /// Log level used when `RUST_LOG` is unset (`STOREFRONT_LOG_LEVEL`)
    pub log_level: String,
    /// Capacity of the store's action broadcast (`STOREFRONT_BROADCAST_CAPACITY`)
    pub broadcast_capacity: usize,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: None,
            log_level: "info".to_string(),
            broadcast_capacity: storefront_runtime::store::DEFAULT_BROADCAST_CAPACITY,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparseable values fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            api_url: lookup("STOREFRONT_API_URL").unwrap_or(defaults.api_url),
            request_timeout: lookup("STOREFRONT_REQUEST_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            log_level: lookup("STOREFRONT_LOG_LEVEL").unwrap_or(defaults.log_level),
            broadcast_capacity: lookup("STOREFRONT_BROADCAST_CAPACITY")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.broadcast_capacity),
        }
    }
}
