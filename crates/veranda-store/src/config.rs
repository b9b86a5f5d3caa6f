//! Remote store configuration loaded from environment variables.
//!
//! Everything except the API key has a default usable for local
//! development; the binary refuses to start without a key.

use std::time::Duration;

/// Connection settings shared by the log and attachment store clients.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base URL of the REST store.
    /// Env: `VERANDA_STORE_URL`
    /// Default: `http://localhost:8000`
    pub base_url: String,

    /// API key sent with every log-store request and as the bearer token
    /// for attachment uploads.
    /// Env: `VERANDA_STORE_KEY`
    /// Default: empty (clients refuse to start).
    pub api_key: String,

    /// Bucket that receives attachment objects.
    /// Env: `VERANDA_BUCKET`
    /// Default: `attachments`
    pub bucket: String,

    /// Request timeout applied to list and append calls.
    /// Env: `VERANDA_STORE_TIMEOUT_SECS`
    /// Default: 10s
    pub timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            api_key: String::new(),
            bucket: "attachments".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("VERANDA_STORE_URL") {
            config.base_url = url;
        }

        if let Ok(key) = std::env::var("VERANDA_STORE_KEY") {
            config.api_key = key;
        }

        if let Ok(bucket) = std::env::var("VERANDA_BUCKET") {
            config.bucket = bucket;
        }

        if let Ok(val) = std::env::var("VERANDA_STORE_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse::<u64>() {
                config.timeout = Duration::from_secs(secs);
            } else {
                tracing::warn!(value = %val, "Invalid VERANDA_STORE_TIMEOUT_SECS, using default");
            }
        }

        config
    }
}
