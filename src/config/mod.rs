use serde::Deserialize;
use std::time::Duration;

use crate::error::{ClientError, ClientResult};

pub const DEFAULT_BASE_URL: &str = "https://api.lightxeditor.com/external/api";

/// 5 MiB, the per-asset upload limit enforced by LightX.
pub const DEFAULT_MAX_FILE_SIZE: usize = 5_242_880;

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// LightX API key, sent as `x-api-key` on every request
    pub api_key: String,

    /// API root, without a trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Poll attempts before giving up on an order
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Fixed delay between polls, in milliseconds
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,

    /// Largest asset accepted for upload, in bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,

    /// Per-request I/O timeout, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_max_retries() -> u32 {
    5
}

fn default_retry_interval_ms() -> u64 {
    3000
}

fn default_max_file_size() -> usize {
    DEFAULT_MAX_FILE_SIZE
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Fixed-interval polling budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub retry_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_interval: Duration::from_millis(default_retry_interval_ms()),
        }
    }
}

impl ClientConfig {
    /// Defaults for everything but the API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
            max_retries: default_max_retries(),
            retry_interval_ms: default_retry_interval_ms(),
            max_file_size: default_max_file_size(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }

    /// Load from `LIGHTX_`-prefixed environment variables (and `.env`).
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::prefixed("LIGHTX_").from_env()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.max_retries = policy.max_retries;
        self.retry_interval_ms =
            u64::try_from(policy.retry_interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_max_file_size(mut self, max_file_size: usize) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            retry_interval: Duration::from_millis(self.retry_interval_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Base URL with any trailing slash removed, ready for `{base}{path}` joins.
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn validate(&self) -> ClientResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(ClientError::config("API key must not be empty"));
        }
        if self.max_retries == 0 {
            return Err(ClientError::config("max_retries must be at least 1"));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ClientError::config(format!(
                "base_url must be an http(s) URL, got {:?}",
                self.base_url
            )));
        }
        Ok(())
    }
}
