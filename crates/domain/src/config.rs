//! Configuration structures
//!
//! Every field carries a default so partial files and empty environments
//! still produce a usable [`Config`].

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CALENDAR_API_BASE, DEFAULT_DRIVE_API_BASE, DEFAULT_HTTP_BASE_BACKOFF_MS,
    DEFAULT_HTTP_MAX_ATTEMPTS, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_TASKS_API_BASE,
    DEFAULT_USERINFO_API_BASE,
};

/// Top-level library configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,
    pub jobs: JobConfig,
    pub endpoints: EndpointConfig,
}

/// HTTP transport settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
    /// Attempts per request for connection-level failures (initial try +
    /// retries). Server statuses are never retried by the transport.
    pub max_attempts: usize,
    pub base_backoff_ms: u64,
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: DEFAULT_HTTP_TIMEOUT_SECS,
            max_attempts: DEFAULT_HTTP_MAX_ATTEMPTS,
            base_backoff_ms: DEFAULT_HTTP_BASE_BACKOFF_MS,
            user_agent: None,
        }
    }
}

/// Job engine settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Throttling backoff ceiling in seconds; 0 leaves it unbounded.
    pub max_retry_interval_seconds: u64,
}

/// Base URLs of the supported services
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub calendar: String,
    pub tasks: String,
    pub drive: String,
    pub userinfo: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            calendar: DEFAULT_CALENDAR_API_BASE.to_string(),
            tasks: DEFAULT_TASKS_API_BASE.to_string(),
            drive: DEFAULT_DRIVE_API_BASE.to_string(),
            userinfo: DEFAULT_USERINFO_API_BASE.to_string(),
        }
    }
}

impl EndpointConfig {
    /// Point every service at the same base URL (mock servers, proxies).
    pub fn all(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            calendar: base.to_string(),
            tasks: base.to_string(),
            drive: base.to_string(),
            userinfo: base.to_string(),
        }
    }
}
