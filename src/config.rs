//! Analyzer configuration
//!
//! Values come from the environment (optionally via a `.env` file) and can be
//! overridden by CLI flags.

use crate::error::ConfigError;
use reqwest::Url;
use std::time::Duration;

/// Environment variable holding the API base URL
pub const API_URL_ENV: &str = "LEASE_ANALYZER_API_URL";

/// Environment variable holding the request timeout in seconds
pub const TIMEOUT_ENV: &str = "LEASE_ANALYZER_TIMEOUT_SECS";

/// Local development server
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000";

pub const ANALYZE_PATH: &str = "/api/analyze";
pub const HEALTH_PATH: &str = "/api/health";

/// Configuration for the analysis client and workflow
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Base URL of the analysis service (no trailing slash)
    pub api_base_url: String,
    pub analyze_path: String,
    pub health_path: String,
    /// Per-request timeout; `None` waits indefinitely
    pub request_timeout: Option<Duration>,
    /// Interval between progress estimator ticks
    pub progress_tick: Duration,
    /// Soft ceiling the estimator holds at until the exchange resolves
    pub progress_ceiling: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            analyze_path: ANALYZE_PATH.to_string(),
            health_path: HEALTH_PATH.to_string(),
            request_timeout: None,
            progress_tick: Duration::from_millis(500),
            progress_ceiling: 90.0,
        }
    }
}

impl AnalyzerConfig {
    /// Load `.env` and read overrides from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        load_dotenv();

        let mut config = Self::default();
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config = config.with_base_url(&url)?;
            }
        }
        if let Ok(raw) = std::env::var(TIMEOUT_ENV) {
            config.request_timeout = parse_timeout(&raw)?;
        }
        Ok(config)
    }

    /// Replace the base URL after checking it parses as an http(s) URL
    pub fn with_base_url(mut self, url: &str) -> Result<Self, ConfigError> {
        let trimmed = url.trim().trim_end_matches('/');
        let parsed = Url::parse(trimmed).map_err(|e| ConfigError::InvalidBaseUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }
        self.api_base_url = trimmed.to_string();
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn analyze_url(&self) -> String {
        format!("{}{}", self.api_base_url, self.analyze_path)
    }

    pub fn health_url(&self) -> String {
        format!("{}{}", self.api_base_url, self.health_path)
    }
}

/// Parse a timeout in whole seconds; empty or `0` means no timeout
pub fn parse_timeout(raw: &str) -> Result<Option<Duration>, ConfigError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let secs: u64 = raw
        .parse()
        .map_err(|_| ConfigError::InvalidTimeout(raw.to_string()))?;
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}

/// Load `.env` from the working directory or its parent
pub fn load_dotenv() {
    if dotenvy::dotenv().is_err() {
        // Fallback: parent directory when run from a subfolder
        let _ = dotenvy::from_path("../.env");
    }
}
