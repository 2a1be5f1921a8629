//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the scraper.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::extraction::DEFAULT_MARKER;

/// Chrome 133 desktop user agent sent by both fetch paths.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/133.0.0.0 Safari/537.36";

/// Root configuration for the route scraper.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ScraperConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Which pages may be scraped and what to look for.
    pub target: TargetConfig,

    /// Direct HTTP fetch settings.
    pub fetch: FetchConfig,

    /// Browser rendering settings.
    pub render: RenderConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    pub bind_address: String,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
            max_body_size: 64 * 1024,
        }
    }
}

/// Target pages and marker.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Hosts (and their subdomains) that may be scraped.
    pub allowed_hosts: Vec<String>,

    /// CSS class marking one route option.
    pub marker_class: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            allowed_hosts: vec!["moovitapp.com".to_string()],
            marker_class: DEFAULT_MARKER.to_string(),
        }
    }
}

/// Direct HTTP fetch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Whole-fetch timeout in seconds.
    pub timeout_secs: u64,

    /// User-Agent header.
    pub user_agent: String,

    /// Accept-Language header.
    pub accept_language: String,

    /// Return an empty result instead of an error when fetching fails.
    pub degrade_to_empty: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            degrade_to_empty: false,
        }
    }
}

/// Browser rendering configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Enable the rendered fetch path.
    pub enabled: bool,

    /// Chrome/Chromium executable; auto-detected when unset.
    pub chrome_path: Option<String>,

    /// Run without a visible window.
    pub headless: bool,

    /// Launch + navigation timeout in seconds.
    pub navigation_timeout_secs: u64,

    /// How long to wait for the marker to appear, in seconds.
    pub settle_timeout_secs: u64,

    /// Delay between marker polls in milliseconds.
    pub poll_interval_ms: u64,

    pub window_width: u32,
    pub window_height: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            chrome_path: None,
            headless: true,
            navigation_timeout_secs: 30,
            settle_timeout_secs: 15,
            poll_interval_ms: 500,
            window_width: 1920,
            window_height: 1080,
        }
    }
}

/// Timeout configuration for API requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole-request deadline in seconds; must exceed every fetch budget.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 150 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format: "pretty" or "json".
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
