//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Reject marker classes that cannot be embedded in selectors
//! - Keep the request deadline above every fetch budget
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ScraperConfig → Result<(), Vec<ConfigIssue>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::ScraperConfig;
use crate::fetch::WaitPolicy;

/// One semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ConfigIssue {
    pub field: &'static str,
    pub message: String,
}

impl ConfigIssue {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check every rule and collect all violations.
pub fn validate_config(config: &ScraperConfig) -> Result<(), Vec<ConfigIssue>> {
    let mut issues = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        issues.push(ConfigIssue::new(
            "listener.bind_address",
            format!("`{}` is not a socket address", config.listener.bind_address),
        ));
    }
    if config.listener.max_body_size == 0 {
        issues.push(ConfigIssue::new("listener.max_body_size", "must be greater than 0"));
    }

    if config.target.allowed_hosts.is_empty() {
        issues.push(ConfigIssue::new("target.allowed_hosts", "at least one host is required"));
    }
    for host in &config.target.allowed_hosts {
        if host.trim().is_empty() || host.contains('/') || host.contains(char::is_whitespace) {
            issues.push(ConfigIssue::new(
                "target.allowed_hosts",
                format!("`{host}` is not a bare host name"),
            ));
        }
    }

    let marker = &config.target.marker_class;
    if marker.is_empty() {
        issues.push(ConfigIssue::new("target.marker_class", "must not be empty"));
    } else if !marker
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        issues.push(ConfigIssue::new(
            "target.marker_class",
            format!("`{marker}` must contain only letters, digits, '-' or '_'"),
        ));
    }

    if config.fetch.timeout_secs == 0 {
        issues.push(ConfigIssue::new("fetch.timeout_secs", "must be greater than 0"));
    }
    if config.fetch.user_agent.trim().is_empty() {
        issues.push(ConfigIssue::new("fetch.user_agent", "must not be empty"));
    }

    if config.render.navigation_timeout_secs == 0 {
        issues.push(ConfigIssue::new("render.navigation_timeout_secs", "must be greater than 0"));
    }
    if config.render.poll_interval_ms == 0 {
        issues.push(ConfigIssue::new("render.poll_interval_ms", "must be greater than 0"));
    }
    if config.render.window_width == 0 || config.render.window_height == 0 {
        issues.push(ConfigIssue::new("render.window_width", "window dimensions must be non-zero"));
    }

    if config.timeouts.request_secs == 0 {
        issues.push(ConfigIssue::new("timeouts.request_secs", "must be greater than 0"));
    } else {
        // The request deadline must outlast the slowest fetch path
        let mut budget = config.fetch.timeout_secs;
        if config.render.enabled {
            budget = budget.max(WaitPolicy::from_config(&config.render).total_budget().as_secs());
        }
        if config.timeouts.request_secs <= budget {
            issues.push(ConfigIssue::new(
                "timeouts.request_secs",
                format!(
                    "must exceed the longest fetch budget ({budget}s), got {}s",
                    config.timeouts.request_secs
                ),
            ));
        }
    }

    match config.observability.log_format.as_str() {
        "pretty" | "json" => {}
        other => issues.push(ConfigIssue::new(
            "observability.log_format",
            format!("`{other}` is not one of: pretty, json"),
        )),
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        issues.push(ConfigIssue::new(
            "observability.metrics_address",
            format!("`{}` is not a socket address", config.observability.metrics_address),
        ));
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}
