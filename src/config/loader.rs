//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::ScraperConfig;
use crate::config::validation::{validate_config, ConfigIssue};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_issues(.0))]
    Validation(Vec<ConfigIssue>),
}

fn join_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ScraperConfig, ConfigError> {
    let config: ScraperConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ScraperConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Apply deployment overrides: `PORT` replaces the listener port and
/// `CHROME_BIN` points the renderer at a browser binary.
pub fn apply_env_overrides(config: &mut ScraperConfig) {
    apply_overrides(
        config,
        std::env::var("PORT").ok().as_deref(),
        std::env::var("CHROME_BIN").ok().as_deref(),
    );
}

fn apply_overrides(config: &mut ScraperConfig, port: Option<&str>, chrome_bin: Option<&str>) {
    if let Some(port) = port {
        match port.trim().parse::<u16>() {
            Ok(port) => {
                let host = config
                    .listener
                    .bind_address
                    .rsplit_once(':')
                    .map(|(host, _)| host.to_string())
                    .unwrap_or_else(|| "0.0.0.0".to_string());
                config.listener.bind_address = format!("{host}:{port}");
            }
            Err(_) => tracing::warn!(port = %port, "Ignoring invalid PORT override"),
        }
    }
    if let Some(path) = chrome_bin.filter(|p| !p.trim().is_empty()) {
        config.render.chrome_path = Some(path.to_string());
    }
}
