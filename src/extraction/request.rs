//! Target URL validation.
//!
//! Runs before any network activity; a rejected URL never reaches a fetcher.

use thiserror::Error;
use url::Url;

/// Why a target URL was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("No URL provided")]
    Missing,

    #[error("Invalid URL: {0}")]
    Malformed(String),

    #[error("Invalid URL scheme `{0}`: only http and https are supported")]
    Scheme(String),

    #[error("Invalid URL: host `{0}` is not an allowed target host")]
    Host(String),
}

/// A target URL that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    url: Url,
}

impl ExtractionRequest {
    /// Parse `raw` and check that its host is one of `allowed_hosts` or a
    /// subdomain of one.
    pub fn parse(raw: &str, allowed_hosts: &[String]) -> Result<Self, ValidationError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ValidationError::Missing);
        }

        let url = Url::parse(raw).map_err(|e| ValidationError::Malformed(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(ValidationError::Scheme(other.to_string())),
        }

        let host = url
            .host_str()
            .ok_or_else(|| ValidationError::Malformed("missing host".to_string()))?
            .trim_end_matches('.')
            .to_ascii_lowercase();

        if !host_allowed(&host, allowed_hosts) {
            return Err(ValidationError::Host(host));
        }
        Ok(Self { url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }
}

fn host_allowed(host: &str, allowed_hosts: &[String]) -> bool {
    allowed_hosts.iter().any(|allowed| {
        let allowed = allowed.trim_end_matches('.').to_ascii_lowercase();
        host == allowed
            || host
                .strip_suffix(allowed.as_str())
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}
