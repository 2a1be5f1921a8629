//! Direct HTTP fetch with browser-like headers.
//!
//! Not a browser: no scripts run, so client-rendered content is missing.
//! Fast path for pages that ship their routes in the initial HTML.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL};
use std::time::{Duration, Instant};
use url::Url;

use crate::config::FetchConfig;
use crate::fetch::{FetchError, FetchMode, FetchedPage, PageFetcher};
use crate::observability::metrics;

/// reqwest-backed [`PageFetcher`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language)
                .map_err(|e| FetchError::Transport(format!("invalid Accept-Language: {e}")))?,
        );
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self { client, timeout })
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout.as_secs())
        } else {
            FetchError::Transport(err.to_string())
        }
    }

    async fn get(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let final_url = response.url().to_string();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: final_url,
            });
        }

        let markup = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(self.timeout.as_secs())
            } else {
                FetchError::Body(e.to_string())
            }
        })?;

        Ok(FetchedPage {
            final_url,
            markup,
            dom: None,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let start = Instant::now();
        tracing::debug!(url = %url, timeout_secs = self.timeout.as_secs(), "Fetching page over HTTP");

        let result = self.get(url).await;
        metrics::record_fetch(FetchMode::Http, result.is_ok(), start);

        match &result {
            Ok(page) => tracing::info!(
                url = %url,
                final_url = %page.final_url,
                bytes = page.markup.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Page fetched"
            ),
            Err(e) => tracing::warn!(url = %url, error = %e, "HTTP fetch failed"),
        }
        result
    }
}
