//! Rendered fetch through a browser-automation agent.
//!
//! # Responsibilities
//! - Acquire a fresh rendering session per request
//! - Wait for client-side content to appear (bounded by [`WaitPolicy`])
//! - Snapshot page source and DOM query results while the session is alive
//! - Tear the session down on every exit path
//!
//! # Design Decisions
//! - Sessions are never pooled or reused across requests
//! - Launch and navigation are separate steps so a session that exists is
//!   always closed here, including when navigation times out
//! - Each render runs in its own task; a caller that stops waiting does not
//!   interrupt teardown
//! - Matching runs after teardown on the snapshot, so it stays synchronous
//! - A page that settles without the marker is not an error; the matcher
//!   simply finds nothing

use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

use crate::config::RenderConfig;
use crate::fetch::{DomSnapshot, FetchError, FetchMode, FetchedPage, PageFetcher, RenderError};
use crate::observability::metrics;
use crate::resilience::timeouts::with_deadline;

/// How long to wait for the page and its dynamic content.
#[derive(Debug, Clone)]
pub struct WaitPolicy {
    /// Bound applied to each agent step on its own.
    pub navigation_timeout: Duration,
    /// Deadline for the marker to appear.
    pub settle_timeout: Duration,
    /// Delay between marker polls.
    pub poll_interval: Duration,
}

impl WaitPolicy {
    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            navigation_timeout: Duration::from_secs(config.navigation_timeout_secs),
            settle_timeout: Duration::from_secs(config.settle_timeout_secs),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        }
    }

    /// Outer bound on [`RenderService::launch`]. Services bound the process
    /// start and the first page by `navigation_timeout` each, so this only
    /// fires for a service that ignores its own limits.
    pub fn launch_budget(&self) -> Duration {
        self.navigation_timeout * 2
    }

    /// Settling plus the queries after it.
    pub fn snapshot_budget(&self) -> Duration {
        self.settle_timeout + self.navigation_timeout
    }

    /// Longest a render can take before teardown starts.
    pub fn total_budget(&self) -> Duration {
        self.launch_budget() + self.navigation_timeout + self.snapshot_budget()
    }
}

/// Starts rendering sessions.
#[async_trait]
pub trait RenderService: Send + Sync {
    /// Start an agent on a blank page with a profile of its own.
    ///
    /// Implementations release anything they started if this fails.
    async fn launch(&self, wait: &WaitPolicy) -> Result<Box<dyn RenderSession>, RenderError>;
}

/// A live browser page.
#[async_trait]
pub trait RenderSession: Send + Sync {
    /// Load `url` and wait for the document to finish loading.
    async fn navigate(&self, url: &Url) -> Result<(), RenderError>;

    /// Serialized elements carrying `class`.
    async fn find_by_class(&self, class: &str) -> Result<Vec<String>, RenderError>;

    /// Serialized elements selected by an XPath expression.
    async fn find_by_xpath(&self, expr: &str) -> Result<Vec<String>, RenderError>;

    /// Current serialized document.
    async fn page_source(&self) -> Result<String, RenderError>;

    async fn current_url(&self) -> Result<String, RenderError>;

    /// Tear the session down and release its profile.
    async fn close(self: Box<Self>) -> Result<(), RenderError>;
}

/// XPath selecting `div`s whose class list contains `marker` as a token.
pub fn marker_xpath(marker: &str) -> String {
    format!("//div[contains(concat(' ', normalize-space(@class), ' '), ' {marker} ')]")
}

/// [`PageFetcher`] over a [`RenderService`].
#[derive(Clone)]
pub struct RenderedFetcher {
    service: Arc<dyn RenderService>,
    marker: String,
    wait: WaitPolicy,
}

impl RenderedFetcher {
    pub fn new(service: Arc<dyn RenderService>, marker: impl Into<String>, wait: WaitPolicy) -> Self {
        Self {
            service,
            marker: marker.into(),
            wait,
        }
    }

    /// Poll for the marker until it shows up or the settle deadline passes.
    async fn settle(&self, session: &dyn RenderSession) -> Result<Vec<String>, RenderError> {
        let deadline = Instant::now() + self.wait.settle_timeout;
        loop {
            let found = session.find_by_class(&self.marker).await?;
            if !found.is_empty() {
                return Ok(found);
            }
            if Instant::now() + self.wait.poll_interval > deadline {
                tracing::debug!(marker = %self.marker, "Marker never appeared, taking snapshot anyway");
                return Ok(found);
            }
            tokio::time::sleep(self.wait.poll_interval).await;
        }
    }

    async fn snapshot(&self, session: &dyn RenderSession) -> Result<FetchedPage, RenderError> {
        let by_class = self.settle(session).await?;
        let by_xpath = if by_class.is_empty() {
            session.find_by_xpath(&marker_xpath(&self.marker)).await?
        } else {
            Vec::new()
        };
        let markup = session.page_source().await?;
        let final_url = session.current_url().await?;

        Ok(FetchedPage {
            final_url,
            markup,
            dom: Some(DomSnapshot { by_class, by_xpath }),
        })
    }

    /// Navigate, settle and snapshot an already launched session.
    async fn drive(&self, session: &dyn RenderSession, url: &Url) -> Result<FetchedPage, RenderError> {
        let limit = self.wait.navigation_timeout;
        with_deadline(limit, session.navigate(url))
            .await
            .map_err(|_| RenderError::Navigation(format!("timed out after {} seconds", limit.as_secs())))??;

        let budget = self.wait.snapshot_budget();
        match with_deadline(budget, self.snapshot(session)).await {
            Ok(snapshot) => snapshot,
            Err(_) => Err(RenderError::Settle(budget.as_secs())),
        }
    }

    async fn render(&self, url: &Url) -> Result<FetchedPage, RenderError> {
        let budget = self.wait.launch_budget();
        let session = with_deadline(budget, self.service.launch(&self.wait))
            .await
            .map_err(|_| RenderError::Launch(format!("timed out after {} seconds", budget.as_secs())))??;

        let result = self.drive(session.as_ref(), url).await;

        if let Err(e) = session.close().await {
            tracing::warn!(url = %url, error = %e, "Failed to tear down rendering session");
        } else {
            tracing::debug!(url = %url, "Rendering session closed");
        }
        result
    }
}

#[async_trait]
impl PageFetcher for RenderedFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let start = Instant::now();
        tracing::debug!(url = %url, "Fetching page through rendering agent");

        let this = self.clone();
        let target = url.clone();
        let result = match tokio::spawn(async move { this.render(&target).await }).await {
            Ok(result) => result,
            Err(e) => Err(RenderError::Aborted(e.to_string())),
        };
        metrics::record_fetch(FetchMode::Rendered, result.is_ok(), start);

        match &result {
            Ok(page) => tracing::info!(
                url = %url,
                bytes = page.markup.len(),
                dom_elements = page.dom.as_ref().map(|d| d.by_class.len() + d.by_xpath.len()).unwrap_or(0),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Page rendered"
            ),
            Err(e) => tracing::warn!(url = %url, error = %e, "Rendered fetch failed"),
        }
        result.map_err(FetchError::from)
    }
}
