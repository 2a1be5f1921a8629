//! Page acquisition subsystem.
//!
//! # Data Flow
//! ```text
//! ExtractionRequest (validated URL)
//!     → http.rs      (direct GET, browser-like headers)        ─┐
//!     → rendered.rs  (rendering session, settle, DOM snapshot) ─┤
//!                                                               ▼
//!                                                         FetchedPage
//!                                                  (markup + optional DOM)
//! ```
//!
//! # Design Decisions
//! - One attempt per call; callers retry at a higher level if they want to
//! - Every fetch is bounded by an explicit timeout
//! - Transport resources (connections, browser sessions) never outlive a call
//! - Non-2xx is a failure, not an empty page

pub mod chromium;
pub mod http;
pub mod rendered;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub use self::http::HttpFetcher;
pub use self::rendered::{RenderService, RenderSession, RenderedFetcher, WaitPolicy};

/// Elements serialized from a live DOM while the rendering session was open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomSnapshot {
    /// Results of the class-name (CSS) query.
    pub by_class: Vec<String>,
    /// Results of the XPath query.
    pub by_xpath: Vec<String>,
}

/// Markup obtained by one fetch.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL after redirects.
    pub final_url: String,
    pub markup: String,
    /// Only present for rendered fetches.
    pub dom: Option<DomSnapshot>,
}

/// Which acquisition path to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    #[default]
    Http,
    Rendered,
}

impl FetchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchMode::Http => "http",
            FetchMode::Rendered => "rendered",
        }
    }
}

impl std::fmt::Display for FetchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures of the rendering agent.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Rendering is switched off in configuration.
    #[error("rendered fetch is disabled")]
    Disabled,

    /// The browser could not be found or launched.
    #[error("rendering agent failed to start: {0}")]
    Launch(String),

    /// Navigation failed or did not finish in time.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// The page did not settle within the wait policy.
    #[error("page did not settle within {0} seconds")]
    Settle(u64),

    /// A DOM query or page-source read failed.
    #[error("DOM query failed: {0}")]
    Query(String),

    /// The task driving the session panicked or was cancelled.
    #[error("rendering task ended abnormally: {0}")]
    Aborted(String),
}

/// Failures while acquiring page markup.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Upstream answered with a non-2xx status.
    #[error("upstream returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// The fetch did not complete within its deadline.
    #[error("fetch timed out after {0} seconds")]
    Timeout(u64),

    /// Connection, TLS, redirect or protocol failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The body could not be read or decoded.
    #[error("failed to read response body: {0}")]
    Body(String),

    /// Failure inside the rendering agent.
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// A way of turning a URL into markup.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch once, bounded by the fetcher's timeout.
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}
