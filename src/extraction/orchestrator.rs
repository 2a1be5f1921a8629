//! Extraction orchestration.
//!
//! # Responsibilities
//! - Validate the target URL before any I/O
//! - Pick the fetcher for the requested mode and run it once
//! - Feed the page through the matcher cascade and deduplicate
//! - Apply the deployment's fetch-failure policy
//!
//! # Design Decisions
//! - Fetch failures surface as errors unless `degrade_to_empty` is set
//! - Validation failures are never degraded
//! - A successfully fetched page without the marker yields an empty set
//! - No retries; no placeholder data on failure

use std::sync::Arc;

use crate::config::ScraperConfig;
use crate::extraction::error::{ExtractionError, SetupError};
use crate::extraction::fragment::FragmentSet;
use crate::extraction::matcher::{FragmentMatcher, MatchInput};
use crate::extraction::request::ExtractionRequest;
use crate::fetch::chromium::ChromiumRenderService;
use crate::fetch::{FetchError, FetchMode, HttpFetcher, PageFetcher, RenderError, RenderedFetcher, WaitPolicy};
use crate::observability::metrics;

/// Validates, fetches, matches and deduplicates.
pub struct Extractor {
    matcher: FragmentMatcher,
    allowed_hosts: Vec<String>,
    http: Arc<dyn PageFetcher>,
    rendered: Option<Arc<dyn PageFetcher>>,
    degrade_to_empty: bool,
}

impl Extractor {
    pub fn new(matcher: FragmentMatcher, allowed_hosts: Vec<String>, http: Arc<dyn PageFetcher>) -> Self {
        Self {
            matcher,
            allowed_hosts,
            http,
            rendered: None,
            degrade_to_empty: false,
        }
    }

    /// Enable the rendered path.
    pub fn with_rendered(mut self, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.rendered = Some(fetcher);
        self
    }

    /// Turn fetch and render failures into empty results.
    pub fn degrade_to_empty(mut self, degrade: bool) -> Self {
        self.degrade_to_empty = degrade;
        self
    }

    /// Build the production pipeline: reqwest for HTTP, Chromium for rendering.
    pub fn from_config(config: &ScraperConfig) -> Result<Self, SetupError> {
        let matcher = FragmentMatcher::new(&config.target.marker_class)?;
        let http = Arc::new(HttpFetcher::new(&config.fetch)?);

        let mut extractor = Self::new(matcher, config.target.allowed_hosts.clone(), http)
            .degrade_to_empty(config.fetch.degrade_to_empty);

        if config.render.enabled {
            let service = ChromiumRenderService::new(config.render.clone(), config.fetch.user_agent.clone());
            let fetcher = RenderedFetcher::new(
                Arc::new(service),
                config.target.marker_class.clone(),
                WaitPolicy::from_config(&config.render),
            );
            extractor = extractor.with_rendered(Arc::new(fetcher));
        }
        Ok(extractor)
    }

    pub fn matcher(&self) -> &FragmentMatcher {
        &self.matcher
    }

    pub fn validate(&self, raw_url: &str) -> Result<ExtractionRequest, ExtractionError> {
        Ok(ExtractionRequest::parse(raw_url, &self.allowed_hosts)?)
    }

    /// Validate `raw_url` and extract its route fragments.
    pub async fn extract(&self, raw_url: &str, mode: FetchMode) -> Result<FragmentSet, ExtractionError> {
        let request = self.validate(raw_url)?;
        self.extract_request(&request, mode).await
    }

    pub async fn extract_request(
        &self,
        request: &ExtractionRequest,
        mode: FetchMode,
    ) -> Result<FragmentSet, ExtractionError> {
        let fetcher = match mode {
            FetchMode::Http => &self.http,
            FetchMode::Rendered => self.rendered.as_ref().ok_or(RenderError::Disabled)?,
        };

        let page = match fetcher.fetch(request.url()).await {
            Ok(page) => page,
            Err(e) => return self.fetch_failed(request, mode, e),
        };

        let Some(outcome) = self.matcher.run(&MatchInput::from(&page)) else {
            tracing::info!(url = %request.url(), mode = %mode, "No route fragments found");
            return Ok(FragmentSet::empty());
        };

        let found = outcome.fragments.len();
        let fragments = FragmentSet::dedupe(outcome.fragments);
        metrics::record_fragments(outcome.strategy, fragments.len());
        tracing::info!(
            url = %request.url(),
            mode = %mode,
            strategy = outcome.strategy,
            found,
            unique = fragments.len(),
            "Route fragments extracted"
        );
        Ok(fragments)
    }

    fn fetch_failed(
        &self,
        request: &ExtractionRequest,
        mode: FetchMode,
        err: FetchError,
    ) -> Result<FragmentSet, ExtractionError> {
        if self.degrade_to_empty {
            tracing::warn!(
                url = %request.url(),
                mode = %mode,
                error = %err,
                "Fetch failed, returning empty result"
            );
            return Ok(FragmentSet::empty());
        }
        Err(err.into())
    }
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("marker", &self.matcher.marker())
            .field("allowed_hosts", &self.allowed_hosts)
            .field("rendered", &self.rendered.is_some())
            .field("degrade_to_empty", &self.degrade_to_empty)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::matcher::DEFAULT_MARKER;
    use crate::fetch::{DomSnapshot, FetchedPage};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use url::Url;

    /// Canned fetcher that counts calls.
    struct StubFetcher {
        calls: AtomicUsize,
        reply: fn() -> Result<FetchedPage, FetchError>,
    }

    impl StubFetcher {
        fn new(reply: fn() -> Result<FetchedPage, FetchError>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                reply,
            })
        }
    }

    #[async_trait]
    impl PageFetcher for StubFetcher {
        async fn fetch(&self, _url: &Url) -> Result<FetchedPage, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.reply)()
        }
    }

    fn page(markup: &str) -> FetchedPage {
        FetchedPage {
            final_url: "https://moovitapp.com/route".into(),
            markup: markup.into(),
            dom: None,
        }
    }

    fn extractor(http: Arc<StubFetcher>) -> Extractor {
        Extractor::new(
            FragmentMatcher::new(DEFAULT_MARKER).unwrap(),
            vec!["moovitapp.com".into()],
            http,
        )
    }

    const URL: &str = "https://moovitapp.com/tripplan/a/b";

    #[tokio::test]
    async fn test_extracts_and_dedupes() {
        let http = StubFetcher::new(|| {
            Ok(page(concat!(
                r#"<div class="route-inner"><span>X</span></div>"#,
                r#"<div class="route-inner"><span>X</span></div>"#,
                r#"<div class="route-inner"><span>Y</span></div>"#,
            )))
        });
        let result = extractor(http.clone()).extract(URL, FetchMode::Http).await.unwrap();
        assert_eq!(
            result.into_strings(),
            vec![
                r#"<div class="route-inner"><span>X</span></div>"#.to_string(),
                r#"<div class="route-inner"><span>Y</span></div>"#.to_string(),
            ]
        );
        assert_eq!(http.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_validation_happens_before_fetch() {
        let http = StubFetcher::new(|| Ok(page("")));
        let ex = extractor(http.clone());

        for bad in ["", "not a url", "https://example.com/route", "file:///etc/passwd"] {
            let err = ex.extract(bad, FetchMode::Http).await.unwrap_err();
            assert!(err.is_validation(), "{bad} should fail validation");
        }
        assert_eq!(http.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_marker_absent_is_empty_success() {
        let http = StubFetcher::new(|| Ok(page("<html><body>captcha</body></html>")));
        let result = extractor(http).extract(URL, FetchMode::Http).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_upstream_503_surfaces() {
        let http = StubFetcher::new(|| {
            Err(FetchError::Status {
                status: 503,
                url: URL.into(),
            })
        });
        let err = extractor(http).extract(URL, FetchMode::Http).await.unwrap_err();
        assert!(matches!(err, ExtractionError::Fetch(FetchError::Status { status: 503, .. })));
    }

    #[tokio::test]
    async fn test_degrade_policy_returns_empty() {
        let http = StubFetcher::new(|| Err(FetchError::Timeout(30)));
        let ex = extractor(http).degrade_to_empty(true);
        assert!(ex.extract(URL, FetchMode::Http).await.unwrap().is_empty());

        // Validation is never degraded
        assert!(ex.extract("https://example.com", FetchMode::Http).await.is_err());
    }

    #[tokio::test]
    async fn test_rendered_disabled() {
        let http = StubFetcher::new(|| Ok(page("")));
        let err = extractor(http.clone()).extract(URL, FetchMode::Rendered).await.unwrap_err();
        assert!(matches!(err, ExtractionError::Render(RenderError::Disabled)));
        assert_eq!(http.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rendered_path_uses_dom_snapshot() {
        let http = StubFetcher::new(|| Ok(page("")));
        let rendered = StubFetcher::new(|| {
            Ok(FetchedPage {
                final_url: URL.into(),
                markup: "<html><body><div id=app></div></body></html>".into(),
                dom: Some(DomSnapshot {
                    by_class: vec![r#"<div class="route-inner"><div>1</div></div>"#.into()],
                    by_xpath: Vec::new(),
                }),
            })
        });
        let ex = extractor(http.clone()).with_rendered(rendered.clone());
        let result = ex.extract(URL, FetchMode::Rendered).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(http.calls.load(Ordering::SeqCst), 0);
        assert_eq!(rendered.calls.load(Ordering::SeqCst), 1);
    }
}
