//! Chromium rendering service using chromiumoxide.
//!
//! Every session gets its own browser process and a throwaway profile
//! directory, so concurrent renders share no cookies, cache or profile lock.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::Page;
use futures_util::StreamExt;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use url::Url;

use crate::config::RenderConfig;
use crate::fetch::rendered::{RenderService, RenderSession, WaitPolicy};
use crate::fetch::RenderError;

/// Hides the most common automation fingerprints before any page script runs.
const STEALTH_JS: &str = r#"
    Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
    Object.defineProperty(navigator, 'languages', { get: () => ['en-US', 'en'] });
    window.chrome = { runtime: {} };
"#;

/// Launches one headless Chromium per session.
#[derive(Debug, Clone)]
pub struct ChromiumRenderService {
    config: RenderConfig,
    user_agent: String,
}

impl ChromiumRenderService {
    pub fn new(config: RenderConfig, user_agent: impl Into<String>) -> Self {
        Self {
            config,
            user_agent: user_agent.into(),
        }
    }

    fn browser_config(&self, profile: &Path, step_timeout: Duration) -> Result<BrowserConfig, RenderError> {
        let args = [
            "--disable-blink-features=AutomationControlled".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--disable-infobars".to_string(),
            "--disable-extensions".to_string(),
            "--no-first-run".to_string(),
            format!(
                "--window-size={},{}",
                self.config.window_width, self.config.window_height
            ),
            format!("--user-agent={}", self.user_agent),
        ];

        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .viewport(Some(Viewport {
                width: self.config.window_width,
                height: self.config.window_height,
                device_scale_factor: Some(1.0),
                ..Default::default()
            }))
            .args(args)
            .user_data_dir(profile)
            .launch_timeout(step_timeout)
            .request_timeout(step_timeout);

        if !self.config.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &self.config.chrome_path {
            builder = builder.chrome_executable(path);
        }

        builder.build().map_err(RenderError::Launch)
    }
}

/// Create an empty profile directory, removed when the returned guard goes away.
fn fresh_profile() -> Result<TempDir, RenderError> {
    tempfile::Builder::new()
        .prefix("route-scraper-profile-")
        .tempdir()
        .map_err(|e| RenderError::Launch(format!("failed to create browser profile: {e}")))
}

#[async_trait]
impl RenderService for ChromiumRenderService {
    async fn launch(&self, wait: &WaitPolicy) -> Result<Box<dyn RenderSession>, RenderError> {
        let profile = fresh_profile()?;
        let config = self.browser_config(profile.path(), wait.navigation_timeout)?;
        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move { while handler.next().await.is_some() {} });
        tracing::debug!(profile = %profile.path().display(), "Chromium launched");

        match blank_page(&browser, wait.navigation_timeout).await {
            Ok(page) => Ok(Box::new(ChromiumSession {
                browser,
                page,
                handler,
                profile,
            })),
            Err(e) => {
                shutdown(&mut browser, &handler, profile).await;
                Err(e)
            }
        }
    }
}

async fn blank_page(browser: &Browser, limit: Duration) -> Result<Page, RenderError> {
    let page = match tokio::time::timeout(limit, browser.new_page("about:blank")).await {
        Ok(Ok(page)) => page,
        Ok(Err(e)) => return Err(RenderError::Launch(format!("failed to open page: {e}"))),
        Err(_) => {
            return Err(RenderError::Launch(format!(
                "opening a page timed out after {} seconds",
                limit.as_secs()
            )))
        }
    };

    if let Err(e) = page
        .execute(AddScriptToEvaluateOnNewDocumentParams::new(STEALTH_JS))
        .await
    {
        tracing::debug!(error = %e, "Stealth script injection failed");
    }
    Ok(page)
}

async fn shutdown(browser: &mut Browser, handler: &JoinHandle<()>, profile: TempDir) {
    if let Err(e) = browser.close().await {
        tracing::debug!(error = %e, "Browser close command failed");
    }
    if let Err(e) = browser.wait().await {
        tracing::debug!(error = %e, "Waiting for browser exit failed");
    }
    handler.abort();

    let path = profile.path().to_path_buf();
    if let Err(e) = profile.close() {
        tracing::warn!(profile = %path.display(), error = %e, "Failed to remove browser profile");
    }
}

struct ChromiumSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    profile: TempDir,
}

#[async_trait]
impl RenderSession for ChromiumSession {
    async fn navigate(&self, url: &Url) -> Result<(), RenderError> {
        self.page
            .goto(url.as_str())
            .await
            .map(|_| ())
            .map_err(|e| RenderError::Navigation(e.to_string()))
    }

    async fn find_by_class(&self, class: &str) -> Result<Vec<String>, RenderError> {
        let elements = self
            .page
            .find_elements(format!(".{class}"))
            .await
            .map_err(|e| RenderError::Query(e.to_string()))?;

        let mut html = Vec::with_capacity(elements.len());
        for element in elements {
            if let Some(outer) = element
                .outer_html()
                .await
                .map_err(|e| RenderError::Query(e.to_string()))?
            {
                html.push(outer);
            }
        }
        Ok(html)
    }

    async fn find_by_xpath(&self, expr: &str) -> Result<Vec<String>, RenderError> {
        let quoted = serde_json::to_string(expr).map_err(|e| RenderError::Query(e.to_string()))?;
        let script = format!(
            "(() => {{ const r = document.evaluate({quoted}, document, null, \
             XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); const out = []; \
             for (let i = 0; i < r.snapshotLength; i++) {{ out.push(r.snapshotItem(i).outerHTML); }} \
             return out; }})()"
        );
        self.page
            .evaluate(script.as_str())
            .await
            .map_err(|e| RenderError::Query(e.to_string()))?
            .into_value::<Vec<String>>()
            .map_err(|e| RenderError::Query(format!("unexpected XPath result: {e}")))
    }

    async fn page_source(&self) -> Result<String, RenderError> {
        self.page
            .content()
            .await
            .map_err(|e| RenderError::Query(e.to_string()))
    }

    async fn current_url(&self) -> Result<String, RenderError> {
        self.page
            .url()
            .await
            .map(|u| u.unwrap_or_default())
            .map_err(|e| RenderError::Query(e.to_string()))
    }

    async fn close(self: Box<Self>) -> Result<(), RenderError> {
        let ChromiumSession {
            mut browser,
            page,
            handler,
            profile,
        } = *self;
        drop(page);
        shutdown(&mut browser, &handler, profile).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_session_gets_its_own_profile() {
        let first = fresh_profile().unwrap();
        let second = fresh_profile().unwrap();
        assert_ne!(first.path(), second.path());
        assert!(first.path().is_dir());
        assert!(second.path().is_dir());

        let path = first.path().to_path_buf();
        first.close().unwrap();
        assert!(!path.exists());
    }
}
