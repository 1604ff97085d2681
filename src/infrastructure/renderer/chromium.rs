//! Headless Chromium renderer for client-rendered storefronts

#![allow(clippy::uninlined_format_args)]

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tracing::{debug, warn};

use super::PageRenderer;
use crate::infrastructure::scrape_error::{ScrapeError, ScrapeResult};

/// Longest wait for any single content selector
const SELECTOR_WAIT: Duration = Duration::from_secs(4);
const POLL_INTERVAL: Duration = Duration::from_millis(250);
/// Settling time after `readyState` turns complete, standing in for network idle
const QUIET_PERIOD: Duration = Duration::from_millis(500);

/// Launches a fresh headless browser per render and closes it afterwards
#[derive(Debug, Default)]
pub struct ChromiumRenderer;

impl ChromiumRenderer {
    pub const fn new() -> Self {
        Self
    }

    async fn launch(url: &str) -> ScrapeResult<Browser> {
        let config = BrowserConfig::builder()
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .build()
            .map_err(|e| ScrapeError::render(url, format!("failed to build browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScrapeError::render(url, format!("failed to launch Chromium: {}", e)))?;

        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(browser)
    }

    async fn evaluate_bool(page: &Page, script: &str) -> bool {
        match page.evaluate(script).await {
            Ok(result) => result.into_value::<bool>().unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Best-effort wait for the load to settle; never fails
    async fn wait_until_settled(page: &Page, timeout: Duration) {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if Self::evaluate_bool(page, "document.readyState === 'complete'").await {
                tokio::time::sleep(QUIET_PERIOD).await;
                return;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
        debug!("Page did not reach readyState=complete within {:?}", timeout);
    }

    /// Wait for any of the selectors to attach, trying each for up to four seconds
    async fn wait_for_any_selector(page: &Page, selectors: &[String]) {
        for selector in selectors {
            let Ok(literal) = serde_json::to_string(selector) else {
                continue;
            };
            let script = format!("document.querySelector({}) !== null", literal);

            let deadline = Instant::now() + SELECTOR_WAIT;
            while Instant::now() < deadline {
                if Self::evaluate_bool(page, &script).await {
                    debug!("Selector attached: {}", selector);
                    return;
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
            debug!("Selector not found within {:?}: {}", SELECTOR_WAIT, selector);
        }
    }

    async fn render_in(
        browser: &Browser,
        url: &str,
        wait_selectors: &[String],
        timeout: Duration,
    ) -> ScrapeResult<String> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScrapeError::render(url, format!("failed to open page: {}", e)))?;

        match tokio::time::timeout(timeout, page.goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(ScrapeError::render(url, format!("navigation failed: {}", e))),
            Err(_) => {
                return Err(ScrapeError::render(
                    url,
                    format!("navigation timed out after {:?}", timeout),
                ));
            }
        }

        Self::wait_until_settled(&page, timeout).await;
        Self::wait_for_any_selector(&page, wait_selectors).await;

        let html: String = page
            .evaluate("document.documentElement.outerHTML")
            .await
            .map_err(|e| ScrapeError::render(url, format!("failed to read HTML: {}", e)))?
            .into_value()
            .map_err(|e| ScrapeError::render(url, format!("failed to convert HTML: {:?}", e)))?;

        if html.trim().is_empty() {
            return Err(ScrapeError::EmptyPage {
                url: url.to_string(),
            });
        }
        Ok(html)
    }
}

#[async_trait]
impl PageRenderer for ChromiumRenderer {
    async fn render(
        &self,
        url: &str,
        wait_selectors: &[String],
        timeout: Duration,
    ) -> ScrapeResult<String> {
        let mut browser = Self::launch(url).await?;
        let result = Self::render_in(&browser, url, wait_selectors, timeout).await;

        if let Err(e) = browser.close().await {
            warn!("Failed to close browser cleanly: {}", e);
        }
        let _ = browser.wait().await;

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires Chromium to be installed
    async fn test_render_data_url() {
        let renderer = ChromiumRenderer::new();
        let html = renderer
            .render(
                "data:text/html,<h1>Camiseta</h1>",
                &["h1".to_string()],
                Duration::from_secs(10),
            )
            .await
            .expect("render failed");
        assert!(html.contains("<h1>Camiseta</h1>"));
    }
}
