//! Page acquisition: browser rendering or plain fetch
//!
//! Profiles for client-rendered storefronts ask for a headless render; every
//! other page is fetched directly. A failed render falls back to exactly one
//! plain fetch of the same URL.

#![allow(clippy::uninlined_format_args)]

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::infrastructure::config::PlatformProfile;
use crate::infrastructure::http_client::HttpClient;
use crate::infrastructure::scrape_error::ScrapeResult;

#[cfg(feature = "browser")]
pub mod chromium;

#[cfg(feature = "browser")]
pub use chromium::ChromiumRenderer;

/// Produces the post-script DOM of a page
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Render `url` and return its serialized HTML
    ///
    /// Waits for any one of `wait_selectors` to attach before reading the DOM.
    async fn render(
        &self,
        url: &str,
        wait_selectors: &[String],
        timeout: Duration,
    ) -> ScrapeResult<String>;
}

/// Chooses between rendering and plain fetching per platform profile
pub struct RenderingDispatcher {
    renderer: Option<Box<dyn PageRenderer>>,
}

impl RenderingDispatcher {
    pub fn new(renderer: Option<Box<dyn PageRenderer>>) -> Self {
        Self { renderer }
    }

    /// Dispatcher without a browser; rendering profiles use the fallback fetch
    pub fn plain() -> Self {
        Self { renderer: None }
    }

    /// Headless Chromium when the `browser` feature is compiled in and enabled
    pub fn from_settings(use_browser: bool) -> Self {
        #[cfg(feature = "browser")]
        if use_browser {
            return Self::new(Some(Box::new(ChromiumRenderer::new())));
        }

        if use_browser {
            warn!("Browser rendering requested but the `browser` feature is not compiled in");
        }
        Self::plain()
    }

    pub fn has_renderer(&self) -> bool {
        self.renderer.is_some()
    }

    /// HTML of a product page according to its profile
    pub async fn acquire(
        &self,
        client: &HttpClient,
        url: &str,
        profile: &PlatformProfile,
    ) -> ScrapeResult<String> {
        let rendering = &profile.rendering;
        if !rendering.enabled {
            return client.fetch_page_html(url, client.page_timeout()).await;
        }

        let fallback_timeout = Duration::from_secs(rendering.fallback_timeout_seconds);
        let Some(renderer) = &self.renderer else {
            debug!("No renderer available for {} profile, fetching {}", profile.name, url);
            return client.fetch_page_html(url, fallback_timeout).await;
        };

        client.wait_for_page_slot().await;
        info!("🖥️ Rendering {} ({} profile)", url, profile.name);
        match renderer
            .render(url, &rendering.wait_selectors, Duration::from_millis(rendering.timeout_ms))
            .await
        {
            Ok(html) => Ok(html),
            Err(e) => {
                warn!("⚠️ Render failed, falling back to plain fetch: {}", e);
                client.fetch_html_unlimited(url, fallback_timeout).await
            }
        }
    }
}
