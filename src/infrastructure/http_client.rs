//! HTTP client for product pages and images
//!
//! One client per run: a pooled `reqwest` client with browser-like default
//! headers, a retry policy for transient failures and a `governor` limiter
//! that spaces product page fetches by the courtesy delay. Image downloads
//! are not rate limited.

#![allow(clippy::uninlined_format_args)]

use std::num::NonZeroU32;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use futures::StreamExt;
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, direct::NotKeyed},
};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, HeaderMap, HeaderValue, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::infrastructure::config::HttpConfig;
use crate::infrastructure::scrape_error::{ScrapeError, ScrapeResult};

/// Checks applied to a downloaded image before it is kept
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadChecks {
    /// Require an `image/*` content-type
    pub image_content_type: bool,
    /// Reject bodies smaller than this
    pub min_bytes: Option<u64>,
}

/// Rate-limited HTTP client with retry policy
pub struct HttpClient {
    client: Client,
    page_limiter: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    config: HttpConfig,
}

impl HttpClient {
    /// Create a client; `courtesy_delay` of zero disables page spacing
    pub fn new(config: HttpConfig, courtesy_delay: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_str(&config.accept).context("Invalid Accept header")?,
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language).context("Invalid Accept-Language header")?,
        );

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("Failed to create HTTP client")?;

        // One page per period, no burst
        let page_limiter = Quota::with_period(courtesy_delay)
            .map(|quota| quota.allow_burst(NonZeroU32::MIN))
            .map(RateLimiter::direct);

        Ok(Self {
            client,
            page_limiter,
            config,
        })
    }

    /// Page fetch timeout from configuration
    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.config.page_timeout_seconds)
    }

    /// Wait for the courtesy limiter before touching a product page
    pub async fn wait_for_page_slot(&self) {
        if let Some(limiter) = &self.page_limiter {
            limiter.until_ready().await;
        }
    }

    /// Fetch a product page body as text
    ///
    /// Honors the courtesy limiter, then retries transient failures.
    pub async fn fetch_page_html(&self, url: &str, timeout: Duration) -> ScrapeResult<String> {
        self.wait_for_page_slot().await;
        self.fetch_html_unlimited(url, timeout).await
    }

    /// Fetch a page body without consuming a courtesy slot
    ///
    /// Used for the fallback fetch after a failed render of the same page.
    pub async fn fetch_html_unlimited(&self, url: &str, timeout: Duration) -> ScrapeResult<String> {
        let response = self.get_with_policy(url, timeout).await?;

        let html = response
            .text()
            .await
            .map_err(|e| ScrapeError::fetch(url, None, format!("Failed to read body: {}", e)))?;

        if html.trim().is_empty() {
            return Err(ScrapeError::EmptyPage {
                url: url.to_string(),
            });
        }

        debug!("Fetched {} ({} bytes)", url, html.len());
        Ok(html)
    }

    /// GET with retries on retryable statuses and network errors
    ///
    /// Attempt `n` waits `backoff_base * 2^(n-1)` before the next one, or the
    /// server's `Retry-After` when that is longer.
    pub async fn get_with_policy(&self, url: &str, timeout: Duration) -> ScrapeResult<Response> {
        let max_attempts = self.config.max_retries.max(1);
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            debug!("🌐 HTTP GET (attempt {}/{}): {}", attempt, max_attempts, url);

            let mut delay = self.backoff_delay(attempt);
            match self.client.get(url).timeout(timeout).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    let error = ScrapeError::fetch(url, Some(status.as_u16()), format!("HTTP {}", status));
                    if !self.is_retryable(status) {
                        return Err(error);
                    }

                    warn!("⚠️ HTTP {} on attempt {}: {}", status, attempt, url);
                    if let Some(retry_after) = retry_after(&response) {
                        delay = delay.max(retry_after);
                    }
                    last_error = Some(error);
                }
                Err(e) => {
                    warn!("⚠️ Network error on attempt {} for {}: {}", attempt, url, e);
                    let status = e.status().map(|s| s.as_u16());
                    last_error = Some(ScrapeError::fetch(url, status, e));
                }
            }

            if attempt < max_attempts {
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error.unwrap_or_else(|| ScrapeError::fetch(url, None, "no attempt made")))
    }

    /// Stream a resource to `path`, returning the byte count
    ///
    /// The file is removed again on any failure, including a failed check.
    pub async fn download_to_file(
        &self,
        url: &str,
        path: &Path,
        timeout: Duration,
        checks: DownloadChecks,
    ) -> ScrapeResult<u64> {
        let result = self.download_to_file_inner(url, path, timeout, checks).await;
        if result.is_err() && fs::try_exists(path).await.unwrap_or(false) {
            if let Err(e) = fs::remove_file(path).await {
                warn!("Failed to remove partial file {:?}: {}", path, e);
            }
        }
        result
    }

    async fn download_to_file_inner(
        &self,
        url: &str,
        path: &Path,
        timeout: Duration,
        checks: DownloadChecks,
    ) -> ScrapeResult<u64> {
        let response = self
            .get_with_policy(url, timeout)
            .await
            .map_err(|e| ScrapeError::image_download(url, e))?;

        if checks.image_content_type {
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_ascii_lowercase();
            if !content_type.starts_with("image/") {
                return Err(ScrapeError::image_rejected(
                    url,
                    format!("content-type '{}' is not an image", content_type),
                ));
            }
        }

        let mut file = fs::File::create(path).await?;
        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ScrapeError::image_download(url, e))?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        if let Some(min_bytes) = checks.min_bytes {
            if written < min_bytes {
                return Err(ScrapeError::image_rejected(
                    url,
                    format!("{} bytes is below the {} byte minimum", written, min_bytes),
                ));
            }
        }

        info!("💾 Saved {} ({} bytes) from {}", path.display(), written, url);
        Ok(written)
    }

    fn is_retryable(&self, status: StatusCode) -> bool {
        self.config.retry_statuses.contains(&status.as_u16())
    }

    fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2_u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.config.backoff_base_ms.saturating_mul(factor))
    }
}

/// `Retry-After` in delta-seconds form
fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_config() -> HttpConfig {
        HttpConfig {
            backoff_base_ms: 10,
            ..HttpConfig::default()
        }
    }

    #[tokio::test]
    async fn test_http_client_creation() {
        let client = HttpClient::new(HttpConfig::default(), Duration::from_millis(500));
        assert!(client.is_ok());

        let client = HttpClient::new(HttpConfig::default(), Duration::ZERO).unwrap();
        assert!(client.page_limiter.is_none());
    }

    #[test]
    fn test_backoff_doubles() {
        let client = HttpClient::new(HttpConfig::default(), Duration::ZERO).unwrap();
        assert_eq!(client.backoff_delay(1), Duration::from_millis(500));
        assert_eq!(client.backoff_delay(2), Duration::from_millis(1000));
        assert_eq!(client.backoff_delay(3), Duration::from_millis(2000));
    }

    #[tokio::test]
    async fn test_retries_transient_status_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/produto"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/produto"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<h1>ok</h1>"))
            .mount(&server)
            .await;

        let client = HttpClient::new(fast_config(), Duration::ZERO).unwrap();
        let html = client
            .fetch_page_html(&format!("{}/produto", server.uri()), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(html, "<h1>ok</h1>");
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new(fast_config(), Duration::ZERO).unwrap();
        let err = client
            .fetch_page_html(&format!("{}/sumiu", server.uri()), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert_eq!(err.http_status(), Some(404));
    }

    #[tokio::test]
    async fn test_download_checks_remove_rejected_files() {
        let server = MockServer::start().await;
        Mock::given(path("/page.jpg"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string("<html></html>"),
            )
            .mount(&server)
            .await;
        Mock::given(path("/tiny.jpg"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/jpeg")
                    .set_body_bytes(vec![0_u8; 10]),
            )
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let client = HttpClient::new(fast_config(), Duration::ZERO).unwrap();
        let checks = DownloadChecks {
            image_content_type: true,
            min_bytes: Some(1024),
        };

        let target = dir.path().join("a.jpg");
        let err = client
            .download_to_file(&format!("{}/page.jpg", server.uri()), &target, Duration::from_secs(5), checks)
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::ImageRejected { .. }));
        assert!(!target.exists());

        let err = client
            .download_to_file(&format!("{}/tiny.jpg", server.uri()), &target, Duration::from_secs(5), checks)
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::ImageRejected { .. }));
        assert!(!target.exists());

        let written = client
            .download_to_file(
                &format!("{}/tiny.jpg", server.uri()),
                &target,
                Duration::from_secs(5),
                DownloadChecks::default(),
            )
            .await
            .unwrap();
        assert_eq!(written, 10);
        assert!(target.exists());
    }
}
