//! Per-URL scraping pipeline
//!
//! A [`ScrapeContext`] owns everything that lives for one run: the HTTP
//! client and its courtesy limiter, the rendering dispatcher, the compiled
//! parser of every platform profile and the image downloader. URLs are
//! processed strictly one after another.

#![allow(clippy::uninlined_format_args)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::domain::{OutputRow, expand_rows};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::http_client::HttpClient;
use crate::infrastructure::image_downloader::ImageDownloader;
use crate::infrastructure::parsing::ProductDetailParser;
use crate::infrastructure::renderer::RenderingDispatcher;
use crate::infrastructure::scrape_error::{ScrapeError, ScrapeResult};

/// Outcome of a whole run
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Rows of every product that succeeded, in input order
    pub rows: Vec<OutputRow>,
    pub succeeded: usize,
    pub failed: usize,
    /// Blank input lines
    pub skipped: usize,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.skipped
    }
}

/// Explicit state for one harvesting run
pub struct ScrapeContext {
    client: HttpClient,
    dispatcher: RenderingDispatcher,
    /// One compiled parser per entry of `config.profiles`, same order
    profile_parsers: Vec<ProductDetailParser>,
    default_parser: ProductDetailParser,
    downloader: ImageDownloader,
    config: AppConfig,
}

impl ScrapeContext {
    /// Build the run context, compiling every profile up front
    pub fn new(config: AppConfig, dispatcher: RenderingDispatcher) -> Result<Self> {
        let client = HttpClient::new(
            config.http.clone(),
            Duration::from_millis(config.run.courtesy_delay_ms),
        )?;

        let max_images = config.run.max_images;
        let profile_parsers = config
            .profiles
            .iter()
            .map(|profile| {
                ProductDetailParser::new(profile, max_images)
                    .with_context(|| format!("Invalid extraction rules in profile '{}'", profile.name))
            })
            .collect::<Result<Vec<_>>>()?;
        let default_parser = ProductDetailParser::new(&config.default_profile, max_images)
            .context("Invalid extraction rules in the default profile")?;

        let downloader = ImageDownloader::new(
            config.run.images_dir.clone(),
            Duration::from_secs(config.http.image_timeout_seconds),
        );

        info!(
            "Scrape context ready: {} profile(s), renderer {}",
            profile_parsers.len() + 1,
            if dispatcher.has_renderer() { "enabled" } else { "disabled" }
        );

        Ok(Self {
            client,
            dispatcher,
            profile_parsers,
            default_parser,
            downloader,
            config,
        })
    }

    /// Parser of the first profile whose domains match the URL host
    fn parser_for(&self, url: &Url) -> &ProductDetailParser {
        self.config
            .profile_index(url)
            .and_then(|index| self.profile_parsers.get(index))
            .unwrap_or(&self.default_parser)
    }

    /// Scrape one product page into its import rows
    ///
    /// Images that fail to download are left out of `_ImagensSalvas` but
    /// never fail the product.
    pub async fn scrape_product(&self, url: &str, launch_date: &str) -> ScrapeResult<Vec<OutputRow>> {
        let parsed_url = Url::parse(url).map_err(|e| ScrapeError::invalid_url(url, e))?;
        if !matches!(parsed_url.scheme(), "http" | "https") {
            return Err(ScrapeError::invalid_url(url, "only http(s) URLs are supported"));
        }

        let parser = self.parser_for(&parsed_url);
        let profile = parser.profile();
        debug!("Using profile '{}' for {}", profile.name, url);

        let html = self.dispatcher.acquire(&self.client, url, profile).await?;
        if html.trim().is_empty() {
            return Err(ScrapeError::EmptyPage {
                url: url.to_string(),
            });
        }

        let mut record = parser.parse_html(&html, &parsed_url);
        record.saved_images = self
            .downloader
            .download_all(&self.client, &record.images, &record.image_base_name, &profile.images)
            .await;

        info!(
            "✅ {} '{}': {} variant(s), {}/{} image(s) saved",
            record.sku,
            record.name,
            record.variants.len(),
            record.saved_images.len(),
            record.images.len()
        );

        Ok(expand_rows(&record, &self.config.mappings, launch_date))
    }

    /// Process every URL in order; failures are logged and counted
    pub async fn run(&self, urls: &[String]) -> Result<RunSummary> {
        self.downloader
            .prepare()
            .await
            .with_context(|| format!("Failed to create image directory {:?}", self.downloader.images_dir()))?;

        let launch_date = chrono::Local::now()
            .format(&self.config.run.launch_date_format)
            .to_string();
        let started = Instant::now();
        let mut summary = RunSummary::default();

        info!("🚀 Starting run over {} URL(s)", urls.len());
        for (index, url) in urls.iter().enumerate() {
            let url = url.trim();
            if url.is_empty() {
                summary.skipped += 1;
                continue;
            }

            info!("[{}/{}] {}", index + 1, urls.len(), url);
            match self.scrape_product(url, &launch_date).await {
                Ok(rows) => {
                    summary.succeeded += 1;
                    summary.rows.extend(rows);
                }
                Err(e) if e.is_fatal() => return Err(e).context("Run aborted"),
                Err(e) => {
                    summary.failed += 1;
                    match e {
                        ScrapeError::InvalidUrl { .. } => warn!("⚠️ Skipping {}: {}", url, e),
                        _ => error!("❌ Failed to scrape {}: {}", url, e),
                    }
                }
            }
        }

        info!(
            "🏁 Run finished in {:.1}s: {} ok, {} failed, {} blank, {} row(s)",
            started.elapsed().as_secs_f64(),
            summary.succeeded,
            summary.failed,
            summary.skipped,
            summary.rows.len()
        );
        Ok(summary)
    }
}
