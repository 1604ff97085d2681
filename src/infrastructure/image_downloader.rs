//! Product image downloads
//!
//! Images are fetched one after another into the run's image directory and
//! named `{base}_{i}.jpg`, `i` being the 1-based position in the product's
//! image list. A failed image is logged and skipped; it never affects the
//! product or the other images.

#![allow(clippy::uninlined_format_args)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, warn};

use crate::infrastructure::config::{ImageNaming, ImagePolicy};
use crate::infrastructure::http_client::{DownloadChecks, HttpClient};
use crate::infrastructure::parsing::text::slugify;
use crate::infrastructure::scrape_error::ScrapeResult;

/// Base file name for a product's images under the given policy
pub fn image_base_name(policy: &ImagePolicy, sku: &str, name: &str) -> String {
    match policy.naming {
        ImageNaming::BaseSlug => format!(
            "images-{}-{}-{}",
            policy.base_prefix,
            sanitize_file_stem(sku),
            slugify(name)
        ),
        ImageNaming::SkuIndex => sanitize_file_stem(sku),
    }
}

/// File name of the `index`-th (1-based) image
pub fn image_file_name(base: &str, index: usize) -> String {
    format!("{}_{}.jpg", base, index)
}

/// Replace everything but ASCII alphanumerics, `-`, `_` and `.` with `_`
fn sanitize_file_stem(text: &str) -> String {
    let sanitized: String = text
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let sanitized = sanitized.trim_matches(|c| c == '.' || c == '_');

    if sanitized.is_empty() {
        "produto".to_string()
    } else {
        sanitized.to_string()
    }
}

/// Sequential downloader bound to one output directory
pub struct ImageDownloader {
    images_dir: PathBuf,
    timeout: Duration,
}

impl ImageDownloader {
    pub fn new(images_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            images_dir: images_dir.into(),
            timeout,
        }
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// Create the image directory if needed
    pub async fn prepare(&self) -> ScrapeResult<()> {
        tokio::fs::create_dir_all(&self.images_dir).await?;
        Ok(())
    }

    /// Download `urls` in order; returns the names of the files actually written
    pub async fn download_all(
        &self,
        client: &HttpClient,
        urls: &[String],
        base_name: &str,
        policy: &ImagePolicy,
    ) -> Vec<String> {
        let checks = DownloadChecks {
            image_content_type: policy.verify_content_type,
            min_bytes: policy.min_bytes,
        };

        let mut saved = Vec::new();
        for (index, url) in urls.iter().enumerate() {
            let file_name = image_file_name(base_name, index + 1);
            let target = self.images_dir.join(&file_name);

            match client.download_to_file(url, &target, self.timeout, checks).await {
                Ok(bytes) => {
                    debug!("Image {} saved as {} ({} bytes)", url, file_name, bytes);
                    saved.push(file_name);
                }
                Err(e) => warn!("⚠️ Skipping image {}: {}", url, e),
            }
        }

        saved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::{HttpConfig, defaults};
    use tempfile::TempDir;
    use wiremock::matchers::path;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_base_slug_naming() {
        let policy = ImagePolicy::default();
        let base = image_base_name(&policy, "PN-17570", "Pneu Aro 14 175/70");
        assert_eq!(base, "images-leadPOC-PN-17570-pneu-aro-14-17570");
        assert_eq!(image_file_name(&base, 2), "images-leadPOC-PN-17570-pneu-aro-14-17570_2.jpg");
    }

    #[test]
    fn test_base_slug_naming_flattens_path_separators_in_sku() {
        let base = image_base_name(&ImagePolicy::default(), "AB/12", "Camisa X");
        assert_eq!(base, "images-leadPOC-AB_12-camisa-x");
        assert!(!image_file_name(&base, 1).contains('/'));
    }

    #[test]
    fn test_sku_index_naming() {
        let policy = ImagePolicy {
            naming: ImageNaming::SkuIndex,
            ..ImagePolicy::default()
        };
        assert_eq!(image_base_name(&policy, "360112345", "Camiseta"), "360112345");
        assert_eq!(image_base_name(&policy, "AB 12/3", "x"), "AB_12_3");
        assert_eq!(image_base_name(&policy, "///", "x"), "produto");
    }

    #[tokio::test]
    async fn test_failed_image_keeps_its_index_gap() {
        let server = MockServer::start().await;
        Mock::given(path("/1.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1_u8; 64]))
            .mount(&server)
            .await;
        Mock::given(path("/2.jpg"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(path("/3.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![3_u8; 64]))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let client = HttpClient::new(HttpConfig::default(), Duration::ZERO).unwrap();
        let downloader = ImageDownloader::new(
            dir.path(),
            Duration::from_secs(defaults::IMAGE_TIMEOUT_SECONDS),
        );
        let urls: Vec<String> = (1..=3).map(|i| format!("{}/{i}.jpg", server.uri())).collect();

        let saved = downloader
            .download_all(&client, &urls, "ABC", &ImagePolicy::default())
            .await;

        assert_eq!(saved, vec!["ABC_1.jpg", "ABC_3.jpg"]);
        assert!(dir.path().join("ABC_1.jpg").exists());
        assert!(!dir.path().join("ABC_2.jpg").exists());
    }
}
