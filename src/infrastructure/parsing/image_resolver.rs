//! Product image resolution
//!
//! Candidates are collected from every source in a fixed order, cleaned,
//! made absolute, deduplicated, narrowed to the ones that look like they
//! belong to the product's SKU, and capped.

#![allow(clippy::uninlined_format_args)]

use std::collections::HashSet;

use scraper::Selector;
use tracing::debug;

use super::context::PageContext;
use super::text::resolve_url;
use crate::domain::{ImageCandidate, ImageSource};

/// Best URL of a `srcset`: the largest `w` or `x` descriptor, else the first entry
pub fn best_srcset_url(srcset: &str) -> Option<String> {
    let mut best: Option<(&str, f64)> = None;
    let mut first: Option<&str> = None;

    for entry in srcset.split(',') {
        let mut parts = entry.split_whitespace();
        let Some(url) = parts.next() else {
            continue;
        };
        first.get_or_insert(url);

        let score = parts.next().and_then(|descriptor| {
            let descriptor = descriptor.to_ascii_lowercase();
            descriptor
                .strip_suffix('w')
                .or_else(|| descriptor.strip_suffix('x'))
                .and_then(|number| number.parse::<f64>().ok())
                .filter(|number| number.is_finite())
        });

        if let Some(score) = score {
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((url, score));
            }
        }
    }

    best.map(|(url, _)| url).or(first).map(str::to_string)
}

/// All image candidates of a page, in collection order
///
/// Structured data, then the hydration payload, then every `<img>`
/// (`src`, `data-src`, best `srcset` entry), then every `<source srcset>`.
pub fn collect_candidates(context: &PageContext<'_>) -> Vec<ImageCandidate> {
    let mut candidates = Vec::new();

    if let Some(product) = &context.json_ld {
        candidates.extend(
            product
                .images()
                .into_iter()
                .map(|url| ImageCandidate::new(url, ImageSource::StructuredData)),
        );
    }

    if let Some(payload) = &context.hydration {
        candidates.extend(
            payload
                .image_urls()
                .into_iter()
                .map(|url| ImageCandidate::new(url, ImageSource::HydrationPayload)),
        );
    }

    if let Ok(img) = Selector::parse("img") {
        for element in context.document.select(&img) {
            let attrs = element.value();
            let url = [attrs.attr("src"), attrs.attr("data-src")]
                .into_iter()
                .flatten()
                .map(str::trim)
                .find(|url| !url.is_empty())
                .map(str::to_string)
                .or_else(|| attrs.attr("srcset").and_then(best_srcset_url));
            if let Some(url) = url {
                candidates.push(ImageCandidate::new(url, ImageSource::HtmlImg));
            }
        }
    }

    if let Ok(source) = Selector::parse("source[srcset]") {
        for element in context.document.select(&source) {
            if let Some(url) = element.value().attr("srcset").and_then(best_srcset_url) {
                candidates.push(ImageCandidate::new(url, ImageSource::HtmlSource));
            }
        }
    }

    candidates
}

/// Inline data and lazy-loading placeholders are never product images
fn is_placeholder(url: &str) -> bool {
    url.trim_start().to_ascii_lowercase().starts_with("data:")
        || url.to_lowercase().contains("blank")
}

/// Clean, absolutize and deduplicate candidates, preserving first-seen order
pub fn normalize_candidates(context: &PageContext<'_>, candidates: &[ImageCandidate]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ordered = Vec::new();

    for candidate in candidates {
        if is_placeholder(&candidate.url) {
            continue;
        }
        let Some(absolute) = resolve_url(context.url, &candidate.url) else {
            debug!("Dropping unresolvable image URL: {}", candidate.url);
            continue;
        };
        let absolute = String::from(absolute);
        if seen.insert(absolute.clone()) {
            ordered.push(absolute);
        }
    }

    ordered
}

/// URLs mentioning the SKU or one of its first two `-` segments; when none
/// do, the first `max_images` URLs unfiltered. Always capped at `max_images`.
pub fn select_relevant(urls: &[String], sku: &str, max_images: usize) -> Vec<String> {
    let mut needles: Vec<&str> = vec![sku];
    needles.extend(sku.split('-').take(2));
    needles.retain(|needle| !needle.is_empty());

    let relevant: Vec<String> = urls
        .iter()
        .filter(|url| needles.iter().any(|needle| url.contains(needle)))
        .take(max_images)
        .cloned()
        .collect();

    if relevant.is_empty() {
        urls.iter().take(max_images).cloned().collect()
    } else {
        relevant
    }
}

/// Final image list for a page whose SKU is already resolved
pub fn resolve_images(context: &PageContext<'_>, max_images: usize) -> Vec<String> {
    let candidates = collect_candidates(context);
    let normalized = normalize_candidates(context, &candidates);
    let selected = select_relevant(&normalized, &context.sku, max_images);

    debug!(
        "Images: {} candidates, {} unique, {} selected",
        candidates.len(),
        normalized.len(),
        selected.len()
    );
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::parsing::resolvers::test_support::Page;

    #[test]
    fn test_best_srcset_url() {
        assert_eq!(
            best_srcset_url("a.jpg 320w, b.jpg 1280w, c.jpg 640w").as_deref(),
            Some("b.jpg")
        );
        assert_eq!(best_srcset_url("a.jpg 1x, b.jpg 2x").as_deref(), Some("b.jpg"));
        assert_eq!(best_srcset_url("a.jpg, b.jpg").as_deref(), Some("a.jpg"));
        assert_eq!(best_srcset_url(" , "), None);
    }

    #[test]
    fn test_collection_order_and_sources() {
        let page = Page::default_profile(
            r#"<script type="application/ld+json">{"@type":"Product","image":"/ld.jpg"}</script>
               <script id="__NEXT_DATA__" type="application/json">{"imageUrl":"/next.jpg"}</script>
               <img data-src="/lazy.jpg"><img srcset="/s1.jpg 1x, /s2.jpg 2x">
               <picture><source srcset="/pic.webp 800w"></picture>"#,
        );
        let context = page.context();
        let candidates = collect_candidates(&context);

        let summary: Vec<(&str, ImageSource)> = candidates
            .iter()
            .map(|c| (c.url.as_str(), c.source))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("/ld.jpg", ImageSource::StructuredData),
                ("/next.jpg", ImageSource::HydrationPayload),
                ("/lazy.jpg", ImageSource::HtmlImg),
                ("/s2.jpg", ImageSource::HtmlImg),
                ("/pic.webp", ImageSource::HtmlSource),
            ]
        );
    }

    #[test]
    fn test_normalization_drops_placeholders_and_duplicates() {
        let page = Page::default_profile(
            r#"<img src="data:image/gif;base64,R0lGOD"><img src="/img/Blank.gif">
               <img src="/img/a.jpg"><img src="https://www.loja.example/img/a.jpg">
               <img src="/img/b.jpg">"#,
        );
        let context = page.context();
        let urls = normalize_candidates(&context, &collect_candidates(&context));
        assert_eq!(
            urls,
            vec![
                "https://www.loja.example/img/a.jpg",
                "https://www.loja.example/img/b.jpg",
            ]
        );
    }

    #[test]
    fn test_sku_relevance_filter() {
        let urls: Vec<String> = [
            "https://cdn/logo.png",
            "https://cdn/360112345_01.jpg",
            "https://cdn/banner.jpg",
            "https://cdn/360112345_02.jpg",
        ]
        .iter()
        .map(|s| (*s).to_string())
        .collect();

        assert_eq!(
            select_relevant(&urls, "360112345", 5),
            vec!["https://cdn/360112345_01.jpg", "https://cdn/360112345_02.jpg"]
        );
        // Segment match: "360112345-99" shares its first segment with the files
        assert_eq!(select_relevant(&urls, "360112345-99", 5).len(), 2);
    }

    #[test]
    fn test_no_sku_match_keeps_first_unfiltered() {
        let urls: Vec<String> = (1..=8).map(|i| format!("https://cdn/foto{i}.jpg")).collect();
        let selected = select_relevant(&urls, "XYZ-0", 5);
        assert_eq!(selected, urls[..5].to_vec());
    }

    #[test]
    fn test_cap_and_uniqueness() {
        let images: String = (1..=9)
            .map(|i| format!(r#"<img src="/p/ABC-{i}.jpg"><img src="/p/ABC-{i}.jpg">"#))
            .collect();
        let page = Page::default_profile(&images);
        let mut context = page.context();
        context.sku = "ABC".to_string();

        let selected = resolve_images(&context, 5);
        assert_eq!(selected.len(), 5);
        let unique: HashSet<&String> = selected.iter().collect();
        assert_eq!(unique.len(), 5);
    }
}
