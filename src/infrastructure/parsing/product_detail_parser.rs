//! Product detail parser
//!
//! Runs every field resolver over one parsed page and assembles the
//! [`ProductRecord`]. SKU and name are resolved first because the brand,
//! taxonomy and image strategies read them.

#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use scraper::Html;
use tracing::debug;
use url::Url;

use super::ContextualParser;
use super::context::{ExtractionRules, PageContext};
use super::image_resolver::resolve_images;
use super::resolvers::{brand, description, name, price, sku, taxonomy, variants};
use super::text::url_slug;
use crate::domain::ProductRecord;
use crate::infrastructure::config::PlatformProfile;
use crate::infrastructure::image_downloader::image_base_name;

/// Parser for product detail pages of one platform profile
#[derive(Debug)]
pub struct ProductDetailParser {
    rules: ExtractionRules,
    max_images: usize,
}

impl ProductDetailParser {
    /// Compile a profile's selectors and patterns
    pub fn new(profile: &PlatformProfile, max_images: usize) -> Result<Self> {
        Ok(Self {
            rules: ExtractionRules::compile(profile)?,
            max_images,
        })
    }

    pub fn profile(&self) -> &PlatformProfile {
        &self.rules.profile
    }

    /// Parse raw HTML; the document never outlives this call
    pub fn parse_html(&self, html: &str, url: &Url) -> ProductRecord {
        let document = Html::parse_document(html);
        self.parse_with_context(&document, url)
    }
}

impl ContextualParser for ProductDetailParser {
    type Output = ProductRecord;
    type Context = Url;

    fn parse_with_context(&self, html: &Html, url: &Self::Context) -> Self::Output {
        debug!("Parsing product detail from: {} ({})", url, self.profile().name);

        let mut context = PageContext::new(url, html, &self.rules);

        context.sku = sku::resolve(&context);
        context.name = name::resolve(&context);

        let taxonomy = taxonomy::resolve(&context);
        let images = resolve_images(&context, self.max_images);

        let record = ProductRecord {
            source_url: url.to_string(),
            url_slug: url_slug(url.as_str()),
            price: price::resolve(&context),
            description: description::resolve(&context),
            brand: brand::resolve(&context),
            department: taxonomy.department,
            category: taxonomy.category,
            images,
            variants: variants::resolve(&context),
            image_base_name: image_base_name(&self.profile().images, &context.sku, &context.name),
            saved_images: Vec::new(),
            sku: context.sku,
            name: context.name,
        };

        debug!(
            "Extracted product {} '{}' with {} variant(s), {} image(s)",
            record.sku,
            record.name,
            record.variants.len(),
            record.images.len()
        );
        record
    }
}
