use serde::{Deserialize, Serialize};

/// Variant label meaning "this product has no variant axis"
pub const NO_VARIANT: &str = "ÚNICO";

/// Where an image candidate was found on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageSource {
    StructuredData,
    HydrationPayload,
    HtmlImg,
    HtmlSource,
}

/// Image URL as found on the page, before normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCandidate {
    pub url: String,
    pub source: ImageSource,
}

impl ImageCandidate {
    pub fn new(url: impl Into<String>, source: ImageSource) -> Self {
        Self {
            url: url.into(),
            source,
        }
    }
}

/// One physical product resolved from a product detail page (pre-expansion)
///
/// `sku` and `name` are never empty: the resolvers fall back to the URL slug
/// and to the configured placeholder respectively. `variants` always holds at
/// least one label; [`NO_VARIANT`] when the page exposes no variation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub source_url: String,
    pub url_slug: String,
    pub sku: String,
    pub name: String,
    pub description: String,
    /// Two-decimal string ("1234.56") or empty when no tier produced a price
    pub price: String,
    pub brand: String,
    pub department: String,
    pub category: String,
    /// Absolute, deduplicated, at most `max_images` entries
    pub images: Vec<String>,
    pub variants: Vec<String>,
    /// Base used to name downloaded image files
    pub image_base_name: String,
    /// File names actually written to the image directory
    pub saved_images: Vec<String>,
}

/// Department/category pair resolved from breadcrumbs, keywords or defaults
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Taxonomy {
    pub department: String,
    pub category: String,
}

impl Taxonomy {
    pub fn new(department: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            department: department.into(),
            category: category.into(),
        }
    }

    /// A tier only wins when it produced both halves
    pub fn is_complete(&self) -> bool {
        !self.department.is_empty() && !self.category.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy_completeness() {
        assert!(Taxonomy::new("Auto Peças", "Pneus").is_complete());
        assert!(!Taxonomy::new("", "Pneus").is_complete());
        assert!(!Taxonomy::default().is_complete());
    }
}
