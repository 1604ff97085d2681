//! Parsing configuration for HTML extraction
//!
//! Centralized CSS selector lists used by the field resolvers. Every list is
//! tried in order; the first selector that yields usable text wins.

use serde::{Deserialize, Serialize};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| (*s).to_string()).collect()
}

/// CSS selectors for product detail pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSelectors {
    /// Headings holding the product name
    pub name: Vec<String>,

    /// Containers holding the long description
    pub description: Vec<String>,

    /// schema.org breadcrumb list items (`li[itemprop=itemListElement]`)
    pub schema_breadcrumb_items: Vec<String>,

    /// Generic breadcrumb anchors, joined into one selector group
    pub breadcrumb_links: Vec<String>,

    /// `<meta>` carrying the SKU in its `content` attribute
    pub sku_meta: Vec<String>,

    /// Variant option/radio/data-attribute selectors, grouped by axis order
    pub variant_options: Vec<String>,
}

impl Default for ExtractionSelectors {
    fn default() -> Self {
        Self {
            name: strings(&["div.product-name h1", "h1"]),
            description: strings(&[
                ".full-description",
                ".product-description",
                ".descriptions-text",
                ".productDetails",
                ".descricao",
            ]),
            schema_breadcrumb_items: strings(&[
                "ul[itemtype='http://schema.org/BreadcrumbList'] li[itemprop='itemListElement']",
                "ul[itemtype='https://schema.org/BreadcrumbList'] li[itemprop='itemListElement']",
                "ol[itemtype='http://schema.org/BreadcrumbList'] li[itemprop='itemListElement']",
                "ol[itemtype='https://schema.org/BreadcrumbList'] li[itemprop='itemListElement']",
            ]),
            breadcrumb_links: strings(&[
                "nav.breadcrumb a",
                ".breadcrumb a",
                ".breadcrumbs a",
                "a.breadcrumbs-href",
                ".breadcrumb-item a",
                ".breadcrumb-nav a",
                "[class*='breadcrumb'] a",
            ]),
            sku_meta: strings(&["meta[itemprop='sku']"]),
            variant_options: strings(&[
                "select[name*='tamanho'] option",
                "select[name*='size'] option",
                "[class*='tamanho'] option",
                "[class*='size'] option",
                "input[name*='tamanho'][type='radio']",
                "input[name*='size'][type='radio']",
                "[data-tamanho]",
                "[data-size]",
                "select[name*='cor'] option",
                "select[name*='color'] option",
                "input[name*='cor'][type='radio']",
                "input[name*='color'][type='radio']",
                "select[name*='voltagem'] option",
                "select[name*='voltage'] option",
                "input[name*='voltagem'][type='radio']",
                "[data-voltagem]",
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    #[test]
    fn test_default_selectors_compile() {
        let selectors = ExtractionSelectors::default();
        let all = selectors
            .name
            .iter()
            .chain(&selectors.description)
            .chain(&selectors.schema_breadcrumb_items)
            .chain(&selectors.breadcrumb_links)
            .chain(&selectors.sku_meta)
            .chain(&selectors.variant_options);

        for selector in all {
            assert!(Selector::parse(selector).is_ok(), "selector failed: {selector}");
        }
    }
}
