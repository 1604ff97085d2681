//! Parsing context for product detail pages
//!
//! [`ExtractionRules`] is a platform profile with every selector and pattern
//! compiled once per run. [`PageContext`] bundles one parsed page with those
//! rules and the structured-data readers' results, so each field strategy
//! receives a single argument.

#![allow(clippy::uninlined_format_args)]

use std::cell::OnceCell;

use anyhow::{Result, anyhow};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::warn;
use url::Url;

use super::structured_data::{HydrationPayload, JsonLdProduct, read_hydration, read_json_ld};
use super::text::{collapse_whitespace, currency_regex, page_text};
use crate::infrastructure::config::PlatformProfile;

/// Platform profile with selectors and patterns compiled
#[derive(Debug)]
pub struct ExtractionRules {
    pub profile: PlatformProfile,

    pub name_selectors: Vec<Selector>,
    pub description_selectors: Vec<Selector>,
    pub schema_breadcrumb_items: Vec<Selector>,
    /// Generic breadcrumb anchors as one selector group (document order)
    pub breadcrumb_links: Option<Selector>,
    pub sku_meta_selectors: Vec<Selector>,
    pub variant_selectors: Vec<Selector>,

    /// Per-item name lookups inside a schema.org breadcrumb entry
    pub crumb_strong: Selector,
    pub crumb_name: Selector,
    pub crumb_link: Selector,

    pub currency: Regex,
    pub sku_label: Regex,
    pub brand_label: Regex,
    pub size_list: Regex,
}

impl ExtractionRules {
    /// Compile every selector and pattern of a profile
    pub fn compile(profile: &PlatformProfile) -> Result<Self> {
        let selectors = &profile.selectors;

        let link_selectors = Self::compile_selectors(&selectors.breadcrumb_links)?;
        let breadcrumb_links = if link_selectors.is_empty() {
            None
        } else {
            let valid: Vec<&str> = selectors
                .breadcrumb_links
                .iter()
                .filter(|s| Selector::parse(s).is_ok())
                .map(String::as_str)
                .collect();
            Some(Self::parse_selector(&valid.join(", "))?)
        };

        Ok(Self {
            name_selectors: Self::compile_selectors(&selectors.name)?,
            description_selectors: Self::compile_selectors(&selectors.description)?,
            schema_breadcrumb_items: Self::compile_selectors(&selectors.schema_breadcrumb_items)?,
            breadcrumb_links,
            sku_meta_selectors: Self::compile_selectors(&selectors.sku_meta)?,
            variant_selectors: Self::compile_selectors(&selectors.variant_options)?,

            crumb_strong: Self::parse_selector("strong")?,
            crumb_name: Self::parse_selector("span[itemprop='name']")?,
            crumb_link: Self::parse_selector("a")?,

            currency: currency_regex(&profile.currency_symbol)?,
            sku_label: Regex::new(r"(?i)\b(?:Ref\.?|Refer[eê]ncia)[:\s]+([A-Z0-9\-./]+)")?,
            brand_label: Regex::new(&format!(
                r"(?i){}[:\-]\s*(.+)",
                regex::escape(&profile.brand_label)
            ))?,
            size_list: Self::size_list_regex(&profile.size_labels, &profile.size_tokens)?,

            profile: profile.clone(),
        })
    }

    /// Compile selector strings, skipping invalid ones with a warning
    fn compile_selectors(selector_strings: &[String]) -> Result<Vec<Selector>> {
        let mut selectors = Vec::new();
        let mut errors = Vec::new();

        for selector_str in selector_strings {
            match Selector::parse(selector_str) {
                Ok(selector) => selectors.push(selector),
                Err(e) => {
                    warn!("Failed to compile selector '{}': {}", selector_str, e);
                    errors.push(format!("'{}': {}", selector_str, e));
                }
            }
        }

        if selectors.is_empty() && !selector_strings.is_empty() {
            return Err(anyhow!(
                "No valid selectors compiled from {} attempts. Errors: {}",
                selector_strings.len(),
                errors.join(", ")
            ));
        }

        Ok(selectors)
    }

    fn parse_selector(selector: &str) -> Result<Selector> {
        Selector::parse(selector).map_err(|e| anyhow!("Invalid selector '{}': {}", selector, e))
    }

    /// `Tamanho: PP P M G` style size lists; two or three digit sizes always count
    fn size_list_regex(labels: &[String], tokens: &[String]) -> Result<Regex> {
        let labels: Vec<String> = labels.iter().map(|l| regex::escape(l)).collect();

        let mut tokens: Vec<&String> = tokens.iter().collect();
        // Longest first so "XGG" is not read as "XG"
        tokens.sort_by_key(|t| std::cmp::Reverse(t.len()));
        let mut alternatives: Vec<String> = tokens.iter().map(|t| regex::escape(t)).collect();
        alternatives.push(r"\d{2,3}".to_string());
        let token = format!(r"(?:{})\b", alternatives.join("|"));

        Ok(Regex::new(&format!(
            r"(?i)\b(?:{})\b[:\s]+({token}(?:\s+{token})*)",
            labels.join("|")
        ))?)
    }
}

/// One parsed page plus everything the field strategies read from it
pub struct PageContext<'a> {
    pub url: &'a Url,
    pub document: &'a Html,
    pub rules: &'a ExtractionRules,

    pub json_ld: Option<JsonLdProduct>,
    pub hydration: Option<HydrationPayload>,

    /// Resolved name, filled in before the chains that depend on it run
    pub name: String,
    /// Resolved SKU, filled in before the chains that depend on it run
    pub sku: String,

    page_text: OnceCell<String>,
}

impl<'a> PageContext<'a> {
    pub fn new(url: &'a Url, document: &'a Html, rules: &'a ExtractionRules) -> Self {
        Self {
            url,
            document,
            rules,
            json_ld: read_json_ld(document),
            hydration: read_hydration(document),
            name: String::new(),
            sku: String::new(),
            page_text: OnceCell::new(),
        }
    }

    pub fn profile(&self) -> &PlatformProfile {
        &self.rules.profile
    }

    /// Visible page text, computed on first use
    pub fn page_text(&self) -> &str {
        self.page_text.get_or_init(|| page_text(self.document))
    }

    /// Text of the first match of the first selector that yields any text
    pub fn first_text(&self, selectors: &[Selector]) -> Option<String> {
        selectors.iter().find_map(|selector| {
            self.document
                .select(selector)
                .next()
                .map(element_text)
                .filter(|text| !text.is_empty())
        })
    }
}

/// Element text with text nodes joined by spaces and whitespace collapsed
pub fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

/// Nearest element (the parent included) whose tag is one of `tags`
pub fn nearest_container<'b>(parent: ElementRef<'b>, tags: &[String]) -> Option<ElementRef<'b>> {
    std::iter::once(parent)
        .chain(parent.ancestors().filter_map(ElementRef::wrap))
        .find(|e| tags.iter().any(|tag| tag.eq_ignore_ascii_case(e.value().name())))
}
