//! Semantic-markup (JSON-LD) and hydration-payload (`__NEXT_DATA__`) readers
//!
//! Both readers hand back a thin wrapper over `serde_json::Value` with typed
//! accessors that tolerate the many shapes storefronts emit. Malformed
//! blocks are skipped, never reported as errors.

#![allow(clippy::uninlined_format_args)]

use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

use super::text::{collapse_whitespace, normalize_decimal};

/// JSON-LD `@type` values that describe a sellable item
const PRODUCT_TYPES: [&str; 3] = ["Product", "Offer", "AggregateOffer"];

/// First product-like JSON-LD item found on a page
#[derive(Debug, Clone, PartialEq)]
pub struct JsonLdProduct(Value);

impl JsonLdProduct {
    pub fn name(&self) -> Option<String> {
        non_empty_text(self.0.get("name"))
    }

    pub fn description(&self) -> Option<String> {
        non_empty_text(self.0.get("description"))
    }

    /// `offers.price` (or `lowPrice`), two decimals
    ///
    /// `offers` may be a single object or an array, in which case the first
    /// entry is used. An item that is itself an offer carries the price directly.
    pub fn price(&self) -> Option<String> {
        let offer = match self.0.get("offers") {
            Some(Value::Array(items)) => items.first(),
            Some(offer @ Value::Object(_)) => Some(offer),
            _ => Some(&self.0),
        }?;

        ["price", "lowPrice"]
            .iter()
            .filter_map(|key| scalar_string(offer.get(*key)))
            .map(|raw| normalize_decimal(&raw))
            .find(|price| !price.is_empty())
    }

    /// `brand` as a plain string or a `{ "name": ... }` object
    pub fn brand(&self) -> Option<String> {
        match self.0.get("brand") {
            Some(Value::Object(brand)) => non_empty_text(brand.get("name")),
            other => non_empty_text(other),
        }
    }

    /// `image` as a string, a list, or an `ImageObject` with `url`
    pub fn images(&self) -> Vec<String> {
        fn image_url(value: &Value) -> Option<String> {
            match value {
                Value::String(url) => Some(url.trim().to_string()),
                Value::Object(object) => object
                    .get("url")
                    .or_else(|| object.get("contentUrl"))
                    .and_then(Value::as_str)
                    .map(|url| url.trim().to_string()),
                _ => None,
            }
        }

        let urls = match self.0.get("image") {
            Some(Value::Array(items)) => items.iter().filter_map(image_url).collect(),
            Some(value) => image_url(value).into_iter().collect(),
            None => Vec::new(),
        };

        urls.into_iter().filter(|url| !url.is_empty()).collect()
    }

    /// `sku` as a string or a number
    pub fn sku(&self) -> Option<String> {
        scalar_string(self.0.get("sku")).filter(|sku| !sku.is_empty())
    }
}

/// Parsed `__NEXT_DATA__` payload of a Next.js storefront
#[derive(Debug, Clone, PartialEq)]
pub struct HydrationPayload(Value);

impl HydrationPayload {
    /// `props.pageProps.product`, when it is an object
    pub fn product(&self) -> Option<&Value> {
        self.0
            .pointer("/props/pageProps/product")
            .filter(|product| product.is_object())
    }

    /// First non-empty scalar among `keys` on the product object
    pub fn product_field(&self, keys: &[&str]) -> Option<String> {
        let product = self.product()?;
        keys.iter()
            .filter_map(|key| scalar_string(product.get(*key)))
            .find(|value| !value.is_empty())
    }

    /// Every `imageUrl` reachable from the payload root
    pub fn image_urls(&self) -> Vec<String> {
        harvest_image_urls(&self.0)
    }
}

/// Scan every `application/ld+json` block for the first product-like item
///
/// Blocks may hold a single object, an array of objects, or an object with
/// an `@graph` array.
pub fn read_json_ld(document: &Html) -> Option<JsonLdProduct> {
    let Ok(selector) = Selector::parse(r#"script[type="application/ld+json"]"#) else {
        return None;
    };

    for (index, script) in document.select(&selector).enumerate() {
        let raw = script.text().collect::<String>();
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }

        let block = match serde_json::from_str::<Value>(raw) {
            Ok(block) => block,
            Err(e) => {
                debug!("Skipping malformed JSON-LD block #{}: {}", index, e);
                continue;
            }
        };

        let items: Vec<&Value> = match &block {
            Value::Array(items) => items.iter().collect(),
            Value::Object(object) => match object.get("@graph") {
                Some(Value::Array(graph)) => graph.iter().collect(),
                _ => vec![&block],
            },
            _ => Vec::new(),
        };

        if let Some(product) = items.into_iter().find(|item| is_product_type(item)) {
            debug!("Found JSON-LD product in block #{}", index);
            return Some(JsonLdProduct(product.clone()));
        }
    }

    None
}

/// Read the `script#__NEXT_DATA__` hydration payload; absent or malformed → `None`
pub fn read_hydration(document: &Html) -> Option<HydrationPayload> {
    let Ok(selector) = Selector::parse("script#__NEXT_DATA__") else {
        return None;
    };

    let script = document.select(&selector).next()?;
    let raw = script.text().collect::<String>();

    match serde_json::from_str::<Value>(raw.trim()) {
        Ok(payload) => Some(HydrationPayload(payload)),
        Err(e) => {
            debug!("Ignoring malformed __NEXT_DATA__ payload: {}", e);
            None
        }
    }
}

/// Depth-first, order-preserving walk collecting image URLs
///
/// For each object: its own string `imageUrl`, then the string `imageUrl` of
/// every object in its `images` array, then every nested value in document
/// order. Duplicates are left for the caller to remove.
pub fn harvest_image_urls(tree: &Value) -> Vec<String> {
    let mut found = Vec::new();
    collect_image_urls(tree, &mut found);
    found
}

fn collect_image_urls(node: &Value, found: &mut Vec<String>) {
    match node {
        Value::Object(object) => {
            if let Some(Value::String(url)) = object.get("imageUrl") {
                found.push(url.clone());
            }
            if let Some(Value::Array(images)) = object.get("images") {
                for image in images {
                    if let Some(Value::String(url)) = image.get("imageUrl") {
                        found.push(url.clone());
                    }
                }
            }
            for value in object.values() {
                collect_image_urls(value, found);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_image_urls(item, found);
            }
        }
        _ => {}
    }
}

fn is_product_type(item: &Value) -> bool {
    match item.get("@type") {
        Some(Value::String(kind)) => PRODUCT_TYPES.contains(&kind.as_str()),
        Some(Value::Array(kinds)) => kinds
            .iter()
            .filter_map(Value::as_str)
            .any(|kind| PRODUCT_TYPES.contains(&kind)),
        _ => false,
    }
}

fn non_empty_text(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(collapse_whitespace)
        .filter(|text| !text.is_empty())
}

fn scalar_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
