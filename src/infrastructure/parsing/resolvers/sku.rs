//! SKU: reference label, structured data, hydration payload, `<meta itemprop=sku>`,
//! URL slug
//!
//! Profiles with `sku_label_first` read the "Ref."/"Referência" label before
//! any structured source; others only fall back to it before the slug.

use crate::infrastructure::parsing::context::PageContext;
use crate::infrastructure::parsing::strategy::FieldChain;
use crate::infrastructure::parsing::text::url_slug;

const HYDRATION_SKU_KEYS: [&str; 4] = ["itemId", "sku", "id", "productId"];

pub fn chain(label_first: bool) -> FieldChain<String> {
    let chain = FieldChain::new("sku");
    let chain = if label_first {
        chain.then("reference-label", from_reference_label)
    } else {
        chain
    };

    let chain = chain
        .then("json-ld", from_json_ld)
        .then("hydration", from_hydration)
        .then("meta-itemprop", from_meta);

    let chain = if label_first {
        chain
    } else {
        chain.then("reference-label", from_reference_label)
    };

    chain.then("url-slug", from_url_slug)
}

/// Never empty for a URL with a host
pub fn resolve(context: &PageContext<'_>) -> String {
    chain(context.profile().sku_label_first)
        .resolve(context)
        .unwrap_or_else(|| url_slug(context.url.as_str()))
}

fn from_reference_label(context: &PageContext<'_>) -> Option<String> {
    let caps = context.rules.sku_label.captures(context.page_text())?;
    let reference = caps.get(1)?.as_str().trim_end_matches(['.', '/']);
    Some(reference.to_string())
}

fn from_json_ld(context: &PageContext<'_>) -> Option<String> {
    context.json_ld.as_ref()?.sku()
}

fn from_hydration(context: &PageContext<'_>) -> Option<String> {
    context.hydration.as_ref()?.product_field(&HYDRATION_SKU_KEYS)
}

fn from_meta(context: &PageContext<'_>) -> Option<String> {
    context
        .rules
        .sku_meta_selectors
        .iter()
        .filter_map(|selector| context.document.select(selector).next())
        .filter_map(|meta| meta.value().attr("content"))
        .map(str::trim)
        .find(|content| !content.is_empty())
        .map(str::to_string)
}

fn from_url_slug(context: &PageContext<'_>) -> Option<String> {
    Some(url_slug(context.url.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::parsing::resolvers::test_support::Page;
    use rstest::rstest;

    const LABEL_AND_JSON_LD: &str = r#"
        <script type="application/ld+json">{"@type":"Product","sku":"JSONLD-1"}</script>
        <p>Ref.: 360112345-01.</p>"#;

    #[test]
    fn test_label_first_profile() {
        let page = Page::colcci(LABEL_AND_JSON_LD);
        assert_eq!(
            chain(true).resolve_with_source(&page.context()),
            Some(("360112345-01".to_string(), "reference-label"))
        );
        assert_eq!(resolve(&page.context()), "360112345-01");
    }

    #[test]
    fn test_structured_sources_first_by_default() {
        let page = Page::default_profile(LABEL_AND_JSON_LD);
        assert_eq!(resolve(&page.context()), "JSONLD-1");
    }

    #[rstest]
    #[case::hydration(
        r#"<script id="__NEXT_DATA__" type="application/json">
           {"props":{"pageProps":{"product":{"itemId":"","sku":null,"id":4521}}}}</script>"#,
        "4521"
    )]
    #[case::meta(r#"<meta itemprop="sku" content=" MC-998 ">"#, "MC-998")]
    #[case::label(r#"<span>Referência: AB12/</span>"#, "AB12")]
    #[case::slug("<p>nada</p>", "p")]
    fn test_default_profile_fallbacks(#[case] html: &str, #[case] expected: &str) {
        let page = Page::default_profile(html);
        assert_eq!(resolve(&page.context()), expected);
    }

    #[test]
    fn test_chain_order() {
        assert_eq!(
            chain(false).strategy_names(),
            vec!["json-ld", "hydration", "meta-itemprop", "reference-label", "url-slug"]
        );
        assert_eq!(chain(true).strategy_names()[0], "reference-label");
    }
}
