//! Variant labels (sizes, colors, voltages)
//!
//! Only profiles with `detect_variants` look at the page; everything else is
//! a single-variant product.

use scraper::ElementRef;

use crate::domain::NO_VARIANT;
use crate::infrastructure::parsing::context::{PageContext, element_text};
use crate::infrastructure::parsing::strategy::FieldChain;

pub fn chain(detect_variants: bool) -> FieldChain<Vec<String>> {
    let chain = FieldChain::new("variants");
    let chain = if detect_variants {
        chain
            .then("option-selectors", from_option_selectors)
            .then("size-text", from_size_text)
    } else {
        chain
    };
    chain.then("single-variant", single_variant)
}

/// Never empty; `["ÚNICO"]` when nothing is found
pub fn resolve(context: &PageContext<'_>) -> Vec<String> {
    chain(context.profile().detect_variants)
        .resolve(context)
        .unwrap_or_else(|| vec![NO_VARIANT.to_string()])
}

/// Visible text, else the `value` attribute, else the first `data-*` attribute
fn option_label(element: ElementRef<'_>) -> String {
    let text = element_text(element);
    if !text.is_empty() {
        return text;
    }

    let value = element.value();
    value
        .attr("value")
        .or_else(|| {
            value
                .attrs()
                .find(|(name, value)| name.starts_with("data-") && !value.trim().is_empty())
                .map(|(_, value)| value)
        })
        .map(|label| label.trim().to_string())
        .unwrap_or_default()
}

fn push_unique(labels: &mut Vec<String>, label: String) {
    if !labels.contains(&label) {
        labels.push(label);
    }
}

/// First selector whose matches leave at least one label after placeholder removal
fn from_option_selectors(context: &PageContext<'_>) -> Option<Vec<String>> {
    let placeholders = &context.profile().variant_placeholders;

    context.rules.variant_selectors.iter().find_map(|selector| {
        let mut labels = Vec::new();
        for element in context.document.select(selector) {
            let label = option_label(element);
            let lowered = label.to_lowercase();
            if label.is_empty() || placeholders.iter().any(|p| p.to_lowercase() == lowered) {
                continue;
            }
            push_unique(&mut labels, label);
        }
        (!labels.is_empty()).then_some(labels)
    })
}

/// "Tamanho: PP P M G" in the visible page text
fn from_size_text(context: &PageContext<'_>) -> Option<Vec<String>> {
    let caps = context.rules.size_list.captures(context.page_text())?;
    let mut sizes = Vec::new();
    for size in caps.get(1)?.as_str().split_whitespace() {
        push_unique(&mut sizes, size.to_uppercase());
    }
    Some(sizes)
}

fn single_variant(_: &PageContext<'_>) -> Option<Vec<String>> {
    Some(vec![NO_VARIANT.to_string()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::parsing::resolvers::test_support::Page;

    #[test]
    fn test_size_select_options() {
        let page = Page::colcci(
            r#"<select name="tamanho">
                 <option value="">Selecione</option>
                 <option>P</option><option>M</option><option>M</option><option>G</option>
               </select>"#,
        );
        assert_eq!(
            chain(true).resolve_with_source(&page.context()),
            Some((vec!["P".into(), "M".into(), "G".into()], "option-selectors"))
        );
    }

    #[test]
    fn test_data_attribute_buttons() {
        let page = Page::colcci(
            r#"<div class="sku-selector"><button data-size="38"></button><button data-size="40"></button></div>"#,
        );
        assert_eq!(resolve(&page.context()), vec!["38", "40"]);
    }

    #[test]
    fn test_placeholder_only_select_falls_through() {
        let page = Page::colcci(
            r#"<select name="size"><option>Select</option></select>
               <div>Tamanho: PP PP P M G</div>"#,
        );
        assert_eq!(
            chain(true).resolve_with_source(&page.context()),
            Some((
                vec!["PP".into(), "P".into(), "M".into(), "G".into()],
                "size-text"
            ))
        );
    }

    #[test]
    fn test_default_profile_ignores_variant_markup() {
        let page = Page::default_profile(r#"<select name="tamanho"><option>P</option></select>"#);
        assert_eq!(resolve(&page.context()), vec![NO_VARIANT]);
    }

    #[test]
    fn test_no_variants_found() {
        let page = Page::colcci("<h1>Bolsa de Couro</h1>");
        assert_eq!(resolve(&page.context()), vec![NO_VARIANT]);
    }
}
