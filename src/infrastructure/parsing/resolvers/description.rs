//! Long description
//!
//! Structured data first, then the profile's description containers, then
//! the text of the block that encloses a known label phrase such as
//! "Aplicável ao(s) veículo(s)" or "Composição".

use crate::infrastructure::parsing::context::{PageContext, element_text, nearest_container};
use crate::infrastructure::parsing::strategy::FieldChain;
use crate::infrastructure::parsing::text::visible_text_nodes;

pub fn chain() -> FieldChain<String> {
    FieldChain::new("description")
        .then("json-ld", from_json_ld)
        .then("selectors", from_selectors)
        .then("label-container", from_label_containers)
}

pub fn resolve(context: &PageContext<'_>) -> String {
    chain().resolve(context).unwrap_or_default()
}

fn from_json_ld(context: &PageContext<'_>) -> Option<String> {
    context.json_ld.as_ref()?.description()
}

fn from_selectors(context: &PageContext<'_>) -> Option<String> {
    context.first_text(&context.rules.description_selectors)
}

/// For each label, the nearest container of the first text node mentioning
/// it (case-insensitive); the longest container text wins.
fn from_label_containers(context: &PageContext<'_>) -> Option<String> {
    let profile = context.profile();
    let nodes = visible_text_nodes(context.document);

    profile
        .description_labels
        .iter()
        .filter_map(|label| {
            let needle = label.to_lowercase();
            nodes
                .iter()
                .filter(|(_, text)| text.to_lowercase().contains(&needle))
                .find_map(|(parent, _)| {
                    nearest_container(*parent, &profile.description_containers)
                })
                .map(element_text)
        })
        .filter(|text| !text.is_empty())
        .max_by_key(|text| text.chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::parsing::resolvers::test_support::Page;

    #[test]
    fn test_description_selector() {
        let page = Page::default_profile(
            r#"<div class="product-description"><p>Pneu radial</p><p>para carros</p></div>"#,
        );
        assert_eq!(
            chain().resolve_with_source(&page.context()),
            Some(("Pneu radial para carros".to_string(), "selectors"))
        );
    }

    #[test]
    fn test_applicability_block() {
        let page = Page::default_profile(
            r#"<section><h3>Aplicável ao(s) veículo(s)</h3><ul><li>Gol 1.0</li><li>Palio</li></ul></section>"#,
        );
        assert_eq!(
            resolve(&page.context()),
            "Aplicável ao(s) veículo(s) Gol 1.0 Palio"
        );
    }

    #[test]
    fn test_longest_labelled_block_wins() {
        let page = Page::colcci(
            r#"<ul>
                 <li>Composição: 100% algodão</li>
                 <li>Detalhes: camiseta básica de malha com gola careca</li>
               </ul>"#,
        );
        assert_eq!(
            chain().resolve_with_source(&page.context()),
            Some((
                "Detalhes: camiseta básica de malha com gola careca".to_string(),
                "label-container"
            ))
        );
    }

    #[test]
    fn test_heading_label_keeps_only_the_heading_text() {
        let page = Page::colcci(
            r#"<ul>
                 <li>Composição: 100% algodão</li>
                 <li><h3>Detalhes</h3><p>Camiseta básica de malha com gola careca e modelagem regular.</p></li>
               </ul>"#,
        );
        // "Detalhes" sits in an <h3>, which is a container on its own
        let description = resolve(&page.context());
        assert_eq!(description, "Composição: 100% algodão");
    }

    #[test]
    fn test_no_description() {
        let page = Page::default_profile("<p>nada aqui</p>");
        assert_eq!(resolve(&page.context()), "");
    }
}
