//! Brand: structured data, "Marca" attribute-table label, known brand inside the
//! product name, profile default

use scraper::ElementRef;

use crate::infrastructure::parsing::context::{PageContext, element_text, nearest_container};
use crate::infrastructure::parsing::strategy::FieldChain;
use crate::infrastructure::parsing::text::{collapse_whitespace, title_case, visible_text_nodes};

/// Elements that can hold a "label: value" pair
const LABEL_CONTAINERS: [&str; 6] = ["tr", "li", "p", "div", "dt", "span"];

pub fn chain() -> FieldChain<String> {
    FieldChain::new("brand")
        .then("json-ld", from_json_ld)
        .then("label", from_label)
        .then("name-vocabulary", from_name_vocabulary)
        .then("profile-default", profile_default)
}

/// Requires `context.name` to be resolved first
pub fn resolve(context: &PageContext<'_>) -> String {
    chain().resolve(context).unwrap_or_default()
}

fn from_json_ld(context: &PageContext<'_>) -> Option<String> {
    context.json_ld.as_ref()?.brand()
}

fn from_label(context: &PageContext<'_>) -> Option<String> {
    let label = context.profile().brand_label.to_lowercase();
    if label.is_empty() {
        return None;
    }
    let containers: Vec<String> = LABEL_CONTAINERS.iter().map(|t| (*t).to_string()).collect();

    visible_text_nodes(context.document)
        .into_iter()
        .filter(|(_, text)| text.to_lowercase().contains(&label))
        .filter_map(|(parent, _)| nearest_container(parent, &containers))
        .find_map(|container| labelled_value(context, container))
}

/// Value of a label container: a following `<dd>` sibling, else the text
/// after "Marca:" inside the container itself
fn labelled_value(context: &PageContext<'_>, container: ElementRef<'_>) -> Option<String> {
    let definition = container
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| sibling.value().name() == "dd")
        .map(element_text)
        .filter(|text| !text.is_empty());
    if definition.is_some() {
        return definition;
    }

    let text = element_text(container);
    context
        .rules
        .brand_label
        .captures(&text)
        .and_then(|caps| caps.get(1))
        .map(|value| collapse_whitespace(value.as_str()))
        .filter(|value| !value.is_empty())
}

fn from_name_vocabulary(context: &PageContext<'_>) -> Option<String> {
    let name = context.name.to_lowercase();
    context
        .profile()
        .known_brands
        .iter()
        .find(|brand| !brand.is_empty() && name.contains(&brand.to_lowercase()))
        .map(|brand| title_case(brand))
}

fn profile_default(context: &PageContext<'_>) -> Option<String> {
    Some(context.profile().default_brand.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::parsing::resolvers::test_support::Page;

    #[test]
    fn test_json_ld_brand_object() {
        let page = Page::default_profile(
            r#"<script type="application/ld+json">{"@type":"Product","brand":{"name":" Michelin "}}</script>"#,
        );
        assert_eq!(resolve(&page.context()), "Michelin");
    }

    #[test]
    fn test_definition_list_label() {
        let page = Page::default_profile(
            "<dl><dt>Código</dt><dd>123</dd><dt>Marca</dt><dd> Bosch </dd></dl>",
        );
        assert_eq!(
            chain().resolve_with_source(&page.context()),
            Some(("Bosch".to_string(), "label"))
        );
    }

    #[test]
    fn test_inline_label() {
        let page = Page::default_profile("<ul><li>Marca: NGK</li><li>Garantia: 3 meses</li></ul>");
        assert_eq!(resolve(&page.context()), "NGK");
    }

    #[test]
    fn test_label_match_ignores_case() {
        let page = Page::default_profile("<ul><li>marca: Bosch</li></ul>");
        assert_eq!(
            chain().resolve_with_source(&page.context()),
            Some(("Bosch".to_string(), "label"))
        );

        let page = Page::default_profile("<dl><dt>MARCA</dt><dd>Pirelli</dd></dl>");
        assert_eq!(resolve(&page.context()), "Pirelli");
    }

    #[test]
    fn test_brand_from_name() {
        let page = Page::default_profile("<h1>Pneu</h1>");
        let mut context = page.context();
        context.name = "Pneu Alfa Romeo Original".to_string();
        assert_eq!(
            chain().resolve_with_source(&context),
            Some(("Alfa Romeo".to_string(), "name-vocabulary"))
        );
    }

    #[test]
    fn test_profile_default_brand() {
        let page = Page::colcci("<h1>Camiseta Básica</h1>");
        let mut context = page.context();
        context.name = "Camiseta Básica".to_string();
        assert_eq!(resolve(&context), "Colcci");

        let page = Page::default_profile("<h1>Produto</h1>");
        let mut context = page.context();
        context.name = "Produto".to_string();
        assert_eq!(resolve(&context), "");
    }
}
