//! Product name: structured data, hydration payload, page heading, placeholder

use crate::infrastructure::parsing::context::PageContext;
use crate::infrastructure::parsing::strategy::FieldChain;
use crate::infrastructure::parsing::text::collapse_whitespace;

const HYDRATION_NAME_KEYS: [&str; 3] = ["productName", "name", "title"];

pub fn chain() -> FieldChain<String> {
    FieldChain::new("name")
        .then("json-ld", from_json_ld)
        .then("hydration", from_hydration)
        .then("heading", from_heading)
        .then("placeholder", placeholder)
}

/// Never empty
pub fn resolve(context: &PageContext<'_>) -> String {
    chain()
        .resolve(context)
        .unwrap_or_else(|| context.profile().name_placeholder.clone())
}

fn from_json_ld(context: &PageContext<'_>) -> Option<String> {
    context.json_ld.as_ref()?.name()
}

fn from_hydration(context: &PageContext<'_>) -> Option<String> {
    context
        .hydration
        .as_ref()?
        .product_field(&HYDRATION_NAME_KEYS)
        .map(|name| collapse_whitespace(&name))
}

fn from_heading(context: &PageContext<'_>) -> Option<String> {
    context.first_text(&context.rules.name_selectors)
}

fn placeholder(context: &PageContext<'_>) -> Option<String> {
    Some(context.profile().name_placeholder.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::parsing::resolvers::test_support::Page;

    #[test]
    fn test_json_ld_beats_heading() {
        let page = Page::default_profile(
            r#"<script type="application/ld+json">{"@type":"Product","name":"Pneu Pirelli"}</script>
               <div class="product-name"><h1>Outro Nome</h1></div>"#,
        );
        assert_eq!(
            chain().resolve_with_source(&page.context()),
            Some(("Pneu Pirelli".to_string(), "json-ld"))
        );
    }

    #[test]
    fn test_hydration_title_is_used() {
        let page = Page::default_profile(
            r#"<script id="__NEXT_DATA__" type="application/json">
               {"props":{"pageProps":{"product":{"title":"  Filtro   de Ar "}}}}</script>"#,
        );
        assert_eq!(resolve(&page.context()), "Filtro de Ar");
    }

    #[test]
    fn test_heading_selectors_in_order() {
        let page = Page::default_profile(
            "<h1>Genérico</h1><div class='product-name'><h1> Óleo 5W30 </h1></div>",
        );
        assert_eq!(resolve(&page.context()), "Óleo 5W30");

        // Only the first match of each selector is considered
        let page = Page::default_profile("<h1></h1><section><h1>Segundo</h1></section>");
        assert_eq!(resolve(&page.context()), "Sem Nome");
    }

    #[test]
    fn test_placeholder_when_nothing_matches() {
        let page = Page::default_profile("<p>sem título</p>");
        assert_eq!(
            chain().resolve_with_source(&page.context()),
            Some(("Sem Nome".to_string(), "placeholder"))
        );
    }
}
