//! Department/category pair
//!
//! Tiers: schema.org breadcrumb, generic breadcrumb anchors, keyword rules on
//! the resolved name, profile default. A tier only counts when it yields
//! both a department and a category.

use scraper::ElementRef;

use crate::domain::Taxonomy;
use crate::infrastructure::parsing::context::{PageContext, element_text};
use crate::infrastructure::parsing::strategy::FieldChain;
use crate::infrastructure::parsing::text::truncate_chars;

/// Prefix length used to spot a trailing crumb that repeats the product title
const TITLE_PREFIX_CHARS: usize = 20;

pub fn chain() -> FieldChain<Taxonomy> {
    FieldChain::new("taxonomy")
        .then("schema-breadcrumb", from_schema_breadcrumb)
        .then("breadcrumb-links", from_breadcrumb_links)
        .then("name-keywords", from_name_keywords)
        .then("profile-default", profile_default)
}

/// Requires `context.name` to be resolved first
pub fn resolve(context: &PageContext<'_>) -> Taxonomy {
    chain().resolve(context).unwrap_or_else(|| {
        let profile = context.profile();
        Taxonomy::new(&profile.default_department, &profile.default_category)
    })
}

fn is_ignored(context: &PageContext<'_>, crumb: &str) -> bool {
    let crumb = crumb.to_lowercase();
    context
        .profile()
        .breadcrumb_ignore
        .iter()
        .any(|ignored| ignored.to_lowercase() == crumb)
}

/// Penultimate and last crumbs
fn pair_from_trail(trail: &[String]) -> Option<Taxonomy> {
    match trail {
        [.., department, category] => Some(Taxonomy::new(department, category)),
        _ => None,
    }
}

/// Display name of one `itemListElement`: `<strong>`, then
/// `span[itemprop=name]`, then the link, then the item's own text
fn crumb_name(context: &PageContext<'_>, item: ElementRef<'_>) -> String {
    let rules = context.rules;
    [&rules.crumb_strong, &rules.crumb_name, &rules.crumb_link]
        .into_iter()
        .find_map(|selector| item.select(selector).next())
        .map_or_else(|| element_text(item), element_text)
}

fn from_schema_breadcrumb(context: &PageContext<'_>) -> Option<Taxonomy> {
    let items: Vec<ElementRef<'_>> = context
        .rules
        .schema_breadcrumb_items
        .iter()
        .map(|selector| context.document.select(selector).collect::<Vec<_>>())
        .find(|items| !items.is_empty())?;

    let trail: Vec<String> = items
        .into_iter()
        .map(|item| crumb_name(context, item))
        .filter(|name| !name.is_empty() && !is_ignored(context, name))
        .collect();

    pair_from_trail(&trail)
}

fn from_breadcrumb_links(context: &PageContext<'_>) -> Option<Taxonomy> {
    let selector = context.rules.breadcrumb_links.as_ref()?;

    let mut trail: Vec<String> = context
        .document
        .select(selector)
        .map(element_text)
        .filter(|crumb| !crumb.is_empty() && !is_ignored(context, crumb))
        .collect();

    // Storefronts often end the trail with the product itself
    let heading = context
        .first_text(&context.rules.name_selectors)
        .unwrap_or_default();
    if let Some(last) = trail.last() {
        let crumb_prefix = truncate_chars(last, TITLE_PREFIX_CHARS).to_lowercase();
        let heading_prefix = truncate_chars(&heading, TITLE_PREFIX_CHARS).to_lowercase();
        if !heading.is_empty() && heading_prefix.contains(&crumb_prefix) {
            trail.pop();
        }
    }

    pair_from_trail(&trail)
}

fn from_name_keywords(context: &PageContext<'_>) -> Option<Taxonomy> {
    let name = context.name.to_lowercase();
    context
        .profile()
        .category_rules
        .iter()
        .find(|rule| {
            rule.keywords
                .iter()
                .any(|keyword| !keyword.is_empty() && name.contains(&keyword.to_lowercase()))
        })
        .map(|rule| Taxonomy::new(&rule.department, &rule.category))
}

fn profile_default(context: &PageContext<'_>) -> Option<Taxonomy> {
    let profile = context.profile();
    Some(Taxonomy::new(
        &profile.default_department,
        &profile.default_category,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::parsing::resolvers::test_support::Page;

    #[test]
    fn test_schema_breadcrumb_penultimate_and_last() {
        let page = Page::default_profile(
            r#"<ul itemtype="http://schema.org/BreadcrumbList">
                 <li itemprop="itemListElement">Você está em:</li>
                 <li itemprop="itemListElement"><a href="/"><span itemprop="name">Página Inicial</span></a></li>
                 <li itemprop="itemListElement"><a href="/auto"><span itemprop="name">Auto Peças</span></a></li>
                 <li itemprop="itemListElement"><a href="/pneus">Pneus</a></li>
               </ul>"#,
        );
        assert_eq!(
            chain().resolve_with_source(&page.context()),
            Some((Taxonomy::new("Auto Peças", "Pneus"), "schema-breadcrumb"))
        );
    }

    #[test]
    fn test_schema_breadcrumb_strong_entry() {
        let page = Page::default_profile(
            r#"<ol itemtype="https://schema.org/BreadcrumbList">
                 <li itemprop="itemListElement"><a>Home</a></li>
                 <li itemprop="itemListElement"><a>Acessórios</a></li>
                 <li itemprop="itemListElement"><a>Som</a></li>
                 <li itemprop="itemListElement"><strong>Alto-falante 6 pol</strong></li>
               </ol>"#,
        );
        assert_eq!(
            resolve(&page.context()),
            Taxonomy::new("Som", "Alto-falante 6 pol")
        );
    }

    #[test]
    fn test_generic_trail_drops_product_title() {
        let page = Page::default_profile(
            r#"<nav class="breadcrumb"><a>Início</a><a>Auto Peças</a><a>Filtros</a>
                 <a>Filtro de Ar Wega FAP</a></nav>
               <div class="product-name"><h1>Filtro de Ar Wega FAP-2822</h1></div>"#,
        );
        assert_eq!(
            chain().resolve_with_source(&page.context()),
            Some((Taxonomy::new("Auto Peças", "Filtros"), "breadcrumb-links"))
        );
    }

    #[test]
    fn test_single_crumb_falls_through_to_keywords() {
        let page = Page::default_profile(r#"<div class="breadcrumbs"><a>Home</a><a>Ofertas</a></div>"#);
        let mut context = page.context();
        context.name = "Jogo de Pastilhas de Freio".to_string();
        assert_eq!(
            chain().resolve_with_source(&context),
            Some((Taxonomy::new("Auto Peças", "Freios"), "name-keywords"))
        );
    }

    #[test]
    fn test_bare_page_uses_profile_default() {
        let page = Page::default_profile("<html><body><p>Produto</p></body></html>");
        let mut context = page.context();
        context.name = "Produto Genérico".to_string();
        assert_eq!(resolve(&context), Taxonomy::new("Auto Peças", "Outros"));

        let page = Page::colcci("<html><body></body></html>");
        let mut context = page.context();
        context.name = "Sem Nome".to_string();
        assert_eq!(resolve(&context), Taxonomy::new("Vestuário", "Outros"));
    }
}
