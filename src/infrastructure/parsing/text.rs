//! Text and URL normalization helpers shared by the field resolvers
//!
//! Everything here is total: malformed input yields an empty string or
//! `None`, never a panic.

use regex::Regex;
use scraper::{ElementRef, Html};
use url::Url;

pub use crate::domain::output_row::truncate_chars;

/// Elements whose text never reaches the reader
const INVISIBLE_TAGS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Trim and collapse every whitespace run to a single space
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Build the price pattern for a currency symbol: `R$ 1.234,56`
pub fn currency_regex(symbol: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"{}\s*([\d.\s]+,\d{{2}})", regex::escape(symbol)))
}

/// First Brazilian-formatted price in free text, as `"1234.56"`, or `""`
pub fn parse_currency(text: &str, pattern: &Regex) -> String {
    let Some(amount) = pattern.captures(text).and_then(|caps| caps.get(1)) else {
        return String::new();
    };

    let normalized: String = amount
        .as_str()
        .chars()
        .filter(|c| *c != '.' && !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    format_decimal(&normalized)
}

/// Normalize a structured-data price to two decimals
///
/// A comma marks the decimal point, with dots then read as thousands
/// separators; otherwise the value is parsed as-is.
pub fn normalize_decimal(raw: &str) -> String {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.contains(',') {
        format_decimal(&compact.replace('.', "").replace(',', "."))
    } else {
        format_decimal(&compact)
    }
}

fn format_decimal(value: &str) -> String {
    match value.parse::<f64>() {
        Ok(number) if number.is_finite() => format!("{number:.2}"),
        _ => String::new(),
    }
}

/// Resolve a possibly relative reference against the page URL
///
/// Only `http`/`https` results are kept.
pub fn resolve_url(base: &Url, candidate: &str) -> Option<Url> {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return None;
    }

    base.join(candidate)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
}

/// Last non-empty path segment of a URL, ignoring a trailing slash
pub fn url_slug(url: &str) -> String {
    if let Ok(parsed) = Url::parse(url) {
        if let Some(segment) = parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        {
            return segment.to_string();
        }
        return parsed.host_str().unwrap_or_default().to_string();
    }

    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// File-name-safe slug: ASCII alphanumerics, spaces and hyphens survive,
/// whitespace runs become one hyphen, result lowercased
pub fn slugify(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect();

    kept.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

/// Capitalize the first letter of every alphabetic run
pub fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut previous_alphabetic = false;

    for c in text.chars() {
        if c.is_alphabetic() {
            if previous_alphabetic {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            previous_alphabetic = true;
        } else {
            result.push(c);
            previous_alphabetic = false;
        }
    }

    result
}

/// Visible page text: every text node outside script/style/noscript/template,
/// trimmed and joined with a single space
pub fn page_text(document: &Html) -> String {
    visible_text_nodes(document)
        .into_iter()
        .map(|(_, text)| text.trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Visible text nodes paired with their parent element, in document order
pub fn visible_text_nodes(document: &Html) -> Vec<(ElementRef<'_>, &str)> {
    document
        .tree
        .root()
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let parent = node.parent().and_then(ElementRef::wrap)?;
            Some((parent, &**text))
        })
        .filter(|(parent, _)| !is_invisible(*parent))
        .collect()
}

fn is_invisible(element: ElementRef<'_>) -> bool {
    std::iter::once(element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .any(|e| INVISIBLE_TAGS.contains(&e.value().name()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  Pneu \n\t Aro  14 "), "Pneu Aro 14");
        assert_eq!(collapse_whitespace("   "), "");
    }

    #[test]
    fn test_parse_currency() {
        let pattern = currency_regex("R$").unwrap();
        assert_eq!(parse_currency("Por apenas R$ 1.234,56 à vista", &pattern), "1234.56");
        assert_eq!(parse_currency("R$89,90", &pattern), "89.90");
        assert_eq!(parse_currency("De R$ 10,00 por R$ 8,00", &pattern), "10.00");
        assert_eq!(parse_currency("sem preço", &pattern), "");
        assert_eq!(parse_currency("R$ abc", &pattern), "");
    }

    #[test]
    fn test_normalize_decimal() {
        assert_eq!(normalize_decimal("199.9"), "199.90");
        assert_eq!(normalize_decimal("1.234,56"), "1234.56");
        assert_eq!(normalize_decimal("89,9"), "89.90");
        assert_eq!(normalize_decimal(""), "");
        assert_eq!(normalize_decimal("grátis"), "");
        assert_eq!(normalize_decimal("NaN"), "");
    }

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("https://www.loja.example/produtos/pneu-aro-14").unwrap();

        assert_eq!(
            resolve_url(&base, "/img/a.jpg").map(String::from),
            Some("https://www.loja.example/img/a.jpg".to_string())
        );
        assert_eq!(
            resolve_url(&base, "//cdn.loja.example/b.jpg").map(String::from),
            Some("https://cdn.loja.example/b.jpg".to_string())
        );
        assert!(resolve_url(&base, "  ").is_none());
        assert!(resolve_url(&base, "javascript:void(0)").is_none());
    }

    #[test]
    fn test_url_slug() {
        assert_eq!(url_slug("https://loja.example/pneu-aro-14/"), "pneu-aro-14");
        assert_eq!(url_slug("https://loja.example/a/b/camiseta-123/p"), "p");
        assert_eq!(url_slug("https://loja.example/"), "loja.example");
        assert_eq!(url_slug("not a url/slug/"), "slug");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Pneu Pirelli 175/70 R14"), "pneu-pirelli-17570-r14");
        assert_eq!(slugify("  Óleo   Motor 5W-30 "), "leo-motor-5w-30");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("alfa romeo"), "Alfa Romeo");
        assert_eq!(title_case("NGK"), "Ngk");
        assert_eq!(title_case("mercedes-benz"), "Mercedes-Benz");
    }

    #[test]
    fn test_page_text_skips_invisible_nodes() {
        let html = Html::parse_document(
            r#"<html><head><style>.a{}</style><script>var x = "R$ 1,00";</script></head>
            <body><h1> Pneu </h1><noscript>ative o js</noscript><p>R$ 10,00</p></body></html>"#,
        );
        assert_eq!(page_text(&html), "Pneu R$ 10,00");
    }

    #[test]
    fn test_truncate_chars_counts_characters() {
        assert_eq!(truncate_chars("ação", 2), "aç");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
