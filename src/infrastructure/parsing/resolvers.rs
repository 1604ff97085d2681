//! Field resolvers
//!
//! One fallback chain per product attribute. Every chain ends in a safe
//! default, so resolving a field never fails; the worst case is an empty
//! string or a configured placeholder.

pub mod brand;
pub mod description;
pub mod name;
pub mod price;
pub mod sku;
pub mod taxonomy;
pub mod variants;

#[cfg(test)]
pub(crate) mod test_support {
    use scraper::Html;
    use url::Url;

    use crate::infrastructure::config::PlatformProfile;
    use crate::infrastructure::parsing::context::{ExtractionRules, PageContext};

    /// Owns everything a `PageContext` borrows
    pub struct Page {
        pub url: Url,
        pub document: Html,
        pub rules: ExtractionRules,
    }

    impl Page {
        pub fn new(url: &str, html: &str, profile: &PlatformProfile) -> Self {
            Self {
                url: Url::parse(url).unwrap(),
                document: Html::parse_document(html),
                rules: ExtractionRules::compile(profile).unwrap(),
            }
        }

        pub fn default_profile(html: &str) -> Self {
            Self::new(
                "https://www.loja.example/pneu-aro-14-175-70/p",
                html,
                &PlatformProfile::default(),
            )
        }

        pub fn colcci(html: &str) -> Self {
            Self::new(
                "https://www.colcci.com.br/camiseta-basica-360112345/p",
                html,
                &PlatformProfile::colcci(),
            )
        }

        pub fn context(&self) -> PageContext<'_> {
            PageContext::new(&self.url, &self.document, &self.rules)
        }
    }
}
