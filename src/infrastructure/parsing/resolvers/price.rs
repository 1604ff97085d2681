//! Price: structured offer price, then the first currency amount in page text

use crate::infrastructure::parsing::context::PageContext;
use crate::infrastructure::parsing::strategy::FieldChain;
use crate::infrastructure::parsing::text::parse_currency;

pub fn chain() -> FieldChain<String> {
    FieldChain::new("price")
        .then("json-ld-offer", from_json_ld)
        .then("page-text", from_page_text)
}

/// `"0.00"` formatted, or empty when the page shows no price
pub fn resolve(context: &PageContext<'_>) -> String {
    chain().resolve(context).unwrap_or_default()
}

fn from_json_ld(context: &PageContext<'_>) -> Option<String> {
    context.json_ld.as_ref()?.price()
}

fn from_page_text(context: &PageContext<'_>) -> Option<String> {
    Some(parse_currency(context.page_text(), &context.rules.currency))
}
