//! HTML parsing for product detail pages
//!
//! Every output field is produced by an ordered chain of extraction
//! strategies; the first strategy returning a non-blank value wins.

pub mod config;
pub mod context;
pub mod image_resolver;
pub mod product_detail_parser;
pub mod resolvers;
pub mod strategy;
pub mod structured_data;
pub mod text;

pub use config::ExtractionSelectors;
pub use context::{ExtractionRules, PageContext};
pub use product_detail_parser::ProductDetailParser;
pub use strategy::{Blank, FieldChain};

use scraper::Html;

/// Parser that needs more than the document itself
pub trait ContextualParser {
    type Output;
    type Context;

    /// Parse an already-built document with contextual information
    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> Self::Output;
}
