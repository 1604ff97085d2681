//! Catalog Harvester - product detail page scraper
//!
//! Reads a list of product URLs, extracts each product through ordered
//! fallback strategies (structured data, hydration payloads, page markup)
//! and writes a catalog import sheet plus the product images.

pub mod application;
pub mod domain;
pub mod infrastructure;
