//! Domain module - Core catalog entities
//!
//! Product records resolved from a page, the catalog import row they expand
//! into, and the static name → ID lookup tables.

pub mod catalog_mapping;
pub mod output_row;
pub mod product;

// Re-export commonly used items for convenience
pub use catalog_mapping::CategoryMapping;
pub use output_row::{OUTPUT_COLUMNS, OutputRow, expand_rows, variant_name, variant_sku};
pub use product::{ImageCandidate, ImageSource, NO_VARIANT, ProductRecord, Taxonomy};
