//! Application layer module
//!
//! Orchestrates one harvesting run: read the URL table, scrape every product
//! page, write the catalog sheet.

pub mod scrape_pipeline;
pub mod table_io;

pub use scrape_pipeline::{RunSummary, ScrapeContext};
pub use table_io::{read_input_urls, write_output_csv};
