//! Input URL table and output catalog sheet

#![allow(clippy::uninlined_format_args)]

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::domain::{OUTPUT_COLUMNS, OutputRow};
use crate::infrastructure::scrape_error::{ScrapeError, ScrapeResult};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Read the URL column of a CSV table with a header row
///
/// Values are trimmed; blank cells are kept so the run can report them.
pub fn read_input_urls(path: &Path, column: &str) -> ScrapeResult<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;

    let position = reader
        .headers()?
        .iter()
        .position(|header| header.trim_start_matches('\u{feff}').trim() == column)
        .ok_or_else(|| ScrapeError::missing_input_column(column))?;

    let mut urls = Vec::new();
    for record in reader.records() {
        let record = record?;
        urls.push(record.get(position).unwrap_or_default().trim().to_string());
    }

    info!("Read {} URL(s) from {:?}", urls.len(), path);
    Ok(urls)
}

/// Write the catalog sheet as UTF-8 CSV with a byte-order mark
///
/// The header is always written, even for an empty run.
pub fn write_output_csv(path: &Path, rows: &[OutputRow]) -> ScrapeResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut file = File::create(path)?;
    file.write_all(UTF8_BOM)?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    writer.write_record(OUTPUT_COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!("💾 Wrote {} row(s) to {:?}", rows.len(), path);
    Ok(())
}
