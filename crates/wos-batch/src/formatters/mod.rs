//! Output formatters for DOI-to-WOS tables.

mod csv;
mod json;

pub use self::csv::*;
pub use self::json::*;

use crate::error::BatchResult;
use crate::models::{IdMapping, OutputFormat};

/// Render `mappings` in the requested format.
pub fn format_id_table(mappings: &[IdMapping], format: OutputFormat) -> BatchResult<String> {
    match format {
        OutputFormat::Csv => Ok(format_ids_csv(mappings)),
        OutputFormat::Json => format_ids_json(mappings),
    }
}
