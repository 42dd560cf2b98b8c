//! JSON ID table output.

use crate::error::BatchResult;
use crate::models::IdMapping;

/// Pretty JSON array of `{"doi", "wosId"}` objects.
pub fn format_ids_json(mappings: &[IdMapping]) -> BatchResult<String> {
    Ok(serde_json::to_string_pretty(mappings)?)
}
