//! `doi,wos id` table output.

use crate::models::IdMapping;

/// Header line of the ID table.
pub const ID_TABLE_HEADER: &str = "doi,wos id";

/// Header plus one `doi,accession` line per mapping. Empty when there is nothing to report.
#[must_use]
pub fn format_ids_csv(mappings: &[IdMapping]) -> String {
    if mappings.is_empty() {
        return String::new();
    }

    let mut output = String::from(ID_TABLE_HEADER);
    output.push('\n');
    for mapping in mappings {
        output.push_str(&mapping.to_string());
        output.push('\n');
    }
    output
}
