//! DOI list input and chunked boolean queries.

use std::path::Path;

use crate::error::{BatchError, BatchResult};
use crate::models::MatchField;

/// Identifiers from the first line of a comma-separated list.
///
/// Entries are trimmed and blanks dropped.
#[must_use]
pub fn parse_doi_line(content: &str) -> Vec<String> {
    content
        .lines()
        .next()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|doi| !doi.is_empty())
        .map(String::from)
        .collect()
}

/// Read a DOI list file (one line, comma-separated).
pub async fn read_doi_file(path: &Path) -> BatchResult<Vec<String>> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| BatchError::io(path, e))?;
    Ok(parse_doi_line(&content))
}

/// Query for a single DOI.
#[must_use]
pub fn doi_query(doi: &str) -> String {
    format!("{}=\"{doi}\"", MatchField::Doi.tag())
}

/// OR-join identifiers into one query per chunk of at most `record_limit`.
#[must_use]
pub fn chunk_queries(ids: &[String], record_limit: usize, field: MatchField) -> Vec<String> {
    ids.chunks(record_limit.max(1))
        .map(|chunk| format!("{}=({})", field.tag(), chunk.join(" OR ")))
        .collect()
}
