//! Per-record XML files.

use std::path::{Path, PathBuf};

use crate::error::{BatchError, BatchResult};
use crate::models::Record;
use crate::xml;

/// How a record ended up on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Pretty-printed XML.
    Pretty(PathBuf),
    /// Raw bytes, after pretty-printing failed.
    Raw(PathBuf),
    /// Not written: the record had no UID to name the file after.
    Skipped,
}

/// Save `record` as `<dir>/<accession>.xml`, pretty-printed when possible.
pub async fn write_record(dir: &Path, record: &Record) -> BatchResult<WriteOutcome> {
    let Some(name) = record.file_name() else {
        tracing::warn!("Record without UID, skipping");
        return Ok(WriteOutcome::Skipped);
    };
    let path = dir.join(name);

    match xml::pretty_print(&record.xml) {
        Ok(pretty) => {
            tokio::fs::write(&path, pretty).await.map_err(|e| BatchError::io(&path, e))?;
            Ok(WriteOutcome::Pretty(path))
        }
        Err(e) => {
            tracing::error!(
                uid = record.uid.as_deref().unwrap_or_default(),
                error = %e,
                "Error processing document, saving un-pretty result"
            );
            tokio::fs::write(&path, record.xml.as_bytes())
                .await
                .map_err(|e| BatchError::io(&path, e))?;
            Ok(WriteOutcome::Raw(path))
        }
    }
}
