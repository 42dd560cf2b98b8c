//! Full records and DOI-to-UID mappings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix WOS puts in front of accession numbers in `<UID>`.
pub const WOS_PREFIX: &str = "WOS:";

/// Bare accession number, without the `WOS:` prefix.
#[must_use]
pub fn strip_wos_prefix(uid: &str) -> &str {
    uid.strip_prefix(WOS_PREFIX).unwrap_or(uid)
}

/// A single `<REC>` element cut from a result page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Content of the record's `<UID>`, if it had one.
    pub uid: Option<String>,

    /// Raw markup of the element.
    pub xml: String,
}

impl Record {
    /// Create a record, treating a blank UID as missing.
    #[must_use]
    pub fn new(uid: Option<String>, xml: impl Into<String>) -> Self {
        Self { uid: uid.filter(|u| !u.trim().is_empty()), xml: xml.into() }
    }

    /// File name the record is saved under: `<accession>.xml`.
    #[must_use]
    pub fn file_name(&self) -> Option<String> {
        self.uid
            .as_deref()
            .map(|uid| format!("{}.xml", strip_wos_prefix(uid).replace(['/', '\\'], "_")))
    }
}

/// Result of resolving one DOI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdMapping {
    /// DOI as given in the input.
    pub doi: String,

    /// Matching accession number, without prefix.
    pub wos_id: Option<String>,
}

impl IdMapping {
    /// Build a mapping from a raw `<UID>` value, stripping the `WOS:` prefix.
    #[must_use]
    pub fn new(doi: impl Into<String>, uid: Option<&str>) -> Self {
        Self { doi: doi.into(), wos_id: uid.map(|u| strip_wos_prefix(u).to_string()) }
    }

    /// Check whether a record was found.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.wos_id.is_some()
    }
}

impl fmt::Display for IdMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.doi, self.wos_id.as_deref().unwrap_or_default())
    }
}
