//! Enumeration types for batch and output options.

use serde::{Deserialize, Serialize};

/// WOS field a chunk query matches identifiers against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchField {
    /// Digital Object Identifier (`DO=`).
    #[default]
    Doi,
    /// WOS accession number (`UT=`).
    Ut,
}

impl MatchField {
    /// Field tag in the WOS query language.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Doi => "DO",
            Self::Ut => "UT",
        }
    }
}

/// What a batch run produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BatchMode {
    /// One lookup per DOI, reporting `doi,wosId` pairs.
    IdsOnly,
    /// Chunked queries, one pretty-printed XML file per record.
    #[default]
    FullRecords,
}

/// Output format for ID tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `doi,wos id` lines.
    #[default]
    Csv,
    /// JSON array of `{doi, wosId}` objects.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_field_tag() {
        assert_eq!(MatchField::Doi.tag(), "DO");
        assert_eq!(MatchField::Ut.tag(), "UT");
    }

    #[test]
    fn test_defaults() {
        assert_eq!(MatchField::default(), MatchField::Doi);
        assert_eq!(BatchMode::default(), BatchMode::FullRecords);
        assert_eq!(OutputFormat::default(), OutputFormat::Csv);
    }
}
