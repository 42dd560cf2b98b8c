//! One search or retrieve response.

/// A page of results as returned by the search service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    /// Raw `<records>` document for this page.
    pub records: String,

    /// Total number of records matching the query.
    pub records_found: u64,

    /// Continuation token for `retrieve`.
    pub query_id: String,
}

impl SearchPage {
    /// Check whether the query matched nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records_found == 0
    }
}
