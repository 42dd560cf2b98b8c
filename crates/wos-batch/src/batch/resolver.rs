//! Single DOI to WOS accession number lookups.

use crate::client::WosSearch;
use crate::error::{BatchError, BatchResult};
use crate::models::IdMapping;
use crate::query::QueryBatcher;

use super::doi::doi_query;

/// Selector for record identifiers in a `<records>` page.
pub const UID_SELECTOR: &str = "./REC/UID";

impl<C: WosSearch + ?Sized> QueryBatcher<C> {
    /// Look up the record matching `doi`, then sleep the cooldown.
    ///
    /// A result page that cannot be parsed leaves the DOI unresolved.
    pub async fn resolve_doi(&self, doi: &str) -> BatchResult<IdMapping> {
        let uids = match self.query_fields(&doi_query(doi), UID_SELECTOR, 1, 1).await {
            Ok(uids) => uids,
            Err(BatchError::Xml(e)) => {
                tracing::warn!(doi, error = %e, "Could not parse lookup result");
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        tokio::time::sleep(self.delay()).await;

        let uid = uids.iter().map(|u| u.trim()).find(|u| !u.is_empty());
        if uid.is_none() {
            tracing::debug!(doi, "No record found");
        }
        Ok(IdMapping::new(doi, uid))
    }

    /// `doi,accession` line for `doi`; the accession is empty when nothing matched.
    pub async fn doi_to_wos(&self, doi: &str) -> BatchResult<String> {
        Ok(self.resolve_doi(doi).await?.to_string())
    }
}
