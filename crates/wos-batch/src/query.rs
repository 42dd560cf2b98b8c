//! Paginated query execution.
//!
//! A query asking for more than `record_limit` records is split into pages.
//! The first page comes from `search`, later ones from `retrieve` using the
//! returned query id, until `count` records were requested or the reported
//! total runs out.

use std::sync::Arc;
use std::time::Duration;

use crate::client::WosSearch;
use crate::config::Config;
use crate::error::BatchResult;
use crate::models::Record;
use crate::xml;

/// One request of a paginated query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based index of the first record.
    pub offset: usize,
    /// Number of records requested.
    pub count: usize,
}

/// Split `count` records starting at `offset` into requests of at most `record_limit`.
#[must_use]
pub fn page_plan(count: usize, offset: usize, record_limit: usize) -> Vec<PageRequest> {
    let limit = record_limit.max(1);
    (0..count)
        .step_by(limit)
        .map(|done| PageRequest { offset: offset + done, count: limit.min(count - done) })
        .collect()
}

/// Runs queries against a [`WosSearch`] collaborator with pagination and XML post-processing.
pub struct QueryBatcher<C: ?Sized> {
    client: Arc<C>,
    record_limit: usize,
    delay: Duration,
}

impl<C: ?Sized> Clone for QueryBatcher<C> {
    fn clone(&self) -> Self {
        Self { client: Arc::clone(&self.client), record_limit: self.record_limit, delay: self.delay }
    }
}

impl<C: WosSearch + ?Sized> QueryBatcher<C> {
    /// Create a batcher using the record limit and cooldown from `config`.
    #[must_use]
    pub fn new(client: Arc<C>, config: &Config) -> Self {
        Self { client, record_limit: config.record_limit.max(1), delay: config.delay }
    }

    /// Maximum records per request.
    #[must_use]
    pub const fn record_limit(&self) -> usize {
        self.record_limit
    }

    /// Cooldown slept after each rate-limited lookup.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Fetch every page of `query`, each with its default namespace stripped.
    async fn fetch_pages(&self, query: &str, count: usize, offset: usize) -> BatchResult<Vec<String>> {
        let plan = page_plan(count, offset, self.record_limit);
        let Some((first, rest)) = plan.split_first() else {
            return Ok(Vec::new());
        };

        tracing::info!(query, "Query");
        let page = self.client.search(query, first.count, first.offset).await?;
        tracing::info!(records_found = page.records_found, query_id = %page.query_id, "Records found");

        let mut pages = vec![xml::strip_default_namespace(&page.records)];
        for request in rest {
            if request.offset as u64 > page.records_found {
                break;
            }
            tracing::debug!(offset = request.offset, query_id = %page.query_id, "Retrieving page");
            let records = self.client.retrieve(&page.query_id, request.count, request.offset).await?;
            pages.push(xml::strip_default_namespace(&records));
        }

        Ok(pages)
    }

    /// Run `query` and return all pages merged into one pretty-printed `<records>` document.
    ///
    /// Falls back to the merged, un-indented document if it cannot be pretty-printed.
    pub async fn query_xml(&self, query: &str, count: usize, offset: usize) -> BatchResult<String> {
        let pages = self.fetch_pages(query, count, offset).await?;
        let merged = xml::merge_pages(&pages);

        match xml::pretty_print(&merged) {
            Ok(pretty) => Ok(pretty),
            Err(e) => {
                tracing::warn!(error = %e, "Could not pretty-print results, returning raw XML");
                Ok(merged)
            }
        }
    }

    /// Run `query` and return the text of every element matching `selector`, page by page.
    pub async fn query_fields(
        &self,
        query: &str,
        selector: &str,
        count: usize,
        offset: usize,
    ) -> BatchResult<Vec<String>> {
        let pages = self.fetch_pages(query, count, offset).await?;

        let mut fields = Vec::new();
        for page in pages.iter().filter(|p| !p.trim().is_empty()) {
            fields.extend(xml::select(page, selector)?);
        }
        Ok(fields)
    }

    /// Run `query` and cut every `<REC>` out of the returned pages.
    pub async fn query_records(
        &self,
        query: &str,
        count: usize,
        offset: usize,
    ) -> BatchResult<Vec<Record>> {
        let pages = self.fetch_pages(query, count, offset).await?;

        let mut records = Vec::new();
        for page in pages.iter().filter(|p| !p.trim().is_empty()) {
            records.extend(xml::split_records(page)?);
        }
        Ok(records)
    }
}
