//! In-memory search collaborator shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use wos_batch::client::WosSearch;
use wos_batch::error::{ClientError, ClientResult};
use wos_batch::models::SearchPage;

pub const FULL_RECORD_NS: &str =
    "http://scientific.thomsonreuters.com/schema/wok5.4/public/FullRecord";

/// A request seen by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Search { query: String, count: usize, offset: usize },
    Retrieve { query_id: String, count: usize, offset: usize },
}

impl Call {
    pub fn offset(&self) -> usize {
        match self {
            Self::Search { offset, .. } | Self::Retrieve { offset, .. } => *offset,
        }
    }

    pub fn count(&self) -> usize {
        match self {
            Self::Search { count, .. } | Self::Retrieve { count, .. } => *count,
        }
    }
}

/// Answers queries from a fixed table of query -> record bodies.
#[derive(Default)]
pub struct MockWos {
    results: HashMap<String, Vec<String>>,
    queries: Mutex<Vec<String>>,
    calls: Mutex<Vec<Call>>,
}

/// `<REC>` element with a UID and a title.
pub fn rec(uid: &str, title: &str) -> String {
    format!("<REC><UID>{uid}</UID><static_data><title>{title}</title></static_data></REC>")
}

impl MockWos {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register raw `<REC>` bodies returned for `query`.
    pub fn with_records(mut self, query: &str, records: Vec<String>) -> Self {
        self.results.insert(query.to_string(), records);
        self
    }

    /// Register `n` generated records for `query`.
    pub fn with_generated(self, query: &str, n: usize) -> Self {
        let records = (1..=n).map(|i| rec(&format!("WOS:{i:06}"), &format!("Paper {i}"))).collect();
        self.with_records(query, records)
    }

    /// Register UIDs returned for `query`.
    pub fn with_uids(self, query: &str, uids: &[&str]) -> Self {
        let records = uids.iter().map(|uid| rec(uid, "Title")).collect();
        self.with_records(query, records)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn searched_queries(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Search { query, .. } => Some(query),
                Call::Retrieve { .. } => None,
            })
            .collect()
    }

    fn page(&self, query: &str, count: usize, offset: usize) -> String {
        let records = self.results.get(query).map(Vec::as_slice).unwrap_or_default();
        let start = offset.saturating_sub(1).min(records.len());
        let end = (start + count).min(records.len());
        if start == end {
            return format!("<records xmlns=\"{FULL_RECORD_NS}\"/>");
        }
        format!("<records xmlns=\"{FULL_RECORD_NS}\">{}</records>", records[start..end].concat())
    }
}

#[async_trait::async_trait]
impl WosSearch for MockWos {
    async fn search(&self, query: &str, count: usize, offset: usize) -> ClientResult<SearchPage> {
        self.calls.lock().unwrap().push(Call::Search { query: query.to_string(), count, offset });

        let query_id = {
            let mut queries = self.queries.lock().unwrap();
            queries.push(query.to_string());
            queries.len().to_string()
        };
        let found = self.results.get(query).map_or(0, Vec::len);

        Ok(SearchPage {
            records: self.page(query, count, offset),
            records_found: found as u64,
            query_id,
        })
    }

    async fn retrieve(&self, query_id: &str, count: usize, offset: usize) -> ClientResult<String> {
        self.calls.lock().unwrap().push(Call::Retrieve {
            query_id: query_id.to_string(),
            count,
            offset,
        });

        let query = {
            let queries = self.queries.lock().unwrap();
            let index: usize = query_id.parse().map_err(|_| ClientError::fault("bad query id"))?;
            queries.get(index - 1).cloned().ok_or_else(|| ClientError::fault("unknown query id"))?
        };
        Ok(self.page(&query, count, offset))
    }
}
