//! Pagination and XML post-processing tests against an in-memory collaborator.

mod common;

use std::sync::Arc;

use common::{Call, MockWos};
use wos_batch::config::Config;
use wos_batch::query::QueryBatcher;
use wos_batch::xml;

fn batcher(mock: &Arc<MockWos>, record_limit: usize) -> QueryBatcher<MockWos> {
    let mut config = Config::for_testing("http://localhost");
    config.record_limit = record_limit;
    QueryBatcher::new(Arc::clone(mock), &config)
}

// =============================================================================
// Pagination
// =============================================================================

#[tokio::test]
async fn test_pagination_request_count_and_offsets() {
    let mock = Arc::new(MockWos::new().with_generated("TS=(cadmium)", 1000));
    let batcher = batcher(&mock, 100);

    batcher.query_xml("TS=(cadmium)", 250, 1).await.unwrap();

    let calls = mock.calls();
    assert_eq!(calls.len(), 3, "ceil(250 / 100) requests");
    assert!(matches!(calls[0], Call::Search { .. }));
    assert!(calls[1..].iter().all(|c| matches!(c, Call::Retrieve { .. })));

    let offsets: Vec<usize> = calls.iter().map(Call::offset).collect();
    assert_eq!(offsets, vec![1, 101, 201]);
    let counts: Vec<usize> = calls.iter().map(Call::count).collect();
    assert_eq!(counts, vec![100, 100, 50]);
}

#[tokio::test]
async fn test_pagination_stops_when_total_exhausted() {
    let mock = Arc::new(MockWos::new().with_generated("TS=(rare)", 120));
    let batcher = batcher(&mock, 100);

    let uids = batcher.query_fields("TS=(rare)", "./REC/UID", 500, 1).await.unwrap();

    assert_eq!(uids.len(), 120);
    assert_eq!(mock.calls().len(), 2, "third page would start past recordsFound");
}

#[tokio::test]
async fn test_pagination_respects_start_offset() {
    let mock = Arc::new(MockWos::new().with_generated("TS=(x)", 50));
    let batcher = batcher(&mock, 10);

    let uids = batcher.query_fields("TS=(x)", "REC/UID", 15, 21).await.unwrap();

    assert_eq!(uids.first().map(String::as_str), Some("WOS:000021"));
    assert_eq!(uids.last().map(String::as_str), Some("WOS:000035"));
    let offsets: Vec<usize> = mock.calls().iter().map(Call::offset).collect();
    assert_eq!(offsets, vec![21, 31]);
}

#[tokio::test]
async fn test_zero_count_issues_no_requests() {
    let mock = Arc::new(MockWos::new().with_generated("TS=(x)", 5));
    let batcher = batcher(&mock, 100);

    let uids = batcher.query_fields("TS=(x)", "./REC/UID", 0, 1).await.unwrap();

    assert!(uids.is_empty());
    assert!(mock.calls().is_empty());
}

// =============================================================================
// Output modes
// =============================================================================

#[tokio::test]
async fn test_query_xml_merges_pages_under_one_root() {
    let mock = Arc::new(MockWos::new().with_generated("TS=(merge)", 250));
    let batcher = batcher(&mock, 100);

    let doc = batcher.query_xml("TS=(merge)", 250, 1).await.unwrap();

    assert!(doc.starts_with("<?xml version=\"1.0\" ?>\n<records>"));
    assert_eq!(doc.matches("<?xml").count(), 1);
    assert_eq!(doc.matches("<records>").count(), 1);
    assert_eq!(doc.matches("</records>").count(), 1);
    assert_eq!(doc.matches("<REC>").count(), 250);
    assert!(!doc.contains("xmlns="), "namespace stripped from every page");

    // Still well-formed: every record is reachable by path
    let uids = xml::select(&doc, "./REC/UID").unwrap();
    assert_eq!(uids.len(), 250);
    assert_eq!(uids[0], "WOS:000001");
    assert_eq!(uids[249], "WOS:000250");
}

#[tokio::test]
async fn test_query_xml_no_results() {
    let mock = Arc::new(MockWos::new());
    let batcher = batcher(&mock, 100);

    let doc = batcher.query_xml("TS=(nothing)", 10, 1).await.unwrap();

    assert_eq!(doc, "<?xml version=\"1.0\" ?>\n<records>\n</records>\n");
    assert!(xml::select(&doc, "./REC").unwrap().is_empty());
}

#[tokio::test]
async fn test_query_fields_flattens_in_order() {
    let mock = Arc::new(MockWos::new().with_generated("TS=(order)", 30));
    let batcher = batcher(&mock, 7);

    let titles = batcher.query_fields("TS=(order)", "./REC/static_data/title", 30, 1).await.unwrap();

    let expected: Vec<String> = (1..=30).map(|i| format!("Paper {i}")).collect();
    assert_eq!(titles, expected);
}

#[tokio::test]
async fn test_query_fields_selector_without_matches() {
    let mock = Arc::new(MockWos::new().with_generated("TS=(x)", 3));
    let batcher = batcher(&mock, 100);

    let found = batcher.query_fields("TS=(x)", "./REC/DOI", 3, 1).await.unwrap();

    assert!(found.is_empty());
}

#[tokio::test]
async fn test_query_records_cuts_each_rec() {
    let mock = Arc::new(MockWos::new().with_generated("TS=(recs)", 12));
    let batcher = batcher(&mock, 5);

    let records = batcher.query_records("TS=(recs)", 12, 1).await.unwrap();

    assert_eq!(records.len(), 12);
    assert_eq!(records[4].uid.as_deref(), Some("WOS:000005"));
    assert!(records[4].xml.starts_with("<REC>"));
    assert!(records[4].xml.ends_with("</REC>"));
    assert_eq!(records[11].file_name().as_deref(), Some("000012.xml"));
}
