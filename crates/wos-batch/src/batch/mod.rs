//! Batch DOI processing.
//!
//! Two modes over one DOI list:
//! - IDs only: one `DO="…"` lookup per DOI, reported as `doi,accession`
//! - Full records: DOIs (or accession numbers) OR-joined into chunk queries,
//!   each returned record saved as its own XML file

mod doi;
mod processor;
mod resolver;
mod writer;

pub use doi::{chunk_queries, doi_query, parse_doi_line, read_doi_file};
pub use processor::{BatchOutput, BatchProcessor, BatchSummary};
pub use resolver::UID_SELECTOR;
pub use writer::{WriteOutcome, write_record};
