//! Bounded-concurrency batch runs.

use std::ops::AddAssign;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};

use crate::client::WosSearch;
use crate::config::Config;
use crate::error::{BatchError, BatchResult};
use crate::models::{BatchMode, IdMapping, MatchField};
use crate::query::QueryBatcher;

use super::doi::{chunk_queries, read_doi_file};
use super::writer::{WriteOutcome, write_record};

/// Counts from a full-record run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Chunk queries issued.
    pub chunks: usize,
    /// Records written pretty-printed.
    pub pretty: usize,
    /// Records written raw after pretty-printing failed.
    pub raw: usize,
    /// Records without a UID.
    pub skipped: usize,
    /// Chunks whose result page could not be parsed.
    pub failed: usize,
}

impl BatchSummary {
    /// Records written to disk in either form.
    #[must_use]
    pub const fn written(&self) -> usize {
        self.pretty + self.raw
    }

    fn record(&mut self, outcome: &WriteOutcome) {
        match outcome {
            WriteOutcome::Pretty(_) => self.pretty += 1,
            WriteOutcome::Raw(_) => self.raw += 1,
            WriteOutcome::Skipped => self.skipped += 1,
        }
    }
}

impl AddAssign for BatchSummary {
    fn add_assign(&mut self, other: Self) {
        self.chunks += other.chunks;
        self.pretty += other.pretty;
        self.raw += other.raw;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// Result of [`BatchProcessor::run_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutput {
    /// One mapping per input DOI, in input order.
    Ids(Vec<IdMapping>),
    /// Files written by a full-record run.
    Records(BatchSummary),
}

/// Runs DOI batches with at most `speed_limit` jobs in flight.
pub struct BatchProcessor<C: ?Sized> {
    batcher: QueryBatcher<C>,
    speed_limit: usize,
    match_field: MatchField,
    out_dir: PathBuf,
}

impl<C: WosSearch + ?Sized> BatchProcessor<C> {
    /// Create a processor writing into the current directory.
    #[must_use]
    pub fn new(client: Arc<C>, config: &Config) -> Self {
        Self {
            batcher: QueryBatcher::new(client, config),
            speed_limit: config.speed_limit.max(1),
            match_field: MatchField::Doi,
            out_dir: PathBuf::from("."),
        }
    }

    /// Match chunk queries against `field` instead of DOIs.
    #[must_use]
    pub fn with_match_field(mut self, field: MatchField) -> Self {
        self.match_field = field;
        self
    }

    /// Write record files into `dir`.
    #[must_use]
    pub fn with_out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = dir.into();
        self
    }

    /// Underlying query executor.
    #[must_use]
    pub const fn batcher(&self) -> &QueryBatcher<C> {
        &self.batcher
    }

    /// Resolve every DOI to its accession number, keeping input order.
    pub async fn resolve_ids(&self, dois: &[String]) -> BatchResult<Vec<IdMapping>> {
        tracing::info!(count = dois.len(), "Retrieving WOS IDs for DOIs, please wait...");

        stream::iter(dois)
            .map(|doi| self.batcher.resolve_doi(doi))
            .buffered(self.speed_limit)
            .try_collect()
            .await
    }

    /// Fetch the full records for `ids` in chunk queries and save one file per record.
    pub async fn fetch_full_records(&self, ids: &[String]) -> BatchResult<BatchSummary> {
        tracing::info!(count = ids.len(), "Querying WOS for DOIs, please wait...");
        tokio::fs::create_dir_all(&self.out_dir)
            .await
            .map_err(|e| BatchError::io(&self.out_dir, e))?;

        let queries = chunk_queries(ids, self.batcher.record_limit(), self.match_field);

        stream::iter(queries)
            .map(|query| async move { self.run_chunk(&query).await })
            .buffered(self.speed_limit)
            .try_fold(BatchSummary::default(), |mut total, chunk| async move {
                total += chunk;
                Ok(total)
            })
            .await
    }

    /// Run one chunk query. A page that cannot be parsed fails this chunk only.
    async fn run_chunk(&self, query: &str) -> BatchResult<BatchSummary> {
        let mut summary = BatchSummary { chunks: 1, ..BatchSummary::default() };

        let records = match self.batcher.query_records(query, self.batcher.record_limit(), 1).await {
            Ok(records) => records,
            Err(BatchError::Xml(e)) => {
                tracing::error!(query, error = %e, "Could not parse chunk results, skipping chunk");
                tokio::time::sleep(self.batcher.delay()).await;
                summary.failed = 1;
                return Ok(summary);
            }
            Err(e) => return Err(e),
        };

        for record in &records {
            let outcome = write_record(&self.out_dir, record).await?;
            summary.record(&outcome);
        }

        tokio::time::sleep(self.batcher.delay()).await;
        tracing::info!(records = records.len(), written = summary.written(), "Chunk done");
        Ok(summary)
    }

    /// Read a DOI list file and process it in `mode`.
    pub async fn run_file(&self, path: &Path, mode: BatchMode) -> BatchResult<BatchOutput> {
        let ids = read_doi_file(path).await?;

        match mode {
            BatchMode::IdsOnly => Ok(BatchOutput::Ids(self.resolve_ids(&ids).await?)),
            BatchMode::FullRecords => Ok(BatchOutput::Records(self.fetch_full_records(&ids).await?)),
        }
    }
}
