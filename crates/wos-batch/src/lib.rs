//! Web of Science batch client
//!
//! Queries the Web of Science (WOS) SOAP API and resolves DOI lists to WOS
//! records.
//!
//! # Features
//!
//! - **Paginated queries**: results beyond the per-request record limit are
//!   fetched page by page and merged into one `<records>` document
//! - **Field selection**: pull element text with a path selector such as `./REC/UID`
//! - **Batch DOI resolution**: bounded concurrency with a fixed cooldown per job
//! - **Full-record export**: chunked `DO=(… OR …)` / `UT=(…)` queries, one XML
//!   file per record
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use wos_batch::{client::WosClient, config::Config, query::QueryBatcher};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let client = Arc::new(WosClient::new(config.clone())?);
//!     client.authenticate().await?;
//!
//!     let batcher = QueryBatcher::new(Arc::clone(&client), &config);
//!     println!("{}", batcher.doi_to_wos("10.1038/nature12373").await?);
//!
//!     client.close_session().await?;
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod formatters;
pub mod models;
pub mod query;
pub mod xml;

pub use batch::BatchProcessor;
pub use client::{WosClient, WosSearch};
pub use config::Config;
pub use error::{BatchError, ClientError, XmlError};
pub use query::QueryBatcher;
