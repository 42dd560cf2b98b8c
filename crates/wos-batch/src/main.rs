//! Web of Science batch client - Entry Point
//!
//! Runs single queries, DOI lookups and batch DOI files against the WOS SOAP API.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use wos_batch::batch::BatchOutput;
use wos_batch::formatters;
use wos_batch::models::{BatchMode, MatchField, OutputFormat};
use wos_batch::{BatchProcessor, Config, QueryBatcher, WosClient};

#[derive(Parser, Debug)]
#[command(name = "wos-batch")]
#[command(about = "Web of Science client with batch DOI resolution")]
#[command(version)]
struct Cli {
    /// WOS username (optional, IP-based access otherwise)
    #[arg(long, env = "WOS_USER")]
    user: Option<String>,

    /// WOS password
    #[arg(long, env = "WOS_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Base URL of the WOKMWS services
    #[arg(long, env = "WOS_BASE_URL")]
    base_url: Option<String>,

    /// Maximum records per request
    #[arg(long)]
    record_limit: Option<usize>,

    /// Batch jobs in flight at once
    #[arg(long)]
    speed_limit: Option<usize>,

    /// Seconds each batch job sleeps after its request
    #[arg(long)]
    delay: Option<f64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a query and print the merged XML (or selected fields)
    Query {
        /// Query in WOS syntax, e.g. TS=(cadmium)
        query: String,

        /// Path of the element to print, e.g. ./REC/UID
        #[arg(long)]
        xpath: Option<String>,

        /// Number of records to fetch
        #[arg(long, default_value = "5")]
        count: usize,

        /// 1-based index of the first record
        #[arg(long, default_value = "1")]
        offset: usize,
    },

    /// Print `doi,accession` for one DOI
    Doi {
        /// DOI to look up
        doi: String,
    },

    /// Process a file holding one line of comma-separated DOIs
    Batch {
        /// DOI list file
        file: PathBuf,

        /// Only resolve accession numbers instead of saving full records
        #[arg(long)]
        only_id: bool,

        /// Treat the list as WOS accession numbers (UT=) instead of DOIs
        #[arg(long, conflicts_with = "only_id")]
        ut: bool,

        /// Directory for record files
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// ID table format (with --only-id)
        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
    },
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so stdout stays clean for XML and ID tables
    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::from_env()?;

    if cli.user.is_some() {
        config.user.clone_from(&cli.user);
    }
    if cli.password.is_some() {
        config.password.clone_from(&cli.password);
    }
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url)?;
    }
    if let Some(limit) = cli.record_limit {
        config.record_limit = limit;
    }
    if let Some(speed) = cli.speed_limit {
        config.speed_limit = speed;
    }
    if let Some(delay) = cli.delay {
        config.delay = Duration::try_from_secs_f64(delay)?;
    }

    config.validate()?;
    Ok(config)
}

async fn run(command: Command, client: Arc<WosClient>, config: &Config) -> anyhow::Result<()> {
    match command {
        Command::Query { query, xpath, count, offset } => {
            let batcher = QueryBatcher::new(client, config);
            match xpath {
                Some(selector) => {
                    for field in batcher.query_fields(&query, &selector, count, offset).await? {
                        println!("{field}");
                    }
                }
                None => println!("{}", batcher.query_xml(&query, count, offset).await?),
            }
        }
        Command::Doi { doi } => {
            let batcher = QueryBatcher::new(client, config);
            println!("{}", batcher.doi_to_wos(&doi).await?);
        }
        Command::Batch { file, only_id, ut, out_dir, format } => {
            let field = if ut { MatchField::Ut } else { MatchField::Doi };
            let mode = if only_id { BatchMode::IdsOnly } else { BatchMode::FullRecords };
            let processor = BatchProcessor::new(client, config)
                .with_match_field(field)
                .with_out_dir(out_dir);

            match processor.run_file(&file, mode).await? {
                BatchOutput::Ids(mappings) => {
                    print!("{}", formatters::format_id_table(&mappings, format)?);
                }
                BatchOutput::Records(summary) => {
                    tracing::info!(
                        chunks = summary.chunks,
                        pretty = summary.pretty,
                        raw = summary.raw,
                        skipped = summary.skipped,
                        failed = summary.failed,
                        "Batch complete"
                    );
                }
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting wos-batch");

    let config = build_config(&cli)?;
    let client = Arc::new(WosClient::new(config.clone())?);
    client.authenticate().await?;

    let result = run(cli.command, Arc::clone(&client), &config).await;

    if let Err(e) = client.close_session().await {
        tracing::warn!(error = %e, "Failed to close session");
    }

    result
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use clap::error::ErrorKind;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_ut_rejected_with_only_id() {
        let err = Cli::try_parse_from(["wos-batch", "batch", "dois.txt", "--only-id", "--ut"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_ut_accepted_for_full_records() {
        let cli = Cli::try_parse_from(["wos-batch", "batch", "ids.txt", "--ut"]).unwrap();
        let Command::Batch { ut, only_id, .. } = cli.command else {
            panic!("expected batch command");
        };
        assert!(ut);
        assert!(!only_id);
    }
}
