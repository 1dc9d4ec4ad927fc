//! Argo profile ingester.
//!
//! Scans one directory (non-recursively) for profile files and ingests
//! each into the PostgreSQL catalog in its own transaction.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use ingestion::{IngestConfig, IngestOptions, Ingester};
use storage::Catalog;

#[derive(Parser, Debug)]
#[command(name = "ingester")]
#[command(about = "Ingest a directory of Argo profile NetCDF files")]
struct Args {
    /// Directory containing profile files
    dir: PathBuf,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    let config = IngestConfig::from_env()?;
    info!(
        dir = %args.dir.display(),
        chunk_size = config.chunk_size,
        extension = %config.extension,
        "Starting Argo profile ingester"
    );

    let catalog = Catalog::connect(&config.database_url, config.max_connections)
        .await
        .context("Failed to connect to database")?;
    catalog.migrate().await.context("Failed to migrate schema")?;

    let store = Arc::new(catalog.clone());
    let ingester = Ingester::new(store, IngestOptions::from(&config));

    let result = ingester.ingest_directory(&args.dir).await;

    catalog.close().await;

    let report = result?;
    if report.total() == 0 {
        warn!(dir = %args.dir.display(), "No matching files found");
    }
    info!(
        total = report.total(),
        committed = report.committed,
        skipped = report.skipped,
        failed = report.failed,
        "Ingestion finished"
    );

    Ok(())
}
