use clap::Parser;
use colored::Colorize;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use docsync_core::{config::CREDENTIALS_VAR, SyncConfig};
use docsync_dbt::DiscoveryClient;
use docsync_catalog::{BigQueryAdapter, WarehouseAdapter};
use docsync_engine::{SyncEvent, SyncOptions, SyncSummary, Synchronizer};

/// docsync - Propagate inherited dbt column descriptions into BigQuery
#[derive(Parser)]
#[command(name = "docsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Merge descriptions and report, but do not write any table
    #[arg(long)]
    dry_run: bool,

    /// Models per Discovery API page (overrides DOCSYNC_PAGE_SIZE)
    #[arg(long)]
    page_size: Option<u32>,

    /// Service-account key file (overrides GOOGLE_APPLICATION_CREDENTIALS)
    #[arg(long)]
    credentials: Option<PathBuf>,

    /// Load variables from this file instead of ./.env
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    load_env_file(cli.env_file.as_deref())?;
    init_tracing(cli.verbose);

    let config = load_config(&cli).context("Configuration error")?;

    if cli.verbose {
        eprintln!("{} environment {}", "Syncing".cyan(), config.environment_id);
        eprintln!("{} {}", "Discovery API:".cyan(), config.discovery_endpoint());
    }

    let catalog = DiscoveryClient::from_config(&config)?;
    let warehouse = BigQueryAdapter::from_service_account_file(&config.credentials_path)
        .await
        .context("Failed to create warehouse client")?;

    if cli.verbose {
        eprintln!("{} {}", "Connected to".cyan(), warehouse.name());
    }

    let options = SyncOptions::from_config(&config).with_dry_run(cli.dry_run);
    let sync = Synchronizer::new(&catalog, &warehouse, options);

    let summary = sync
        .run(|event| {
            if let Some(line) = event_line(event) {
                println!("{}", line);
            }
        })
        .await?;

    if cli.verbose {
        print_summary(&summary, cli.dry_run);
    }

    Ok(())
}

/// Load a dotenv file; a missing default `.env` is not an error
fn load_env_file(path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("Failed to load env file {}", path.display()))?;
        }
        None => {
            if let Err(e) = dotenvy::dotenv() {
                if !e.not_found() {
                    return Err(e).context("Failed to load .env");
                }
            }
        }
    }
    Ok(())
}

/// Install the stderr log subscriber; stdout stays reserved for results
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "info,docsync_dbt=debug,docsync_engine=debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();
}

/// Build the run configuration, applying command-line overrides
fn load_config(cli: &Cli) -> Result<SyncConfig> {
    let mut config = SyncConfig::from_lookup(|name| match (&cli.credentials, name) {
        (Some(path), CREDENTIALS_VAR) => Some(path.display().to_string()),
        _ => std::env::var(name).ok(),
    })?;

    if let Some(page_size) = cli.page_size {
        config = config.with_page_size(page_size)?;
    }

    Ok(config)
}

/// Console line for an event, if it has one
fn event_line(event: &SyncEvent) -> Option<String> {
    match event {
        SyncEvent::NoModels => Some("No models found".to_string()),
        SyncEvent::Updated(update) => Some(format!("Updated table {}", update.table.table)),
        SyncEvent::WouldUpdate(update) => Some(format!("Would update table {}", update.table.table)),
        SyncEvent::Skipped { .. } => None,
    }
}

/// Print run summary to stderr
fn print_summary(summary: &SyncSummary, dry_run: bool) {
    eprintln!();
    eprintln!("{}", "Summary:".bold());
    eprintln!("  Models:   {}", summary.models);
    eprintln!("  Skipped:  {}", summary.skipped);

    let verb = if dry_run { "Would update" } else { "Updated" };
    if summary.tables > 0 {
        eprintln!("  {}: {} tables, {} fields", verb, summary.tables.to_string().green(), summary.fields);
    } else {
        eprintln!("  {}: {}", verb, "nothing".yellow());
    }
}
