//! traceload - Load diagnostic traces and server logs into MongoDB
//!
//! Converts SQL Server Profiler traces, Process Monitor exports, Event
//! Viewer exports and IIS/HTTPERR logs into typed documents.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use traceload_core::{LoadSummary, MemoryStore, MongoStore, ProgressContext};

mod config;
mod import;

use config::Config;
use import::InputType;

#[derive(Parser, Debug)]
#[command(name = "traceload")]
#[command(about = "Load trace and log files into MongoDB collections")]
#[command(version)]
pub struct Cli {
    /// File to be imported
    pub importfile: PathBuf,

    /// Database to import to
    pub database: String,

    /// Collection to insert to
    pub destcollection: String,

    /// MongoDB connection string (default: config file, then mongodb://localhost)
    #[arg(short, long)]
    pub mongodb: Option<String>,

    /// Input type
    #[arg(short = 't', long = "type", value_enum, default_value_t = InputType::Sql)]
    pub input_type: InputType,

    /// Empty the destination collection(s) before importing
    #[arg(long)]
    pub drop: bool,

    /// Parse and coerce everything without connecting to a database
    #[arg(long)]
    pub dry_run: bool,

    /// Config file path (default: ./traceload.toml or ~/.config/traceload/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Maximum retry attempts for transient store failures
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect)
    let progress = ProgressContext::new();
    let multi = progress.is_tty().then(|| progress.multi());
    traceload_core::init_logging(cli.quiet, cli.debug, multi);

    match run(&cli, &progress) {
        Ok(summary) => {
            import::print_report(&summary, &progress);
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, progress: &ProgressContext) -> Result<LoadSummary> {
    let config = Config::load(cli.config.as_deref())?;

    if cli.dry_run {
        log::info!("Dry run: documents are kept in memory only");
        let store = MemoryStore::new();
        return import::run(cli, &config, &store, progress);
    }

    let uri = cli.mongodb.as_deref().unwrap_or(config.store.uri());
    let store = MongoStore::connect(uri, &cli.database)
        .with_context(|| format!("Failed to connect to {uri}"))?;
    log::info!("Connected to {uri}, database {}", cli.database);
    import::run(cli, &config, &store, progress)
}
