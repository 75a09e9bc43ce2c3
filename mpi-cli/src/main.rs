//! Command-line client for 3-D Secure MPI services.
//!
//! # Usage
//!
//! ```bash
//! # Start a session against the fixture tables
//! mpi-cli --mock --protocol v2 lookup --card 4532840681197602 --month 12 --year 2030 \
//!     --amount 125.00 --currency USD --redirect-uri https://shop.example.com/return
//!
//! # Query a transaction using mpi.toml
//! mpi-cli query 1
//!
//! # Configure logging level
//! RUST_LOG=debug mpi-cli query 1
//! ```
//!
//! # Environment Variables
//!
//! - `MPI_CONFIG`: Path to TOML configuration file (default: `mpi.toml`)
//! - `MPI_URL`, `MPI_API_KEY`, `MPI_VERSION`: Override the file values
//! - `RUST_LOG`: Log level filter (default: `info`)
//!
//! Results are written to stdout as JSON: `{"success": ...}` or
//! `{"service_error": ...}`.

use std::io::Write;

use clap::Parser;
use mpi::{MockTransport, ProtocolVersion};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use mpi_cli::args::{Cli, Command, query_options};
use mpi_cli::config;

/// Base URL used with `--mock` when none is configured.
const MOCK_URL: &str = "https://mpi.invalid";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!("MPI call failed: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }

    let cli = Cli::parse();
    let mut config = config::load_from(&cli.config)?;
    cli.apply(&mut config);
    tracing::info!(
        url = config.url.as_deref().unwrap_or("<unset>"),
        version = config.version.as_deref().unwrap_or("v1"),
        mock = cli.mock,
        "Loaded configuration"
    );

    if cli.mock && config.url.is_none() {
        config.url = Some(MOCK_URL.to_owned());
    }
    let version: ProtocolVersion = config
        .version
        .as_deref()
        .map_or(Ok(ProtocolVersion::default()), str::parse)?;

    let mut builder = config.into_builder();
    if cli.mock {
        builder = builder.transport(MockTransport::new(version));
    }
    let service = builder.build()?;

    match &cli.command {
        Command::Lookup(args) => emit(&service.lookup(&args.to_request()).await?),
        Command::Query { id, user_agent } => {
            let options = query_options(user_agent.as_deref());
            emit(&service.query(id.as_str(), &options).await?)
        }
        Command::Update(args) => {
            emit(&service.update(args.id.as_str(), &args.to_request()).await?)
        }
    }
}

fn emit<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
