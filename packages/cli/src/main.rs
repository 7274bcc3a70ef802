#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the utility lookup toolchain.
//!
//! `serve` starts the HTTP API in-process; `lookup`, `batch`, and
//! `validate` drive the resolution engine directly against a single
//! address, a CSV of addresses, or a CSV of tenant ground truth.

mod batch;
mod lookup;
mod validate;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

/// Exit code for malformed input: a missing file, an unreadable CSV, a
/// bad address argument.
const EXIT_USER_ERROR: u8 = 1;
/// Exit code for a failure that is not the caller's fault: the engine
/// could not finish loading, a downstream request timed out.
const EXIT_TRANSIENT: u8 = 2;

#[derive(Parser)]
#[command(name = "utility_lookup_cli", about = "Resolve US utility providers for an address", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve electric, gas, water, and sewer providers for one address.
    Lookup {
        address: String,
        /// Bypass the result cache.
        #[arg(long)]
        no_cache: bool,
    },
    /// Resolve every address in a CSV file (one `address` column).
    Batch {
        csv_path: PathBuf,
        /// Write JSON results here instead of printing a summary.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Start the HTTP API server.
    Serve,
    /// Compare engine output against a tenant ground-truth CSV.
    Validate {
        /// Columns: address, state, electric, gas, water, sewer.
        csv_path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let multi = utility_lookup_cli_utils::init_logger();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Lookup { address, no_cache } => lookup::run(&address, no_cache).await,
        Command::Batch { csv_path, output } => batch::run(&csv_path, output.as_deref(), &multi).await,
        Command::Serve => utility_lookup_server::run_server().await.map_err(CliError::from),
        Command::Validate { csv_path } => validate::run(&csv_path, &multi).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            let code = if matches!(e, CliError::UserError(_)) { EXIT_USER_ERROR } else { EXIT_TRANSIENT };
            ExitCode::from(code)
        }
    }
}

/// Errors surfaced at the top level, mapped to an exit code in `main`.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    UserError(String),

    #[error("{0}")]
    Internal(String),

    #[error("engine failed to load: {0}")]
    Engine(#[from] utility_lookup_server::EngineError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}
