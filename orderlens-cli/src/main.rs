// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! orderlens CLI - order history and payment transactions from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Import session cookies from a "Copy as cURL" command
//! orderlens import-curl "curl 'https://www.amazon.com/your-orders/orders' -b '...'"
//!
//! # Orders of the current year
//! orderlens orders
//!
//! # Orders of 2023 with items and payment charges
//! orderlens orders --year 2023 --details --transactions
//!
//! # One order as JSON
//! orderlens order 112-4559127-2161020 --format json --pretty
//!
//! # Check that the saved session still works
//! orderlens check
//! ```

mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use orderlens_scrape::ScrapeError;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{check, import, order, orders, transactions, years};

// ============================================================================
// CLI Definition
// ============================================================================

/// orderlens CLI - order history export.
#[derive(Parser)]
#[command(name = "orderlens")]
#[command(about = "Order history and payment transaction export")]
#[command(long_about = r#"
orderlens reads your order history and payment transactions using the
session cookies of a signed-in browser.

Getting started:
  1. Sign in to Amazon in your browser
  2. Open https://www.amazon.com/your-orders/orders
  3. In DevTools > Network, right-click the page request > Copy as cURL
  4. orderlens import-curl "<paste>"

Examples:
  orderlens orders                         # Current year
  orderlens orders --year 2023 --details   # With line items
  orderlens orders --from 2023-06-01 --to 2024-02-29
  orderlens order 112-4559127-2161020      # One order
  orderlens --format json orders           # JSON output
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Named account; selects its own cookie file.
    #[arg(long, short, global = true)]
    pub account: Option<String>,

    /// Explicit cookie file path. Overrides --account.
    #[arg(long, global = true, value_name = "PATH")]
    pub cookie_file: Option<PathBuf>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Minimum delay between requests, in milliseconds.
    #[arg(long, global = true, value_name = "MS")]
    pub rate_limit_ms: Option<u64>,

    /// Retries per request after the first attempt.
    #[arg(long, global = true, value_name = "N")]
    pub max_retries: Option<u32>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// List orders for a year or date range.
    #[command(visible_alias = "o")]
    Orders(orders::OrdersArgs),

    /// Show one order's details.
    Order(order::OrderArgs),

    /// Show payment transactions for one or more orders.
    #[command(visible_alias = "tx")]
    Transactions(transactions::TransactionsArgs),

    /// List the years that have orders.
    Years,

    /// Import session cookies from a "Copy as cURL" command.
    ImportCurl(import::ImportArgs),

    /// Check that the saved session can open the order page.
    Check,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// No usable session cookies.
    MissingCredentials = 2,
    /// Session cookies rejected or expired.
    SessionExpired = 3,
    /// Stopped by Ctrl-C; partial results were printed.
    Interrupted = 130,
}

impl ExitCode {
    /// Picks the exit code for a failed command.
    fn for_error(error: &anyhow::Error) -> Self {
        match error.downcast_ref::<ScrapeError>() {
            Some(ScrapeError::MissingCredentials) => Self::MissingCredentials,
            Some(e) if e.is_auth() => Self::SessionExpired,
            _ => Self::Error,
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let default_directive = if verbose {
        "orderlens=debug,info"
    } else {
        "orderlens=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(verbose)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Orders(args) => orders::run(args, &cli).await,
        Commands::Order(args) => order::run(args, &cli).await,
        Commands::Transactions(args) => transactions::run(args, &cli).await,
        Commands::Years => years::run(&cli).await,
        Commands::ImportCurl(args) => import::run(args, &cli).await,
        Commands::Check => check::run(&cli).await,
    };

    match result {
        Ok(commands::Completion::Done) => Ok(()),
        Ok(commands::Completion::Interrupted) => {
            std::process::exit(ExitCode::Interrupted as i32);
        }
        Err(e) => {
            let code = ExitCode::for_error(&e);
            if !cli.quiet {
                eprintln!("Error: {e}");
                if matches!(code, ExitCode::MissingCredentials | ExitCode::SessionExpired) {
                    eprintln!();
                    eprintln!("{}", commands::IMPORT_HINT);
                }
            }
            std::process::exit(code as i32);
        }
    }
}
