//! # Main — CLI Entry Point
//!
//! Routes subcommands to the search pipeline and its thin collaborators.
//!
//! ## Subcommands
//!
//! - `search`: sieve → Lucas–Lehmer → perfect numbers, printed as decimal
//!   lines or a JSON report, optionally written to a file.
//! - `check`: Lucas–Lehmer test for a single exponent.
//! - `primes`: list the candidate exponents the sieve produces.
//!
//! ## Global Options
//!
//! - `--config` / `PERFECTHUNT_CONFIG`: TOML file with `[search]` and `[output]`.
//! - `--threads` / `PERFECTHUNT_THREADS`: worker count (default: all cores).
//! - `--qos`: macOS QoS P-core scheduling via `pthread_set_qos_class_self_np`.
//!
//! Logging goes to stderr; `LOG_FORMAT=json` switches to JSON lines and
//! `RUST_LOG` sets the filter (default `info`).

mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use perfecthunt::config::ExponentTwo;
use perfecthunt::output::OutputFormat;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(
    name = "perfecthunt",
    about = "Search for even perfect numbers with the Lucas-Lehmer test"
)]
struct Cli {
    /// TOML configuration file with [search] and [output] sections
    #[arg(long, env = "PERFECTHUNT_CONFIG")]
    config: Option<PathBuf>,

    /// Number of worker threads (defaults to all logical cores)
    #[arg(long, short = 'j', env = "PERFECTHUNT_THREADS")]
    threads: Option<usize>,

    /// Set macOS QoS class to user-initiated for worker threads (P-core scheduling on Apple Silicon)
    #[arg(long)]
    qos: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find all even perfect numbers whose Mersenne exponent is below the sieve limit
    Search {
        /// Exclusive upper bound for candidate exponents
        #[arg(long, allow_negative_numbers = true)]
        sieve_limit: Option<i64>,
        /// Whether p=2 is a candidate exponent (`include` adds the perfect number 6)
        #[arg(long, value_enum)]
        exponent_two: Option<ExponentTwo>,
        /// Output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
        /// Write results to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
        /// Seconds between progress log lines
        #[arg(long, default_value_t = 30)]
        progress_secs: u64,
    },
    /// Run the Lucas-Lehmer test on a single exponent
    Check {
        /// Exponent p of the Mersenne number 2^p-1
        #[arg(long)]
        exponent: u64,
    },
    /// List candidate exponents produced by the sieve
    Primes {
        /// Exclusive upper bound
        #[arg(long, allow_negative_numbers = true)]
        limit: i64,
    },
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // Initialize structured logging: LOG_FORMAT=json for log shipping, human-readable otherwise
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();

    match &cli.command {
        Commands::Search {
            sieve_limit,
            exponent_two,
            format,
            output,
            progress_secs,
        } => cli::run_search(
            &cli,
            *sieve_limit,
            *exponent_two,
            *format,
            output.as_deref(),
            *progress_secs,
        ),
        Commands::Check { exponent } => cli::run_check(*exponent),
        Commands::Primes { limit } => cli::run_primes(*limit),
    }
}
