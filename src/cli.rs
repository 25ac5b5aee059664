//! # CLI Execution Functions
//!
//! Extracted from `main.rs` to keep the entry point slim. Resolves the
//! configuration (file, then flags), runs the pipeline with a progress
//! reporter, and hands results to the output module.

use anyhow::Result;
use perfecthunt::config::{self, ExponentTwo, FileConfig, Overrides};
use perfecthunt::output::{self, OutputFormat, SearchReport};
use perfecthunt::perfect::PerfectNumber;
use perfecthunt::{lucas_lehmer, progress, search, sieve};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::info;

use super::Cli;

// ── Search ──────────────────────────────────────────────────────

pub fn run_search(
    cli: &Cli,
    sieve_limit: Option<i64>,
    exponent_two: Option<ExponentTwo>,
    format: Option<OutputFormat>,
    output_path: Option<&Path>,
    progress_secs: u64,
) -> Result<()> {
    let file = match &cli.config {
        Some(path) => config::parse_toml_file(path)?,
        None => FileConfig::default(),
    };
    let config = file.resolve(&Overrides {
        sieve_limit,
        workers: cli.threads,
        exponent_two,
        qos: cli.qos,
    })?;
    let format = format.or(file.output.format).unwrap_or_default();
    let output_path = output_path.or(file.output.path.as_deref());

    info!(
        sieve_limit = config.sieve_limit,
        workers = config.resolved_workers(),
        exponent_two = %config.exponent_two,
        "perfecthunt starting"
    );

    let progress = progress::Progress::new();
    let reporter = progress.start_reporter(Duration::from_secs(progress_secs.max(1)));

    let start = Instant::now();
    let result = search::search_with_progress(&config, Some(&*progress));
    progress.stop();
    reporter
        .join()
        .map_err(|_| anyhow::anyhow!("progress reporter thread panicked"))?;
    let outcome = result?;
    let elapsed = start.elapsed().as_secs_f64();

    info!(
        found = outcome.perfect_numbers.len(),
        exponents_tested = outcome.exponents_tested,
        elapsed_secs = format_args!("{:.3}", elapsed),
        "time taken to find perfect numbers"
    );

    let report = SearchReport::new(config.sieve_limit, config.exponent_two, &outcome, elapsed);
    let bytes = output::render(format, &outcome.perfect_numbers, &report)?;
    match output_path {
        Some(path) => {
            output::write_atomic(path, &bytes)?;
            info!(path = %path.display(), "results written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

// ── Single Exponent ─────────────────────────────────────────────

pub fn run_check(exponent: u64) -> Result<()> {
    if exponent > u32::MAX as u64 {
        anyhow::bail!("exponent {} exceeds {}", exponent, u32::MAX);
    }
    let start = Instant::now();
    let prime = lucas_lehmer::is_mersenne_prime(exponent);
    info!(
        exponent,
        prime,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Lucas-Lehmer test complete"
    );

    let mut out = std::io::stdout().lock();
    if prime {
        let n = PerfectNumber::from_exponent(exponent);
        writeln!(out, "2^{}-1 is prime", exponent)?;
        writeln!(out, "perfect number {} ({} digits)", n.expression(), n.digits())?;
        writeln!(out, "{}", n.value)?;
    } else {
        writeln!(out, "2^{}-1 is {}", exponent, non_prime_verdict(exponent))?;
    }
    Ok(())
}

/// 2^0 − 1 = 0 and 2^1 − 1 = 1 are neither prime nor composite.
fn non_prime_verdict(exponent: u64) -> &'static str {
    if exponent < 2 {
        "not prime"
    } else {
        "composite"
    }
}

// ── Candidate Listing ───────────────────────────────────────────

pub fn run_primes(limit: i64) -> Result<()> {
    let primes = sieve::generate_odd_primes(limit)?;
    info!(limit, count = primes.len(), "sieve complete");
    let mut out = BufWriter::new(std::io::stdout().lock());
    for p in primes {
        writeln!(out, "{}", p)?;
    }
    out.flush()?;
    Ok(())
}
