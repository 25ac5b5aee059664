//! # Output — Presentation of Search Results
//!
//! The pipeline returns perfect numbers as big integers and does no I/O. This
//! module turns a finished search into either newline-separated decimal text
//! (one perfect number per line) or a JSON report, and writes it to any
//! `io::Write` or atomically to a file (write `.tmp`, then rename).

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::config::ExponentTwo;
use crate::perfect::PerfectNumber;
use crate::search::SearchOutcome;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One decimal perfect number per line.
    #[default]
    Text,
    /// Structured report with exponents, digit counts, and run statistics.
    Json,
}

/// One perfect number as it appears in the JSON report.
#[derive(Debug, Serialize)]
pub struct ReportEntry {
    pub exponent: u64,
    pub digits: u64,
    pub value: String,
}

impl From<&PerfectNumber> for ReportEntry {
    fn from(n: &PerfectNumber) -> Self {
        let value = n.value.to_string_radix(10);
        ReportEntry {
            exponent: n.exponent,
            digits: value.len() as u64,
            value,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchReport {
    pub sieve_limit: i64,
    pub exponent_two: ExponentTwo,
    pub workers: usize,
    pub chunks: usize,
    pub exponents_tested: usize,
    pub elapsed_secs: f64,
    pub completed_at: DateTime<Utc>,
    pub perfect_numbers: Vec<ReportEntry>,
}

impl SearchReport {
    pub fn new(
        sieve_limit: i64,
        exponent_two: ExponentTwo,
        outcome: &SearchOutcome,
        elapsed_secs: f64,
    ) -> Self {
        SearchReport {
            sieve_limit,
            exponent_two,
            workers: outcome.workers,
            chunks: outcome.chunks,
            exponents_tested: outcome.exponents_tested,
            elapsed_secs,
            completed_at: Utc::now(),
            perfect_numbers: outcome.perfect_numbers.iter().map(ReportEntry::from).collect(),
        }
    }
}

/// Write one decimal integer per line.
pub fn write_text<W: Write>(w: &mut W, numbers: &[PerfectNumber]) -> std::io::Result<()> {
    for n in numbers {
        writeln!(w, "{}", n.value)?;
    }
    Ok(())
}

/// Write the report as pretty-printed JSON followed by a newline.
pub fn write_json<W: Write>(w: &mut W, report: &SearchReport) -> Result<()> {
    serde_json::to_writer_pretty(&mut *w, report)?;
    writeln!(w)?;
    Ok(())
}

/// Render a finished search in the requested format.
pub fn render(format: OutputFormat, numbers: &[PerfectNumber], report: &SearchReport) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    match format {
        OutputFormat::Text => write_text(&mut buf, numbers)?,
        OutputFormat::Json => write_json(&mut buf, report)?,
    }
    Ok(buf)
}

/// Write `contents` to `path` atomically via a `.tmp` sibling and rename.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome() -> SearchOutcome {
        SearchOutcome {
            perfect_numbers: [3u64, 5, 7]
                .iter()
                .map(|&p| PerfectNumber::from_exponent(p))
                .collect(),
            exponents_tested: 4,
            chunks: 2,
            workers: 2,
        }
    }

    #[test]
    fn text_is_one_decimal_per_line() {
        let mut buf = Vec::new();
        write_text(&mut buf, &outcome().perfect_numbers).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "28\n496\n8128\n");
    }

    #[test]
    fn text_of_nothing_is_empty() {
        let mut buf = Vec::new();
        write_text(&mut buf, &[]).unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn json_report_fields() {
        let o = outcome();
        let report = SearchReport::new(8, ExponentTwo::Exclude, &o, 0.25);
        let bytes = render(OutputFormat::Json, &o.perfect_numbers, &report).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(v["sieve_limit"], 8);
        assert_eq!(v["exponent_two"], "exclude");
        assert_eq!(v["workers"], 2);
        assert_eq!(v["exponents_tested"], 4);
        assert_eq!(v["perfect_numbers"][2]["exponent"], 7);
        assert_eq!(v["perfect_numbers"][2]["digits"], 4);
        assert_eq!(v["perfect_numbers"][2]["value"], "8128");
        assert!(v["completed_at"].is_string());
    }

    #[test]
    fn atomic_write_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("perfect.txt");
        write_atomic(&path, b"old\n").unwrap();
        write_atomic(&path, b"28\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "28\n");
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn format_parses_from_toml_names() {
        #[derive(Deserialize)]
        struct W {
            f: OutputFormat,
        }
        let w: W = toml::from_str("f = \"text\"").unwrap();
        assert_eq!(w.f, OutputFormat::Text);
    }
}
