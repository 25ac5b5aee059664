//! # Config — Search Configuration
//!
//! [`SearchConfig`] is the validated input of the pipeline: the sieve limit,
//! the worker count, and the exponent-2 policy. It can be built in code or
//! assembled from an optional TOML file merged with CLI flags (flags win).
//!
//! ```toml
//! [search]
//! sieve_limit = 10000
//! workers = 8
//! exponent_two = "include"
//!
//! [output]
//! format = "json"
//! path = "perfect.json"
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::SearchError;
use crate::output::OutputFormat;
use crate::sieve::MAX_SIEVE_LIMIT;

/// How the degenerate exponent p = 2 is handled.
///
/// Lucas–Lehmer needs p ≥ 3 for its p − 2 iterations to mean anything, so by
/// default 2 is dropped from the candidate list. `Include` keeps it and the
/// tester special-cases M_2 = 3 as prime, contributing the perfect number 6.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ExponentTwo {
    #[default]
    Exclude,
    Include,
}

impl std::fmt::Display for ExponentTwo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExponentTwo::Exclude => write!(f, "exclude"),
            ExponentTwo::Include => write!(f, "include"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Exclusive upper bound for candidate Mersenne exponents.
    pub sieve_limit: i64,
    /// Worker count; `None` means available hardware parallelism.
    #[serde(default)]
    pub workers: Option<usize>,
    #[serde(default)]
    pub exponent_two: ExponentTwo,
    /// macOS only: run pool threads at the user-initiated QoS class.
    #[serde(default)]
    pub qos: bool,
}

impl SearchConfig {
    pub fn new(sieve_limit: i64) -> Self {
        SearchConfig {
            sieve_limit,
            workers: None,
            exponent_two: ExponentTwo::default(),
            qos: false,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn with_exponent_two(mut self, policy: ExponentTwo) -> Self {
        self.exponent_two = policy;
        self
    }

    pub fn resolved_workers(&self) -> usize {
        self.workers.unwrap_or_else(default_workers)
    }

    /// Check every value and return the resolved worker count.
    pub fn validate(&self) -> Result<usize, SearchError> {
        if self.sieve_limit < 0 {
            return Err(SearchError::invalid(
                "sieve_limit",
                format!("must be non-negative, got {}", self.sieve_limit),
            ));
        }
        if self.sieve_limit > MAX_SIEVE_LIMIT {
            return Err(SearchError::invalid(
                "sieve_limit",
                format!("must be at most {}, got {}", MAX_SIEVE_LIMIT, self.sieve_limit),
            ));
        }
        let workers = self.resolved_workers();
        if workers == 0 {
            return Err(SearchError::invalid("worker_count", "must be at least 1"));
        }
        Ok(workers)
    }
}

/// Available hardware parallelism, falling back to a single worker.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

// ── TOML File ───────────────────────────────────────────────────

/// Optional configuration file. Every field may be overridden by a CLI flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub search: SearchSection,
    #[serde(default)]
    pub output: OutputSection,
}

/// The `[search]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchSection {
    pub sieve_limit: Option<i64>,
    pub workers: Option<usize>,
    pub exponent_two: Option<ExponentTwo>,
    pub qos: Option<bool>,
}

/// The `[output]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    pub format: Option<OutputFormat>,
    pub path: Option<PathBuf>,
}

/// Values given on the command line; each takes precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub sieve_limit: Option<i64>,
    pub workers: Option<usize>,
    pub exponent_two: Option<ExponentTwo>,
    pub qos: bool,
}

impl FileConfig {
    /// Merge CLI overrides over the file's `[search]` section.
    pub fn resolve(&self, overrides: &Overrides) -> Result<SearchConfig> {
        let sieve_limit = overrides
            .sieve_limit
            .or(self.search.sieve_limit)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "--sieve-limit is required (or set search.sieve_limit in the config file)"
                )
            })?;
        Ok(SearchConfig {
            sieve_limit,
            workers: overrides.workers.or(self.search.workers),
            exponent_two: overrides
                .exponent_two
                .or(self.search.exponent_two)
                .unwrap_or_default(),
            qos: overrides.qos || self.search.qos.unwrap_or(false),
        })
    }
}

/// Parse a configuration file from a TOML string.
pub fn parse_toml(content: &str) -> Result<FileConfig> {
    let config: FileConfig = toml::from_str(content)?;
    if config.search.workers == Some(0) {
        anyhow::bail!("search.workers must be at least 1");
    }
    Ok(config)
}

/// Parse a configuration file from a path.
pub fn parse_toml_file(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("cannot read config {}: {}", path.display(), e))?;
    parse_toml(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = SearchConfig::new(100);
        assert_eq!(c.exponent_two, ExponentTwo::Exclude);
        assert_eq!(c.workers, None);
        assert!(c.resolved_workers() >= 1);
        assert_eq!(c.validate().unwrap(), c.resolved_workers());
    }

    #[test]
    fn negative_limit_rejected() {
        let err = SearchConfig::new(-5).validate().unwrap_err();
        assert!(matches!(
            err,
            SearchError::InvalidArgument {
                name: "sieve_limit",
                ..
            }
        ));
    }

    #[test]
    fn oversized_limit_rejected() {
        assert!(SearchConfig::new(MAX_SIEVE_LIMIT + 1).validate().is_err());
        assert!(SearchConfig::new(MAX_SIEVE_LIMIT).validate().is_ok());
    }

    #[test]
    fn zero_workers_rejected() {
        let err = SearchConfig::new(100).with_workers(0).validate().unwrap_err();
        assert!(matches!(
            err,
            SearchError::InvalidArgument {
                name: "worker_count",
                ..
            }
        ));
    }

    #[test]
    fn parse_full_file() {
        let config = parse_toml(
            r#"
            [search]
            sieve_limit = 10000
            workers = 8
            exponent_two = "include"
            qos = true

            [output]
            format = "json"
            path = "perfect.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.search.sieve_limit, Some(10_000));
        assert_eq!(config.search.workers, Some(8));
        assert_eq!(config.search.exponent_two, Some(ExponentTwo::Include));
        assert_eq!(config.search.qos, Some(true));
        assert_eq!(config.output.format, Some(OutputFormat::Json));
        assert_eq!(config.output.path, Some(PathBuf::from("perfect.json")));
    }

    #[test]
    fn parse_empty_file() {
        assert_eq!(parse_toml("").unwrap(), FileConfig::default());
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!(parse_toml("[search]\nlimit = 5\n").is_err());
        assert!(parse_toml("[extra]\n").is_err());
    }

    #[test]
    fn zero_workers_in_file_rejected() {
        let err = parse_toml("[search]\nworkers = 0\n").unwrap_err();
        assert!(err.to_string().contains("workers"));
    }

    #[test]
    fn overrides_win_over_file() {
        let file = parse_toml(
            "[search]\nsieve_limit = 100\nworkers = 2\nexponent_two = \"include\"\n",
        )
        .unwrap();
        let merged = file
            .resolve(&Overrides {
                sieve_limit: Some(50),
                workers: Some(6),
                exponent_two: Some(ExponentTwo::Exclude),
                qos: false,
            })
            .unwrap();
        assert_eq!(merged.sieve_limit, 50);
        assert_eq!(merged.workers, Some(6));
        assert_eq!(merged.exponent_two, ExponentTwo::Exclude);
    }

    #[test]
    fn file_fills_missing_overrides() {
        let file = parse_toml("[search]\nsieve_limit = 100\nexponent_two = \"include\"\n").unwrap();
        let merged = file.resolve(&Overrides::default()).unwrap();
        assert_eq!(merged, SearchConfig::new(100).with_exponent_two(ExponentTwo::Include));
    }

    #[test]
    fn missing_limit_is_an_error() {
        let err = FileConfig::default()
            .resolve(&Overrides::default())
            .unwrap_err();
        assert!(err.to_string().contains("--sieve-limit"));
    }

    #[test]
    fn parse_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("perfecthunt.toml");
        std::fs::write(&path, "[search]\nsieve_limit = 64\n").unwrap();
        let config = parse_toml_file(&path).unwrap();
        assert_eq!(config.search.sieve_limit, Some(64));

        let missing = parse_toml_file(&dir.path().join("missing.toml")).unwrap_err();
        assert!(missing.to_string().contains("cannot read config"));
    }
}
