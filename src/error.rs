//! # Error — Failure Surface of the Search Pipeline
//!
//! Two conditions reach the caller of [`crate::search::search`]:
//!
//! - **InvalidArgument**: malformed configuration (negative or oversized sieve
//!   limit, zero workers). Raised before any worker is spawned.
//! - **WorkerFailure**: a chunk's execution terminated abnormally (panic or an
//!   arithmetic inconsistency detected by the worker). Carries the chunk index.
//!
//! There is no retry path. Every computation in the pipeline is pure and
//! deterministic, so a failure points at a programming or resource fault.

/// Errors surfaced by the perfect-number search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// A configuration value was rejected before any computation started.
    InvalidArgument { name: &'static str, reason: String },
    /// The worker processing `chunk_index` failed; no partial result is returned.
    WorkerFailure { chunk_index: usize, reason: String },
}

impl SearchError {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        SearchError::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    /// Chunk index of a worker failure, `None` for configuration errors.
    pub fn chunk_index(&self) -> Option<usize> {
        match self {
            SearchError::WorkerFailure { chunk_index, .. } => Some(*chunk_index),
            SearchError::InvalidArgument { .. } => None,
        }
    }
}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchError::InvalidArgument { name, reason } => {
                write!(f, "invalid argument `{}`: {}", name, reason)
            }
            SearchError::WorkerFailure {
                chunk_index,
                reason,
            } => write!(f, "worker for chunk {} failed: {}", chunk_index, reason),
        }
    }
}

impl std::error::Error for SearchError {}
