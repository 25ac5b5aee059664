//! # Partition — Contiguous Chunking of the Exponent List
//!
//! Splits the ordered exponent list into at most `worker_count` contiguous
//! chunks, one per worker. Chunk `i` holds a contiguous run of exponents that
//! all precede those of chunk `i + 1`, so concatenating per-chunk results in
//! index order gives a globally ascending sequence with no merge step.
//!
//! ## Boundary Policy
//!
//! With `L` exponents and `W` workers:
//!
//! - `chunks = min(W, L)` (no empty chunks are ever produced),
//! - `size = L / chunks`,
//! - chunks `0 .. chunks − 1` hold `size` exponents each,
//! - the final chunk holds `size + L % chunks`.
//!
//! Lucas–Lehmer cost grows roughly as p² log p, so the final chunks carry most
//! of the work; balancing by cost is not attempted.

use crate::error::SearchError;

/// A contiguous, indexed run of exponents assigned to exactly one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    pub exponents: Vec<u64>,
}

impl Chunk {
    pub fn len(&self) -> usize {
        self.exponents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exponents.is_empty()
    }

    /// Inclusive exponent range covered, for log lines.
    pub fn bounds(&self) -> Option<(u64, u64)> {
        Some((*self.exponents.first()?, *self.exponents.last()?))
    }
}

/// Split `exponents` into at most `worker_count` contiguous chunks.
///
/// Fails with [`SearchError::InvalidArgument`] when `worker_count` is zero.
pub fn partition(exponents: &[u64], worker_count: usize) -> Result<Vec<Chunk>, SearchError> {
    if worker_count == 0 {
        return Err(SearchError::invalid("worker_count", "must be at least 1"));
    }
    let len = exponents.len();
    if len == 0 {
        return Ok(vec![]);
    }

    let chunks = worker_count.min(len);
    let size = len / chunks;
    Ok((0..chunks)
        .map(|index| {
            let start = index * size;
            let end = if index + 1 == chunks {
                len
            } else {
                start + size
            };
            Chunk {
                index,
                exponents: exponents[start..end].to_vec(),
            }
        })
        .collect())
}
