//! # Search — Sieve → Lucas–Lehmer → Perfect Number Pipeline
//!
//! Ties the components together:
//!
//! 1. **Validate** the configuration. Nothing is spawned on failure.
//! 2. **Sieve** candidate exponents below the limit and apply the exponent-2
//!    policy.
//! 3. **Partition** the exponent list into contiguous chunks, at most one per
//!    worker.
//! 4. **Dispatch** each chunk to a dedicated rayon pool. A worker runs the
//!    Lucas–Lehmer test over its chunk in order and synthesizes a perfect
//!    number for each Mersenne prime exponent.
//! 5. **Collect** per-chunk results, sort them by chunk index, and
//!    concatenate. Because chunks are contiguous runs of an ascending list, the
//!    result is ascending without a merge.
//!
//! ## Failure
//!
//! A worker that panics or detects an inconsistent synthesis fails its chunk.
//! All chunks run to completion (there is no cancellation), then the failure
//! with the lowest chunk index is returned as
//! [`SearchError::WorkerFailure`]. Partial results are never exposed.

use rayon::prelude::*;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::time::Instant;
use tracing::{debug, info};

use crate::config::{ExponentTwo, SearchConfig};
use crate::error::SearchError;
use crate::lucas_lehmer::is_mersenne_prime;
use crate::partition::{partition, Chunk};
use crate::perfect::PerfectNumber;
use crate::progress::Progress;
use crate::{estimate_digits, sieve};

/// Result of a completed search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Perfect numbers in ascending order.
    pub perfect_numbers: Vec<PerfectNumber>,
    pub exponents_tested: usize,
    pub chunks: usize,
    pub workers: usize,
}

/// Run the full pipeline for `config`.
pub fn search(config: &SearchConfig) -> Result<SearchOutcome, SearchError> {
    search_with_progress(config, None)
}

/// [`search`], reporting tested/found/chunk counts into `progress` as workers
/// run.
pub fn search_with_progress(
    config: &SearchConfig,
    progress: Option<&Progress>,
) -> Result<SearchOutcome, SearchError> {
    let workers = config.validate()?;
    let pool = build_pool(workers, config.qos)?;
    pool.install(|| run_pipeline(config, workers, &pool, progress))
}

fn run_pipeline(
    config: &SearchConfig,
    workers: usize,
    pool: &rayon::ThreadPool,
    progress: Option<&Progress>,
) -> Result<SearchOutcome, SearchError> {
    let sieve_start = Instant::now();
    let exponents = candidate_exponents(config.sieve_limit, config.exponent_two)?;
    info!(
        sieve_limit = config.sieve_limit,
        candidates = exponents.len(),
        exponent_two = %config.exponent_two,
        elapsed_ms = sieve_start.elapsed().as_millis() as u64,
        "candidate exponents ready"
    );

    let chunks = partition(&exponents, workers)?;
    if let Some(p) = progress {
        p.chunks_total.store(chunks.len() as u64, Ordering::Relaxed);
    }
    info!(workers, chunks = chunks.len(), "dispatching Lucas-Lehmer workers");

    let perfect_numbers = dispatch_and_collect(&chunks, pool, progress)?;
    info!(found = perfect_numbers.len(), "search complete");

    Ok(SearchOutcome {
        perfect_numbers,
        exponents_tested: exponents.len(),
        chunks: chunks.len(),
        workers,
    })
}

/// Exponents below `sieve_limit` after applying the exponent-2 policy.
pub fn candidate_exponents(
    sieve_limit: i64,
    exponent_two: ExponentTwo,
) -> Result<Vec<u64>, SearchError> {
    let mut exponents = sieve::generate_odd_primes(sieve_limit)?;
    if exponent_two == ExponentTwo::Exclude && exponents.first() == Some(&2) {
        exponents.remove(0);
    }
    Ok(exponents)
}

/// Run [`run_chunk`] over every chunk on `pool` and merge in chunk-index order.
pub fn dispatch_and_collect(
    chunks: &[Chunk],
    pool: &rayon::ThreadPool,
    progress: Option<&Progress>,
) -> Result<Vec<PerfectNumber>, SearchError> {
    dispatch_with(chunks, pool, |chunk| run_chunk(chunk, progress))
}

/// Fan out `worker` over `chunks` on `pool`, join, and concatenate by chunk
/// index.
///
/// A panic inside `worker` is caught and reported as a failure of that chunk.
/// When several chunks fail, the lowest index is reported.
pub fn dispatch_with<F>(
    chunks: &[Chunk],
    pool: &rayon::ThreadPool,
    worker: F,
) -> Result<Vec<PerfectNumber>, SearchError>
where
    F: Fn(&Chunk) -> Result<Vec<PerfectNumber>, String> + Sync,
{
    let mut outcomes: Vec<(usize, Result<Vec<PerfectNumber>, String>)> = pool.install(|| {
        chunks
            .par_iter()
            .map(|chunk| {
                let result = panic::catch_unwind(AssertUnwindSafe(|| worker(chunk)))
                    .unwrap_or_else(|payload| Err(panic_message(payload.as_ref())));
                (chunk.index, result)
            })
            .collect()
    });

    // Completion order is arbitrary; exposure order is by chunk index.
    outcomes.sort_unstable_by_key(|(index, _)| *index);

    let mut merged = Vec::new();
    for (chunk_index, result) in outcomes {
        match result {
            Ok(found) => merged.extend(found),
            Err(reason) => {
                return Err(SearchError::WorkerFailure {
                    chunk_index,
                    reason,
                })
            }
        }
    }
    Ok(merged)
}

/// Worker body: Lucas–Lehmer over the chunk in order, synthesizing a perfect
/// number for each Mersenne prime exponent.
pub fn run_chunk(
    chunk: &Chunk,
    progress: Option<&Progress>,
) -> Result<Vec<PerfectNumber>, String> {
    if let (Some(p), Some((lo, hi))) = (progress, chunk.bounds()) {
        p.set_current(format!("chunk {} p=[{}..{}]", chunk.index, lo, hi));
    }

    let mut found = Vec::new();
    for &exponent in &chunk.exponents {
        if is_mersenne_prime(exponent) {
            let n = PerfectNumber::from_exponent(exponent);
            if !n.is_consistent() {
                return Err(format!(
                    "arithmetic inconsistency synthesizing perfect number for p={}",
                    exponent
                ));
            }
            debug!(
                chunk = chunk.index,
                exponent,
                digits = estimate_digits(&n.value),
                "perfect number found"
            );
            if let Some(p) = progress {
                p.found.fetch_add(1, Ordering::Relaxed);
            }
            found.push(n);
        }
        if let Some(p) = progress {
            p.tested.fetch_add(1, Ordering::Relaxed);
        }
    }

    if let Some(p) = progress {
        p.chunks_done.fetch_add(1, Ordering::Relaxed);
    }
    Ok(found)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("worker panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("worker panicked: {}", s)
    } else {
        "worker panicked".to_string()
    }
}

/// Build the worker pool: `workers` threads, with the macOS user-initiated QoS
/// class applied to each thread when `qos` is set.
pub fn build_pool(workers: usize, qos: bool) -> Result<rayon::ThreadPool, SearchError> {
    let builder = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("perfecthunt-{}", i));

    #[cfg(target_os = "macos")]
    if qos {
        return builder
            .spawn_handler(|thread| {
                let mut b = std::thread::Builder::new();
                if let Some(name) = thread.name() {
                    b = b.name(name.to_owned());
                }
                b.spawn(move || {
                    // SAFETY: pthread_set_qos_class_self_np is a well-defined macOS API
                    // that sets the QoS class for the current thread. No memory safety concerns.
                    unsafe {
                        libc::pthread_set_qos_class_self_np(
                            libc::qos_class_t::QOS_CLASS_USER_INITIATED,
                            0,
                        );
                    }
                    thread.run();
                })?;
                Ok(())
            })
            .build()
            .map_err(|e| SearchError::invalid("worker_count", e.to_string()));
    }

    #[cfg(not(target_os = "macos"))]
    if qos {
        tracing::warn!("--qos flag is only effective on macOS, ignoring");
    }

    builder
        .build()
        .map_err(|e| SearchError::invalid("worker_count", e.to_string()))
}
