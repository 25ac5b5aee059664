//! # Sieve — Mersenne Exponent Candidates
//!
//! Produces the ordered list of primes below a limit. Every Mersenne prime
//! 2^p − 1 has a prime exponent p, so this list is the complete candidate set
//! for the Lucas–Lehmer stage.
//!
//! ## Algorithm: Odd-Only Sieve of Eratosthenes
//!
//! Even numbers are never stored. Bit `i` of an [`OddSieve`] stands for the odd
//! value `lo + 2i`; for the unsegmented sieve `lo = 1`, so index `i` is the
//! value `2i + 1` and `idx(v) = v / 2`. For each odd `v ≤ ⌈√limit⌉` still
//! marked, multiples are cleared from `v²` with a value stride of `2v`, which is
//! a stride of `v` in index space. Value 2 is prepended explicitly.
//!
//! ## Segmentation
//!
//! Above [`SEGMENT_ODDS`] odd values the range is split into fixed-size
//! segments. Base primes up to `⌈√limit⌉` come from the plain odd sieve; each
//! segment is then sieved independently (in parallel via rayon) with its own
//! bitset, and the per-segment prime lists are concatenated in segment order.
//! Memory per segment stays at 32 KiB regardless of the limit.
//!
//! Complexity: O(n log log n) time, O(√n + segment) working space.

use rayon::prelude::*;

use crate::error::SearchError;

/// Odd values per segment (2^18 bits = 32 KiB, sized for L1/L2 residency).
pub const SEGMENT_ODDS: usize = 1 << 18;

/// Largest accepted sieve limit. Exponents must fit in `u32` because
/// big-integer shifts take a `u32` bit count.
pub const MAX_SIEVE_LIMIT: i64 = 1 << 32;

/// Generate all primes strictly below `limit`: 2 first, then odd primes ascending.
///
/// `limit ≤ 2` yields an empty list. Negative limits and limits above
/// [`MAX_SIEVE_LIMIT`] are rejected with [`SearchError::InvalidArgument`].
pub fn generate_odd_primes(limit: i64) -> Result<Vec<u64>, SearchError> {
    if limit < 0 {
        return Err(SearchError::invalid(
            "sieve_limit",
            format!("must be non-negative, got {}", limit),
        ));
    }
    if limit > MAX_SIEVE_LIMIT {
        return Err(SearchError::invalid(
            "sieve_limit",
            format!("must be at most {}, got {}", MAX_SIEVE_LIMIT, limit),
        ));
    }
    Ok(segmented_odd_primes(limit as u64, SEGMENT_ODDS))
}

/// Segment-size-parameterised driver behind [`generate_odd_primes`].
fn segmented_odd_primes(limit: u64, segment_odds: usize) -> Vec<u64> {
    if limit <= 2 {
        return vec![];
    }
    let odd_count = (limit / 2) as usize;
    if odd_count <= segment_odds {
        return simple_odd_primes(limit);
    }

    let root = ceil_sqrt(limit);
    // Base primes <= root; the leading 2 is skipped since only odd values are stored.
    let base = simple_odd_primes(root + 1);
    let base_odd = &base[1..];

    let span = 2 * segment_odds as u64;
    let num_segments = odd_count.div_ceil(segment_odds);
    let segments: Vec<Vec<u64>> = (0..num_segments)
        .into_par_iter()
        .map(|k| {
            let lo = 1 + k as u64 * span;
            let hi = (lo + span).min(limit);
            sieve_segment(lo, hi, base_odd)
        })
        .collect();

    let mut primes = Vec::with_capacity(prime_count_estimate(limit));
    primes.push(2);
    for seg in segments {
        primes.extend(seg);
    }
    primes
}

/// Plain odd-only sieve over `[1, limit)`. Returns `[2] ++ odd primes`.
fn simple_odd_primes(limit: u64) -> Vec<u64> {
    if limit <= 2 {
        return vec![];
    }
    let len = (limit / 2) as usize;
    let mut sieve = OddSieve::new_all_set(1, len);
    sieve.clear(0); // 1 is not prime

    let root = ceil_sqrt(limit);
    let mut v = 3u64;
    while v <= root {
        if sieve.get((v / 2) as usize) {
            let mut j = (v * v / 2) as usize;
            while j < len {
                sieve.clear(j);
                j += v as usize;
            }
        }
        v += 2;
    }

    let mut primes = Vec::with_capacity(prime_count_estimate(limit));
    primes.push(2);
    primes.extend(sieve.values());
    primes
}

/// Sieve the odd values in `[lo, hi)` (`lo` odd) against odd base primes.
fn sieve_segment(lo: u64, hi: u64, base_odd: &[u64]) -> Vec<u64> {
    let len = ((hi - lo + 1) / 2) as usize;
    let mut bits = OddSieve::new_all_set(lo, len);
    if lo == 1 {
        bits.clear(0);
    }
    for &p in base_odd {
        let pp = p * p;
        if pp >= hi {
            break;
        }
        let mut start = if pp >= lo { pp } else { lo.div_ceil(p) * p };
        if start % 2 == 0 {
            start += p;
        }
        let mut j = ((start - lo) / 2) as usize;
        while j < len {
            bits.clear(j);
            j += p as usize;
        }
    }
    bits.values().collect()
}

/// Smallest `r` with `r * r >= n`. Defined for every `u64`; the result never
/// exceeds 2^32.
pub fn ceil_sqrt(n: u64) -> u64 {
    let sq = |r: u64| r as u128 * r as u128;
    let target = n as u128;
    let mut r = (n as f64).sqrt() as u64;
    while sq(r) < target {
        r += 1;
    }
    while r > 0 && sq(r - 1) >= target {
        r -= 1;
    }
    r
}

/// Upper-leaning estimate of π(n), used to reserve capacity.
pub fn prime_count_estimate(n: u64) -> usize {
    if n < 10 {
        return 4;
    }
    let nf = n as f64;
    (1.3 * nf / nf.ln()) as usize
}

/// Packed bit array over consecutive odd values `lo, lo + 2, lo + 4, ...`.
///
/// A set bit means no divisor has been found for that value yet. Bit layout:
/// bit `i` lives in word `i / 64` at position `i % 64`.
pub struct OddSieve {
    words: Vec<u64>,
    len: usize,
    lo: u64,
}

impl OddSieve {
    /// Create a sieve of `len` odd values starting at `lo`, all marked.
    pub fn new_all_set(lo: u64, len: usize) -> Self {
        debug_assert!(lo % 2 == 1, "OddSieve must start on an odd value, got {}", lo);
        let num_words = len.div_ceil(64);
        let mut words = vec![u64::MAX; num_words];
        // Clear unused high bits in the last word
        let extra = num_words * 64 - len;
        if extra > 0 {
            words[num_words - 1] >>= extra;
        }
        OddSieve { words, len, lo }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Odd value represented by bit `index`.
    #[inline]
    pub fn value_of(&self, index: usize) -> u64 {
        self.lo + 2 * index as u64
    }

    #[inline]
    pub fn get(&self, index: usize) -> bool {
        debug_assert!(
            index < self.len,
            "OddSieve index out of bounds: {} >= {}",
            index,
            self.len
        );
        self.words[index / 64] & (1u64 << (index % 64)) != 0
    }

    #[inline]
    pub fn clear(&mut self, index: usize) {
        debug_assert!(index < self.len);
        self.words[index / 64] &= !(1u64 << (index % 64));
    }

    /// Number of values still marked, via hardware POPCNT.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Indices of all set bits in ascending order.
    pub fn iter_set_bits(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(wi, &word)| BitIter {
            word,
            base: wi * 64,
        })
    }

    /// Values of all set bits in ascending order.
    pub fn values(&self) -> impl Iterator<Item = u64> + '_ {
        self.iter_set_bits().map(|i| self.value_of(i))
    }
}

/// Iterator over set bits within a single u64 word.
struct BitIter {
    word: u64,
    base: usize,
}

impl Iterator for BitIter {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.word == 0 {
            return None;
        }
        let tz = self.word.trailing_zeros() as usize;
        self.word &= self.word - 1; // clear lowest set bit
        Some(self.base + tz)
    }
}
