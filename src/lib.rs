//! # perfecthunt — Even Perfect Numbers via Lucas–Lehmer
//!
//! Finds even perfect numbers by the Euclid–Euler construction: sieve the
//! prime exponents below a limit, run the Lucas–Lehmer test on each in
//! parallel chunks, and turn every Mersenne prime 2^p − 1 into the perfect
//! number 2^(p−1)·(2^p − 1).
//!
//! ```no_run
//! use perfecthunt::{search, SearchConfig};
//!
//! let outcome = search(&SearchConfig::new(20).with_workers(4))?;
//! for n in &outcome.perfect_numbers {
//!     println!("{}", n.value);
//! }
//! # Ok::<(), perfecthunt::SearchError>(())
//! ```

pub mod config;
pub mod error;
pub mod lucas_lehmer;
pub mod output;
pub mod partition;
pub mod perfect;
pub mod progress;
pub mod search;
pub mod sieve;

use rug::Integer;

pub use config::{ExponentTwo, SearchConfig};
pub use error::SearchError;
pub use lucas_lehmer::is_mersenne_prime;
pub use partition::{partition, Chunk};
pub use perfect::{synthesize, PerfectNumber};
pub use search::{dispatch_and_collect, search, search_with_progress, SearchOutcome};
pub use sieve::generate_odd_primes;

/// Convert an exponent to the `u32` bit count big-integer shifts take.
///
/// # Panics
/// Panics if `n` exceeds `u32::MAX`. The sieve never produces such exponents.
pub fn checked_u32(n: u64) -> u32 {
    u32::try_from(n).unwrap_or_else(|_| panic!("exponent {} exceeds u32::MAX", n))
}

/// Estimate decimal digit count from bit length, avoiding expensive to_string conversion.
pub fn estimate_digits(n: &Integer) -> u64 {
    let bits = n.significant_bits();
    if bits == 0 {
        return 1;
    }
    (bits as f64 * std::f64::consts::LOG10_2) as u64 + 1
}

/// Exact decimal digit count (expensive for very large numbers).
pub fn exact_digits(n: &Integer) -> u64 {
    n.to_string_radix(10).len() as u64
}
