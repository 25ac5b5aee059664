//! Property-based tests for perfecthunt's pipeline components.
//!
//! These tests use the `proptest` framework to check invariants across
//! randomly generated inputs rather than a handful of known values.
//!
//! # How to run
//!
//! ```bash
//! cargo test --test property_tests
//!
//! # Increase case count for thorough testing (default is 256):
//! PROPTEST_CASES=10000 cargo test --test property_tests
//! ```
//!
//! # Testing strategy
//!
//! - **Sieve**: output equals trial division, is strictly ascending, and
//!   rejects every negative limit.
//! - **Partition**: order-preserving union, bounded chunk count, boundary
//!   policy.
//! - **Lucas–Lehmer / synthesis**: agreement with GMP Miller–Rabin, and the
//!   Euclid–Euler bit structure of every synthesized value.
//! - **Pipeline**: identical output across repeated runs and worker counts.
//!
//! Each property is named `prop_<function>_<invariant>`.

use perfecthunt::lucas_lehmer::{is_mersenne_prime, mersenne_number};
use perfecthunt::{
    estimate_digits, exact_digits, generate_odd_primes, partition, search, synthesize,
    PerfectNumber, SearchConfig, SearchError,
};
use proptest::prelude::*;
use rug::integer::IsPrime;

fn is_prime_trial(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    let mut d = 2;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 1;
    }
    true
}

// == Sieve =====================================================================

proptest! {
    /// Every limit up to 10,000 yields exactly the primes below it.
    #[test]
    fn prop_generate_odd_primes_matches_trial_division(limit in 0i64..10_000) {
        let primes = generate_odd_primes(limit).unwrap();
        let expected: Vec<u64> = (2..limit as u64).filter(|&n| is_prime_trial(n)).collect();
        prop_assert_eq!(primes, expected);
    }

    /// Output is strictly ascending with 2 first and only odd values after it.
    #[test]
    fn prop_generate_odd_primes_strictly_ascending(limit in 3i64..2_000_000) {
        let primes = generate_odd_primes(limit).unwrap();
        prop_assert_eq!(primes[0], 2);
        prop_assert!(primes.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(primes[1..].iter().all(|p| p % 2 == 1));
        prop_assert!(*primes.last().unwrap() < limit as u64);
    }

    /// Any negative limit is an InvalidArgument.
    #[test]
    fn prop_generate_odd_primes_rejects_negative(limit in i64::MIN..0) {
        let is_invalid = matches!(
            generate_odd_primes(limit),
            Err(SearchError::InvalidArgument { .. })
        );
        prop_assert!(is_invalid);
    }
}

// == Partition =================================================================

proptest! {
    /// Concatenated chunks reproduce the input, chunk count never exceeds the
    /// worker count, and only the final chunk differs in size.
    #[test]
    fn prop_partition_preserves_order_and_bounds(
        len in 0usize..500,
        workers in 1usize..64,
    ) {
        let exponents: Vec<u64> = (0..len as u64).map(|i| 2 * i + 3).collect();
        let chunks = partition(&exponents, workers).unwrap();
        prop_assert!(chunks.len() <= workers);
        prop_assert_eq!(chunks.len(), workers.min(len));

        let flat: Vec<u64> = chunks.iter().flat_map(|c| c.exponents.clone()).collect();
        prop_assert_eq!(&flat, &exponents);

        if !chunks.is_empty() {
            let size = len / chunks.len();
            for (i, c) in chunks.iter().enumerate() {
                prop_assert_eq!(c.index, i);
                if i + 1 < chunks.len() {
                    prop_assert_eq!(c.len(), size);
                } else {
                    prop_assert_eq!(c.len(), size + len % chunks.len());
                }
            }
        }
    }
}

// == Lucas–Lehmer and Synthesis ================================================

proptest! {
    /// The Lucas–Lehmer verdict matches GMP's Miller–Rabin on 2^p − 1.
    #[test]
    fn prop_is_mersenne_prime_matches_miller_rabin(half in 1u32..150) {
        let p = 2 * half + 1;
        let mr = mersenne_number(p).is_probably_prime(30) != IsPrime::No;
        prop_assert_eq!(is_mersenne_prime(p as u64), mr, "p = {}", p);
    }

    /// Every synthesized value is 2^p − 1 shifted left by p − 1 bits.
    #[test]
    fn prop_synthesize_has_euclid_euler_structure(p in 2u64..3000) {
        let n = PerfectNumber::from_exponent(p);
        prop_assert!(n.is_consistent());
        prop_assert_eq!(n.value.find_one(0), Some(p as u32 - 1));
        prop_assert_eq!(n.value.significant_bits(), 2 * p as u32 - 1);
        prop_assert_eq!(synthesize(p), n.value);
    }

    #[test]
    fn prop_estimate_digits_within_one(p in 2u64..2000) {
        let v = synthesize(p);
        let est = estimate_digits(&v) as i64;
        let exact = exact_digits(&v) as i64;
        prop_assert!((est - exact).abs() <= 1, "p = {}: {} vs {}", p, est, exact);
    }
}

// == Pipeline ==================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Two runs with the same configuration agree, and so does a single worker.
    #[test]
    fn prop_search_is_deterministic(limit in 0i64..400, workers in 1usize..9) {
        let config = SearchConfig::new(limit).with_workers(workers);
        let first = search(&config).unwrap();
        let second = search(&config).unwrap();
        prop_assert_eq!(&first.perfect_numbers, &second.perfect_numbers);

        let serial = search(&SearchConfig::new(limit).with_workers(1)).unwrap();
        prop_assert_eq!(&first.perfect_numbers, &serial.perfect_numbers);
        prop_assert!(first
            .perfect_numbers
            .windows(2)
            .all(|w| w[0].value < w[1].value));
    }
}
