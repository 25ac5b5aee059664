//! # Lucas–Lehmer — Deterministic Mersenne Primality
//!
//! Decides whether M_p = 2^p − 1 is prime for an odd exponent p ≥ 3.
//!
//! ## Algorithm
//!
//! Start with s₀ = 4 and iterate sᵢ₊₁ = sᵢ² − 2 (mod M_p) for p − 2 steps.
//! M_p is prime if and only if s_{p−2} ≡ 0 (mod M_p). The test is
//! deterministic: no witnesses, no error probability.
//!
//! ## Mersenne Fold
//!
//! Reduction modulo 2^p − 1 needs no division. Since 2^p ≡ 1 (mod M_p),
//! x ≡ (x mod 2^p) + ⌊x / 2^p⌋, i.e. `(x & M_p) + (x >> p)`. A squared residue
//! has at most 2p bits, so one or two folds bring it below 2^p, and a final
//! comparison maps M_p itself to 0. The `− 2` step borrows M_p when s² < 2 so
//! the residue never goes negative.
//!
//! ## Complexity
//!
//! p − 2 squarings of p-bit numbers: O(p · M(p)) where M is GMP's
//! multiplication cost.
//!
//! ## References
//!
//! - D.H. Lehmer, "An Extended Theory of Lucas' Functions", Annals of
//!   Mathematics, 31(3), 1930.
//! - OEIS [A000043](https://oeis.org/A000043) — Mersenne prime exponents.

use rug::Integer;

use crate::checked_u32;

/// M_p = 2^p − 1.
pub fn mersenne_number(p: u32) -> Integer {
    (Integer::from(1u32) << p) - 1u32
}

/// Lucas–Lehmer test for M_p = 2^p − 1.
///
/// `p = 2` is special-cased to `true` (M_2 = 3); the iteration count p − 2 is
/// meaningless there. `p < 2` and even `p > 2` return `false` without
/// iterating, since M_p is then 0, 1, or divisible by 3.
pub fn is_mersenne_prime(p: u64) -> bool {
    match p {
        0 | 1 => return false,
        2 => return true,
        _ if p % 2 == 0 => return false,
        _ => {}
    }

    let bits = checked_u32(p);
    let m = mersenne_number(bits);
    let mut s = Integer::from(4u32);
    for _ in 0..p - 2 {
        s.square_mut();
        if s < 2 {
            s += &m;
        }
        s -= 2u32;
        reduce_mersenne(&mut s, bits, &m);
    }
    s == 0
}

/// The Mersenne candidate result: `Some(2^p − 1)` when it is prime.
pub fn mersenne_prime(p: u64) -> Option<Integer> {
    if is_mersenne_prime(p) {
        Some(mersenne_number(checked_u32(p)))
    } else {
        None
    }
}

/// Reduce a non-negative `x` into `[0, m)` where `m = 2^p − 1`.
fn reduce_mersenne(x: &mut Integer, p: u32, m: &Integer) {
    while x.significant_bits() > p {
        let hi = Integer::from(&*x >> p);
        x.keep_bits_mut(p);
        *x += hi;
    }
    if *x == *m {
        *x = Integer::new();
    }
}
