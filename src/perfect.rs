//! # Perfect — Euclid–Euler Synthesis
//!
//! Every even perfect number is 2^(p−1) · (2^p − 1) where 2^p − 1 is a
//! Mersenne prime, and every such product is perfect. The same value is the
//! triangular number T(m) = m(m + 1)/2 with m = 2^p − 1.
//!
//! Values grow as 2^(2p−1): the perfect number for p = 9941 has 5985 digits.

use rug::Integer;
use serde::Serialize;

use crate::lucas_lehmer::mersenne_number;
use crate::{checked_u32, exact_digits};

/// Even perfect number for a Mersenne prime exponent `p`: 2^(p−1) · (2^p − 1).
///
/// The caller is responsible for `p` being a Mersenne prime exponent; for other
/// exponents the product is computed but is not perfect.
pub fn synthesize(p: u64) -> Integer {
    let bits = checked_u32(p);
    mersenne_number(bits) << bits.saturating_sub(1)
}

/// A perfect number together with the exponent it was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerfectNumber {
    pub exponent: u64,
    #[serde(serialize_with = "serialize_decimal")]
    pub value: Integer,
}

impl PerfectNumber {
    pub fn from_exponent(exponent: u64) -> Self {
        PerfectNumber {
            exponent,
            value: synthesize(exponent),
        }
    }

    /// Exact decimal digit count.
    pub fn digits(&self) -> u64 {
        exact_digits(&self.value)
    }

    /// `2^(p−1)·(2^p − 1)` as a readable expression.
    pub fn expression(&self) -> String {
        format!("2^{}*(2^{}-1)", self.exponent.saturating_sub(1), self.exponent)
    }

    /// Structural check of the Euclid–Euler form: exactly p − 1 trailing zero
    /// bits, and the odd part equals 2^p − 1.
    pub fn is_consistent(&self) -> bool {
        let Ok(bits) = u32::try_from(self.exponent) else {
            return false;
        };
        if bits < 2 {
            return false;
        }
        if self.value.find_one(0) != Some(bits - 1) {
            return false;
        }
        Integer::from(&self.value >> (bits - 1)) == mersenne_number(bits)
    }
}

fn serialize_decimal<S: serde::Serializer>(value: &Integer, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&value.to_string_radix(10))
}
