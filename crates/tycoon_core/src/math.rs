//! Fixed-point math utilities for deterministic resolution.
//!
//! Every random draw in the engine is a fixed-point number, and every rate
//! derived from a draw is kept in per-mille units until the final
//! rounding. Two runs fed the same draws produce bit-identical state on
//! every platform, which floating-point cannot promise.
//!
//! Rates with no random component (percentages of a stat) never touch
//! fixed-point at all: they use integer arithmetic so that exact multiples
//! round exactly.

use fixed::types::I32F32;

/// Fixed-point number type for all engine math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
/// A uniform draw in `[0, 1)` maps exactly onto the fractional bits.
pub type Fixed = I32F32;

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

/// Build a probability from a percentage (`percent(25)` is 0.25).
#[must_use]
pub fn percent(value: i32) -> Fixed {
    Fixed::from_num(value) / Fixed::from_num(100)
}

/// `floor(value * pct / 100)` in exact integer arithmetic.
#[must_use]
pub const fn percent_floor(value: i64, pct: i64) -> i64 {
    (value * pct).div_euclid(100)
}

/// `ceil(value * pct / 100)` in exact integer arithmetic.
#[must_use]
pub const fn percent_ceil(value: i64, pct: i64) -> i64 {
    -((-value * pct).div_euclid(100))
}

/// `floor(draw * range)`: a uniform integer in `0..range` for a draw in `[0, 1)`.
#[must_use]
pub fn roll_below(draw: Fixed, range: i32) -> i32 {
    (draw * Fixed::from_num(range)).floor().to_num::<i32>()
}

/// A rate in per-mille units: `base + draw * spread`.
///
/// `banded_permille(50, d, 50)` is a rate uniformly spread over
/// 5.0%..10.0%. The result is exact: no division happens here.
#[must_use]
pub fn banded_permille(base: i32, draw: Fixed, spread: i32) -> Fixed {
    Fixed::from_num(base) + draw * Fixed::from_num(spread)
}

/// `ceil(value * rate / 1000)` for a per-mille rate.
#[must_use]
pub fn permille_ceil(value: i64, rate: Fixed) -> i64 {
    (Fixed::from_num(value) * rate / Fixed::from_num(1000))
        .ceil()
        .to_num::<i64>()
}

/// `floor(value * rate / 1000)` for a per-mille rate.
#[must_use]
pub fn permille_floor(value: i64, rate: Fixed) -> i64 {
    (Fixed::from_num(value) * rate / Fixed::from_num(1000))
        .floor()
        .to_num::<i64>()
}
