// Copyright 2025 the KTMath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! ULP-distance equality for `f64`.
//!
//! Two doubles are treated as equal when the number of representable values
//! separating them is at most a caller-chosen count of "units". The distance
//! is taken between the raw IEEE 754 bit patterns, which are ordered the same
//! way as the values they encode as long as both values share a sign.
//!
//! ## Edge cases
//!
//! - Values with different sign bits are only equal when they compare equal
//!   numerically, which covers `+0.0 == -0.0`.
//! - NaN is not special-cased. A NaN sits a fixed bit distance from the
//!   infinities and from other NaN payloads, so `NaN` may compare equal to a
//!   NaN with a nearby payload, or to `±inf` for a large enough `units`.
//! - `f64::MAX` and `+inf` are one unit apart.
//!
//! The relation is symmetric but not transitive near the tolerance boundary.

/// Tolerance used by [`compare`] and by [`Range`](crate::Range).
pub const DEFAULT_ULPS: u64 = 10;

/// Whether `a` and `b` are at most `units` representable values apart.
///
/// ```
/// use ktmath::fp_compare::has_minimal_difference;
///
/// assert!(has_minimal_difference(1.0, 1.0 + f64::EPSILON, 1));
/// assert!(!has_minimal_difference(1.0, 1.0 + 4.0 * f64::EPSILON, 3));
/// assert!(has_minimal_difference(0.0, -0.0, 0));
/// ```
#[inline]
pub fn has_minimal_difference(a: f64, b: f64, units: u64) -> bool {
    let bits_a = a.to_bits();
    let bits_b = b.to_bits();

    if (bits_a >> 63) != (bits_b >> 63) {
        #[allow(clippy::float_cmp, reason = "Only +0.0 and -0.0 cross the sign bit.")]
        return a == b;
    }

    // Same sign: the bit patterns are monotonic in magnitude.
    bits_a.abs_diff(bits_b) <= units
}

/// [`has_minimal_difference`] with [`DEFAULT_ULPS`].
#[inline]
pub fn compare(a: f64, b: f64) -> bool {
    has_minimal_difference(a, b, DEFAULT_ULPS)
}
