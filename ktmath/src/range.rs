// Copyright 2025 the KTMath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Closed 1D interval with tolerance-based equality and ordering.

use core::cmp::Ordering;

use crate::fp_compare::{DEFAULT_ULPS, has_minimal_difference};

/// A closed interval `[from, to]` on the real line.
///
/// The bounds are normalized at construction so that `from <= to` always holds.
///
/// Equality and ordering compare bounds within [`DEFAULT_ULPS`] representable
/// values rather than exactly. Two ranges are equal when *both* bounds are within
/// tolerance. Like the underlying comparison, this equality is not transitive for
/// chains of ranges that creep across the tolerance boundary, which is why `Range`
/// implements neither [`Eq`] nor [`Hash`](core::hash::Hash) and must not be used
/// as a hash key. Use it in sorted sequences or explicit pairwise comparisons.
///
/// An absent range is expressed as `Option<Range>`; the standard `Option`
/// ordering puts `None` before every range.
///
/// ```
/// use ktmath::Range;
///
/// let r = Range::new(5.0, 2.0);
/// assert_eq!(r.from(), 2.0);
/// assert_eq!(r.to(), 5.0);
/// assert!(r.overlaps(&Range::new(5.0, 9.0)));
/// ```
#[derive(Copy, Clone, Debug)]
pub struct Range {
    from: f64,
    to: f64,
}

impl Range {
    /// Create a range spanning `a` and `b`, in either order.
    #[inline]
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            from: a.min(b),
            to: a.max(b),
        }
    }

    /// Lower bound.
    #[inline]
    pub const fn from(&self) -> f64 {
        self.from
    }

    /// Upper bound.
    #[inline]
    pub const fn to(&self) -> f64 {
        self.to
    }

    /// Distance between the bounds.
    #[inline]
    pub fn length(&self) -> f64 {
        self.to - self.from
    }

    /// Whether `v` lies in `[from, to]`.
    #[inline]
    pub fn contains(&self, v: f64) -> bool {
        self.from <= v && v <= self.to
    }

    /// Whether the two closed intervals share at least one point.
    ///
    /// Ranges touching at a single endpoint overlap.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        // For closed intervals this is the same as "an endpoint of either lies in the other".
        self.from <= other.to && other.from <= self.to
    }

    /// Tolerance-aware ordering.
    ///
    /// Ranges are ordered by `from` unless the lower bounds are within
    /// tolerance, then by `to`; when both bounds are within tolerance the ranges
    /// are [`Ordering::Equal`].
    pub fn fuzzy_cmp(&self, other: &Self) -> Ordering {
        if !has_minimal_difference(self.from, other.from, DEFAULT_ULPS) {
            return self.from.total_cmp(&other.from);
        }
        if !has_minimal_difference(self.to, other.to, DEFAULT_ULPS) {
            return self.to.total_cmp(&other.to);
        }
        Ordering::Equal
    }
}

impl PartialEq for Range {
    fn eq(&self, other: &Self) -> bool {
        has_minimal_difference(self.from, other.from, DEFAULT_ULPS)
            && has_minimal_difference(self.to, other.to, DEFAULT_ULPS)
    }
}

impl PartialOrd for Range {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.fuzzy_cmp(other))
    }
}
