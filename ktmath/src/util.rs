// Copyright 2025 the KTMath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Smallest `s` with `s * s >= num`.
#[inline]
pub(crate) const fn isqrt_ceil(num: usize) -> usize {
    let s = num.isqrt();
    // `s * s <= num` by definition of `isqrt`, so this cannot overflow.
    if s * s < num { s + 1 } else { s }
}

/// `n` as a cell count, saturating at `u32::MAX`.
#[inline]
pub(crate) fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
