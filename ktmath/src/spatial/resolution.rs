// Copyright 2025 the KTMath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grid cell counts.

use crate::util::{isqrt_ceil, saturating_u32};

/// Number of grid cells along each axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Resolution {
    /// Horizontal cell count.
    pub x: u32,
    /// Vertical cell count.
    pub y: u32,
}

impl Resolution {
    /// Create a resolution of `x` by `y` cells.
    #[inline]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Create an `n` by `n` resolution.
    #[inline]
    pub const fn square(n: u32) -> Self {
        Self { x: n, y: n }
    }

    /// A square resolution giving about `per_cell` items per cell when `count`
    /// items are spread evenly over the grid.
    ///
    /// Always at least 1x1. A `per_cell` of zero is treated as one.
    ///
    /// ```
    /// use ktmath::Resolution;
    ///
    /// assert_eq!(Resolution::for_item_count(1000, 10), Resolution::square(10));
    /// assert_eq!(Resolution::for_item_count(0, 10), Resolution::square(1));
    /// ```
    pub fn for_item_count(count: usize, per_cell: usize) -> Self {
        let cells = count.div_ceil(per_cell.max(1));
        let side = isqrt_ceil(cells).max(1);
        Self::square(saturating_u32(side))
    }

    /// Whether both axes have at least one cell.
    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.x > 0 && self.y > 0
    }

    /// Total number of cells.
    #[inline]
    pub const fn cell_count(&self) -> u64 {
        self.x as u64 * self.y as u64
    }
}
