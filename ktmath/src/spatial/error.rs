// Copyright 2025 the KTMath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Precondition failures reported by the checked `try_*` grid methods.

use core::fmt;

/// Why a checked [`Grid2D`](crate::Grid2D) call did nothing.
///
/// The lenient methods swallow these and degrade to no-ops.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GridError {
    /// The grid has no bounds or resolution; call `reset` first.
    Uninitialized,
    /// A resolution of zero cells along an axis.
    InvalidResolution {
        /// Requested horizontal cell count.
        x: u32,
        /// Requested vertical cell count.
        y: u32,
    },
    /// Grid bounds that are inverted or not finite.
    InvalidBounds,
    /// The candidate processor did not provide a query shape.
    MissingQuery,
    /// No cell touched by the item's current bounds holds the item.
    NotFound,
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => f.write_str("grid is not initialized"),
            Self::InvalidResolution { x, y } => {
                write!(f, "grid resolution {x}x{y} must be at least 1x1")
            }
            Self::InvalidBounds => f.write_str("grid bounds must be finite and not inverted"),
            Self::MissingQuery => f.write_str("candidate processor has no query bounds"),
            Self::NotFound => f.write_str("item is not stored in the cells its bounds cover"),
        }
    }
}

impl core::error::Error for GridError {}
