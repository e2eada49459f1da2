// Copyright 2025 the KTMath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-item bookkeeping shared by every cell an item occupies.

use core::fmt::Debug;

use crate::types::{Aabb2D, Bounded};

/// Wrapper around one indexed item.
///
/// A single container is referenced (by slot) from every cell the item's
/// bounds covered at insertion time, so the `visited` flag marks the item
/// rather than one cell membership. `visited` is only ever `true` inside a
/// single query.
pub(crate) struct GeometryContainer<'a, G: ?Sized> {
    item: &'a G,
    visited: bool,
    // Number of cell buckets still referencing this container.
    occupancy: usize,
}

impl<'a, G: Bounded + ?Sized> GeometryContainer<'a, G> {
    pub(crate) fn new(item: &'a G, occupancy: usize) -> Self {
        Self {
            item,
            visited: false,
            occupancy,
        }
    }

    #[inline]
    pub(crate) fn item(&self) -> &'a G {
        self.item
    }

    #[inline]
    pub(crate) fn bounds(&self) -> Aabb2D {
        self.item.bounds()
    }

    /// Whether this container wraps exactly `item` (address identity).
    #[inline]
    pub(crate) fn holds(&self, item: &G) -> bool {
        core::ptr::addr_eq(self.item, item)
    }

    /// Mark as visited. Returns `false` if it already was.
    #[inline]
    pub(crate) fn mark_visited(&mut self) -> bool {
        !core::mem::replace(&mut self.visited, true)
    }

    #[inline]
    pub(crate) fn reset_visited(&mut self) {
        self.visited = false;
    }

    #[inline]
    pub(crate) fn is_visited(&self) -> bool {
        self.visited
    }

    /// Drop one cell membership. Returns `true` when none remain.
    #[inline]
    pub(crate) fn release_cell(&mut self) -> bool {
        debug_assert!(self.occupancy > 0, "container released more often than stored");
        self.occupancy = self.occupancy.saturating_sub(1);
        self.occupancy == 0
    }
}

impl<G: ?Sized> Debug for GeometryContainer<'_, G> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GeometryContainer")
            .field("item", &core::ptr::from_ref(self.item).cast::<()>())
            .field("visited", &self.visited)
            .field("occupancy", &self.occupancy)
            .finish()
    }
}
