// Copyright 2025 the KTMath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Uniform grid over a fixed bounding region.
//!
//! The region is split into `resolution.x` by `resolution.y` equally sized cells.
//! Every item is stored in each cell its bounds overlap; items reaching outside
//! the region are clamped into the border cells. Queries touch only the cells
//! overlapping the query bounds and report each item at most once.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::ops::ControlFlow;

use hashbrown::HashMap;
use smallvec::SmallVec;

use super::container::GeometryContainer;
use super::error::GridError;
use super::processor::CandidateProcessor;
use super::resolution::Resolution;
use crate::types::{Aabb2D, Bounded};

/// Inclusive rectangle of cell coordinates.
///
/// Produced by [`Grid2D::cell_span`]; the same span computation drives
/// insertion, removal and queries.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CellSpan {
    x0: u32,
    x1: u32,
    y0: u32,
    y1: u32,
}

impl CellSpan {
    /// First column.
    #[inline]
    pub const fn x0(&self) -> u32 {
        self.x0
    }

    /// Last column (inclusive).
    #[inline]
    pub const fn x1(&self) -> u32 {
        self.x1
    }

    /// First row.
    #[inline]
    pub const fn y0(&self) -> u32 {
        self.y0
    }

    /// Last row (inclusive).
    #[inline]
    pub const fn y1(&self) -> u32 {
        self.y1
    }

    /// Number of cells covered.
    #[inline]
    pub fn len(&self) -> usize {
        let w = (self.x1 - self.x0) as usize + 1;
        let h = (self.y1 - self.y0) as usize + 1;
        w * h
    }

    /// Always `false`: an empty span is represented by `None`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Cell coordinates `(column, row)`, column-outer, each column walked top to bottom.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32)> + use<> {
        let Self { x0, x1, y0, y1 } = *self;
        (x0..=x1).flat_map(move |ix| (y0..=y1).map(move |iy| (ix, iy)))
    }
}

#[derive(Copy, Clone, Debug)]
struct Layout {
    bounds: Aabb2D,
    resolution: Resolution,
    cell_w: f64,
    cell_h: f64,
}

impl Layout {
    fn span(&self, rect: &Aabb2D) -> Option<CellSpan> {
        if !self.bounds.overlaps(rect) {
            return None;
        }
        let (xr, yr) = (rect.x_range(), rect.y_range());
        let (x0, x1) = axis_span(
            xr.from(),
            xr.to(),
            self.bounds.min_x,
            self.bounds.width(),
            self.cell_w,
            self.resolution.x,
        );
        let (y0, y1) = axis_span(
            yr.from(),
            yr.to(),
            self.bounds.min_y,
            self.bounds.height(),
            self.cell_h,
            self.resolution.y,
        );
        Some(CellSpan { x0, x1, y0, y1 })
    }
}

/// Project `[min, max]` onto one grid axis, clamping to `[0, res - 1]`.
fn axis_span(min: f64, max: f64, origin: f64, extent: f64, cell: f64, res: u32) -> (u32, u32) {
    let last = res - 1;
    let lo = min - origin;
    let c0 = if lo <= 0.0 { 0 } else { cell_index(lo, cell, last) };
    let hi = max - origin;
    let c1 = if hi >= extent {
        last
    } else {
        cell_index(hi, cell, last)
    };
    (c0, c1)
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "The offset is non-negative and bounded by `last`, so truncation is floor."
)]
#[inline]
fn cell_index(offset: f64, cell: f64, last: u32) -> u32 {
    let t = offset / cell;
    // Also catches a NaN or infinite quotient from a degenerate cell size.
    if t < f64::from(last) {
        (t as u32).min(last)
    } else {
        last
    }
}

#[derive(Default)]
struct Cell {
    slots: SmallVec<[usize; 8]>,
}

/// Uniform grid spatial index over borrowed items.
///
/// The grid stores `&'a G` handles and never owns the items; the borrow keeps
/// every indexed item alive for as long as the grid may read its bounds.
/// Identity is by address, so the same value stored at two addresses is two
/// items.
///
/// A fresh grid is uninitialized: mutation and queries are no-ops until
/// [`reset`](Self::reset) gives it bounds and a resolution.
///
/// Queries take `&mut self` because they flag visited items in place instead
/// of keeping a hash set per query. This also rules out starting another
/// query from inside a candidate callback.
///
/// ```
/// use ktmath::{Aabb2D, Grid2D};
///
/// let a = Aabb2D::new(10.0, 10.0, 20.0, 20.0);
/// let b = Aabb2D::new(40.0, 40.0, 60.0, 60.0);
///
/// let mut grid = Grid2D::new();
/// grid.reset(Aabb2D::new(0.0, 0.0, 100.0, 100.0), 2, 2);
/// grid.add_geometry(&a);
/// grid.add_geometry(&b);
///
/// let hits = grid.query_rect(Aabb2D::new(0.0, 0.0, 49.0, 49.0));
/// assert_eq!(hits.len(), 2);
/// ```
pub struct Grid2D<'a, G: Bounded + ?Sized> {
    layout: Option<Layout>,
    cells: HashMap<(u32, u32), Cell>,
    containers: Vec<Option<GeometryContainer<'a, G>>>,
    free_slots: Vec<usize>,
    // Slots flagged during the running query.
    visited: Vec<usize>,
}

impl<G: Bounded + ?Sized> Debug for Grid2D<'_, G> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Grid2D")
            .field("bounds", &self.layout.map(|l| l.bounds))
            .field("resolution", &self.layout.map(|l| l.resolution))
            .field("live_items", &self.len())
            .field("cells", &self.cells.len())
            .finish_non_exhaustive()
    }
}

impl<G: Bounded + ?Sized> Default for Grid2D<'_, G> {
    fn default() -> Self {
        Self::new()
    }
}

fn container_mut<'c, 'a, G: Bounded + ?Sized>(
    containers: &'c mut [Option<GeometryContainer<'a, G>>],
    slot: usize,
) -> &'c mut GeometryContainer<'a, G> {
    containers
        .get_mut(slot)
        .expect("grid invariant violated: cell references out-of-bounds slot")
        .as_mut()
        .expect("grid invariant violated: cell references vacant slot")
}

impl<'a, G: Bounded + ?Sized> Grid2D<'a, G> {
    /// Create an uninitialized grid.
    pub fn new() -> Self {
        Self {
            layout: None,
            cells: HashMap::new(),
            containers: Vec::new(),
            free_slots: Vec::new(),
            visited: Vec::new(),
        }
    }

    /// Discard all content and lay out `res_x` by `res_y` cells over `bounds`.
    ///
    /// Invalid input (a zero resolution, non-finite or inverted bounds) is
    /// logged and leaves the grid uninitialized. See [`try_reset`](Self::try_reset).
    pub fn reset(&mut self, bounds: Aabb2D, res_x: u32, res_y: u32) {
        if let Err(err) = self.try_reset(bounds, res_x, res_y) {
            log::warn!("Grid2D::reset rejected {bounds:?}: {err}");
            self.clear();
        }
    }

    /// Checked [`reset`](Self::reset). On error the grid is left untouched.
    pub fn try_reset(&mut self, bounds: Aabb2D, res_x: u32, res_y: u32) -> Result<(), GridError> {
        let resolution = Resolution::new(res_x, res_y);
        if !resolution.is_valid() {
            return Err(GridError::InvalidResolution { x: res_x, y: res_y });
        }
        if !bounds.is_valid() {
            return Err(GridError::InvalidBounds);
        }
        self.discard_items();
        self.layout = Some(Layout {
            bounds,
            resolution,
            cell_w: bounds.width() / f64::from(res_x),
            cell_h: bounds.height() / f64::from(res_y),
        });
        log::debug!("Grid2D reset to {bounds:?} with {res_x}x{res_y} cells");
        Ok(())
    }

    /// Discard bounds, resolution and all items, returning to the uninitialized state.
    pub fn clear(&mut self) {
        self.discard_items();
        self.layout = None;
        log::debug!("Grid2D cleared");
    }

    fn discard_items(&mut self) {
        self.cells.clear();
        self.containers.clear();
        self.free_slots.clear();
        self.visited.clear();
    }

    /// Whether [`reset`](Self::reset) has laid out the grid.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.layout.is_some()
    }

    /// Region covered by the grid.
    pub fn bounds(&self) -> Option<Aabb2D> {
        self.layout.map(|l| l.bounds)
    }

    /// Cell counts.
    pub fn resolution(&self) -> Option<Resolution> {
        self.layout.map(|l| l.resolution)
    }

    /// Cell width and height.
    pub fn cell_size(&self) -> Option<(f64, f64)> {
        self.layout.map(|l| (l.cell_w, l.cell_h))
    }

    /// Number of stored items, including ones a failed removal left behind.
    pub fn len(&self) -> usize {
        self.containers.len() - self.free_slots.len()
    }

    /// Whether no items are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of cells holding at least one item.
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Cells overlapping `rect`, or `None` when the grid is uninitialized or
    /// `rect` lies entirely outside its bounds.
    ///
    /// Edges at or before the grid origin map to cell 0 and edges at or past
    /// the far edge map to the last cell, so overhanging rectangles land in
    /// border cells.
    pub fn cell_span(&self, rect: &Aabb2D) -> Option<CellSpan> {
        self.layout.and_then(|l| l.span(rect))
    }

    /// Insert `item` into every cell its current bounds overlap.
    ///
    /// No-op on an uninitialized grid. An item entirely outside the grid
    /// bounds is not stored.
    pub fn add_geometry(&mut self, item: &'a G) {
        if let Err(err) = self.try_add_geometry(item) {
            log::trace!("Grid2D::add_geometry skipped: {err}");
        }
    }

    /// Checked [`add_geometry`](Self::add_geometry).
    pub fn try_add_geometry(&mut self, item: &'a G) -> Result<(), GridError> {
        let layout = self.layout.ok_or(GridError::Uninitialized)?;
        let Some(span) = layout.span(&item.bounds()) else {
            return Ok(());
        };

        let container = GeometryContainer::new(item, span.len());
        let slot = if let Some(slot) = self.free_slots.pop() {
            self.containers[slot] = Some(container);
            slot
        } else {
            self.containers.push(Some(container));
            self.containers.len() - 1
        };

        for key in span.cells() {
            self.cells.entry(key).or_default().slots.push(slot);
        }
        Ok(())
    }

    /// Remove `item` from the cells its *current* bounds overlap.
    ///
    /// In each of those cells, the first entry holding `item` is dropped. If
    /// the bounds changed since insertion, cells outside the new span keep
    /// their entries; remove before mutating bounds.
    pub fn remove_geometry(&mut self, item: &G) {
        if let Err(err) = self.try_remove_geometry(item) {
            log::trace!("Grid2D::remove_geometry skipped: {err}");
        }
    }

    /// Checked [`remove_geometry`](Self::remove_geometry).
    ///
    /// Fails with [`GridError::NotFound`] when no searched cell held `item`.
    pub fn try_remove_geometry(&mut self, item: &G) -> Result<(), GridError> {
        let layout = self.layout.ok_or(GridError::Uninitialized)?;
        let span = layout.span(&item.bounds()).ok_or(GridError::NotFound)?;

        let mut removed = false;
        for key in span.cells() {
            let Some(cell) = self.cells.get_mut(&key) else {
                continue;
            };
            let Some(pos) = cell.slots.iter().position(|&s| {
                self.containers[s]
                    .as_ref()
                    .is_some_and(|c| c.holds(item))
            }) else {
                continue;
            };
            // Keep insertion order for the remaining entries.
            let slot = cell.slots.remove(pos);
            if cell.slots.is_empty() {
                self.cells.remove(&key);
            }
            if container_mut(&mut self.containers, slot).release_cell() {
                self.containers[slot] = None;
                self.free_slots.push(slot);
            }
            removed = true;
        }

        if removed {
            Ok(())
        } else {
            Err(GridError::NotFound)
        }
    }

    /// Feed every item overlapping the processor's query bounds to it.
    ///
    /// Cells are walked column by column, each bucket in insertion order. Each
    /// item is passed at most once. The search stops as soon as
    /// [`CandidateProcessor::result_found`] returns `true` after a candidate.
    ///
    /// No-op when the grid is uninitialized or the processor has no query.
    pub fn process_candidates<P>(&mut self, processor: &mut P)
    where
        P: CandidateProcessor<'a, G> + ?Sized,
    {
        if let Err(err) = self.try_process_candidates(processor) {
            log::trace!("Grid2D::process_candidates skipped: {err}");
        }
    }

    /// Checked [`process_candidates`](Self::process_candidates).
    pub fn try_process_candidates<P>(&mut self, processor: &mut P) -> Result<(), GridError>
    where
        P: CandidateProcessor<'a, G> + ?Sized,
    {
        let layout = self.layout.ok_or(GridError::Uninitialized)?;
        let query = processor.query_bounds().ok_or(GridError::MissingQuery)?;
        self.run_query(&layout, query, |item| {
            processor.process_candidate(item);
            if processor.result_found() {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        Ok(())
    }

    /// Closure form of [`process_candidates`](Self::process_candidates):
    /// returning [`ControlFlow::Break`] stops the search.
    ///
    /// ```
    /// use core::ops::ControlFlow;
    /// use ktmath::{Aabb2D, Grid2D};
    ///
    /// let items = [
    ///     Aabb2D::new(0.0, 0.0, 1.0, 1.0),
    ///     Aabb2D::new(2.0, 2.0, 3.0, 3.0),
    /// ];
    /// let mut grid = Grid2D::new();
    /// grid.reset(Aabb2D::new(0.0, 0.0, 4.0, 4.0), 4, 4);
    /// for it in &items {
    ///     grid.add_geometry(it);
    /// }
    ///
    /// let mut first = None;
    /// grid.visit_candidates(Aabb2D::new(0.0, 0.0, 4.0, 4.0), |it| {
    ///     first = Some(*it);
    ///     ControlFlow::Break(())
    /// });
    /// assert_eq!(first, Some(items[0]));
    /// ```
    pub fn visit_candidates<F>(&mut self, query: Aabb2D, f: F)
    where
        F: FnMut(&'a G) -> ControlFlow<()>,
    {
        if let Some(layout) = self.layout {
            self.run_query(&layout, query, f);
        }
    }

    /// Items whose bounds overlap `query`, in visiting order.
    pub fn query_rect(&mut self, query: Aabb2D) -> Vec<&'a G> {
        let mut out = Vec::new();
        self.visit_candidates(query, |item| {
            out.push(item);
            ControlFlow::Continue(())
        });
        out
    }

    /// Items whose bounds contain the point.
    pub fn query_point(&mut self, x: f64, y: f64) -> Vec<&'a G> {
        self.query_rect(Aabb2D::new(x, y, x, y))
    }

    fn run_query<F>(&mut self, layout: &Layout, query: Aabb2D, mut f: F)
    where
        F: FnMut(&'a G) -> ControlFlow<()>,
    {
        // A candidate callback that panicked skipped the cleanup below.
        for slot in self.visited.drain(..) {
            if let Some(Some(container)) = self.containers.get_mut(slot) {
                container.reset_visited();
            }
        }

        let Some(span) = layout.span(&query) else {
            return;
        };

        'cells: for key in span.cells() {
            let Some(cell) = self.cells.get(&key) else {
                continue;
            };
            for &slot in &cell.slots {
                let container = container_mut(&mut self.containers, slot);
                if !container.mark_visited() {
                    continue;
                }
                self.visited.push(slot);
                // The span is coarse; check the actual bounds.
                if !container.bounds().overlaps(&query) {
                    continue;
                }
                if f(container.item()).is_break() {
                    break 'cells;
                }
            }
        }

        for slot in self.visited.drain(..) {
            let container = container_mut(&mut self.containers, slot);
            debug_assert!(container.is_visited(), "visited list out of sync");
            container.reset_visited();
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use alloc::boxed::Box;
    use alloc::vec;
    use core::cell::Cell as StdCell;

    const WORLD: Aabb2D = Aabb2D::new(0.0, 0.0, 100.0, 100.0);

    fn same<G: ?Sized>(hits: &[&G], expected: &[&G]) -> bool {
        hits.len() == expected.len()
            && expected
                .iter()
                .all(|e| hits.iter().filter(|h| core::ptr::addr_eq(**h, *e)).count() == 1)
    }

    /// Reports every candidate and optionally stops after the first.
    struct Collect<'a> {
        query: Option<Aabb2D>,
        stop_after_first: bool,
        hits: Vec<&'a Aabb2D>,
    }

    impl<'a> Collect<'a> {
        fn new(query: Aabb2D) -> Self {
            Self {
                query: Some(query),
                stop_after_first: false,
                hits: Vec::new(),
            }
        }
    }

    impl<'a> CandidateProcessor<'a, Aabb2D> for Collect<'a> {
        fn query_bounds(&self) -> Option<Aabb2D> {
            self.query
        }

        fn process_candidate(&mut self, candidate: &'a Aabb2D) {
            self.hits.push(candidate);
        }

        fn result_found(&self) -> bool {
            self.stop_after_first && !self.hits.is_empty()
        }
    }

    #[test]
    fn two_by_two_scenario() {
        let a = Aabb2D::new(10.0, 10.0, 20.0, 20.0);
        let b = Aabb2D::new(40.0, 40.0, 60.0, 60.0);
        let mut grid = Grid2D::new();
        grid.reset(WORLD, 2, 2);
        assert_eq!(grid.cell_size(), Some((50.0, 50.0)));

        assert_eq!(
            grid.cell_span(&a),
            Some(CellSpan {
                x0: 0,
                x1: 0,
                y0: 0,
                y1: 0
            })
        );
        assert_eq!(
            grid.cell_span(&b),
            Some(CellSpan {
                x0: 0,
                x1: 1,
                y0: 0,
                y1: 1
            })
        );

        grid.add_geometry(&a);
        grid.add_geometry(&b);
        assert_eq!(grid.len(), 2);
        assert_eq!(grid.occupied_cells(), 4);

        let mut p = Collect::new(Aabb2D::new(0.0, 0.0, 49.0, 49.0));
        grid.process_candidates(&mut p);
        assert!(same(&p.hits, &[&a, &b]), "expected A and B exactly once");
    }

    #[test]
    fn whole_grid_query_reports_each_item_once() {
        let items = [
            Aabb2D::new(1.0, 1.0, 2.0, 2.0),
            Aabb2D::new(10.0, 10.0, 90.0, 90.0),
            Aabb2D::new(24.0, 0.0, 26.0, 100.0),
            Aabb2D::new(0.0, 49.0, 100.0, 51.0),
            Aabb2D::new(75.0, 75.0, 75.0, 75.0),
            Aabb2D::new(99.0, 0.0, 100.0, 1.0),
        ];
        let mut grid = Grid2D::new();
        grid.reset(WORLD, 4, 4);
        for it in &items {
            grid.add_geometry(it);
        }

        let hits = grid.query_rect(WORLD);
        let expected: Vec<&Aabb2D> = items.iter().collect();
        assert!(same(&hits, &expected), "each item once, got {}", hits.len());
    }

    #[test]
    fn only_items_overlapping_the_query_are_reported() {
        // Both items share cell (0, 0) but only one overlaps the query.
        let near = Aabb2D::new(0.0, 0.0, 5.0, 5.0);
        let far = Aabb2D::new(30.0, 30.0, 40.0, 40.0);
        let mut grid = Grid2D::new();
        grid.reset(WORLD, 2, 2);
        grid.add_geometry(&near);
        grid.add_geometry(&far);

        let hits = grid.query_rect(Aabb2D::new(4.0, 4.0, 10.0, 10.0));
        assert!(same(&hits, &[&near]));
        assert!(same(&grid.query_point(5.0, 5.0), &[&near]));
        assert!(grid.query_point(20.0, 20.0).is_empty());
    }

    #[test]
    fn removed_item_is_never_reported() {
        let a = Aabb2D::new(10.0, 10.0, 60.0, 60.0);
        let b = Aabb2D::new(20.0, 20.0, 30.0, 30.0);
        let mut grid = Grid2D::new();
        grid.reset(WORLD, 4, 4);
        grid.add_geometry(&a);
        grid.add_geometry(&b);

        assert_eq!(grid.try_remove_geometry(&a), Ok(()));
        assert_eq!(grid.len(), 1);
        assert!(same(&grid.query_rect(WORLD), &[&b]));

        // Removing again finds nothing.
        assert_eq!(grid.try_remove_geometry(&a), Err(GridError::NotFound));
        grid.remove_geometry(&b);
        assert!(grid.is_empty());
        assert_eq!(grid.occupied_cells(), 0);
        assert!(grid.query_rect(WORLD).is_empty());
    }

    #[test]
    fn removal_matches_identity_not_value() {
        let a = Aabb2D::new(10.0, 10.0, 20.0, 20.0);
        let twin = a;
        let mut grid = Grid2D::new();
        grid.reset(WORLD, 4, 4);
        grid.add_geometry(&a);
        grid.add_geometry(&twin);

        grid.remove_geometry(&twin);
        assert!(same(&grid.query_rect(WORLD), &[&a]));
    }

    #[test]
    fn early_stop_then_full_requery() {
        let items = [
            Aabb2D::new(5.0, 5.0, 10.0, 10.0),
            Aabb2D::new(30.0, 30.0, 70.0, 70.0),
            Aabb2D::new(80.0, 80.0, 90.0, 90.0),
        ];
        let mut grid = Grid2D::new();
        grid.reset(WORLD, 4, 4);
        for it in &items {
            grid.add_geometry(it);
        }

        let mut p = Collect::new(WORLD);
        p.stop_after_first = true;
        grid.process_candidates(&mut p);
        assert_eq!(p.hits.len(), 1, "stopped after the first candidate");

        let mut p = Collect::new(WORLD);
        grid.process_candidates(&mut p);
        let expected: Vec<&Aabb2D> = items.iter().collect();
        assert!(same(&p.hits, &expected), "visited flags were reset");
    }

    #[test]
    fn visiting_order_is_column_major_then_insertion() {
        let items = [
            Aabb2D::new(60.0, 10.0, 70.0, 20.0), // cell (1, 0)
            Aabb2D::new(10.0, 60.0, 20.0, 70.0), // cell (0, 1)
            Aabb2D::new(5.0, 5.0, 6.0, 6.0),     // cell (0, 0)
            Aabb2D::new(7.0, 7.0, 8.0, 8.0),     // cell (0, 0)
        ];
        let mut grid = Grid2D::new();
        grid.reset(WORLD, 2, 2);
        for it in &items {
            grid.add_geometry(it);
        }
        let hits = grid.query_rect(WORLD);
        let order: Vec<Aabb2D> = hits.into_iter().copied().collect();
        assert_eq!(order, vec![items[2], items[3], items[1], items[0]]);
    }

    #[test]
    fn overhanging_items_clamp_to_border_cells() {
        let left = Aabb2D::new(-50.0, 10.0, 5.0, 20.0);
        let huge = Aabb2D::new(-1000.0, -1000.0, 1000.0, 1000.0);
        let outside = Aabb2D::new(150.0, 150.0, 160.0, 160.0);
        let mut grid = Grid2D::new();
        grid.reset(WORLD, 4, 4);

        assert_eq!(
            grid.cell_span(&huge),
            Some(CellSpan {
                x0: 0,
                x1: 3,
                y0: 0,
                y1: 3
            })
        );
        assert_eq!(grid.cell_span(&outside), None);

        grid.add_geometry(&left);
        grid.add_geometry(&huge);
        grid.add_geometry(&outside);
        assert_eq!(grid.len(), 2, "items fully outside are not stored");

        assert!(same(&grid.query_point(0.0, 15.0), &[&left, &huge]));
        assert!(same(&grid.query_point(100.0, 100.0), &[&huge]));
        // Queries outside the grid find nothing, even where items extend.
        assert!(grid.query_point(-20.0, 15.0).is_empty());
    }

    #[test]
    fn far_edge_clamps_with_offset_origin() {
        let world = Aabb2D::new(100.0, 200.0, 200.0, 400.0);
        let mut grid: Grid2D<'_, Aabb2D> = Grid2D::new();
        grid.reset(world, 4, 2);
        assert_eq!(grid.cell_size(), Some((25.0, 100.0)));

        let span = grid.cell_span(&Aabb2D::new(160.0, 250.0, 200.0, 400.0));
        assert_eq!(
            span,
            Some(CellSpan {
                x0: 2,
                x1: 3,
                y0: 0,
                y1: 1
            })
        );
        let span = grid.cell_span(&Aabb2D::new(124.0, 299.0, 126.0, 301.0));
        assert_eq!(
            span,
            Some(CellSpan {
                x0: 0,
                x1: 1,
                y0: 0,
                y1: 1
            })
        );
    }

    #[test]
    fn touching_the_grid_edge_counts() {
        let mut grid: Grid2D<'_, Aabb2D> = Grid2D::new();
        grid.reset(WORLD, 4, 4);
        let span = grid.cell_span(&Aabb2D::new(100.0, 100.0, 120.0, 120.0));
        assert_eq!(
            span,
            Some(CellSpan {
                x0: 3,
                x1: 3,
                y0: 3,
                y1: 3
            })
        );
        assert_eq!(span.map(|s| s.len()), Some(1));
    }

    #[test]
    fn uninitialized_grid_is_inert() {
        let a = Aabb2D::new(0.0, 0.0, 1.0, 1.0);
        let mut grid = Grid2D::new();
        assert!(!grid.is_initialized());

        grid.add_geometry(&a);
        assert!(grid.is_empty());
        assert_eq!(grid.try_add_geometry(&a), Err(GridError::Uninitialized));
        assert_eq!(grid.try_remove_geometry(&a), Err(GridError::Uninitialized));
        assert!(grid.query_rect(WORLD).is_empty());
        assert_eq!(grid.cell_span(&a), None);

        let mut p = Collect::new(WORLD);
        assert_eq!(
            grid.try_process_candidates(&mut p),
            Err(GridError::Uninitialized)
        );
        assert!(p.hits.is_empty());
    }

    #[test]
    fn processor_without_query_is_a_no_op() {
        let a = Aabb2D::new(0.0, 0.0, 1.0, 1.0);
        let mut grid = Grid2D::new();
        grid.reset(WORLD, 1, 1);
        grid.add_geometry(&a);

        let mut p = Collect::new(WORLD);
        p.query = None;
        assert_eq!(
            grid.try_process_candidates(&mut p),
            Err(GridError::MissingQuery)
        );
        grid.process_candidates(&mut p);
        assert!(p.hits.is_empty());
    }

    #[test]
    fn reset_discards_content_and_clear_uninitializes() {
        let a = Aabb2D::new(0.0, 0.0, 1.0, 1.0);
        let mut grid = Grid2D::new();
        grid.reset(WORLD, 2, 2);
        grid.add_geometry(&a);

        grid.reset(WORLD, 3, 3);
        assert!(grid.is_empty());
        assert!(grid.query_rect(WORLD).is_empty());
        assert_eq!(grid.resolution(), Some(Resolution::square(3)));

        grid.add_geometry(&a);
        grid.clear();
        assert!(!grid.is_initialized());
        assert!(grid.is_empty());
        assert_eq!(grid.bounds(), None);
    }

    #[test]
    fn invalid_reset_is_rejected() {
        let mut grid: Grid2D<'_, Aabb2D> = Grid2D::new();
        assert_eq!(
            grid.try_reset(WORLD, 0, 4),
            Err(GridError::InvalidResolution { x: 0, y: 4 })
        );
        assert_eq!(
            grid.try_reset(Aabb2D::new(10.0, 0.0, 0.0, 10.0), 2, 2),
            Err(GridError::InvalidBounds)
        );

        // The checked form leaves a laid-out grid alone; the lenient one clears it.
        grid.reset(WORLD, 2, 2);
        assert!(grid.try_reset(WORLD, 2, 0).is_err());
        assert!(grid.is_initialized());
        grid.reset(WORLD, 2, 0);
        assert!(!grid.is_initialized());
    }

    #[test]
    fn degenerate_axis_spans_every_row() {
        let line = Aabb2D::new(0.0, 5.0, 10.0, 5.0);
        let item = Aabb2D::new(2.0, 0.0, 3.0, 10.0);
        let mut grid = Grid2D::new();
        grid.reset(line, 4, 4);
        grid.add_geometry(&item);
        assert_eq!(
            grid.cell_span(&item),
            Some(CellSpan {
                x0: 0,
                x1: 1,
                y0: 0,
                y1: 3
            })
        );
        assert!(same(&grid.query_point(2.5, 5.0), &[&item]));
    }

    /// An item whose bounds can change while indexed.
    struct Movable {
        bounds: StdCell<Aabb2D>,
    }

    impl Bounded for Movable {
        fn bounds(&self) -> Aabb2D {
            self.bounds.get()
        }
    }

    #[test]
    fn moved_item_cannot_be_removed_by_new_bounds() {
        let m = Movable {
            bounds: StdCell::new(Aabb2D::new(5.0, 5.0, 10.0, 10.0)),
        };
        let mut grid = Grid2D::new();
        grid.reset(WORLD, 4, 4);
        grid.add_geometry(&m);

        m.bounds.set(Aabb2D::new(80.0, 80.0, 90.0, 90.0));
        assert_eq!(grid.try_remove_geometry(&m), Err(GridError::NotFound));
        assert_eq!(grid.len(), 1, "stale entry stays in the original cell");

        // Removing with the pre-move bounds works.
        m.bounds.set(Aabb2D::new(5.0, 5.0, 10.0, 10.0));
        assert_eq!(grid.try_remove_geometry(&m), Ok(()));
        assert!(grid.is_empty());
    }

    #[test]
    fn slots_are_reused_after_removal() {
        let a = Aabb2D::new(0.0, 0.0, 60.0, 60.0);
        let b = Aabb2D::new(70.0, 70.0, 80.0, 80.0);
        let mut grid = Grid2D::new();
        grid.reset(WORLD, 4, 4);
        grid.add_geometry(&a);
        grid.remove_geometry(&a);
        grid.add_geometry(&b);
        assert_eq!(grid.containers.len(), 1);
        assert!(same(&grid.query_rect(WORLD), &[&b]));
    }

    #[test]
    fn trait_objects_can_be_indexed() {
        let shapes: Vec<Box<dyn Bounded>> = vec![
            Box::new(Aabb2D::new(0.0, 0.0, 10.0, 10.0)),
            Box::new(Movable {
                bounds: StdCell::new(Aabb2D::new(50.0, 50.0, 60.0, 60.0)),
            }),
        ];
        let mut grid: Grid2D<'_, dyn Bounded> = Grid2D::new();
        grid.reset(WORLD, 4, 4);
        for s in &shapes {
            grid.add_geometry(s.as_ref());
        }
        let hits = grid.query_point(55.0, 55.0);
        assert_eq!(hits.len(), 1);
        assert!(core::ptr::addr_eq(hits[0], shapes[1].as_ref()));

        grid.remove_geometry(shapes[1].as_ref());
        assert!(grid.query_point(55.0, 55.0).is_empty());
    }

    #[test]
    fn query_after_panicking_callback_finds_everything() {
        use std::panic::{AssertUnwindSafe, catch_unwind};

        let items = [
            Aabb2D::new(5.0, 5.0, 60.0, 60.0),
            Aabb2D::new(70.0, 70.0, 80.0, 80.0),
        ];
        let mut grid = Grid2D::new();
        grid.reset(WORLD, 4, 4);
        for it in &items {
            grid.add_geometry(it);
        }

        let unwound = catch_unwind(AssertUnwindSafe(|| {
            grid.visit_candidates(WORLD, |_| panic!("callback failed"));
        }));
        assert!(unwound.is_err());

        let hits = grid.query_rect(WORLD);
        let expected: Vec<&Aabb2D> = items.iter().collect();
        assert!(same(&hits, &expected), "flags left by the failed query were cleared");

        // Removing a flagged item before the next query is also fine.
        let _ = catch_unwind(AssertUnwindSafe(|| {
            grid.visit_candidates(WORLD, |_| panic!("callback failed"));
        }));
        grid.remove_geometry(&items[0]);
        assert!(same(&grid.query_rect(WORLD), &[&items[1]]));
    }

    #[test]
    fn cell_span_accessors_and_len() {
        let mut grid: Grid2D<'_, Aabb2D> = Grid2D::new();
        grid.reset(WORLD, 4, 4);
        let span = grid
            .cell_span(&Aabb2D::new(30.0, 10.0, 80.0, 20.0))
            .expect("rect lies inside the grid");
        assert_eq!((span.x0(), span.x1(), span.y0(), span.y1()), (1, 3, 0, 0));
        assert_eq!(span.len(), 3);
        assert_eq!(span.cells().count(), span.len());
    }

    #[test]
    fn matches_linear_scan_on_random_data() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(42);
        let items: Vec<Aabb2D> = (0..500)
            .map(|_| {
                let x = rng.random_range(-20.0..100.0);
                let y = rng.random_range(-20.0..100.0);
                let w = rng.random_range(0.0..30.0);
                let h = rng.random_range(0.0..30.0);
                Aabb2D::from_xywh(x, y, w, h)
            })
            .collect();

        let mut grid = Grid2D::new();
        grid.reset(WORLD, 8, 8);
        for it in &items {
            grid.add_geometry(it);
        }
        // Drop every third item again.
        for it in items.iter().step_by(3) {
            grid.remove_geometry(it);
        }

        for _ in 0..100 {
            let x = rng.random_range(-10.0..110.0);
            let y = rng.random_range(-10.0..110.0);
            let w = rng.random_range(0.0..40.0);
            let h = rng.random_range(0.0..40.0);
            let q = Aabb2D::from_xywh(x, y, w, h);

            let expected: Vec<&Aabb2D> = items
                .iter()
                .enumerate()
                .filter(|(i, it)| {
                    i % 3 != 0 && it.overlaps(&q) && it.overlaps(&WORLD) && q.overlaps(&WORLD)
                })
                .map(|(_, it)| it)
                .collect();
            let hits = grid.query_rect(q);
            assert!(same(&hits, &expected), "grid disagrees with scan for {q:?}");
        }
    }
}
