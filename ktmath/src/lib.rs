// Copyright 2025 the KTMath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! KTMath: a uniform 2D grid for broad-phase spatial search, plus the small
//! geometry primitives it is built from.
//!
//! - [`Grid2D`] partitions a bounding region into a fixed number of cells and
//!   stores borrowed items in every cell their bounds overlap. Queries visit only
//!   the cells overlapping the query bounds and hand each overlapping item to a
//!   callback at most once, even when it spans many cells.
//! - [`Range`] is a closed interval with tolerance-based equality and ordering.
//! - [`fp_compare`] compares doubles by the number of representable values
//!   between them.
//!
//! The grid only ever looks at axis-aligned bounds ([`Aabb2D`], via the
//! [`Bounded`] trait). Exact intersection of the candidates it reports is up to
//! the caller.
//!
//! ## Features
//!
//! - `std` *(default)*: forwards `std` to optional dependencies.
//! - `libm`: forwards `libm` to optional dependencies for `no_std` targets.
//! - `kurbo`: implements [`Bounded`] for common `kurbo` shapes and converts
//!   between [`Aabb2D`] and `kurbo::Rect`.
//!
//! # Example
//!
//! ```rust
//! use ktmath::{Aabb2D, CandidateProcessor, Grid2D};
//!
//! struct FirstHit<'a> {
//!     query: Aabb2D,
//!     hit: Option<&'a Aabb2D>,
//! }
//!
//! impl<'a> CandidateProcessor<'a, Aabb2D> for FirstHit<'a> {
//!     fn query_bounds(&self) -> Option<Aabb2D> {
//!         Some(self.query)
//!     }
//!
//!     fn process_candidate(&mut self, candidate: &'a Aabb2D) {
//!         self.hit = Some(candidate);
//!     }
//!
//!     fn result_found(&self) -> bool {
//!         self.hit.is_some()
//!     }
//! }
//!
//! let walls = [
//!     Aabb2D::new(0.0, 0.0, 100.0, 5.0),
//!     Aabb2D::new(0.0, 95.0, 100.0, 100.0),
//! ];
//!
//! let mut grid = Grid2D::new();
//! grid.reset(Aabb2D::new(0.0, 0.0, 100.0, 100.0), 4, 4);
//! for w in &walls {
//!     grid.add_geometry(w);
//! }
//!
//! let mut probe = FirstHit { query: Aabb2D::new(40.0, 90.0, 60.0, 98.0), hit: None };
//! grid.process_candidates(&mut probe);
//! assert_eq!(probe.hit, Some(&walls[1]));
//! ```
//!
//! ## Contracts
//!
//! - Items are borrowed, not owned, and identified by address.
//! - An item's bounds must not change between insertion and removal; removal
//!   searches the cells of the *current* bounds.
//! - The grid is a plain single-threaded structure. Wrap it in a lock to share it.
//! - Coordinates are assumed finite. Results for NaN bounds are unspecified.
//!
//! Logging goes through the [`log`] facade: `debug` for layout changes, `trace`
//! for calls that degrade to no-ops.

#![no_std]

extern crate alloc;

pub mod fp_compare;
mod range;
pub mod spatial;
mod types;
pub(crate) mod util;

pub use range::Range;
pub use spatial::{CandidateProcessor, CellSpan, Grid2D, GridError, Resolution};
pub use types::{Aabb2D, Bounded};
