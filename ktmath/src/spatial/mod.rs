// Copyright 2025 the KTMath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Spatial search structures.
//!
//! - [`Grid2D`]: uniform grid over a fixed region with per-query deduplication.
//! - [`CandidateProcessor`]: the function-object side of a grid query.
//! - [`GridError`]: precondition failures surfaced by the checked `try_*` methods.

mod container;
mod error;
mod grid;
mod processor;
mod resolution;

pub use error::GridError;
pub use grid::{CellSpan, Grid2D};
pub use processor::CandidateProcessor;
pub use resolution::Resolution;
