// Copyright 2025 the KTMath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Candidate-processing capability consumed by [`Grid2D::process_candidates`].
//!
//! [`Grid2D::process_candidates`]: crate::Grid2D::process_candidates

use crate::types::Aabb2D;

/// Function object receiving broad-phase candidates from a grid query.
///
/// The grid asks for [`query_bounds`](Self::query_bounds) once, then calls
/// [`process_candidate`](Self::process_candidate) at most once per distinct item
/// whose bounds overlap the query, checking [`result_found`](Self::result_found)
/// after every call. Returning `true` there stops the query.
///
/// Candidates only passed an AABB test; exact intersection is up to the
/// implementation.
pub trait CandidateProcessor<'a, G: ?Sized> {
    /// Bounds of the shape being intersected, or `None` if there is nothing to query.
    fn query_bounds(&self) -> Option<Aabb2D>;

    /// Handle one candidate.
    fn process_candidate(&mut self, candidate: &'a G);

    /// Whether the search can stop.
    fn result_found(&self) -> bool {
        false
    }
}
