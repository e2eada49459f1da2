// Copyright 2025 the KTMath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared scene types for the demo programs.
//!
//! The grid in `ktmath` is a broad phase: it reports items whose *bounds*
//! overlap a query. The [`Shape`] type here adds the narrow phase, an exact
//! test against a query rectangle using [`kurbo`] geometry.

use kurbo::{Circle, Point, Rect, Shape as _};
use ktmath::{Aabb2D, Bounded, CandidateProcessor};

/// A scene item with exact geometry.
#[derive(Clone, Copy, Debug)]
pub enum Shape {
    /// Axis-aligned rectangle.
    Rect(Rect),
    /// Filled disk.
    Circle(Circle),
}

impl Shape {
    /// Exact overlap test against an axis-aligned rectangle, edges included.
    pub fn intersects_rect(&self, rect: Rect) -> bool {
        match self {
            Self::Rect(r) => touches(*r, rect),
            Self::Circle(c) => {
                let nearest = Point::new(
                    c.center.x.clamp(rect.x0, rect.x1),
                    c.center.y.clamp(rect.y0, rect.y1),
                );
                nearest.distance(c.center) <= c.radius
            }
        }
    }
}

fn touches(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

impl Bounded for Shape {
    fn bounds(&self) -> Aabb2D {
        match self {
            Self::Rect(r) => r.bounds(),
            Self::Circle(c) => c.bounding_box().into(),
        }
    }
}

/// Collects shapes that exactly intersect a rectangle, stopping after `limit` hits.
#[derive(Debug)]
pub struct RectPick<'a> {
    rect: Rect,
    limit: usize,
    /// Candidates passed by the grid.
    pub candidates: usize,
    /// Shapes that survived the exact test.
    pub hits: Vec<&'a Shape>,
}

impl RectPick<'_> {
    /// Pick shapes overlapping `rect`, at most `limit` of them.
    pub fn new(rect: Rect, limit: usize) -> Self {
        Self {
            rect,
            limit,
            candidates: 0,
            hits: Vec::new(),
        }
    }
}

impl<'a> CandidateProcessor<'a, Shape> for RectPick<'a> {
    fn query_bounds(&self) -> Option<Aabb2D> {
        Some(self.rect.into())
    }

    fn process_candidate(&mut self, candidate: &'a Shape) {
        self.candidates += 1;
        if candidate.intersects_rect(self.rect) {
            self.hits.push(candidate);
        }
    }

    fn result_found(&self) -> bool {
        self.hits.len() >= self.limit
    }
}
