// Copyright 2025 the KTMath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounding rectangles and the bounded-item capability.

use crate::range::Range;

/// Axis-aligned bounding box in 2D.
///
/// `y` grows downward, so `min_y` is the top edge, but nothing in this crate
/// depends on the orientation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb2D {
    /// Minimum x (left)
    pub min_x: f64,
    /// Minimum y (top)
    pub min_y: f64,
    /// Maximum x (right)
    pub max_x: f64,
    /// Maximum y (bottom)
    pub max_y: f64,
}

impl Aabb2D {
    /// Create a new AABB from min/max corners.
    #[inline(always)]
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Create an AABB from its top-left corner and size.
    #[inline]
    pub const fn from_xywh(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self::new(x, y, x + w, y + h)
    }

    /// Horizontal extent.
    #[inline]
    pub const fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Vertical extent.
    #[inline]
    pub const fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Whether all coordinates are finite and the box is not inverted.
    ///
    /// Degenerate boxes (zero width or height) are valid.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.min_x.is_finite()
            && self.min_y.is_finite()
            && self.max_x.is_finite()
            && self.max_y.is_finite()
            && self.min_x <= self.max_x
            && self.min_y <= self.max_y
    }

    /// Whether this AABB contains the point, edges included.
    #[inline]
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        self.min_x <= x && self.min_y <= y && x <= self.max_x && y <= self.max_y
    }

    /// Determines whether this AABB overlaps with another in any way.
    ///
    /// The edge of the AABB is part of itself, so two AABBs that share an edge
    /// or a corner overlap.
    ///
    /// ```
    /// use ktmath::Aabb2D;
    ///
    /// let a = Aabb2D::new(0.0, 0.0, 10.0, 10.0);
    /// assert!(a.overlaps(&Aabb2D::new(10.0, 0.0, 20.0, 10.0)));
    /// assert!(!a.overlaps(&Aabb2D::new(11.0, 0.0, 20.0, 10.0)));
    /// ```
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.x_range().overlaps(&other.x_range()) && self.y_range().overlaps(&other.y_range())
    }

    /// Projection onto the x axis.
    #[inline]
    pub fn x_range(&self) -> Range {
        Range::new(self.min_x, self.max_x)
    }

    /// Projection onto the y axis.
    #[inline]
    pub fn y_range(&self) -> Range {
        Range::new(self.min_y, self.max_y)
    }
}

/// Anything that can report an axis-aligned bounding rectangle.
///
/// The grid never looks past this: exact shape tests are up to the caller.
/// Bounds are read again on removal and on every query, so they must not
/// change while the item is indexed.
pub trait Bounded {
    /// Current bounding rectangle.
    fn bounds(&self) -> Aabb2D;
}

impl Bounded for Aabb2D {
    #[inline]
    fn bounds(&self) -> Aabb2D {
        *self
    }
}

impl<B: Bounded + ?Sized> Bounded for &B {
    #[inline]
    fn bounds(&self) -> Aabb2D {
        (**self).bounds()
    }
}

#[cfg(feature = "kurbo")]
mod kurbo_impls {
    use super::{Aabb2D, Bounded};
    use kurbo::Shape;

    impl From<kurbo::Rect> for Aabb2D {
        fn from(r: kurbo::Rect) -> Self {
            let r = r.abs();
            Self::new(r.x0, r.y0, r.x1, r.y1)
        }
    }

    impl From<Aabb2D> for kurbo::Rect {
        fn from(b: Aabb2D) -> Self {
            Self::new(b.min_x, b.min_y, b.max_x, b.max_y)
        }
    }

    macro_rules! bounded_via_shape {
        ($($ty:ty),* $(,)?) => {
            $(
                impl Bounded for $ty {
                    #[inline]
                    fn bounds(&self) -> Aabb2D {
                        self.bounding_box().into()
                    }
                }
            )*
        };
    }

    bounded_via_shape!(
        kurbo::Rect,
        kurbo::Circle,
        kurbo::Ellipse,
        kurbo::Line,
        kurbo::RoundedRect,
        kurbo::BezPath,
    );
}
