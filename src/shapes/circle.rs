//! Circle shape value and its geometry helpers.

use crate::geometry::Point2;

/// A circle of radius `r`, centered at its `Object`'s `(x, y)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Circle {
    pub r: f64,
    pub fill: String,
}

impl Circle {
    pub fn new(r: f64, fill: String) -> Self {
        Self { r, fill }
    }

    /// The axis-aligned bounding rectangle of this circle, used by the
    /// Circle-in-Rect reduction (spec.md §4.4.2).
    pub fn bounding_rect_origin(&self, center: Point2) -> Point2 {
        Point2::new(center.x - self.r, center.y - self.r)
    }
}
