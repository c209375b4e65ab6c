//! Rectangle shape value and its geometry helpers.

use crate::geometry::{Point2, Polygon};

/// An axis-aligned rectangle, anchored at its `Object`'s `(x, y)` top-left
/// corner.
#[derive(Clone, Debug, PartialEq)]
pub struct Rect {
    pub width: f64,
    pub height: f64,
    pub fill: String,
}

impl Rect {
    pub fn new(width: f64, height: f64, fill: String) -> Self {
        Self {
            width,
            height,
            fill,
        }
    }

    /// The four corners, CCW from top-left, given the rectangle's origin.
    pub fn corners(&self, origin: Point2) -> [Point2; 4] {
        [
            origin,
            origin + Point2::new(self.width, 0.0),
            origin + Point2::new(self.width, self.height),
            origin + Point2::new(0.0, self.height),
        ]
    }

    pub fn polygon(&self, origin: Point2) -> Polygon {
        Polygon::new(self.corners(origin).to_vec())
    }
}
