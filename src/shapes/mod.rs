//! Shape values: the two primitive geometries the DSL can instantiate.
//!
//! Kept as a tagged sum type with exhaustive matches throughout the crate
//! (design notes, spec.md §9) rather than a trait-object hierarchy — there
//! are exactly two kinds and no plugin mechanism is needed.

pub mod circle;
pub mod rect;

/// A shape value, as held by an `Object` (spec.md §3).
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Rect(rect::Rect),
    Circle(circle::Circle),
}

/// Default fill colors, used when `shape_init` omits the fill argument
/// (spec.md §4.3 `shape_init`).
pub const DEFAULT_RECT_FILL: &str = "ff0000";
pub const DEFAULT_CIRCLE_FILL: &str = "00ff00";
