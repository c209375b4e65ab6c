//! Swept-volume collision checks between two objects (spec.md §4.4).
//!
//! Grounded directly on `examples/original_source/check.py`, the one file
//! in the original project that actually implements `overlap`/`covered`
//! (the copy embedded in `main.py` is a permanent `return False` stub —
//! this is the "hardest engineering" the distilled spec calls out).

use std::collections::HashMap;

use crate::error::Pos;
use crate::geometry::{Point2, Polygon, Segment};
use crate::scene::Object;
use crate::shapes::Shape;

/// A hashable, exact-bit key for `f64` pairs, used by the memoization
/// cache. Collision checks within one run reuse identical literal
/// translations/positions, so exact-bits equality (rather than a
/// tolerance) is sufficient and keeps the cache a plain `HashMap`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct Bits(u64, u64);

impl From<Point2> for Bits {
    fn from(p: Point2) -> Self {
        Bits(p.x.to_bits(), p.y.to_bits())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct CacheKey {
    rel: Bits,
    motion: Bits,
    shape_a: ShapeKey,
    shape_b: ShapeKey,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum ShapeKey {
    Rect(u64, u64),
    Circle(u64),
}

fn shape_key(shape: &Shape) -> ShapeKey {
    match shape {
        Shape::Rect(r) => ShapeKey::Rect(r.width.to_bits(), r.height.to_bits()),
        Shape::Circle(c) => ShapeKey::Circle(c.r.to_bits()),
    }
}

/// Per-run memoization cache for `overlap`/`covered` (spec.md §4.4
/// "Memoization", §5 "populated during interpretation").
#[derive(Default)]
pub struct CollisionChecker {
    overlap_cache: HashMap<CacheKey, bool>,
    covered_cache: HashMap<CacheKey, bool>,
}

impl CollisionChecker {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(a: &Object, b: &Object, motion: Point2) -> CacheKey {
        CacheKey {
            rel: Bits::from(Point2::new(a.x - b.x, a.y - b.y)),
            motion: Bits::from(motion),
            shape_a: shape_key(&a.shape),
            shape_b: shape_key(&b.shape),
        }
    }

    /// Symmetric overlap test between two simultaneously-moving objects
    /// (spec.md §4.4.1).
    pub fn overlap(&mut self, a: &Object, b: &Object, pos: Pos) -> crate::error::Result<bool> {
        let (ma_x, ma_y) = a.motion();
        let (mb_x, mb_y) = b.motion();
        let m = Point2::new(mb_x - ma_x, mb_y - ma_y);
        let key = Self::key(a, b, m);
        if let Some(&cached) = self.overlap_cache.get(&key) {
            return Ok(cached);
        }
        let result = overlap_geom(
            Point2::new(a.x, a.y),
            &a.shape,
            Point2::new(b.x, b.y),
            &b.shape,
            m,
            pos,
        )?;
        self.overlap_cache.insert(key, result);
        Ok(result)
    }

    /// Asymmetric containment test: does `moving`'s swept volume stay
    /// entirely within `static_obj` (spec.md §4.4.2)?
    pub fn covered(
        &mut self,
        moving: &Object,
        static_obj: &Object,
        pos: Pos,
    ) -> crate::error::Result<bool> {
        let (mx, my) = moving.motion();
        let m = Point2::new(mx, my);
        let key = Self::key(moving, static_obj, m);
        if let Some(&cached) = self.covered_cache.get(&key) {
            return Ok(cached);
        }
        let result = covered_geom(
            Point2::new(moving.x, moving.y),
            &moving.shape,
            Point2::new(static_obj.x, static_obj.y),
            &static_obj.shape,
            m,
            pos,
        )?;
        self.covered_cache.insert(key, result);
        Ok(result)
    }
}

/// Build the swept polygon for a rectangle translated by `m`, per the
/// sign(m.x) × sign(m.y) vertex table in spec.md §4.4.1.
fn swept_rect_polygon(corners: [Point2; 4], m: Point2) -> Polygon {
    let [v0, v1, v2, v3] = corners;
    let t = |p: Point2| p + m;
    let sx = m.x.partial_cmp(&0.0).unwrap();
    let sy = m.y.partial_cmp(&0.0).unwrap();
    use std::cmp::Ordering::*;

    let vertices = match (sx, sy) {
        (Greater, Greater) => vec![v0, v1, t(v1), t(v2), t(v3), v3],
        (Greater, Equal) => vec![v0, t(v1), t(v2), v3],
        (Greater, Less) => vec![v0, t(v0), t(v1), t(v2), v2, v3],
        (Equal, Greater) => vec![v0, v1, t(v2), t(v3)],
        (Equal, Equal) => vec![v0, v1, v2, v3],
        (Equal, Less) => vec![t(v0), t(v1), v2, v3],
        (Less, Greater) => vec![v0, v1, v2, t(v2), t(v3), t(v0)],
        (Less, Equal) => vec![t(v0), v1, v2, t(v3)],
        (Less, Less) => vec![v1, v2, v3, t(v3), t(v0), t(v1)],
    };
    Polygon::new(vertices)
}

fn overlap_geom(
    pa: Point2,
    a: &Shape,
    pb: Point2,
    b: &Shape,
    m: Point2,
    _pos: Pos,
) -> crate::error::Result<bool> {
    let result = match (a, b) {
        (Shape::Circle(ca), Shape::Circle(cb)) => {
            // Relative motion is folded into `b`'s swept path; `a` stays
            // fixed at `pa`, matching `check.py`'s frame-of-reference.
            let dist = Segment::new(pb, pb + m).distance_to_point(pa);
            dist <= ca.r + cb.r
        }
        (Shape::Rect(ra), Shape::Rect(rb)) => {
            let poly_a = ra.polygon(pa);
            let swept_b = swept_rect_polygon(rb.corners(pb), m);
            poly_a.intersects(&swept_b)
        }
        (Shape::Rect(ra), Shape::Circle(cb)) => {
            let poly_a_swept = swept_rect_polygon(ra.corners(pa), m * -1.0);
            circle_hits_polygon(pb, cb.r, &poly_a_swept)
        }
        (Shape::Circle(ca), Shape::Rect(rb)) => {
            let swept_b = swept_rect_polygon(rb.corners(pb), m);
            circle_hits_polygon(pa, ca.r, &swept_b)
        }
    };
    Ok(result)
}

fn circle_hits_polygon(center: Point2, r: f64, poly: &Polygon) -> bool {
    poly.contains_point(center) || poly.distance_to_point(center) <= r
}

fn covered_geom(
    pm: Point2,
    moving: &Shape,
    ps: Point2,
    static_shape: &Shape,
    m: Point2,
    pos: Pos,
) -> crate::error::Result<bool> {
    match (moving, static_shape) {
        (Shape::Circle(cm), Shape::Circle(cs)) => {
            if cs.r < cm.r {
                return Ok(false);
            }
            let dist = if m == Point2::ZERO {
                ps.distance(pm)
            } else {
                Segment::new(pm, pm + m).distance_to_point(ps)
            };
            Ok(dist <= cs.r - cm.r)
        }
        (Shape::Rect(rm), Shape::Rect(rs)) => {
            if rm.width > rs.width || rm.height > rs.height {
                return Ok(false);
            }
            // Legal center positions for the moving rect's center form an
            // axis-aligned rectangle [x0,x1] x [y0,y1] inside `static`,
            // anchored at the static rect's origin.
            let cx0 = rm.width / 2.0;
            let cx1 = rs.width - rm.width / 2.0;
            let cy0 = rm.height / 2.0;
            let cy1 = rs.height - rm.height / 2.0;

            let start_center = pm + Point2::new(rm.width / 2.0, rm.height / 2.0) - ps;
            let end_center = start_center + m;

            let in_region = |p: Point2| {
                p.x >= cx0 - 1e-9 && p.x <= cx1 + 1e-9 && p.y >= cy0 - 1e-9 && p.y <= cy1 + 1e-9
            };
            Ok(in_region(start_center) && in_region(end_center))
        }
        (Shape::Circle(cm), Shape::Rect(_)) => {
            let equivalent = crate::shapes::rect::Rect::new(cm.r * 2.0, cm.r * 2.0, String::new());
            let origin = cm.bounding_rect_origin(pm);
            covered_geom(
                origin,
                &Shape::Rect(equivalent),
                ps,
                static_shape,
                m,
                pos,
            )
        }
        (Shape::Rect(rm), Shape::Circle(cs)) => {
            let seg = Segment::new(ps - m, ps);
            Ok(rm
                .corners(pm)
                .iter()
                .all(|&corner| seg.distance_to_point(corner) <= cs.r))
        }
    }
}
