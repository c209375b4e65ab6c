//! Scene model: named arrays of shape instances (spec.md §3).
//!
//! The depth-ordered `objects` vector is the canonical owner of every
//! `Object`; `Array::values` is a lookup index of index-tuple → depth into
//! that vector (design notes, spec.md §9: "store by stable identifier and
//! look both up").

use std::collections::HashMap;

use crate::error::{EvalErrorKind, Pos};
use crate::shapes::Shape;

/// A named shape instance at a concrete position (spec.md §3 "Object").
#[derive(Clone, Debug)]
pub struct Object {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub shape: Shape,
    pub depth: usize,
    pub appeared: bool,
    pub ignored: bool,
    pub moving: Option<(f64, f64)>,
}

impl Object {
    /// The relative vector this object is moving by in the current
    /// segment, or `(0, 0)` if it isn't moving.
    pub fn motion(&self) -> (f64, f64) {
        self.moving.unwrap_or((0.0, 0.0))
    }
}

/// A named collection of `Object`s sharing one declared shape (spec.md §3
/// "Array").
#[derive(Clone, Debug)]
pub struct Array {
    pub shape_dims: Vec<i64>,
    pub object_kind: &'static str,
    /// index tuple → depth (index into `Scene::objects`).
    pub values: HashMap<Vec<i64>, usize>,
}

impl Array {
    pub fn new(shape_dims: Vec<i64>, object_kind: &'static str) -> Self {
        Self {
            shape_dims,
            object_kind,
            values: HashMap::new(),
        }
    }

    /// Validate an index tuple against the declared extents (spec.md §3
    /// "Indices are 1-based...").
    pub fn check_indices(
        &self,
        array_name: &str,
        indices: &[i64],
        pos: Pos,
    ) -> crate::error::Result<()> {
        if indices.len() != self.shape_dims.len() {
            return Err(crate::error::Error::eval(
                pos,
                EvalErrorKind::ArityMismatch {
                    array: array_name.to_string(),
                    expected: self.shape_dims.len(),
                    found: indices.len(),
                },
            ));
        }
        for (dim, (&idx, &extent)) in indices.iter().zip(self.shape_dims.iter()).enumerate() {
            if idx < 1 || idx > extent {
                return Err(crate::error::Error::eval(
                    pos,
                    EvalErrorKind::IndexOutOfBounds {
                        array: array_name.to_string(),
                        dim,
                        index: idx,
                        extent,
                    },
                ));
            }
        }
        Ok(())
    }
}

/// The ordered sequence of `Object`s plus the named `Array`s that index
/// into it (spec.md §3 "Scene").
#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub objects: Vec<Object>,
    pub arrays: HashMap<String, Array>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// `object_init`: declare (or replace) a named array. Replacing an
    /// existing array is allowed — spec.md §8 boundary scenario 5, grounded
    /// on `main.py`'s unconditional `state.arrays[var] = Array(...)`.
    pub fn declare_array(&mut self, name: String, shape_dims: Vec<i64>, kind: &'static str) {
        self.arrays.insert(name, Array::new(shape_dims, kind));
    }

    /// Append a newly constructed object to the scene at the next depth,
    /// and register it in its array's index.
    pub fn insert_object(&mut self, array_name: &str, indices: Vec<i64>, object: Object) {
        let depth = self.objects.len();
        debug_assert_eq!(object.depth, depth);
        self.objects.push(object);
        self.arrays
            .get_mut(array_name)
            .expect("array must exist before shape_init inserts into it")
            .values
            .insert(indices, depth);
    }

    pub fn object_by_depth(&self, depth: usize) -> &Object {
        &self.objects[depth]
    }

    pub fn object_by_depth_mut(&mut self, depth: usize) -> &mut Object {
        &mut self.objects[depth]
    }

    pub fn resolve(
        &self,
        array_name: &str,
        indices: &[i64],
        pos: Pos,
    ) -> crate::error::Result<usize> {
        let array = self.arrays.get(array_name).ok_or_else(|| {
            crate::error::Error::eval(
                pos,
                EvalErrorKind::UndeclaredArray(array_name.to_string()),
            )
        })?;
        array.check_indices(array_name, indices, pos)?;
        array.values.get(indices).copied().ok_or_else(|| {
            crate::error::Error::eval(
                pos,
                EvalErrorKind::IndexOutOfBounds {
                    array: array_name.to_string(),
                    dim: 0,
                    index: indices.first().copied().unwrap_or(0),
                    extent: 0,
                },
            )
        })
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
