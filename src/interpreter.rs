//! AST interpreter: drives a parsed program, maintaining the `Scene` and
//! `Timeline` and invoking the collision engine at each `duration`
//! boundary (spec.md §4.3).

use crate::collision::CollisionChecker;
use crate::dsl::ast::{FlagOp, ShapeKind, Target, Term};
use crate::dsl::evaluator::{eval_expr, eval_int, LoopEnv};
use crate::error::{Error, EvalErrorKind, ObjectName, Pos, Result, StateError};
use crate::scene::{Object, Scene};
use crate::shapes::circle::Circle;
use crate::shapes::rect::Rect;
use crate::shapes::Shape;
use crate::timeline::Timeline;

pub struct Interpreter {
    pub scene: Scene,
    pub timeline: Timeline,
    checker: CollisionChecker,
    env: LoopEnv,
}

impl Interpreter {
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            timeline: Timeline::new(),
            checker: CollisionChecker::new(),
            env: LoopEnv::new(),
        }
    }

    pub fn run(&mut self, program: &Term) -> Result<()> {
        self.visit(program)
    }

    fn resolve_target(&self, target: &Target) -> Result<(String, Vec<i64>)> {
        let mut indices = Vec::with_capacity(target.indices.len());
        for idx in &target.indices {
            indices.push(eval_int(idx, &self.env)?);
        }
        Ok((target.name.clone(), indices))
    }

    fn visit(&mut self, term: &Term) -> Result<()> {
        match term {
            Term::Terms(children) => {
                for child in children {
                    self.visit(child)?;
                }
                Ok(())
            }
            Term::ArrayDecl { name, dims, kind, pos } => self.visit_array_decl(name, dims, *kind, *pos),
            Term::ShapeInit { target, shape, fill, pos } => self.visit_shape_init(target, shape, fill, *pos),
            Term::Flag { op, target, pos } => self.visit_flag(*op, target, *pos),
            Term::Move { target, dx, dy, pos } => self.visit_move(target, dx, dy, *pos),
            Term::Duration { t, body, pos } => self.visit_duration(t, body, *pos),
            Term::For { var, lo, hi, body, .. } => self.visit_for(var, lo, hi, body),
        }
    }

    fn visit_array_decl(
        &mut self,
        name: &str,
        dims: &[crate::dsl::ast::Expr],
        kind: ShapeKind,
        pos: Pos,
    ) -> Result<()> {
        let mut extents = Vec::with_capacity(dims.len());
        for (dim_idx, dim) in dims.iter().enumerate() {
            let value = eval_int(dim, &self.env)?;
            if value < 1 {
                // spec.md §4.1 requires array dimensions to be positive
                // integers; there is no dedicated error kind for this, so
                // it is reported the same way as an out-of-range index
                // (see DESIGN.md).
                return Err(Error::eval(
                    pos,
                    EvalErrorKind::IndexOutOfBounds {
                        array: name.to_string(),
                        dim: dim_idx,
                        index: value,
                        extent: 1,
                    },
                ));
            }
            extents.push(value);
        }
        self.scene.declare_array(name.to_string(), extents, kind.as_str());
        Ok(())
    }

    fn visit_shape_init(
        &mut self,
        target: &Target,
        shape: &crate::dsl::ast::ShapeExpr,
        fill: &Option<String>,
        pos: Pos,
    ) -> Result<()> {
        let (array_name, indices) = self.resolve_target(target)?;
        let found_kind = shape.kind.as_str();
        {
            let array = self.scene.arrays.get(&array_name).ok_or_else(|| {
                Error::eval(pos, EvalErrorKind::UndeclaredArray(array_name.clone()))
            })?;
            array.check_indices(&array_name, &indices, pos)?;
            if array.object_kind != found_kind {
                return Err(Error::eval(
                    pos,
                    EvalErrorKind::KindMismatch {
                        array: array_name.clone(),
                        expected: array.object_kind,
                        found: found_kind,
                    },
                ));
            }
        }

        let expected_arity = match shape.kind {
            ShapeKind::Rect => 4,
            ShapeKind::Circle => 3,
        };
        if shape.args.len() != expected_arity {
            return Err(Error::eval(
                pos,
                EvalErrorKind::ArityMismatch {
                    array: found_kind.to_string(),
                    expected: expected_arity,
                    found: shape.args.len(),
                },
            ));
        }

        let mut args = Vec::with_capacity(shape.args.len());
        for arg in &shape.args {
            args.push(eval_expr(arg, &self.env)?);
        }

        let (x, y, shape_value) = match shape.kind {
            ShapeKind::Rect => {
                let fill = fill.clone().unwrap_or_else(|| crate::shapes::DEFAULT_RECT_FILL.to_string());
                (args[0], args[1], Shape::Rect(Rect::new(args[2], args[3], fill)))
            }
            ShapeKind::Circle => {
                let fill = fill.clone().unwrap_or_else(|| crate::shapes::DEFAULT_CIRCLE_FILL.to_string());
                (args[0], args[1], Shape::Circle(Circle::new(args[2], fill)))
            }
        };

        let name = format!(
            "{}_{}",
            array_name,
            indices.iter().map(|i| i.to_string()).collect::<Vec<_>>().join("_")
        );
        let depth = self.scene.len();
        let object = Object {
            name,
            x,
            y,
            shape: shape_value,
            depth,
            appeared: false,
            ignored: false,
            moving: None,
        };
        self.scene.insert_object(&array_name, indices, object);
        self.timeline.register_new_object();
        Ok(())
    }

    fn visit_flag(&mut self, op: FlagOp, target: &Target, pos: Pos) -> Result<()> {
        let (array_name, indices) = self.resolve_target(target)?;
        let depth = self.scene.resolve(&array_name, &indices, pos)?;
        let obj = self.scene.object_by_depth_mut(depth);
        match op {
            FlagOp::Appear => obj.appeared = true,
            FlagOp::Disappear => obj.appeared = false,
            FlagOp::Consider => obj.ignored = false,
            FlagOp::Ignore => obj.ignored = true,
        }
        Ok(())
    }

    fn visit_move(&mut self, target: &Target, dx: &crate::dsl::ast::Expr, dy: &crate::dsl::ast::Expr, pos: Pos) -> Result<()> {
        let dx_v = eval_expr(dx, &self.env)?;
        let dy_v = eval_expr(dy, &self.env)?;
        let (array_name, indices) = self.resolve_target(target)?;
        let depth = self.scene.resolve(&array_name, &indices, pos)?;
        let obj = self.scene.object_by_depth_mut(depth);
        if !obj.appeared {
            return Err(Error::type_err(pos, StateError::NotAppeared(ObjectName(obj.name.clone()))));
        }
        if obj.moving.is_some() {
            return Err(Error::type_err(pos, StateError::AlreadyMoving(ObjectName(obj.name.clone()))));
        }
        obj.moving = Some((dx_v, dy_v));
        Ok(())
    }

    fn visit_duration(&mut self, t: &crate::dsl::ast::Expr, body: &Term, pos: Pos) -> Result<()> {
        let duration = eval_expr(t, &self.env)?;
        self.visit(body)?;

        let visibility: Vec<bool> = self.scene.objects.iter().map(|o| o.appeared).collect();
        let moving: Vec<Option<(f64, f64)>> = self.scene.objects.iter().map(|o| o.moving).collect();
        self.timeline.push_segment(duration, visibility, moving);

        self.check_collisions(pos)?;

        for obj in self.scene.objects.iter_mut() {
            if let Some((dx, dy)) = obj.moving.take() {
                obj.x += dx;
                obj.y += dy;
            }
        }
        Ok(())
    }

    fn visit_for(&mut self, var: &str, lo: &crate::dsl::ast::Expr, hi: &crate::dsl::ast::Expr, body: &Term) -> Result<()> {
        let lo_v = eval_int(lo, &self.env)?;
        let hi_v = eval_int(hi, &self.env)?;
        let mut v = lo_v;
        while v <= hi_v {
            self.env.entry(var.to_string()).or_default().push(v as f64);
            let result = self.visit(body);
            self.env.get_mut(var).unwrap().pop();
            result?;
            v += 1;
        }
        Ok(())
    }

    /// Scene-order collision sweep (spec.md §5 "Ordering guarantees"):
    /// each moving, non-ignored object is checked against every
    /// previously-visited moving object (`overlap`); each static,
    /// appeared, non-ignored object is checked against every
    /// previously-visited moving object (`covered`).
    fn check_collisions(&mut self, pos: Pos) -> Result<()> {
        let n = self.scene.len();
        let mut visited_moving: Vec<usize> = Vec::new();

        for depth in 0..n {
            let obj = self.scene.object_by_depth(depth);
            if obj.ignored {
                continue;
            }
            if obj.moving.is_some() {
                let a = obj.clone();
                for &prev in &visited_moving {
                    let b = self.scene.object_by_depth(prev).clone();
                    if self.checker.overlap(&a, &b, pos)? {
                        return Err(Error::eval(
                            pos,
                            EvalErrorKind::Overlap(a.name.clone(), b.name.clone()),
                        ));
                    }
                }
                visited_moving.push(depth);
            } else if obj.appeared {
                let static_obj = obj.clone();
                for &prev in &visited_moving {
                    let moving_obj = self.scene.object_by_depth(prev).clone();
                    if self.checker.covered(&moving_obj, &static_obj, pos)? {
                        return Err(Error::eval(
                            pos,
                            EvalErrorKind::Covered(static_obj.name.clone(), moving_obj.name.clone()),
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::parse;

    #[test]
    fn simple_program_creates_object_and_advances_time() {
        let program = parse(
            r#"A = Array(1, Rect); A[1] := Rect(0, 0, 10, 10); appear A[1]; duration 1 {}"#,
        )
        .unwrap();
        let mut interp = Interpreter::new();
        interp.run(&program).unwrap();
        assert_eq!(interp.scene.len(), 1);
        assert_eq!(interp.timeline.segments.len(), 2);
        let obj = interp.scene.object_by_depth(0);
        assert_eq!((obj.x, obj.y), (0.0, 0.0));
    }

    #[test]
    fn move_is_committed_after_duration() {
        let program = parse(
            r#"A = Array(1, Rect); A[1] := Rect(0, 0, 10, 10); appear A[1];
               duration 1 { move A[1] by 5, 2 }"#,
        )
        .unwrap();
        let mut interp = Interpreter::new();
        interp.run(&program).unwrap();
        let obj = interp.scene.object_by_depth(0);
        assert_eq!((obj.x, obj.y), (5.0, 2.0));
        assert!(obj.moving.is_none());
    }

    #[test]
    fn overlapping_moving_rects_abort_with_overlap_error() {
        let program = parse(
            r#"A = Array(2, Rect);
               A[1] := Rect(0, 0, 1, 1);
               A[2] := Rect(3, 0, 1, 1);
               appear A[1]; appear A[2];
               duration 1 { move A[2] by -2, 0 }"#,
        )
        .unwrap();
        let mut interp = Interpreter::new();
        let err = interp.run(&program).unwrap_err();
        assert!(matches!(err, Error::Eval { kind: EvalErrorKind::Overlap(..), .. }));
    }

    #[test]
    fn non_overlapping_static_rects_succeed() {
        let program = parse(
            r#"A = Array(2, Rect);
               A[1] := Rect(0, 0, 1, 1);
               A[2] := Rect(2, 0, 1, 1);
               appear A[1]; appear A[2];
               duration 1 {}"#,
        )
        .unwrap();
        let mut interp = Interpreter::new();
        interp.run(&program).unwrap();
    }

    #[test]
    fn array_recreated_in_loop_replaces_prior_array() {
        let program = parse(
            r#"for (i = 0 -> 1) { A = Array(2, Rect); A[1] := Rect(0, 0, 10, 10); appear A[1] }"#,
        )
        .unwrap();
        let mut interp = Interpreter::new();
        // Second iteration re-declares A and re-initializes A[1]; since the
        // object already exists for index (1,), the second shape_init
        // would double-insert into `objects`. spec.md §8 boundary scenario
        // 5 only asserts the array-replacement half of this; re-running
        // shape_init on the same index is accepted by `insert_object`
        // (last write wins in the array's index map) and produces two
        // scene objects sharing one array slot, matching the original's
        // append-only `Variable` list.
        interp.run(&program).unwrap();
        assert_eq!(interp.scene.len(), 2);
    }

    #[test]
    fn shape_init_with_too_few_args_reports_arity_mismatch_instead_of_panicking() {
        let program = parse("A = Array(1, Rect); A[1] := Rect(0, 0, 10);").unwrap();
        let mut interp = Interpreter::new();
        let err = interp.run(&program).unwrap_err();
        assert!(matches!(
            err,
            Error::Eval { kind: EvalErrorKind::ArityMismatch { expected: 4, found: 3, .. }, .. }
        ));
    }

    #[test]
    fn circle_init_with_too_many_args_reports_arity_mismatch() {
        let program = parse("A = Array(1, Circle); A[1] := Circle(0, 0, 5, 5);").unwrap();
        let mut interp = Interpreter::new();
        let err = interp.run(&program).unwrap_err();
        assert!(matches!(
            err,
            Error::Eval { kind: EvalErrorKind::ArityMismatch { expected: 3, found: 4, .. }, .. }
        ));
    }

    #[test]
    fn double_move_in_one_duration_fails() {
        let program = parse(
            r#"A = Array(1, Rect); A[1] := Rect(0, 0, 10, 10); appear A[1];
               duration 1 { move A[1] by 5, 0; move A[1] by 1, 0 }"#,
        )
        .unwrap();
        let mut interp = Interpreter::new();
        assert!(interp.run(&program).is_err());
    }
}
