//! Static-state analyzer: a forward abstract interpreter that ignores
//! geometry and tracks only per-object `appeared`/`ignored`/`moving` flags
//! (spec.md §4.2).

use std::collections::HashMap;

use crate::dsl::ast::{FlagOp, Target, Term};
use crate::dsl::evaluator::{eval_expr, eval_int, LoopEnv};
use crate::error::{Error, ObjectName, Result, StateError};

/// The three-field state spec.md §4.2 tracks per fully-evaluated object
/// name (e.g. `A_1_2`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ObjectState {
    pub appeared: bool,
    pub ignored: bool,
    pub moving: bool,
}

/// Runs the analysis pass and retains both the final per-object states and
/// the order objects were first registered in, so `--print-type` can list
/// them in a stable order without needing the interpreter's `depth`.
pub struct Analyzer {
    pub states: HashMap<String, ObjectState>,
    pub order: Vec<String>,
    env: LoopEnv,
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            states: HashMap::new(),
            order: Vec::new(),
            env: LoopEnv::new(),
        }
    }

    pub fn run(&mut self, program: &Term) -> Result<()> {
        self.visit(program)
    }

    fn resolve_name(&self, target: &Target) -> Result<String> {
        let mut parts = vec![target.name.clone()];
        for idx in &target.indices {
            parts.push(eval_int(idx, &self.env)?.to_string());
        }
        Ok(parts.join("_"))
    }

    fn entry(&mut self, name: String) -> &mut ObjectState {
        if !self.states.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.states.entry(name).or_default()
    }

    fn visit(&mut self, term: &Term) -> Result<()> {
        match term {
            Term::Terms(children) => {
                for child in children {
                    self.visit(child)?;
                }
                Ok(())
            }
            Term::ArrayDecl { dims, .. } => {
                for dim in dims {
                    eval_int(dim, &self.env)?;
                }
                Ok(())
            }
            Term::ShapeInit { target, shape, .. } => {
                for arg in &shape.args {
                    eval_expr(arg, &self.env)?;
                }
                let name = self.resolve_name(target)?;
                self.entry(name);
                Ok(())
            }
            Term::Flag { op, target, .. } => {
                let name = self.resolve_name(target)?;
                let state = self.entry(name);
                // Re-applying the current value is an explicit no-op
                // (spec.md §9 Open Question, resolved in SPEC_FULL.md §9).
                match op {
                    FlagOp::Appear => state.appeared = true,
                    FlagOp::Disappear => state.appeared = false,
                    FlagOp::Consider => state.ignored = false,
                    FlagOp::Ignore => state.ignored = true,
                }
                Ok(())
            }
            Term::Move { target, dx, dy, pos } => {
                eval_expr(dx, &self.env)?;
                eval_expr(dy, &self.env)?;
                let name = self.resolve_name(target)?;
                let state = self.entry(name.clone());
                if !state.appeared {
                    return Err(Error::type_err(*pos, StateError::NotAppeared(ObjectName(name))));
                }
                if state.moving {
                    return Err(Error::type_err(*pos, StateError::AlreadyMoving(ObjectName(name))));
                }
                state.moving = true;
                Ok(())
            }
            Term::Duration { t, body, .. } => {
                eval_expr(t, &self.env)?;
                self.visit(body)?;
                for state in self.states.values_mut() {
                    state.moving = false;
                }
                Ok(())
            }
            Term::For { var, lo, hi, body, .. } => {
                let lo_v = eval_int(lo, &self.env)?;
                let hi_v = eval_int(hi, &self.env)?;
                let mut v = lo_v;
                while v <= hi_v {
                    self.env.entry(var.clone()).or_default().push(v as f64);
                    let result = self.visit(body);
                    self.env.get_mut(var).unwrap().pop();
                    result?;
                    v += 1;
                }
                Ok(())
            }
        }
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::parse;

    #[test]
    fn shape_init_then_appear_then_move_succeeds() {
        let program = parse(
            "A = Array(1, Rect); A[1] := Rect(0, 0, 10, 10); appear A[1]; duration 1 { move A[1] by 1, 0 }",
        )
        .unwrap();
        let mut analyzer = Analyzer::new();
        analyzer.run(&program).unwrap();
        let state = analyzer.states.get("A_1").unwrap();
        assert!(state.appeared);
        assert!(!state.moving, "duration clears moving at segment end");
    }

    #[test]
    fn move_before_appear_fails_not_appeared() {
        let program = parse(
            "A = Array(1, Rect); A[1] := Rect(0, 0, 10, 10); duration 1 { move A[1] by 1, 0 }",
        )
        .unwrap();
        let mut analyzer = Analyzer::new();
        assert!(analyzer.run(&program).is_err());
    }

    #[test]
    fn double_move_in_one_duration_fails_already_moving() {
        let program = parse(
            r#"A = Array(1, Rect); A[1] := Rect(0, 0, 10, 10); appear A[1];
               duration 1 { move A[1] by 5, 0; move A[1] by 1, 0 }"#,
        )
        .unwrap();
        let mut analyzer = Analyzer::new();
        assert!(analyzer.run(&program).is_err());
    }

    #[test]
    fn reapplying_appear_is_a_no_op() {
        let program = parse("A = Array(1, Rect); A[1] := Rect(0, 0, 10, 10); appear A[1]; appear A[1];").unwrap();
        let mut analyzer = Analyzer::new();
        analyzer.run(&program).unwrap();
        assert!(analyzer.states.get("A_1").unwrap().appeared);
    }

    #[test]
    fn for_loop_is_unrolled() {
        let program = parse(
            "A = Array(2, Rect); for (i = 1 -> 2) { A[i] := Rect(0, 0, 1, 1); appear A[i] }",
        )
        .unwrap();
        let mut analyzer = Analyzer::new();
        analyzer.run(&program).unwrap();
        assert_eq!(analyzer.order, vec!["A_1".to_string(), "A_2".to_string()]);
    }
}
