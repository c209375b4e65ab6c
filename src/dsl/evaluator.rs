//! Pure arithmetic evaluator over `Expr` nodes (spec.md §4.1).

use std::collections::HashMap;

use crate::dsl::ast::{BinOp, Expr};
use crate::error::{Error, EvalErrorKind, Result};
use crate::geometry::is_close_to_integer;

/// Loop-variable environment: name → stack of bound values (spec.md §3
/// "Loop environment"). Pushed/popped around each `for` iteration.
pub type LoopEnv = HashMap<String, Vec<f64>>;

pub fn eval_expr(expr: &Expr, env: &LoopEnv) -> Result<f64> {
    match expr {
        Expr::Num(n, _) => Ok(*n),
        Expr::Var(name, pos) => env
            .get(name)
            .and_then(|stack| stack.last())
            .copied()
            .ok_or_else(|| Error::eval(*pos, EvalErrorKind::UndefinedVariable(name.clone()))),
        Expr::Bin(op, lhs, rhs, pos) => {
            let l = eval_expr(lhs, env)?;
            let r = eval_expr(rhs, env)?;
            match op {
                BinOp::Add => Ok(l + r),
                BinOp::Sub => Ok(l - r),
                BinOp::Mul => Ok(l * r),
                BinOp::Div => {
                    if r == 0.0 {
                        Err(Error::eval(*pos, EvalErrorKind::DivByZero))
                    } else {
                        Ok(l / r)
                    }
                }
            }
        }
        Expr::Max(items, _) => {
            let mut result = f64::NEG_INFINITY;
            for item in items {
                result = result.max(eval_expr(item, env)?);
            }
            Ok(result)
        }
    }
}

/// Evaluate `expr` and require an integral result within tolerance
/// (spec.md §4.1: "integer-valued where the grammar demands it").
pub fn eval_int(expr: &Expr, env: &LoopEnv) -> Result<i64> {
    let v = eval_expr(expr, env)?;
    if !is_close_to_integer(v, 1e-6) {
        return Err(Error::eval(expr.pos(), EvalErrorKind::NotInteger(v)));
    }
    Ok(v.round() as i64)
}
