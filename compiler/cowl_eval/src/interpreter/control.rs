//! Blocks, conditionals and `match`.

use cowl_ir::{Expr, MatchArm};

use super::Interpreter;
use crate::environment::Mutability;
use crate::errors::{non_exhaustive_match, type_mismatch, EvalError, EvalResult};
use crate::matcher::Matcher;
use crate::Value;

impl Interpreter {
    /// `{ e1; ...; en }`: the value of `en` (or `()` when empty), evaluated
    /// in a fresh scope.
    pub(super) fn eval_block(&mut self, exprs: &[Expr]) -> EvalResult {
        self.with_env_scope(|scoped| {
            let mut last = Value::Unit;
            for expr in exprs {
                last = scoped.eval(expr)?;
            }
            Ok(last)
        })
    }

    /// `if`: the condition must be a `Bool`; exactly one branch runs, in
    /// its own scope. A missing `else` yields `()`.
    pub(super) fn eval_if(
        &mut self,
        cond: &Expr,
        then_branch: &Expr,
        else_branch: Option<&Expr>,
    ) -> EvalResult {
        let taken = match self.eval(cond)? {
            Value::Bool(true) => Some(then_branch),
            Value::Bool(false) => else_branch,
            other => {
                return Err(type_mismatch("bool", &self.types.describe(&other))
                    .with_span_if_missing(cond.span));
            }
        };
        match taken {
            Some(branch) => self.with_env_scope(|scoped| scoped.eval(branch)),
            None => Ok(Value::Unit),
        }
    }

    /// `match`: arms are tried top to bottom and the first whose pattern
    /// matches and whose guard (if any) holds is committed to.
    ///
    /// Pattern bindings are installed, immutable, in a fresh arm scope that
    /// also covers the guard.
    #[tracing::instrument(level = "trace", skip_all)]
    pub(super) fn eval_match(&mut self, scrutinee: &Expr, arms: &[MatchArm]) -> EvalResult {
        let value = self.eval(scrutinee)?;
        let mut start = 0;
        loop {
            let matched = Matcher::new(&self.types, &self.interner)
                .first_match(arms[start..].iter().map(|arm| &arm.pattern), &value)?;
            let Some((offset, bindings)) = matched else {
                break;
            };
            let index = start + offset;
            let arm = &arms[index];
            let outcome = self.with_env_scope(|scoped| -> Result<Option<Value>, EvalError> {
                for (name, bound) in bindings {
                    scoped
                        .env
                        .define(name, bound, Mutability::Immutable)
                        .map_err(|e| e.with_span_if_missing(arm.span))?;
                }
                if let Some(guard) = &arm.guard {
                    match scoped.eval(guard)? {
                        Value::Bool(true) => {}
                        Value::Bool(false) => return Ok(None),
                        other => {
                            return Err(type_mismatch("bool", &scoped.types.describe(&other))
                                .with_span_if_missing(guard.span));
                        }
                    }
                }
                tracing::trace!(arm = index, "match arm selected");
                scoped.eval(&arm.body).map(Some)
            })?;
            if let Some(result) = outcome {
                return Ok(result);
            }
            // Guard failed: resume after this arm.
            start = index + 1;
        }
        Err(non_exhaustive_match(&self.printer().render_quoted(&value)))
    }
}
