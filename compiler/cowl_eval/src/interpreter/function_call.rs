//! User function calls and struct methods.

use cowl_ir::{Expr, FnDecl, Name, Param, ParamMode, TypeAnnot};

use super::Interpreter;
use crate::environment::Mutability;
use crate::errors::{arity_mismatch, recursion_limit, EvalError, EvalNote, EvalResult};
use crate::ownership::{deref, pass_argument, Argument};
use crate::Value;

impl Interpreter {
    /// Evaluate `func(args)`.
    ///
    /// Names without a `def` fall back to the builtin functions.
    #[tracing::instrument(level = "debug", skip_all, fields(function = self.interner.lookup(func)))]
    pub(super) fn eval_call(&mut self, func: Name, args: &[Expr]) -> EvalResult {
        let Some(decl) = self.functions.get(&func).cloned() else {
            return self.eval_builtin_call(func, args);
        };
        self.invoke(&decl, self.interner.lookup(func), Vec::new(), args)
    }

    /// Call a struct method on an already evaluated receiver.
    ///
    /// The receiver fills the first parameter under that parameter's mode:
    /// a `ref mut` receiver must be a mutable binding, and mutations the
    /// method makes through it land on that binding.
    #[tracing::instrument(level = "debug", skip_all, fields(method = qualified))]
    pub(super) fn call_method(
        &mut self,
        decl: &FnDecl,
        qualified: &str,
        receiver: &Expr,
        value: &Value,
        args: &[Expr],
    ) -> EvalResult {
        let mode = decl.params.first().map_or(ParamMode::ByValue, |p| p.mode);
        let slot = match (mode, receiver.as_ident()) {
            (ParamMode::ByRef { .. }, Some(name)) => {
                pass_argument(&self.env, mode, Argument::Binding(name))
            }
            _ => pass_argument(&self.env, mode, Argument::Value(value)),
        }
        .map_err(|e| e.with_span_if_missing(receiver.span))?;
        self.invoke(decl, qualified, vec![slot], args)
    }

    /// Run `decl` with `bound` filling its leading parameters and `args`
    /// the rest.
    ///
    /// Arguments are evaluated left to right in the caller's frame and passed
    /// per parameter mode; the body then runs in a fresh frame that sees only
    /// its parameters and globals. Annotated parameters and return types are
    /// checked against the runtime tags of the values.
    ///
    /// A call that fails part-way is not undone: writes already made through
    /// `ref mut` parameters stay on the caller's bindings.
    fn invoke(
        &mut self,
        decl: &FnDecl,
        name: &str,
        mut bound: Vec<Value>,
        args: &[Expr],
    ) -> EvalResult {
        let receivers = bound.len();
        let params = decl.params.get(receivers..).unwrap_or_default();
        if params.len() != args.len() {
            return Err(arity_mismatch(name, params.len(), args.len()));
        }
        if self.env.frame_depth() >= self.config.max_call_depth {
            return Err(recursion_limit(self.config.max_call_depth));
        }

        for (param, slot) in decl.params.iter().zip(&bound) {
            self.check_param(param, name, slot)?;
        }
        for (param, arg) in params.iter().zip(args) {
            let slot = self.eval_argument(param.mode, arg)?;
            self.check_param(param, name, &slot)
                .map_err(|e| e.with_span_if_missing(arg.span))?;
            bound.push(slot);
        }

        let result = {
            let mut framed = self.framed();
            for (param, value) in decl.params.iter().zip(bound) {
                framed
                    .env
                    .define(param.name, value, Mutability::from_flag(param.mutable))?;
            }
            framed.eval(&decl.body)?
        };
        self.types.check_annot(decl.ret, &result).map_err(|e| {
            e.with_note(EvalNote::new(format!("in the return value of `{name}`")))
                .with_span_if_missing(decl.span)
        })?;
        Ok(result)
    }

    /// Check a parameter slot against the parameter's annotation. A
    /// by-reference slot is checked by the value it aliases.
    fn check_param(&self, param: &Param, func: &str, slot: &Value) -> Result<(), EvalError> {
        if param.ty == TypeAnnot::Any {
            return Ok(());
        }
        let value = match slot {
            Value::Ref(reference) => deref(&self.interner, reference)?,
            other => other.clone_handle(),
        };
        self.types.check_annot(param.ty, &value).map_err(|e| {
            e.with_note(EvalNote::new(format!(
                "in parameter `{}` of `{func}`",
                self.interner.lookup(param.name)
            )))
        })
    }

    /// The value a parameter slot receives for `arg`.
    ///
    /// A by-reference parameter needs a binding name at the call site;
    /// anything else is evaluated and rejected by the ownership engine.
    fn eval_argument(&mut self, mode: ParamMode, arg: &Expr) -> EvalResult {
        if let (ParamMode::ByRef { .. }, Some(name)) = (mode, arg.as_ident()) {
            return pass_argument(&self.env, mode, Argument::Binding(name))
                .map_err(|e| e.with_span_if_missing(arg.span));
        }
        let value: Value = self.eval(arg)?;
        pass_argument(&self.env, mode, Argument::Value(&value))
            .map_err(|e| e.with_span_if_missing(arg.span))
    }
}
