//! Method dispatch, builtin functions and sequence methods.
//!
//! A method call on a struct instance whose type declares the method runs
//! that method. Everything else falls back to the builtin sequence methods.
//! Mutating methods (`push`, `pop`, `insert`, `remove`, `clear`) need a place
//! receiver and run through [`Interpreter::mutate_steps`], so they copy
//! shared storage first and fail on immutable bindings like any other
//! mutation.

use std::rc::Rc;

use cowl_ir::{Expr, FnDecl, Name, Place};

use super::interned_names::{BuiltinFn, SeqMethod};
use super::place::{checked_index, Step};
use super::Interpreter;
use crate::errors::{
    arity_mismatch, index_out_of_bounds, integer_overflow, type_mismatch, undefined_function,
    EvalError, EvalResult,
};
use crate::ownership::unique_items;
use crate::Value;

/// Result of a mutating method, wrapped once the mutation is done.
enum Outcome {
    Unit,
    Value(Value),
    Option(Option<Value>),
}

impl Interpreter {
    /// Call of a name with no user `def`.
    pub(super) fn eval_builtin_call(&mut self, func: Name, args: &[Expr]) -> EvalResult {
        let name = self.interner.lookup(func);
        let Some(builtin) = self.builtins.function(func) else {
            return Err(undefined_function(name));
        };
        let values = self.eval_all(args)?;
        match builtin {
            BuiltinFn::Print => {
                let printer = self.printer();
                let line = values
                    .iter()
                    .map(|v| printer.render(v))
                    .collect::<Vec<_>>()
                    .join(" ");
                self.print_handler.println(&line);
                Ok(Value::Unit)
            }
            BuiltinFn::Len => {
                let [value] = exact_args::<1>(name, values)?;
                self.length_of(&value)
            }
            BuiltinFn::ToStr => {
                let [value] = exact_args::<1>(name, values)?;
                Ok(Value::string(self.display(&value)))
            }
        }
    }

    /// `receiver.method(args)`.
    ///
    /// The receiver is evaluated exactly once, before the arguments.
    pub(super) fn eval_method_call(
        &mut self,
        receiver: &Expr,
        method: Name,
        args: &[Expr],
    ) -> EvalResult {
        let seq_method = self.builtins.seq_method(method);
        if let (Some(seq_method), Some(place)) = (seq_method, Place::from_expr(receiver)) {
            if seq_method.is_mutating() {
                let steps = self.eval_steps(&place)?;
                if self.methods.contains_key(&method) {
                    let value = self.read_steps(&place, &steps)?;
                    if let Some((decl, qualified)) = self.user_method(&value, method) {
                        return self.call_method(&decl, &qualified, receiver, &value, args);
                    }
                }
                return self.eval_mutating(seq_method, method, &place, &steps, args);
            }
        }

        let value = self.eval(receiver)?;
        if let Some((decl, qualified)) = self.user_method(&value, method) {
            return self.call_method(&decl, &qualified, receiver, &value, args);
        }
        let method_name = self.interner.lookup(method);
        let Some(seq_method) = seq_method else {
            return Err(undefined_function(&format!(
                "{}.{method_name}",
                self.types.describe(&value)
            )));
        };
        if args.len() != seq_method.arity() {
            return Err(arity_mismatch(method_name, seq_method.arity(), args.len()));
        }
        if seq_method.is_mutating() {
            return Err(type_mismatch(
                &format!("a binding as receiver of `{method_name}`"),
                "a temporary value",
            ));
        }
        let values = self.eval_all(args)?;
        self.apply_read_only(seq_method, &value, values)
    }

    /// The method `value`'s struct type declares under `method`, with its
    /// qualified name for diagnostics.
    fn user_method(&self, value: &Value, method: Name) -> Option<(Rc<FnDecl>, String)> {
        let Value::Struct(instance) = value else {
            return None;
        };
        let (_, decl) = self
            .methods
            .get(&method)?
            .iter()
            .find(|(owner, _)| *owner == instance.type_id)?;
        let qualified = format!(
            "{}.{}",
            self.interner.lookup(self.types.get(instance.type_id).name),
            self.interner.lookup(method)
        );
        Some((Rc::clone(decl), qualified))
    }

    fn eval_mutating(
        &mut self,
        method: SeqMethod,
        name: Name,
        place: &Place,
        steps: &[Step],
        args: &[Expr],
    ) -> EvalResult {
        let method_name = self.interner.lookup(name);
        if args.len() != method.arity() {
            return Err(arity_mismatch(method_name, method.arity(), args.len()));
        }
        let values = self.eval_all(args)?;
        tracing::trace!(method = method_name, "mutating sequence method");
        let outcome =
            self.mutate_steps(place, steps, |target| apply_mutating(method, target, values))?;
        Ok(match outcome {
            Outcome::Unit => Value::Unit,
            Outcome::Value(value) => value,
            Outcome::Option(value) => self.types.option(value),
        })
    }

    fn apply_read_only(&self, method: SeqMethod, receiver: &Value, args: Vec<Value>) -> EvalResult {
        if let (SeqMethod::Len | SeqMethod::IsEmpty, Value::Str(s)) = (method, receiver) {
            return if method == SeqMethod::Len {
                self.length_of(receiver)
            } else {
                Ok(Value::Bool(s.is_empty()))
            };
        }
        let Value::Seq(items) = receiver else {
            return Err(type_mismatch("seq", &self.types.describe(receiver)));
        };
        let mut args = args.into_iter();
        let arg = args.next();
        let value = match method {
            SeqMethod::Len => self.length_of(receiver)?,
            SeqMethod::IsEmpty => Value::Bool(items.is_empty()),
            SeqMethod::Get => {
                let index = expect_int(arg)?;
                let item = usize::try_from(index).ok().and_then(|i| items.get(i));
                self.types.option(item.map(Value::clone_handle))
            }
            SeqMethod::Contains => {
                let needle = arg.unwrap_or(Value::Unit);
                Value::Bool(items.iter().any(|item| *item == needle))
            }
            SeqMethod::First => self.types.option(items.first().map(Value::clone_handle)),
            SeqMethod::Last => self.types.option(items.last().map(Value::clone_handle)),
            SeqMethod::Push
            | SeqMethod::Pop
            | SeqMethod::Insert
            | SeqMethod::Remove
            | SeqMethod::Clear => {
                return Err(type_mismatch("a read-only method", "a mutating method"));
            }
        };
        Ok(value)
    }

    fn length_of(&self, value: &Value) -> EvalResult {
        let len = match value {
            Value::Seq(items) => items.len(),
            Value::Str(s) => s.chars().count(),
            other => return Err(type_mismatch("seq or str", &self.types.describe(other))),
        };
        i64::try_from(len)
            .map(Value::Int)
            .map_err(|_| integer_overflow("len"))
    }
}

fn exact_args<const N: usize>(name: &str, values: Vec<Value>) -> Result<[Value; N], EvalError> {
    let got = values.len();
    values
        .try_into()
        .map_err(|_| arity_mismatch(name, N, got))
}

/// Apply a mutating method to the (already unique) receiver storage.
fn apply_mutating(
    method: SeqMethod,
    target: &mut Value,
    args: Vec<Value>,
) -> Result<Outcome, EvalError> {
    if !matches!(target, Value::Seq(_)) {
        return Err(type_mismatch("seq", target.type_name()));
    }
    let Some(items) = unique_items(target) else {
        return Err(type_mismatch("seq", "non-sequence"));
    };
    let mut args = args.into_iter();
    let mut next = || args.next().unwrap_or(Value::Unit);
    let outcome = match method {
        SeqMethod::Push => {
            items.push(next());
            Outcome::Unit
        }
        SeqMethod::Pop => Outcome::Option(items.pop()),
        SeqMethod::Insert => {
            let index = expect_int(Some(next()))?;
            let len = items.len();
            let at = usize::try_from(index)
                .ok()
                .filter(|&i| i <= len)
                .ok_or_else(|| index_out_of_bounds(index, len))?;
            items.insert(at, next());
            Outcome::Unit
        }
        SeqMethod::Remove => {
            let index = expect_int(Some(next()))?;
            let at = checked_index(index, items.len())?;
            Outcome::Value(items.remove(at))
        }
        SeqMethod::Clear => {
            items.clear();
            Outcome::Unit
        }
        SeqMethod::Len
        | SeqMethod::IsEmpty
        | SeqMethod::Get
        | SeqMethod::Contains
        | SeqMethod::First
        | SeqMethod::Last => {
            return Err(type_mismatch("a mutating method", "a read-only method"));
        }
    };
    Ok(outcome)
}

fn expect_int(value: Option<Value>) -> Result<i64, EvalError> {
    match value {
        Some(Value::Int(i)) => Ok(i),
        Some(other) => Err(type_mismatch("int", other.type_name())),
        None => Err(type_mismatch("int", "unit")),
    }
}
