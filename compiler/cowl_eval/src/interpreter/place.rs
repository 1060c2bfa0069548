//! Assignment and in-place mutation of places.
//!
//! A place is a binding followed by field and index projections. Index
//! expressions are evaluated first (once, into [`Step`]s), while nothing is
//! borrowed; the
//! mutation then runs inside the ownership engine, which makes the root
//! unique. Every compound on the path is made unique on the way down, so a
//! nested cell shared with another binding is copied before it is touched.

use cowl_ir::{BinaryOp, Expr, Name, Place, PlaceSegment};

use super::Interpreter;
use crate::environment::BindingSlot;
use crate::errors::{
    immutable_binding, index_out_of_bounds, shape_mismatch, type_mismatch, undefined_variable,
    EvalError, EvalResult,
};
use crate::operators::evaluate_binary;
use crate::ownership::{mutate_in_place, read, rebind, unique_items};
use crate::types::TypeRegistry;
use crate::Value;

/// A projection with its index already evaluated.
#[derive(Copy, Clone, Debug)]
pub(super) enum Step {
    Field(Name),
    Index(i64),
}

/// Convert a language index into a position in a sequence of length `len`.
pub(super) fn checked_index(index: i64, len: usize) -> Result<usize, EvalError> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i < len)
        .ok_or_else(|| index_out_of_bounds(index, len))
}

impl Interpreter {
    /// `place = value`.
    ///
    /// A bare name is rebound (through a `ref mut` parameter, the caller's
    /// binding is). A projected place is an in-place mutation.
    pub(super) fn eval_assign(&mut self, target: &Place, value: &Expr) -> EvalResult {
        let new_value = self.eval(value)?;
        if target.path.is_empty() {
            let slot = self.place_root(target)?;
            rebind(&self.interner, &slot, new_value)
                .map_err(|e| e.with_span_if_missing(target.span))?;
            return Ok(Value::Unit);
        }
        self.mutate_place(target, |dest| {
            *dest = new_value;
            Ok(())
        })?;
        Ok(Value::Unit)
    }

    /// `place op= value`: reads the place, applies `op` and writes the
    /// result back as one in-place mutation.
    ///
    /// The right-hand side is evaluated first. Through a `ref mut`
    /// parameter the caller's binding is updated.
    pub(super) fn eval_compound_assign(
        &mut self,
        target: &Place,
        op: BinaryOp,
        value: &Expr,
    ) -> EvalResult {
        let rhs = self.eval(value)?;
        self.mutate_place(target, |dest| {
            *dest = evaluate_binary(dest, &rhs, op)?;
            Ok(())
        })?;
        Ok(Value::Unit)
    }

    /// Run `mutation` on the value at `place`, copy-on-write.
    pub(super) fn mutate_place<R>(
        &mut self,
        place: &Place,
        mutation: impl FnOnce(&mut Value) -> Result<R, EvalError>,
    ) -> Result<R, EvalError> {
        let steps = self.eval_steps(place)?;
        self.mutate_steps(place, &steps, mutation)
    }

    /// Evaluate the index expressions of `place`, left to right.
    pub(super) fn eval_steps(&mut self, place: &Place) -> Result<Vec<Step>, EvalError> {
        let mut steps = Vec::with_capacity(place.path.len());
        for segment in &place.path {
            steps.push(match segment {
                PlaceSegment::Field(name) => Step::Field(*name),
                PlaceSegment::Index(expr) => match self.eval(expr)? {
                    Value::Int(i) => Step::Index(i),
                    other => {
                        return Err(type_mismatch("int", &self.types.describe(&other))
                            .with_span_if_missing(expr.span));
                    }
                },
            });
        }
        Ok(steps)
    }

    /// Read the value at `place` along already evaluated `steps`.
    pub(super) fn read_steps(&self, place: &Place, steps: &[Step]) -> EvalResult {
        let mut current = read(&self.env, place.root)?;
        for step in steps {
            current = match *step {
                Step::Field(field) => self.read_field(&current, field)?,
                Step::Index(index) => self.read_index(&current, &Value::Int(index))?,
            };
        }
        Ok(current)
    }

    /// Run `mutation` on the value at `place` along already evaluated
    /// `steps`.
    pub(super) fn mutate_steps<R>(
        &mut self,
        place: &Place,
        steps: &[Step],
        mutation: impl FnOnce(&mut Value) -> Result<R, EvalError>,
    ) -> Result<R, EvalError> {
        let slot = self.place_root(place)?;
        let types = &self.types;
        let interner = &self.interner;
        let root_name = interner.lookup(place.root);
        mutate_in_place(interner, &slot, |root| {
            let dest = project_mut(types, interner, root_name, root, steps)?;
            mutation(dest)
        })
        .map_err(|e| e.with_span_if_missing(place.span))
    }

    fn place_root(&self, place: &Place) -> Result<BindingSlot, EvalError> {
        self.env.lookup_slot(place.root).ok_or_else(|| {
            undefined_variable(self.interner.lookup(place.root)).with_span_if_missing(place.span)
        })
    }
}

/// Walk `steps` from `root`, making each compound on the way unique.
///
/// Assigning into a struct field requires the field to be declared `mut`.
fn project_mut<'v>(
    types: &TypeRegistry,
    interner: &cowl_ir::StringInterner,
    root_name: &str,
    root: &'v mut Value,
    steps: &[Step],
) -> Result<&'v mut Value, EvalError> {
    let mut current = root;
    for step in steps {
        current = match *step {
            Step::Field(field) => {
                let type_id = match &*current {
                    Value::Struct(s) => s.type_id,
                    other => {
                        return Err(type_mismatch(
                            &format!("a struct with field `{}`", interner.lookup(field)),
                            &types.describe(other),
                        ));
                    }
                };
                let descriptor = types.get(type_id);
                let Some((index, def)) = descriptor.field(field) else {
                    return Err(shape_mismatch(format!(
                        "struct `{}` has no field `{}`",
                        interner.lookup(descriptor.name),
                        interner.lookup(field)
                    )));
                };
                if !def.mutable {
                    return Err(immutable_binding(&format!(
                        "{root_name}.{}",
                        interner.lookup(field)
                    )));
                }
                match unique_items(current) {
                    Some(fields) => &mut fields[index],
                    None => return Err(shape_mismatch("struct storage is not a field list")),
                }
            }
            Step::Index(index) => {
                if !matches!(current, Value::Seq(_)) {
                    return Err(type_mismatch("seq", &types.describe(current)));
                }
                match unique_items(current) {
                    Some(items) => {
                        let i = checked_index(index, items.len())?;
                        &mut items[i]
                    }
                    None => return Err(type_mismatch("seq", "non-sequence")),
                }
            }
        };
    }
    Ok(current)
}
