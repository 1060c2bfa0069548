//! Ownership and copy-on-write engine.
//!
//! Every flow of a value into a binding, a parameter or a mutation passes
//! through here:
//!
//! - [`bind_by_value`] and [`pass_argument`] (by value) hand out a new
//!   handle to the same cell; nothing is copied.
//! - [`pass_argument`] (by reference) hands out a [`Reference`] to the
//!   caller's binding; the cell's owner count is untouched.
//! - [`mutate_in_place`] and [`mutate_through_reference`] are the only
//!   entry points for in-place mutation. Both go through [`make_unique`],
//!   the single place where a shared cell is copied.
//!
//! The invariant: two bindings that were not linked by an explicit
//! reference never observe each other's in-place mutations.

use cowl_ir::{Name, ParamMode, StringInterner};

use crate::environment::{BindingSlot, Environment, Mutability};
use crate::errors::{immutable_binding, type_mismatch, undefined_variable, EvalError, EvalResult};
use crate::{Reference, Value};

/// Where an argument comes from.
#[derive(Clone, Copy, Debug)]
pub enum Argument<'a> {
    /// An already evaluated value.
    Value(&'a Value),
    /// A binding named at the call site.
    Binding(Name),
}

/// Define `name` holding a shared handle to `value`'s storage.
///
/// No copy happens here; the first later mutation through either owner
/// pays for it.
pub fn bind_by_value(
    env: &mut Environment,
    name: Name,
    value: &Value,
    mutability: Mutability,
) -> Result<(), EvalError> {
    env.define(name, value.clone_handle(), mutability)
}

/// Produce the value a callee parameter slot should hold.
///
/// `ByValue` yields a shared handle. `ByRef` yields a [`Reference`] to the
/// caller's binding; a reference to a reference is flattened so that the
/// target is always a plain binding. `ref mut` requires the target to be
/// mutable.
pub fn pass_argument(env: &Environment, mode: ParamMode, arg: Argument<'_>) -> EvalResult {
    let interner = env.interner();
    match (mode, arg) {
        (ParamMode::ByValue, Argument::Value(value)) => Ok(value.clone_handle()),
        (ParamMode::ByValue, Argument::Binding(name)) => read(env, name),
        (ParamMode::ByRef { .. }, Argument::Value(value)) => Err(type_mismatch(
            "a binding for a by-reference argument",
            value.type_name(),
        )),
        (ParamMode::ByRef { mutable }, Argument::Binding(name)) => {
            let slot = env
                .lookup_slot(name)
                .ok_or_else(|| undefined_variable(interner.lookup(name)))?;
            let binding = slot.borrow();
            if let Value::Ref(inner) = &binding.value {
                if mutable && !inner.is_mutable() {
                    return Err(immutable_binding(interner.lookup(name)));
                }
                return Ok(Value::Ref(Reference::new(
                    inner.target().clone(),
                    inner.name(),
                    mutable,
                )));
            }
            if mutable && !binding.mutability.is_mutable() {
                return Err(immutable_binding(interner.lookup(name)));
            }
            Ok(Value::Ref(Reference::new(slot.downgrade(), name, mutable)))
        }
    }
}

/// Read a binding, looking through a reference to its target.
pub fn read(env: &Environment, name: Name) -> EvalResult {
    let interner = env.interner();
    let slot = env
        .lookup_slot(name)
        .ok_or_else(|| undefined_variable(interner.lookup(name)))?;
    let binding = slot.borrow();
    match &binding.value {
        Value::Ref(reference) => deref(interner, reference),
        value => Ok(value.clone_handle()),
    }
}

/// A handle to the value a reference aliases.
pub fn deref(interner: &StringInterner, reference: &Reference) -> EvalResult {
    let target = reference
        .target()
        .resolve(interner.lookup(reference.name()))?;
    let binding = target.borrow();
    Ok(binding.value.clone_handle())
}

/// Replace a binding's value (`x = v`).
///
/// Writing to a `ref mut` parameter writes the caller's binding.
pub fn rebind(interner: &StringInterner, slot: &BindingSlot, value: Value) -> Result<(), EvalError> {
    let mut binding = slot.borrow_mut();
    if let Value::Ref(reference) = &binding.value {
        let reference = reference.clone();
        drop(binding);
        return mutate_through_reference(interner, &reference, |target| {
            *target = value;
            Ok(())
        });
    }
    if !binding.mutability.is_mutable() {
        return Err(immutable_binding(interner.lookup(binding.name)));
    }
    binding.value = value;
    Ok(())
}

/// Apply a mutation to a binding's value in place.
///
/// The binding must be `mut`. If its cell has other owners, the binding is
/// first rebound to a private deep copy; `mutation` then runs on storage
/// nobody else can see. A binding holding a reference is forwarded to
/// [`mutate_through_reference`].
pub fn mutate_in_place<R>(
    interner: &StringInterner,
    slot: &BindingSlot,
    mutation: impl FnOnce(&mut Value) -> Result<R, EvalError>,
) -> Result<R, EvalError> {
    let mut binding = slot.borrow_mut();
    if let Value::Ref(reference) = &binding.value {
        let reference = reference.clone();
        drop(binding);
        return mutate_through_reference(interner, &reference, mutation);
    }
    if !binding.mutability.is_mutable() {
        return Err(immutable_binding(interner.lookup(binding.name)));
    }
    tracing::trace!(binding = interner.lookup(binding.name), "mutate in place");
    make_unique(&mut binding.value);
    mutation(&mut binding.value)
}

/// Apply a mutation to the binding a reference aliases.
///
/// The mutation always lands on the original binding, never on a copy owned
/// by the callee. Only `ref mut` references may mutate. If the target's
/// cell is also held by other bindings (earlier by-value copies), the
/// target is detached from them first so that they keep their value.
pub fn mutate_through_reference<R>(
    interner: &StringInterner,
    reference: &Reference,
    mutation: impl FnOnce(&mut Value) -> Result<R, EvalError>,
) -> Result<R, EvalError> {
    let name = interner.lookup(reference.name());
    if !reference.is_mutable() {
        return Err(immutable_binding(name));
    }
    let target = reference.target().resolve(name)?;
    let mut binding = target.borrow_mut();
    tracing::trace!(binding = name, "mutate through reference");
    make_unique(&mut binding.value);
    mutation(&mut binding.value)
}

/// Ensure `value`'s top-level cell has exactly one owner.
///
/// Copies (deeply) when shared; returns whether a copy was made.
pub fn make_unique(value: &mut Value) -> bool {
    match value.owner_count() {
        Some(owners) if owners > 1 => {
            tracing::debug!(
                owners,
                kind = value.type_name(),
                "copy-on-write: detaching shared cell"
            );
            *value = value.deep_copy();
            true
        }
        _ => false,
    }
}

/// Unique mutable access to a compound's elements (sequence items, struct
/// fields in declaration order, or enum payload), copying first if shared.
///
/// Returns `None` for non-compound values.
pub fn unique_items(value: &mut Value) -> Option<&mut Vec<Value>> {
    make_unique(value);
    match value {
        Value::Seq(items) => items.get_mut(),
        Value::Struct(s) => s.fields.get_mut(),
        Value::Variant(v) => v.payload.get_mut(),
        _ => None,
    }
}
