//! Pattern matcher.
//!
//! A state-free, depth-first, left-to-right matcher over `(pattern, value)`.
//! A successful match yields the bindings the pattern introduces, each a
//! shared handle to the matched sub-value. Sub-patterns stop at the first
//! failure.
//!
//! Pattern shape errors (an unknown variant, a wrong payload arity, a
//! field the struct doesn't declare) are reported whatever the value is,
//! so the same arm list fails the same way for every scrutinee.

use cowl_ir::{Literal, Name, Pattern, StringInterner};
use smallvec::SmallVec;

use crate::errors::{payload_arity, shape_mismatch, EvalError};
use crate::ownership::deref;
use crate::types::TypeRegistry;
use crate::Value;

/// Bindings produced by a successful match, in pattern order.
pub type Bindings = SmallVec<[(Name, Value); 4]>;

/// Matches patterns against values using the registered type shapes.
#[derive(Clone, Copy)]
pub struct Matcher<'a> {
    types: &'a TypeRegistry,
    interner: &'a StringInterner,
}

impl<'a> Matcher<'a> {
    pub fn new(types: &'a TypeRegistry, interner: &'a StringInterner) -> Self {
        Matcher { types, interner }
    }

    /// Match one pattern, returning its bindings on success.
    pub fn try_match(&self, pattern: &Pattern, value: &Value) -> Result<Option<Bindings>, EvalError> {
        let mut bindings = Bindings::new();
        if self.match_into(pattern, value, &mut bindings)? {
            Ok(Some(bindings))
        } else {
            Ok(None)
        }
    }

    /// Index and bindings of the first pattern that matches.
    ///
    /// Later patterns are never inspected once one matches.
    pub fn first_match<'p>(
        &self,
        patterns: impl IntoIterator<Item = &'p Pattern>,
        value: &Value,
    ) -> Result<Option<(usize, Bindings)>, EvalError> {
        for (index, pattern) in patterns.into_iter().enumerate() {
            if let Some(bindings) = self.try_match(pattern, value)? {
                return Ok(Some((index, bindings)));
            }
        }
        Ok(None)
    }

    fn match_into(
        &self,
        pattern: &Pattern,
        value: &Value,
        out: &mut Bindings,
    ) -> Result<bool, EvalError> {
        if let Value::Ref(reference) = value {
            let target = deref(self.interner, reference)?;
            return self.match_into(pattern, &target, out);
        }
        match pattern {
            Pattern::Wildcard => Ok(true),

            Pattern::Binding(name) => {
                out.push((*name, value.clone_handle()));
                Ok(true)
            }

            Pattern::Literal(literal) => Ok(self.literal_matches(literal, value)),

            Pattern::Variant {
                ty,
                variant,
                fields,
            } => {
                let (type_id, tag) = self.types.resolve_variant(*ty, *variant)?;
                let declared = self
                    .types
                    .variant_def(type_id, tag)
                    .map_or(0, |def| def.payload.len());
                if declared != fields.len() {
                    return Err(payload_arity(
                        self.interner.lookup(*variant),
                        declared,
                        fields.len(),
                    ));
                }
                match value {
                    Value::Variant(v) if v.type_id == type_id && v.tag == tag => {
                        for (sub, item) in fields.iter().zip(v.payload.iter()) {
                            if !self.match_into(sub, item, out)? {
                                return Ok(false);
                            }
                        }
                        Ok(true)
                    }
                    _ => Ok(false),
                }
            }

            Pattern::Struct { ty, fields } => {
                let type_id = self.types.resolve_type(*ty)?;
                let descriptor = self.types.get(type_id);
                if !descriptor.is_struct() {
                    return Err(shape_mismatch(format!(
                        "`{}` is an enum, not a struct",
                        self.interner.lookup(*ty)
                    )));
                }
                let mut indices = SmallVec::<[usize; 4]>::with_capacity(fields.len());
                for (field, _) in fields {
                    let Some((index, _)) = descriptor.field(*field) else {
                        return Err(shape_mismatch(format!(
                            "struct `{}` has no field `{}`",
                            self.interner.lookup(*ty),
                            self.interner.lookup(*field)
                        )));
                    };
                    indices.push(index);
                }
                match value {
                    Value::Struct(s) if s.type_id == type_id => {
                        for ((_, sub), index) in fields.iter().zip(indices) {
                            if !self.match_into(sub, &s.fields[index], out)? {
                                return Ok(false);
                            }
                        }
                        Ok(true)
                    }
                    _ => Ok(false),
                }
            }
        }
    }

    fn literal_matches(&self, literal: &Literal, value: &Value) -> bool {
        match (literal, value) {
            (Literal::Unit, Value::Unit) => true,
            (Literal::Bool(a), Value::Bool(b)) => a == b,
            (Literal::Int(a), Value::Int(b)) => a == b,
            #[allow(clippy::float_cmp, reason = "literal patterns use exact equality")]
            (Literal::Float(a), Value::Float(b)) => a == b,
            (Literal::Str(name), Value::Str(s)) => self.interner.lookup(*name) == &**s,
            _ => false,
        }
    }
}
