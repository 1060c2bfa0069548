//! Canonical string form of values.
//!
//! - primitives print literally (`42`, `1.5`, `true`, `()`)
//! - sequences print as `[e1, e2, ...]`
//! - structs print as `TypeName{field: value, ...}` in declaration order
//! - enum instances print as `Variant(p1, ...)`, or `Variant` with no payload
//!
//! Strings print raw at the top level and quoted when nested, so
//! `print(["a"])` shows `["a"]` while `print("a")` shows `a`.

use std::fmt::Write;

use cowl_ir::StringInterner;

use super::Value;
use crate::types::TypeRegistry;

/// Renders values using the type registry for names.
#[derive(Clone, Copy)]
pub struct Printer<'a> {
    types: &'a TypeRegistry,
    interner: &'a StringInterner,
}

impl<'a> Printer<'a> {
    pub fn new(types: &'a TypeRegistry, interner: &'a StringInterner) -> Self {
        Printer { types, interner }
    }

    /// Canonical form as shown by `print`.
    pub fn render(&self, value: &Value) -> String {
        let mut out = String::new();
        self.write_value(&mut out, value, false);
        out
    }

    /// Canonical form with strings quoted, as used inside compounds and
    /// in diagnostics.
    pub fn render_quoted(&self, value: &Value) -> String {
        let mut out = String::new();
        self.write_value(&mut out, value, true);
        out
    }

    fn write_value(&self, out: &mut String, value: &Value, quote_strings: bool) {
        match value {
            Value::Unit => out.push_str("()"),
            Value::Bool(b) => {
                let _ = write!(out, "{b}");
            }
            Value::Int(n) => {
                let _ = write!(out, "{n}");
            }
            Value::Float(x) => write_float(out, *x),
            Value::Str(s) => {
                if quote_strings {
                    let _ = write!(out, "{:?}", &**s);
                } else {
                    out.push_str(s);
                }
            }
            Value::Seq(items) => {
                out.push('[');
                self.write_list(out, items);
                out.push(']');
            }
            Value::Struct(s) => {
                let descriptor = self.types.get(s.type_id);
                out.push_str(self.interner.lookup(descriptor.name));
                out.push('{');
                for (i, (field, value)) in descriptor.field_names().zip(s.fields.iter()).enumerate()
                {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(self.interner.lookup(field));
                    out.push_str(": ");
                    self.write_value(out, value, true);
                }
                out.push('}');
            }
            Value::Variant(v) => {
                let name = self
                    .types
                    .variant_def(v.type_id, v.tag)
                    .map_or("<variant>", |def| self.interner.lookup(def.name));
                out.push_str(name);
                if !v.payload.is_empty() {
                    out.push('(');
                    self.write_list(out, &v.payload);
                    out.push(')');
                }
            }
            Value::Ref(r) => match r.target().read() {
                Some(target) => self.write_value(out, &target, quote_strings),
                None => out.push_str("<dangling ref>"),
            },
        }
    }

    fn write_list(&self, out: &mut String, items: &[Value]) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_value(out, item, true);
        }
    }
}

/// Floats always show a fractional part so they never read as ints.
fn write_float(out: &mut String, x: f64) {
    if x.is_finite() && x.fract() == 0.0 {
        let _ = write!(out, "{x:.1}");
    } else {
        let _ = write!(out, "{x}");
    }
}
