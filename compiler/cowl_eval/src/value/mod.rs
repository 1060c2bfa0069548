//! Runtime values.
//!
//! [`Value`] is a closed tagged union. Primitives are plain data and are
//! copied trivially. Sequences, struct instances and enum payloads live in
//! a [`SharedCell`]; copying one of those values only creates another
//! handle, never a new buffer.
//!
//! Deep copies happen in exactly one place: the ownership engine, when a
//! mutation finds its target storage shared. `Value` itself exposes
//! [`clone_handle`](Value::clone_handle) for sharing and a crate-private
//! [`deep_copy`](Value::deep_copy) for that engine.

mod cell;
mod format;
mod reference;

use std::fmt;
use std::rc::Rc;

pub use cell::SharedCell;
pub use format::Printer;
pub use reference::Reference;

/// Index of a registered struct or enum type.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    #[inline]
    pub(crate) const fn new(raw: u32) -> Self {
        TypeId(raw)
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

/// Position of a variant in its enum's declaration.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariantTag(u32);

impl VariantTag {
    #[inline]
    pub(crate) const fn new(raw: u32) -> Self {
        VariantTag(raw)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for VariantTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VariantTag({})", self.0)
    }
}

/// Struct instance. Fields are stored in descriptor order.
#[derive(Clone, Debug)]
pub struct StructValue {
    pub type_id: TypeId,
    pub fields: SharedCell<Vec<Value>>,
}

/// Enum instance with its positional payload.
#[derive(Clone, Debug)]
pub struct VariantValue {
    pub type_id: TypeId,
    pub tag: VariantTag,
    pub payload: SharedCell<Vec<Value>>,
}

/// Runtime value.
#[derive(Clone, Debug)]
pub enum Value {
    // Primitives (copied by value)
    Unit,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Immutable string contents. Sharing the `Rc` is invisible to the user.
    Str(Rc<str>),

    // Compounds (SharedCell-backed, copy-on-write)
    Seq(SharedCell<Vec<Value>>),
    Struct(StructValue),
    Variant(VariantValue),

    /// Alias to a binding, held only by `ref` parameter slots.
    Ref(Reference),
}

// Factory methods

impl Value {
    /// Create a string value.
    #[inline]
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::Str(Rc::from(s.as_ref()))
    }

    /// Create a sequence in a fresh cell.
    #[inline]
    pub fn seq(items: Vec<Value>) -> Self {
        Value::Seq(SharedCell::new(items))
    }

    /// Create a struct instance in a fresh cell.
    ///
    /// Does not validate the shape; use the type registry's
    /// `construct_struct` for user-facing construction.
    #[inline]
    pub(crate) fn struct_instance(type_id: TypeId, fields: Vec<Value>) -> Self {
        Value::Struct(StructValue {
            type_id,
            fields: SharedCell::new(fields),
        })
    }

    /// Create an enum instance in a fresh cell.
    ///
    /// Does not validate the payload; use the type registry's
    /// `construct_enum_variant` for user-facing construction.
    #[inline]
    pub(crate) fn variant(type_id: TypeId, tag: VariantTag, payload: Vec<Value>) -> Self {
        Value::Variant(VariantValue {
            type_id,
            tag,
            payload: SharedCell::new(payload),
        })
    }
}

// Ownership primitives

impl Value {
    /// A new logical owner of the same storage (owner count + 1).
    ///
    /// Primitives are simply copied.
    #[inline]
    #[must_use]
    pub fn clone_handle(&self) -> Self {
        self.clone()
    }

    /// Copy with entirely fresh cells, recursively.
    ///
    /// Every compound in the result has owner count 1. References are not
    /// compounds and are copied as aliases.
    #[must_use]
    pub(crate) fn deep_copy(&self) -> Self {
        match self {
            Value::Seq(items) => Value::seq(deep_copy_all(items)),
            Value::Struct(s) => Value::struct_instance(s.type_id, deep_copy_all(&s.fields)),
            Value::Variant(v) => Value::variant(v.type_id, v.tag, deep_copy_all(&v.payload)),
            other => other.clone(),
        }
    }

    /// Owner count of the top-level cell, or `None` for non-compounds.
    pub fn owner_count(&self) -> Option<usize> {
        match self {
            Value::Seq(items) => Some(items.owner_count()),
            Value::Struct(s) => Some(s.fields.owner_count()),
            Value::Variant(v) => Some(v.payload.owner_count()),
            _ => None,
        }
    }

    /// Whether two values share the same top-level storage.
    pub fn shares_storage_with(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Seq(a), Value::Seq(b)) => a.ptr_eq(b),
            (Value::Struct(a), Value::Struct(b)) => a.fields.ptr_eq(&b.fields),
            (Value::Variant(a), Value::Variant(b)) => a.payload.ptr_eq(&b.payload),
            _ => false,
        }
    }
}

fn deep_copy_all(items: &[Value]) -> Vec<Value> {
    items.iter().map(Value::deep_copy).collect()
}

// Accessors

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(items) => Some(items),
            _ => None,
        }
    }

    /// Short tag name for error messages. Struct and enum instances report
    /// their kind; use `TypeRegistry::describe` for the declared type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Unit => "unit",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Seq(_) => "seq",
            Value::Struct(_) => "struct",
            Value::Variant(_) => "enum",
            Value::Ref(_) => "ref",
        }
    }
}

/// Structural equality.
///
/// Compounds compare element-wise unless they share storage; references
/// compare the values they alias (a dead reference equals nothing).
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        if self.shares_storage_with(other) {
            return true;
        }
        match (self, other) {
            (Value::Unit, Value::Unit) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            #[allow(clippy::float_cmp, reason = "language equality is exact IEEE equality")]
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Seq(a), Value::Seq(b)) => a[..] == b[..],
            (Value::Struct(a), Value::Struct(b)) => {
                a.type_id == b.type_id && a.fields[..] == b.fields[..]
            }
            (Value::Variant(a), Value::Variant(b)) => {
                a.type_id == b.type_id && a.tag == b.tag && a.payload[..] == b.payload[..]
            }
            (Value::Ref(a), Value::Ref(b)) if a.same_target(b) => a.is_live(),
            (Value::Ref(a), Value::Ref(b)) => match (a.target().read(), b.target().read()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
            (Value::Ref(r), v) | (v, Value::Ref(r)) => r.target().read().is_some_and(|x| &x == v),
            _ => false,
        }
    }
}
