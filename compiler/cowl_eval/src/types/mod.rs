//! Algebraic data engine: the closed table of struct and enum shapes.
//!
//! A [`TypeDescriptor`] is registered once, at program load, and is never
//! modified afterwards; a load that fails part-way drops the types it
//! added. Instances are validated against their descriptor
//! at construction, so the matcher and the evaluator can trust a
//! [`StructValue`](crate::StructValue)'s field order and a
//! [`VariantValue`](crate::VariantValue)'s payload arity without looking
//! anything up dynamically.
//!
//! `Option` (`Some(T)`, `None`) and `Result` (`Ok(T)`, `Err(E)`) are
//! registered by [`TypeRegistry::new`] like any user enum.

use cowl_ir::{EnumDecl, Name, SharedInterner, StructDecl, TypeAnnot};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::errors::{
    duplicate_type, payload_arity, shape_mismatch, type_mismatch, undefined_type, unknown_variant,
    EvalError, EvalResult,
};
use crate::{TypeId, Value, VariantTag};

/// A struct field as declared.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDef {
    pub name: Name,
    /// Whether the field may be assigned in place.
    pub mutable: bool,
    pub ty: TypeAnnot,
}

/// An enum variant as declared.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariantDef {
    pub name: Name,
    pub payload: Vec<TypeAnnot>,
}

/// Struct or enum shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeKind {
    Struct { fields: Vec<FieldDef> },
    Enum { variants: Vec<VariantDef> },
}

/// Immutable shape of a registered type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub id: TypeId,
    pub name: Name,
    pub kind: TypeKind,
}

impl TypeDescriptor {
    /// Declared fields (empty for enums).
    pub fn fields(&self) -> &[FieldDef] {
        match &self.kind {
            TypeKind::Struct { fields } => fields,
            TypeKind::Enum { .. } => &[],
        }
    }

    /// Declared variants (empty for structs).
    pub fn variants(&self) -> &[VariantDef] {
        match &self.kind {
            TypeKind::Enum { variants } => variants,
            TypeKind::Struct { .. } => &[],
        }
    }

    pub fn field_names(&self) -> impl Iterator<Item = Name> + '_ {
        self.fields().iter().map(|field| field.name)
    }

    /// Position and definition of a field.
    pub fn field(&self, name: Name) -> Option<(usize, &FieldDef)> {
        self.fields()
            .iter()
            .enumerate()
            .find(|(_, field)| field.name == name)
    }

    /// Tag of a variant.
    pub fn variant_tag(&self, name: Name) -> Option<VariantTag> {
        let index = self.variants().iter().position(|v| v.name == name)?;
        u32::try_from(index).ok().map(VariantTag::new)
    }

    pub fn is_struct(&self) -> bool {
        matches!(self.kind, TypeKind::Struct { .. })
    }
}

/// Ids of the pre-registered enums.
#[derive(Copy, Clone, Debug)]
struct BuiltinTypes {
    option: TypeId,
    result: TypeId,
}

// Tags follow declaration order in `TypeRegistry::new`.
const SOME: VariantTag = VariantTag::new(0);
const NONE: VariantTag = VariantTag::new(1);
const OK: VariantTag = VariantTag::new(0);
const ERR: VariantTag = VariantTag::new(1);

/// The process-wide type table.
pub struct TypeRegistry {
    types: Vec<TypeDescriptor>,
    by_name: FxHashMap<Name, TypeId>,
    /// Every enum declaring a given variant name, for unqualified lookup.
    variants_by_name: FxHashMap<Name, SmallVec<[(TypeId, VariantTag); 2]>>,
    builtins: BuiltinTypes,
    interner: SharedInterner,
}

impl TypeRegistry {
    /// Create a registry with `Option` and `Result` pre-registered.
    pub fn new(interner: &SharedInterner) -> Self {
        let mut registry = TypeRegistry {
            types: Vec::new(),
            by_name: FxHashMap::default(),
            variants_by_name: FxHashMap::default(),
            builtins: BuiltinTypes {
                option: TypeId::new(0),
                result: TypeId::new(1),
            },
            interner: interner.clone(),
        };
        let variant = |name: &str| VariantDef {
            name: interner.intern(name),
            payload: vec![TypeAnnot::Any],
        };
        registry.insert(
            registry.builtins.option,
            interner.intern("Option"),
            TypeKind::Enum {
                variants: vec![
                    variant("Some"),
                    VariantDef {
                        name: interner.intern("None"),
                        payload: Vec::new(),
                    },
                ],
            },
        );
        registry.insert(
            registry.builtins.result,
            interner.intern("Result"),
            TypeKind::Enum {
                variants: vec![variant("Ok"), variant("Err")],
            },
        );
        registry
    }

    /// Id the next registered type receives.
    fn next_id(&self) -> Result<TypeId, EvalError> {
        u32::try_from(self.types.len())
            .map(TypeId::new)
            .map_err(|_| shape_mismatch("too many types registered"))
    }

    fn insert(&mut self, id: TypeId, name: Name, kind: TypeKind) {
        if let TypeKind::Enum { variants } = &kind {
            for (tag, variant) in (0u32..).zip(variants) {
                self.variants_by_name
                    .entry(variant.name)
                    .or_default()
                    .push((id, VariantTag::new(tag)));
            }
        }
        self.by_name.insert(name, id);
        self.types.push(TypeDescriptor { id, name, kind });
    }

    /// Drop every type registered after the first `len`, so a failed
    /// program load leaves the table as it found it. `Option` and `Result`
    /// are always kept.
    pub(crate) fn truncate(&mut self, len: usize) {
        let keep = len.max(self.builtins.result.index() + 1);
        if keep >= self.types.len() {
            return;
        }
        for removed in self.types.drain(keep..) {
            self.by_name.remove(&removed.name);
        }
        self.variants_by_name.retain(|_, owners| {
            owners.retain(|(id, _)| id.index() < keep);
            !owners.is_empty()
        });
    }

    /// Register a new type.
    ///
    /// Fails with `DuplicateTypeError` if the name is taken and with
    /// `ShapeMismatchError` if a field or variant name repeats.
    pub fn register_type(&mut self, name: Name, kind: TypeKind) -> Result<TypeId, EvalError> {
        if self.by_name.contains_key(&name) {
            return Err(duplicate_type(self.interner.lookup(name)));
        }
        let member_names: Vec<Name> = match &kind {
            TypeKind::Struct { fields } => fields.iter().map(|f| f.name).collect(),
            TypeKind::Enum { variants } => variants.iter().map(|v| v.name).collect(),
        };
        for (i, member) in member_names.iter().enumerate() {
            if member_names[..i].contains(member) {
                return Err(shape_mismatch(format!(
                    "`{}` is declared twice in type `{}`",
                    self.interner.lookup(*member),
                    self.interner.lookup(name)
                )));
            }
        }
        let id = self.next_id()?;
        self.insert(id, name, kind);
        tracing::debug!(
            ty = self.interner.lookup(name),
            id = id.index(),
            "registered type"
        );
        Ok(id)
    }

    /// Register a `struct` declaration.
    pub fn register_struct(&mut self, decl: &StructDecl) -> Result<TypeId, EvalError> {
        let fields = decl
            .fields
            .iter()
            .map(|field| FieldDef {
                name: field.name,
                mutable: field.mutable,
                ty: field.ty,
            })
            .collect();
        self.register_type(decl.name, TypeKind::Struct { fields })
    }

    /// Register an `enum` declaration.
    pub fn register_enum(&mut self, decl: &EnumDecl) -> Result<TypeId, EvalError> {
        let variants = decl
            .variants
            .iter()
            .map(|variant| VariantDef {
                name: variant.name,
                payload: variant.payload.clone(),
            })
            .collect();
        self.register_type(decl.name, TypeKind::Enum { variants })
    }

    /// Descriptor of a registered type.
    ///
    /// `TypeId`s are only minted by this registry, so the lookup cannot miss.
    pub fn get(&self, id: TypeId) -> &TypeDescriptor {
        &self.types[id.index()]
    }

    /// Look up a type by name.
    pub fn lookup(&self, name: Name) -> Option<TypeId> {
        self.by_name.get(&name).copied()
    }

    /// Look up a type by name, failing with `UndefinedTypeError`.
    pub fn resolve_type(&self, name: Name) -> Result<TypeId, EvalError> {
        self.lookup(name)
            .ok_or_else(|| undefined_type(self.interner.lookup(name)))
    }

    /// Number of registered types, built-ins included.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Always `false`: `Option` and `Result` are pre-registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn variant_def(&self, id: TypeId, tag: VariantTag) -> Option<&VariantDef> {
        self.get(id).variants().get(tag.index())
    }

    /// Resolve a possibly unqualified variant name to its enum and tag.
    ///
    /// Unqualified names must be declared by exactly one enum.
    pub fn resolve_variant(
        &self,
        ty: Option<Name>,
        variant: Name,
    ) -> Result<(TypeId, VariantTag), EvalError> {
        if let Some(ty) = ty {
            let id = self.resolve_type(ty)?;
            let descriptor = self.get(id);
            if descriptor.is_struct() {
                return Err(shape_mismatch(format!(
                    "`{}` is a struct, not an enum",
                    self.interner.lookup(ty)
                )));
            }
            return descriptor.variant_tag(variant).map(|tag| (id, tag)).ok_or_else(|| {
                unknown_variant(self.interner.lookup(ty), self.interner.lookup(variant))
            });
        }
        match self.variants_by_name.get(&variant).map(SmallVec::as_slice) {
            Some([single]) => Ok(*single),
            Some(candidates) if candidates.len() > 1 => Err(shape_mismatch(format!(
                "variant `{}` is declared by {} enums; qualify it with its type",
                self.interner.lookup(variant),
                candidates.len()
            ))),
            _ => Err(unknown_variant("", self.interner.lookup(variant))),
        }
    }

    /// Build a struct instance from named field values.
    ///
    /// The names must match the declared fields exactly: no missing, extra
    /// or repeated field is accepted. Values are stored in declaration order.
    pub fn construct_struct(&self, id: TypeId, field_values: Vec<(Name, Value)>) -> EvalResult {
        let descriptor = self.get(id);
        let type_name = self.interner.lookup(descriptor.name);
        if !descriptor.is_struct() {
            return Err(shape_mismatch(format!(
                "`{type_name}` is an enum, not a struct"
            )));
        }
        let fields = descriptor.fields();
        let mut slots: Vec<Option<Value>> = vec![None; fields.len()];
        for (name, value) in field_values {
            let Some((index, def)) = descriptor.field(name) else {
                return Err(shape_mismatch(format!(
                    "struct `{type_name}` has no field `{}`",
                    self.interner.lookup(name)
                )));
            };
            if slots[index].is_some() {
                return Err(shape_mismatch(format!(
                    "field `{}` of `{type_name}` is given twice",
                    self.interner.lookup(name)
                )));
            }
            self.check_annot(def.ty, &value)?;
            slots[index] = Some(value);
        }
        let mut values = Vec::with_capacity(fields.len());
        for (slot, def) in slots.into_iter().zip(fields) {
            let Some(value) = slot else {
                return Err(shape_mismatch(format!(
                    "missing field `{}` in `{type_name}`",
                    self.interner.lookup(def.name)
                )));
            };
            values.push(value);
        }
        Ok(Value::struct_instance(id, values))
    }

    /// Build an enum instance, validating the variant and its payload arity.
    pub fn construct_enum_variant(
        &self,
        id: TypeId,
        variant: Name,
        payload: Vec<Value>,
    ) -> EvalResult {
        let descriptor = self.get(id);
        let Some(tag) = descriptor.variant_tag(variant) else {
            return Err(unknown_variant(
                self.interner.lookup(descriptor.name),
                self.interner.lookup(variant),
            ));
        };
        self.construct_tagged(id, tag, payload)
    }

    /// Build an enum instance from an already-resolved tag.
    pub fn construct_tagged(&self, id: TypeId, tag: VariantTag, payload: Vec<Value>) -> EvalResult {
        let Some(def) = self.variant_def(id, tag) else {
            return Err(unknown_variant(
                self.interner.lookup(self.get(id).name),
                &format!("#{}", tag.index()),
            ));
        };
        if def.payload.len() != payload.len() {
            return Err(payload_arity(
                self.interner.lookup(def.name),
                def.payload.len(),
                payload.len(),
            ));
        }
        for (annot, value) in def.payload.iter().zip(&payload) {
            self.check_annot(*annot, value)?;
        }
        Ok(Value::variant(id, tag, payload))
    }

    // Built-in Option/Result

    pub fn option_type(&self) -> TypeId {
        self.builtins.option
    }

    pub fn result_type(&self) -> TypeId {
        self.builtins.result
    }

    pub fn some(&self, value: Value) -> Value {
        Value::variant(self.option_type(), SOME, vec![value])
    }

    pub fn none(&self) -> Value {
        Value::variant(self.option_type(), NONE, Vec::new())
    }

    pub fn ok(&self, value: Value) -> Value {
        Value::variant(self.result_type(), OK, vec![value])
    }

    pub fn err(&self, value: Value) -> Value {
        Value::variant(self.result_type(), ERR, vec![value])
    }

    /// `Some(value)` or `None`.
    pub fn option(&self, value: Option<Value>) -> Value {
        match value {
            Some(value) => self.some(value),
            None => self.none(),
        }
    }

    // Annotations and naming

    /// Whether `value` carries the runtime tag `annot` asks for.
    ///
    /// Names that are not registered types (generic parameters) accept
    /// anything.
    pub fn accepts(&self, annot: TypeAnnot, value: &Value) -> bool {
        match (annot, value) {
            (TypeAnnot::Any, _)
            | (TypeAnnot::Unit, Value::Unit)
            | (TypeAnnot::Bool, Value::Bool(_))
            | (TypeAnnot::Int, Value::Int(_))
            | (TypeAnnot::Float, Value::Float(_))
            | (TypeAnnot::Str, Value::Str(_))
            | (TypeAnnot::Seq, Value::Seq(_)) => true,
            (TypeAnnot::Named(name), value) => match self.lookup(name) {
                None => true,
                Some(id) => match value {
                    Value::Struct(s) => s.type_id == id,
                    Value::Variant(v) => v.type_id == id,
                    _ => false,
                },
            },
            _ => false,
        }
    }

    /// [`TypeRegistry::accepts`], failing with `TypeMismatchError`.
    pub(crate) fn check_annot(&self, annot: TypeAnnot, value: &Value) -> Result<(), EvalError> {
        if self.accepts(annot, value) {
            Ok(())
        } else {
            Err(type_mismatch(&self.annot_name(annot), &self.describe(value)))
        }
    }

    fn annot_name(&self, annot: TypeAnnot) -> String {
        match annot {
            TypeAnnot::Any => "any".to_string(),
            TypeAnnot::Unit => "unit".to_string(),
            TypeAnnot::Bool => "bool".to_string(),
            TypeAnnot::Int => "int".to_string(),
            TypeAnnot::Float => "float".to_string(),
            TypeAnnot::Str => "str".to_string(),
            TypeAnnot::Seq => "seq".to_string(),
            TypeAnnot::Named(name) => self.interner.lookup(name).to_string(),
        }
    }

    /// Type name of a value for diagnostics (declared name for instances).
    pub fn describe(&self, value: &Value) -> String {
        match value {
            Value::Struct(s) => self.interner.lookup(self.get(s.type_id).name).to_string(),
            Value::Variant(v) => self.interner.lookup(self.get(v.type_id).name).to_string(),
            other => other.type_name().to_string(),
        }
    }
}
