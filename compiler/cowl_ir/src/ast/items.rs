//! Declarations and whole programs.

use crate::{Expr, Name, Span};

/// A complete program: declarations and top-level expressions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program {
    pub items: Vec<Item>,
}

impl Program {
    /// Iterate over the declarations in source order.
    pub fn decls(&self) -> impl Iterator<Item = &Decl> {
        self.items.iter().filter_map(|item| match item {
            Item::Decl(decl) => Some(decl),
            Item::Expr(_) => None,
        })
    }

    /// Iterate over the top-level expressions in source order.
    pub fn exprs(&self) -> impl Iterator<Item = &Expr> {
        self.items.iter().filter_map(|item| match item {
            Item::Expr(expr) => Some(expr),
            Item::Decl(_) => None,
        })
    }
}

/// A top-level program item.
#[derive(Clone, Debug, PartialEq)]
pub enum Item {
    Decl(Decl),
    Expr(Expr),
}

/// A declaration registered at program load.
#[derive(Clone, Debug, PartialEq)]
pub enum Decl {
    Struct(StructDecl),
    Enum(EnumDecl),
    Fn(FnDecl),
}

impl Decl {
    /// Declared name.
    pub fn name(&self) -> Name {
        match self {
            Decl::Struct(s) => s.name,
            Decl::Enum(e) => e.name,
            Decl::Fn(f) => f.name,
        }
    }

    /// Source location of the declaration.
    pub fn span(&self) -> Span {
        match self {
            Decl::Struct(s) => s.span,
            Decl::Enum(e) => e.span,
            Decl::Fn(f) => f.span,
        }
    }
}

/// `struct Name { [mut] field: Type, .. def method(self, ..) .. }`
#[derive(Clone, Debug, PartialEq)]
pub struct StructDecl {
    pub name: Name,
    pub fields: Vec<FieldDecl>,
    /// Methods called as `value.method(args)`. The first parameter receives
    /// the value the method is called on, by value, `ref` or `ref mut`.
    pub methods: Vec<FnDecl>,
    pub span: Span,
}

/// A struct field declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDecl {
    pub name: Name,
    pub mutable: bool,
    pub ty: TypeAnnot,
}

/// `enum Name { Variant(T1, T2), .. }`
#[derive(Clone, Debug, PartialEq)]
pub struct EnumDecl {
    pub name: Name,
    pub variants: Vec<VariantDecl>,
    pub span: Span,
}

/// An enum variant declaration with its positional payload types.
#[derive(Clone, Debug, PartialEq)]
pub struct VariantDecl {
    pub name: Name,
    pub payload: Vec<TypeAnnot>,
}

/// `def name(params) -> Ret: body`
#[derive(Clone, Debug, PartialEq)]
pub struct FnDecl {
    pub name: Name,
    pub params: Vec<Param>,
    /// Checked against the value the body produces.
    pub ret: TypeAnnot,
    pub body: Expr,
    pub span: Span,
}

impl FnDecl {
    #[must_use]
    pub fn returning(mut self, ret: TypeAnnot) -> Self {
        self.ret = ret;
        self
    }
}

/// A function parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: Name,
    pub mode: ParamMode,
    /// `mut` on a by-value parameter makes the callee-local binding mutable.
    pub mutable: bool,
    /// Checked against the argument at call time (the target's value for
    /// `ref` parameters).
    pub ty: TypeAnnot,
}

impl Param {
    #[must_use]
    pub fn typed(mut self, ty: TypeAnnot) -> Self {
        self.ty = ty;
        self
    }
}

/// How an argument is passed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ParamMode {
    /// Callee receives a shared handle; its mutations never reach the caller.
    ByValue,
    /// Callee receives an alias of the caller's binding (`ref` / `ref mut`).
    ByRef { mutable: bool },
}

/// Optional type annotation, checked by runtime tag only.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeAnnot {
    /// Unannotated or generic.
    Any,
    Unit,
    Bool,
    Int,
    Float,
    Str,
    Seq,
    /// A user-declared or built-in struct/enum type. Names that are not
    /// registered types (generic parameters like `T`) accept any value.
    Named(Name),
}
