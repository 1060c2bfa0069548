//! AST nodes handed to the evaluator.
//!
//! There is no statement/expression split: `let`, assignment, `if`,
//! `match` and blocks are all [`ExprKind`]s that produce a value.

mod expr;
mod items;
mod pattern;

pub use expr::{BinaryOp, Expr, ExprKind, MatchArm, Place, PlaceSegment, UnaryOp};
pub use items::{
    Decl, EnumDecl, FieldDecl, FnDecl, Item, Param, ParamMode, Program, StructDecl, TypeAnnot,
    VariantDecl,
};
pub use pattern::{Literal, Pattern};
