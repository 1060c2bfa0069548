//! Cowl IR - the abstract syntax tree consumed by the evaluation core.
//!
//! This crate contains:
//! - Spans for source locations
//! - Names for interned identifiers
//! - AST nodes (expressions, places, patterns, declarations)
//! - [`AstBuilder`] for constructing trees without a parser
//!
//! The core never parses text. A front end (or a test) produces a
//! [`Program`] and hands it to the evaluator together with the
//! [`SharedInterner`] that owns every [`Name`] in it.

pub mod ast;
mod builder;
mod interner;
mod name;
mod span;

pub use ast::{
    BinaryOp, Decl, EnumDecl, Expr, ExprKind, FieldDecl, FnDecl, Item, Literal, MatchArm, Param,
    ParamMode, Pattern, Place, PlaceSegment, Program, StructDecl, TypeAnnot, UnaryOp, VariantDecl,
};
pub use builder::AstBuilder;
pub use interner::{SharedInterner, StringInterner};
pub use name::Name;
pub use span::Span;
