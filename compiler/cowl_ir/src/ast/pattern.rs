//! Match patterns.

use crate::Name;

/// A `match` arm pattern.
#[derive(Clone, Debug, PartialEq)]
pub enum Pattern {
    /// `_`
    Wildcard,
    /// A literal compared by structural equality.
    Literal(Literal),
    /// Binds the matched value to a name.
    Binding(Name),
    /// `Type.Variant(p1, p2, ..)`; payload positions are matched in order.
    Variant {
        ty: Option<Name>,
        variant: Name,
        fields: Vec<Pattern>,
    },
    /// `Type { field: p, .. }`; unlisted fields are not inspected.
    Struct {
        ty: Name,
        fields: Vec<(Name, Pattern)>,
    },
}

/// Literal values usable in patterns.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Unit,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Name),
}
