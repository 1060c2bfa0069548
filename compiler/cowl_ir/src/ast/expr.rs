//! Expression nodes.

use std::fmt;

use crate::{Name, Pattern, Span};

/// An expression with its source location.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    /// Create an expression node.
    #[inline]
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }

    /// Create an expression node with [`Span::DUMMY`].
    #[inline]
    pub fn synthetic(kind: ExprKind) -> Self {
        Expr {
            kind,
            span: Span::DUMMY,
        }
    }

    /// If this expression names a binding directly, return the name.
    pub fn as_ident(&self) -> Option<Name> {
        match self.kind {
            ExprKind::Ident(name) => Some(name),
            _ => None,
        }
    }
}

/// Expression kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    /// `()`
    Unit,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// String literal (interned contents).
    Str(Name),
    /// Variable reference.
    Ident(Name),
    /// Sequence literal: `[a, b, c]`.
    Seq(Vec<Expr>),
    /// Struct construction: `Point { x: 1, y: 2 }`.
    StructLit {
        ty: Name,
        fields: Vec<(Name, Expr)>,
    },
    /// Enum variant construction: `Shape.Circle(1.0)`, `Some(x)`, `None`.
    ///
    /// `ty` may be omitted when the variant name is unique across all
    /// registered enums.
    Variant {
        ty: Option<Name>,
        variant: Name,
        args: Vec<Expr>,
    },
    /// Struct field read: `p.x`.
    Field {
        receiver: Box<Expr>,
        field: Name,
    },
    /// Sequence element read: `xs[i]`.
    Index {
        receiver: Box<Expr>,
        index: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// `if cond { .. } else { .. }`; a missing else yields `()`.
    If {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Option<Box<Expr>>,
    },
    Match {
        scrutinee: Box<Expr>,
        arms: Vec<MatchArm>,
    },
    /// `{ e1; e2; ...; en }` evaluating to `en` in a fresh scope.
    Block(Vec<Expr>),
    /// `let [mut] name = value`
    Let {
        name: Name,
        mutable: bool,
        value: Box<Expr>,
    },
    /// `place = value`
    Assign {
        target: Place,
        value: Box<Expr>,
    },
    /// `place op= value` for an arithmetic `op` (`+=`, `-=`, `*=`, `/=`, `%=`).
    CompoundAssign {
        target: Place,
        op: BinaryOp,
        value: Box<Expr>,
    },
    /// Call of a declared function or a builtin.
    Call {
        func: Name,
        args: Vec<Expr>,
    },
    /// `receiver.method(args)`
    MethodCall {
        receiver: Box<Expr>,
        method: Name,
        args: Vec<Expr>,
    },
}

/// One arm of a `match` expression.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchArm {
    pub pattern: Pattern,
    pub guard: Option<Expr>,
    pub body: Expr,
    pub span: Span,
}

/// An assignable location: a binding followed by field/index projections.
#[derive(Clone, Debug, PartialEq)]
pub struct Place {
    pub root: Name,
    pub path: Vec<PlaceSegment>,
    pub span: Span,
}

impl Place {
    /// A place naming a binding directly.
    pub fn binding(root: Name, span: Span) -> Self {
        Place {
            root,
            path: Vec::new(),
            span,
        }
    }

    /// Convert a receiver expression (`a`, `a.b`, `a[0].c`) into a place.
    ///
    /// Returns `None` when the expression is not rooted at a binding.
    pub fn from_expr(expr: &Expr) -> Option<Place> {
        match &expr.kind {
            ExprKind::Ident(name) => Some(Place::binding(*name, expr.span)),
            ExprKind::Field { receiver, field } => {
                let mut place = Place::from_expr(receiver)?;
                place.path.push(PlaceSegment::Field(*field));
                place.span = expr.span;
                Some(place)
            }
            ExprKind::Index { receiver, index } => {
                let mut place = Place::from_expr(receiver)?;
                place.path.push(PlaceSegment::Index((**index).clone()));
                place.span = expr.span;
                Some(place)
            }
            _ => None,
        }
    }
}

/// A projection step within a [`Place`].
#[derive(Clone, Debug, PartialEq)]
pub enum PlaceSegment {
    Field(Name),
    Index(Expr),
}

/// Binary operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

impl BinaryOp {
    /// Source symbol for diagnostics.
    pub fn as_symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_symbol())
    }
}

/// Unary operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl UnaryOp {
    /// Source symbol for diagnostics.
    pub fn as_symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}
