//! Programmatic AST construction.
//!
//! Front ends that already have a tree, the host's bundled demos and the
//! test suites build programs through [`AstBuilder`] instead of text.
//! Every node gets [`Span::DUMMY`] unless [`AstBuilder::at`] is used.

use crate::{
    BinaryOp, Decl, EnumDecl, Expr, ExprKind, FieldDecl, FnDecl, Literal, MatchArm, Name, Param,
    ParamMode, Pattern, Place, SharedInterner, Span, StructDecl, TypeAnnot, UnaryOp, VariantDecl,
};

/// Builder for AST nodes that interns names on the fly.
#[derive(Clone)]
pub struct AstBuilder {
    interner: SharedInterner,
}

impl AstBuilder {
    /// Create a builder interning into `interner`.
    pub fn new(interner: &SharedInterner) -> Self {
        AstBuilder {
            interner: interner.clone(),
        }
    }

    /// The interner names are placed in.
    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    /// Intern a name.
    pub fn name(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    /// Re-span an expression.
    #[must_use]
    pub fn at(&self, mut expr: Expr, start: u32, end: u32) -> Expr {
        expr.span = Span::new(start, end);
        expr
    }

    // Literals and names

    pub fn unit(&self) -> Expr {
        Expr::synthetic(ExprKind::Unit)
    }

    pub fn bool(&self, b: bool) -> Expr {
        Expr::synthetic(ExprKind::Bool(b))
    }

    pub fn int(&self, n: i64) -> Expr {
        Expr::synthetic(ExprKind::Int(n))
    }

    pub fn float(&self, f: f64) -> Expr {
        Expr::synthetic(ExprKind::Float(f))
    }

    pub fn str(&self, s: &str) -> Expr {
        Expr::synthetic(ExprKind::Str(self.name(s)))
    }

    pub fn ident(&self, s: &str) -> Expr {
        Expr::synthetic(ExprKind::Ident(self.name(s)))
    }

    // Compound construction

    pub fn seq(&self, items: Vec<Expr>) -> Expr {
        Expr::synthetic(ExprKind::Seq(items))
    }

    pub fn struct_lit(&self, ty: &str, fields: Vec<(&str, Expr)>) -> Expr {
        Expr::synthetic(ExprKind::StructLit {
            ty: self.name(ty),
            fields: fields
                .into_iter()
                .map(|(field, value)| (self.name(field), value))
                .collect(),
        })
    }

    /// Variant construction with the enum type left for the evaluator to resolve.
    pub fn variant(&self, variant: &str, args: Vec<Expr>) -> Expr {
        Expr::synthetic(ExprKind::Variant {
            ty: None,
            variant: self.name(variant),
            args,
        })
    }

    /// Variant construction qualified by its enum type.
    pub fn qualified_variant(&self, ty: &str, variant: &str, args: Vec<Expr>) -> Expr {
        Expr::synthetic(ExprKind::Variant {
            ty: Some(self.name(ty)),
            variant: self.name(variant),
            args,
        })
    }

    // Access

    pub fn field(&self, receiver: Expr, field: &str) -> Expr {
        Expr::synthetic(ExprKind::Field {
            receiver: Box::new(receiver),
            field: self.name(field),
        })
    }

    pub fn index(&self, receiver: Expr, index: Expr) -> Expr {
        Expr::synthetic(ExprKind::Index {
            receiver: Box::new(receiver),
            index: Box::new(index),
        })
    }

    // Operators

    pub fn binary(&self, op: BinaryOp, left: Expr, right: Expr) -> Expr {
        Expr::synthetic(ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn add(&self, left: Expr, right: Expr) -> Expr {
        self.binary(BinaryOp::Add, left, right)
    }

    pub fn eq(&self, left: Expr, right: Expr) -> Expr {
        self.binary(BinaryOp::Eq, left, right)
    }

    pub fn unary(&self, op: UnaryOp, operand: Expr) -> Expr {
        Expr::synthetic(ExprKind::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    // Control flow

    pub fn if_else(&self, cond: Expr, then_branch: Expr, else_branch: Expr) -> Expr {
        Expr::synthetic(ExprKind::If {
            cond: Box::new(cond),
            then_branch: Box::new(then_branch),
            else_branch: Some(Box::new(else_branch)),
        })
    }

    pub fn if_then(&self, cond: Expr, then_branch: Expr) -> Expr {
        Expr::synthetic(ExprKind::If {
            cond: Box::new(cond),
            then_branch: Box::new(then_branch),
            else_branch: None,
        })
    }

    pub fn match_(&self, scrutinee: Expr, arms: Vec<MatchArm>) -> Expr {
        Expr::synthetic(ExprKind::Match {
            scrutinee: Box::new(scrutinee),
            arms,
        })
    }

    pub fn arm(&self, pattern: Pattern, body: Expr) -> MatchArm {
        MatchArm {
            pattern,
            guard: None,
            body,
            span: Span::DUMMY,
        }
    }

    pub fn guarded_arm(&self, pattern: Pattern, guard: Expr, body: Expr) -> MatchArm {
        MatchArm {
            pattern,
            guard: Some(guard),
            body,
            span: Span::DUMMY,
        }
    }

    pub fn block(&self, exprs: Vec<Expr>) -> Expr {
        Expr::synthetic(ExprKind::Block(exprs))
    }

    // Bindings and mutation

    pub fn let_(&self, name: &str, value: Expr) -> Expr {
        Expr::synthetic(ExprKind::Let {
            name: self.name(name),
            mutable: false,
            value: Box::new(value),
        })
    }

    pub fn let_mut(&self, name: &str, value: Expr) -> Expr {
        Expr::synthetic(ExprKind::Let {
            name: self.name(name),
            mutable: true,
            value: Box::new(value),
        })
    }

    /// Assignment to a place expression (`x`, `p.x`, `xs[0].y`).
    ///
    /// A target that is not rooted at a binding becomes an assignment to the
    /// empty name, which fails at evaluation as an undefined variable.
    pub fn assign(&self, target: Expr, value: Expr) -> Expr {
        let target =
            Place::from_expr(&target).unwrap_or_else(|| Place::binding(Name::EMPTY, target.span));
        Expr::synthetic(ExprKind::Assign {
            target,
            value: Box::new(value),
        })
    }

    /// `target op= value`, with the same target rules as [`AstBuilder::assign`].
    pub fn compound_assign(&self, target: Expr, op: BinaryOp, value: Expr) -> Expr {
        let target =
            Place::from_expr(&target).unwrap_or_else(|| Place::binding(Name::EMPTY, target.span));
        Expr::synthetic(ExprKind::CompoundAssign {
            target,
            op,
            value: Box::new(value),
        })
    }

    pub fn call(&self, func: &str, args: Vec<Expr>) -> Expr {
        Expr::synthetic(ExprKind::Call {
            func: self.name(func),
            args,
        })
    }

    pub fn method(&self, receiver: Expr, method: &str, args: Vec<Expr>) -> Expr {
        Expr::synthetic(ExprKind::MethodCall {
            receiver: Box::new(receiver),
            method: self.name(method),
            args,
        })
    }

    // Patterns

    pub fn p_wild(&self) -> Pattern {
        Pattern::Wildcard
    }

    pub fn p_bind(&self, name: &str) -> Pattern {
        Pattern::Binding(self.name(name))
    }

    pub fn p_int(&self, n: i64) -> Pattern {
        Pattern::Literal(Literal::Int(n))
    }

    pub fn p_str(&self, s: &str) -> Pattern {
        Pattern::Literal(Literal::Str(self.name(s)))
    }

    pub fn p_variant(&self, variant: &str, fields: Vec<Pattern>) -> Pattern {
        Pattern::Variant {
            ty: None,
            variant: self.name(variant),
            fields,
        }
    }

    pub fn p_qualified_variant(&self, ty: &str, variant: &str, fields: Vec<Pattern>) -> Pattern {
        Pattern::Variant {
            ty: Some(self.name(ty)),
            variant: self.name(variant),
            fields,
        }
    }

    pub fn p_struct(&self, ty: &str, fields: Vec<(&str, Pattern)>) -> Pattern {
        Pattern::Struct {
            ty: self.name(ty),
            fields: fields
                .into_iter()
                .map(|(field, pattern)| (self.name(field), pattern))
                .collect(),
        }
    }

    // Declarations

    /// `struct` with unannotated fields; the flag marks a field `mut`.
    pub fn struct_decl(&self, name: &str, fields: Vec<(&str, bool)>) -> Decl {
        self.struct_with_methods(name, fields, Vec::new())
    }

    /// `struct` with methods; see [`AstBuilder::method_decl`].
    pub fn struct_with_methods(
        &self,
        name: &str,
        fields: Vec<(&str, bool)>,
        methods: Vec<FnDecl>,
    ) -> Decl {
        Decl::Struct(StructDecl {
            name: self.name(name),
            fields: fields
                .into_iter()
                .map(|(field, mutable)| FieldDecl {
                    name: self.name(field),
                    mutable,
                    ty: TypeAnnot::Any,
                })
                .collect(),
            methods,
            span: Span::DUMMY,
        })
    }

    pub fn enum_decl(&self, name: &str, variants: Vec<(&str, Vec<TypeAnnot>)>) -> Decl {
        Decl::Enum(EnumDecl {
            name: self.name(name),
            variants: variants
                .into_iter()
                .map(|(variant, payload)| VariantDecl {
                    name: self.name(variant),
                    payload,
                })
                .collect(),
            span: Span::DUMMY,
        })
    }

    pub fn fn_decl(&self, name: &str, params: Vec<Param>, body: Expr) -> Decl {
        Decl::Fn(self.method_decl(name, params, body))
    }

    /// A bare function declaration, used for struct methods. The first
    /// parameter is the receiver.
    pub fn method_decl(&self, name: &str, params: Vec<Param>, body: Expr) -> FnDecl {
        FnDecl {
            name: self.name(name),
            params,
            ret: TypeAnnot::Any,
            body,
            span: Span::DUMMY,
        }
    }

    /// Immutable by-value parameter.
    pub fn param(&self, name: &str) -> Param {
        Param {
            name: self.name(name),
            mode: ParamMode::ByValue,
            mutable: false,
            ty: TypeAnnot::Any,
        }
    }

    /// `mut` by-value parameter.
    pub fn param_mut(&self, name: &str) -> Param {
        Param {
            name: self.name(name),
            mode: ParamMode::ByValue,
            mutable: true,
            ty: TypeAnnot::Any,
        }
    }

    /// `ref` parameter.
    pub fn param_ref(&self, name: &str) -> Param {
        Param {
            name: self.name(name),
            mode: ParamMode::ByRef { mutable: false },
            mutable: false,
            ty: TypeAnnot::Any,
        }
    }

    /// `ref mut` parameter.
    pub fn param_ref_mut(&self, name: &str) -> Param {
        Param {
            name: self.name(name),
            mode: ParamMode::ByRef { mutable: true },
            mutable: true,
            ty: TypeAnnot::Any,
        }
    }
}
