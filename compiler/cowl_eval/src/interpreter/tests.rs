#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use cowl_ir::{AstBuilder, Item, Span, TypeAnnot};
use pretty_assertions::assert_eq;

use crate::config::PrintMode;
use crate::errors::EvalErrorKind;

struct Harness {
    b: AstBuilder,
    interp: Interpreter,
}

impl Harness {
    fn new() -> Self {
        Self::with_config(EvalConfig::default())
    }

    fn with_config(config: EvalConfig) -> Self {
        let interner = SharedInterner::new();
        let b = AstBuilder::new(&interner);
        let interp = InterpreterBuilder::new(&interner)
            .config(config.with_print(PrintMode::Buffer))
            .build();
        Harness { b, interp }
    }

    fn load(&mut self, decls: Vec<Decl>) {
        let program = Program {
            items: decls.into_iter().map(Item::Decl).collect(),
        };
        self.interp.load_program(&program).unwrap();
    }

    fn eval(&mut self, expr: &Expr) -> Value {
        self.interp
            .eval(expr)
            .unwrap_or_else(|e| panic!("evaluation failed: {e}"))
    }

    fn eval_err(&mut self, expr: &Expr) -> EvalError {
        match self.interp.eval(expr) {
            Ok(value) => panic!("expected an error, got {value:?}"),
            Err(e) => e,
        }
    }

    fn global(&self, name: &str) -> Value {
        self.interp.global(name).unwrap()
    }

    fn ints(&self, values: &[i64]) -> Expr {
        self.b
            .seq(values.iter().map(|&n| self.b.int(n)).collect())
    }
}

fn seq(values: &[i64]) -> Value {
    Value::seq(values.iter().copied().map(Value::Int).collect())
}

#[test]
fn test_value_copy_isolated_from_mutable_copy() {
    let mut h = Harness::new();
    let b = h.b.clone();
    h.eval(&b.let_("a", h.ints(&[10, 20, 30])));
    h.eval(&b.let_("b", b.ident("a")));
    h.eval(&b.let_mut("c", b.ident("a")));
    h.eval(&b.method(b.ident("c"), "push", vec![b.int(40)]));
    h.eval(&b.call("print", vec![b.ident("b")]));

    assert_eq!(h.interp.output(), "[10, 20, 30]\n");
    assert_eq!(h.global("a"), seq(&[10, 20, 30]));
    assert_eq!(h.global("c"), seq(&[10, 20, 30, 40]));
    assert!(h.global("a").shares_storage_with(&h.global("b")));
    assert!(!h.global("a").shares_storage_with(&h.global("c")));
}

#[test]
fn test_match_on_result() {
    let mut h = Harness::new();
    let b = h.b.clone();
    let expr = b.match_(
        b.variant("Ok", vec![b.int(5)]),
        vec![
            b.arm(
                b.p_variant("Ok", vec![b.p_bind("v")]),
                b.add(b.ident("v"), b.int(1)),
            ),
            b.arm(b.p_variant("Err", vec![b.p_wild()]), b.int(-1)),
        ],
    );
    assert_eq!(h.eval(&expr), Value::Int(6));
}

#[test]
fn test_ref_mut_and_by_value_parameters() {
    let mut h = Harness::new();
    let b = h.b.clone();
    h.load(vec![
        b.fn_decl(
            "append",
            vec![b.param_ref_mut("xs")],
            b.method(b.ident("xs"), "push", vec![b.int(4)]),
        ),
        b.fn_decl(
            "appended",
            vec![b.param_mut("xs")],
            b.block(vec![
                b.method(b.ident("xs"), "push", vec![b.int(4)]),
                b.ident("xs"),
            ]),
        ),
    ]);
    h.eval(&b.let_mut("s", h.ints(&[1, 2, 3])));

    let copy = h.eval(&b.call("appended", vec![b.ident("s")]));
    assert_eq!(copy, seq(&[1, 2, 3, 4]));
    assert_eq!(h.global("s"), seq(&[1, 2, 3]));

    h.eval(&b.call("append", vec![b.ident("s")]));
    assert_eq!(h.global("s"), seq(&[1, 2, 3, 4]));
}

#[test]
fn test_ref_mut_reassignment_reaches_caller() {
    let mut h = Harness::new();
    let b = h.b.clone();
    h.load(vec![b.fn_decl(
        "reset",
        vec![b.param_ref_mut("n")],
        b.assign(b.ident("n"), b.int(0)),
    )]);
    h.eval(&b.let_mut("count", b.int(9)));
    h.eval(&b.call("reset", vec![b.ident("count")]));
    assert_eq!(h.global("count"), Value::Int(0));
}

#[test]
fn test_ref_argument_errors() {
    let mut h = Harness::new();
    let b = h.b.clone();
    h.load(vec![
        b.fn_decl("touch", vec![b.param_ref_mut("xs")], b.unit()),
        b.fn_decl(
            "peek",
            vec![b.param_ref("xs")],
            b.method(b.ident("xs"), "push", vec![b.int(1)]),
        ),
    ]);
    h.eval(&b.let_("frozen", h.ints(&[1])));

    let err = h.eval_err(&b.call("touch", vec![b.ident("frozen")]));
    assert_eq!(err.code(), "ImmutableBindingError");

    let err = h.eval_err(&b.call("touch", vec![h.ints(&[1])]));
    assert_eq!(err.code(), "TypeMismatchError");

    h.eval(&b.let_mut("open", h.ints(&[1])));
    let err = h.eval_err(&b.call("peek", vec![b.ident("open")]));
    assert_eq!(err.code(), "ImmutableBindingError");
    assert_eq!(h.global("open"), seq(&[1]));
}

#[test]
fn test_every_mutation_kind_rejects_immutable_binding() {
    let mut h = Harness::new();
    let b = h.b.clone();
    h.load(vec![b.struct_decl("Cell", vec![("v", true)])]);
    h.eval(&b.let_("xs", h.ints(&[1, 2])));
    h.eval(&b.let_("cell", b.struct_lit("Cell", vec![("v", b.int(1))])));

    let attempts = [
        b.method(b.ident("xs"), "push", vec![b.int(3)]),
        b.method(b.ident("xs"), "pop", Vec::new()),
        b.method(b.ident("xs"), "insert", vec![b.int(0), b.int(3)]),
        b.method(b.ident("xs"), "remove", vec![b.int(0)]),
        b.method(b.ident("xs"), "clear", Vec::new()),
        b.assign(b.ident("xs"), h.ints(&[])),
        b.assign(b.index(b.ident("xs"), b.int(0)), b.int(9)),
        b.assign(b.field(b.ident("cell"), "v"), b.int(9)),
        b.compound_assign(b.ident("xs"), BinaryOp::Add, h.ints(&[3])),
        b.compound_assign(b.index(b.ident("xs"), b.int(0)), BinaryOp::Add, b.int(1)),
        b.compound_assign(b.field(b.ident("cell"), "v"), BinaryOp::Mul, b.int(2)),
    ];
    for attempt in &attempts {
        let err = h.eval_err(attempt);
        assert_eq!(err.code(), "ImmutableBindingError", "{attempt:?}");
    }
    assert_eq!(h.global("xs"), seq(&[1, 2]));
}

#[test]
fn test_field_assignment_copies_shared_struct() {
    let mut h = Harness::new();
    let b = h.b.clone();
    h.load(vec![b.struct_decl("Point", vec![("x", true), ("y", false)])]);
    h.eval(&b.let_mut(
        "p",
        b.struct_lit("Point", vec![("x", b.int(1)), ("y", b.int(2))]),
    ));
    h.eval(&b.let_("q", b.ident("p")));
    h.eval(&b.assign(b.field(b.ident("p"), "x"), b.int(10)));

    assert_eq!(h.eval(&b.field(b.ident("p"), "x")), Value::Int(10));
    assert_eq!(h.eval(&b.field(b.ident("q"), "x")), Value::Int(1));

    let err = h.eval_err(&b.assign(b.field(b.ident("p"), "y"), b.int(3)));
    assert_eq!(err.code(), "ImmutableBindingError");
    assert_eq!(err.message, "cannot mutate immutable binding `p.y`");

    let err = h.eval_err(&b.field(b.ident("p"), "z"));
    assert_eq!(err.code(), "ShapeMismatchError");
}

#[test]
fn test_nested_mutation_does_not_leak() {
    let mut h = Harness::new();
    let b = h.b.clone();
    h.eval(&b.let_("inner", h.ints(&[1])));
    h.eval(&b.let_mut("outer", b.seq(vec![b.ident("inner"), h.ints(&[2])])));
    h.eval(&b.method(b.index(b.ident("outer"), b.int(0)), "push", vec![b.int(9)]));

    assert_eq!(h.global("inner"), seq(&[1]));
    assert_eq!(
        h.global("outer"),
        Value::seq(vec![seq(&[1, 9]), seq(&[2])])
    );
}

#[test]
fn test_index_assignment_and_bounds() {
    let mut h = Harness::new();
    let b = h.b.clone();
    h.eval(&b.let_mut("xs", h.ints(&[1, 2, 3])));
    h.eval(&b.assign(b.index(b.ident("xs"), b.int(1)), b.int(20)));
    assert_eq!(h.global("xs"), seq(&[1, 20, 3]));

    let err = h.eval_err(&b.index(b.ident("xs"), b.int(3)));
    assert_eq!(err.code(), "IndexOutOfBoundsError");
    let err = h.eval_err(&b.assign(b.index(b.ident("xs"), b.int(-1)), b.int(0)));
    assert_eq!(err.code(), "IndexOutOfBoundsError");
}

#[test]
fn test_sequence_methods() {
    let mut h = Harness::new();
    let b = h.b.clone();
    h.eval(&b.let_mut("xs", h.ints(&[1, 2, 3])));
    let some_one = h.interp.types().some(Value::Int(1));
    let none = h.interp.types().none();

    assert_eq!(h.eval(&b.method(b.ident("xs"), "len", Vec::new())), Value::Int(3));
    assert_eq!(h.eval(&b.method(b.ident("xs"), "first", Vec::new())), some_one);
    assert_eq!(
        h.eval(&b.method(b.ident("xs"), "get", vec![b.int(7)])),
        none.clone_handle()
    );
    assert_eq!(
        h.eval(&b.method(b.ident("xs"), "contains", vec![b.int(2)])),
        Value::Bool(true)
    );
    assert_eq!(
        h.eval(&b.method(b.ident("xs"), "remove", vec![b.int(0)])),
        Value::Int(1)
    );
    h.eval(&b.method(b.ident("xs"), "insert", vec![b.int(2), b.int(4)]));
    assert_eq!(h.global("xs"), seq(&[2, 3, 4]));
    assert_eq!(
        h.eval(&b.method(b.ident("xs"), "pop", Vec::new())),
        h.interp.types().some(Value::Int(4))
    );
    h.eval(&b.method(b.ident("xs"), "clear", Vec::new()));
    assert_eq!(h.eval(&b.method(b.ident("xs"), "pop", Vec::new())), none);
    assert_eq!(
        h.eval(&b.method(b.ident("xs"), "is_empty", Vec::new())),
        Value::Bool(true)
    );

    let err = h.eval_err(&b.method(b.ident("xs"), "push", Vec::new()));
    assert_eq!(err.code(), "ArityMismatchError");
    let err = h.eval_err(&b.method(b.ident("xs"), "sort", Vec::new()));
    assert_eq!(err.code(), "UndefinedFunctionError");
    let err = h.eval_err(&b.method(h.ints(&[1]), "push", vec![b.int(1)]));
    assert_eq!(err.code(), "TypeMismatchError");
}

#[test]
fn test_builtin_functions() {
    let mut h = Harness::new();
    let b = h.b.clone();
    h.eval(&b.call(
        "print",
        vec![b.str("n ="), b.int(3), b.seq(vec![b.str("a")])],
    ));
    assert_eq!(h.interp.output(), "n = 3 [\"a\"]\n");

    assert_eq!(h.eval(&b.call("len", vec![b.str("héllo")])), Value::Int(5));
    assert_eq!(
        h.eval(&b.call("to_str", vec![h.ints(&[1, 2])])),
        Value::string("[1, 2]")
    );
    let err = h.eval_err(&b.call("len", vec![b.int(1), b.int(2)]));
    assert_eq!(err.code(), "ArityMismatchError");
    let err = h.eval_err(&b.call("nope", Vec::new()));
    assert_eq!(err.code(), "UndefinedFunctionError");
}

#[test]
fn test_guard_falls_through() {
    let mut h = Harness::new();
    let b = h.b.clone();
    let classify = |n: i64| {
        b.match_(
            b.int(n),
            vec![
                b.guarded_arm(
                    b.p_bind("n"),
                    b.binary(BinaryOp::Gt, b.ident("n"), b.int(10)),
                    b.str("big"),
                ),
                b.arm(b.p_bind("n"), b.str("small")),
            ],
        )
    };
    assert_eq!(h.eval(&classify(50)), Value::string("big"));
    assert_eq!(h.eval(&classify(5)), Value::string("small"));

    let bad_guard = b.match_(
        b.int(1),
        vec![b.guarded_arm(b.p_wild(), b.int(1), b.unit())],
    );
    assert_eq!(h.eval_err(&bad_guard).code(), "TypeMismatchError");

    let guarded_out = b.match_(
        b.int(3),
        vec![
            b.guarded_arm(b.p_bind("n"), b.bool(false), b.unit()),
            b.arm(b.p_int(4), b.unit()),
        ],
    );
    assert_eq!(h.eval_err(&guarded_out).code(), "NonExhaustiveMatchError");
}

#[test]
fn test_first_matching_arm_wins() {
    let mut h = Harness::new();
    let b = h.b.clone();
    let expr = b.match_(
        b.int(1),
        vec![
            b.arm(b.p_int(1), b.str("first")),
            b.arm(b.p_int(1), b.call("undefined_fn", Vec::new())),
            b.arm(b.p_wild(), b.str("last")),
        ],
    );
    assert_eq!(h.eval(&expr), Value::string("first"));
}

#[test]
fn test_non_exhaustive_match() {
    let mut h = Harness::new();
    let b = h.b.clone();
    let expr = b.match_(
        b.variant("Some", vec![b.int(1)]),
        vec![b.arm(b.p_variant("None", Vec::new()), b.int(0))],
    );
    let err = h.eval_err(&expr);
    assert_eq!(err.code(), "NonExhaustiveMatchError");
    assert_eq!(err.message, "no match arm matches value `Some(1)`");
    assert_eq!(err.notes.len(), 1);
}

#[test]
fn test_duplicate_pattern_binding() {
    let mut h = Harness::new();
    let b = h.b.clone();
    h.load(vec![b.enum_decl(
        "Pair",
        vec![("P", vec![TypeAnnot::Any, TypeAnnot::Any])],
    )]);
    let expr = b.match_(
        b.variant("P", vec![b.int(1), b.int(2)]),
        vec![b.arm(
            b.p_variant("P", vec![b.p_bind("a"), b.p_bind("a")]),
            b.unit(),
        )],
    );
    assert_eq!(h.eval_err(&expr).code(), "RedefinitionError");
}

#[test]
fn test_scopes_restored_after_failure() {
    let mut h = Harness::new();
    let b = h.b.clone();
    let depth = h.interp.env().depth();
    let expr = b.block(vec![
        b.let_("x", b.int(1)),
        b.match_(
            b.int(1),
            vec![b.arm(b.p_bind("y"), b.binary(BinaryOp::Div, b.ident("y"), b.int(0)))],
        ),
    ]);
    assert_eq!(h.eval_err(&expr).code(), "DivisionByZeroError");
    assert_eq!(h.interp.env().depth(), depth);
    assert!(h.interp.global("x").is_err());
}

#[test]
fn test_let_redefinition_and_shadowing() {
    let mut h = Harness::new();
    let b = h.b.clone();
    let same_scope = b.block(vec![b.let_("x", b.int(1)), b.let_("x", b.int(2))]);
    assert_eq!(h.eval_err(&same_scope).code(), "RedefinitionError");

    let shadowed = b.block(vec![
        b.let_("x", b.int(1)),
        b.let_("y", b.block(vec![b.let_("x", b.int(2)), b.ident("x")])),
        b.add(b.ident("x"), b.ident("y")),
    ]);
    assert_eq!(h.eval(&shadowed), Value::Int(3));
}

#[test]
fn test_if_requires_bool() {
    let mut h = Harness::new();
    let b = h.b.clone();
    assert_eq!(h.eval(&b.if_then(b.bool(false), b.int(1))), Value::Unit);
    assert_eq!(
        h.eval(&b.if_else(b.bool(true), b.int(1), b.int(2))),
        Value::Int(1)
    );
    let err = h.eval_err(&b.if_else(b.int(1), b.int(1), b.int(2)));
    assert_eq!(
        err.kind,
        EvalErrorKind::TypeMismatch {
            expected: "bool".to_string(),
            got: "int".to_string()
        }
    );
}

#[test]
fn test_short_circuit() {
    let mut h = Harness::new();
    let b = h.b.clone();
    let boom = b.eq(b.binary(BinaryOp::Div, b.int(1), b.int(0)), b.int(0));
    assert_eq!(
        h.eval(&b.binary(BinaryOp::And, b.bool(false), boom.clone())),
        Value::Bool(false)
    );
    assert_eq!(
        h.eval(&b.binary(BinaryOp::Or, b.bool(true), boom)),
        Value::Bool(true)
    );
}

#[test]
fn test_recursion() {
    let mut h = Harness::new();
    let b = h.b.clone();
    h.load(vec![b.fn_decl(
        "fact",
        vec![b.param("n")],
        b.if_else(
            b.binary(BinaryOp::LtEq, b.ident("n"), b.int(1)),
            b.int(1),
            b.binary(
                BinaryOp::Mul,
                b.ident("n"),
                b.call("fact", vec![b.binary(BinaryOp::Sub, b.ident("n"), b.int(1))]),
            ),
        ),
    )]);
    assert_eq!(h.eval(&b.call("fact", vec![b.int(10)])), Value::Int(3_628_800));
}

#[test]
fn test_recursion_limit() {
    let mut h = Harness::with_config(EvalConfig::default().with_max_call_depth(50));
    let b = h.b.clone();
    h.load(vec![b.fn_decl(
        "forever",
        vec![b.param("n")],
        b.call("forever", vec![b.add(b.ident("n"), b.int(1))]),
    )]);
    let err = h.eval_err(&b.call("forever", vec![b.int(0)]));
    assert_eq!(err.kind, EvalErrorKind::RecursionLimit { depth: 50 });
    assert_eq!(h.interp.env().frame_depth(), 0);
    assert_eq!(h.interp.env().depth(), 1);
}

#[test]
fn test_call_frame_hides_caller_locals() {
    let mut h = Harness::new();
    let b = h.b.clone();
    h.load(vec![b.fn_decl(
        "sum",
        vec![b.param("n")],
        b.add(b.ident("g"), b.ident("n")),
    )]);
    h.eval(&b.let_("g", b.int(100)));
    assert_eq!(h.eval(&b.call("sum", vec![b.int(1)])), Value::Int(101));

    h.load(vec![b.fn_decl("peek", Vec::new(), b.ident("local"))]);
    let expr = b.block(vec![b.let_("local", b.int(1)), b.call("peek", Vec::new())]);
    assert_eq!(h.eval_err(&expr).code(), "UndefinedVariableError");
}

#[test]
fn test_call_errors() {
    let mut h = Harness::new();
    let b = h.b.clone();
    h.load(vec![b.fn_decl("id", vec![b.param("x")], b.ident("x"))]);
    let err = h.eval_err(&b.call("id", Vec::new()));
    assert_eq!(
        err.kind,
        EvalErrorKind::ArityMismatch {
            name: "id".to_string(),
            expected: 1,
            got: 0
        }
    );

    let program = Program {
        items: vec![Item::Decl(b.fn_decl("id", Vec::new(), b.unit()))],
    };
    assert_eq!(
        h.interp.load_program(&program).unwrap_err().code(),
        "RedefinitionError"
    );
}

#[test]
fn test_struct_and_variant_construction_errors() {
    let mut h = Harness::new();
    let b = h.b.clone();
    h.load(vec![
        b.struct_decl("Point", vec![("x", false), ("y", false)]),
        b.enum_decl("Shape", vec![("Circle", vec![TypeAnnot::Float])]),
    ]);
    let missing = b.struct_lit("Point", vec![("x", b.int(1))]);
    assert_eq!(h.eval_err(&missing).code(), "ShapeMismatchError");

    let arity = b.qualified_variant("Shape", "Circle", Vec::new());
    assert_eq!(h.eval_err(&arity).code(), "PayloadArityError");

    let unknown = b.qualified_variant("Shape", "Square", vec![b.float(1.0)]);
    assert_eq!(h.eval_err(&unknown).code(), "UnknownVariantError");

    let program = Program {
        items: vec![Item::Decl(b.struct_decl("Point", Vec::new()))],
    };
    assert_eq!(
        h.interp.load_program(&program).unwrap_err().code(),
        "DuplicateTypeError"
    );
}

#[test]
fn test_error_carries_innermost_span() {
    let mut h = Harness::new();
    let b = h.b.clone();
    let inner = b.at(b.ident("nope"), 4, 8);
    let outer = b.at(b.add(b.int(1), inner), 0, 8);
    let err = h.eval_err(&outer);
    assert_eq!(err.code(), "UndefinedVariableError");
    assert_eq!(err.span, Some(Span::new(4, 8)));
}

#[test]
fn test_run_program_returns_each_value() {
    let mut h = Harness::new();
    let b = h.b.clone();
    let program = Program {
        items: vec![
            Item::Expr(b.let_("x", b.int(2))),
            Item::Decl(b.fn_decl("double", vec![b.param("n")], b.add(b.ident("n"), b.ident("n")))),
            Item::Expr(b.call("double", vec![b.ident("x")])),
        ],
    };
    let values = h.interp.run_program(&program).unwrap();
    assert_eq!(values, vec![Value::Unit, Value::Int(4)]);
}

#[test]
fn test_options_participate_in_cow() {
    let mut h = Harness::new();
    let b = h.b.clone();
    h.eval(&b.let_("a", b.variant("Some", vec![h.ints(&[1])])));
    h.eval(&b.let_("b", b.ident("a")));
    assert!(h.global("a").shares_storage_with(&h.global("b")));
}

#[test]
fn test_compound_assignment() {
    let mut h = Harness::new();
    let b = h.b.clone();
    h.load(vec![
        b.struct_decl("Counter", vec![("n", true)]),
        b.fn_decl(
            "bump",
            vec![b.param_ref_mut("x")],
            b.compound_assign(b.ident("x"), BinaryOp::Add, b.int(5)),
        ),
    ]);
    h.eval(&b.let_mut("total", b.int(10)));
    h.eval(&b.compound_assign(b.ident("total"), BinaryOp::Mul, b.int(3)));
    assert_eq!(h.global("total"), Value::Int(30));
    h.eval(&b.call("bump", vec![b.ident("total")]));
    assert_eq!(h.global("total"), Value::Int(35));

    h.eval(&b.let_mut("xs", h.ints(&[1, 2])));
    h.eval(&b.let_("before", b.ident("xs")));
    h.eval(&b.compound_assign(
        b.index(b.ident("xs"), b.int(1)),
        BinaryOp::Sub,
        b.int(7),
    ));
    assert_eq!(h.global("xs"), seq(&[1, -5]));
    assert_eq!(h.global("before"), seq(&[1, 2]));

    h.eval(&b.let_mut("c", b.struct_lit("Counter", vec![("n", b.int(1))])));
    h.eval(&b.compound_assign(b.field(b.ident("c"), "n"), BinaryOp::Add, b.int(1)));
    assert_eq!(h.eval(&b.field(b.ident("c"), "n")), Value::Int(2));

    let err = h.eval_err(&b.compound_assign(b.ident("total"), BinaryOp::Div, b.int(0)));
    assert_eq!(err.code(), "DivisionByZeroError");
    let err = h.eval_err(&b.compound_assign(b.ident("total"), BinaryOp::Add, b.str("x")));
    assert_eq!(err.code(), "TypeMismatchError");
    assert_eq!(h.global("total"), Value::Int(35));
}

fn counter_with_methods(b: &AstBuilder) -> Decl {
    b.struct_with_methods(
        "Counter",
        vec![("n", true)],
        vec![
            b.method_decl("get", vec![b.param("self")], b.field(b.ident("self"), "n")),
            b.method_decl(
                "add",
                vec![b.param_ref_mut("self"), b.param("k")],
                b.compound_assign(b.field(b.ident("self"), "n"), BinaryOp::Add, b.ident("k")),
            ),
            b.method_decl(
                "push",
                vec![b.param_ref_mut("self")],
                b.compound_assign(b.field(b.ident("self"), "n"), BinaryOp::Add, b.int(100)),
            ),
        ],
    )
}

#[test]
fn test_struct_methods_dispatch_on_receiver_type() {
    let mut h = Harness::new();
    let b = h.b.clone();
    h.load(vec![counter_with_methods(&b)]);
    h.eval(&b.let_mut("c", b.struct_lit("Counter", vec![("n", b.int(1))])));
    h.eval(&b.let_("snapshot", b.ident("c")));

    assert_eq!(h.eval(&b.method(b.ident("c"), "get", Vec::new())), Value::Int(1));
    h.eval(&b.method(b.ident("c"), "add", vec![b.int(4)]));
    assert_eq!(h.eval(&b.method(b.ident("c"), "get", Vec::new())), Value::Int(5));
    assert_eq!(h.eval(&b.field(b.ident("snapshot"), "n")), Value::Int(1));

    // A struct's own `push` wins over the sequence builtin.
    h.eval(&b.method(b.ident("c"), "push", Vec::new()));
    assert_eq!(h.eval(&b.field(b.ident("c"), "n")), Value::Int(105));
    h.eval(&b.let_mut("xs", h.ints(&[1])));
    h.eval(&b.method(b.ident("xs"), "push", vec![b.int(2)]));
    assert_eq!(h.global("xs"), seq(&[1, 2]));

    let temporary = b.struct_lit("Counter", vec![("n", b.int(7))]);
    assert_eq!(h.eval(&b.method(temporary, "get", Vec::new())), Value::Int(7));
}

#[test]
fn test_struct_method_errors() {
    let mut h = Harness::new();
    let b = h.b.clone();
    h.load(vec![counter_with_methods(&b)]);
    h.eval(&b.let_("frozen", b.struct_lit("Counter", vec![("n", b.int(1))])));
    h.eval(&b.let_mut("c", b.ident("frozen")));

    let err = h.eval_err(&b.method(b.ident("frozen"), "add", vec![b.int(1)]));
    assert_eq!(err.code(), "ImmutableBindingError");
    let err = h.eval_err(&b.method(b.ident("c"), "add", Vec::new()));
    assert_eq!(
        err.kind,
        EvalErrorKind::ArityMismatch {
            name: "Counter.add".to_string(),
            expected: 1,
            got: 0
        }
    );
    let err = h.eval_err(&b.method(b.ident("c"), "reset", Vec::new()));
    assert_eq!(
        err.kind,
        EvalErrorKind::UndefinedFunction {
            name: "Counter.reset".to_string()
        }
    );

    let no_receiver = Program {
        items: vec![Item::Decl(b.struct_with_methods(
            "Bad",
            Vec::new(),
            vec![b.method_decl("m", Vec::new(), b.unit())],
        ))],
    };
    let err = h.interp.load_program(&no_receiver).unwrap_err();
    assert_eq!(err.code(), "ShapeMismatchError");

    let twice = Program {
        items: vec![Item::Decl(b.struct_with_methods(
            "Twice",
            Vec::new(),
            vec![
                b.method_decl("m", vec![b.param("self")], b.unit()),
                b.method_decl("m", vec![b.param("self")], b.unit()),
            ],
        ))],
    };
    let err = h.interp.load_program(&twice).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::Redefinition {
            name: "Twice.m".to_string()
        }
    );
    assert_eq!(h.interp.types().lookup(b.name("Twice")), None);
    assert_eq!(h.interp.types().lookup(b.name("Bad")), None);
}

#[test]
fn test_parameter_and_return_annotations() {
    let mut h = Harness::new();
    let b = h.b.clone();
    h.load(vec![
        Decl::Fn(
            b.method_decl(
                "double",
                vec![b.param("n").typed(TypeAnnot::Int)],
                b.add(b.ident("n"), b.ident("n")),
            )
            .returning(TypeAnnot::Int),
        ),
        Decl::Fn(b.method_decl("broken", vec![b.param("n")], b.str("oops")).returning(TypeAnnot::Int)),
        b.fn_decl(
            "grow",
            vec![b.param_ref_mut("xs").typed(TypeAnnot::Seq)],
            b.method(b.ident("xs"), "push", vec![b.int(0)]),
        ),
    ]);
    assert_eq!(h.eval(&b.call("double", vec![b.int(21)])), Value::Int(42));

    let err = h.eval_err(&b.call("double", vec![b.str("a")]));
    assert_eq!(
        err.kind,
        EvalErrorKind::TypeMismatch {
            expected: "int".to_string(),
            got: "str".to_string()
        }
    );
    assert_eq!(err.notes[0].message, "in parameter `n` of `double`");

    let err = h.eval_err(&b.call("broken", vec![b.int(1)]));
    assert_eq!(err.code(), "TypeMismatchError");
    assert_eq!(err.notes[0].message, "in the return value of `broken`");

    h.eval(&b.let_mut("xs", h.ints(&[1])));
    h.eval(&b.call("grow", vec![b.ident("xs")]));
    assert_eq!(h.global("xs"), seq(&[1, 0]));
    h.eval(&b.let_mut("n", b.int(1)));
    assert_eq!(h.eval_err(&b.call("grow", vec![b.ident("n")])).code(), "TypeMismatchError");
    assert_eq!(h.global("n"), Value::Int(1));
}

#[test]
fn test_failed_load_registers_nothing() {
    let mut h = Harness::new();
    let b = h.b.clone();
    h.load(vec![b.struct_decl("Kept", vec![("x", false)])]);
    let broken = Program {
        items: vec![
            Item::Decl(b.fn_decl("helper", Vec::new(), b.int(1))),
            Item::Decl(counter_with_methods(&b)),
            Item::Decl(b.struct_decl("A", vec![("x", false)])),
            Item::Decl(b.struct_decl("A", vec![("y", false)])),
        ],
    };
    let err = h.interp.load_program(&broken).unwrap_err();
    assert_eq!(err.code(), "DuplicateTypeError");
    assert_eq!(h.interp.types().len(), 3);
    assert!(h.interp.types().lookup(b.name("Kept")).is_some());
    let err = h.eval_err(&b.call("helper", Vec::new()));
    assert_eq!(err.code(), "UndefinedFunctionError");

    h.load(vec![
        b.struct_decl("A", vec![("x", false)]),
        counter_with_methods(&b),
        b.fn_decl("helper", Vec::new(), b.int(1)),
    ]);
    assert_eq!(h.eval(&b.call("helper", Vec::new())), Value::Int(1));
    let counter = b.struct_lit("Counter", vec![("n", b.int(3))]);
    assert_eq!(h.eval(&b.method(counter, "get", Vec::new())), Value::Int(3));
}

#[test]
fn test_failed_call_keeps_writes_made_through_ref_mut() {
    let mut h = Harness::new();
    let b = h.b.clone();
    h.load(vec![b.fn_decl(
        "f",
        vec![b.param_ref_mut("xs")],
        b.block(vec![
            b.method(b.ident("xs"), "push", vec![b.int(1)]),
            b.binary(BinaryOp::Div, b.int(1), b.int(0)),
        ]),
    )]);
    h.eval(&b.let_mut("a", h.ints(&[])));
    let err = h.eval_err(&b.call("f", vec![b.ident("a")]));
    assert_eq!(err.code(), "DivisionByZeroError");
    assert_eq!(h.global("a"), seq(&[1]));

    // A single mutation that fails writes nothing.
    let err = h.eval_err(&b.method(b.ident("a"), "insert", vec![b.int(5), b.int(0)]));
    assert_eq!(err.code(), "IndexOutOfBoundsError");
    assert_eq!(h.global("a"), seq(&[1]));
}
