//! Bundled demo programs.
//!
//! There is no parser in this workspace; each demo carries its surface
//! text for display and diagnostics, and builds the matching tree with
//! an [`AstBuilder`].

use cowl_ir::{AstBuilder, BinaryOp, Expr, Item, Program, TypeAnnot};

/// A named program the `cowl` binary can run.
pub struct Demo {
    pub name: &'static str,
    pub summary: &'static str,
    /// Surface text of the program; spans in the built tree index into it.
    pub source: &'static str,
    build: fn(&AstBuilder, &'static str) -> Program,
}

impl Demo {
    pub fn program(&self, b: &AstBuilder) -> Program {
        (self.build)(b, self.source)
    }
}

/// Every bundled demo, in display order.
pub fn all() -> &'static [Demo] {
    DEMOS
}

pub fn find(name: &str) -> Option<&'static Demo> {
    DEMOS.iter().find(|demo| demo.name == name)
}

static DEMOS: &[Demo] = &[
    Demo {
        name: "value-copy",
        summary: "copies of a sequence diverge only when one of them mutates",
        source: "\
let a = [10, 20, 30]
let b = a
let mut c = a
c.push(40)
print(b)
print(c)
",
        build: value_copy,
    },
    Demo {
        name: "match-result",
        summary: "matching on a built-in Result",
        source: "\
let r = Ok(5)
print(match r { Ok(v) => v + 1, Err(_) => -1 })
",
        build: match_result,
    },
    Demo {
        name: "ref-params",
        summary: "`ref mut` parameters mutate the caller, by-value ones never do",
        source: "\
def append(ref mut xs) { xs.push(4) }
def appended(mut xs) { xs.push(4); xs }
let mut s = [1, 2, 3]
append(s)
print(s)
let t = appended(s)
print(s)
print(t)
",
        build: ref_params,
    },
    Demo {
        name: "shapes",
        summary: "user enums, structs and guarded match arms",
        source: "\
enum Shape { Square(int), Rect(int, int) }
struct Tally { name, mut total }
def area(s) {
  match s { Square(n) => n * n, Rect(w, h) if w == h => w * w, Rect(w, h) => w * h }
}
let mut t = Tally { name: \"areas\", total: 0 }
t.total = area(Square(3)) + area(Rect(2, 5))
print(t)
",
        build: shapes,
    },
    Demo {
        name: "methods",
        summary: "struct methods with a `ref mut` receiver and compound assignment",
        source: "\
struct Account {
  owner, mut balance
  def deposit(ref mut self, amount: int) -> unit { self.balance += amount }
  def balance(self) -> int { self.balance }
}
let mut acct = Account { owner: \"ada\", balance: 10 }
let before = acct
acct.deposit(5)
acct.deposit(20)
print(acct.balance())
print(before.balance())
",
        build: methods,
    },
    Demo {
        name: "immutable",
        summary: "mutating a binding declared without `mut` is an error",
        source: "\
let xs = [1, 2]
xs.push(3)
",
        build: immutable,
    },
];

/// Attach the span of the first occurrence of `needle` in `source`.
fn located(b: &AstBuilder, source: &str, needle: &str, expr: Expr) -> Expr {
    let Some(start) = source.find(needle) else {
        return expr;
    };
    match (u32::try_from(start), u32::try_from(start + needle.len())) {
        (Ok(start), Ok(end)) => b.at(expr, start, end),
        _ => expr,
    }
}

fn program(items: Vec<Item>) -> Program {
    Program { items }
}

fn print(b: &AstBuilder, name: &str) -> Item {
    Item::Expr(b.call("print", vec![b.ident(name)]))
}

fn ints(b: &AstBuilder, values: &[i64]) -> Expr {
    b.seq(values.iter().map(|&n| b.int(n)).collect())
}

fn value_copy(b: &AstBuilder, _: &'static str) -> Program {
    program(vec![
        Item::Expr(b.let_("a", ints(b, &[10, 20, 30]))),
        Item::Expr(b.let_("b", b.ident("a"))),
        Item::Expr(b.let_mut("c", b.ident("a"))),
        Item::Expr(b.method(b.ident("c"), "push", vec![b.int(40)])),
        print(b, "b"),
        print(b, "c"),
    ])
}

fn match_result(b: &AstBuilder, _: &'static str) -> Program {
    let matched = b.match_(
        b.ident("r"),
        vec![
            b.arm(
                b.p_variant("Ok", vec![b.p_bind("v")]),
                b.add(b.ident("v"), b.int(1)),
            ),
            b.arm(b.p_variant("Err", vec![b.p_wild()]), b.int(-1)),
        ],
    );
    program(vec![
        Item::Expr(b.let_("r", b.variant("Ok", vec![b.int(5)]))),
        Item::Expr(b.call("print", vec![matched])),
    ])
}

fn ref_params(b: &AstBuilder, _: &'static str) -> Program {
    let append = b.fn_decl(
        "append",
        vec![b.param_ref_mut("xs")],
        b.block(vec![b.method(b.ident("xs"), "push", vec![b.int(4)])]),
    );
    let appended = b.fn_decl(
        "appended",
        vec![b.param_mut("xs")],
        b.block(vec![
            b.method(b.ident("xs"), "push", vec![b.int(4)]),
            b.ident("xs"),
        ]),
    );
    program(vec![
        Item::Decl(append),
        Item::Decl(appended),
        Item::Expr(b.let_mut("s", ints(b, &[1, 2, 3]))),
        Item::Expr(b.call("append", vec![b.ident("s")])),
        print(b, "s"),
        Item::Expr(b.let_("t", b.call("appended", vec![b.ident("s")]))),
        print(b, "s"),
        print(b, "t"),
    ])
}

fn shapes(b: &AstBuilder, _: &'static str) -> Program {
    let shape = b.enum_decl(
        "Shape",
        vec![
            ("Square", vec![TypeAnnot::Int]),
            ("Rect", vec![TypeAnnot::Int, TypeAnnot::Int]),
        ],
    );
    let tally = b.struct_decl("Tally", vec![("name", false), ("total", true)]);
    let mul = |l: &str, r: &str| b.binary(BinaryOp::Mul, b.ident(l), b.ident(r));
    let area = b.fn_decl(
        "area",
        vec![b.param("s")],
        b.match_(
            b.ident("s"),
            vec![
                b.arm(b.p_variant("Square", vec![b.p_bind("n")]), mul("n", "n")),
                b.guarded_arm(
                    b.p_variant("Rect", vec![b.p_bind("w"), b.p_bind("h")]),
                    b.eq(b.ident("w"), b.ident("h")),
                    mul("w", "w"),
                ),
                b.arm(
                    b.p_variant("Rect", vec![b.p_bind("w"), b.p_bind("h")]),
                    mul("w", "h"),
                ),
            ],
        ),
    );
    let total = b.add(
        b.call("area", vec![b.variant("Square", vec![b.int(3)])]),
        b.call("area", vec![b.variant("Rect", vec![b.int(2), b.int(5)])]),
    );
    program(vec![
        Item::Decl(shape),
        Item::Decl(tally),
        Item::Decl(area),
        Item::Expr(b.let_mut(
            "t",
            b.struct_lit("Tally", vec![("name", b.str("areas")), ("total", b.int(0))]),
        )),
        Item::Expr(b.assign(b.field(b.ident("t"), "total"), total)),
        print(b, "t"),
    ])
}

fn methods(b: &AstBuilder, _: &'static str) -> Program {
    let deposit = b
        .method_decl(
            "deposit",
            vec![b.param_ref_mut("self"), b.param("amount").typed(TypeAnnot::Int)],
            b.compound_assign(
                b.field(b.ident("self"), "balance"),
                BinaryOp::Add,
                b.ident("amount"),
            ),
        )
        .returning(TypeAnnot::Unit);
    let balance = b
        .method_decl("balance", vec![b.param("self")], b.field(b.ident("self"), "balance"))
        .returning(TypeAnnot::Int);
    let account = b.struct_with_methods(
        "Account",
        vec![("owner", false), ("balance", true)],
        vec![deposit, balance],
    );
    let report = |name: &str| {
        Item::Expr(b.call("print", vec![b.method(b.ident(name), "balance", Vec::new())]))
    };
    program(vec![
        Item::Decl(account),
        Item::Expr(b.let_mut(
            "acct",
            b.struct_lit("Account", vec![("owner", b.str("ada")), ("balance", b.int(10))]),
        )),
        Item::Expr(b.let_("before", b.ident("acct"))),
        Item::Expr(b.method(b.ident("acct"), "deposit", vec![b.int(5)])),
        Item::Expr(b.method(b.ident("acct"), "deposit", vec![b.int(20)])),
        report("acct"),
        report("before"),
    ])
}

fn immutable(b: &AstBuilder, source: &'static str) -> Program {
    let push = b.method(b.ident("xs"), "push", vec![b.int(3)]);
    program(vec![
        Item::Expr(located(b, source, "let xs = [1, 2]", b.let_("xs", ints(b, &[1, 2])))),
        Item::Expr(located(b, source, "xs.push(3)", push)),
    ])
}
