//! Tree-walking evaluator.
//!
//! Every construct is an expression: `eval` maps an [`Expr`] to a [`Value`].
//! Blocks, `if` branches, `match` arms and function bodies each get their
//! own scope, pushed and popped through the RAII guards in `scope_guard`, so
//! the environment is restored on failure exactly as on success.
//!
//! Value flow goes through [`crate::ownership`]:
//!
//! - `control` - blocks, `if`, `match`
//! - `function_call` - user calls and struct methods, argument passing,
//!   annotations, recursion limit
//! - `place` - assignment, compound assignment and in-place mutation
//! - `methods` - method dispatch, builtin functions and sequence methods

mod builder;
mod control;
mod function_call;
mod interned_names;
mod methods;
mod place;
mod scope_guard;

pub use builder::InterpreterBuilder;
pub use scope_guard::ScopedInterpreter;

use std::rc::Rc;

use cowl_ir::{BinaryOp, Decl, Expr, ExprKind, FnDecl, Name, Program, SharedInterner, StructDecl};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::config::EvalConfig;
use crate::environment::{Environment, Mutability};
use crate::errors::{redefinition, shape_mismatch, type_mismatch, EvalError, EvalResult};
use crate::operators::{evaluate_binary, evaluate_unary};
use crate::ownership::{bind_by_value, read};
use crate::print_handler::SharedPrintHandler;
use crate::stack::ensure_sufficient_stack;
use crate::types::TypeRegistry;
use crate::{Printer, TypeId, Value};
use interned_names::BuiltinNames;

/// The evaluator and the state it evaluates against.
pub struct Interpreter {
    pub(crate) interner: SharedInterner,
    pub(crate) env: Environment,
    pub(crate) types: TypeRegistry,
    functions: FxHashMap<Name, Rc<FnDecl>>,
    /// Struct methods by method name, one entry per declaring struct.
    methods: FxHashMap<Name, SmallVec<[(TypeId, Rc<FnDecl>); 1]>>,
    print_handler: SharedPrintHandler,
    config: EvalConfig,
    builtins: BuiltinNames,
}

impl Interpreter {
    /// An interpreter with default configuration printing to stdout.
    pub fn new(interner: &SharedInterner) -> Self {
        InterpreterBuilder::new(interner).build()
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn print_handler(&self) -> &SharedPrintHandler {
        &self.print_handler
    }

    /// Output captured by a buffer print handler.
    pub fn output(&self) -> String {
        self.print_handler.output()
    }

    /// Canonical string rendering bound to this interpreter's types.
    pub fn printer(&self) -> Printer<'_> {
        Printer::new(&self.types, &self.interner)
    }

    /// Canonical form of `value`, as `print` shows it.
    pub fn display(&self, value: &Value) -> String {
        self.printer().render(value)
    }

    /// Read a global binding by name.
    pub fn global(&self, name: &str) -> EvalResult {
        read(&self.env, self.interner.intern(name))
    }

    /// Register every declaration of `program`, in order.
    ///
    /// Types are registered with the type registry; functions and struct
    /// methods are recorded by name. A second function with the same name,
    /// or a second method with the same name on one struct, fails with
    /// `RedefinitionError`.
    ///
    /// Loading is all or nothing: on failure every declaration this call
    /// registered is removed again, so a corrected program can be loaded
    /// into the same interpreter.
    pub fn load_program(&mut self, program: &Program) -> Result<(), EvalError> {
        let types_before = self.types.len();
        let mut loaded = Vec::new();
        for decl in program.decls() {
            if let Err(e) = self.load_decl(decl, &mut loaded) {
                self.unload(types_before, &loaded);
                return Err(e.with_span_if_missing(decl.span()));
            }
        }
        Ok(())
    }

    fn load_decl(&mut self, decl: &Decl, loaded: &mut Vec<Name>) -> Result<(), EvalError> {
        match decl {
            Decl::Struct(s) => self.load_struct(s),
            Decl::Enum(e) => self.types.register_enum(e).map(|_| ()),
            Decl::Fn(f) => {
                if self.functions.contains_key(&f.name) {
                    return Err(redefinition(self.interner.lookup(f.name)));
                }
                tracing::debug!(function = self.interner.lookup(f.name), "registered function");
                self.functions.insert(f.name, Rc::new(f.clone()));
                loaded.push(f.name);
                Ok(())
            }
        }
    }

    fn load_struct(&mut self, decl: &StructDecl) -> Result<(), EvalError> {
        let id = self.types.register_struct(decl)?;
        let type_name = self.interner.lookup(decl.name);
        for method in &decl.methods {
            let method_name = self.interner.lookup(method.name);
            if method.params.is_empty() {
                return Err(shape_mismatch(format!(
                    "method `{type_name}.{method_name}` must take the receiver as its first parameter"
                ))
                .with_span_if_missing(method.span));
            }
            let entries = self.methods.entry(method.name).or_default();
            if entries.iter().any(|(owner, _)| *owner == id) {
                return Err(redefinition(&format!("{type_name}.{method_name}"))
                    .with_span_if_missing(method.span));
            }
            entries.push((id, Rc::new(method.clone())));
            tracing::debug!(ty = type_name, method = method_name, "registered method");
        }
        Ok(())
    }

    /// Undo a failed [`Interpreter::load_program`].
    fn unload(&mut self, types_before: usize, functions: &[Name]) {
        tracing::debug!(
            types = self.types.len() - types_before,
            functions = functions.len(),
            "rolling back failed program load"
        );
        self.types.truncate(types_before);
        self.methods.retain(|_, entries| {
            entries.retain(|(owner, _)| owner.index() < types_before);
            !entries.is_empty()
        });
        for name in functions {
            self.functions.remove(name);
        }
    }

    /// Load `program`, then evaluate its top-level expressions in order.
    ///
    /// Top-level `let`s bind in the global scope, so later expressions and
    /// function bodies see them. Stops at the first error.
    pub fn run_program(&mut self, program: &Program) -> Result<Vec<Value>, EvalError> {
        self.load_program(program)?;
        program.exprs().map(|expr| self.eval(expr)).collect()
    }

    /// Evaluate an expression.
    ///
    /// Errors without a location get this expression's span.
    pub fn eval(&mut self, expr: &Expr) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_inner(expr))
            .map_err(|e| e.with_span_if_missing(expr.span))
    }

    fn eval_inner(&mut self, expr: &Expr) -> EvalResult {
        match &expr.kind {
            ExprKind::Unit => Ok(Value::Unit),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Int(n) => Ok(Value::Int(*n)),
            ExprKind::Float(x) => Ok(Value::Float(*x)),
            ExprKind::Str(name) => Ok(Value::string(self.interner.lookup(*name))),
            ExprKind::Ident(name) => read(&self.env, *name),

            ExprKind::Seq(items) => {
                let items = self.eval_all(items)?;
                Ok(Value::seq(items))
            }
            ExprKind::StructLit { ty, fields } => {
                let id = self.types.resolve_type(*ty)?;
                let mut values = Vec::with_capacity(fields.len());
                for (name, field) in fields {
                    values.push((*name, self.eval(field)?));
                }
                self.types.construct_struct(id, values)
            }
            ExprKind::Variant { ty, variant, args } => {
                let (id, tag) = self.types.resolve_variant(*ty, *variant)?;
                let payload = self.eval_all(args)?;
                self.types.construct_tagged(id, tag, payload)
            }

            ExprKind::Field { receiver, field } => {
                let value = self.eval(receiver)?;
                self.read_field(&value, *field)
            }
            ExprKind::Index { receiver, index } => {
                let value = self.eval(receiver)?;
                let index = self.eval(index)?;
                self.read_index(&value, &index)
            }

            ExprKind::Binary { op, left, right } => self.eval_binary(*op, left, right),
            ExprKind::Unary { op, operand } => {
                let value = self.eval(operand)?;
                evaluate_unary(&value, *op)
            }

            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => self.eval_if(cond, then_branch, else_branch.as_deref()),
            ExprKind::Match { scrutinee, arms } => self.eval_match(scrutinee, arms),
            ExprKind::Block(exprs) => self.eval_block(exprs),

            ExprKind::Let {
                name,
                mutable,
                value,
            } => {
                let value = self.eval(value)?;
                bind_by_value(&mut self.env, *name, &value, Mutability::from_flag(*mutable))?;
                Ok(Value::Unit)
            }
            ExprKind::Assign { target, value } => self.eval_assign(target, value),
            ExprKind::CompoundAssign { target, op, value } => {
                self.eval_compound_assign(target, *op, value)
            }

            ExprKind::Call { func, args } => self.eval_call(*func, args),
            ExprKind::MethodCall {
                receiver,
                method,
                args,
            } => self.eval_method_call(receiver, *method, args),
        }
    }

    pub(crate) fn eval_all(&mut self, exprs: &[Expr]) -> Result<Vec<Value>, EvalError> {
        exprs.iter().map(|e| self.eval(e)).collect()
    }

    fn eval_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> EvalResult {
        let lhs = self.eval(left)?;
        if matches!(op, BinaryOp::And | BinaryOp::Or) {
            let Value::Bool(short) = lhs else {
                return Err(type_mismatch("bool", &self.types.describe(&lhs)));
            };
            // `false && _` and `true || _` skip the right operand.
            if short == (op == BinaryOp::Or) {
                return Ok(Value::Bool(short));
            }
            let rhs = self.eval(right)?;
            return match rhs {
                Value::Bool(b) => Ok(Value::Bool(b)),
                other => Err(type_mismatch("bool", &self.types.describe(&other))),
            };
        }
        let rhs = self.eval(right)?;
        evaluate_binary(&lhs, &rhs, op)
    }

    pub(super) fn read_field(&self, value: &Value, field: Name) -> EvalResult {
        let Value::Struct(s) = value else {
            return Err(type_mismatch(
                &format!("a struct with field `{}`", self.interner.lookup(field)),
                &self.types.describe(value),
            ));
        };
        let descriptor = self.types.get(s.type_id);
        match descriptor.field(field) {
            Some((index, _)) => Ok(s.fields[index].clone_handle()),
            None => Err(shape_mismatch(format!(
                "struct `{}` has no field `{}`",
                self.interner.lookup(descriptor.name),
                self.interner.lookup(field)
            ))),
        }
    }

    pub(super) fn read_index(&self, value: &Value, index: &Value) -> EvalResult {
        let Value::Seq(items) = value else {
            return Err(type_mismatch("seq", &self.types.describe(value)));
        };
        let Value::Int(i) = index else {
            return Err(type_mismatch("int", &self.types.describe(index)));
        };
        let i = place::checked_index(*i, items.len())?;
        Ok(items[i].clone_handle())
    }
}

impl std::fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreter")
            .field("env", &self.env)
            .field("types", &self.types.len())
            .field("functions", &self.functions.len())
            .field("methods", &self.methods.len())
            .field("call_depth", &self.env.frame_depth())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
