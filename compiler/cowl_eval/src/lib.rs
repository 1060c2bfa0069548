//! Cowl Eval - the copy-on-write evaluation core.
//!
//! Takes a [`cowl_ir::Program`] and evaluates it. Compound values are shared
//! between bindings until one of them mutates; at that point the ownership
//! engine copies, so every binding observes value semantics unless it was
//! explicitly passed by `ref`.
//!
//! # Architecture
//!
//! Leaves first:
//! - [`Value`] and [`SharedCell`]: runtime values and owner-counted storage
//! - [`ownership`]: binding, argument passing and the single copy point
//! - [`types`]: the closed table of struct and enum shapes
//! - [`matcher`]: pattern matching against those shapes
//! - [`environment`]: lexical scopes and call frames
//! - [`Interpreter`]: the expression evaluator tying them together

pub mod config;
pub mod environment;
pub mod errors;
pub mod interpreter;
pub mod matcher;
mod operators;
pub mod ownership;
mod print_handler;
mod stack;
pub mod types;
mod value;

pub use config::{EvalConfig, PrintMode};
pub use environment::{Environment, Mutability};
pub use errors::{EvalError, EvalErrorKind, EvalNote, EvalResult};
pub use interpreter::{Interpreter, InterpreterBuilder, ScopedInterpreter};
pub use matcher::{Bindings, Matcher};
pub use print_handler::{
    buffer_handler, silent_handler, stdout_handler, BufferPrintHandler, PrintHandlerImpl,
    SharedPrintHandler, StdoutPrintHandler,
};
pub use types::{TypeDescriptor, TypeRegistry};
pub use value::{
    Printer, Reference, SharedCell, StructValue, TypeId, Value, VariantTag, VariantValue,
};
