//! `InterpreterBuilder` for creating configured interpreters.

use cowl_ir::SharedInterner;
use rustc_hash::FxHashMap;

use super::interned_names::BuiltinNames;
use super::Interpreter;
use crate::config::{EvalConfig, PrintMode};
use crate::environment::Environment;
use crate::print_handler::{buffer_handler, silent_handler, stdout_handler, SharedPrintHandler};
use crate::types::TypeRegistry;

/// Builder for [`Interpreter`].
///
/// The print sink defaults to the one named by the config's
/// [`PrintMode`]; an explicit handler overrides it, which lets a host keep a
/// handle to a buffer it reads after the run.
pub struct InterpreterBuilder {
    interner: SharedInterner,
    config: EvalConfig,
    print_handler: Option<SharedPrintHandler>,
}

impl InterpreterBuilder {
    pub fn new(interner: &SharedInterner) -> Self {
        InterpreterBuilder {
            interner: interner.clone(),
            config: EvalConfig::default(),
            print_handler: None,
        }
    }

    #[must_use]
    pub fn config(mut self, config: EvalConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn max_call_depth(mut self, depth: usize) -> Self {
        self.config.max_call_depth = depth;
        self
    }

    #[must_use]
    pub fn print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.print_handler = Some(handler);
        self
    }

    pub fn build(self) -> Interpreter {
        let print_handler = self.print_handler.unwrap_or_else(|| match self.config.print {
            PrintMode::Stdout => stdout_handler(),
            PrintMode::Buffer => buffer_handler(),
            PrintMode::Silent => silent_handler(),
        });
        Interpreter {
            env: Environment::new(&self.interner),
            types: TypeRegistry::new(&self.interner),
            functions: FxHashMap::default(),
            methods: FxHashMap::default(),
            print_handler,
            config: self.config,
            builtins: BuiltinNames::new(&self.interner),
            interner: self.interner,
        }
    }
}
