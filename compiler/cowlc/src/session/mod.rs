//! Program sessions.

use cowl_eval::{
    EvalConfig, EvalError, Interpreter, InterpreterBuilder, PrintMode, SharedPrintHandler, Value,
};
use cowl_ir::{AstBuilder, Program, SharedInterner};

/// Host-level settings, usually read from the environment.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionConfig {
    pub eval: EvalConfig,
}

impl SessionConfig {
    /// Read `COWL_MAX_DEPTH` from the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    ///
    /// Unparsable values are reported and ignored.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut eval = EvalConfig::default();
        if let Some(raw) = lookup("COWL_MAX_DEPTH") {
            match raw.trim().parse::<usize>() {
                Ok(depth) if depth > 0 => eval = eval.with_max_call_depth(depth),
                _ => tracing::warn!(value = %raw, "ignoring invalid COWL_MAX_DEPTH"),
            }
        }
        SessionConfig { eval }
    }

    #[must_use]
    pub fn with_print(mut self, print: PrintMode) -> Self {
        self.eval = self.eval.with_print(print);
        self
    }
}

/// One interpreter plus the interner its programs are built against.
///
/// Declarations and globals persist across [`run`](Session::run) calls.
pub struct Session {
    interner: SharedInterner,
    interpreter: Interpreter,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let interner = SharedInterner::new();
        let interpreter = InterpreterBuilder::new(&interner)
            .config(config.eval)
            .build();
        Session {
            interner,
            interpreter,
        }
    }

    /// Create a session printing to `handler` regardless of the configured mode.
    pub fn with_print_handler(config: SessionConfig, handler: SharedPrintHandler) -> Self {
        let interner = SharedInterner::new();
        let interpreter = InterpreterBuilder::new(&interner)
            .config(config.eval)
            .print_handler(handler)
            .build();
        Session {
            interner,
            interpreter,
        }
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    /// A builder producing trees whose names this session understands.
    pub fn ast_builder(&self) -> AstBuilder {
        AstBuilder::new(&self.interner)
    }

    /// Load every declaration of `program`, then evaluate its top-level
    /// expressions in order.
    #[tracing::instrument(level = "debug", skip_all, fields(items = program.items.len()))]
    pub fn run(&mut self, program: &Program) -> Result<Vec<Value>, EvalError> {
        let result = self.interpreter.run_program(program);
        if let Err(err) = &result {
            tracing::debug!(code = err.code(), "program failed");
        }
        result
    }

    /// Captured output when printing to a buffer.
    pub fn output(&self) -> String {
        self.interpreter.output()
    }

    /// Canonical text of a value.
    pub fn display(&self, value: &Value) -> String {
        self.interpreter.display(value)
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }
}
