//! Evaluation configuration.

/// Where `print` output goes by default.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PrintMode {
    #[default]
    Stdout,
    /// Capture into a buffer readable through `Interpreter::output`.
    Buffer,
    Silent,
}

/// Limits and sinks for one interpreter.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EvalConfig {
    /// Deepest allowed chain of user function calls.
    pub max_call_depth: usize,
    pub print: PrintMode,
}

impl EvalConfig {
    pub const DEFAULT_MAX_CALL_DEPTH: usize = 1000;

    #[must_use]
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    #[must_use]
    pub fn with_print(mut self, print: PrintMode) -> Self {
        self.print = print;
        self
    }
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            max_call_depth: Self::DEFAULT_MAX_CALL_DEPTH,
            print: PrintMode::Stdout,
        }
    }
}
