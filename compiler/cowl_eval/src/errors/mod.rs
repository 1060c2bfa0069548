//! Evaluation errors.
//!
//! Every failing core operation produces exactly one [`EvalErrorKind`].
//! Factory functions (e.g. [`immutable_binding`]) are the public way to
//! build errors; they fill in both `kind` and `message`.
//!
//! User-level errors-as-values (`Err(..)`) are ordinary enum instances and
//! never pass through this module.

use std::fmt;

use cowl_ir::Span;

use crate::Value;

/// Result of evaluating an expression.
pub type EvalResult = Result<Value, EvalError>;

/// Typed error category.
///
/// The first nine variants are the core taxonomy of the ownership, data
/// and matching engines; the rest are ordinary evaluation failures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Ownership
    ImmutableBinding {
        name: String,
    },
    DanglingReference {
        name: String,
    },

    // Algebraic data
    DuplicateType {
        name: String,
    },
    ShapeMismatch {
        detail: String,
    },
    UnknownVariant {
        ty: String,
        variant: String,
    },
    PayloadArity {
        variant: String,
        expected: usize,
        got: usize,
    },

    // Scoping
    Redefinition {
        name: String,
    },

    // Matching
    NonExhaustiveMatch {
        value: String,
    },

    // Type/Operator
    TypeMismatch {
        expected: String,
        got: String,
    },

    // Access
    UndefinedVariable {
        name: String,
    },
    UndefinedFunction {
        name: String,
    },
    UndefinedType {
        name: String,
    },
    IndexOutOfBounds {
        index: i64,
        len: usize,
    },

    // Arithmetic
    DivisionByZero,
    IntegerOverflow {
        operation: String,
    },

    // Function
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    RecursionLimit {
        depth: usize,
    },
}

impl EvalErrorKind {
    /// Stable identifier surfaced to the host.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ImmutableBinding { .. } => "ImmutableBindingError",
            Self::DanglingReference { .. } => "DanglingReferenceError",
            Self::DuplicateType { .. } => "DuplicateTypeError",
            Self::ShapeMismatch { .. } => "ShapeMismatchError",
            Self::UnknownVariant { .. } => "UnknownVariantError",
            Self::PayloadArity { .. } => "PayloadArityError",
            Self::Redefinition { .. } => "RedefinitionError",
            Self::NonExhaustiveMatch { .. } => "NonExhaustiveMatchError",
            Self::TypeMismatch { .. } => "TypeMismatchError",
            Self::UndefinedVariable { .. } => "UndefinedVariableError",
            Self::UndefinedFunction { .. } => "UndefinedFunctionError",
            Self::UndefinedType { .. } => "UndefinedTypeError",
            Self::IndexOutOfBounds { .. } => "IndexOutOfBoundsError",
            Self::DivisionByZero => "DivisionByZeroError",
            Self::IntegerOverflow { .. } => "IntegerOverflowError",
            Self::ArityMismatch { .. } => "ArityMismatchError",
            Self::RecursionLimit { .. } => "RecursionLimitError",
        }
    }
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImmutableBinding { name } => {
                write!(f, "cannot mutate immutable binding `{name}`")
            }
            Self::DanglingReference { name } => {
                write!(f, "reference to `{name}` outlived the scope of its target")
            }
            Self::DuplicateType { name } => write!(f, "type `{name}` is already defined"),
            Self::ShapeMismatch { detail } => write!(f, "shape mismatch: {detail}"),
            Self::UnknownVariant { ty, variant } => {
                if ty.is_empty() {
                    write!(f, "unknown variant `{variant}`")
                } else {
                    write!(f, "type `{ty}` has no variant `{variant}`")
                }
            }
            Self::PayloadArity {
                variant,
                expected,
                got,
            } => {
                let word = if *expected == 1 { "field" } else { "fields" };
                write!(f, "variant `{variant}` takes {expected} payload {word}, got {got}")
            }
            Self::Redefinition { name } => {
                write!(f, "`{name}` is already defined in this scope")
            }
            Self::NonExhaustiveMatch { value } => {
                write!(f, "no match arm matches value `{value}`")
            }
            Self::TypeMismatch { expected, got } => {
                write!(f, "type mismatch: expected {expected}, got {got}")
            }
            Self::UndefinedVariable { name } => write!(f, "undefined variable `{name}`"),
            Self::UndefinedFunction { name } => write!(f, "undefined function `{name}`"),
            Self::UndefinedType { name } => write!(f, "undefined type `{name}`"),
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for sequence of length {len}")
            }
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::IntegerOverflow { operation } => {
                write!(f, "integer overflow in {operation}")
            }
            Self::ArityMismatch {
                name,
                expected,
                got,
            } => {
                let word = if *expected == 1 {
                    "argument"
                } else {
                    "arguments"
                };
                write!(f, "`{name}` expects {expected} {word}, got {got}")
            }
            Self::RecursionLimit { depth } => {
                write!(f, "maximum call depth exceeded (limit: {depth})")
            }
        }
    }
}

/// Additional context attached to an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalNote {
    pub message: String,
    pub span: Option<Span>,
}

impl EvalNote {
    /// Create a note with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span: None,
        }
    }

    /// Create a note pointing at a source location.
    pub fn with_span(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span: Some(span),
        }
    }
}

/// Evaluation error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalError {
    /// Structured error category.
    pub kind: EvalErrorKind,
    /// Human-readable message; equals `kind.to_string()`.
    pub message: String,
    /// Innermost expression the error was raised under.
    pub span: Option<Span>,
    /// Secondary information for the host to render.
    pub notes: Vec<EvalNote>,
}

impl EvalError {
    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            message,
            span: None,
            notes: Vec::new(),
        }
    }

    /// Attach a span unless one is already present or `span` is a dummy.
    #[must_use]
    pub fn with_span_if_missing(mut self, span: Span) -> Self {
        if self.span.is_none() && !span.is_dummy() {
            self.span = Some(span);
        }
        self
    }

    /// Add a context note.
    #[must_use]
    pub fn with_note(mut self, note: EvalNote) -> Self {
        self.notes.push(note);
        self
    }

    /// Stable kind identifier, e.g. `"ImmutableBindingError"`.
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.code(), self.message)
    }
}

impl std::error::Error for EvalError {}

// Ownership

#[cold]
pub fn immutable_binding(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ImmutableBinding {
        name: name.to_string(),
    })
}

#[cold]
pub fn dangling_reference(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DanglingReference {
        name: name.to_string(),
    })
}

// Algebraic data

#[cold]
pub fn duplicate_type(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DuplicateType {
        name: name.to_string(),
    })
}

#[cold]
pub fn shape_mismatch(detail: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ShapeMismatch {
        detail: detail.into(),
    })
}

#[cold]
pub fn unknown_variant(ty: &str, variant: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownVariant {
        ty: ty.to_string(),
        variant: variant.to_string(),
    })
}

#[cold]
pub fn payload_arity(variant: &str, expected: usize, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::PayloadArity {
        variant: variant.to_string(),
        expected,
        got,
    })
}

// Scoping

#[cold]
pub fn redefinition(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Redefinition {
        name: name.to_string(),
    })
}

// Matching

#[cold]
pub fn non_exhaustive_match(value: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NonExhaustiveMatch {
        value: value.to_string(),
    })
    .with_note(EvalNote::new("add a wildcard arm `_` to handle remaining cases"))
}

// Type/Operator

#[cold]
pub fn type_mismatch(expected: &str, got: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeMismatch {
        expected: expected.to_string(),
        got: got.to_string(),
    })
}

// Access

#[cold]
pub fn undefined_variable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedVariable {
        name: name.to_string(),
    })
}

#[cold]
pub fn undefined_function(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedFunction {
        name: name.to_string(),
    })
}

#[cold]
pub fn undefined_type(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedType {
        name: name.to_string(),
    })
}

#[cold]
pub fn index_out_of_bounds(index: i64, len: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IndexOutOfBounds { index, len })
}

// Arithmetic

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DivisionByZero)
}

#[cold]
pub fn integer_overflow(operation: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IntegerOverflow {
        operation: operation.to_string(),
    })
}

// Function

#[cold]
pub fn arity_mismatch(name: &str, expected: usize, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArityMismatch {
        name: name.to_string(),
        expected,
        got,
    })
}

#[cold]
pub fn recursion_limit(depth: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::RecursionLimit { depth })
}

#[cfg(test)]
mod tests;
