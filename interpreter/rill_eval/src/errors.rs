//! Error types for evaluation.
//!
//! `EvalErrorKind` provides typed error categories; factory functions are
//! the public API and populate both `kind` and `message`. The kind name
//! (`UnboundSymbolError`, ...) is what the REPL prefixes messages with.

use std::fmt;

use crate::value::Value;

/// Result of evaluation.
pub type EvalResult = Result<Value, EvalError>;

/// An evaluation failure.
#[derive(Clone, Debug, PartialEq)]
pub struct EvalError {
    /// Typed category.
    pub kind: EvalErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Typed error category.
///
/// Every variant corresponds to one entry of the language's error taxonomy;
/// `Custom` covers host-procedure failures that don't fit a category.
#[derive(Clone, Debug, PartialEq)]
pub enum EvalErrorKind {
    /// Lookup or `set!` on a symbol absent through the whole chain.
    UnboundSymbol { name: String },
    /// Head of a call form did not evaluate to a procedure.
    NotCallable { type_name: String },
    /// No `match` clause matched the scrutinee.
    MatchExhausted,
    /// Typed-wrapper validation failure.
    TypeConstraint {
        param: String,
        expected: String,
        actual: String,
    },
    /// Conditional-definition call with an unrecognized qualifier.
    UnknownVariant { base: String, qualifier: String },
    /// Argument count or destructuring mismatch against a parameter list.
    Arity { detail: String },
    /// Malformed special form encountered at evaluation time.
    Syntax { detail: String },
    /// A builtin was handed a value of the wrong type.
    TypeMismatch { expected: String, got: String },
    /// Division or modulo by zero.
    DivisionByZero,
    /// Uncategorized failure from a host procedure.
    Custom,
}

impl EvalErrorKind {
    /// The taxonomy name for this kind, as shown by the REPL.
    pub fn name(&self) -> &'static str {
        match self {
            Self::UnboundSymbol { .. } => "UnboundSymbolError",
            Self::NotCallable { .. } => "NotCallableError",
            Self::MatchExhausted => "MatchExhaustedError",
            Self::TypeConstraint { .. } => "TypeConstraintError",
            Self::UnknownVariant { .. } => "UnknownVariantError",
            Self::Arity { .. } => "ArityError",
            Self::Syntax { .. } => "SyntaxError",
            Self::TypeMismatch { .. } => "TypeError",
            Self::DivisionByZero => "DivisionByZeroError",
            Self::Custom => "Error",
        }
    }
}

impl EvalError {
    /// An uncategorized error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        EvalError {
            kind: EvalErrorKind::Custom,
            message: message.into(),
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EvalError {}

// Factory functions

/// Lookup failed through the whole environment chain.
pub fn unbound_symbol(name: &str) -> EvalError {
    EvalError {
        kind: EvalErrorKind::UnboundSymbol {
            name: name.to_string(),
        },
        message: format!("symbol {name} is not defined"),
    }
}

/// Call-form head evaluated to something that is not a procedure.
pub fn not_callable(type_name: &str) -> EvalError {
    EvalError {
        kind: EvalErrorKind::NotCallable {
            type_name: type_name.to_string(),
        },
        message: format!("value of type {type_name} is not callable"),
    }
}

/// No `match` clause matched.
pub fn match_exhausted() -> EvalError {
    EvalError {
        kind: EvalErrorKind::MatchExhausted,
        message: "no pattern clause matched the value".to_string(),
    }
}

/// A typed parameter received a value outside its declared type.
pub fn type_constraint(param: &str, expected: &str, actual: &str) -> EvalError {
    EvalError {
        kind: EvalErrorKind::TypeConstraint {
            param: param.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        },
        message: format!("parameter {param} expects {expected}, got {actual}"),
    }
}

/// A conditional definition was called with an unknown qualifier.
pub fn unknown_variant(base: &str, qualifier: &str) -> EvalError {
    EvalError {
        kind: EvalErrorKind::UnknownVariant {
            base: base.to_string(),
            qualifier: qualifier.to_string(),
        },
        message: format!("{base} has no variant /{qualifier}"),
    }
}

/// A conditional definition was called without a qualifier at all.
pub fn unqualified_conditional(base: &str) -> EvalError {
    EvalError {
        kind: EvalErrorKind::UnknownVariant {
            base: base.to_string(),
            qualifier: String::new(),
        },
        message: format!("{base} must be called through a variant qualifier such as {base}/name"),
    }
}

/// Wrong number of arguments for a parameter list.
pub fn arity_mismatch(expected: usize, got: usize) -> EvalError {
    let arg_word = if expected == 1 { "argument" } else { "arguments" };
    EvalError {
        kind: EvalErrorKind::Arity {
            detail: format!("expected {expected} {arg_word}, got {got}"),
        },
        message: format!("expected {expected} {arg_word}, got {got}"),
    }
}

/// Too few arguments for a variadic procedure.
pub fn arity_at_least(min: usize, got: usize) -> EvalError {
    let arg_word = if min == 1 { "argument" } else { "arguments" };
    EvalError {
        kind: EvalErrorKind::Arity {
            detail: format!("expected at least {min} {arg_word}, got {got}"),
        },
        message: format!("expected at least {min} {arg_word}, got {got}"),
    }
}

/// A value did not fit a destructuring pattern in a binding position.
pub fn destructure_mismatch(what: &str) -> EvalError {
    EvalError {
        kind: EvalErrorKind::Arity {
            detail: format!("value does not match destructuring pattern {what}"),
        },
        message: format!("value does not match destructuring pattern {what}"),
    }
}

/// A special form had the wrong shape.
pub fn form_syntax(detail: impl Into<String>) -> EvalError {
    let detail = detail.into();
    EvalError {
        message: detail.clone(),
        kind: EvalErrorKind::Syntax { detail },
    }
}

/// A builtin received a value of the wrong type.
pub fn type_mismatch(expected: &str, got: &str) -> EvalError {
    EvalError {
        kind: EvalErrorKind::TypeMismatch {
            expected: expected.to_string(),
            got: got.to_string(),
        },
        message: format!("expected {expected}, got {got}"),
    }
}

/// Division or modulo by zero.
pub fn division_by_zero() -> EvalError {
    EvalError {
        kind: EvalErrorKind::DivisionByZero,
        message: "division by zero".to_string(),
    }
}
