//! Procedure value types: natives, closures, conditional definitions, and
//! bound methods.

use std::fmt;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use rill_ir::{Expr, Name};

use crate::env::EnvRef;
use crate::errors::EvalError;
use crate::pattern::Pattern;
use crate::typed::TypeMap;
use crate::value::Value;

/// Signature of a host-supplied procedure.
///
/// Natives receive the interpreter so higher-order builtins (`map`, `apply`)
/// can re-enter evaluation and `print` can reach the print handler.
pub type NativeFn = fn(&mut crate::Interpreter, &[Value]) -> Result<Value, EvalError>;

/// A host-supplied procedure.
#[derive(Clone, Copy)]
pub struct NativeProcedure {
    /// Name used in display and error messages.
    pub name: &'static str,
    /// The host function.
    pub func: NativeFn,
}

impl fmt::Debug for NativeProcedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeProcedure")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl PartialEq for NativeProcedure {
    fn eq(&self, other: &Self) -> bool {
        // Registry names are unique, and function pointer comparison is
        // unreliable across codegen units.
        self.name == other.name
    }
}

/// One declared parameter: a plain name or a destructuring pattern.
#[derive(Clone, Debug)]
pub enum Param {
    /// Positional name binding.
    Name(Name),
    /// Destructuring pattern, e.g. `(: x xs)` or `[a b]`.
    Pattern(Pattern),
}

/// Parameter list storage; almost all procedures have a handful of params.
pub type ParamList = SmallVec<[Param; 4]>;

/// A user-defined closure.
///
/// Remembers exactly the environment active at its definition: bodies are
/// always evaluated against a fresh child of `env`, never the caller's
/// environment.
#[derive(Clone, Debug)]
pub struct Closure {
    /// Definition name, if the closure came from `defn`.
    pub name: Option<Name>,
    /// Declared parameters.
    pub params: ParamList,
    /// Body forms, evaluated with begin semantics.
    pub body: Vec<Expr>,
    /// The defining environment.
    pub env: EnvRef,
    /// Optional docstring.
    pub doc: Option<String>,
    /// Optional per-parameter type constraints, validated before the body.
    pub constraints: Option<TypeMap>,
}

/// A conditional definition: a group of named variants sharing one
/// parameter list, selected by a `name/variant` qualifier at the call site.
#[derive(Clone, Debug)]
pub struct CondDef {
    /// The base name.
    pub name: Name,
    /// Shared parameter list.
    pub params: ParamList,
    /// Variant qualifier to body forms.
    pub variants: FxHashMap<Name, Vec<Expr>>,
    /// The defining environment.
    pub env: EnvRef,
}

/// A method bound to its receiving instance.
#[derive(Clone, Debug)]
pub struct BoundMethod {
    /// The receiver.
    pub receiver: super::Heap<crate::class::Instance>,
    /// The method definition.
    pub method: super::Heap<crate::class::MethodDef>,
}
