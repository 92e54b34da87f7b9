//! Optional per-parameter type constraints.
//!
//! A constraint map attached to a closure is validated against the bound
//! arguments after binding and before the body runs; the body never
//! executes on arguments that fail validation.

use rill_ir::{Expr, Name, StringInterner, StringLookup};

use crate::env::EnvRef;
use crate::errors::{form_syntax, type_constraint, EvalError};
use crate::value::Value;

/// A semantic type a parameter can be constrained to.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeSpec {
    /// Integer.
    Int,
    /// Float.
    Float,
    /// Integer or float.
    Number,
    /// String.
    Str,
    /// Boolean.
    Bool,
    /// Keyword.
    Keyword,
    /// Symbol.
    Symbol,
    /// Proper list.
    List,
    /// Vector.
    Vector,
    /// Map.
    Map,
    /// Anything callable.
    Callable,
    /// Anything at all.
    Any,
    /// A list or vector whose every element satisfies the inner spec.
    SeqOf(Box<TypeSpec>),
}

impl TypeSpec {
    /// Parse a type expression: a type symbol or `(list-of T)`.
    pub fn parse(expr: &Expr, interner: &StringInterner) -> Result<TypeSpec, EvalError> {
        match expr {
            Expr::Symbol(name) => match interner.lookup(*name) {
                "int" | "integer" => Ok(TypeSpec::Int),
                "float" => Ok(TypeSpec::Float),
                "number" | "numeric" => Ok(TypeSpec::Number),
                "str" | "string" => Ok(TypeSpec::Str),
                "bool" => Ok(TypeSpec::Bool),
                "keyword" => Ok(TypeSpec::Keyword),
                "symbol" => Ok(TypeSpec::Symbol),
                "list" => Ok(TypeSpec::List),
                "vector" => Ok(TypeSpec::Vector),
                "map" | "dict" => Ok(TypeSpec::Map),
                "callable" => Ok(TypeSpec::Callable),
                "any" => Ok(TypeSpec::Any),
                other => Err(form_syntax(format!("unknown type name {other}"))),
            },
            Expr::List(items) => {
                if let [Expr::Symbol(head), inner] = items.as_slice() {
                    if interner.lookup(*head) == "list-of" {
                        let inner = TypeSpec::parse(inner, interner)?;
                        return Ok(TypeSpec::SeqOf(Box::new(inner)));
                    }
                }
                Err(form_syntax("compound type must be (list-of T)"))
            }
            _ => Err(form_syntax("type constraint must be a type name")),
        }
    }

    /// Whether `value` satisfies this spec.
    pub fn check(&self, value: &Value) -> bool {
        match self {
            TypeSpec::Int => matches!(value, Value::Int(_)),
            TypeSpec::Float => matches!(value, Value::Float(_)),
            TypeSpec::Number => matches!(value, Value::Int(_) | Value::Float(_)),
            TypeSpec::Str => matches!(value, Value::Str(_)),
            TypeSpec::Bool => matches!(value, Value::Bool(_)),
            TypeSpec::Keyword => matches!(value, Value::Keyword(_)),
            TypeSpec::Symbol => matches!(value, Value::Symbol(_)),
            TypeSpec::List => matches!(value, Value::List(_)),
            TypeSpec::Vector => matches!(value, Value::Vector(_)),
            TypeSpec::Map => matches!(value, Value::Map(_)),
            TypeSpec::Callable => value.is_callable(),
            TypeSpec::Any => true,
            TypeSpec::SeqOf(inner) => match value {
                Value::List(items) | Value::Vector(items) => {
                    items.iter().all(|item| inner.check(item))
                }
                _ => false,
            },
        }
    }

    /// The spec's name for error messages.
    pub fn describe(&self) -> String {
        match self {
            TypeSpec::Int => "int".to_string(),
            TypeSpec::Float => "float".to_string(),
            TypeSpec::Number => "number".to_string(),
            TypeSpec::Str => "string".to_string(),
            TypeSpec::Bool => "bool".to_string(),
            TypeSpec::Keyword => "keyword".to_string(),
            TypeSpec::Symbol => "symbol".to_string(),
            TypeSpec::List => "list".to_string(),
            TypeSpec::Vector => "vector".to_string(),
            TypeSpec::Map => "map".to_string(),
            TypeSpec::Callable => "callable".to_string(),
            TypeSpec::Any => "any".to_string(),
            TypeSpec::SeqOf(inner) => format!("(list-of {})", inner.describe()),
        }
    }

    fn is_fixed_numeric(&self) -> bool {
        matches!(self, TypeSpec::Int | TypeSpec::Float)
    }
}

/// The compiled constraint map of a typed closure.
#[derive(Clone, Debug)]
pub struct TypeMap {
    entries: Vec<(Name, TypeSpec)>,
    /// Every constrained parameter is a fixed-width numeric type, so
    /// validation can take the discriminant-only fast path.
    all_numeric: bool,
}

impl TypeMap {
    /// Build a constraint map from name/spec pairs.
    pub fn new(entries: Vec<(Name, TypeSpec)>) -> Self {
        let all_numeric = entries.iter().all(|(_, spec)| spec.is_fixed_numeric());
        TypeMap {
            entries,
            all_numeric,
        }
    }

    /// Validate the bound arguments in `frame`.
    ///
    /// Must be called after parameter binding and before the body runs.
    pub fn validate<L: StringLookup>(&self, frame: &EnvRef, lookup: &L) -> Result<(), EvalError> {
        if self.all_numeric {
            // Fast path: every spec is Int or Float, so a discriminant test
            // is the whole check. Behavior is identical to the general path.
            for (name, spec) in &self.entries {
                if let Some(value) = frame.lookup_local(*name) {
                    let ok = match spec {
                        TypeSpec::Int => matches!(value, Value::Int(_)),
                        _ => matches!(value, Value::Float(_)),
                    };
                    if !ok {
                        return Err(type_constraint(
                            lookup.lookup(*name),
                            &spec.describe(),
                            value.type_name(),
                        ));
                    }
                }
            }
            return Ok(());
        }

        for (name, spec) in &self.entries {
            if let Some(value) = frame.lookup_local(*name) {
                if !spec.check(&value) {
                    return Err(type_constraint(
                        lookup.lookup(*name),
                        &spec.describe(),
                        value.type_name(),
                    ));
                }
            }
        }
        Ok(())
    }
}
