//! Runtime values.
//!
//! Primitives are stored inline; everything else goes through the `Heap<T>`
//! wrapper via the factory methods on `Value`. Procedure variants (native,
//! closure, conditional definition, class, bound method) share the one
//! `Value` type so the evaluator applies them uniformly.

mod composite;
mod heap;
mod iter;

use std::fmt;

use rustc_hash::FxHashMap;

use rill_ir::{Name, StringLookup};

pub use composite::{BoundMethod, Closure, CondDef, NativeFn, NativeProcedure, Param, ParamList};
pub use heap::Heap;
pub use iter::ValueIter;

use crate::class::{ClassDef, Instance};
use crate::env::EnvRef;

/// A runtime value.
#[derive(Clone, Debug)]
pub enum Value {
    /// Integer.
    Int(i64),
    /// Float.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// The "no value" sentinel. Distinct from the empty list and not falsy.
    Nil,
    /// String.
    Str(Heap<String>),
    /// A symbol value, produced by `quote`.
    Symbol(Name),
    /// A keyword; evaluates to itself.
    Keyword(Name),
    /// A proper list.
    List(Heap<Vec<Value>>),
    /// A vector.
    Vector(Heap<Vec<Value>>),
    /// A map keyed by hashable atoms.
    Map(Heap<FxHashMap<MapKey, Value>>),
    /// Host-supplied procedure.
    Native(NativeProcedure),
    /// User-defined closure.
    Closure(Heap<Closure>),
    /// Conditional definition: named variants behind one parameter list.
    CondDef(Heap<CondDef>),
    /// A class template.
    Class(Heap<ClassDef>),
    /// An instance of a class.
    Instance(Heap<Instance>),
    /// A method bound to its receiving instance.
    BoundMethod(Heap<BoundMethod>),
    /// A first-class environment capture.
    Env(EnvRef),
}

/// A hashable map key: the atom subset of `Value`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MapKey {
    /// `:keyword` key (the common case).
    Keyword(Name),
    /// String key.
    Str(String),
    /// Symbol key (usually via `quote`).
    Symbol(Name),
    /// Integer key.
    Int(i64),
    /// Boolean key.
    Bool(bool),
}

impl MapKey {
    /// Convert a value into a map key, if it is hashable.
    pub fn from_value(value: &Value) -> Option<MapKey> {
        match value {
            Value::Keyword(name) => Some(MapKey::Keyword(*name)),
            Value::Str(s) => Some(MapKey::Str((**s).clone())),
            Value::Symbol(name) => Some(MapKey::Symbol(*name)),
            Value::Int(n) => Some(MapKey::Int(*n)),
            Value::Bool(b) => Some(MapKey::Bool(*b)),
            _ => None,
        }
    }

    /// Convert the key back to a value.
    pub fn to_value(&self) -> Value {
        match self {
            MapKey::Keyword(name) => Value::Keyword(*name),
            MapKey::Str(s) => Value::string(s.clone()),
            MapKey::Symbol(name) => Value::Symbol(*name),
            MapKey::Int(n) => Value::Int(*n),
            MapKey::Bool(b) => Value::Bool(*b),
        }
    }
}

// Factory methods

impl Value {
    /// Create a string value.
    #[inline]
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(Heap::new(s.into()))
    }

    /// Create a list value.
    #[inline]
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Heap::new(items))
    }

    /// The empty list.
    #[inline]
    pub fn empty_list() -> Self {
        Value::list(Vec::new())
    }

    /// Create a vector value.
    #[inline]
    pub fn vector(items: Vec<Value>) -> Self {
        Value::Vector(Heap::new(items))
    }

    /// Create a map value.
    #[inline]
    pub fn map(entries: FxHashMap<MapKey, Value>) -> Self {
        Value::Map(Heap::new(entries))
    }

    /// Create a closure value.
    #[inline]
    pub fn closure(closure: Closure) -> Self {
        Value::Closure(Heap::new(closure))
    }

    /// Create a conditional-definition value.
    #[inline]
    pub fn cond_def(def: CondDef) -> Self {
        Value::CondDef(Heap::new(def))
    }

    /// Create a class value.
    #[inline]
    pub fn class(class: ClassDef) -> Self {
        Value::Class(Heap::new(class))
    }

    /// Create an instance value.
    #[inline]
    pub fn instance(instance: Instance) -> Self {
        Value::Instance(Heap::new(instance))
    }

    /// Create a bound-method value.
    #[inline]
    pub fn bound_method(method: BoundMethod) -> Self {
        Value::BoundMethod(Heap::new(method))
    }
}

impl Value {
    /// Convert a quoted expression to the value it denotes.
    ///
    /// Symbols stay symbols; lists, vectors, and maps convert structurally.
    /// A map literal with an unhashable key is a syntax error.
    pub fn from_datum(expr: &rill_ir::Expr) -> Result<Value, crate::errors::EvalError> {
        use rill_ir::Expr;
        Ok(match expr {
            Expr::Int(n) => Value::Int(*n),
            Expr::Float(x) => Value::Float(*x),
            Expr::Str(s) => Value::string(s.clone()),
            Expr::Bool(b) => Value::Bool(*b),
            Expr::Nil => Value::Nil,
            Expr::Symbol(name) => Value::Symbol(*name),
            Expr::Keyword(name) => Value::Keyword(*name),
            Expr::List(items) => {
                let values = items
                    .iter()
                    .map(Value::from_datum)
                    .collect::<Result<Vec<_>, _>>()?;
                Value::list(values)
            }
            Expr::Vector(items) => {
                let values = items
                    .iter()
                    .map(Value::from_datum)
                    .collect::<Result<Vec<_>, _>>()?;
                Value::vector(values)
            }
            Expr::Map(pairs) => {
                let mut entries = FxHashMap::default();
                for (k, v) in pairs {
                    let key_value = Value::from_datum(k)?;
                    let key = MapKey::from_value(&key_value).ok_or_else(|| {
                        crate::errors::form_syntax(format!(
                            "map key of type {} is not hashable",
                            key_value.type_name()
                        ))
                    })?;
                    entries.insert(key, Value::from_datum(v)?);
                }
                Value::map(entries)
            }
        })
    }
}

// Predicates

impl Value {
    /// Truthiness: only `false` and the empty list are falsy.
    ///
    /// `nil` is a distinguished "no value" sentinel and is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::List(items) => !items.is_empty(),
            _ => true,
        }
    }

    /// Whether this value can appear at the head of a call form.
    pub fn is_callable(&self) -> bool {
        matches!(
            self,
            Value::Native(_)
                | Value::Closure(_)
                | Value::CondDef(_)
                | Value::Class(_)
                | Value::BoundMethod(_)
        )
    }

    /// The type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Nil => "nil",
            Value::Str(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Keyword(_) => "keyword",
            Value::List(_) => "list",
            Value::Vector(_) => "vector",
            Value::Map(_) => "map",
            Value::Native(_) => "native procedure",
            Value::Closure(_) => "function",
            Value::CondDef(_) => "conditional definition",
            Value::Class(_) => "class",
            Value::Instance(_) => "instance",
            Value::BoundMethod(_) => "method",
            Value::Env(_) => "environment",
        }
    }

    /// Wrap `self` for display through an interner.
    pub fn display<'a, L: StringLookup>(&'a self, lookup: &'a L) -> ValueDisplay<'a, L> {
        ValueDisplay { value: self, lookup }
    }
}

// Equality
//
// Numbers compare across int/float like the surface language's `==`;
// procedures, instances, and environments compare by identity.

impl PartialEq for Value {
    #[expect(clippy::cast_precision_loss, reason = "numeric equality follows the surface language")]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) | (Value::Keyword(a), Value::Keyword(b)) => {
                a == b
            }
            (Value::List(a), Value::List(b)) | (Value::Vector(a), Value::Vector(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Native(a), Value::Native(b)) => a == b,
            (Value::Closure(a), Value::Closure(b)) => Heap::ptr_eq(a, b),
            (Value::CondDef(a), Value::CondDef(b)) => Heap::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Heap::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Heap::ptr_eq(a, b),
            (Value::BoundMethod(a), Value::BoundMethod(b)) => Heap::ptr_eq(a, b),
            (Value::Env(a), Value::Env(b)) => EnvRef::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Display adaptor pairing a value with a name lookup.
///
/// Strings display raw (no quotes), matching the surface language's print.
pub struct ValueDisplay<'a, L: StringLookup> {
    value: &'a Value,
    lookup: &'a L,
}

impl<L: StringLookup> fmt::Display for ValueDisplay<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self.value, self.lookup)
    }
}

fn write_value<L: StringLookup>(
    f: &mut fmt::Formatter<'_>,
    value: &Value,
    lookup: &L,
) -> fmt::Result {
    match value {
        Value::Int(n) => write!(f, "{n}"),
        Value::Float(x) => write!(f, "{x}"),
        Value::Bool(b) => write!(f, "{b}"),
        Value::Nil => write!(f, "nil"),
        Value::Str(s) => write!(f, "{}", **s),
        Value::Symbol(name) => write!(f, "{}", lookup.lookup(*name)),
        Value::Keyword(name) => write!(f, ":{}", lookup.lookup(*name)),
        Value::List(items) => write_seq(f, items, lookup, '(', ')'),
        Value::Vector(items) => write_seq(f, items, lookup, '[', ']'),
        Value::Map(entries) => {
            write!(f, "{{")?;
            for (i, (k, v)) in entries.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                write_value(f, &k.to_value(), lookup)?;
                write!(f, " ")?;
                write_value(f, v, lookup)?;
            }
            write!(f, "}}")
        }
        Value::Native(p) => write!(f, "#<native {}>", p.name),
        Value::Closure(c) => match c.name {
            Some(name) => write!(f, "#<function {}>", lookup.lookup(name)),
            None => write!(f, "#<lambda>"),
        },
        Value::CondDef(d) => write!(f, "#<conditional {}>", lookup.lookup(d.name)),
        Value::Class(c) => write!(f, "#<class {}>", lookup.lookup(c.name)),
        Value::Instance(i) => write!(f, "#<instance {}>", lookup.lookup(i.class.name)),
        Value::BoundMethod(m) => write!(
            f,
            "#<method {}.{}>",
            lookup.lookup(m.receiver.class.name),
            lookup.lookup(m.method.name)
        ),
        Value::Env(_) => write!(f, "#<environment>"),
    }
}

fn write_seq<L: StringLookup>(
    f: &mut fmt::Formatter<'_>,
    items: &[Value],
    lookup: &L,
    open: char,
    close: char,
) -> fmt::Result {
    write!(f, "{open}")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write_value(f, item, lookup)?;
    }
    write!(f, "{close}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rill_ir::StringInterner;

    #[test]
    fn truthiness_only_false_and_empty_list_are_falsy() {
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::empty_list().is_truthy());
        assert!(Value::Nil.is_truthy());
        assert!(Value::Int(0).is_truthy());
        assert!(Value::string("").is_truthy());
        assert!(Value::vector(vec![]).is_truthy());
    }

    #[test]
    fn numeric_equality_crosses_int_and_float() {
        assert_eq!(Value::Int(1), Value::Float(1.0));
        assert_ne!(Value::Int(1), Value::Float(1.5));
    }

    #[test]
    fn empty_list_is_not_nil_and_not_false() {
        assert_ne!(Value::empty_list(), Value::Nil);
        assert_ne!(Value::empty_list(), Value::Bool(false));
    }

    #[test]
    fn lists_and_vectors_are_distinct() {
        assert_ne!(
            Value::list(vec![Value::Int(1)]),
            Value::vector(vec![Value::Int(1)])
        );
    }

    #[test]
    fn display_is_lisp_readable() {
        let interner = StringInterner::new();
        let a = interner.intern("a");
        let list = Value::list(vec![Value::Int(1), Value::string("hi"), Value::Keyword(a)]);
        assert_eq!(list.display(&interner).to_string(), "(1 hi :a)");
    }

    #[test]
    fn map_keys_are_the_hashable_atom_subset() {
        assert!(MapKey::from_value(&Value::Int(1)).is_some());
        assert!(MapKey::from_value(&Value::string("k")).is_some());
        assert!(MapKey::from_value(&Value::list(vec![])).is_none());
        assert!(MapKey::from_value(&Value::Nil).is_none());
    }
}
