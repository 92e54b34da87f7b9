//! Structural pattern matching.
//!
//! Used by the `match` special form and by destructuring parameter
//! positions in closures and methods. Patterns are compiled from the
//! expression shapes the Reader produces, then matched against runtime
//! values, accumulating bindings for a fresh frame.

use rill_ir::{Expr, Name, StringInterner, StringLookup};

use crate::errors::{form_syntax, EvalError};
use crate::value::{MapKey, Value};

/// A compiled pattern.
#[derive(Clone, Debug)]
pub enum Pattern {
    /// Matches by equality against a literal value.
    Literal(Value),
    /// `_`: matches anything, binds nothing.
    Wildcard,
    /// A symbol: matches anything, binds the symbol.
    Binding(Name),
    /// `'()` or `()`: matches only the empty list.
    EmptyList,
    /// `(: head tail)`: matches a non-empty sequence, binding first element
    /// and remainder. The tail may itself be a cons pattern.
    Cons(Box<Pattern>, Box<Pattern>),
    /// `[p1 p2 ...]`: matches a vector of exactly that length.
    Vector(Vec<Pattern>),
    /// `{k p ...}`: matches a map with exactly that key set.
    Map(Vec<(MapKey, Pattern)>),
}

impl Pattern {
    /// Compile an expression into a pattern.
    pub fn compile(expr: &Expr, interner: &StringInterner) -> Result<Pattern, EvalError> {
        match expr {
            Expr::Int(n) => Ok(Pattern::Literal(Value::Int(*n))),
            Expr::Float(x) => Ok(Pattern::Literal(Value::Float(*x))),
            Expr::Str(s) => Ok(Pattern::Literal(Value::string(s.clone()))),
            Expr::Bool(b) => Ok(Pattern::Literal(Value::Bool(*b))),
            Expr::Nil => Ok(Pattern::Literal(Value::Nil)),
            Expr::Keyword(name) => Ok(Pattern::Literal(Value::Keyword(*name))),
            Expr::Symbol(name) => {
                if interner.lookup(*name) == "_" {
                    Ok(Pattern::Wildcard)
                } else {
                    Ok(Pattern::Binding(*name))
                }
            }
            Expr::List(items) => Self::compile_list(items, interner),
            Expr::Vector(items) => {
                let patterns = items
                    .iter()
                    .map(|item| Pattern::compile(item, interner))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Pattern::Vector(patterns))
            }
            Expr::Map(pairs) => {
                let mut entries = Vec::with_capacity(pairs.len());
                for (k, v) in pairs {
                    let key_value = Value::from_datum(k)?;
                    let key = MapKey::from_value(&key_value).ok_or_else(|| {
                        form_syntax("map pattern keys must be hashable literals")
                    })?;
                    entries.push((key, Pattern::compile(v, interner)?));
                }
                Ok(Pattern::Map(entries))
            }
        }
    }

    fn compile_list(items: &[Expr], interner: &StringInterner) -> Result<Pattern, EvalError> {
        if items.is_empty() {
            return Ok(Pattern::EmptyList);
        }
        if let Expr::Symbol(head) = &items[0] {
            match interner.lookup(*head) {
                "quote" if items.len() == 2 => {
                    if items[1].is_empty_list() {
                        return Ok(Pattern::EmptyList);
                    }
                    return Ok(Pattern::Literal(Value::from_datum(&items[1])?));
                }
                ":" if items.len() == 3 => {
                    let head = Pattern::compile(&items[1], interner)?;
                    let tail = Pattern::compile(&items[2], interner)?;
                    return Ok(Pattern::Cons(Box::new(head), Box::new(tail)));
                }
                _ => {}
            }
        }
        Err(form_syntax(
            "list patterns must be '(), (quote lit), or (: head tail)",
        ))
    }

    /// Render the pattern for error messages.
    pub fn describe<L: StringLookup>(&self, lookup: &L) -> String {
        match self {
            Pattern::Literal(v) => v.display(lookup).to_string(),
            Pattern::Wildcard => "_".to_string(),
            Pattern::Binding(name) => lookup.lookup(*name).to_string(),
            Pattern::EmptyList => "'()".to_string(),
            Pattern::Cons(head, tail) => {
                format!("(: {} {})", head.describe(lookup), tail.describe(lookup))
            }
            Pattern::Vector(items) => {
                let inner: Vec<String> = items.iter().map(|p| p.describe(lookup)).collect();
                format!("[{}]", inner.join(" "))
            }
            Pattern::Map(entries) => {
                let inner: Vec<String> = entries
                    .iter()
                    .map(|(k, p)| {
                        format!(
                            "{} {}",
                            k.to_value().display(lookup),
                            p.describe(lookup)
                        )
                    })
                    .collect();
                format!("{{{}}}", inner.join(" "))
            }
        }
    }
}

/// Match a value against a pattern, accumulating bindings.
///
/// Returns `false` on structural disagreement; `bindings` may then hold
/// partial entries and must be discarded by the caller. A symbol repeated
/// within one pattern must bind equal values.
pub fn match_value(pattern: &Pattern, value: &Value, bindings: &mut Vec<(Name, Value)>) -> bool {
    match pattern {
        Pattern::Literal(lit) => lit == value,
        Pattern::Wildcard => true,
        Pattern::Binding(name) => {
            if let Some((_, bound)) = bindings.iter().find(|(n, _)| n == name) {
                return bound == value;
            }
            bindings.push((*name, value.clone()));
            true
        }
        Pattern::EmptyList => matches!(value, Value::List(items) if items.is_empty()),
        Pattern::Cons(head, tail) => {
            let (first, rest) = match value {
                Value::List(items) if !items.is_empty() => (
                    items[0].clone(),
                    Value::list(items[1..].to_vec()),
                ),
                Value::Vector(items) if !items.is_empty() => (
                    items[0].clone(),
                    Value::vector(items[1..].to_vec()),
                ),
                _ => return false,
            };
            match_value(head, &first, bindings) && match_value(tail, &rest, bindings)
        }
        Pattern::Vector(patterns) => {
            let Value::Vector(items) = value else {
                return false;
            };
            if patterns.len() != items.len() {
                return false;
            }
            patterns
                .iter()
                .zip(items.iter())
                .all(|(p, v)| match_value(p, v, bindings))
        }
        Pattern::Map(entries) => {
            let Value::Map(map) = value else {
                return false;
            };
            if entries.len() != map.len() {
                return false;
            }
            entries.iter().all(|(key, p)| {
                map.get(key)
                    .is_some_and(|v| match_value(p, v, bindings))
            })
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rill_ir::StringInterner;

    fn compile(src_expr: &Expr, interner: &StringInterner) -> Pattern {
        Pattern::compile(src_expr, interner).unwrap()
    }

    #[test]
    fn symbol_binds_the_value() {
        let interner = StringInterner::new();
        let x = interner.intern("x");
        let pattern = compile(&Expr::Symbol(x), &interner);

        let mut bindings = Vec::new();
        assert!(match_value(&pattern, &Value::Int(7), &mut bindings));
        assert_eq!(bindings, vec![(x, Value::Int(7))]);
    }

    #[test]
    fn wildcard_matches_anything_binding_nothing() {
        let interner = StringInterner::new();
        let underscore = interner.intern("_");
        let pattern = compile(&Expr::Symbol(underscore), &interner);

        let mut bindings = Vec::new();
        assert!(match_value(&pattern, &Value::string("x"), &mut bindings));
        assert!(bindings.is_empty());
    }

    #[test]
    fn cons_destructures_head_and_tail() {
        let interner = StringInterner::new();
        let colon = interner.intern(":");
        let x = interner.intern("x");
        let xs = interner.intern("xs");
        let pattern = compile(
            &Expr::List(vec![
                Expr::Symbol(colon),
                Expr::Symbol(x),
                Expr::Symbol(xs),
            ]),
            &interner,
        );

        let value = Value::list(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        let mut bindings = Vec::new();
        assert!(match_value(&pattern, &value, &mut bindings));
        assert_eq!(
            bindings,
            vec![
                (x, Value::Int(1)),
                (xs, Value::list(vec![Value::Int(2), Value::Int(3)])),
            ]
        );
    }

    #[test]
    fn cons_rejects_the_empty_sequence() {
        let interner = StringInterner::new();
        let colon = interner.intern(":");
        let x = interner.intern("x");
        let xs = interner.intern("xs");
        let pattern = compile(
            &Expr::List(vec![
                Expr::Symbol(colon),
                Expr::Symbol(x),
                Expr::Symbol(xs),
            ]),
            &interner,
        );

        let mut bindings = Vec::new();
        assert!(!match_value(&pattern, &Value::empty_list(), &mut bindings));
    }

    #[test]
    fn empty_list_pattern_matches_only_the_empty_list() {
        let interner = StringInterner::new();
        let quote = interner.intern("quote");
        let pattern = compile(
            &Expr::List(vec![Expr::Symbol(quote), Expr::List(vec![])]),
            &interner,
        );

        let mut bindings = Vec::new();
        assert!(match_value(&pattern, &Value::empty_list(), &mut bindings));
        assert!(!match_value(
            &pattern,
            &Value::list(vec![Value::Int(1)]),
            &mut bindings
        ));
        assert!(!match_value(&pattern, &Value::Nil, &mut bindings));
    }

    #[test]
    fn vector_pattern_requires_exact_length() {
        let interner = StringInterner::new();
        let a = interner.intern("a");
        let b = interner.intern("b");
        let pattern = compile(
            &Expr::Vector(vec![Expr::Symbol(a), Expr::Symbol(b)]),
            &interner,
        );

        let mut bindings = Vec::new();
        assert!(match_value(
            &pattern,
            &Value::vector(vec![Value::Int(1), Value::Int(2)]),
            &mut bindings
        ));

        bindings.clear();
        assert!(!match_value(
            &pattern,
            &Value::vector(vec![Value::Int(1)]),
            &mut bindings
        ));
    }

    #[test]
    fn repeated_variable_must_bind_equal_values() {
        let interner = StringInterner::new();
        let a = interner.intern("a");
        let pattern = compile(
            &Expr::Vector(vec![Expr::Symbol(a), Expr::Symbol(a)]),
            &interner,
        );

        let mut bindings = Vec::new();
        assert!(match_value(
            &pattern,
            &Value::vector(vec![Value::Int(1), Value::Int(1)]),
            &mut bindings
        ));

        bindings.clear();
        assert!(!match_value(
            &pattern,
            &Value::vector(vec![Value::Int(1), Value::Int(2)]),
            &mut bindings
        ));
    }

    #[test]
    fn map_pattern_requires_exact_key_set() {
        let interner = StringInterner::new();
        let k = interner.intern("k");
        let v = interner.intern("v");
        let pattern = compile(
            &Expr::Map(vec![(Expr::Keyword(k), Expr::Symbol(v))]),
            &interner,
        );

        let mut entries = rustc_hash::FxHashMap::default();
        entries.insert(MapKey::Keyword(k), Value::Int(1));
        let mut bindings = Vec::new();
        assert!(match_value(&pattern, &Value::map(entries.clone()), &mut bindings));
        assert_eq!(bindings, vec![(v, Value::Int(1))]);

        // An extra key makes the key sets differ.
        entries.insert(MapKey::Int(9), Value::Int(2));
        bindings.clear();
        assert!(!match_value(&pattern, &Value::map(entries), &mut bindings));
    }

    #[test]
    fn literal_pattern_matches_by_equality() {
        let interner = StringInterner::new();
        let pattern = compile(&Expr::Int(3), &interner);
        let mut bindings = Vec::new();
        assert!(match_value(&pattern, &Value::Int(3), &mut bindings));
        assert!(match_value(&pattern, &Value::Float(3.0), &mut bindings));
        assert!(!match_value(&pattern, &Value::Int(4), &mut bindings));
    }

    #[test]
    fn arbitrary_call_shapes_are_not_patterns() {
        let interner = StringInterner::new();
        let f = interner.intern("f");
        let err = Pattern::compile(
            &Expr::List(vec![Expr::Symbol(f), Expr::Int(1)]),
            &interner,
        );
        assert!(err.is_err());
    }
}
