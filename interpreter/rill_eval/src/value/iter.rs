//! Single-pass value iteration for `for-in`.
//!
//! A `ValueIter` is a producer with a `next` operation that signals
//! exhaustion; it is non-restartable by construction. Maps iterate as
//! `[key value]` vectors and strings as one-character strings.

use crate::errors::{type_mismatch, EvalError};
use crate::value::Value;

/// A single-pass producer of values.
pub struct ValueIter {
    items: std::vec::IntoIter<Value>,
}

impl ValueIter {
    /// Build a producer over an iterable value.
    ///
    /// Lists, vectors, maps, and strings are iterable; anything else is a
    /// type error.
    pub fn new(value: &Value) -> Result<ValueIter, EvalError> {
        let items: Vec<Value> = match value {
            Value::List(items) | Value::Vector(items) => (**items).clone(),
            Value::Map(entries) => entries
                .iter()
                .map(|(k, v)| Value::vector(vec![k.to_value(), v.clone()]))
                .collect(),
            Value::Str(s) => s.chars().map(|c| Value::string(c.to_string())).collect(),
            other => return Err(type_mismatch("an iterable sequence", other.type_name())),
        };
        Ok(ValueIter {
            items: items.into_iter(),
        })
    }
}

impl Iterator for ValueIter {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        self.items.next()
    }
}
