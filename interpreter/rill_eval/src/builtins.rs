//! The builtin registry.
//!
//! Stands in for the host-import bridge: a mapping from names to native
//! procedures, seeded into the global frame through the ordinary `define`
//! contract at interpreter construction.
//!
//! Numeric promotion: int with int stays int, any float operand widens the
//! result to float, and `/` always produces a float. Modulo follows the
//! divisor's sign.

use rill_ir::StringInterner;

use crate::env::EnvRef;
use crate::errors::{
    arity_at_least, arity_mismatch, division_by_zero, type_mismatch, EvalError,
};
use crate::interpreter::Interpreter;
use crate::value::{MapKey, NativeFn, NativeProcedure, Value, ValueIter};

type NativeResult = Result<Value, EvalError>;

/// Install every builtin into the global frame.
pub(crate) fn install(globals: &EnvRef, interner: &StringInterner) {
    static BUILTINS: &[(&str, NativeFn)] = &[
        // Arithmetic
        ("+", add),
        ("-", sub),
        ("*", mul),
        ("/", div),
        ("%", rem),
        ("abs", abs),
        ("min", min),
        ("max", max),
        // Comparison
        ("<", lt),
        (">", gt),
        ("<=", le),
        (">=", ge),
        ("==", eq),
        ("!=", ne),
        // Logic (eager, like the rest of the registry)
        ("and", and),
        ("or", or),
        ("not", not),
        // Sequences
        ("car", car),
        ("cdr", cdr),
        ("cons", cons),
        (":", cons),
        ("append", append),
        ("len", len),
        ("list", list),
        ("vector", vector),
        ("dict", dict),
        ("range", range),
        ("reverse", reverse),
        // Higher-order
        ("apply", apply),
        ("map", map),
        ("filter", filter),
        ("foldl", foldl),
        ("foldr", foldr),
        ("take-while", take_while),
        ("drop-while", drop_while),
        // Predicates
        ("null?", is_null),
        ("eq?", is_eq),
        ("equal?", is_equal),
        ("callable?", is_callable),
        ("string?", is_string),
        ("symbol?", is_symbol),
        ("keyword?", is_keyword),
        ("list?", is_list),
        ("vector?", is_vector),
        ("dict?", is_dict),
        ("int?", is_int),
        ("float?", is_float),
        ("number?", is_number),
        // Conversions
        ("str", to_str),
        ("int", to_int),
        ("float", to_float),
        // Output and introspection
        ("print", print),
        ("display", display),
        ("doc", doc),
    ];

    for &(name, func) in BUILTINS {
        globals.define(
            interner.intern(name),
            Value::Native(NativeProcedure { name, func }),
        );
    }
}

// Numeric helpers

#[derive(Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    #[expect(clippy::cast_precision_loss, reason = "promotion to float is the documented rule")]
    fn as_f64(self) -> f64 {
        match self {
            Num::Int(n) => n as f64,
            Num::Float(x) => x,
        }
    }
}

fn number(value: &Value) -> Result<Num, EvalError> {
    match value {
        Value::Int(n) => Ok(Num::Int(*n)),
        Value::Float(x) => Ok(Num::Float(*x)),
        other => Err(type_mismatch("a number", other.type_name())),
    }
}

fn expect(args: &[Value], count: usize) -> Result<(), EvalError> {
    if args.len() == count {
        Ok(())
    } else {
        Err(arity_mismatch(count, args.len()))
    }
}

fn expect_at_least(args: &[Value], min: usize) -> Result<(), EvalError> {
    if args.len() >= min {
        Ok(())
    } else {
        Err(arity_at_least(min, args.len()))
    }
}

// Arithmetic

/// Add numbers or concatenate strings.
fn add(_interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect_at_least(args, 1)?;
    if matches!(args[0], Value::Str(_)) {
        let mut out = String::new();
        for arg in args {
            let Value::Str(s) = arg else {
                return Err(type_mismatch("a string", arg.type_name()));
            };
            out.push_str(s);
        }
        return Ok(Value::string(out));
    }

    let mut acc = number(&args[0])?;
    for arg in &args[1..] {
        let rhs = number(arg)?;
        acc = match (acc, rhs) {
            (Num::Int(a), Num::Int(b)) => Num::Int(
                a.checked_add(b)
                    .ok_or_else(|| EvalError::new("integer overflow in +"))?,
            ),
            (a, b) => Num::Float(a.as_f64() + b.as_f64()),
        };
    }
    Ok(num_value(acc))
}

fn num_value(num: Num) -> Value {
    match num {
        Num::Int(n) => Value::Int(n),
        Num::Float(x) => Value::Float(x),
    }
}

fn sub(_interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    match args {
        [value] => match number(value)? {
            Num::Int(n) => Ok(Value::Int(
                n.checked_neg()
                    .ok_or_else(|| EvalError::new("integer overflow in -"))?,
            )),
            Num::Float(x) => Ok(Value::Float(-x)),
        },
        [lhs, rhs] => match (number(lhs)?, number(rhs)?) {
            (Num::Int(a), Num::Int(b)) => Ok(Value::Int(
                a.checked_sub(b)
                    .ok_or_else(|| EvalError::new("integer overflow in -"))?,
            )),
            (a, b) => Ok(Value::Float(a.as_f64() - b.as_f64())),
        },
        _ => Err(arity_mismatch(2, args.len())),
    }
}

fn mul(_interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect_at_least(args, 1)?;
    let mut acc = number(&args[0])?;
    for arg in &args[1..] {
        let rhs = number(arg)?;
        acc = match (acc, rhs) {
            (Num::Int(a), Num::Int(b)) => Num::Int(
                a.checked_mul(b)
                    .ok_or_else(|| EvalError::new("integer overflow in *"))?,
            ),
            (a, b) => Num::Float(a.as_f64() * b.as_f64()),
        };
    }
    Ok(num_value(acc))
}

/// Division always produces a float.
fn div(_interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect(args, 2)?;
    let lhs = number(&args[0])?.as_f64();
    let rhs = number(&args[1])?.as_f64();
    if rhs == 0.0 {
        return Err(division_by_zero());
    }
    Ok(Value::Float(lhs / rhs))
}

/// Integer modulo, following the divisor's sign.
fn rem(_interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect(args, 2)?;
    let (Value::Int(a), Value::Int(b)) = (&args[0], &args[1]) else {
        let got = if matches!(args[0], Value::Int(_)) {
            &args[1]
        } else {
            &args[0]
        };
        return Err(type_mismatch("an int", got.type_name()));
    };
    if *b == 0 {
        return Err(division_by_zero());
    }
    let r = a
        .checked_rem(*b)
        .ok_or_else(|| EvalError::new("integer overflow in %"))?;
    Ok(Value::Int(if r != 0 && (r < 0) != (*b < 0) { r + b } else { r }))
}

fn abs(_interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect(args, 1)?;
    match number(&args[0])? {
        Num::Int(n) => Ok(Value::Int(
            n.checked_abs()
                .ok_or_else(|| EvalError::new("integer overflow in abs"))?,
        )),
        Num::Float(x) => Ok(Value::Float(x.abs())),
    }
}

fn min(_interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    extremum(args, |a, b| a < b)
}

fn max(_interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    extremum(args, |a, b| a > b)
}

fn extremum(args: &[Value], better: fn(f64, f64) -> bool) -> NativeResult {
    expect_at_least(args, 1)?;
    let mut best = args[0].clone();
    let mut best_num = number(&best)?;
    for arg in &args[1..] {
        let candidate = number(arg)?;
        if better(candidate.as_f64(), best_num.as_f64()) {
            best = arg.clone();
            best_num = candidate;
        }
    }
    Ok(best)
}

// Comparison

fn lt(interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    compare(interp, args, |ord| ord == std::cmp::Ordering::Less)
}

fn gt(interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    compare(interp, args, |ord| ord == std::cmp::Ordering::Greater)
}

fn le(interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    compare(interp, args, |ord| ord != std::cmp::Ordering::Greater)
}

fn ge(interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    compare(interp, args, |ord| ord != std::cmp::Ordering::Less)
}

fn compare(
    _interp: &mut Interpreter,
    args: &[Value],
    accept: fn(std::cmp::Ordering) -> bool,
) -> NativeResult {
    expect(args, 2)?;
    let ordering = match (&args[0], &args[1]) {
        (Value::Str(a), Value::Str(b)) => a.cmp(b),
        (lhs, rhs) => {
            let a = number(lhs)?.as_f64();
            let b = number(rhs)?.as_f64();
            a.partial_cmp(&b)
                .ok_or_else(|| EvalError::new("cannot order NaN"))?
        }
    };
    Ok(Value::Bool(accept(ordering)))
}

fn eq(_interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect(args, 2)?;
    Ok(Value::Bool(args[0] == args[1]))
}

fn ne(_interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect(args, 2)?;
    Ok(Value::Bool(args[0] != args[1]))
}

// Logic

fn and(_interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect_at_least(args, 1)?;
    Ok(Value::Bool(args.iter().all(Value::is_truthy)))
}

fn or(_interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect_at_least(args, 1)?;
    Ok(Value::Bool(args.iter().any(Value::is_truthy)))
}

fn not(_interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect(args, 1)?;
    Ok(Value::Bool(!args[0].is_truthy()))
}

// Sequences

fn car(_interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect(args, 1)?;
    match &args[0] {
        Value::List(items) | Value::Vector(items) => items
            .first()
            .cloned()
            .ok_or_else(|| type_mismatch("a non-empty sequence", "an empty sequence")),
        Value::Str(s) => s
            .chars()
            .next()
            .map(|c| Value::string(c.to_string()))
            .ok_or_else(|| type_mismatch("a non-empty sequence", "an empty string")),
        other => Err(type_mismatch("a sequence", other.type_name())),
    }
}

fn cdr(_interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect(args, 1)?;
    match &args[0] {
        Value::List(items) => Ok(Value::list(items.iter().skip(1).cloned().collect())),
        Value::Vector(items) => Ok(Value::vector(items.iter().skip(1).cloned().collect())),
        Value::Str(s) => {
            let mut chars = s.chars();
            chars.next();
            Ok(Value::string(chars.collect::<String>()))
        }
        other => Err(type_mismatch("a sequence", other.type_name())),
    }
}

/// Extend a sequence on the left.
fn cons(_interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect(args, 2)?;
    match (&args[0], &args[1]) {
        (head, Value::List(items)) => {
            let mut out = Vec::with_capacity(items.len() + 1);
            out.push(head.clone());
            out.extend(items.iter().cloned());
            Ok(Value::list(out))
        }
        (head, Value::Vector(items)) => {
            let mut out = Vec::with_capacity(items.len() + 1);
            out.push(head.clone());
            out.extend(items.iter().cloned());
            Ok(Value::vector(out))
        }
        (Value::Str(prefix), Value::Str(rest)) => {
            Ok(Value::string(format!("{}{}", **prefix, **rest)))
        }
        (Value::Map(overrides), Value::Map(base)) => {
            let mut out = (**base).clone();
            for (k, v) in overrides.iter() {
                out.insert(k.clone(), v.clone());
            }
            Ok(Value::map(out))
        }
        (_, other) => Err(type_mismatch("a sequence", other.type_name())),
    }
}

fn append(_interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect(args, 2)?;
    match (&args[0], &args[1]) {
        (Value::List(a), Value::List(b)) => {
            Ok(Value::list(a.iter().chain(b.iter()).cloned().collect()))
        }
        (Value::Vector(a), Value::Vector(b)) => {
            Ok(Value::vector(a.iter().chain(b.iter()).cloned().collect()))
        }
        (Value::Str(a), Value::Str(b)) => Ok(Value::string(format!("{}{}", **a, **b))),
        (a, b) => Err(type_mismatch(
            "two sequences of the same kind",
            &format!("{} and {}", a.type_name(), b.type_name()),
        )),
    }
}

fn len(_interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect(args, 1)?;
    let count = match &args[0] {
        Value::List(items) | Value::Vector(items) => items.len(),
        Value::Map(entries) => entries.len(),
        Value::Str(s) => s.chars().count(),
        other => return Err(type_mismatch("a sequence or map", other.type_name())),
    };
    Ok(Value::Int(i64::try_from(count).unwrap_or(i64::MAX)))
}

fn list(_interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    Ok(Value::list(args.to_vec()))
}

fn vector(_interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    Ok(Value::vector(args.to_vec()))
}

/// Build a map from alternating keys and values.
fn dict(_interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    if args.len() % 2 != 0 {
        return Err(crate::errors::form_syntax(
            "dict takes alternating keys and values",
        ));
    }
    let mut entries = rustc_hash::FxHashMap::default();
    for pair in args.chunks_exact(2) {
        let key = MapKey::from_value(&pair[0]).ok_or_else(|| {
            type_mismatch("a hashable key", pair[0].type_name())
        })?;
        entries.insert(key, pair[1].clone());
    }
    Ok(Value::map(entries))
}

fn range(_interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    let ints: Vec<i64> = args
        .iter()
        .map(|arg| match arg {
            Value::Int(n) => Ok(*n),
            other => Err(type_mismatch("an int", other.type_name())),
        })
        .collect::<Result<_, _>>()?;
    let (start, stop, step) = match ints.as_slice() {
        [stop] => (0, *stop, 1),
        [start, stop] => (*start, *stop, 1),
        [start, stop, step] => (*start, *stop, *step),
        _ => return Err(arity_mismatch(3, args.len())),
    };
    if step == 0 {
        return Err(EvalError::new("range step must not be zero"));
    }
    let mut out = Vec::new();
    let mut current = start;
    while (step > 0 && current < stop) || (step < 0 && current > stop) {
        out.push(Value::Int(current));
        let Some(next) = current.checked_add(step) else {
            break;
        };
        current = next;
    }
    Ok(Value::list(out))
}

fn reverse(_interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect(args, 1)?;
    match &args[0] {
        Value::List(items) => Ok(Value::list(items.iter().rev().cloned().collect())),
        Value::Vector(items) => Ok(Value::vector(items.iter().rev().cloned().collect())),
        Value::Str(s) => Ok(Value::string(s.chars().rev().collect::<String>())),
        other => Err(type_mismatch("a sequence", other.type_name())),
    }
}

// Higher-order

fn apply(interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect(args, 2)?;
    let call_args: Vec<Value> = ValueIter::new(&args[1])?.collect();
    interp.apply(&args[0], &call_args)
}

fn map(interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect(args, 2)?;
    let mut out = Vec::new();
    for item in ValueIter::new(&args[1])? {
        out.push(interp.apply(&args[0], &[item])?);
    }
    Ok(rewrap_seq(&args[1], out))
}

fn filter(interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect(args, 2)?;
    let mut out = Vec::new();
    for item in ValueIter::new(&args[1])? {
        if interp.apply(&args[0], &[item.clone()])?.is_truthy() {
            out.push(item);
        }
    }
    Ok(rewrap_seq(&args[1], out))
}

/// Fold a sequence with a binary function from the left.
fn foldl(interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect(args, 3)?;
    let mut acc = args[1].clone();
    for item in ValueIter::new(&args[2])? {
        acc = interp.apply(&args[0], &[acc, item])?;
    }
    Ok(acc)
}

/// Fold a sequence with a binary function from the right.
fn foldr(interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect(args, 3)?;
    let items: Vec<Value> = ValueIter::new(&args[2])?.collect();
    let mut acc = args[1].clone();
    for item in items.into_iter().rev() {
        acc = interp.apply(&args[0], &[item, acc])?;
    }
    Ok(acc)
}

fn take_while(interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect(args, 2)?;
    let mut out = Vec::new();
    for item in ValueIter::new(&args[1])? {
        if !interp.apply(&args[0], &[item.clone()])?.is_truthy() {
            break;
        }
        out.push(item);
    }
    Ok(rewrap_seq(&args[1], out))
}

fn drop_while(interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect(args, 2)?;
    let mut out = Vec::new();
    let mut dropping = true;
    for item in ValueIter::new(&args[1])? {
        if dropping && interp.apply(&args[0], &[item.clone()])?.is_truthy() {
            continue;
        }
        dropping = false;
        out.push(item);
    }
    Ok(rewrap_seq(&args[1], out))
}

/// Results of sequence transforms keep the input's kind.
fn rewrap_seq(input: &Value, items: Vec<Value>) -> Value {
    match input {
        Value::Vector(_) => Value::vector(items),
        _ => Value::list(items),
    }
}

// Predicates

fn is_null(_interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect(args, 1)?;
    let null = match &args[0] {
        Value::Nil => true,
        Value::List(items) => items.is_empty(),
        _ => false,
    };
    Ok(Value::Bool(null))
}

/// Identity comparison; heap values compare by reference.
fn is_eq(_interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect(args, 2)?;
    use crate::value::Heap;
    let identical = match (&args[0], &args[1]) {
        (Value::Str(a), Value::Str(b)) => Heap::ptr_eq(a, b),
        (Value::List(a), Value::List(b)) | (Value::Vector(a), Value::Vector(b)) => {
            Heap::ptr_eq(a, b)
        }
        (Value::Map(a), Value::Map(b)) => Heap::ptr_eq(a, b),
        (a, b) => a == b,
    };
    Ok(Value::Bool(identical))
}

fn is_equal(_interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect(args, 2)?;
    Ok(Value::Bool(args[0] == args[1]))
}

fn is_callable(_interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect(args, 1)?;
    Ok(Value::Bool(args[0].is_callable()))
}

fn is_string(_interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect(args, 1)?;
    Ok(Value::Bool(matches!(args[0], Value::Str(_))))
}

fn is_symbol(_interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect(args, 1)?;
    Ok(Value::Bool(matches!(args[0], Value::Symbol(_))))
}

fn is_keyword(_interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect(args, 1)?;
    Ok(Value::Bool(matches!(args[0], Value::Keyword(_))))
}

fn is_list(_interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect(args, 1)?;
    Ok(Value::Bool(matches!(args[0], Value::List(_))))
}

fn is_vector(_interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect(args, 1)?;
    Ok(Value::Bool(matches!(args[0], Value::Vector(_))))
}

fn is_dict(_interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect(args, 1)?;
    Ok(Value::Bool(matches!(args[0], Value::Map(_))))
}

fn is_int(_interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect(args, 1)?;
    Ok(Value::Bool(matches!(args[0], Value::Int(_))))
}

fn is_float(_interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect(args, 1)?;
    Ok(Value::Bool(matches!(args[0], Value::Float(_))))
}

fn is_number(_interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect(args, 1)?;
    Ok(Value::Bool(matches!(
        args[0],
        Value::Int(_) | Value::Float(_)
    )))
}

// Conversions

fn to_str(interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect(args, 1)?;
    Ok(Value::string(
        args[0].display(interp.interner()).to_string(),
    ))
}

#[expect(clippy::cast_possible_truncation, reason = "float to int conversion truncates by definition")]
fn to_int(_interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect(args, 1)?;
    match &args[0] {
        Value::Int(n) => Ok(Value::Int(*n)),
        Value::Float(x) => Ok(Value::Int(*x as i64)),
        Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
        Value::Str(s) => parse_int(s),
        other => Err(type_mismatch("a number or numeric string", other.type_name())),
    }
}

/// Parse an integer string, honoring `0b`/`0o`/`0x` prefixes.
fn parse_int(s: &str) -> NativeResult {
    let trimmed = s.trim();
    let (digits, radix) = match trimmed.get(..2) {
        Some("0b") => (&trimmed[2..], 2),
        Some("0o") => (&trimmed[2..], 8),
        Some("0x") => (&trimmed[2..], 16),
        _ => (trimmed, 10),
    };
    i64::from_str_radix(digits, radix)
        .map(Value::Int)
        .map_err(|_| EvalError::new(format!("cannot convert {trimmed:?} to int")))
}

fn to_float(_interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect(args, 1)?;
    match &args[0] {
        Value::Int(n) => Ok(Value::Float(Num::Int(*n).as_f64())),
        Value::Float(x) => Ok(Value::Float(*x)),
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| EvalError::new(format!("cannot convert {:?} to float", s.trim()))),
        other => Err(type_mismatch("a number or numeric string", other.type_name())),
    }
}

// Output and introspection

/// Print the space-joined display of the arguments, with a newline.
fn print(interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    let text = joined_display(interp, args);
    interp.print_handler().println(&text);
    Ok(Value::Nil)
}

/// Like `print`, without the trailing newline.
fn display(interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    let text = joined_display(interp, args);
    interp.print_handler().print(&text);
    Ok(Value::Nil)
}

fn joined_display(interp: &Interpreter, args: &[Value]) -> String {
    args.iter()
        .map(|arg| arg.display(interp.interner()).to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// The docstring of a function, or nil.
fn doc(_interp: &mut Interpreter, args: &[Value]) -> NativeResult {
    expect(args, 1)?;
    match &args[0] {
        Value::Closure(c) => Ok(c
            .doc
            .as_ref()
            .map_or(Value::Nil, |d| Value::string(d.clone()))),
        _ => Ok(Value::Nil),
    }
}
