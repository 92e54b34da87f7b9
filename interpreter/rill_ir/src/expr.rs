//! The s-expression tree produced by the Reader.
//!
//! `Expr` is immutable once read: the evaluator walks it but never rewrites
//! it in place. Literal vectors and maps are distinct from call lists so the
//! evaluator can recognize comprehension sugar positionally.

use std::fmt;

use crate::{Name, StringLookup};

/// One expression as read from source text.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Integer literal (decimal or `0b`/`0o`/`0x`).
    Int(i64),
    /// Float literal.
    Float(f64),
    /// String literal.
    Str(String),
    /// `true` / `false`.
    Bool(bool),
    /// `nil` - the "no value" sentinel, distinct from the empty list.
    Nil,
    /// A symbol, resolved against the environment at evaluation time.
    Symbol(Name),
    /// A keyword `:name`; evaluates to itself.
    Keyword(Name),
    /// A parenthesized sequence: call, special form, or quoted list.
    List(Vec<Expr>),
    /// A `[...]` vector literal.
    Vector(Vec<Expr>),
    /// A `{...}` map literal, already grouped into pairs.
    ///
    /// A dict comprehension `{(for-in ...)}` is carried as a single pair of
    /// the `for-in` form and `Nil`; the evaluator expands it.
    Map(Vec<(Expr, Expr)>),
}

impl Expr {
    /// The head symbol of a list expression, if it has one.
    pub fn head_symbol(&self) -> Option<Name> {
        match self {
            Expr::List(items) => match items.first() {
                Some(Expr::Symbol(name)) => Some(*name),
                _ => None,
            },
            _ => None,
        }
    }

    /// Whether this is the empty list `()`.
    pub fn is_empty_list(&self) -> bool {
        matches!(self, Expr::List(items) if items.is_empty())
    }

    /// Wrap `self` for display through an interner.
    pub fn display<'a, L: StringLookup>(&'a self, lookup: &'a L) -> ExprDisplay<'a, L> {
        ExprDisplay { expr: self, lookup }
    }
}

/// Display adaptor pairing an expression with a name lookup.
pub struct ExprDisplay<'a, L: StringLookup> {
    expr: &'a Expr,
    lookup: &'a L,
}

impl<L: StringLookup> fmt::Display for ExprDisplay<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_expr(f, self.expr, self.lookup)
    }
}

fn write_expr<L: StringLookup>(f: &mut fmt::Formatter<'_>, expr: &Expr, lookup: &L) -> fmt::Result {
    match expr {
        Expr::Int(n) => write!(f, "{n}"),
        Expr::Float(x) => write!(f, "{x}"),
        Expr::Str(s) => write!(f, "\"{s}\""),
        Expr::Bool(b) => write!(f, "{b}"),
        Expr::Nil => write!(f, "nil"),
        Expr::Symbol(name) => write!(f, "{}", lookup.lookup(*name)),
        Expr::Keyword(name) => write!(f, ":{}", lookup.lookup(*name)),
        Expr::List(items) => write_seq(f, items, lookup, '(', ')'),
        Expr::Vector(items) => write_seq(f, items, lookup, '[', ']'),
        Expr::Map(pairs) => {
            write!(f, "{{")?;
            for (i, (k, v)) in pairs.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                write_expr(f, k, lookup)?;
                write!(f, " ")?;
                write_expr(f, v, lookup)?;
            }
            write!(f, "}}")
        }
    }
}

fn write_seq<L: StringLookup>(
    f: &mut fmt::Formatter<'_>,
    items: &[Expr],
    lookup: &L,
    open: char,
    close: char,
) -> fmt::Result {
    write!(f, "{open}")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write_expr(f, item, lookup)?;
    }
    write!(f, "{close}")
}
