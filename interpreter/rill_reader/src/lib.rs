//! Rill Reader - source text to expression trees.
//!
//! The Reader is purely functional over text: `read()` tokenizes and groups
//! source into `rill_ir::Expr` values and has no semantic knowledge of
//! special forms.
//!
//! # Unbalanced input
//!
//! Input that ends mid-form (an unclosed list, vector, map, or string
//! literal) fails with a `ReadError` of kind `Unbalanced`. That error is the
//! signal the REPL relies on to keep buffering lines before re-invoking the
//! Reader; every other reader error is a plain syntax failure.

mod error;
mod lexer;
mod parser;

pub use error::{ReadError, ReadErrorKind};
pub use lexer::{tokenize, Token, TokenKind};

use rill_ir::{Expr, StringInterner};

/// Read every top-level form in `src`.
pub fn read(src: &str, interner: &StringInterner) -> Result<Vec<Expr>, ReadError> {
    let tokens = tokenize(src, interner)?;
    parser::parse_program(&tokens, interner)
}

/// Read a single form from `src`.
///
/// Trailing content after the first complete form is a syntax error; this is
/// the entry point for one-shot `eval` strings.
pub fn read_one(src: &str, interner: &StringInterner) -> Result<Expr, ReadError> {
    let tokens = tokenize(src, interner)?;
    parser::parse_one(&tokens, interner)
}
