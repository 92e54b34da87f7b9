//! Rill IR - interned names, spans, and the expression tree.
//!
//! This crate holds everything the Reader produces and the evaluator
//! consumes:
//!
//! - `Name` / `StringInterner`: interned symbol and keyword names
//! - `Span`: byte ranges for reader diagnostics
//! - `Expr`: the immutable s-expression tree

mod expr;
mod interner;
mod span;

pub use expr::{Expr, ExprDisplay};
pub use interner::{SharedInterner, StringInterner, StringLookup};
pub use span::Span;

/// An interned name.
///
/// Equality and hashing are by index, so two `Name`s produced by the same
/// interner compare equal exactly when their strings do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(u32);

impl Name {
    /// The pre-interned empty string.
    pub const EMPTY: Name = Name(0);

    /// Construct a `Name` from a raw index.
    ///
    /// Only meaningful for names handed out by an interner; exposed for
    /// tests that need placeholder names.
    #[inline]
    pub fn from_raw(raw: u32) -> Self {
        Name(raw)
    }

    /// The raw index of this name.
    #[inline]
    pub fn as_raw(self) -> u32 {
        self.0
    }
}
