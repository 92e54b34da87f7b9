//! Reader error types.

use rill_ir::Span;

/// Category of a reader failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadErrorKind {
    /// Malformed input: bad token, stray delimiter, odd-length map literal.
    Syntax,
    /// Input ended before the form was complete (unclosed list or string).
    ///
    /// Recoverable: the REPL buffers more lines and re-reads.
    Unbalanced,
}

/// A reader failure with the byte range it was detected at.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ReadError {
    /// Failure category.
    pub kind: ReadErrorKind,
    /// Human-readable description.
    pub message: String,
    /// Where in the source the failure was detected.
    pub span: Span,
}

impl ReadError {
    /// A syntax error at `span`.
    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        ReadError {
            kind: ReadErrorKind::Syntax,
            message: message.into(),
            span,
        }
    }

    /// An unbalanced-input error at `span`.
    pub fn unbalanced(message: impl Into<String>, span: Span) -> Self {
        ReadError {
            kind: ReadErrorKind::Unbalanced,
            message: message.into(),
            span,
        }
    }

    /// Whether this error means "need more input" rather than "bad input".
    pub fn is_unbalanced(&self) -> bool {
        self.kind == ReadErrorKind::Unbalanced
    }
}
