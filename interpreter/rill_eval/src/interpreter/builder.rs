//! Interpreter construction.

use rill_ir::SharedInterner;

use super::Interpreter;
use crate::print_handler::{stdout_handler, SharedPrintHandler};

/// Builder for `Interpreter`.
///
/// Lets embedders share an interner with the Reader and swap the print
/// handler (tests use a buffer handler to observe output).
#[derive(Default)]
pub struct InterpreterBuilder {
    interner: Option<SharedInterner>,
    print: Option<SharedPrintHandler>,
}

impl InterpreterBuilder {
    /// Use an existing interner instead of a fresh one.
    ///
    /// Required when expressions were read with a separate interner: names
    /// only compare equal within one interner.
    #[must_use]
    pub fn interner(mut self, interner: SharedInterner) -> Self {
        self.interner = Some(interner);
        self
    }

    /// Route `print` output through the given handler.
    #[must_use]
    pub fn print_handler(mut self, print: SharedPrintHandler) -> Self {
        self.print = Some(print);
        self
    }

    /// Build the interpreter with the builtin registry installed.
    pub fn build(self) -> Interpreter {
        let interner = self.interner.unwrap_or_default();
        let print = self.print.unwrap_or_else(stdout_handler);
        Interpreter::from_parts(interner, print)
    }
}
