//! Print handler for configurable output.
//!
//! `print` is the one side-effecting builtin, so its destination is
//! swappable: stdout for the CLI, a buffer for tests, silent for embedders
//! that want a pure evaluator.

use std::cell::RefCell;
use std::rc::Rc;

/// Print handler that writes to stdout (default).
#[derive(Default)]
pub struct StdoutPrintHandler;

/// Print handler that captures output to a buffer for assertions.
#[derive(Default)]
pub struct BufferPrintHandler {
    buffer: RefCell<String>,
}

impl BufferPrintHandler {
    /// Create a new buffer print handler.
    pub fn new() -> Self {
        BufferPrintHandler {
            buffer: RefCell::new(String::new()),
        }
    }
}

/// Print handler implementation using enum dispatch.
pub enum PrintHandlerImpl {
    /// Writes to stdout (default).
    Stdout(StdoutPrintHandler),
    /// Captures to a buffer (testing/embedding).
    Buffer(BufferPrintHandler),
    /// Discards all output silently.
    Silent,
}

impl PrintHandlerImpl {
    /// Print a line (with newline).
    pub fn println(&self, msg: &str) {
        match self {
            Self::Stdout(_) => println!("{msg}"),
            Self::Buffer(h) => {
                let mut buf = h.buffer.borrow_mut();
                buf.push_str(msg);
                buf.push('\n');
            }
            Self::Silent => {}
        }
    }

    /// Print without a newline.
    pub fn print(&self, msg: &str) {
        match self {
            Self::Stdout(_) => print!("{msg}"),
            Self::Buffer(h) => h.buffer.borrow_mut().push_str(msg),
            Self::Silent => {}
        }
    }

    /// Get all captured output.
    ///
    /// Returns an empty string for handlers that don't capture.
    pub fn get_output(&self) -> String {
        match self {
            Self::Buffer(h) => h.buffer.borrow().clone(),
            Self::Stdout(_) | Self::Silent => String::new(),
        }
    }

    /// Clear captured output.
    pub fn clear(&self) {
        if let Self::Buffer(h) = self {
            h.buffer.borrow_mut().clear();
        }
    }
}

/// Shared print handler handle.
///
/// `Rc`, not `Arc`: the evaluator is single-threaded by contract.
pub type SharedPrintHandler = Rc<PrintHandlerImpl>;

/// Create a stdout print handler.
pub fn stdout_handler() -> SharedPrintHandler {
    Rc::new(PrintHandlerImpl::Stdout(StdoutPrintHandler))
}

/// Create a buffer print handler for capturing output.
pub fn buffer_handler() -> SharedPrintHandler {
    Rc::new(PrintHandlerImpl::Buffer(BufferPrintHandler::new()))
}

/// Create a silent print handler that discards all output.
pub fn silent_handler() -> SharedPrintHandler {
    Rc::new(PrintHandlerImpl::Silent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_handler_captures_with_newline() {
        let handler = buffer_handler();
        handler.println("hello");
        assert_eq!(handler.get_output(), "hello\n");
    }

    #[test]
    fn buffer_handler_print_has_no_newline() {
        let handler = buffer_handler();
        handler.print("hello");
        handler.print(" world");
        assert_eq!(handler.get_output(), "hello world");
    }

    #[test]
    fn buffer_handler_clear_empties() {
        let handler = buffer_handler();
        handler.println("hello");
        handler.clear();
        assert!(handler.get_output().is_empty());
    }

    #[test]
    fn silent_handler_discards() {
        let handler = silent_handler();
        handler.println("hello");
        assert_eq!(handler.get_output(), "");
    }
}
