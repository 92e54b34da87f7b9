//! The read-eval-print loop.
//!
//! Lines are buffered until the Reader stops reporting unbalanced input, so
//! multi-line forms can be typed naturally. The global environment persists
//! across lines; `quit` or end-of-input leaves the loop.

use std::io::{self, BufRead, Write};

use rill_ir::SharedInterner;
use rill_eval::{Interpreter, Value};
use rill_reader::read;

const PROMPT: &str = "rill> ";
const CONTINUATION: &str = "....> ";

/// Run the interactive loop over stdin/stdout.
pub fn run() {
    println!("Rill {} - a little LISP for data pipelines", env!("CARGO_PKG_VERSION"));
    println!("Type `quit` or Ctrl-D to exit.\n");

    let interner = SharedInterner::new();
    let mut interp = Interpreter::builder().interner(interner.clone()).build();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut buffer = String::new();

    loop {
        let prompt = if buffer.is_empty() { PROMPT } else { CONTINUATION };
        print!("{prompt}");
        let _ = io::stdout().flush();

        let Some(Ok(line)) = lines.next() else {
            println!("\nBye!");
            return;
        };

        if buffer.is_empty() && line.trim() == "quit" {
            println!("Bye!");
            return;
        }

        buffer.push_str(&line);
        buffer.push('\n');

        let forms = match read(&buffer, &interner) {
            Ok(forms) => forms,
            // Unbalanced means "need more input": keep the buffer and ask
            // for another line.
            Err(err) if err.is_unbalanced() => continue,
            Err(err) => {
                println!("SyntaxError: {}", err.message);
                buffer.clear();
                continue;
            }
        };
        buffer.clear();

        for form in &forms {
            let globals = interp.globals().clone();
            match interp.eval(form, &globals) {
                Ok(Value::Nil) => {}
                Ok(value) => println!("=> {}", value.display(&interner)),
                Err(err) => {
                    println!("{}: {}", err.kind.name(), err.message);
                    break;
                }
            }
        }
    }
}
