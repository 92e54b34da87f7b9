//! Rill CLI
//!
//! Thin front end over the Reader and the evaluator: an interactive REPL,
//! a file runner, and a one-shot expression evaluator. The core does all
//! the work; this binary only shuttles text in and values out.

mod repl;
mod report;

use rill_ir::SharedInterner;
use rill_eval::Interpreter;
use rill_reader::read;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(String::as_str) {
        None | Some("repl") => repl::run(),
        Some("run") => {
            let Some(path) = args.get(2) else {
                eprintln!("Usage: rill run <file.rl>");
                std::process::exit(1);
            };
            run_file(path);
        }
        Some("eval") => {
            let Some(source) = args.get(2) else {
                eprintln!("Usage: rill eval <expression>");
                std::process::exit(1);
            };
            eval_once(source);
        }
        Some("--version" | "version") => {
            println!("rill {}", env!("CARGO_PKG_VERSION"));
        }
        Some(other) => {
            eprintln!("Unknown command: {other}");
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!("Usage: rill [command]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  repl              Start the interactive REPL (default)");
    eprintln!("  run <file.rl>     Evaluate a script file");
    eprintln!("  eval <expr>       Evaluate one expression and print it");
    eprintln!("  --version         Print the version");
}

/// Evaluate every top-level form in a file.
fn run_file(path: &str) {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: cannot read {path}: {err}");
            std::process::exit(1);
        }
    };

    let interner = SharedInterner::new();
    let forms = match read(&source, &interner) {
        Ok(forms) => forms,
        Err(err) => {
            report::render_read_error(path, &source, &err);
            std::process::exit(1);
        }
    };

    let mut interp = Interpreter::builder().interner(interner).build();
    if let Err(err) = interp.eval_program(&forms) {
        eprintln!("{}: {}", err.kind.name(), err.message);
        std::process::exit(1);
    }
}

/// Evaluate a one-shot expression string and print its value.
fn eval_once(source: &str) {
    let interner = SharedInterner::new();
    let forms = match read(source, &interner) {
        Ok(forms) => forms,
        Err(err) => {
            eprintln!("SyntaxError: {}", err.message);
            std::process::exit(1);
        }
    };

    let mut interp = Interpreter::builder().interner(interner.clone()).build();
    match interp.eval_program(&forms) {
        Ok(value) => {
            if value != rill_eval::Value::Nil {
                println!("{}", value.display(&interner));
            }
        }
        Err(err) => {
            eprintln!("{}: {}", err.kind.name(), err.message);
            std::process::exit(1);
        }
    }
}
