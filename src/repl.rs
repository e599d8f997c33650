// ABOUTME: Interactive read-eval-print loop

use crate::config::{history_path, HISTORY_MAX_ENTRIES};
use crate::env::Environment;
use crate::error::Interpreter;
use crate::parser::parse;
use rustyline::error::ReadlineError;
use rustyline::{Config, Editor};
use std::rc::Rc;

/// Runs the interactive loop until EOF (Ctrl-D) or `(exit)`/`(quit)`.
/// Parse and evaluation errors are reported through `interp`'s sink and do
/// not stop the loop (spec.md §7 report-and-continue).
pub fn run(interp: &Interpreter, env: &Rc<Environment>) -> rustyline::Result<()> {
    let config = Config::builder()
        .auto_add_history(true)
        .max_history_size(HISTORY_MAX_ENTRIES)?
        .build();
    let mut rl: Editor<(), rustyline::history::DefaultHistory> = Editor::with_config(config)?;

    let history_file = history_path();
    if let Some(parent) = history_file.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let _ = rl.load_history(&history_file);

    println!("{}", crate::config::WELCOME_MESSAGE);
    println!("{}", crate::config::WELCOME_SUBTITLE);

    loop {
        match rl.readline("nada> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed == "(exit)" || trimmed == "(quit)" {
                    break;
                }
                match parse(trimmed) {
                    Ok(expr) => {
                        interp.clear();
                        let result = crate::eval::eval(interp, &expr, env);
                        if !interp.has_error() {
                            println!("=> {result}");
                        }
                    }
                    Err(e) => eprintln!("parse error: {e}"),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("readline error: {err}");
                break;
            }
        }
    }

    let _ = rl.save_history(&history_file);
    Ok(())
}
