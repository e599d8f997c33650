//! Terminal I/O: display, read-line

use super::def;
use crate::env::Environment;
use crate::error::{ErrorKind, Interpreter};
use crate::value::Value;
use std::io::Write;
use std::rc::Rc;

/// Writes each argument to stdout, space-separated, with no trailing
/// newline; strings print without surrounding quotes. Returns `Nil`.
pub fn builtin_display(_interp: &Interpreter, args: &[Value]) -> Value {
    let mut stdout = std::io::stdout();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            let _ = write!(stdout, " ");
        }
        match arg {
            Value::Str(s) => {
                let _ = write!(stdout, "{s}");
            }
            other => {
                let _ = write!(stdout, "{other}");
            }
        }
    }
    let _ = stdout.flush();
    Value::Nil
}

/// Reads one line from stdin, without the trailing newline. `Nil` at EOF.
pub fn builtin_read_line(interp: &Interpreter, args: &[Value]) -> Value {
    if !args.is_empty() {
        interp.report(ErrorKind::InvalidArgument, "read-line: expected no arguments");
        return Value::Nil;
    }
    let mut line = String::new();
    match std::io::stdin().read_line(&mut line) {
        Ok(0) => Value::Nil,
        Ok(_) => Value::Str(line.trim_end_matches(['\n', '\r']).to_string()),
        Err(e) => {
            interp.report(ErrorKind::MemoryExhausted, format!("read-line: {e}"));
            Value::Nil
        }
    }
}

pub fn register(env: &Rc<Environment>) {
    def(env, "display", builtin_display);
    def(env, "read-line", builtin_read_line);
}
