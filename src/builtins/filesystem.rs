//! Sandboxed file I/O: read-file, write-file
//!
//! `load-file` and `save-environment` also touch the sandbox but need the
//! calling environment, so they're dispatched as special forms in
//! `eval.rs` rather than living here.

use super::{def, with_sandbox};
use crate::env::Environment;
use crate::error::{ErrorKind, Interpreter};
use crate::value::Value;
use std::rc::Rc;

fn as_str<'a>(interp: &Interpreter, name: &str, v: &'a Value) -> Option<&'a str> {
    match v {
        Value::Str(s) => Some(s.as_str()),
        other => {
            interp.report(ErrorKind::TypeError, format!("{name}: expected a string, got {}", other.type_name()));
            None
        }
    }
}

pub fn builtin_read_file(interp: &Interpreter, args: &[Value]) -> Value {
    if args.len() != 1 {
        interp.report(ErrorKind::InvalidArgument, "read-file: expected exactly 1 argument");
        return Value::Nil;
    }
    let path = match as_str(interp, "read-file", &args[0]) {
        Some(p) => p,
        None => return Value::Nil,
    };
    with_sandbox(|sandbox| match sandbox {
        Some(sandbox) => match sandbox.read_file(path) {
            Ok(contents) => Value::Str(contents),
            Err(e) => {
                interp.report(ErrorKind::InvalidArgument, format!("read-file: {e}"));
                Value::Nil
            }
        },
        None => {
            interp.report(ErrorKind::InvalidArgument, "read-file: sandbox not initialized");
            Value::Nil
        }
    })
}

pub fn builtin_write_file(interp: &Interpreter, args: &[Value]) -> Value {
    if args.len() != 2 {
        interp.report(ErrorKind::InvalidArgument, "write-file: expected exactly 2 arguments");
        return Value::Bool(false);
    }
    let (path, contents) = match (as_str(interp, "write-file", &args[0]), as_str(interp, "write-file", &args[1])) {
        (Some(p), Some(c)) => (p, c),
        _ => return Value::Bool(false),
    };
    with_sandbox(|sandbox| match sandbox {
        Some(sandbox) => match sandbox.write_file(path, contents) {
            Ok(()) => Value::Bool(true),
            Err(e) => {
                interp.report(ErrorKind::InvalidArgument, format!("write-file: {e}"));
                Value::Bool(false)
            }
        },
        None => {
            interp.report(ErrorKind::InvalidArgument, "write-file: sandbox not initialized");
            Value::Bool(false)
        }
    })
}

pub fn register(env: &Rc<Environment>) {
    def(env, "read-file", builtin_read_file);
    def(env, "write-file", builtin_write_file);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FsConfig;
    use crate::sandbox::Sandbox;
    use serial_test::serial;
    use std::fs;
    use std::path::PathBuf;

    fn with_test_sandbox(f: impl FnOnce()) {
        let test_dir = PathBuf::from("./test_filesystem_builtin_temp");
        let _ = fs::remove_dir_all(&test_dir);
        fs::create_dir_all(&test_dir).unwrap();
        let fs_config = FsConfig { allowed_paths: vec![test_dir.clone()], ..Default::default() };
        super::super::set_sandbox_storage(Sandbox::new(fs_config).unwrap());
        f();
        let _ = fs::remove_dir_all(&test_dir);
    }

    #[test]
    #[serial]
    fn test_write_then_read_file() {
        with_test_sandbox(|| {
            let interp = Interpreter::with_sink(|_, _| {});
            let ok = builtin_write_file(&interp, &[Value::Str("out.txt".into()), Value::Str("hello".into())]);
            assert!(matches!(ok, Value::Bool(true)));
            let contents = builtin_read_file(&interp, &[Value::Str("out.txt".into())]);
            assert!(matches!(contents, Value::Str(s) if s == "hello"));
        });
    }

    #[test]
    #[serial]
    fn test_read_missing_file_reports_error() {
        with_test_sandbox(|| {
            let interp = Interpreter::with_sink(|_, _| {});
            builtin_read_file(&interp, &[Value::Str("missing.txt".into())]);
            assert!(interp.has_error());
        });
    }
}
