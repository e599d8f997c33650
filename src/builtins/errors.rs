//! Error values: `error`, `error-msg`
//!
//! `error?` lives in `types.rs` alongside the other type predicates.

use super::def;
use crate::env::Environment;
use crate::error::{ErrorKind, Interpreter};
use crate::value::Value;
use std::rc::Rc;

/// Constructs an error value carrying `msg`. Doesn't report anything on
/// the interpreter's channel, just builds data; catching this value
/// (`error?`) is how callers distinguish it from a normal result.
pub fn builtin_error(interp: &Interpreter, args: &[Value]) -> Value {
    if args.len() != 1 {
        interp.report(ErrorKind::InvalidArgument, "error: expected exactly 1 argument");
        return Value::Err(String::new());
    }
    match &args[0] {
        Value::Str(s) => Value::Err(s.clone()),
        other => Value::Err(other.to_string()),
    }
}

pub fn builtin_error_msg(interp: &Interpreter, args: &[Value]) -> Value {
    if args.len() != 1 {
        interp.report(ErrorKind::InvalidArgument, "error-msg: expected exactly 1 argument");
        return Value::Str(String::new());
    }
    match &args[0] {
        Value::Err(msg) => Value::Str(msg.clone()),
        other => {
            interp.report(ErrorKind::TypeError, format!("error-msg: expected an error value, got {}", other.type_name()));
            Value::Str(String::new())
        }
    }
}

pub fn register(env: &Rc<Environment>) {
    def(env, "error", builtin_error);
    def(env, "error-msg", builtin_error_msg);
}
