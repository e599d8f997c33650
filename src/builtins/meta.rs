//! Reflective operations on callables: `apply`.
//!
//! `eval`, `env-symbols`, `env-describe`, `load-file`, and `save-environment`
//! all need the lexical environment or sandbox at the call site, so they're
//! dispatched as special forms in `eval.rs` instead of living here. `apply`
//! only ever invokes an already-evaluated callable against an
//! already-constructed argument list, so it needs neither.

use super::def;
use crate::env::Environment;
use crate::error::{ErrorKind, Interpreter};
use crate::eval::apply_callable;
use crate::value::Value;
use std::rc::Rc;

pub fn builtin_apply(interp: &Interpreter, args: &[Value]) -> Value {
    if args.len() != 2 {
        interp.report(ErrorKind::InvalidArgument, "apply: expected exactly 2 arguments");
        return Value::Nil;
    }
    let call_args = match args[1].list_elements() {
        Some(v) => v,
        None => {
            interp.report(ErrorKind::TypeError, "apply: second argument must be a proper list");
            return Value::Nil;
        }
    };
    apply_callable(interp, &args[0], call_args)
}

pub fn register(env: &Rc<Environment>) {
    def(env, "apply", builtin_apply);
}
