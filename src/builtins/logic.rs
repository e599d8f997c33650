//! Logic: `not`.
//!
//! `and`/`or` are special forms (see `eval::dispatch_special_form`) since
//! their short-circuit semantics need unevaluated argument expressions, not
//! a builtin's already-evaluated `&[Value]`.

use super::def;
use crate::env::Environment;
use crate::error::{ErrorKind, Interpreter};
use crate::value::Value;
use std::rc::Rc;

/// Only `Bool(false)` is falsy; everything else, including `Nil`, is
/// truthy (spec.md §9 — the richer of the source's two divergent rules).
pub fn builtin_not(interp: &Interpreter, args: &[Value]) -> Value {
    if args.len() != 1 {
        interp.report(ErrorKind::InvalidArgument, "not: expected exactly 1 argument");
        return Value::Bool(false);
    }
    Value::Bool(!args[0].is_truthy())
}

pub fn register(env: &Rc<Environment>) {
    def(env, "not", builtin_not);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_inverts_truthiness() {
        let interp = Interpreter::with_sink(|_, _| {});
        assert!(matches!(builtin_not(&interp, &[Value::Bool(false)]), Value::Bool(true)));
        assert!(matches!(builtin_not(&interp, &[Value::Nil]), Value::Bool(false)));
    }
}
