//! Type predicates: null?, integer?, number?, string?, symbol?, boolean?,
//! pair?, function?, procedure?, list?, atom?, builtin?, error?
//!
//! `defined?` is also a predicate but lives in `eval.rs` as a special form:
//! it inspects the *name* without evaluating it, which a plain builtin
//! (whose arguments already arrived evaluated) cannot do.

use super::def;
use crate::env::Environment;
use crate::error::Interpreter;
use crate::value::{Function, Value};
use std::rc::Rc;

fn one(interp: &Interpreter, name: &str, args: &[Value]) -> Option<&Value> {
    if args.len() != 1 {
        interp.report(crate::error::ErrorKind::InvalidArgument, format!("{name}: expected exactly 1 argument"));
        return None;
    }
    Some(&args[0])
}

pub fn builtin_null_p(interp: &Interpreter, args: &[Value]) -> Value {
    match one(interp, "null?", args) {
        Some(v) => Value::Bool(v.is_nil()),
        None => Value::Bool(false),
    }
}

pub fn builtin_integer_p(interp: &Interpreter, args: &[Value]) -> Value {
    match one(interp, "integer?", args) {
        Some(Value::Num(n)) => Value::Bool(n.is_integer()),
        Some(_) => Value::Bool(false),
        None => Value::Bool(false),
    }
}

pub fn builtin_number_p(interp: &Interpreter, args: &[Value]) -> Value {
    match one(interp, "number?", args) {
        Some(v) => Value::Bool(matches!(v, Value::Num(_))),
        None => Value::Bool(false),
    }
}

pub fn builtin_string_p(interp: &Interpreter, args: &[Value]) -> Value {
    match one(interp, "string?", args) {
        Some(v) => Value::Bool(matches!(v, Value::Str(_))),
        None => Value::Bool(false),
    }
}

pub fn builtin_symbol_p(interp: &Interpreter, args: &[Value]) -> Value {
    match one(interp, "symbol?", args) {
        Some(v) => Value::Bool(matches!(v, Value::Sym(_))),
        None => Value::Bool(false),
    }
}

pub fn builtin_boolean_p(interp: &Interpreter, args: &[Value]) -> Value {
    match one(interp, "boolean?", args) {
        Some(v) => Value::Bool(matches!(v, Value::Bool(_))),
        None => Value::Bool(false),
    }
}

pub fn builtin_pair_p(interp: &Interpreter, args: &[Value]) -> Value {
    match one(interp, "pair?", args) {
        Some(v) => Value::Bool(matches!(v, Value::Pair(..))),
        None => Value::Bool(false),
    }
}

pub fn builtin_function_p(interp: &Interpreter, args: &[Value]) -> Value {
    match one(interp, "function?", args) {
        Some(v) => Value::Bool(matches!(v, Value::Func(_))),
        None => Value::Bool(false),
    }
}

pub fn builtin_list_p(interp: &Interpreter, args: &[Value]) -> Value {
    match one(interp, "list?", args) {
        Some(v) => Value::Bool(v.is_proper_list()),
        None => Value::Bool(false),
    }
}

/// An atom is anything that isn't a pair: symbols, numbers, strings,
/// booleans, nil, functions, errors.
pub fn builtin_atom_p(interp: &Interpreter, args: &[Value]) -> Value {
    match one(interp, "atom?", args) {
        Some(v) => Value::Bool(!matches!(v, Value::Pair(..))),
        None => Value::Bool(false),
    }
}

pub fn builtin_builtin_p(interp: &Interpreter, args: &[Value]) -> Value {
    match one(interp, "builtin?", args) {
        Some(v) => Value::Bool(matches!(v, Value::Func(Function::Builtin(..)))),
        None => Value::Bool(false),
    }
}

pub fn builtin_error_p(interp: &Interpreter, args: &[Value]) -> Value {
    match one(interp, "error?", args) {
        Some(v) => Value::Bool(matches!(v, Value::Err(_))),
        None => Value::Bool(false),
    }
}

pub fn register(env: &Rc<Environment>) {
    def(env, "null?", builtin_null_p);
    def(env, "integer?", builtin_integer_p);
    def(env, "number?", builtin_number_p);
    def(env, "string?", builtin_string_p);
    def(env, "symbol?", builtin_symbol_p);
    def(env, "boolean?", builtin_boolean_p);
    def(env, "pair?", builtin_pair_p);
    def(env, "function?", builtin_function_p);
    def(env, "procedure?", builtin_function_p);
    def(env, "list?", builtin_list_p);
    def(env, "atom?", builtin_atom_p);
    def(env, "builtin?", builtin_builtin_p);
    def(env, "error?", builtin_error_p);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::num::Rational;

    fn interp() -> Interpreter {
        Interpreter::with_sink(|_, _| {})
    }

    #[test]
    fn test_number_and_integer_predicates() {
        let interp = interp();
        let whole = Value::Num(Rational::from_int(4));
        let frac = Value::Num(Rational::parse_literal("1/2").unwrap());
        assert!(matches!(builtin_number_p(&interp, &[whole.clone()]), Value::Bool(true)));
        assert!(matches!(builtin_integer_p(&interp, &[whole]), Value::Bool(true)));
        assert!(matches!(builtin_integer_p(&interp, &[frac]), Value::Bool(false)));
    }

    #[test]
    fn test_list_p_accepts_nil_and_proper_lists() {
        let interp = interp();
        assert!(matches!(builtin_list_p(&interp, &[Value::Nil]), Value::Bool(true)));
        let proper = Value::from_vec(vec![Value::Num(Rational::from_int(1))]);
        assert!(matches!(builtin_list_p(&interp, &[proper]), Value::Bool(true)));
        let dotted = Value::cons(Value::Num(Rational::from_int(1)), Value::Num(Rational::from_int(2)));
        assert!(matches!(builtin_list_p(&interp, &[dotted]), Value::Bool(false)));
    }

    #[test]
    fn test_atom_p_excludes_only_pairs() {
        let interp = interp();
        assert!(matches!(builtin_atom_p(&interp, &[Value::Nil]), Value::Bool(true)));
        let pair = Value::cons(Value::Bool(true), Value::Bool(false));
        assert!(matches!(builtin_atom_p(&interp, &[pair]), Value::Bool(false)));
    }

    #[test]
    fn test_error_p() {
        let interp = interp();
        assert!(matches!(builtin_error_p(&interp, &[Value::Err("oops".into())]), Value::Bool(true)));
        assert!(matches!(builtin_error_p(&interp, &[Value::Nil]), Value::Bool(false)));
    }
}
