//! Comparison operations: <, <=, >, >=, =, eq?, equal?
//!
//! The ordering predicates are variadic and chain-compare: `(< a b c)` is
//! true iff `a < b` and `b < c`.

use super::def;
use crate::env::Environment;
use crate::error::{ErrorKind, Interpreter};
use crate::value::Value;
use std::rc::Rc;

fn chain_compare(interp: &Interpreter, name: &str, args: &[Value], ok: impl Fn(std::cmp::Ordering) -> bool) -> Value {
    if args.len() < 2 {
        interp.report(ErrorKind::InvalidArgument, format!("{name}: expected at least 2 arguments"));
        return Value::Bool(false);
    }
    for pair in args.windows(2) {
        let (a, b) = match (&pair[0], &pair[1]) {
            (Value::Num(a), Value::Num(b)) => (a, b),
            (other_a, other_b) => {
                let bad = if matches!(other_a, Value::Num(_)) { other_b } else { other_a };
                interp.report(ErrorKind::TypeError, format!("{name}: expected a number, got {}", bad.type_name()));
                return Value::Bool(false);
            }
        };
        if !ok(a.cmp(b)) {
            return Value::Bool(false);
        }
    }
    Value::Bool(true)
}

pub fn builtin_lt(interp: &Interpreter, args: &[Value]) -> Value {
    chain_compare(interp, "<", args, |o| o == std::cmp::Ordering::Less)
}

pub fn builtin_gt(interp: &Interpreter, args: &[Value]) -> Value {
    chain_compare(interp, ">", args, |o| o == std::cmp::Ordering::Greater)
}

pub fn builtin_le(interp: &Interpreter, args: &[Value]) -> Value {
    chain_compare(interp, "<=", args, |o| o != std::cmp::Ordering::Greater)
}

pub fn builtin_ge(interp: &Interpreter, args: &[Value]) -> Value {
    chain_compare(interp, ">=", args, |o| o != std::cmp::Ordering::Less)
}

/// Numeric equality chain; reports a type error on a non-number operand.
pub fn builtin_num_eq(interp: &Interpreter, args: &[Value]) -> Value {
    chain_compare(interp, "=", args, |o| o == std::cmp::Ordering::Equal)
}

/// Identity comparison: for atoms this coincides with `equal?`; pairs are
/// never `eq?` to a distinct pair since values are deep-copied (spec.md
/// §3/§8, no two live values alias substructure).
pub fn builtin_eq_p(_interp: &Interpreter, args: &[Value]) -> Value {
    if args.len() != 2 {
        return Value::Bool(false);
    }
    let same = match (&args[0], &args[1]) {
        (Value::Pair(..), Value::Pair(..)) => false,
        (a, b) => a.structural_eq(b),
    };
    Value::Bool(same)
}

pub fn builtin_equal_p(_interp: &Interpreter, args: &[Value]) -> Value {
    if args.len() != 2 {
        return Value::Bool(false);
    }
    Value::Bool(args[0].structural_eq(&args[1]))
}

pub fn register(env: &Rc<Environment>) {
    def(env, "<", builtin_lt);
    def(env, ">", builtin_gt);
    def(env, "<=", builtin_le);
    def(env, ">=", builtin_ge);
    def(env, "=", builtin_num_eq);
    def(env, "eq?", builtin_eq_p);
    def(env, "equal?", builtin_equal_p);
}
