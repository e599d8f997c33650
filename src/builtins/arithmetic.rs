//! Arithmetic operations: +, -, *, /, %, modulo, remainder, expt, numerator,
//! denominator, sign, factor
//!
//! All numeric builtins operate on exact rationals (`Value::Num`); a
//! non-number argument reports a type error and yields `Num(0)`.

use super::def;
use crate::env::Environment;
use crate::error::{ErrorKind, Interpreter};
use crate::num::Rational;
use crate::value::Value;
use std::rc::Rc;

fn as_num(interp: &Interpreter, v: &Value) -> Option<Rational> {
    match v {
        Value::Num(n) => Some(n.clone()),
        other => {
            interp.report(ErrorKind::TypeError, format!("expected a number, got {}", other.type_name()));
            None
        }
    }
}

fn nums(interp: &Interpreter, args: &[Value]) -> Option<Vec<Rational>> {
    args.iter().map(|v| as_num(interp, v)).collect()
}

pub fn builtin_add(interp: &Interpreter, args: &[Value]) -> Value {
    match nums(interp, args) {
        Some(ns) => Value::Num(ns.iter().fold(Rational::zero(), |acc, n| acc.add(n))),
        None => Value::Num(Rational::zero()),
    }
}

pub fn builtin_sub(interp: &Interpreter, args: &[Value]) -> Value {
    let ns = match nums(interp, args) {
        Some(ns) => ns,
        None => return Value::Num(Rational::zero()),
    };
    if ns.is_empty() {
        interp.report(ErrorKind::InvalidArgument, "-: expected at least 1 argument");
        return Value::Num(Rational::zero());
    }
    if ns.len() == 1 {
        return Value::Num(ns[0].negate());
    }
    Value::Num(ns[1..].iter().fold(ns[0].clone(), |acc, n| acc.sub(n)))
}

pub fn builtin_mul(interp: &Interpreter, args: &[Value]) -> Value {
    match nums(interp, args) {
        Some(ns) => Value::Num(ns.iter().fold(Rational::from_int(1), |acc, n| acc.mul(n))),
        None => Value::Num(Rational::zero()),
    }
}

pub fn builtin_div(interp: &Interpreter, args: &[Value]) -> Value {
    let ns = match nums(interp, args) {
        Some(ns) => ns,
        None => return Value::Num(Rational::zero()),
    };
    if ns.is_empty() {
        interp.report(ErrorKind::InvalidArgument, "/: expected at least 1 argument");
        return Value::Num(Rational::zero());
    }
    let mut iter = ns.into_iter();
    let first = iter.next().unwrap();
    let rest: Vec<Rational> = iter.collect();
    if rest.is_empty() {
        return match Rational::from_int(1).div(&first) {
            Ok(r) => Value::Num(r),
            Err(_) => {
                interp.report(ErrorKind::DivisionByZero, "/: division by zero");
                Value::Num(Rational::zero())
            }
        };
    }
    let mut acc = first;
    for n in rest {
        match acc.div(&n) {
            Ok(r) => acc = r,
            Err(_) => {
                interp.report(ErrorKind::DivisionByZero, "/: division by zero");
                return Value::Num(Rational::zero());
            }
        }
    }
    Value::Num(acc)
}

pub fn builtin_mod(interp: &Interpreter, args: &[Value]) -> Value {
    binary_int_op(interp, args, "%", |a, b| a.modulo(b))
}

pub fn builtin_modulo(interp: &Interpreter, args: &[Value]) -> Value {
    binary_int_op(interp, args, "modulo", |a, b| a.modulo(b))
}

pub fn builtin_remainder(interp: &Interpreter, args: &[Value]) -> Value {
    binary_int_op(interp, args, "remainder", |a, b| a.remainder(b))
}

fn binary_int_op(
    interp: &Interpreter,
    args: &[Value],
    name: &str,
    op: impl FnOnce(&Rational, &Rational) -> Result<Rational, crate::num::NumError>,
) -> Value {
    if args.len() != 2 {
        interp.report(ErrorKind::InvalidArgument, format!("{name}: expected exactly 2 arguments"));
        return Value::Num(Rational::zero());
    }
    let (a, b) = match (as_num(interp, &args[0]), as_num(interp, &args[1])) {
        (Some(a), Some(b)) => (a, b),
        _ => return Value::Num(Rational::zero()),
    };
    match op(&a, &b) {
        Ok(r) => Value::Num(r),
        Err(crate::num::NumError::DivisionByZero) => {
            interp.report(ErrorKind::DivisionByZero, format!("{name}: division by zero"));
            Value::Num(Rational::zero())
        }
        Err(e) => {
            interp.report(ErrorKind::TypeError, format!("{name}: {e}"));
            Value::Num(Rational::zero())
        }
    }
}

pub fn builtin_expt(interp: &Interpreter, args: &[Value]) -> Value {
    if args.len() != 2 {
        interp.report(ErrorKind::InvalidArgument, "expt: expected exactly 2 arguments");
        return Value::Num(Rational::zero());
    }
    let (base, exp) = match (as_num(interp, &args[0]), as_num(interp, &args[1])) {
        (Some(a), Some(b)) => (a, b),
        _ => return Value::Num(Rational::zero()),
    };
    match base.pow(&exp) {
        Ok(r) => Value::Num(r),
        Err(e) => {
            interp.report(ErrorKind::InvalidArgument, format!("expt: {e}"));
            Value::Num(Rational::zero())
        }
    }
}

pub fn builtin_numerator(interp: &Interpreter, args: &[Value]) -> Value {
    if args.len() != 1 {
        interp.report(ErrorKind::InvalidArgument, "numerator: expected exactly 1 argument");
        return Value::Num(Rational::zero());
    }
    match as_num(interp, &args[0]) {
        Some(n) => Value::Num(Rational::from_bigint(n.numerator().clone())),
        None => Value::Num(Rational::zero()),
    }
}

pub fn builtin_denominator(interp: &Interpreter, args: &[Value]) -> Value {
    if args.len() != 1 {
        interp.report(ErrorKind::InvalidArgument, "denominator: expected exactly 1 argument");
        return Value::Num(Rational::zero());
    }
    match as_num(interp, &args[0]) {
        Some(n) => Value::Num(Rational::from_bigint(n.denominator().clone())),
        None => Value::Num(Rational::zero()),
    }
}

pub fn builtin_sign(interp: &Interpreter, args: &[Value]) -> Value {
    if args.len() != 1 {
        interp.report(ErrorKind::InvalidArgument, "sign: expected exactly 1 argument");
        return Value::Num(Rational::zero());
    }
    match as_num(interp, &args[0]) {
        Some(n) if n.is_positive() => Value::Num(Rational::from_int(1)),
        Some(n) if n.is_negative() => Value::Num(Rational::from_int(-1)),
        Some(_) => Value::Num(Rational::zero()),
        None => Value::Num(Rational::zero()),
    }
}

pub fn builtin_factor(interp: &Interpreter, args: &[Value]) -> Value {
    if args.len() != 1 {
        interp.report(ErrorKind::InvalidArgument, "factor: expected exactly 1 argument");
        return Value::Nil;
    }
    let n = match as_num(interp, &args[0]) {
        Some(n) => n,
        None => return Value::Nil,
    };
    match n.factor() {
        Ok(factors) => Value::from_vec(factors.into_iter().map(Value::Num).collect()),
        Err(e) => {
            interp.report(ErrorKind::TypeError, format!("factor: {e}"));
            Value::Nil
        }
    }
}

pub fn register(env: &Rc<Environment>) {
    def(env, "+", builtin_add);
    def(env, "-", builtin_sub);
    def(env, "*", builtin_mul);
    def(env, "/", builtin_div);
    def(env, "%", builtin_mod);
    def(env, "modulo", builtin_modulo);
    def(env, "remainder", builtin_remainder);
    def(env, "expt", builtin_expt);
    def(env, "numerator", builtin_numerator);
    def(env, "denominator", builtin_denominator);
    def(env, "sign", builtin_sign);
    def(env, "factor", builtin_factor);
}
