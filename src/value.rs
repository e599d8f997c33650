// ABOUTME: Value types representing Lisp data structures and expressions

use crate::env::Environment;
use crate::num::Rational;
use std::fmt;
use std::rc::Rc;

/// A tagged union of every runtime value. Values have *value semantics*:
/// cloning a `Value` deep-copies it (a `Pair` owns its `car`/`cdr`
/// exclusively), so no two live values ever alias mutable substructure.
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Num(Rational),
    Str(String),
    Sym(String),
    Pair(Box<Value>, Box<Value>),
    Func(Function),
    Err(String),
}

/// A builtin reports malformed input on the interpreter's error channel
/// and returns a benign value rather than propagating a Rust `Result`,
/// matching the evaluator's report-and-continue error-flow model.
pub type BuiltinFn = fn(&crate::error::Interpreter, &[Value]) -> Value;

#[derive(Clone)]
pub enum Function {
    Builtin(&'static str, BuiltinFn),
    Closure {
        params: Box<Value>,
        body: Box<Value>,
        env: EnvLink,
    },
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Function::Builtin(name, _) => write!(f, "Builtin({name})"),
            Function::Closure { params, body, .. } => {
                write!(f, "Closure({params:?} -> {body:?})")
            }
        }
    }
}

/// An environment reference held by a closure. Ordinarily strong; a
/// closure captured into the same environment it is being bound into
/// (self-recursive `define`, named `let`) is downgraded to `Weak` so the
/// environment's reference count can reach zero and the frame can be
/// freed deterministically — see `Environment::bind_closure`.
#[derive(Clone)]
pub enum EnvLink {
    Strong(Rc<Environment>),
    Weak(std::rc::Weak<Environment>),
}

impl EnvLink {
    pub fn strong(env: Rc<Environment>) -> Self {
        EnvLink::Strong(env)
    }

    /// Materializes a usable `Rc<Environment>`, upgrading a weak link.
    /// `None` only if the environment has already been collected, which
    /// cannot happen while the closure holding this link is itself
    /// reachable.
    pub fn get(&self) -> Option<Rc<Environment>> {
        match self {
            EnvLink::Strong(rc) => Some(rc.clone()),
            EnvLink::Weak(weak) => weak.upgrade(),
        }
    }
}

impl fmt::Debug for EnvLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvLink::Strong(_) => write!(f, "Strong(..)"),
            EnvLink::Weak(_) => write!(f, "Weak(..)"),
        }
    }
}

impl Value {
    pub fn cons(car: Value, cdr: Value) -> Value {
        Value::Pair(Box::new(car), Box::new(cdr))
    }

    pub fn from_vec(items: Vec<Value>) -> Value {
        items
            .into_iter()
            .rev()
            .fold(Value::Nil, |tail, item| Value::cons(item, tail))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// `Bool(false)` is the only falsy value; `Nil` is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Bool(false))
    }

    pub fn type_name(&self) -> String {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "boolean",
            Value::Num(_) => "number",
            Value::Str(_) => "string",
            Value::Sym(_) => "symbol",
            Value::Pair(..) => "pair",
            Value::Func(Function::Builtin(..)) => "builtin",
            Value::Func(Function::Closure { .. }) => "lambda",
            Value::Err(_) => "error",
        }
        .to_string()
    }

    /// Walks the cdr-chain; `true` iff it ends in `Nil`.
    pub fn is_proper_list(&self) -> bool {
        let mut cur = self;
        loop {
            match cur {
                Value::Nil => return true,
                Value::Pair(_, cdr) => cur = cdr,
                _ => return false,
            }
        }
    }

    /// Collects a proper list's elements; `None` if the tail isn't `Nil`.
    pub fn list_elements(&self) -> Option<Vec<Value>> {
        let mut out = Vec::new();
        let mut cur = self;
        loop {
            match cur {
                Value::Nil => return Some(out),
                Value::Pair(car, cdr) => {
                    out.push((**car).clone());
                    cur = cdr;
                }
                _ => return None,
            }
        }
    }

    /// Structural equality, recursive over pairs. Functions are never
    /// equal to anything, even themselves, in this by-value language.
    pub fn structural_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Num(a), Value::Num(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Sym(a), Value::Sym(b)) => a == b,
            (Value::Err(a), Value::Err(b)) => a == b,
            (Value::Pair(a1, a2), Value::Pair(b1, b2)) => {
                a1.structural_eq(b1) && a2.structural_eq(b2)
            }
            _ => false,
        }
    }

    /// Walks a proper-list prefix and reverses it; a dotted tail is
    /// silently dropped, matching the original's behavior.
    pub fn reverse_list(&self) -> Value {
        let mut out = Value::Nil;
        let mut cur = self;
        loop {
            match cur {
                Value::Pair(car, cdr) => {
                    out = Value::cons((**car).clone(), out);
                    cur = cdr;
                }
                _ => break,
            }
        }
        out
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "()"),
            Value::Bool(b) => write!(f, "{}", if *b { "#t" } else { "#f" }),
            Value::Num(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "\"{s}\""),
            Value::Sym(s) => write!(f, "{s}"),
            Value::Pair(car, cdr) => {
                write!(f, "({car}")?;
                let mut cur: &Value = cdr;
                loop {
                    match cur {
                        Value::Pair(next_car, next_cdr) => {
                            write!(f, " {next_car}")?;
                            cur = next_cdr;
                        }
                        Value::Nil => break,
                        other => {
                            write!(f, " . {other}")?;
                            break;
                        }
                    }
                }
                write!(f, ")")
            }
            Value::Func(Function::Builtin(name, _)) => write!(f, "#<builtin:{name}>"),
            Value::Func(Function::Closure { params, .. }) => write!(f, "#<lambda {params}>"),
            Value::Err(msg) => write!(f, "Error: {msg}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::num::Rational;

    fn n(i: i64) -> Value {
        Value::Num(Rational::from_int(i))
    }

    #[test]
    fn test_cons_car_cdr_roundtrip() {
        let p = Value::cons(n(1), n(2));
        match p {
            Value::Pair(car, cdr) => {
                assert!(matches!(*car, Value::Num(_)));
                assert!(matches!(*cdr, Value::Num(_)));
            }
            _ => panic!("expected pair"),
        }
    }

    #[test]
    fn test_display_list() {
        let list = Value::from_vec(vec![n(1), n(2), n(3)]);
        assert_eq!(format!("{list}"), "(1 2 3)");
    }

    #[test]
    fn test_display_dotted_pair() {
        let p = Value::cons(n(1), n(2));
        assert_eq!(format!("{p}"), "(1 . 2)");
    }

    #[test]
    fn test_display_nil_and_bool() {
        assert_eq!(format!("{}", Value::Nil), "()");
        assert_eq!(format!("{}", Value::Bool(true)), "#t");
        assert_eq!(format!("{}", Value::Bool(false)), "#f");
    }

    #[test]
    fn test_display_error_is_unwrapped() {
        assert_eq!(format!("{}", Value::Err("boom".to_string())), "Error: boom");
    }

    #[test]
    fn test_structural_equality() {
        let a = Value::from_vec(vec![Value::Sym("x".into()), n(2)]);
        let b = Value::from_vec(vec![Value::Sym("x".into()), n(2)]);
        assert!(a.structural_eq(&b));
    }

    #[test]
    fn test_reverse_drops_dotted_tail() {
        let dotted = Value::cons(n(1), Value::cons(n(2), n(3)));
        let reversed = dotted.reverse_list();
        assert_eq!(reversed.list_elements().unwrap().len(), 1);
    }

    #[test]
    fn test_is_proper_list() {
        let proper = Value::from_vec(vec![n(1)]);
        assert!(proper.is_proper_list());
        let dotted = Value::cons(n(1), n(2));
        assert!(!dotted.is_proper_list());
    }

    #[test]
    fn test_falsiness() {
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Nil.is_truthy());
        assert!(n(0).is_truthy());
    }
}
