// ABOUTME: Lexical environments: variable bindings, parent chains, self-capture handling

use crate::error::{ErrorKind, Interpreter};
use crate::value::{EnvLink, Function, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// Creates a new global environment with no parent.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    /// Creates a new child environment with a parent.
    pub fn with_parent(parent: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(parent),
        })
    }

    /// Defines or overwrites a binding in THIS scope (doesn't walk parent
    /// chain). If `value` is a closure that captures this very environment
    /// (a self-recursive `define` or named `let`), the captured link is
    /// downgraded to a weak reference so the cycle doesn't keep the frame
    /// alive forever.
    pub fn define(self: &Rc<Self>, name: String, value: Value) {
        let value = rebind_if_self_capture(self, value);
        self.bindings.borrow_mut().insert(name, value);
    }

    /// Looks up a symbol in this scope and parent scopes recursively,
    /// reporting `UndefinedSymbol` on the channel (subject to the
    /// interpreter's silent-lookup flag) when nothing is found anywhere in
    /// the chain. Always returns `Value::Nil` on miss, never `None`, per
    /// spec.md §4.C.
    pub fn get(&self, interp: &Interpreter, name: &str) -> Value {
        if let Some(value) = self.bindings.borrow().get(name) {
            return value.clone();
        }
        if let Some(ref parent) = self.parent {
            return parent.get(interp, name);
        }
        interp.report(ErrorKind::UndefinedSymbol, format!("undefined symbol: {name}"));
        Value::Nil
    }

    /// Looks up without touching the error channel at all, for internal
    /// callers (e.g. `defined?`) that only need a yes/no answer.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Some(value.clone());
        }
        match &self.parent {
            Some(parent) => parent.lookup(name),
            None => None,
        }
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// `set!`: mutates an existing binding in this scope or an ancestor.
    /// Reports `UndefinedSymbol` and leaves all scopes untouched if the
    /// name isn't bound anywhere.
    pub fn set(self: &Rc<Self>, interp: &Interpreter, name: &str, value: Value) {
        if self.bindings.borrow().contains_key(name) {
            let value = rebind_if_self_capture(self, value);
            self.bindings.borrow_mut().insert(name.to_string(), value);
            return;
        }
        if let Some(ref parent) = self.parent {
            parent.set(interp, name, value);
            return;
        }
        interp.report(ErrorKind::UndefinedSymbol, format!("undefined symbol: {name}"));
    }

    /// `undef`: removes the first occurrence of `name`, walking from this
    /// scope out through ancestors.
    pub fn remove(&self, name: &str) -> bool {
        if self.bindings.borrow_mut().remove(name).is_some() {
            return true;
        }
        match &self.parent {
            Some(parent) => parent.remove(name),
            None => false,
        }
    }

    /// Renders `(define NAME VALUE)` forms for every binding in this scope,
    /// used by `env-describe`-style introspection builtins.
    pub fn describe(&self) -> Vec<String> {
        self.bindings
            .borrow()
            .iter()
            .map(|(name, value)| format!("(define {name} {value})"))
            .collect()
    }

    pub fn symbol_names(&self) -> Vec<String> {
        self.bindings.borrow().keys().cloned().collect()
    }
}

/// If `value` is a closure whose captured environment is exactly `frame`
/// (by pointer identity), downgrade that capture to a weak link before
/// the binding is stored — otherwise `frame` would hold a strong `Rc` to
/// a closure that itself strongly holds `frame`, and the pair would never
/// be freed. This is the single choke point both `Environment::define` and
/// `Environment::set` route self-capturing closures through.
fn rebind_if_self_capture(frame: &Rc<Environment>, value: Value) -> Value {
    match value {
        Value::Func(Function::Closure { params, body, env: EnvLink::Strong(captured) })
            if Rc::ptr_eq(&captured, frame) =>
        {
            Value::Func(Function::Closure {
                params,
                body,
                env: EnvLink::Weak(Rc::downgrade(&captured)),
            })
        }
        other => other,
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
    fn test_define_and_get() {
        let interp = Interpreter::with_sink(|_, _| {});
        let env = Environment::new();
        env.define("x".to_string(), n(42));
        match env.get(&interp, "x") {
            Value::Num(r) => assert_eq!(r.to_i64(), Some(42)),
            _ => panic!("expected number"),
        }
        assert!(!interp.has_error());
    }

    #[test]
    fn test_undefined_symbol_reports_and_returns_nil() {
        let interp = Interpreter::with_sink(|_, _| {});
        let env = Environment::new();
        let result = env.get(&interp, "undefined");
        assert!(result.is_nil());
        assert!(interp.has_error());
    }

    #[test]
    fn test_silent_lookup_suppresses_report_but_still_misses() {
        let interp = Interpreter::with_sink(|_, _| {});
        let env = Environment::new();
        interp.with_silent_lookup(|| {
            assert!(!env.is_defined("missing"));
        });
    }

    #[test]
    fn test_shadowing_and_parent_lookup() {
        let interp = Interpreter::with_sink(|_, _| {});
        let parent = Environment::new();
        parent.define("x".to_string(), n(42));

        let child = Environment::with_parent(parent.clone());
        child.define("x".to_string(), n(100));

        match child.get(&interp, "x") {
            Value::Num(r) => assert_eq!(r.to_i64(), Some(100)),
            _ => panic!("expected number"),
        }
        match parent.get(&interp, "x") {
            Value::Num(r) => assert_eq!(r.to_i64(), Some(42)),
            _ => panic!("expected number"),
        }
    }

    #[test]
    fn test_set_mutates_ancestor_binding() {
        let interp = Interpreter::with_sink(|_, _| {});
        let parent = Environment::new();
        parent.define("x".to_string(), n(1));
        let child = Environment::with_parent(parent.clone());

        child.set(&interp, "x", n(2));
        match parent.get(&interp, "x") {
            Value::Num(r) => assert_eq!(r.to_i64(), Some(2)),
            _ => panic!("expected number"),
        }
    }

    #[test]
    fn test_set_undefined_reports_error() {
        let interp = Interpreter::with_sink(|_, _| {});
        let env = Environment::new();
        env.set(&interp, "nope", n(1));
        assert!(interp.has_error());
    }

    #[test]
    fn test_self_capturing_closure_downgrades_to_weak() {
        let env = Environment::new();
        let closure = Value::Func(Function::Closure {
            params: Box::new(Value::Nil),
            body: Box::new(Value::Sym("self".into())),
            env: EnvLink::Strong(env.clone()),
        });
        env.define("self".to_string(), closure);

        match env.lookup("self").unwrap() {
            Value::Func(Function::Closure { env: EnvLink::Weak(_), .. }) => {}
            _ => panic!("expected weak self-capture"),
        }
    }

    #[test]
    fn test_remove_and_describe() {
        let env = Environment::new();
        env.define("x".to_string(), n(1));
        assert!(env.is_defined("x"));
        assert!(env.remove("x"));
        assert!(!env.is_defined("x"));
    }

    #[test]
    fn test_remove_walks_parent_chain() {
        let parent = Environment::new();
        parent.define("x".to_string(), n(1));
        let child = Environment::with_parent(parent.clone());

        assert!(child.remove("x"));
        assert!(!parent.is_defined("x"));
        assert!(!child.remove("x"));
    }
}
