//! Built-in procedures for the standard environment, organized by semantic
//! category per the builtin surface table. Each category is a sub-module
//! with its own `register` function; `register_builtins` wires them all
//! into a fresh top-level environment.

use crate::env::Environment;
use crate::sandbox::Sandbox;
use crate::value::{BuiltinFn, Function, Value};
use std::cell::RefCell;
use std::rc::Rc;

pub mod arithmetic;
pub mod comparison;
pub mod console;
pub mod errors;
pub mod filesystem;
pub mod lists;
pub mod logic;
pub mod meta;
pub mod strings;
pub mod types;

thread_local! {
    static SANDBOX: RefCell<Option<Sandbox>> = const { RefCell::new(None) };
}

/// Installs the sandbox used by `read-file`/`write-file`/`load-file`/
/// `save-environment`. Installed once at startup (spec.md §5).
pub fn set_sandbox_storage(sandbox: Sandbox) {
    SANDBOX.with(|s| *s.borrow_mut() = Some(sandbox));
}

/// Runs `f` with the installed sandbox, or `None` if one hasn't been set up.
pub(crate) fn with_sandbox<R>(f: impl FnOnce(Option<&Sandbox>) -> R) -> R {
    SANDBOX.with(|s| f(s.borrow().as_ref()))
}

/// Binds `name` to a builtin procedure in `env`.
pub(crate) fn def(env: &Rc<Environment>, name: &'static str, f: BuiltinFn) {
    env.define(name.to_string(), Value::Func(Function::Builtin(name, f)));
}

/// Registers every builtin category in the given environment.
pub fn register_builtins(env: &Rc<Environment>) {
    arithmetic::register(env);
    comparison::register(env);
    logic::register(env);
    types::register(env);
    lists::register(env);
    console::register(env);
    filesystem::register(env);
    errors::register(env);
    meta::register(env);
    strings::register(env);
}
