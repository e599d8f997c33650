// ABOUTME: Error channel for evaluation failures in the Lisp interpreter

use std::cell::{Cell, RefCell};
use thiserror::Error;

/// The six reportable error categories (spec.md §4.D). `None` is the
/// channel's resting state, never itself reported.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("none")]
    None,
    #[error("syntax error")]
    Syntax,
    #[error("invalid argument")]
    InvalidArgument,
    #[error("type error")]
    TypeError,
    #[error("undefined symbol")]
    UndefinedSymbol,
    #[error("memory exhausted")]
    MemoryExhausted,
    #[error("division by zero")]
    DivisionByZero,
}

type Sink = Box<dyn Fn(ErrorKind, &str)>;

/// Owns the process-wide-as-context error channel and the silent-lookup
/// flag, threaded by reference through `eval`/`apply`/every builtin. This
/// is the spec's single global error state (§9 Design Notes) realized as
/// an explicit struct rather than a `static`, so tests can hold independent
/// instances.
pub struct Interpreter {
    channel: RefCell<Option<(ErrorKind, String)>>,
    silent_lookup: Cell<bool>,
    sink: Sink,
}

impl Interpreter {
    pub fn new() -> Self {
        Interpreter {
            channel: RefCell::new(None),
            silent_lookup: Cell::new(false),
            sink: Box::new(|kind, msg| eprintln!("{kind}: {msg}")),
        }
    }

    pub fn with_sink(sink: impl Fn(ErrorKind, &str) + 'static) -> Self {
        Interpreter {
            channel: RefCell::new(None),
            silent_lookup: Cell::new(false),
            sink: Box::new(sink),
        }
    }

    /// Records an error on the channel and invokes the sink, unless
    /// lookups are currently silenced and the kind is `UndefinedSymbol`
    /// (the only kind `defined?`/3-arg `eval` need to suppress).
    pub fn report(&self, kind: ErrorKind, message: impl Into<String>) {
        let message = message.into();
        if kind == ErrorKind::UndefinedSymbol && self.silent_lookup.get() {
            *self.channel.borrow_mut() = Some((kind, message));
            return;
        }
        (self.sink)(kind, &message);
        *self.channel.borrow_mut() = Some((kind, message));
    }

    pub fn last_error(&self) -> Option<(ErrorKind, String)> {
        self.channel.borrow().clone()
    }

    pub fn has_error(&self) -> bool {
        self.channel.borrow().is_some()
    }

    pub fn clear(&self) {
        *self.channel.borrow_mut() = None;
    }

    /// Consumes and clears the channel, for the top-level multi-expression
    /// driver to check between forms.
    pub fn take_error(&self) -> Option<(ErrorKind, String)> {
        self.channel.borrow_mut().take()
    }

    /// Runs `f` with lookups silenced, restoring the prior flag value on
    /// every exit path (used by `defined?` and the 3-argument `eval`).
    pub fn with_silent_lookup<R>(&self, f: impl FnOnce() -> R) -> R {
        let previous = self.silent_lookup.get();
        self.silent_lookup.set(true);
        let result = f();
        self.silent_lookup.set(previous);
        result
    }

    pub fn is_silent_lookup(&self) -> bool {
        self.silent_lookup.get()
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell as StdRefCell;
    use std::rc::Rc;

    #[test]
    fn test_report_records_and_clears() {
        let interp = Interpreter::with_sink(|_, _| {});
        assert!(!interp.has_error());
        interp.report(ErrorKind::TypeError, "bad arg");
        assert!(interp.has_error());
        let (kind, msg) = interp.last_error().unwrap();
        assert_eq!(kind, ErrorKind::TypeError);
        assert_eq!(msg, "bad arg");
        interp.clear();
        assert!(!interp.has_error());
    }

    #[test]
    fn test_take_error_consumes() {
        let interp = Interpreter::with_sink(|_, _| {});
        interp.report(ErrorKind::Syntax, "oops");
        assert!(interp.take_error().is_some());
        assert!(interp.last_error().is_none());
    }

    #[test]
    fn test_silent_lookup_suppresses_sink_not_channel() {
        let calls: Rc<StdRefCell<usize>> = Rc::new(StdRefCell::new(0));
        let calls_clone = calls.clone();
        let interp = Interpreter::with_sink(move |_, _| {
            *calls_clone.borrow_mut() += 1;
        });
        interp.with_silent_lookup(|| {
            interp.report(ErrorKind::UndefinedSymbol, "x");
        });
        assert_eq!(*calls.borrow(), 0);
        assert!(interp.has_error());
    }

    #[test]
    fn test_silent_lookup_restores_on_exit() {
        let interp = Interpreter::with_sink(|_, _| {});
        assert!(!interp.is_silent_lookup());
        interp.with_silent_lookup(|| {
            assert!(interp.is_silent_lookup());
        });
        assert!(!interp.is_silent_lookup());
    }

    #[test]
    fn test_non_silenced_undefined_symbol_invokes_sink() {
        let calls: Rc<StdRefCell<usize>> = Rc::new(StdRefCell::new(0));
        let calls_clone = calls.clone();
        let interp = Interpreter::with_sink(move |_, _| {
            *calls_clone.borrow_mut() += 1;
        });
        interp.report(ErrorKind::UndefinedSymbol, "y");
        assert_eq!(*calls.borrow(), 1);
    }
}
