// ABOUTME: Evaluator: special-form dispatch and closure/builtin application

use crate::env::Environment;
use crate::error::{ErrorKind, Interpreter};
use crate::value::{EnvLink, Function, Value};
use std::rc::Rc;

/// Evaluates `expr` in `env`. Infallible at the Rust type level: malformed
/// input is reported on `interp`'s error channel and a benign value is
/// returned, so evaluation of the surrounding program continues (spec.md
/// §4.F, §7; see DESIGN.md Open Question O1).
pub fn eval(interp: &Interpreter, expr: &Value, env: &Rc<Environment>) -> Value {
    match expr {
        Value::Num(_) | Value::Str(_) | Value::Bool(_) | Value::Nil | Value::Err(_) | Value::Func(_) => {
            expr.clone()
        }
        Value::Sym(name) => env.get(interp, name),
        Value::Pair(car, cdr) => eval_pair(interp, car, cdr, env),
    }
}

fn eval_pair(interp: &Interpreter, car: &Value, cdr: &Value, env: &Rc<Environment>) -> Value {
    if let Value::Sym(name) = car {
        if let Some(result) = dispatch_special_form(interp, name, cdr, env) {
            return result;
        }
    }

    let func = eval(interp, car, env);
    let arg_exprs = match cdr.list_elements() {
        Some(v) => v,
        None => {
            interp.report(ErrorKind::InvalidArgument, "malformed call: improper argument list");
            return Value::Nil;
        }
    };
    let args: Vec<Value> = arg_exprs.iter().map(|e| eval(interp, e, env)).collect();
    match &func {
        Value::Func(_) => apply_callable(interp, &func, args),
        other => {
            interp.report(ErrorKind::InvalidArgument, format!("not callable: {other}"));
            Value::Nil
        }
    }
}

fn dispatch_special_form(
    interp: &Interpreter,
    name: &str,
    cdr: &Value,
    env: &Rc<Environment>,
) -> Option<Value> {
    Some(match name {
        "quote" => eval_quote(interp, cdr),
        "define" => eval_define(interp, cdr, env),
        "undef" => eval_undef(interp, cdr, env),
        "lambda" => eval_lambda(interp, cdr, env),
        "if" => eval_if(interp, cdr, env),
        "cond" => eval_cond(interp, cdr, env),
        "let" => eval_let(interp, cdr, env),
        "begin" => match cdr.list_elements() {
            Some(exprs) => eval_sequence(interp, &exprs, env),
            None => {
                interp.report(ErrorKind::InvalidArgument, "begin: malformed body");
                Value::Nil
            }
        },
        "and" => eval_and(interp, cdr, env),
        "or" => eval_or(interp, cdr, env),
        "set!" => eval_set(interp, cdr, env),
        "defined?" => eval_defined_p(interp, cdr, env),
        "eval" => match cdr.list_elements() {
            Some(args) => eval_eval_form(interp, &args, env),
            None => {
                interp.report(ErrorKind::InvalidArgument, "eval: malformed arguments");
                Value::Nil
            }
        },
        "env-symbols" => eval_env_symbols(interp, cdr, env),
        "env-describe" => eval_env_describe(interp, cdr, env),
        "load-file" => eval_load_file(interp, cdr, env),
        "save-environment" => eval_save_environment(interp, cdr, env),
        _ => return None,
    })
}

fn eval_sequence(interp: &Interpreter, exprs: &[Value], env: &Rc<Environment>) -> Value {
    let mut result = Value::Nil;
    for expr in exprs {
        result = eval(interp, expr, env);
    }
    result
}

fn eval_quote(interp: &Interpreter, cdr: &Value) -> Value {
    match cdr.list_elements() {
        Some(args) if args.len() == 1 => args[0].clone(),
        _ => {
            interp.report(ErrorKind::InvalidArgument, "quote: expected exactly 1 argument");
            Value::Nil
        }
    }
}

fn eval_define(interp: &Interpreter, cdr: &Value, env: &Rc<Environment>) -> Value {
    let args = match cdr.list_elements() {
        Some(v) if !v.is_empty() => v,
        _ => {
            interp.report(ErrorKind::InvalidArgument, "define: malformed form");
            return Value::Nil;
        }
    };
    match &args[0] {
        Value::Sym(name) => {
            if args.len() != 2 {
                interp.report(ErrorKind::InvalidArgument, "define: expected (define SYM EXPR)");
                return Value::Nil;
            }
            let value = eval(interp, &args[1], env);
            env.define(name.clone(), value);
            Value::Sym(name.clone())
        }
        // (define (FN P...) BODY...) desugars to (define FN (lambda (P...) BODY...))
        Value::Pair(fn_name, params) => {
            let name = match &**fn_name {
                Value::Sym(s) => s.clone(),
                _ => {
                    interp.report(ErrorKind::InvalidArgument, "define: function name must be a symbol");
                    return Value::Nil;
                }
            };
            let closure = Value::Func(Function::Closure {
                params: params.clone(),
                body: Box::new(Value::from_vec(args[1..].to_vec())),
                env: EnvLink::strong(env.clone()),
            });
            env.define(name.clone(), closure);
            Value::Sym(name)
        }
        _ => {
            interp.report(ErrorKind::InvalidArgument, "define: malformed form");
            Value::Nil
        }
    }
}

/// Accepts either a bare symbol or a `(quote SYM)` form, matching how
/// `undef`/`defined?` are conventionally written at the call site.
fn symbol_or_quoted(value: &Value) -> Option<String> {
    match value {
        Value::Sym(s) => Some(s.clone()),
        Value::Pair(head, rest) => match (&**head, rest.list_elements()) {
            (Value::Sym(q), Some(inner)) if q == "quote" && inner.len() == 1 => match &inner[0] {
                Value::Sym(s) => Some(s.clone()),
                _ => None,
            },
            _ => None,
        },
        _ => None,
    }
}

fn eval_undef(interp: &Interpreter, cdr: &Value, env: &Rc<Environment>) -> Value {
    let args = match cdr.list_elements() {
        Some(v) if v.len() == 1 => v,
        _ => {
            interp.report(ErrorKind::InvalidArgument, "undef: expected exactly 1 argument");
            return Value::Nil;
        }
    };
    match symbol_or_quoted(&args[0]) {
        Some(name) => {
            env.remove(&name);
            Value::Bool(true)
        }
        None => {
            interp.report(ErrorKind::InvalidArgument, "undef: expected a symbol or (quote SYM)");
            Value::Nil
        }
    }
}

/// `defined?` checks the *name* for a binding without ever evaluating it, so
/// it never triggers an `UndefinedSymbol` report the way evaluating a bare
/// reference would.
fn eval_defined_p(interp: &Interpreter, cdr: &Value, env: &Rc<Environment>) -> Value {
    let args = match cdr.list_elements() {
        Some(v) if v.len() == 1 => v,
        _ => {
            interp.report(ErrorKind::InvalidArgument, "defined?: expected exactly 1 argument");
            return Value::Bool(false);
        }
    };
    match symbol_or_quoted(&args[0]) {
        Some(name) => Value::Bool(env.is_defined(&name)),
        None => {
            interp.report(ErrorKind::InvalidArgument, "defined?: expected a symbol or (quote SYM)");
            Value::Bool(false)
        }
    }
}

fn eval_lambda(interp: &Interpreter, cdr: &Value, env: &Rc<Environment>) -> Value {
    match cdr {
        Value::Pair(params, body) => Value::Func(Function::Closure {
            params: params.clone(),
            body: body.clone(),
            env: EnvLink::strong(env.clone()),
        }),
        _ => {
            interp.report(ErrorKind::InvalidArgument, "lambda: expected (lambda PARAMS BODY...)");
            Value::Nil
        }
    }
}

fn eval_if(interp: &Interpreter, cdr: &Value, env: &Rc<Environment>) -> Value {
    let args = match cdr.list_elements() {
        Some(v) if v.len() == 2 || v.len() == 3 => v,
        _ => {
            interp.report(ErrorKind::InvalidArgument, "if: expected (if C T) or (if C T E)");
            return Value::Nil;
        }
    };
    let cond = eval(interp, &args[0], env);
    if cond.is_truthy() {
        eval(interp, &args[1], env)
    } else if args.len() == 3 {
        eval(interp, &args[2], env)
    } else {
        Value::Nil
    }
}

fn eval_cond(interp: &Interpreter, cdr: &Value, env: &Rc<Environment>) -> Value {
    let clauses = match cdr.list_elements() {
        Some(v) => v,
        None => {
            interp.report(ErrorKind::InvalidArgument, "cond: malformed clause list");
            return Value::Nil;
        }
    };
    for clause in &clauses {
        let parts = match clause.list_elements() {
            Some(v) if !v.is_empty() => v,
            _ => {
                interp.report(ErrorKind::InvalidArgument, "cond: malformed clause");
                return Value::Nil;
            }
        };
        let is_else = matches!(&parts[0], Value::Sym(s) if s == "else");
        let matched = if is_else { true } else { eval(interp, &parts[0], env).is_truthy() };
        if matched {
            return if parts.len() == 1 {
                Value::Bool(true)
            } else {
                eval_sequence(interp, &parts[1..], env)
            };
        }
    }
    Value::Nil
}

fn eval_let(interp: &Interpreter, cdr: &Value, env: &Rc<Environment>) -> Value {
    let items = match cdr.list_elements() {
        Some(v) if !v.is_empty() => v,
        _ => {
            interp.report(ErrorKind::InvalidArgument, "let: malformed form");
            return Value::Nil;
        }
    };

    let (loop_name, bindings_val, body): (Option<String>, &Value, &[Value]) = match &items[0] {
        Value::Sym(n) => {
            if items.len() < 2 {
                interp.report(ErrorKind::InvalidArgument, "named let: missing bindings");
                return Value::Nil;
            }
            (Some(n.clone()), &items[1], &items[2..])
        }
        _ => (None, &items[0], &items[1..]),
    };

    let bindings = match bindings_val.list_elements() {
        Some(v) => v,
        None => {
            interp.report(ErrorKind::InvalidArgument, "let: malformed bindings");
            return Value::Nil;
        }
    };

    let mut names = Vec::with_capacity(bindings.len());
    let mut values = Vec::with_capacity(bindings.len());
    for binding in &bindings {
        let pair = match binding.list_elements() {
            Some(v) if v.len() == 2 => v,
            _ => {
                interp.report(ErrorKind::InvalidArgument, "let: each binding must be (VAR EXPR)");
                return Value::Nil;
            }
        };
        let name = match &pair[0] {
            Value::Sym(s) => s.clone(),
            _ => {
                interp.report(ErrorKind::InvalidArgument, "let: binding name must be a symbol");
                return Value::Nil;
            }
        };
        // Bindings are evaluated in the OUTER environment, per spec.md §4.F.
        let value = eval(interp, &pair[1], env);
        names.push(name);
        values.push(value);
    }

    let frame = Environment::with_parent(env.clone());
    for (name, value) in names.iter().zip(values) {
        frame.define(name.clone(), value);
    }

    if let Some(loop_name) = loop_name {
        let params = Value::from_vec(names.into_iter().map(Value::Sym).collect());
        let closure = Value::Func(Function::Closure {
            params: Box::new(params),
            body: Box::new(Value::from_vec(body.to_vec())),
            env: EnvLink::strong(frame.clone()),
        });
        // Self-capturing: `Environment::define` downgrades this to a weak
        // back-edge so `frame` is freed once the call returns.
        frame.define(loop_name, closure);
    }

    eval_sequence(interp, body, &frame)
}

fn eval_and(interp: &Interpreter, cdr: &Value, env: &Rc<Environment>) -> Value {
    let exprs = match cdr.list_elements() {
        Some(v) => v,
        None => {
            interp.report(ErrorKind::InvalidArgument, "and: malformed argument list");
            return Value::Nil;
        }
    };
    if exprs.is_empty() {
        return Value::Bool(true);
    }
    let mut result = Value::Bool(true);
    for expr in &exprs {
        result = eval(interp, expr, env);
        if !result.is_truthy() {
            return result;
        }
    }
    result
}

fn eval_or(interp: &Interpreter, cdr: &Value, env: &Rc<Environment>) -> Value {
    let exprs = match cdr.list_elements() {
        Some(v) => v,
        None => {
            interp.report(ErrorKind::InvalidArgument, "or: malformed argument list");
            return Value::Nil;
        }
    };
    if exprs.is_empty() {
        return Value::Bool(false);
    }
    let mut result = Value::Bool(false);
    for expr in &exprs {
        result = eval(interp, expr, env);
        if result.is_truthy() {
            return result;
        }
    }
    result
}

fn eval_set(interp: &Interpreter, cdr: &Value, env: &Rc<Environment>) -> Value {
    let args = match cdr.list_elements() {
        Some(v) if v.len() == 2 => v,
        _ => {
            interp.report(ErrorKind::InvalidArgument, "set!: expected (set! SYM EXPR)");
            return Value::Nil;
        }
    };
    let name = match &args[0] {
        Value::Sym(s) => s.clone(),
        _ => {
            interp.report(ErrorKind::InvalidArgument, "set!: first argument must be a symbol");
            return Value::Nil;
        }
    };
    let value = eval(interp, &args[1], env);
    env.set(interp, &name, value.clone());
    value
}

/// The 1- and 3-argument forms of `eval` need the *lexical environment at
/// the call site*, which a plain `fn(&Interpreter, &[Value]) -> Value`
/// builtin has no access to — so unlike `apply`/`map`/`for-each` (which only
/// ever invoke callables that carry their own captured environment), `eval`
/// is dispatched here rather than living in `builtins/`.
fn eval_eval_form(interp: &Interpreter, args: &[Value], env: &Rc<Environment>) -> Value {
    match args.len() {
        1 => {
            let x = eval(interp, &args[0], env);
            eval(interp, &x, env)
        }
        3 => {
            let x = eval(interp, &args[0], env);
            let on_err = eval(interp, &args[1], env);
            let on_ok = eval(interp, &args[2], env);
            interp.clear();
            let result = interp.with_silent_lookup(|| eval(interp, &x, env));
            if interp.has_error() {
                interp.clear();
                apply_callable(interp, &on_err, vec![])
            } else {
                apply_callable(interp, &on_ok, vec![result])
            }
        }
        _ => {
            interp.report(ErrorKind::InvalidArgument, "eval: expected 1 or 3 arguments");
            Value::Nil
        }
    }
}

/// `env-symbols`/`env-describe`/`load-file`/`save-environment` all need
/// either the lexical environment at the call site or the sandbox, neither
/// of which a plain builtin signature can reach, so they're dispatched
/// here like `eval`/`defined?`.
fn eval_env_symbols(interp: &Interpreter, cdr: &Value, env: &Rc<Environment>) -> Value {
    match cdr.list_elements() {
        Some(v) if v.is_empty() => Value::from_vec(env.symbol_names().into_iter().map(Value::Sym).collect()),
        _ => {
            interp.report(ErrorKind::InvalidArgument, "env-symbols: expected no arguments");
            Value::Nil
        }
    }
}

fn eval_env_describe(interp: &Interpreter, cdr: &Value, env: &Rc<Environment>) -> Value {
    match cdr.list_elements() {
        Some(v) if v.is_empty() => Value::from_vec(env.describe().into_iter().map(Value::Str).collect()),
        _ => {
            interp.report(ErrorKind::InvalidArgument, "env-describe: expected no arguments");
            Value::Nil
        }
    }
}

/// Reads `path` through the sandbox, parses every top-level form, and
/// evaluates each one in `env` in sequence. Returns the last form's value,
/// or `Nil` for an empty file.
fn eval_load_file(interp: &Interpreter, cdr: &Value, env: &Rc<Environment>) -> Value {
    let args = match cdr.list_elements() {
        Some(v) if v.len() == 1 => v,
        _ => {
            interp.report(ErrorKind::InvalidArgument, "load-file: expected exactly 1 argument");
            return Value::Nil;
        }
    };
    let path = match eval(interp, &args[0], env) {
        Value::Str(s) => s,
        other => {
            interp.report(ErrorKind::TypeError, format!("load-file: expected a string path, got {}", other.type_name()));
            return Value::Nil;
        }
    };
    let source = crate::builtins::with_sandbox(|sandbox| match sandbox {
        Some(sandbox) => sandbox.read_file(&path).map_err(|e| e.to_string()),
        None => Err("load-file: sandbox not initialized".to_string()),
    });
    let source = match source {
        Ok(s) => s,
        Err(msg) => {
            interp.report(ErrorKind::InvalidArgument, format!("load-file: {msg}"));
            return Value::Nil;
        }
    };
    let forms = match crate::parser::parse_all(&source) {
        Ok(forms) => forms,
        Err(msg) => {
            interp.report(ErrorKind::Syntax, format!("load-file: {msg}"));
            return Value::Nil;
        }
    };
    eval_sequence(interp, &forms, env)
}

/// Writes every binding in `env` (as `(define NAME VALUE)` text) to `path`
/// through the sandbox, one per line.
fn eval_save_environment(interp: &Interpreter, cdr: &Value, env: &Rc<Environment>) -> Value {
    let args = match cdr.list_elements() {
        Some(v) if v.len() == 1 => v,
        _ => {
            interp.report(ErrorKind::InvalidArgument, "save-environment: expected exactly 1 argument");
            return Value::Bool(false);
        }
    };
    let path = match eval(interp, &args[0], env) {
        Value::Str(s) => s,
        other => {
            interp.report(ErrorKind::TypeError, format!("save-environment: expected a string path, got {}", other.type_name()));
            return Value::Bool(false);
        }
    };
    let contents = env.describe().join("\n");
    let result = crate::builtins::with_sandbox(|sandbox| match sandbox {
        Some(sandbox) => sandbox.write_file(&path, &contents).map_err(|e| e.to_string()),
        None => Err("save-environment: sandbox not initialized".to_string()),
    });
    match result {
        Ok(()) => Value::Bool(true),
        Err(msg) => {
            interp.report(ErrorKind::InvalidArgument, format!("save-environment: {msg}"));
            Value::Bool(false)
        }
    }
}

/// Applies an already-evaluated callable to already-evaluated arguments.
/// Shared by generic call application and the `apply`/`map`/`for-each`
/// builtins.
pub fn apply_callable(interp: &Interpreter, func: &Value, args: Vec<Value>) -> Value {
    match func {
        Value::Func(Function::Builtin(_, f)) => f(interp, &args),
        Value::Func(Function::Closure { params, body, env }) => apply_closure(interp, params, body, env, args),
        other => {
            interp.report(ErrorKind::InvalidArgument, format!("not callable: {other}"));
            Value::Nil
        }
    }
}

fn apply_closure(
    interp: &Interpreter,
    params: &Value,
    body: &Value,
    captured: &EnvLink,
    args: Vec<Value>,
) -> Value {
    let parent = match captured.get() {
        Some(env) => env,
        None => {
            interp.report(ErrorKind::InvalidArgument, "closure's environment is no longer available");
            return Value::Nil;
        }
    };
    let frame = Environment::with_parent(parent);
    bind_params(interp, &frame, params, args);
    match body.list_elements() {
        Some(exprs) => eval_sequence(interp, &exprs, &frame),
        None => Value::Nil,
    }
}

/// Binds `args` into `frame` according to `params`' shape: a bare symbol
/// collects all arguments as a list (fully variadic); a proper list of
/// symbols requires an exact count; a list ending in a dotted symbol binds
/// the leading names positionally and the trailing name to the rest.
fn bind_params(interp: &Interpreter, frame: &Rc<Environment>, params: &Value, args: Vec<Value>) {
    match params {
        Value::Sym(name) => {
            frame.define(name.clone(), Value::from_vec(args));
        }
        Value::Nil => {
            if !args.is_empty() {
                interp.report(
                    ErrorKind::InvalidArgument,
                    format!("expected 0 arguments, got {}", args.len()),
                );
            }
        }
        Value::Pair(..) => {
            let mut names = Vec::new();
            let mut cur = params;
            let rest_name = loop {
                match cur {
                    Value::Pair(car, cdr) => {
                        match &**car {
                            Value::Sym(s) => names.push(s.clone()),
                            _ => {
                                interp.report(
                                    ErrorKind::InvalidArgument,
                                    "lambda parameter list must contain only symbols",
                                );
                                return;
                            }
                        }
                        cur = cdr;
                    }
                    Value::Nil => break None,
                    Value::Sym(s) => break Some(s.clone()),
                    _ => {
                        interp.report(ErrorKind::InvalidArgument, "malformed lambda parameter list");
                        return;
                    }
                }
            };

            let required = names.len();
            let ok = if rest_name.is_some() { args.len() >= required } else { args.len() == required };
            if !ok {
                interp.report(
                    ErrorKind::InvalidArgument,
                    format!(
                        "expected {}{} argument(s), got {}",
                        required,
                        if rest_name.is_some() { " or more" } else { "" },
                        args.len()
                    ),
                );
                return;
            }

            let mut iter = args.into_iter();
            for name in names {
                frame.define(name, iter.next().expect("length checked above"));
            }
            if let Some(rest) = rest_name {
                frame.define(rest, Value::from_vec(iter.collect()));
            }
        }
        _ => {
            interp.report(ErrorKind::InvalidArgument, "malformed lambda parameter list");
        }
    }
}
