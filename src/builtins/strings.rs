//! String operations: string-length, substring, string-split, string-join,
//! string-upcase, string-downcase, string->number, number->string, float,
//! string->symbol, read-from-string, write-to-string, tokenize-expr

use super::def;
use crate::env::Environment;
use crate::error::{ErrorKind, Interpreter};
use crate::num::Rational;
use crate::value::Value;
use std::rc::Rc;

fn as_str<'a>(interp: &Interpreter, name: &str, v: &'a Value) -> Option<&'a str> {
    match v {
        Value::Str(s) => Some(s.as_str()),
        other => {
            interp.report(ErrorKind::TypeError, format!("{name}: expected a string, got {}", other.type_name()));
            None
        }
    }
}

pub fn builtin_string_length(interp: &Interpreter, args: &[Value]) -> Value {
    if args.len() != 1 {
        interp.report(ErrorKind::InvalidArgument, "string-length: expected exactly 1 argument");
        return Value::Num(Rational::zero());
    }
    match as_str(interp, "string-length", &args[0]) {
        Some(s) => Value::Num(Rational::from_int(s.chars().count() as i64)),
        None => Value::Num(Rational::zero()),
    }
}

pub fn builtin_substring(interp: &Interpreter, args: &[Value]) -> Value {
    if args.len() != 3 {
        interp.report(ErrorKind::InvalidArgument, "substring: expected exactly 3 arguments");
        return Value::Str(String::new());
    }
    let s = match as_str(interp, "substring", &args[0]) {
        Some(s) => s,
        None => return Value::Str(String::new()),
    };
    let chars: Vec<char> = s.chars().collect();
    let (start, end) = match (as_index(interp, &args[1]), as_index(interp, &args[2])) {
        (Some(a), Some(b)) => (a, b),
        _ => return Value::Str(String::new()),
    };
    if start > end || end > chars.len() {
        interp.report(ErrorKind::InvalidArgument, "substring: index out of range");
        return Value::Str(String::new());
    }
    Value::Str(chars[start..end].iter().collect())
}

fn as_index(interp: &Interpreter, v: &Value) -> Option<usize> {
    match v {
        Value::Num(n) => match n.to_i64() {
            Some(i) if i >= 0 => Some(i as usize),
            _ => {
                interp.report(ErrorKind::InvalidArgument, "expected a non-negative integer index");
                None
            }
        },
        other => {
            interp.report(ErrorKind::TypeError, format!("expected an integer index, got {}", other.type_name()));
            None
        }
    }
}

pub fn builtin_string_split(interp: &Interpreter, args: &[Value]) -> Value {
    if args.len() != 2 {
        interp.report(ErrorKind::InvalidArgument, "string-split: expected exactly 2 arguments");
        return Value::Nil;
    }
    let (s, delim) = match (as_str(interp, "string-split", &args[0]), as_str(interp, "string-split", &args[1])) {
        (Some(s), Some(d)) => (s, d),
        _ => return Value::Nil,
    };
    let parts = if delim.is_empty() {
        s.chars().map(|c| Value::Str(c.to_string())).collect()
    } else {
        s.split(delim).map(|p| Value::Str(p.to_string())).collect()
    };
    Value::from_vec(parts)
}

pub fn builtin_string_join(interp: &Interpreter, args: &[Value]) -> Value {
    if args.len() != 2 {
        interp.report(ErrorKind::InvalidArgument, "string-join: expected exactly 2 arguments");
        return Value::Str(String::new());
    }
    let items = match args[0].list_elements() {
        Some(items) => items,
        None => {
            interp.report(ErrorKind::TypeError, "string-join: expected a proper list");
            return Value::Str(String::new());
        }
    };
    let delim = match as_str(interp, "string-join", &args[1]) {
        Some(d) => d,
        None => return Value::Str(String::new()),
    };
    let mut parts = Vec::with_capacity(items.len());
    for item in &items {
        match as_str(interp, "string-join", item) {
            Some(s) => parts.push(s.to_string()),
            None => return Value::Str(String::new()),
        }
    }
    Value::Str(parts.join(delim))
}

pub fn builtin_string_upcase(interp: &Interpreter, args: &[Value]) -> Value {
    if args.len() != 1 {
        interp.report(ErrorKind::InvalidArgument, "string-upcase: expected exactly 1 argument");
        return Value::Str(String::new());
    }
    match as_str(interp, "string-upcase", &args[0]) {
        Some(s) => Value::Str(s.to_uppercase()),
        None => Value::Str(String::new()),
    }
}

pub fn builtin_string_downcase(interp: &Interpreter, args: &[Value]) -> Value {
    if args.len() != 1 {
        interp.report(ErrorKind::InvalidArgument, "string-downcase: expected exactly 1 argument");
        return Value::Str(String::new());
    }
    match as_str(interp, "string-downcase", &args[0]) {
        Some(s) => Value::Str(s.to_lowercase()),
        None => Value::Str(String::new()),
    }
}

pub fn builtin_string_to_number(interp: &Interpreter, args: &[Value]) -> Value {
    if args.len() != 1 {
        interp.report(ErrorKind::InvalidArgument, "string->number: expected exactly 1 argument");
        return Value::Bool(false);
    }
    match as_str(interp, "string->number", &args[0]) {
        Some(s) => match Rational::parse_literal(s) {
            Ok(n) => Value::Num(n),
            Err(_) => Value::Bool(false),
        },
        None => Value::Bool(false),
    }
}

pub fn builtin_number_to_string(interp: &Interpreter, args: &[Value]) -> Value {
    if args.len() != 1 {
        interp.report(ErrorKind::InvalidArgument, "number->string: expected exactly 1 argument");
        return Value::Str(String::new());
    }
    match &args[0] {
        Value::Num(n) => Value::Str(n.to_string()),
        other => {
            interp.report(ErrorKind::TypeError, format!("number->string: expected a number, got {}", other.type_name()));
            Value::Str(String::new())
        }
    }
}

/// Renders a number as a fixed-precision decimal string, e.g. `(float 1/4 2)` => `"0.25"`.
pub fn builtin_float(interp: &Interpreter, args: &[Value]) -> Value {
    if args.len() != 2 {
        interp.report(ErrorKind::InvalidArgument, "float: expected exactly 2 arguments");
        return Value::Str(String::new());
    }
    let n = match &args[0] {
        Value::Num(n) => n,
        other => {
            interp.report(ErrorKind::TypeError, format!("float: expected a number, got {}", other.type_name()));
            return Value::Str(String::new());
        }
    };
    match as_index(interp, &args[1]) {
        Some(precision) => Value::Str(n.to_decimal_string(precision)),
        None => Value::Str(String::new()),
    }
}

pub fn builtin_string_to_symbol(interp: &Interpreter, args: &[Value]) -> Value {
    if args.len() != 1 {
        interp.report(ErrorKind::InvalidArgument, "string->symbol: expected exactly 1 argument");
        return Value::Nil;
    }
    match as_str(interp, "string->symbol", &args[0]) {
        Some(s) => Value::Sym(s.to_string()),
        None => Value::Nil,
    }
}

pub fn builtin_read_from_string(interp: &Interpreter, args: &[Value]) -> Value {
    if args.len() != 1 {
        interp.report(ErrorKind::InvalidArgument, "read-from-string: expected exactly 1 argument");
        return Value::Nil;
    }
    let s = match as_str(interp, "read-from-string", &args[0]) {
        Some(s) => s,
        None => return Value::Nil,
    };
    match crate::parser::parse(s) {
        Ok(value) => value,
        Err(msg) => {
            interp.report(ErrorKind::Syntax, msg);
            Value::Nil
        }
    }
}

pub fn builtin_write_to_string(interp: &Interpreter, args: &[Value]) -> Value {
    if args.len() != 1 {
        interp.report(ErrorKind::InvalidArgument, "write-to-string: expected exactly 1 argument");
        return Value::Str(String::new());
    }
    Value::Str(args[0].to_string())
}

pub fn builtin_tokenize_expr(interp: &Interpreter, args: &[Value]) -> Value {
    if args.len() != 1 {
        interp.report(ErrorKind::InvalidArgument, "tokenize-expr: expected exactly 1 argument");
        return Value::Nil;
    }
    let s = match as_str(interp, "tokenize-expr", &args[0]) {
        Some(s) => s,
        None => return Value::Nil,
    };
    match crate::parser::tokenize_to_strings(s) {
        Ok(tokens) => Value::from_vec(tokens.into_iter().map(Value::Str).collect()),
        Err(msg) => {
            interp.report(ErrorKind::Syntax, msg);
            Value::Nil
        }
    }
}

pub fn register(env: &Rc<Environment>) {
    def(env, "string-length", builtin_string_length);
    def(env, "substring", builtin_substring);
    def(env, "string-split", builtin_string_split);
    def(env, "string-join", builtin_string_join);
    def(env, "string-upcase", builtin_string_upcase);
    def(env, "string-downcase", builtin_string_downcase);
    def(env, "string->number", builtin_string_to_number);
    def(env, "number->string", builtin_number_to_string);
    def(env, "float", builtin_float);
    def(env, "string->symbol", builtin_string_to_symbol);
    def(env, "read-from-string", builtin_read_from_string);
    def(env, "write-to-string", builtin_write_to_string);
    def(env, "tokenize-expr", builtin_tokenize_expr);
}
