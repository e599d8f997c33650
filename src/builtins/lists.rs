//! List operations: car, cdr, cadr, caddr, cons, list, length, sublist,
//! list-ref, map, for-each

use super::def;
use crate::env::Environment;
use crate::error::{ErrorKind, Interpreter};
use crate::eval::apply_callable;
use crate::value::Value;
use std::rc::Rc;

fn one(interp: &Interpreter, name: &str, args: &[Value]) -> Option<&Value> {
    if args.len() != 1 {
        interp.report(ErrorKind::InvalidArgument, format!("{name}: expected exactly 1 argument"));
        return None;
    }
    Some(&args[0])
}

/// `(car (cons a b)) = a` for every value, not just proper lists (spec.md
/// §8 universal invariant).
pub fn builtin_car(interp: &Interpreter, args: &[Value]) -> Value {
    match one(interp, "car", args) {
        Some(Value::Pair(car, _)) => (**car).clone(),
        Some(other) => {
            interp.report(ErrorKind::TypeError, format!("car: expected a pair, got {}", other.type_name()));
            Value::Nil
        }
        None => Value::Nil,
    }
}

pub fn builtin_cdr(interp: &Interpreter, args: &[Value]) -> Value {
    match one(interp, "cdr", args) {
        Some(Value::Pair(_, cdr)) => (**cdr).clone(),
        Some(other) => {
            interp.report(ErrorKind::TypeError, format!("cdr: expected a pair, got {}", other.type_name()));
            Value::Nil
        }
        None => Value::Nil,
    }
}

pub fn builtin_cadr(interp: &Interpreter, args: &[Value]) -> Value {
    builtin_car(interp, &[builtin_cdr(interp, args)])
}

pub fn builtin_caddr(interp: &Interpreter, args: &[Value]) -> Value {
    builtin_car(interp, &[builtin_cdr(interp, &[builtin_cdr(interp, args)])])
}

pub fn builtin_cons(interp: &Interpreter, args: &[Value]) -> Value {
    if args.len() != 2 {
        interp.report(ErrorKind::InvalidArgument, "cons: expected exactly 2 arguments");
        return Value::Nil;
    }
    Value::cons(args[0].clone(), args[1].clone())
}

pub fn builtin_list(_interp: &Interpreter, args: &[Value]) -> Value {
    Value::from_vec(args.to_vec())
}

pub fn builtin_length(interp: &Interpreter, args: &[Value]) -> Value {
    match one(interp, "length", args) {
        Some(v) => match v.list_elements() {
            Some(items) => Value::Num(crate::num::Rational::from_int(items.len() as i64)),
            None => {
                interp.report(ErrorKind::TypeError, "length: expected a proper list");
                Value::Num(crate::num::Rational::zero())
            }
        },
        None => Value::Num(crate::num::Rational::zero()),
    }
}

pub fn builtin_sublist(interp: &Interpreter, args: &[Value]) -> Value {
    if args.len() != 3 {
        interp.report(ErrorKind::InvalidArgument, "sublist: expected exactly 3 arguments");
        return Value::Nil;
    }
    let items = match args[0].list_elements() {
        Some(items) => items,
        None => {
            interp.report(ErrorKind::TypeError, "sublist: expected a proper list");
            return Value::Nil;
        }
    };
    let (start, end) = match (index_arg(interp, "sublist", &args[1]), index_arg(interp, "sublist", &args[2])) {
        (Some(s), Some(e)) => (s, e),
        _ => return Value::Nil,
    };
    if start > end || end > items.len() {
        interp.report(ErrorKind::InvalidArgument, "sublist: index out of range");
        return Value::Nil;
    }
    Value::from_vec(items[start..end].to_vec())
}

pub fn builtin_list_ref(interp: &Interpreter, args: &[Value]) -> Value {
    if args.len() != 2 {
        interp.report(ErrorKind::InvalidArgument, "list-ref: expected exactly 2 arguments");
        return Value::Nil;
    }
    let items = match args[0].list_elements() {
        Some(items) => items,
        None => {
            interp.report(ErrorKind::TypeError, "list-ref: expected a proper list");
            return Value::Nil;
        }
    };
    match index_arg(interp, "list-ref", &args[1]) {
        Some(i) if i < items.len() => items[i].clone(),
        Some(_) => {
            interp.report(ErrorKind::InvalidArgument, "list-ref: index out of range");
            Value::Nil
        }
        None => Value::Nil,
    }
}

fn index_arg(interp: &Interpreter, name: &str, v: &Value) -> Option<usize> {
    match v {
        Value::Num(n) => match n.to_i64() {
            Some(i) if i >= 0 => Some(i as usize),
            _ => {
                interp.report(ErrorKind::InvalidArgument, format!("{name}: index must be a non-negative integer"));
                None
            }
        },
        other => {
            interp.report(ErrorKind::TypeError, format!("{name}: expected an integer index, got {}", other.type_name()));
            None
        }
    }
}

/// Applies `F` to each element as-is (spec.md §9 resolves the source's two
/// incompatible `map` definitions in favor of this simpler one).
pub fn builtin_map(interp: &Interpreter, args: &[Value]) -> Value {
    if args.len() != 2 {
        interp.report(ErrorKind::InvalidArgument, "map: expected exactly 2 arguments");
        return Value::Nil;
    }
    let items = match args[1].list_elements() {
        Some(items) => items,
        None => {
            interp.report(ErrorKind::TypeError, "map: expected a proper list");
            return Value::Nil;
        }
    };
    let mapped: Vec<Value> = items.into_iter().map(|item| apply_callable(interp, &args[0], vec![item])).collect();
    Value::from_vec(mapped)
}

/// `(for-each f list1 list2 ... listN)` walks all N lists lockstep,
/// stopping at the shortest, calling `f` with one element from each per
/// step.
pub fn builtin_for_each(interp: &Interpreter, args: &[Value]) -> Value {
    if args.len() < 2 {
        interp.report(ErrorKind::InvalidArgument, "for-each: expected at least 2 arguments");
        return Value::Nil;
    }
    let mut lists: Vec<Vec<Value>> = Vec::with_capacity(args.len() - 1);
    for list_arg in &args[1..] {
        match list_arg.list_elements() {
            Some(items) => lists.push(items),
            None => {
                interp.report(ErrorKind::TypeError, "for-each: expected a proper list");
                return Value::Nil;
            }
        }
    }
    let len = lists.iter().map(Vec::len).min().unwrap_or(0);
    for i in 0..len {
        let step_args: Vec<Value> = lists.iter().map(|list| list[i].clone()).collect();
        apply_callable(interp, &args[0], step_args);
    }
    Value::Nil
}

pub fn register(env: &Rc<Environment>) {
    def(env, "car", builtin_car);
    def(env, "cdr", builtin_cdr);
    def(env, "cadr", builtin_cadr);
    def(env, "caddr", builtin_caddr);
    def(env, "cons", builtin_cons);
    def(env, "list", builtin_list);
    def(env, "length", builtin_length);
    def(env, "sublist", builtin_sublist);
    def(env, "list-ref", builtin_list_ref);
    def(env, "map", builtin_map);
    def(env, "for-each", builtin_for_each);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::num::Rational;
    use crate::value::Function;

    fn interp() -> Interpreter {
        Interpreter::with_sink(|_, _| {})
    }

    fn n(i: i64) -> Value {
        Value::Num(Rational::from_int(i))
    }

    #[test]
    fn test_car_cdr_on_dotted_pair() {
        let interp = interp();
        let p = Value::cons(n(1), n(2));
        assert!(matches!(builtin_car(&interp, &[p.clone()]), Value::Num(r) if r.to_i64() == Some(1)));
        assert!(matches!(builtin_cdr(&interp, &[p]), Value::Num(r) if r.to_i64() == Some(2)));
    }

    #[test]
    fn test_cons_then_length() {
        let interp = interp();
        let list = builtin_cons(&interp, &[n(1), Value::from_vec(vec![n(2), n(3)])]);
        let len = builtin_length(&interp, &[list]);
        assert!(matches!(len, Value::Num(r) if r.to_i64() == Some(3)));
    }

    #[test]
    fn test_sublist_and_list_ref() {
        let interp = interp();
        let list = Value::from_vec(vec![n(1), n(2), n(3), n(4)]);
        let sub = builtin_sublist(&interp, &[list.clone(), n(1), n(3)]);
        assert_eq!(sub.list_elements().unwrap().len(), 2);
        let r = builtin_list_ref(&interp, &[list, n(2)]);
        assert!(matches!(r, Value::Num(v) if v.to_i64() == Some(3)));
    }

    #[test]
    fn test_map_squares_each_element() {
        fn square(_: &Interpreter, args: &[Value]) -> Value {
            match &args[0] {
                Value::Num(n) => Value::Num(n.mul(n)),
                _ => Value::Nil,
            }
        }
        let interp = interp();
        let f = Value::Func(Function::Builtin("square", square));
        let list = Value::from_vec(vec![n(1), n(2), n(3), n(4)]);
        let result = builtin_map(&interp, &[f, list]);
        let values: Vec<i64> = result.list_elements().unwrap().iter().map(|v| match v {
            Value::Num(n) => n.to_i64().unwrap(),
            _ => panic!("expected number"),
        }).collect();
        assert_eq!(values, vec![1, 4, 9, 16]);
    }

    #[test]
    fn test_for_each_walks_multiple_lists_lockstep() {
        use std::cell::RefCell;
        thread_local! {
            static SUMS: RefCell<Vec<i64>> = RefCell::new(Vec::new());
        }
        fn collect_sum(_: &Interpreter, args: &[Value]) -> Value {
            let sum: i64 = args.iter().map(|v| match v {
                Value::Num(n) => n.to_i64().unwrap(),
                _ => 0,
            }).sum();
            SUMS.with(|s| s.borrow_mut().push(sum));
            Value::Nil
        }
        let interp = interp();
        let f = Value::Func(Function::Builtin("collect-sum", collect_sum));
        let a = Value::from_vec(vec![n(1), n(2), n(3)]);
        let b = Value::from_vec(vec![n(10), n(20)]);
        builtin_for_each(&interp, &[f, a, b]);
        SUMS.with(|s| assert_eq!(*s.borrow(), vec![11, 22]));
    }
}
