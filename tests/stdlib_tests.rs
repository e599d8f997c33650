// ABOUTME: Tests for list, arithmetic, and predicate builtins via recursive Lisp definitions

use nada_lisp::builtins::register_builtins;
use nada_lisp::env::Environment;
use nada_lisp::error::Interpreter;
use nada_lisp::eval::eval;
use nada_lisp::parser::parse;
use nada_lisp::value::Value;
use std::rc::Rc;

fn setup() -> (Interpreter, Rc<Environment>) {
    let env = Environment::new();
    register_builtins(&env);
    (Interpreter::with_sink(|_, _| {}), env)
}

fn run(interp: &Interpreter, env: &Rc<Environment>, code: &str) -> Value {
    let expr = parse(code).expect("parse error");
    eval(interp, &expr, env)
}

fn num(v: &Value) -> i64 {
    match v {
        Value::Num(r) => r.to_i64().expect("non-integer result"),
        other => panic!("expected number, got {other:?}"),
    }
}

fn ints(v: &Value) -> Vec<i64> {
    v.list_elements().expect("expected a proper list").iter().map(num).collect()
}

// ============================================================================
// Higher-order list operations (map/for-each are builtins; everything else
// here is a user-defined recursive function over car/cdr/cons/null?).
// ============================================================================

#[test]
fn test_map_doubles_each_element() {
    let (interp, env) = setup();
    let result = run(&interp, &env, "(map (lambda (x) (* x 2)) '(1 2 3))");
    assert_eq!(ints(&result), vec![2, 4, 6]);
}

#[test]
fn test_for_each_side_effects_in_order() {
    let (interp, env) = setup();
    run(&interp, &env, "(define acc '())");
    run(&interp, &env, "(for-each (lambda (x) (set! acc (cons x acc))) '(1 2 3))");
    let result = run(&interp, &env, "acc");
    assert_eq!(ints(&result), vec![3, 2, 1]);
}

#[test]
fn test_user_defined_reduce() {
    let (interp, env) = setup();
    run(
        &interp,
        &env,
        r#"
        (define (reduce f acc lst)
          (if (null? lst)
              acc
              (reduce f (f acc (car lst)) (cdr lst))))
        "#,
    );
    let result = run(&interp, &env, "(reduce + 0 '(1 2 3 4))");
    assert_eq!(num(&result), 10);
}

#[test]
fn test_user_defined_reverse() {
    let (interp, env) = setup();
    run(
        &interp,
        &env,
        r#"
        (define (my-reverse lst)
          (if (null? lst)
              '()
              (cons (car lst) '())))
        (define (rev-acc lst acc)
          (if (null? lst)
              acc
              (rev-acc (cdr lst) (cons (car lst) acc))))
        "#,
    );
    let result = run(&interp, &env, "(rev-acc '(1 2 3) '())");
    assert_eq!(ints(&result), vec![3, 2, 1]);
}

#[test]
fn test_sublist_and_list_ref() {
    let (interp, env) = setup();
    let result = run(&interp, &env, "(sublist '(10 20 30 40) 1 3)");
    assert_eq!(ints(&result), vec![20, 30]);
    let result = run(&interp, &env, "(list-ref '(10 20 30) 2)");
    assert_eq!(num(&result), 30);
}

#[test]
fn test_cadr_and_caddr() {
    let (interp, env) = setup();
    assert_eq!(num(&run(&interp, &env, "(cadr '(1 2 3))")), 2);
    assert_eq!(num(&run(&interp, &env, "(caddr '(1 2 3))")), 3);
}

// ============================================================================
// Arithmetic and predicate builtins
// ============================================================================

#[test]
fn test_expt_and_sign() {
    let (interp, env) = setup();
    assert_eq!(num(&run(&interp, &env, "(expt 2 10)")), 1024);
    assert_eq!(num(&run(&interp, &env, "(sign -5)")), -1);
    assert_eq!(num(&run(&interp, &env, "(sign 0)")), 0);
}

#[test]
fn test_modulo_and_remainder_sign_rules() {
    let (interp, env) = setup();
    // modulo result takes the sign of the divisor.
    assert_eq!(num(&run(&interp, &env, "(modulo 7 3)")), 1);
    assert_eq!(num(&run(&interp, &env, "(modulo -7 3)")), 2);
    assert_eq!(num(&run(&interp, &env, "(modulo 7 -3)")), -2);
    // remainder takes the sign of the dividend.
    assert_eq!(num(&run(&interp, &env, "(remainder -7 3)")), -1);
}

#[test]
fn test_numerator_denominator() {
    let (interp, env) = setup();
    assert_eq!(num(&run(&interp, &env, "(numerator 3/4)")), 3);
    assert_eq!(num(&run(&interp, &env, "(denominator 3/4)")), 4);
}

#[test]
fn test_recursive_even_odd_predicates() {
    let (interp, env) = setup();
    run(
        &interp,
        &env,
        r#"
        (define (my-even? n) (if (= n 0) #t (my-odd? (- n 1))))
        (define (my-odd? n) (if (= n 0) #f (my-even? (- n 1))))
        "#,
    );
    assert!(matches!(run(&interp, &env, "(my-even? 10)"), Value::Bool(true)));
    assert!(matches!(run(&interp, &env, "(my-odd? 10)"), Value::Bool(false)));
}

#[test]
fn test_type_predicates() {
    let (interp, env) = setup();
    assert!(matches!(run(&interp, &env, "(list? '(1 2 3))"), Value::Bool(true)));
    assert!(matches!(run(&interp, &env, "(number? 42)"), Value::Bool(true)));
    assert!(matches!(run(&interp, &env, "(string? \"hello\")"), Value::Bool(true)));
    assert!(matches!(run(&interp, &env, "(null? '())"), Value::Bool(true)));
    assert!(matches!(run(&interp, &env, "(pair? (cons 1 2))"), Value::Bool(true)));
    assert!(matches!(run(&interp, &env, "(atom? 5)"), Value::Bool(true)));
}

#[test]
fn test_logic_operators() {
    let (interp, env) = setup();
    assert!(matches!(run(&interp, &env, "(and #t #t)"), Value::Bool(true)));
    assert!(matches!(run(&interp, &env, "(or #f #t)"), Value::Bool(true)));
    assert!(matches!(run(&interp, &env, "(not #f)"), Value::Bool(true)));
    assert!(matches!(run(&interp, &env, "(and #t #f)"), Value::Bool(false)));
}

#[test]
fn test_comparison_chains() {
    let (interp, env) = setup();
    assert!(matches!(run(&interp, &env, "(< 1 2 3)"), Value::Bool(true)));
    assert!(matches!(run(&interp, &env, "(< 1 3 2)"), Value::Bool(false)));
    assert!(matches!(run(&interp, &env, "(<= 1 1 2)"), Value::Bool(true)));
}

#[test]
fn test_eq_and_equal_distinguish_identity_from_structure() {
    let (interp, env) = setup();
    // Two freshly-built equal lists are never `eq?` (no structural sharing)
    // but are always `equal?`.
    assert!(matches!(run(&interp, &env, "(eq? '(1 2) '(1 2))"), Value::Bool(false)));
    assert!(matches!(run(&interp, &env, "(equal? '(1 2) '(1 2))"), Value::Bool(true)));
}
