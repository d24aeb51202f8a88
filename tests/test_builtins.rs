//! Integration tests for the built-in registry

#[path = "common/mod.rs"]
mod common;
use common::{
    capturing_evaluator, Builtins, EvalConfig, EvalError, Evaluator, Object, Operator, Stream,
};

#[test]
fn test_print_writes_and_yields_undefined() {
    let (mut evaluator, out) = capturing_evaluator();
    let stream = Stream::builder()
        .int(2)
        .int(3)
        .op(Operator::Add)
        .str("print")
        .op(Operator::FunctionCall)
        .build();
    let result = evaluator.eval(&stream).unwrap();
    assert!(result.is_undefined());
    assert_eq!(out.contents(), "5\n");
}

#[test]
fn test_print_display_forms() {
    let (mut evaluator, out) = capturing_evaluator();
    let print = |v: Object| {
        Stream::builder()
            .push(v)
            .str("print")
            .op(Operator::FunctionCall)
            .build()
    };
    for value in [
        Object::str("hello"),
        Object::null(),
        Object::undefined(),
        Object::float(1.5),
    ] {
        evaluator.eval(&print(value)).unwrap();
    }
    assert_eq!(out.contents(), "hello\nnull\nundefined\n1.5\n");
}

#[test]
fn test_print_underflow_is_fatal() {
    let (mut evaluator, out) = capturing_evaluator();
    let stream = Stream::builder().str("print").op(Operator::FunctionCall).build();
    assert!(matches!(
        evaluator.eval(&stream),
        Err(EvalError::NotEnoughArguments { expected: 1, got: 0, .. })
    ));
    assert!(out.contents().is_empty());
}

#[test]
fn test_builtin_shadows_variable() {
    let (mut evaluator, out) = capturing_evaluator();
    evaluator.set_var("print", Object::closure("print", &["x"], Stream::default()));
    let stream = Stream::builder()
        .int(1)
        .str("print")
        .op(Operator::FunctionCall)
        .build();
    evaluator.eval(&stream).unwrap();
    assert_eq!(out.contents(), "1\n");
}

#[test]
fn test_custom_builtin() {
    let mut builtins = Builtins::empty();
    builtins.register_fn("max", 2, |args| {
        match (args[0].as_int(), args[1].as_int()) {
            (Some(a), Some(b)) => Ok(Object::int(a.max(b))),
            _ => Err(EvalError::ExecError("max: expected two ints".into())),
        }
    });
    let mut evaluator = Evaluator::with_config(builtins, EvalConfig::default());
    let stream = Stream::builder()
        .int(4)
        .int(9)
        .str("max")
        .op(Operator::FunctionCall)
        .build();
    assert_eq!(evaluator.eval(&stream).unwrap().as_int(), Some(9));

    let bad = Stream::builder()
        .int(4)
        .str("x")
        .str("max")
        .op(Operator::FunctionCall)
        .build();
    assert!(matches!(evaluator.eval(&bad), Err(EvalError::ExecError(_))));
}

#[test]
fn test_empty_registry_has_no_print() {
    let mut evaluator = Evaluator::with_config(Builtins::empty(), EvalConfig::default());
    let stream = Stream::builder()
        .int(1)
        .str("print")
        .op(Operator::FunctionCall)
        .build();
    assert!(matches!(
        evaluator.eval(&stream),
        Err(EvalError::UnknownFunction { .. })
    ));
}

#[test]
fn test_builtins_mut_registers_late() {
    let mut evaluator = Evaluator::with_config(Builtins::empty(), EvalConfig::default());
    evaluator
        .builtins_mut()
        .register_fn("answer", 0, |_| Ok(Object::int(42)));
    let stream = Stream::builder().str("answer").op(Operator::FunctionCall).build();
    assert_eq!(evaluator.eval(&stream).unwrap().as_int(), Some(42));
    assert_eq!(evaluator.builtins().names(), vec!["answer"]);
}

#[test]
fn test_print_takes_only_top_of_stack() {
    // 1 2 "print" call -> prints 2, leaves 1 below the undefined result
    let (mut evaluator, out) = capturing_evaluator();
    let stream = Stream::builder()
        .int(1)
        .int(2)
        .str("print")
        .op(Operator::FunctionCall)
        .op(Operator::LogicalAnd)
        .build();
    assert!(evaluator.eval(&stream).unwrap().is_undefined());
    assert_eq!(out.contents(), "2\n");
}
