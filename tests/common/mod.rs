//! Common test utilities for elang integration tests

pub use elang::{
    Builtins, ControlFlow, EvalConfig, EvalError, Evaluator, Object, Operator, Stream,
};
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

/// Helper to evaluate a stream on a fresh evaluator with no built-ins
#[allow(dead_code)]
pub fn eval(stream: &Stream) -> Result<Object, EvalError> {
    let mut evaluator = Evaluator::with_config(Builtins::empty(), EvalConfig::default());
    evaluator.eval(stream)
}

/// Writer that appends into a shared buffer, for capturing `print`
#[derive(Clone, Default)]
pub struct SharedBuf(Rc<RefCell<Vec<u8>>>);

#[allow(dead_code)]
impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Helper to build an evaluator whose `print` writes into the returned buffer
#[allow(dead_code)]
pub fn capturing_evaluator() -> (Evaluator, SharedBuf) {
    let buf = SharedBuf::default();
    let builtins = Builtins::with_output(Box::new(buf.clone()));
    (Evaluator::with_config(builtins, EvalConfig::default()), buf)
}

/// factorial(n): n <= 1 ? 1 : n * factorial(n - 1)
#[allow(dead_code)]
pub fn factorial() -> Object {
    let body = Stream::builder()
        .var("n")
        .int(1)
        .op(Operator::LessEqual)
        .flow(ControlFlow::If)
        .int(1)
        .flow(ControlFlow::Else)
        .var("n")
        .var("n")
        .int(1)
        .op(Operator::Subtract)
        .var("factorial")
        .op(Operator::FunctionCall)
        .op(Operator::Multiply)
        .flow(ControlFlow::EndIf)
        .build();
    Object::closure("factorial", &["n"], body)
}
