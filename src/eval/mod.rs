//! Evaluator for elang - a stack machine over postfix instruction streams
//!
//! The evaluator walks a stream with an explicit instruction pointer:
//! - Operands and variable reads push onto the operand stack
//! - Operators pop their operands and push one result
//! - `if`/`else`/`endif` skip forward by nesting depth
//! - `while`/`endwhile` jump back to a recorded loop start
//! - `call` re-enters the evaluator with a fresh call scope
//!
//! # Failure policy
//!
//! Operators applied to unsupported operand types, or to `undefined`, are
//! absorbed: the result is `undefined` and evaluation continues. Stack
//! underflow, bad assignment/property operands, division by zero, an
//! unmatched `endwhile` and failed calls abort the whole stream.

mod call;
mod control;
mod stack;

use crate::ast::{Instruction, Object, Operator, Stream, Value};
use crate::builtins::Builtins;
use crate::display::format_stack;
use crate::env::Environment;
use crate::ops::{self, OpError};
use std::cell::Cell;
use thiserror::Error;
use tracing::{debug, trace};

/// Default recursion limit when `ELANG_MAX_RECURSION` is unset
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1000;

#[derive(Error, Debug)]
pub enum EvalError {
    #[error("Stack underflow at instruction {index}: {op} needs {needed} operand(s), found {found}")]
    StackUnderflow {
        op: String,
        index: usize,
        needed: usize,
        found: usize,
    },
    #[error("Invalid assignment target at instruction {index}: expected string, got {got}")]
    InvalidAssignTarget { got: &'static str, index: usize },
    #[error("Invalid property name at instruction {index}: expected string, got {got}")]
    InvalidPropertyName { got: &'static str, index: usize },
    #[error("Division by zero at instruction {index}")]
    DivisionByZero { index: usize },
    #[error("endwhile without matching while at instruction {index}")]
    UnmatchedEndWhile { index: usize },
    #[error("Unknown function '{name}' at instruction {index}")]
    UnknownFunction { name: String, index: usize },
    #[error("Not enough arguments for {function}: expected {expected}, got {got}")]
    NotEnoughArguments {
        function: String,
        expected: usize,
        got: usize,
    },
    #[error("Recursion limit exceeded ({limit} calls). Set ELANG_MAX_RECURSION to increase.")]
    RecursionLimit { limit: usize },
    #[error("Execution error: {0}")]
    ExecError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Evaluator settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalConfig {
    /// Maximum nesting of function calls before `RecursionLimit`
    pub max_call_depth: usize,
    /// Print each instruction and the stack to stderr
    pub trace: bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            trace: false,
        }
    }
}

impl EvalConfig {
    /// Defaults overridden by `ELANG_MAX_RECURSION` and `ELANG_TRACE`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        EvalConfig {
            max_call_depth: std::env::var("ELANG_MAX_RECURSION")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_call_depth),
            trace: std::env::var("ELANG_TRACE")
                .map(|s| s == "1" || s.eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.trace),
        }
    }
}

/// The evaluator owns the root environment and the built-in registry
#[derive(Debug)]
pub struct Evaluator {
    /// Root scope, shared by every top-level `eval`
    pub(crate) root: Environment<'static>,
    pub(crate) builtins: Builtins,
    pub(crate) config: EvalConfig,
    /// Current function call nesting
    pub(crate) call_depth: Cell<usize>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    /// Standard built-ins, configuration from the environment
    pub fn new() -> Self {
        Self::with_config(Builtins::standard(), EvalConfig::from_env())
    }

    pub fn with_builtins(builtins: Builtins) -> Self {
        Self::with_config(builtins, EvalConfig::from_env())
    }

    pub fn with_config(builtins: Builtins, config: EvalConfig) -> Self {
        Evaluator {
            root: Environment::new(),
            builtins,
            config,
            call_depth: Cell::new(0),
        }
    }

    /// Enable or disable trace mode
    pub fn set_trace_mode(&mut self, enabled: bool) {
        self.config.trace = enabled;
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn builtins(&self) -> &Builtins {
        &self.builtins
    }

    pub fn builtins_mut(&mut self) -> &mut Builtins {
        &mut self.builtins
    }

    pub fn root(&self) -> &Environment<'static> {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Environment<'static> {
        &mut self.root
    }

    /// Bind a variable in the root environment
    pub fn set_var(&mut self, name: impl Into<String>, value: Object) {
        self.root.set(name, value);
    }

    /// Read a variable from the root environment (`undefined` if unbound)
    pub fn get_var(&self, name: &str) -> Object {
        self.root.lookup(name)
    }

    /// Current function call nesting depth
    pub fn call_depth(&self) -> usize {
        self.call_depth.get()
    }

    /// Evaluate a stream against the root environment
    pub fn eval(&mut self, stream: &Stream) -> Result<Object, EvalError> {
        let mut root = std::mem::take(&mut self.root);
        let result = self.evaluate(stream, &mut root);
        self.root = root;
        result
    }

    /// Evaluate a stream in `env` on a fresh operand stack
    ///
    /// The result is the top of the stack when the stream ends, or
    /// `undefined` if the stack is empty.
    pub fn evaluate(&self, stream: &Stream, env: &mut Environment<'_>) -> Result<Object, EvalError> {
        let mut stack: Vec<Object> = Vec::new();
        let mut loop_starts: Vec<usize> = Vec::new();
        let mut i = 0;

        while i < stream.len() {
            let instr = &stream[i];
            trace!(index = i, depth = stack.len(), instruction = %instr, "step");
            if self.config.trace {
                eprintln!("\x1b[90m>>> {:>4} {} │ {}\x1b[0m", i, instr, format_stack(&stack));
            }

            match instr {
                Instruction::PushOperand(obj) => stack.push(obj.clone()),
                Instruction::ReadVariable(name) => stack.push(env.lookup(name)),
                Instruction::Operator(op) => self.apply_operator(*op, i, &mut stack, env)?,
                Instruction::ControlFlow(marker) => {
                    i = self.control_flow(stream, *marker, i, &mut stack, &mut loop_starts)?;
                }
            }
            i += 1;
        }

        Ok(stack.pop().unwrap_or_else(Object::undefined))
    }

    fn apply_operator(
        &self,
        op: Operator,
        index: usize,
        stack: &mut Vec<Object>,
        env: &mut Environment<'_>,
    ) -> Result<(), EvalError> {
        match op {
            Operator::Assign => self.op_assign(index, stack, env),
            Operator::AccessProperty => self.op_access_property(index, stack),
            Operator::FunctionCall => self.op_call(index, stack, env),
            Operator::Duplicate => stack::dup(stack, index),
            Operator::Negate | Operator::LogicalNot => {
                let operand = stack::pop(stack, op, index)?;
                let result = absorb(op, index, ops::apply_unary(op, &operand))?;
                stack.push(result);
                Ok(())
            }
            Operator::Add
            | Operator::Subtract
            | Operator::Multiply
            | Operator::Divide
            | Operator::Modulo
            | Operator::Equal
            | Operator::NotEqual
            | Operator::LessThan
            | Operator::GreaterThan
            | Operator::LessEqual
            | Operator::GreaterEqual
            | Operator::LogicalAnd
            | Operator::LogicalOr => {
                let (lhs, rhs) = stack::pop_pair(stack, op, index)?;
                let result = absorb(op, index, ops::apply_binary(op, &lhs, &rhs))?;
                stack.push(result);
                Ok(())
            }
        }
    }

    /// `name value =`: bind in the current scope and leave the value on the stack
    fn op_assign(
        &self,
        index: usize,
        stack: &mut Vec<Object>,
        env: &mut Environment<'_>,
    ) -> Result<(), EvalError> {
        let (target, value) = stack::pop_pair(stack, Operator::Assign, index)?;
        let name = target.as_str().ok_or_else(|| EvalError::InvalidAssignTarget {
            got: target.type_name(),
            index,
        })?;
        debug!(index, name, "assign");
        env.set(name, value.clone());
        stack.push(value);
        Ok(())
    }

    /// `target name .`: missing keys and non-map targets yield `undefined`
    fn op_access_property(&self, index: usize, stack: &mut Vec<Object>) -> Result<(), EvalError> {
        let (target, property) = stack::pop_pair(stack, Operator::AccessProperty, index)?;
        let name = property.as_str().ok_or_else(|| EvalError::InvalidPropertyName {
            got: property.type_name(),
            index,
        })?;
        let found = target
            .as_map()
            .and_then(|map| map.get(name))
            .cloned()
            .unwrap_or_else(Object::undefined);
        stack.push(found);
        Ok(())
    }
}

/// Apply the dual failure policy to an operator result
fn absorb(op: Operator, index: usize, result: Result<Object, OpError>) -> Result<Object, EvalError> {
    match result {
        Ok(obj) => Ok(obj),
        Err(err) if err.is_fatal() => Err(EvalError::DivisionByZero { index }),
        Err(err) => {
            debug!(index, %op, %err, "absorbed operator failure as undefined");
            Ok(Object::value(Value::Undefined))
        }
    }
}
