//! Operator library - pure functions from operator and operands to a result
//!
//! `undefined` is absorbing: any operand that is undefined makes the result
//! undefined without further dispatch. Integer arithmetic wraps on overflow.
//! Only the int and string pairings below are defined; everything else is
//! `OpError::Unsupported`, which the evaluator absorbs as `undefined`.

use crate::ast::{Object, Operator, Value};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OpError {
    #[error("unsupported operand types for {op}: {operands}")]
    Unsupported { op: Operator, operands: String },
    #[error("division by zero")]
    DivisionByZero,
}

impl OpError {
    /// Whether the evaluator must abort instead of absorbing the failure
    pub fn is_fatal(&self) -> bool {
        matches!(self, OpError::DivisionByZero)
    }
}

fn unsupported(op: Operator, operands: &[&Object]) -> OpError {
    let operands = operands
        .iter()
        .map(|o| o.type_name())
        .collect::<Vec<_>>()
        .join(" and ");
    OpError::Unsupported { op, operands }
}

fn bool_int(b: bool) -> Object {
    Object::int(b as i64)
}

/// Apply `Negate` or `LogicalNot` to a single operand
pub fn apply_unary(op: Operator, operand: &Object) -> Result<Object, OpError> {
    match (op, operand.as_value()) {
        (_, Some(Value::Undefined)) => Ok(Object::undefined()),
        (Operator::Negate, Some(Value::Int(n))) => Ok(Object::int(n.wrapping_neg())),
        (Operator::LogicalNot, Some(Value::Int(n))) => Ok(bool_int(*n == 0)),
        _ => Err(unsupported(op, &[operand])),
    }
}

/// Apply a binary operator; `lhs` was pushed before `rhs`
pub fn apply_binary(op: Operator, lhs: &Object, rhs: &Object) -> Result<Object, OpError> {
    if lhs.is_undefined() || rhs.is_undefined() {
        return Ok(Object::undefined());
    }
    match (lhs.as_value(), rhs.as_value()) {
        (Some(Value::Int(a)), Some(Value::Int(b))) => {
            int_binary(op, *a, *b).ok_or_else(|| unsupported(op, &[lhs, rhs]))?
        }
        (Some(Value::Str(a)), Some(Value::Str(b))) if op == Operator::Add => {
            Ok(Object::str(format!("{}{}", a, b)))
        }
        _ => Err(unsupported(op, &[lhs, rhs])),
    }
}

/// Int x Int dispatch; `None` means the operator is not defined on ints
fn int_binary(op: Operator, a: i64, b: i64) -> Option<Result<Object, OpError>> {
    let result = match op {
        Operator::Add => Object::int(a.wrapping_add(b)),
        Operator::Subtract => Object::int(a.wrapping_sub(b)),
        Operator::Multiply => Object::int(a.wrapping_mul(b)),
        Operator::Divide => {
            if b == 0 {
                return Some(Err(OpError::DivisionByZero));
            }
            Object::int(a.wrapping_div(b))
        }
        Operator::Modulo => {
            if b == 0 {
                return Some(Err(OpError::DivisionByZero));
            }
            Object::int(a.wrapping_rem(b))
        }
        Operator::Equal => bool_int(a == b),
        Operator::NotEqual => bool_int(a != b),
        Operator::LessThan => bool_int(a < b),
        Operator::GreaterThan => bool_int(a > b),
        Operator::LessEqual => bool_int(a <= b),
        Operator::GreaterEqual => bool_int(a >= b),
        Operator::LogicalAnd => bool_int(a != 0 && b != 0),
        Operator::LogicalOr => bool_int(a != 0 || b != 0),
        Operator::Negate
        | Operator::LogicalNot
        | Operator::Duplicate
        | Operator::Assign
        | Operator::AccessProperty
        | Operator::FunctionCall => return None,
    };
    Some(Ok(result))
}
