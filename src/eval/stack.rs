use super::EvalError;
use crate::ast::{Object, Operator};

fn underflow(op: impl ToString, index: usize, needed: usize, found: usize) -> EvalError {
    EvalError::StackUnderflow {
        op: op.to_string(),
        index,
        needed,
        found,
    }
}

/// Pop one operand for `op`
pub(crate) fn pop(stack: &mut Vec<Object>, op: Operator, index: usize) -> Result<Object, EvalError> {
    stack.pop().ok_or_else(|| underflow(op, index, 1, 0))
}

/// Pop two operands, returned as (pushed first, pushed second)
pub(crate) fn pop_pair(
    stack: &mut Vec<Object>,
    op: Operator,
    index: usize,
) -> Result<(Object, Object), EvalError> {
    let found = stack.len();
    if found < 2 {
        return Err(underflow(op, index, 2, found));
    }
    let rhs = stack.pop().ok_or_else(|| underflow(op, index, 2, found))?;
    let lhs = stack.pop().ok_or_else(|| underflow(op, index, 2, found))?;
    Ok((lhs, rhs))
}

/// dup: push another reference to the top object
pub(crate) fn dup(stack: &mut Vec<Object>, index: usize) -> Result<(), EvalError> {
    let top = stack
        .last()
        .cloned()
        .ok_or_else(|| underflow(Operator::Duplicate, index, 1, 0))?;
    stack.push(top);
    Ok(())
}

/// Pop the top `n` objects, returned in push order
pub(crate) fn take_args(
    stack: &mut Vec<Object>,
    function: &str,
    n: usize,
) -> Result<Vec<Object>, EvalError> {
    if stack.len() < n {
        return Err(EvalError::NotEnoughArguments {
            function: function.to_string(),
            expected: n,
            got: stack.len(),
        });
    }
    Ok(stack.split_off(stack.len() - n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pop_pair_order() {
        let mut stack = vec![Object::int(1), Object::int(2), Object::int(3)];
        let (lhs, rhs) = pop_pair(&mut stack, Operator::Subtract, 0).unwrap();
        assert_eq!(lhs.as_int(), Some(2));
        assert_eq!(rhs.as_int(), Some(3));
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn pop_pair_underflow_leaves_stack() {
        let mut stack = vec![Object::int(1)];
        let err = pop_pair(&mut stack, Operator::Add, 4).unwrap_err();
        assert!(matches!(
            err,
            EvalError::StackUnderflow { index: 4, needed: 2, found: 1, .. }
        ));
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn dup_shares_object() {
        let mut stack = vec![Object::str("x")];
        dup(&mut stack, 0).unwrap();
        assert_eq!(stack.len(), 2);
        assert!(Object::ptr_eq(&stack[0], &stack[1]));
        assert!(dup(&mut Vec::new(), 0).is_err());
    }

    #[test]
    fn take_args_in_push_order() {
        let mut stack = vec![Object::int(1), Object::int(2), Object::int(3)];
        let args = take_args(&mut stack, "f", 2).unwrap();
        assert_eq!(args[0].as_int(), Some(2));
        assert_eq!(args[1].as_int(), Some(3));
        assert_eq!(stack.len(), 1);
        assert!(take_args(&mut stack, "f", 2).is_err());
        assert!(take_args(&mut stack, "f", 0).unwrap().is_empty());
    }
}
