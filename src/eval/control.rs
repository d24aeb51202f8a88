use super::{EvalError, Evaluator};
use crate::ast::{ControlFlow, Instruction, Object};
use tracing::trace;

/// From a failed `if` at `at`, find where execution resumes
///
/// Returns the index of the `else` at the same nesting level, or of the
/// matching `endif` if there is none. The caller steps past it. An
/// unbalanced stream returns `stream.len()`.
pub(crate) fn skip_false_branch(stream: &[Instruction], at: usize) -> usize {
    let mut depth = 1usize;
    let mut i = at;
    while depth > 0 {
        i += 1;
        match stream.get(i) {
            None => return stream.len(),
            Some(instr) if instr.is_flow(ControlFlow::If) => depth += 1,
            Some(instr) if instr.is_flow(ControlFlow::EndIf) => depth -= 1,
            Some(instr) if depth == 1 && instr.is_flow(ControlFlow::Else) => break,
            Some(_) => {}
        }
    }
    i
}

/// From an `else` reached at the end of a taken branch, find the matching `endif`
pub(crate) fn skip_else_branch(stream: &[Instruction], at: usize) -> usize {
    let mut depth = 1usize;
    let mut i = at;
    while depth > 0 {
        i += 1;
        match stream.get(i) {
            None => return stream.len(),
            Some(instr) if instr.is_flow(ControlFlow::If) => depth += 1,
            Some(instr) if instr.is_flow(ControlFlow::EndIf) => depth -= 1,
            Some(_) => {}
        }
    }
    i
}

impl Evaluator {
    /// Execute a control-flow marker at `index`
    ///
    /// Returns the index of the last instruction consumed; the main loop
    /// continues from the one after it.
    pub(crate) fn control_flow(
        &self,
        stream: &[Instruction],
        marker: ControlFlow,
        index: usize,
        stack: &mut Vec<Object>,
        loop_starts: &mut Vec<usize>,
    ) -> Result<usize, EvalError> {
        match marker {
            ControlFlow::If => {
                let condition = pop_condition(stack, marker, index)?;
                if condition.is_truthy() {
                    return Ok(index);
                }
                let target = skip_false_branch(stream, index);
                trace!(from = index, to = target, "if: skipping then-branch");
                Ok(target)
            }
            ControlFlow::Else => {
                let target = skip_else_branch(stream, index);
                trace!(from = index, to = target, "else: skipping else-branch");
                Ok(target)
            }
            ControlFlow::EndIf => Ok(index),
            ControlFlow::While => {
                loop_starts.push(index);
                Ok(index)
            }
            ControlFlow::EndWhile => {
                let start = *loop_starts
                    .last()
                    .ok_or(EvalError::UnmatchedEndWhile { index })?;
                let condition = pop_condition(stack, marker, index)?;
                if condition.is_truthy() {
                    trace!(from = index, to = start, "endwhile: looping");
                    Ok(start)
                } else {
                    loop_starts.pop();
                    Ok(index)
                }
            }
        }
    }
}

fn pop_condition(stack: &mut Vec<Object>, marker: ControlFlow, index: usize) -> Result<Object, EvalError> {
    stack.pop().ok_or_else(|| EvalError::StackUnderflow {
        op: marker.to_string(),
        index,
        needed: 1,
        found: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Stream;

    // if(0) [1] if(2) [3] else(4) [5] endif(6) [7] else(8) [9] endif(10)
    fn nested() -> Stream {
        Stream::builder()
            .flow(ControlFlow::If)
            .int(1)
            .flow(ControlFlow::If)
            .int(3)
            .flow(ControlFlow::Else)
            .int(5)
            .flow(ControlFlow::EndIf)
            .int(7)
            .flow(ControlFlow::Else)
            .int(9)
            .flow(ControlFlow::EndIf)
            .build()
    }

    #[test]
    fn false_if_lands_on_outer_else() {
        let stream = nested();
        assert_eq!(skip_false_branch(&stream, 0), 8);
        assert_eq!(skip_false_branch(&stream, 2), 4);
    }

    #[test]
    fn else_skips_to_matching_endif() {
        let stream = nested();
        assert_eq!(skip_else_branch(&stream, 4), 6);
        assert_eq!(skip_else_branch(&stream, 8), 10);
    }

    #[test]
    fn false_if_without_else_lands_on_endif() {
        let stream = Stream::builder()
            .flow(ControlFlow::If)
            .int(1)
            .flow(ControlFlow::EndIf)
            .int(2)
            .build();
        assert_eq!(skip_false_branch(&stream, 0), 2);
    }

    #[test]
    fn unbalanced_runs_to_end() {
        let stream = Stream::builder().flow(ControlFlow::If).int(1).build();
        assert_eq!(skip_false_branch(&stream, 0), 2);
        assert_eq!(skip_else_branch(&stream, 0), 2);
    }
}
