use super::{stack, EvalError, Evaluator};
use crate::ast::{Closure, Object, Operator, Value};
use crate::env::Environment;
use std::rc::Rc;
use tracing::debug;

/// Grow the host stack when less than this remains before entering a call body
const RED_ZONE: usize = 256 * 1024;

/// Size of each new stack segment
const STACK_PER_CALL: usize = 2 * 1024 * 1024;

/// Run `f` on a fresh stack segment if the current one is nearly exhausted
///
/// Calls recurse through `evaluate`, so without this a deep but legal call
/// chain can overflow a small thread stack before `max_call_depth` is hit.
#[inline]
fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_CALL, f)
}

impl Evaluator {
    /// `call`: pop the callee and dispatch on what it is
    ///
    /// - closure: invoke it
    /// - string naming a built-in: run the built-in
    /// - string naming a variable bound to a closure: invoke that closure
    /// - any other string: `UnknownFunction`
    /// - anything else: push `undefined`
    pub(crate) fn op_call(
        &self,
        index: usize,
        stack: &mut Vec<Object>,
        env: &Environment<'_>,
    ) -> Result<(), EvalError> {
        let callee = stack::pop(stack, Operator::FunctionCall, index)?;
        let result = match callee.as_value() {
            Some(Value::Closure(closure)) => self.call(closure, stack, env)?,
            Some(Value::Str(name)) => self.call_by_name(name, index, stack, env)?,
            _ => {
                debug!(index, callee = callee.type_name(), "call on non-callable yields undefined");
                Object::undefined()
            }
        };
        stack.push(result);
        Ok(())
    }

    fn call_by_name(
        &self,
        name: &str,
        index: usize,
        stack: &mut Vec<Object>,
        env: &Environment<'_>,
    ) -> Result<Object, EvalError> {
        if let Some(builtin) = self.builtins.get(name) {
            let args = stack::take_args(stack, name, builtin.arity())?;
            debug!(index, name, argc = args.len(), "builtin call");
            return builtin.call(args);
        }
        match env.get(name).and_then(Object::as_closure).map(Rc::clone) {
            Some(closure) => self.call(&closure, stack, env),
            None => Err(EvalError::UnknownFunction {
                name: name.to_string(),
                index,
            }),
        }
    }

    /// Invoke a closure with arguments taken from the caller's stack
    ///
    /// The last parameter binds to the top of the stack. The call scope's
    /// parent is the caller's environment, so free variables in the body
    /// resolve dynamically. A named closure is also bound to its own name
    /// in the call scope.
    pub fn call(
        &self,
        closure: &Rc<Closure>,
        stack: &mut Vec<Object>,
        env: &Environment<'_>,
    ) -> Result<Object, EvalError> {
        let label = if closure.is_named() { closure.name.as_str() } else { "<anonymous>" };
        let args = stack::take_args(stack, label, closure.params.len())?;

        let depth = self.call_depth.get();
        if depth >= self.config.max_call_depth {
            return Err(EvalError::RecursionLimit {
                limit: self.config.max_call_depth,
            });
        }

        let mut scope = Environment::child(env);
        for (param, arg) in closure.params.iter().zip(args) {
            scope.set(param.as_str(), arg);
        }
        if closure.is_named() {
            scope.set(closure.name.as_str(), Object::value(Value::Closure(Rc::clone(closure))));
        }

        debug!(function = label, depth = depth + 1, "enter");
        self.call_depth.set(depth + 1);
        let result = ensure_sufficient_stack(|| self.evaluate(&closure.body, &mut scope));
        self.call_depth.set(depth);
        debug!(function = label, ok = result.is_ok(), "exit");

        result
    }
}
