//! elang - a stack-based evaluator for postfix instruction streams
//!
//! # Overview
//!
//! elang executes programs that a front end has already flattened into
//! reverse Polish order. Operands push themselves, operators pop their
//! operands and push a result, and structured control flow is encoded as
//! in-stream markers.
//!
//! # Core Concepts
//!
//! ## Stack-Based Execution
//!
//! ```text
//! 2 3 +               # Stack: [5]
//! "x" 5 =             # x = 5, Stack: [5]
//! $x 1 -              # Stack: [4]
//! ```
//!
//! ## Control Flow
//!
//! ```text
//! $n 1 <= if 1 else $n 2 * endif
//! while ... <condition> endwhile     # body runs, then the condition decides
//! ```
//!
//! ## Functions
//!
//! Closures carry parameter names and a body stream. Arguments are pushed
//! left to right before the callee, then `call` binds them in a fresh scope
//! whose parent is the caller's environment.
//!
//! # Example
//!
//! ```rust
//! use elang::{Evaluator, Operator, Stream};
//!
//! let stream = Stream::builder().int(2).int(3).op(Operator::Add).build();
//! let mut eval = Evaluator::new();
//! let result = eval.eval(&stream).unwrap();
//! assert_eq!(result.as_int(), Some(5));
//! ```

pub mod ast;
pub mod builtins;
pub mod display;
pub mod env;
pub mod eval;
pub mod ops;

// Re-export commonly used items
pub use ast::{
    json_to_object, object_to_json, Closure, ControlFlow, Instruction, Object, ObjectKind,
    Operator, Stream, StreamBuilder, Value,
};
pub use builtins::{Builtin, Builtins};
pub use env::Environment;
pub use eval::{EvalConfig, EvalError, Evaluator};
pub use ops::OpError;

/// Convenience function to evaluate a stream with a fresh evaluator
pub fn run(stream: &Stream) -> Result<Object, EvalError> {
    let mut evaluator = Evaluator::new();
    evaluator.eval(stream)
}
