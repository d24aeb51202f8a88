//! Display formatting for values, objects and instructions
//!
//! The `Display` forms are what `print` writes and what trace mode shows.

use crate::ast::{ControlFlow, Instruction, Object, ObjectKind, Operator, Value};
use std::fmt;

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
            Value::Null => write!(f, "null"),
            Value::Undefined => write!(f, "undefined"),
            Value::Closure(c) => {
                let name = if c.is_named() { c.name.as_str() } else { "anonymous" };
                write!(f, "<fn {}({})>", name, c.params.join(", "))
            }
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ObjectKind::Value(v) => write!(f, "{}", v),
            ObjectKind::Map(map) => {
                // Sort keys for deterministic output
                let mut entries: Vec<_> = map.iter().collect();
                entries.sort_by_key(|(k, _)| *k);
                write!(f, "{{")?;
                for (i, (key, value)) in entries.into_iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Modulo => "%",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::LessThan => "<",
            Operator::GreaterThan => ">",
            Operator::LessEqual => "<=",
            Operator::GreaterEqual => ">=",
            Operator::LogicalAnd => "&&",
            Operator::LogicalOr => "||",
            Operator::Negate => "neg",
            Operator::LogicalNot => "!",
            Operator::Duplicate => "dup",
            Operator::Assign => "=",
            Operator::AccessProperty => ".",
            Operator::FunctionCall => "call",
        };
        write!(f, "{}", symbol)
    }
}

impl fmt::Display for ControlFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = match self {
            ControlFlow::If => "if",
            ControlFlow::Else => "else",
            ControlFlow::EndIf => "endif",
            ControlFlow::While => "while",
            ControlFlow::EndWhile => "endwhile",
        };
        write!(f, "{}", word)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::PushOperand(obj) => match obj.as_value() {
                Some(Value::Str(s)) => write!(f, "\"{}\"", s),
                _ => write!(f, "{}", obj),
            },
            Instruction::ReadVariable(name) => write!(f, "${}", name),
            Instruction::Operator(op) => write!(f, "{}", op),
            Instruction::ControlFlow(marker) => write!(f, "{}", marker),
        }
    }
}

/// Format an operand stack on one line, bottom first
///
/// Long entries are truncated so trace lines stay readable.
pub fn format_stack(stack: &[Object]) -> String {
    if stack.is_empty() {
        return "(empty)".to_string();
    }
    stack
        .iter()
        .map(|obj| {
            let s = match obj.as_value() {
                Some(Value::Str(s)) => format!("\"{}\"", s),
                _ => obj.to_string(),
            };
            if s.chars().count() > 30 {
                let head: String = s.chars().take(27).collect();
                format!("{}...", head)
            } else {
                s
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
