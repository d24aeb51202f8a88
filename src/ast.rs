//! Data model for elang - values, objects and instruction streams
//!
//! A program reaches the evaluator as a flat postfix stream:
//! - Operands push themselves
//! - Variable reads push the bound object (or `undefined`)
//! - Operators pop their operands and push a result
//! - Control-flow markers move the instruction pointer

use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::ops::Deref;
use std::rc::Rc;

/// Convert an Object to a JSON value for inspection
pub fn object_to_json(obj: &Object) -> JsonValue {
    match obj.kind() {
        ObjectKind::Map(map) => JsonValue::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), object_to_json(v)))
                .collect(),
        ),
        ObjectKind::Value(Value::Int(n)) => JsonValue::Number((*n).into()),
        ObjectKind::Value(Value::Float(f)) => serde_json::Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        ObjectKind::Value(Value::Str(s)) => JsonValue::String(s.clone()),
        ObjectKind::Value(Value::Null | Value::Undefined | Value::Closure(_)) => JsonValue::Null,
    }
}

/// Convert a JSON value to an Object
///
/// Booleans become C-style ints and arrays become maps keyed by position.
pub fn json_to_object(json: JsonValue) -> Object {
    match json {
        JsonValue::Null => Object::null(),
        JsonValue::Bool(b) => Object::int(b as i64),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Object::int(i),
            None => Object::float(n.as_f64().unwrap_or(0.0)),
        },
        JsonValue::String(s) => Object::str(s),
        JsonValue::Array(items) => Object::map(
            items
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), json_to_object(v)))
                .collect(),
        ),
        JsonValue::Object(obj) => Object::map(
            obj.into_iter()
                .map(|(k, v)| (k, json_to_object(v)))
                .collect(),
        ),
    }
}

/// A callable value: parameter names, a body stream and an optional self-name
#[derive(Debug, Clone)]
pub struct Closure {
    /// Name bound to the closure inside its own call scope (empty for anonymous)
    pub name: String,
    pub params: Vec<String>,
    pub body: Stream,
}

impl Closure {
    pub fn new(name: impl Into<String>, params: Vec<String>, body: Stream) -> Self {
        Closure {
            name: name.into(),
            params,
            body,
        }
    }

    pub fn is_named(&self) -> bool {
        !self.name.is_empty()
    }
}

/// A primitive value
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Null,
    /// Missing-value sentinel, distinct from Null
    Undefined,
    Closure(Rc<Closure>),
}

impl Value {
    /// Name of the value's type, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Null => "null",
            Value::Undefined => "undefined",
            Value::Closure(_) => "function",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Null | Value::Undefined | Value::Closure(_) => false,
        }
    }
}

/// What an Object holds: a primitive or a structured record
#[derive(Debug)]
pub enum ObjectKind {
    Value(Value),
    Map(HashMap<String, Object>),
}

/// A shared, immutable runtime object
///
/// Cloning an Object clones the reference, so the operand stack, environment
/// bindings and map entries can all alias the same object.
#[derive(Debug, Clone)]
pub struct Object(Rc<ObjectKind>);

impl Object {
    pub fn new(kind: ObjectKind) -> Self {
        Object(Rc::new(kind))
    }

    pub fn value(value: Value) -> Self {
        Object::new(ObjectKind::Value(value))
    }

    pub fn map(entries: HashMap<String, Object>) -> Self {
        Object::new(ObjectKind::Map(entries))
    }

    pub fn int(n: i64) -> Self {
        Object::value(Value::Int(n))
    }

    pub fn float(f: f64) -> Self {
        Object::value(Value::Float(f))
    }

    pub fn str(s: impl Into<String>) -> Self {
        Object::value(Value::Str(s.into()))
    }

    pub fn null() -> Self {
        Object::value(Value::Null)
    }

    pub fn undefined() -> Self {
        Object::value(Value::Undefined)
    }

    pub fn closure(name: impl Into<String>, params: &[&str], body: Stream) -> Self {
        let params = params.iter().map(|p| p.to_string()).collect();
        Object::value(Value::Closure(Rc::new(Closure::new(name, params, body))))
    }

    pub fn kind(&self) -> &ObjectKind {
        &self.0
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self.kind() {
            ObjectKind::Value(v) => Some(v),
            ObjectKind::Map(_) => None,
        }
    }

    pub fn as_map(&self) -> Option<&HashMap<String, Object>> {
        match self.kind() {
            ObjectKind::Map(m) => Some(m),
            ObjectKind::Value(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self.as_value() {
            Some(Value::Int(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self.as_value() {
            Some(Value::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_closure(&self) -> Option<&Rc<Closure>> {
        match self.as_value() {
            Some(Value::Closure(c)) => Some(c),
            _ => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self.as_value(), Some(Value::Undefined))
    }

    /// Maps are never truthy; primitives follow `Value::is_truthy`
    pub fn is_truthy(&self) -> bool {
        self.as_value().map(Value::is_truthy).unwrap_or(false)
    }

    pub fn type_name(&self) -> &'static str {
        match self.kind() {
            ObjectKind::Value(v) => v.type_name(),
            ObjectKind::Map(_) => "map",
        }
    }

    /// True when both handles refer to the same object
    pub fn ptr_eq(a: &Object, b: &Object) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }
}

impl From<Value> for Object {
    fn from(value: Value) -> Self {
        Object::value(value)
    }
}

impl From<i64> for Object {
    fn from(n: i64) -> Self {
        Object::int(n)
    }
}

impl From<&str> for Object {
    fn from(s: &str) -> Self {
        Object::str(s)
    }
}

/// Binary, unary and structural operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,
    LogicalAnd,
    LogicalOr,
    Negate,
    LogicalNot,
    Duplicate,
    Assign,
    AccessProperty,
    FunctionCall,
}

/// Structured control-flow markers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlFlow {
    If,
    Else,
    EndIf,
    While,
    EndWhile,
}

/// A single instruction of a postfix stream
#[derive(Debug, Clone)]
pub enum Instruction {
    PushOperand(Object),
    ReadVariable(String),
    Operator(Operator),
    ControlFlow(ControlFlow),
}

impl Instruction {
    pub fn is_flow(&self, marker: ControlFlow) -> bool {
        matches!(self, Instruction::ControlFlow(m) if *m == marker)
    }
}

/// An immutable, shared instruction sequence
///
/// Closures hold their body as a Stream, so cloning is a reference bump.
#[derive(Debug, Clone)]
pub struct Stream(Rc<[Instruction]>);

impl Stream {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Stream(instructions.into())
    }

    pub fn builder() -> StreamBuilder {
        StreamBuilder::default()
    }
}

impl Default for Stream {
    fn default() -> Self {
        Stream::new(Vec::new())
    }
}

impl Deref for Stream {
    type Target = [Instruction];

    fn deref(&self) -> &[Instruction] {
        &self.0
    }
}

impl From<Vec<Instruction>> for Stream {
    fn from(instructions: Vec<Instruction>) -> Self {
        Stream::new(instructions)
    }
}

/// Fluent construction of streams, for hosts that have no front end
#[derive(Debug, Default)]
pub struct StreamBuilder {
    instructions: Vec<Instruction>,
}

impl StreamBuilder {
    pub fn push(mut self, obj: impl Into<Object>) -> Self {
        self.instructions.push(Instruction::PushOperand(obj.into()));
        self
    }

    pub fn int(self, n: i64) -> Self {
        self.push(Object::int(n))
    }

    pub fn float(self, f: f64) -> Self {
        self.push(Object::float(f))
    }

    pub fn str(self, s: &str) -> Self {
        self.push(Object::str(s))
    }

    pub fn null(self) -> Self {
        self.push(Object::null())
    }

    pub fn undefined(self) -> Self {
        self.push(Object::undefined())
    }

    pub fn var(mut self, name: &str) -> Self {
        self.instructions.push(Instruction::ReadVariable(name.to_string()));
        self
    }

    pub fn op(mut self, op: Operator) -> Self {
        self.instructions.push(Instruction::Operator(op));
        self
    }

    pub fn flow(mut self, marker: ControlFlow) -> Self {
        self.instructions.push(Instruction::ControlFlow(marker));
        self
    }

    /// Append every instruction of an existing stream
    pub fn extend(mut self, stream: &Stream) -> Self {
        self.instructions.extend(stream.iter().cloned());
        self
    }

    pub fn build(self) -> Stream {
        Stream::new(self.instructions)
    }
}
