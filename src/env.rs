//! Environment chain for variable resolution
//!
//! Each environment owns its own bindings and borrows its parent. A call
//! scope therefore cannot outlive the environment it was created from.

use crate::ast::Object;
use std::collections::HashMap;

/// A scope of variable bindings with an optional parent
#[derive(Debug, Default)]
pub struct Environment<'p> {
    vars: HashMap<String, Object>,
    parent: Option<&'p Environment<'p>>,
}

impl Environment<'static> {
    /// Create a root environment with no parent
    pub fn new() -> Self {
        Environment {
            vars: HashMap::new(),
            parent: None,
        }
    }
}

impl<'p> Environment<'p> {
    /// Create an empty scope whose lookups fall back to `parent`
    pub fn child(parent: &'p Environment<'p>) -> Self {
        Environment {
            vars: HashMap::new(),
            parent: Some(parent),
        }
    }

    /// Bind a name in this scope, replacing any existing local binding
    pub fn set(&mut self, name: impl Into<String>, value: Object) {
        self.vars.insert(name.into(), value);
    }

    /// Look up a name, searching from this scope outward
    pub fn get(&self, name: &str) -> Option<&Object> {
        let mut scope = Some(self);
        while let Some(env) = scope {
            if let Some(obj) = env.vars.get(name) {
                return Some(obj);
            }
            scope = env.parent;
        }
        None
    }

    /// Like `get`, but an unbound name yields `undefined`
    pub fn lookup(&self, name: &str) -> Object {
        self.get(name).cloned().unwrap_or_else(Object::undefined)
    }

    /// Look up a name in this scope only
    pub fn get_local(&self, name: &str) -> Option<&Object> {
        self.vars.get(name)
    }
}
