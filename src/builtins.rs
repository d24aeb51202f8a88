//! Built-in function registry
//!
//! Built-ins are called by name: a string callee on the stack followed by
//! `call`. The evaluator pops exactly `arity()` arguments and passes them in
//! push order. The registry is injected into the evaluator so a host can
//! supply its own side effects.

use crate::ast::Object;
use crate::eval::EvalError;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;

/// A host function callable from a stream
pub trait Builtin {
    /// Number of arguments popped from the operand stack
    fn arity(&self) -> usize;

    /// Run the built-in; the returned object is pushed as the call result
    fn call(&self, args: Vec<Object>) -> Result<Object, EvalError>;
}

/// `print`: write the value's display form and a newline, yield `undefined`
pub struct Print {
    out: RefCell<Box<dyn Write>>,
}

impl Print {
    pub fn new(out: Box<dyn Write>) -> Self {
        Print {
            out: RefCell::new(out),
        }
    }

    pub fn stdout() -> Self {
        Print::new(Box::new(io::stdout()))
    }
}

impl Builtin for Print {
    fn arity(&self) -> usize {
        1
    }

    fn call(&self, args: Vec<Object>) -> Result<Object, EvalError> {
        let mut out = self.out.borrow_mut();
        writeln!(out, "{}", args[0])?;
        out.flush()?;
        Ok(Object::undefined())
    }
}

/// Adapter so plain closures can be registered as built-ins
pub struct FnBuiltin<F> {
    arity: usize,
    f: F,
}

impl<F> Builtin for FnBuiltin<F>
where
    F: Fn(Vec<Object>) -> Result<Object, EvalError>,
{
    fn arity(&self) -> usize {
        self.arity
    }

    fn call(&self, args: Vec<Object>) -> Result<Object, EvalError> {
        (self.f)(args)
    }
}

/// Name -> built-in table consulted for string callees
#[derive(Clone, Default)]
pub struct Builtins {
    table: HashMap<String, Rc<dyn Builtin>>,
}

impl Builtins {
    /// A registry with no built-ins at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// The standard registry: `print` to stdout
    pub fn standard() -> Self {
        let mut builtins = Self::empty();
        builtins.register("print", Print::stdout());
        builtins
    }

    /// The standard registry with `print` redirected to `out`
    pub fn with_output(out: Box<dyn Write>) -> Self {
        let mut builtins = Self::empty();
        builtins.register("print", Print::new(out));
        builtins
    }

    /// Register (or replace) a built-in under `name`
    pub fn register(&mut self, name: impl Into<String>, builtin: impl Builtin + 'static) {
        self.table.insert(name.into(), Rc::new(builtin));
    }

    /// Register a closure taking `arity` arguments
    pub fn register_fn<F>(&mut self, name: impl Into<String>, arity: usize, f: F)
    where
        F: Fn(Vec<Object>) -> Result<Object, EvalError> + 'static,
    {
        self.register(name, FnBuiltin { arity, f });
    }

    pub fn get(&self, name: &str) -> Option<Rc<dyn Builtin>> {
        self.table.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.table.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for Builtins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builtins").field("names", &self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sink(Rc<RefCell<Vec<u8>>>);

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn print_writes_display_form() {
        let buf = Rc::new(RefCell::new(Vec::new()));
        let builtins = Builtins::with_output(Box::new(Sink(Rc::clone(&buf))));
        let print = builtins.get("print").unwrap();
        assert_eq!(print.arity(), 1);
        let result = print.call(vec![Object::int(42)]).unwrap();
        assert!(result.is_undefined());
        assert_eq!(String::from_utf8(buf.borrow().clone()).unwrap(), "42\n");
    }

    #[test]
    fn register_fn_and_names() {
        let mut builtins = Builtins::standard();
        builtins.register_fn("len", 1, |args| {
            let n = args[0].as_str().map(|s| s.len()).unwrap_or(0);
            Ok(Object::int(n as i64))
        });
        assert_eq!(builtins.names(), vec!["len", "print"]);
        let len = builtins.get("len").unwrap();
        assert_eq!(len.call(vec![Object::str("abcd")]).unwrap().as_int(), Some(4));
        assert!(!builtins.contains("missing"));
        assert!(Builtins::empty().names().is_empty());
    }
}
