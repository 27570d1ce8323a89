// File: src/interpreter/value.rs
//
// Runtime value types for the Lox language.
// Values are numbers, strings, booleans, nil and invocable functions.

use crate::errors::{RuntimeError, RuntimeErrorKind, SourceLocation};
use crate::interpreter::Interpreter;
use crate::token::Literal;
use std::fmt;
use std::ops::RangeInclusive;
use std::rc::Rc;

/// Uniform calling contract for anything a program can invoke.
///
/// Host-native functions are the only implementors today; a user-defined
/// function type would implement the same trait.
pub trait Callable {
    fn name(&self) -> &str;

    /// Accepted argument counts
    fn arity(&self) -> RangeInclusive<usize>;

    fn call(&self, interpreter: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError>;
}

type NativeFn = dyn Fn(&[Value]) -> Result<Value, String>;

/// A function implemented by the host and injected into the global scope
pub struct NativeFunction {
    name: String,
    arity: RangeInclusive<usize>,
    func: Box<NativeFn>,
}

impl NativeFunction {
    pub fn new<F>(name: impl Into<String>, arity: RangeInclusive<usize>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, String> + 'static,
    {
        NativeFunction { name: name.into(), arity, func: Box::new(func) }
    }
}

impl Callable for NativeFunction {
    fn name(&self) -> &str {
        &self.name
    }

    fn arity(&self) -> RangeInclusive<usize> {
        self.arity.clone()
    }

    fn call(&self, _interpreter: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
        (self.func)(args).map_err(|message| {
            RuntimeError::new(
                RuntimeErrorKind::Native,
                format!("{}(): {}", self.name, message),
                SourceLocation::unknown(),
            )
        })
    }
}

#[derive(Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    Callable(Rc<dyn Callable>),
}

impl Value {
    /// Convenience constructor for string values
    pub fn str(s: &str) -> Self {
        Value::Str(Rc::from(s))
    }

    pub fn native<F>(name: &str, arity: RangeInclusive<usize>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, String> + 'static,
    {
        Value::Callable(Rc::new(NativeFunction::new(name, arity, func)))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Callable(_))
    }

    /// `nil` and `false` are falsy; everything else, including 0 and "", is truthy
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    /// Numeric view used when an operation mixes integers and floats
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Callable(_) => "function",
        }
    }
}

impl From<&Literal> for Value {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Int(n) => Value::Int(*n),
            Literal::Float(n) => Value::Float(*n),
            Literal::Str(s) => Value::str(s),
            Literal::Bool(b) => Value::Bool(*b),
        }
    }
}

/// Equality by value. Integers and floats compare numerically, values of
/// different kinds are never equal, callables only equal themselves.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Callable(a), Value::Callable(b)) => Rc::ptr_eq(a, b),
            (a, b) if a.is_numeric() && b.is_numeric() => a.as_f64() == b.as_f64(),
            _ => false,
        }
    }
}

/// Canonical textual form, as written by `print`
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => {
                if n.is_finite() && n.fract() == 0.0 {
                    write!(f, "{:.1}", n)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Str(s) => write!(f, "{}", s),
            Value::Callable(c) => write!(f, "<native fn {}>", c.name()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "Str({:?})", s),
            Value::Callable(c) => write!(f, "Callable({})", c.name()),
            Value::Nil => write!(f, "Nil"),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Int(n) => write!(f, "Int({})", n),
            Value::Float(n) => write!(f, "Float({})", n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(Value::Int(0).is_truthy());
        assert!(Value::Float(0.0).is_truthy());
        assert!(Value::str("").is_truthy());
    }

    #[test]
    fn test_cross_type_equality() {
        assert_eq!(Value::Int(1), Value::Float(1.0));
        assert_ne!(Value::Int(1), Value::str("1"));
        assert_ne!(Value::Bool(false), Value::Nil);
        assert_ne!(Value::Int(0), Value::Bool(false));
        assert_eq!(Value::str("ab"), Value::str("ab"));
    }

    #[test]
    fn test_callables_equal_only_themselves() {
        let f = Value::native("f", 0..=0, |_| Ok(Value::Nil));
        let g = Value::native("f", 0..=0, |_| Ok(Value::Nil));
        assert_eq!(f, f.clone());
        assert_ne!(f, g);
    }

    #[test]
    fn test_canonical_text() {
        assert_eq!(Value::Int(7).to_string(), "7");
        assert_eq!(Value::Float(3.0).to_string(), "3.0");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::Float(-0.25).to_string(), "-0.25");
        assert_eq!(Value::Float(1e16).to_string(), "10000000000000000.0");
        assert_eq!(Value::Float(1e20).to_string(), "100000000000000000000.0");
        assert_eq!(Value::str("ab").to_string(), "ab");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Nil.to_string(), "nil");
        assert_eq!(Value::native("input", 0..=1, |_| Ok(Value::Nil)).to_string(), "<native fn input>");
    }

    #[test]
    fn test_variant_helpers() {
        assert!(Value::Int(1).is_numeric());
        assert!(Value::Float(1.0).is_numeric());
        assert!(!Value::str("1").is_numeric());
        assert!(Value::str("1").is_text());
        assert!(Value::native("f", 0..=0, |_| Ok(Value::Nil)).is_callable());
        assert_eq!(Value::Int(1).type_name(), "int");
    }
}
