// File: src/interpreter/natives.rs
//
// Host-provided native functions.
// These are registered as ordinary global bindings before a program runs,
// so a script calls them like any other value: `name = input("Name? ")`.

use crate::errors::{RuntimeError, RuntimeErrorKind, SourceLocation};
use crate::interpreter::{Callable, Interpreter, Value};
use chrono::Utc;
use std::cell::RefCell;
use std::io::{self, BufRead};
use std::ops::RangeInclusive;
use std::rc::Rc;

/// Registers the default native functions in the interpreter's global frame
pub fn register_defaults(interp: &mut Interpreter) {
    let stdin = io::BufReader::new(io::stdin());
    interp.define_global("input", input_from(stdin));
    interp.define_global("to_int", to_int());
    interp.define_global("to_float", to_float());
    interp.define_global("to_string", to_string());
    interp.define_global("now", now());
    log::debug!("registered native functions: input, to_int, to_float, to_string, now");
}

/// `input(prompt?)` over any line reader.
///
/// The optional prompt goes to the interpreter's output sink, the same place
/// `print` writes. Returns the line without its trailing newline, or `nil`
/// once the reader is exhausted.
struct Input<R> {
    reader: RefCell<R>,
}

impl<R: BufRead> Callable for Input<R> {
    fn name(&self) -> &str {
        "input"
    }

    fn arity(&self) -> RangeInclusive<usize> {
        0..=1
    }

    fn call(&self, interpreter: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
        if let Some(prompt) = args.first() {
            interpreter.write_prompt(&prompt.to_string())?;
        }
        let mut line = String::new();
        let read = self.reader.borrow_mut().read_line(&mut line).map_err(|e| {
            RuntimeError::new(RuntimeErrorKind::Io, format!("input(): {}", e), SourceLocation::unknown())
        })?;
        if read == 0 {
            return Ok(Value::Nil);
        }
        Ok(Value::str(line.trim_end_matches(['\n', '\r'])))
    }
}

/// Builds the `input` native reading from `reader` (stdin in the CLI)
pub fn input_from<R: BufRead + 'static>(reader: R) -> Value {
    Value::Callable(Rc::new(Input { reader: RefCell::new(reader) }))
}

fn to_int() -> Value {
    Value::native("to_int", 1..=1, |args| match &args[0] {
        Value::Int(n) => Ok(Value::Int(*n)),
        // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
        Value::Float(f) if *f >= i64::MIN as f64 && *f < i64::MAX as f64 => {
            Ok(Value::Int(f.trunc() as i64))
        }
        Value::Float(f) => Err(format!("Cannot convert {} to int", Value::Float(*f))),
        Value::Str(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| format!("Cannot convert '{}' to int", s)),
        Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
        other => Err(format!("Cannot convert {} to int", other.type_name())),
    })
}

fn to_float() -> Value {
    Value::native("to_float", 1..=1, |args| match &args[0] {
        Value::Int(n) => Ok(Value::Float(*n as f64)),
        Value::Float(f) => Ok(Value::Float(*f)),
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| format!("Cannot convert '{}' to float", s)),
        Value::Bool(b) => Ok(Value::Float(if *b { 1.0 } else { 0.0 })),
        other => Err(format!("Cannot convert {} to float", other.type_name())),
    })
}

fn to_string() -> Value {
    Value::native("to_string", 1..=1, |args| Ok(Value::str(&args[0].to_string())))
}

/// Seconds since the Unix epoch
fn now() -> Value {
    Value::native("now", 0..=0, |_| {
        let now = Utc::now();
        Ok(Value::Float(now.timestamp_millis() as f64 / 1000.0))
    })
}
