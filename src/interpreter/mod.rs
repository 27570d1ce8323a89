// File: src/interpreter/mod.rs
//
// Tree-walking interpreter for the Lox language.
// Executes programs by traversing the Abstract Syntax Tree (AST).
//
// The interpreter owns one environment (a stack of scope frames whose
// bottom frame holds the globals), evaluates expressions to produce
// values and executes statements for their effect. It supports:
// - Variable binding, with assignment to an unknown name declaring it
//   in the innermost frame
// - Block scoping for `{ ... }`, `if` and `while` bodies
// - Short-circuit `and` / `or`
// - Arithmetic on integers and floats, string concatenation, comparisons
// - Calls to host-provided native functions
//
// Any runtime error aborts the rest of the current `interpret` call;
// the effects of statements that already ran are kept.

mod environment;
pub mod natives;
mod value;

pub use environment::Environment;
pub use value::{Callable, NativeFunction, Value};

use crate::ast::{Expr, Stmt};
use crate::errors::{find_closest_match, RuntimeError, RuntimeErrorKind, SourceLocation};
use crate::token::{Token, TokenType};
use std::io::Write;
use std::sync::{Arc, Mutex};

type EvalResult<T> = Result<T, RuntimeError>;

pub struct Interpreter {
    env: Environment,
    output: Option<Arc<Mutex<Vec<u8>>>>,
}

impl Interpreter {
    /// Creates a new interpreter with an empty global frame
    pub fn new() -> Self {
        Interpreter { env: Environment::new(), output: None }
    }

    /// Creates an interpreter whose globals hold the default native functions
    pub fn with_natives() -> Self {
        let mut interpreter = Self::new();
        natives::register_defaults(&mut interpreter);
        interpreter
    }

    /// Binds a host value (typically a native function) in the global frame
    pub fn define_global(&mut self, name: &str, value: Value) {
        self.env.define_global(name.to_string(), value);
    }

    /// Read access to the variable environment
    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Redirects `print` output into a shared buffer (used by tests and the snapshot runner)
    pub fn set_output(&mut self, output: Arc<Mutex<Vec<u8>>>) {
        self.output = Some(output);
    }

    /// Executes statements in order. Stops at the first runtime error.
    pub fn interpret(&mut self, stmts: &[Stmt]) -> EvalResult<()> {
        log::debug!("interpreting {} statements", stmts.len());
        let result = self.eval_stmts(stmts);
        if let Err(ref err) = result {
            log::debug!("{} at {}: {}", err.kind, err.location, err.message);
        }
        result
    }

    /// Executes a single statement against the current environment
    pub fn execute(&mut self, stmt: &Stmt) -> EvalResult<()> {
        self.eval_stmt(stmt)
    }

    /// Evaluates an expression to a value
    pub fn evaluate(&mut self, expr: &Expr) -> EvalResult<Value> {
        self.eval_expr(expr)
    }

    /// Writes a prompt without a trailing newline to the output sink and
    /// flushes it, so it shows before the program blocks on input
    pub fn write_prompt(&self, prompt: &str) -> EvalResult<()> {
        self.emit(prompt, false)
    }

    fn write_output(&self, msg: &str) -> EvalResult<()> {
        self.emit(msg, true)
    }

    fn emit(&self, text: &str, newline: bool) -> EvalResult<()> {
        let end = if newline { "\n" } else { "" };
        let written = if let Some(out) = &self.output {
            let mut buffer = out.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            write!(buffer, "{}{}", text, end)
        } else {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            write!(handle, "{}{}", text, end).and_then(|_| handle.flush())
        };
        written.map_err(|e| {
            RuntimeError::new(RuntimeErrorKind::Io, format!("Failed to write output: {}", e), SourceLocation::unknown())
        })
    }

    fn eval_stmts(&mut self, stmts: &[Stmt]) -> EvalResult<()> {
        for stmt in stmts {
            self.eval_stmt(stmt)?;
        }
        Ok(())
    }

    fn eval_stmt(&mut self, stmt: &Stmt) -> EvalResult<()> {
        match stmt {
            Stmt::Expression(expr) => {
                self.eval_expr(expr)?;
            }
            Stmt::Print(expr) => {
                let value = self.eval_expr(expr)?;
                self.write_output(&value.to_string())?;
            }
            Stmt::If { condition, then_branch, else_branch } => {
                if self.eval_expr(condition)?.is_truthy() {
                    self.eval_stmt(then_branch)?;
                } else if let Some(else_branch) = else_branch {
                    self.eval_stmt(else_branch)?;
                }
            }
            Stmt::While { condition, body } => {
                while self.eval_expr(condition)?.is_truthy() {
                    self.eval_stmt(body)?;
                }
            }
            Stmt::Block(stmts) => self.eval_block(stmts)?,
        }
        Ok(())
    }

    /// Runs `stmts` in a fresh frame. The frame is popped on every exit
    /// path, including an error propagating out of the block.
    fn eval_block(&mut self, stmts: &[Stmt]) -> EvalResult<()> {
        self.env.push_scope();
        let result = self.eval_stmts(stmts);
        self.env.pop_scope();
        result
    }

    fn eval_expr(&mut self, expr: &Expr) -> EvalResult<Value> {
        match expr {
            Expr::Literal(literal) => Ok(Value::from(literal)),
            Expr::Grouping(inner) => self.eval_expr(inner),
            Expr::Unary { operator, right } => {
                let value = self.eval_expr(right)?;
                Self::eval_unary(operator, value)
            }
            Expr::Binary { left, operator, right } => {
                let l = self.eval_expr(left)?;
                let r = self.eval_expr(right)?;
                Self::eval_binary(operator, l, r)
            }
            Expr::Logical { left, operator, right } => {
                let l = self.eval_expr(left)?;
                let decided = match operator.token_type {
                    TokenType::Or => l.is_truthy(),
                    _ => !l.is_truthy(),
                };
                if decided {
                    Ok(l)
                } else {
                    self.eval_expr(right)
                }
            }
            Expr::Variable { name } => self.lookup(name),
            Expr::Assignment { name, value } => {
                let value = self.eval_expr(value)?;
                self.env.assign(&name.lexeme, value.clone());
                Ok(value)
            }
            Expr::Call { callee, paren, arguments } => {
                let callee = self.eval_expr(callee)?;
                let mut args = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    args.push(self.eval_expr(argument)?);
                }
                self.call_value(&callee, paren, &args)
            }
            Expr::Get { name, .. } | Expr::Set { name, .. } => Err(RuntimeError::new(
                RuntimeErrorKind::Unsupported,
                "Property access is not supported",
                name.location(),
            )),
            Expr::Super { keyword, .. } | Expr::This { keyword } => Err(RuntimeError::new(
                RuntimeErrorKind::Unsupported,
                format!("'{}' is not supported outside of classes", keyword.lexeme),
                keyword.location(),
            )),
        }
    }

    fn lookup(&self, name: &Token) -> EvalResult<Value> {
        match self.env.get(&name.lexeme) {
            Some(value) => Ok(value),
            None => {
                let mut err = RuntimeError::undefined_variable(&name.lexeme, name.location());
                if let Some(candidate) = find_closest_match(&name.lexeme, self.env.names()) {
                    err = err.with_suggestion(candidate.to_string());
                }
                Err(err)
            }
        }
    }

    fn call_value(&mut self, callee: &Value, paren: &Token, args: &[Value]) -> EvalResult<Value> {
        let function = match callee {
            Value::Callable(function) => function.clone(),
            _ => return Err(RuntimeError::not_callable(paren.location())),
        };

        let arity = function.arity();
        if !arity.contains(&args.len()) {
            let expected = if arity.start() == arity.end() {
                arity.start().to_string()
            } else {
                format!("{} to {}", arity.start(), arity.end())
            };
            return Err(RuntimeError::new(
                RuntimeErrorKind::ArityMismatch,
                format!("Expected {} argument(s) but got {}.", expected, args.len()),
                paren.location(),
            ));
        }

        log::trace!("calling {} with {} argument(s)", function.name(), args.len());
        function.call(self, args).map_err(|e| e.at(paren.location()))
    }

    fn eval_unary(operator: &Token, value: Value) -> EvalResult<Value> {
        match operator.token_type {
            TokenType::Minus => match value {
                Value::Int(n) => n
                    .checked_neg()
                    .map(Value::Int)
                    .ok_or_else(|| RuntimeError::overflow(operator.location())),
                Value::Float(n) => Ok(Value::Float(-n)),
                _ => Err(RuntimeError::type_error("Operand must be a number.", operator.location())),
            },
            _ => Ok(Value::Bool(!value.is_truthy())),
        }
    }

    fn eval_binary(operator: &Token, l: Value, r: Value) -> EvalResult<Value> {
        let location = operator.location();
        match operator.token_type {
            TokenType::EqualEqual => Ok(Value::Bool(l == r)),
            TokenType::BangEqual => Ok(Value::Bool(l != r)),
            TokenType::Plus => match (&l, &r) {
                (Value::Str(a), Value::Str(b)) => {
                    let mut joined = String::with_capacity(a.len() + b.len());
                    joined.push_str(a);
                    joined.push_str(b);
                    Ok(Value::str(&joined))
                }
                (Value::Int(a), Value::Int(b)) => {
                    a.checked_add(*b).map(Value::Int).ok_or_else(|| RuntimeError::overflow(location))
                }
                _ if l.is_numeric() && r.is_numeric() => Ok(Value::Float(Self::float(&l) + Self::float(&r))),
                _ => Err(RuntimeError::type_error("Operands must be two numbers or two strings", location)),
            },
            TokenType::Minus | TokenType::Mul => {
                if !(l.is_numeric() && r.is_numeric()) {
                    return Err(RuntimeError::type_error("Operands must be numbers.", location));
                }
                let is_minus = operator.token_type == TokenType::Minus;
                match (&l, &r) {
                    (Value::Int(a), Value::Int(b)) => {
                        let result = if is_minus { a.checked_sub(*b) } else { a.checked_mul(*b) };
                        result.map(Value::Int).ok_or_else(|| RuntimeError::overflow(location))
                    }
                    _ => {
                        let (a, b) = (Self::float(&l), Self::float(&r));
                        Ok(Value::Float(if is_minus { a - b } else { a * b }))
                    }
                }
            }
            TokenType::Div => {
                if !(l.is_numeric() && r.is_numeric()) {
                    return Err(RuntimeError::type_error("Operands must be numbers.", location));
                }
                let divisor = Self::float(&r);
                if divisor == 0.0 {
                    return Err(RuntimeError::division_by_zero(location));
                }
                Ok(Value::Float(Self::float(&l) / divisor))
            }
            TokenType::Less | TokenType::LessEqual | TokenType::Greater | TokenType::GreaterEqual => {
                let ordering = match (&l, &r) {
                    (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
                    (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
                    _ if l.is_numeric() && r.is_numeric() => Self::float(&l).partial_cmp(&Self::float(&r)),
                    _ => {
                        return Err(RuntimeError::type_error(
                            "Operands must be two numbers or two strings",
                            location,
                        ))
                    }
                };
                // NaN compares false against everything
                let result = ordering.is_some_and(|ord| match operator.token_type {
                    TokenType::Less => ord.is_lt(),
                    TokenType::LessEqual => ord.is_le(),
                    TokenType::Greater => ord.is_gt(),
                    _ => ord.is_ge(),
                });
                Ok(Value::Bool(result))
            }
            _ => Err(RuntimeError::new(
                RuntimeErrorKind::Unsupported,
                format!("Unknown binary operator '{}'", operator.lexeme),
                location,
            )),
        }
    }

    fn float(value: &Value) -> f64 {
        value.as_f64().unwrap_or(f64::NAN)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
