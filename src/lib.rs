// File: src/lib.rs
//
// Library interface for the Lox interpreter.
// Exposes the pipeline stages (lexer, parser, interpreter) for embedding
// and integration testing, plus the driver helpers used by the CLI.

pub mod ast;
pub mod errors;
pub mod interpreter;
pub mod lexer;
pub mod logger;
pub mod parser;
pub mod repl;
pub mod snapshot;
pub mod source;
pub mod token;

use errors::LoxError;
use interpreter::Interpreter;

/// Runs one unit of source text end to end: lex, parse, then interpret
/// against `interpreter`, whose global state persists across calls.
///
/// Comments must already be removed (see [`source::strip_comments`]).
pub fn run_source(source: &str, interpreter: &mut Interpreter) -> Result<(), LoxError> {
    let tokens = lexer::tokenize(source)?;
    let stmts = parser::Parser::new(tokens).parse()?;
    interpreter.interpret(&stmts)?;
    Ok(())
}
