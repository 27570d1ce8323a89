// File: src/repl.rs
//
// Interactive REPL (Read-Eval-Print Loop) for Lox.
// Provides an interactive shell with:
// - Multi-line input while braces or parentheses are left open
// - Command history with up/down arrow navigation
// - Special commands (:help, :clear, :quit, :vars, :reset)
// - Globals that persist across inputs
// - Expression statements echo their value

use crate::ast::Stmt;
use crate::errors::{Diagnostic, LoxError};
use crate::interpreter::{Interpreter, Value};
use crate::lexer;
use crate::parser::Parser;
use crate::source::strip_comments;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// `:`-prefixed shell commands, recognised only at the start of a fresh input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    Clear,
    Vars,
    Reset,
    Unknown(String),
}

/// Name, short alias and description of every command, in help order
const COMMANDS: [(&str, &str, &str); 5] = [
    (":help", ":h", "list commands"),
    (":vars", ":v", "show variables in scope"),
    (":reset", ":r", "drop all variables and start over"),
    (":clear", ":c", "clear the screen"),
    (":quit", ":q", "leave the shell (Ctrl+D works too)"),
];

impl Command {
    pub fn parse(input: &str) -> Self {
        match input.trim() {
            ":help" | ":h" => Command::Help,
            ":quit" | ":q" | ":exit" => Command::Quit,
            ":clear" | ":c" => Command::Clear,
            ":vars" | ":v" => Command::Vars,
            ":reset" | ":r" => Command::Reset,
            other => Command::Unknown(other.to_string()),
        }
    }
}

/// REPL session that maintains interpreter state and handles user interaction
pub struct Repl {
    interpreter: Interpreter,
    editor: DefaultEditor,
    /// Lines of a statement still waiting for its closing delimiters
    pending: String,
}

impl Repl {
    /// Creates a new REPL session with the default natives installed
    pub fn new() -> Result<Self, ReadlineError> {
        let editor = DefaultEditor::new()?;
        Ok(Repl { interpreter: Interpreter::with_natives(), editor, pending: String::new() })
    }

    fn show_banner(&self) {
        println!("{} {}", "Lox".bright_cyan().bold(), env!("CARGO_PKG_VERSION").dimmed());
        println!("{}", "Type :help for commands. Open a brace to write a multi-line block.".dimmed());
        println!();
    }

    fn prompt(&self) -> String {
        if self.pending.is_empty() {
            "lox> ".bright_green().to_string()
        } else {
            "...> ".bright_blue().to_string()
        }
    }

    /// Starts the REPL loop. Returns when the user quits or input ends.
    pub fn run(&mut self) -> Result<(), ReadlineError> {
        self.show_banner();

        loop {
            let prompt = self.prompt();
            let line = match self.editor.readline(&prompt) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C abandons a half-typed block but keeps the session
                    self.pending.clear();
                    continue;
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    log::error!("readline failed: {}", err);
                    return Err(err);
                }
            };
            let _ = self.editor.add_history_entry(line.as_str());

            if self.pending.is_empty() && line.trim_start().starts_with(':') {
                if !self.run_command(Command::parse(&line)) {
                    break;
                }
                continue;
            }

            self.pending.push_str(&line);
            self.pending.push('\n');
            if is_input_complete(&self.pending) {
                let input = std::mem::take(&mut self.pending);
                self.eval_input(&input);
            }
        }

        Ok(())
    }

    /// Returns false when the session should end
    fn run_command(&mut self, command: Command) -> bool {
        match command {
            Command::Help => self.show_help(),
            Command::Quit => return false,
            Command::Clear => {
                print!("\x1B[2J\x1B[1;1H");
                self.show_banner();
            }
            Command::Vars => self.show_variables(),
            Command::Reset => {
                self.interpreter = Interpreter::with_natives();
                println!("{}", "environment reset".dimmed());
            }
            Command::Unknown(name) => {
                eprintln!("{} unknown command {}, try :help", "error:".bright_red(), name.bright_yellow());
            }
        }
        true
    }

    fn show_help(&self) {
        for (name, alias, description) in COMMANDS {
            println!("  {:<7} {:<3} {}", name.bright_yellow(), alias.dimmed(), description);
        }
        println!();
        println!("  Statements run as soon as every ( and {{ is closed.");
        println!("  Expressions echo their value, e.g. {}", "lox> 1 + 2  => 3".dimmed());
    }

    fn show_variables(&self) {
        let bindings: Vec<(String, Value)> = self
            .interpreter
            .environment()
            .visible_bindings()
            .into_iter()
            .filter(|(_, value)| !value.is_callable())
            .collect();

        if bindings.is_empty() {
            println!("{}", "no variables defined".dimmed());
        }
        for (name, value) in &bindings {
            println!("  {} = {}", name.bright_yellow(), format_value(value));
        }
    }

    /// Evaluates one complete input. Expression statements echo their value;
    /// the first error stops the rest of the input.
    fn eval_input(&mut self, input: &str) {
        let source = strip_comments(input);
        if source.trim().is_empty() {
            return;
        }

        let stmts = match lexer::tokenize(&source)
            .map_err(LoxError::from)
            .and_then(|tokens| Parser::new(tokens).parse().map_err(LoxError::from))
        {
            Ok(stmts) => stmts,
            Err(err) => {
                print_error(&err, &source);
                return;
            }
        };

        for stmt in &stmts {
            let result = match stmt {
                Stmt::Expression(expr) => self.interpreter.evaluate(expr).map(|value| {
                    if !matches!(value, Value::Nil) {
                        println!("{} {}", "=>".bright_blue(), format_value(&value));
                    }
                }),
                _ => self.interpreter.execute(stmt),
            };
            if let Err(err) = result {
                print_error(&LoxError::from(err), &source);
                return;
            }
        }
    }
}

/// Checks whether every brace and parenthesis in `input` is closed,
/// ignoring delimiters inside string literals and comments
pub fn is_input_complete(input: &str) -> bool {
    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut in_comment = false;

    for ch in input.chars() {
        if in_comment {
            in_comment = ch != '\n';
            continue;
        }
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => in_comment = true,
            '{' | '(' if !in_string => depth += 1,
            '}' | ')' if !in_string => depth -= 1,
            _ => {}
        }
    }

    // Over-closed input is complete so the parser can report it
    !in_string && depth <= 0
}

/// Formats a value for REPL display; strings are quoted
fn format_value(value: &Value) -> String {
    match value {
        Value::Str(s) => format!("\"{}\"", s).bright_green().to_string(),
        Value::Int(_) | Value::Float(_) => value.to_string().bright_white().to_string(),
        Value::Bool(_) => value.to_string().bright_magenta().to_string(),
        Value::Callable(_) => value.to_string().bright_cyan().to_string(),
        Value::Nil => value.to_string().dimmed().to_string(),
    }
}

fn print_error(err: &LoxError, source: &str) {
    eprint!("{}", Diagnostic::new(err).with_source(source));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced_input_is_complete() {
        assert!(is_input_complete("print 1\n"));
        assert!(is_input_complete("{ print 1 }\n"));
        assert!(is_input_complete(""));
    }

    #[test]
    fn test_open_delimiters_continue() {
        assert!(!is_input_complete("while (x > 0) {\n"));
        assert!(!is_input_complete("print (1 +\n"));
        assert!(!is_input_complete("print \"unterminated\n"));
    }

    #[test]
    fn test_delimiters_in_strings_and_comments_ignored() {
        assert!(is_input_complete("print \"{\"\n"));
        assert!(is_input_complete("print 1 # {\n"));
    }

    #[test]
    fn test_command_parsing() {
        assert_eq!(Command::parse(":q"), Command::Quit);
        assert_eq!(Command::parse("  :vars "), Command::Vars);
        assert_eq!(Command::parse(":exit"), Command::Quit);
        assert_eq!(Command::parse(":nope"), Command::Unknown(":nope".to_string()));
    }

    #[test]
    fn test_overclosed_input_is_complete() {
        assert!(is_input_complete("}\n"));
    }
}
