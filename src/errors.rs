// File: src/errors.rs
//
// Error handling and reporting for the Lox interpreter.
// The three pipeline stages fail with distinct error types (LexError,
// ParseError, RuntimeError) so a driver can tell them apart. Diagnostic
// turns any of them into a pretty-printed, colored terminal message.

use colored::Colorize;
use std::fmt;

/// Source location information for tracking where code appears in a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
    pub file: Option<String>,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column, file: None }
    }

    pub fn unknown() -> Self {
        Self { line: 0, column: 0, file: None }
    }

    pub fn is_unknown(&self) -> bool {
        self.line == 0
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(ref file) = self.file {
            write!(f, "{}:{}:{}", file, self.line, self.column)
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

/// Failure while scanning source text. No partial token stream survives it.
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

impl LexError {
    pub fn new(message: impl Into<String>, location: SourceLocation) -> Self {
        Self { message: message.into(), location }
    }

    pub fn unexpected_character(c: char, location: SourceLocation) -> Self {
        Self::new(format!("Unexpected character: '{}'", c), location)
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for LexError {}

/// Failure while building the AST.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub location: SourceLocation,
    /// The offending lexeme, or `None` when parsing ran into the end of input
    pub found: Option<String>,
}

impl ParseError {
    pub fn new(message: impl Into<String>, location: SourceLocation, found: Option<String>) -> Self {
        Self { message: message.into(), location, found }
    }

    /// Human readable position hint: `at 'x'` or `at end`
    pub fn position_hint(&self) -> String {
        match self.found {
            Some(ref lexeme) => format!("at '{}'", lexeme),
            None => "at end".to_string(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ParseError {}

/// Categories of runtime failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    UndefinedVariable,
    TypeError,
    DivisionByZero,
    NotCallable,
    ArityMismatch,
    Overflow,
    Unsupported,
    Native,
    Io,
}

impl fmt::Display for RuntimeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RuntimeErrorKind::UndefinedVariable => write!(f, "Undefined Variable"),
            RuntimeErrorKind::TypeError => write!(f, "Type Error"),
            RuntimeErrorKind::DivisionByZero => write!(f, "Division By Zero"),
            RuntimeErrorKind::NotCallable => write!(f, "Not Callable"),
            RuntimeErrorKind::ArityMismatch => write!(f, "Arity Mismatch"),
            RuntimeErrorKind::Overflow => write!(f, "Overflow"),
            RuntimeErrorKind::Unsupported => write!(f, "Unsupported"),
            RuntimeErrorKind::Native => write!(f, "Native Function Error"),
            RuntimeErrorKind::Io => write!(f, "I/O Error"),
        }
    }
}

/// Failure while executing statements. Effects of earlier statements persist.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub message: String,
    pub location: SourceLocation,
    pub suggestion: Option<String>,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, message: impl Into<String>, location: SourceLocation) -> Self {
        Self { kind, message: message.into(), location, suggestion: None }
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestion = Some(suggestion);
        self
    }

    /// Fills in a location for errors raised where none was known (native functions)
    pub fn at(mut self, location: SourceLocation) -> Self {
        if self.location.is_unknown() {
            self.location = location;
        }
        self
    }

    pub fn undefined_variable(name: &str, location: SourceLocation) -> Self {
        Self::new(
            RuntimeErrorKind::UndefinedVariable,
            format!("Undefined variable '{}'.", name),
            location,
        )
    }

    pub fn type_error(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::new(RuntimeErrorKind::TypeError, message, location)
    }

    pub fn division_by_zero(location: SourceLocation) -> Self {
        Self::new(RuntimeErrorKind::DivisionByZero, "Division by zero", location)
    }

    pub fn overflow(location: SourceLocation) -> Self {
        Self::new(RuntimeErrorKind::Overflow, "Integer overflow", location)
    }

    pub fn not_callable(location: SourceLocation) -> Self {
        Self::new(RuntimeErrorKind::NotCallable, "Can only call functions", location)
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for RuntimeError {}

/// Any failure of the lex → parse → interpret pipeline, kept categorized
#[derive(Debug, Clone, PartialEq)]
pub enum LoxError {
    Lex(LexError),
    Parse(ParseError),
    Runtime(RuntimeError),
}

impl LoxError {
    /// Banner used when reporting the error to a user
    pub fn category(&self) -> &'static str {
        match self {
            LoxError::Lex(_) => "Lexer Error",
            LoxError::Parse(_) => "Parser Error",
            LoxError::Runtime(_) => "Runtime Error",
        }
    }

    pub fn location(&self) -> &SourceLocation {
        match self {
            LoxError::Lex(e) => &e.location,
            LoxError::Parse(e) => &e.location,
            LoxError::Runtime(e) => &e.location,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            LoxError::Lex(e) => &e.message,
            LoxError::Parse(e) => &e.message,
            LoxError::Runtime(e) => &e.message,
        }
    }
}

impl fmt::Display for LoxError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.category(), self.message())
    }
}

impl std::error::Error for LoxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoxError::Lex(e) => Some(e),
            LoxError::Parse(e) => Some(e),
            LoxError::Runtime(e) => Some(e),
        }
    }
}

impl From<LexError> for LoxError {
    fn from(e: LexError) -> Self {
        LoxError::Lex(e)
    }
}

impl From<ParseError> for LoxError {
    fn from(e: ParseError) -> Self {
        LoxError::Parse(e)
    }
}

impl From<RuntimeError> for LoxError {
    fn from(e: RuntimeError) -> Self {
        LoxError::Runtime(e)
    }
}

/// A structured, printable report of a LoxError with optional source context
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub title: String,
    pub message: String,
    pub location: SourceLocation,
    pub source_line: Option<String>,
    pub suggestion: Option<String>,
    pub help: Option<String>,
    pub note: Option<String>,
}

impl Diagnostic {
    pub fn new(error: &LoxError) -> Self {
        let mut diagnostic = Self {
            title: error.category().to_string(),
            message: error.message().to_string(),
            location: error.location().clone(),
            source_line: None,
            suggestion: None,
            help: None,
            note: None,
        };
        match error {
            LoxError::Parse(e) => diagnostic.note = Some(e.position_hint()),
            LoxError::Runtime(e) => {
                diagnostic.suggestion = e.suggestion.clone();
                if e.kind == RuntimeErrorKind::NotCallable {
                    diagnostic.help =
                        Some("only native functions such as input() can be called".to_string());
                }
            }
            LoxError::Lex(_) => {}
        }
        diagnostic
    }

    pub fn with_file(mut self, file: String) -> Self {
        self.location.file = Some(file);
        self
    }

    /// Attaches the offending line from the full source text, if the location is known
    pub fn with_source(mut self, source: &str) -> Self {
        if !self.location.is_unknown() {
            self.source_line = source.lines().nth(self.location.line - 1).map(str::to_string);
        }
        self
    }

}

/// Renders as a header line, then (when known) the location, the offending
/// source line with a caret under the column, and `=` footer lines:
///
/// ```text
/// Runtime Error: Undefined variable 'countr'.
///  --> script.lox:2:7
///   |
/// 2 | print countr
///   |       ^
///   = did you mean 'counter'?
/// ```
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}: {}", self.title.red().bold(), self.message.bold())?;

        // The gutter is as wide as the line number it has to hold
        let gutter = " ".repeat(self.location.line.to_string().len());
        let bar = "|".bright_blue();

        if !self.location.is_unknown() {
            writeln!(f, "{}{} {}", gutter, "-->".bright_blue(), self.location)?;
        }
        if let Some(ref source) = self.source_line {
            let caret_indent = " ".repeat(self.location.column.saturating_sub(1));
            writeln!(f, "{} {}", gutter, bar)?;
            writeln!(f, "{} {} {}", self.location.line.to_string().bright_blue(), bar, source)?;
            writeln!(f, "{} {} {}{}", gutter, bar, caret_indent, "^".red().bold())?;
        }

        let footers = [
            self.help.as_ref().map(|help| format!("help: {}", help).bright_yellow()),
            self.suggestion.as_ref().map(|name| format!("did you mean '{}'?", name).bright_green()),
            self.note.as_ref().map(|note| format!("note: {}", note).bright_cyan()),
        ];
        for footer in footers.into_iter().flatten() {
            writeln!(f, "{} = {}", gutter, footer)?;
        }

        Ok(())
    }
}

/// Computes the Levenshtein distance between two strings
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Single rolling row instead of the full matrix
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for i in 1..=a.len() {
        let mut diagonal = row[0];
        row[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            let next = (row[j] + 1).min(row[j - 1] + 1).min(diagonal + cost);
            diagonal = row[j];
            row[j] = next;
        }
    }

    row[b.len()]
}

/// Find the closest match for a misspelled name. Returns None when nothing
/// is within an edit distance of 2. Ties go to the alphabetically first name.
pub fn find_closest_match<'a, I>(target: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best_match = None;
    let mut best_distance = usize::MAX;

    for candidate in candidates {
        if candidate == target {
            continue;
        }
        let distance = levenshtein_distance(target, candidate);
        let better = distance < best_distance
            || (distance == best_distance && best_match.is_some_and(|best| candidate < best));
        if distance <= 2 && better {
            best_distance = distance;
            best_match = Some(candidate);
        }
    }

    best_match
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("count", "count"), 0);
        assert_eq!(levenshtein_distance("cuont", "count"), 2);
    }

    #[test]
    fn test_find_closest_match() {
        let names = ["counter", "total", "input"];
        assert_eq!(find_closest_match("countr", names.iter().copied()), Some("counter"));
        assert_eq!(find_closest_match("inptu", names.iter().copied()), Some("input"));
        assert_eq!(find_closest_match("zzzzzz", names.iter().copied()), None);
        assert_eq!(find_closest_match("aa", ["ad", "ab", "ac"]), Some("ab"));
    }

    #[test]
    fn test_categories_are_distinct() {
        let lex: LoxError = LexError::new("Unterminated string literal", SourceLocation::new(1, 1)).into();
        let parse: LoxError =
            ParseError::new("Expected expression.", SourceLocation::new(1, 2), None).into();
        let runtime: LoxError = RuntimeError::division_by_zero(SourceLocation::new(1, 3)).into();

        assert_eq!(lex.category(), "Lexer Error");
        assert_eq!(parse.category(), "Parser Error");
        assert_eq!(runtime.category(), "Runtime Error");
        assert_eq!(runtime.to_string(), "Runtime Error: Division by zero");
    }

    #[test]
    fn test_runtime_error_at_keeps_known_location() {
        let err = RuntimeError::type_error("bad", SourceLocation::new(2, 4))
            .at(SourceLocation::new(9, 9));
        assert_eq!(err.location, SourceLocation::new(2, 4));

        let native = RuntimeError::new(RuntimeErrorKind::Native, "boom", SourceLocation::unknown())
            .at(SourceLocation::new(3, 1));
        assert_eq!(native.location, SourceLocation::new(3, 1));
    }

    #[test]
    fn test_diagnostic_picks_source_line() {
        colored::control::set_override(false);
        let err: LoxError = RuntimeError::undefined_variable("y", SourceLocation::new(2, 7)).into();
        let rendered = Diagnostic::new(&err).with_source("x = 1\nprint y").to_string();
        assert!(rendered.contains("Runtime Error: Undefined variable 'y'."));
        assert!(rendered.contains("\n --> 2:7\n"));
        assert!(rendered.contains("\n2 | print y\n"));
        assert!(rendered.contains("\n  |       ^\n"));
    }

    #[test]
    fn test_diagnostic_footers_and_wide_gutter() {
        colored::control::set_override(false);
        let err: LoxError = RuntimeError::undefined_variable("countr", SourceLocation::new(12, 7))
            .with_suggestion("counter".to_string())
            .into();
        let source = format!("{}print countr", "\n".repeat(11));
        let rendered = Diagnostic::new(&err).with_source(&source).to_string();
        assert!(rendered.contains("\n  --> 12:7\n"));
        assert!(rendered.contains("\n12 | print countr\n"));
        assert!(rendered.ends_with("   = did you mean 'counter'?\n"));
    }
}
