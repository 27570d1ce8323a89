// File: src/token.rs
//
// Token model for the Lox scanner.
// A token records its lexical category, the exact source text it was
// scanned from, an optional decoded literal and where it starts.

use crate::errors::SourceLocation;
use std::fmt;

/// Lexical categories produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,

    // Arithmetic
    Plus,
    Minus,
    Mul,
    Div,

    // Comparison and equality
    Equal,
    EqualEqual,
    Bang,
    BangEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,

    // Logical keywords and boolean literals
    And,
    Or,
    True,
    False,

    // Control keywords
    If,
    Else,
    While,
    Print,
    Input,

    // Literals
    Number,
    String,
    Identifier,

    Eof,
}

impl TokenType {
    /// Looks up a reserved word.
    pub fn keyword(text: &str) -> Option<TokenType> {
        let kind = match text {
            "true" => TokenType::True,
            "false" => TokenType::False,
            "print" => TokenType::Print,
            "if" => TokenType::If,
            "else" => TokenType::Else,
            "while" => TokenType::While,
            "input" => TokenType::Input,
            "and" => TokenType::And,
            "or" => TokenType::Or,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            TokenType::LParen => "LPAREN",
            TokenType::RParen => "RPAREN",
            TokenType::LBrace => "LBRACE",
            TokenType::RBrace => "RBRACE",
            TokenType::Plus => "PLUS",
            TokenType::Minus => "MINUS",
            TokenType::Mul => "MUL",
            TokenType::Div => "DIV",
            TokenType::Equal => "EQUAL",
            TokenType::EqualEqual => "EQUAL_EQUAL",
            TokenType::Bang => "BANG",
            TokenType::BangEqual => "BANG_EQUAL",
            TokenType::Less => "LESS",
            TokenType::LessEqual => "LESS_EQUAL",
            TokenType::Greater => "GREATER",
            TokenType::GreaterEqual => "GREATER_EQUAL",
            TokenType::And => "AND",
            TokenType::Or => "OR",
            TokenType::True => "TRUE",
            TokenType::False => "FALSE",
            TokenType::If => "IF",
            TokenType::Else => "ELSE",
            TokenType::While => "WHILE",
            TokenType::Print => "PRINT",
            TokenType::Input => "INPUT",
            TokenType::Number => "NUMBER",
            TokenType::String => "STRING",
            TokenType::Identifier => "IDENTIFIER",
            TokenType::Eof => "EOF",
        };
        f.write_str(name)
    }
}

/// Decoded literal carried by number, string and identifier tokens.
/// `Bool` is only ever built by the parser for `true` / `false`.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub lexeme: String,
    pub literal: Option<Literal>,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(
        token_type: TokenType,
        lexeme: impl Into<String>,
        literal: Option<Literal>,
        line: usize,
        column: usize,
    ) -> Self {
        Token { token_type, lexeme: lexeme.into(), literal, line, column }
    }

    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.literal {
            Some(literal) => write!(f, "{} '{}' {:?}", self.token_type, self.lexeme, literal),
            None => write!(f, "{} '{}'", self.token_type, self.lexeme),
        }
    }
}
