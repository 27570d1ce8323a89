// File: src/lexer.rs
//
// Lexical analyzer (tokenizer) for the Lox language.
// Converts source code text into a stream of tokens for parsing.
//
// Supports:
// - Keywords: true, false, print, if, else, while, input, and, or
// - Identifiers, integer and decimal numbers
// - String literals delimited by double quotes (no escapes, may span lines)
// - Operators: + - * / = == ! != < <= > >=
// - Punctuation: ( ) { }
//
// Comments are not part of the grammar; the driver strips them beforehand.

use crate::errors::{LexError, SourceLocation};
use crate::token::{Literal, Token, TokenType};
use std::iter::Peekable;
use std::str::CharIndices;

/// Alternate dash glyphs accepted as MINUS: en dash and the Unicode minus sign
const MINUS_GLYPHS: [char; 2] = ['\u{2013}', '\u{2212}'];

/// Tokenizes Lox source code into a vector of tokens.
///
/// Scans the input in a single pass with one character of lookahead. The
/// returned vector always ends with exactly one `Eof` token. The first
/// malformed lexeme aborts scanning and no partial stream is returned.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let tokens = Lexer::new(source).scan_tokens()?;
    log::trace!("scanned {} tokens", tokens.len());
    Ok(tokens)
}

/// Cursor over the source. `line`/`col` always describe the next unread character.
struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    tokens: Vec<Token>,
    line: usize,
    col: usize,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Lexer { source, chars: source.char_indices().peekable(), tokens: Vec::new(), line: 1, col: 1 }
    }

    fn scan_tokens(mut self) -> Result<Vec<Token>, LexError> {
        while let Some(&(start, c)) = self.chars.peek() {
            let (line, column) = (self.line, self.col);
            match c {
                c if c.is_whitespace() => {
                    self.bump();
                }
                '(' | ')' | '{' | '}' => {
                    self.bump();
                    let kind = match c {
                        '(' => TokenType::LParen,
                        ')' => TokenType::RParen,
                        '{' => TokenType::LBrace,
                        _ => TokenType::RBrace,
                    };
                    self.push(kind, start, None, line, column);
                }
                '+' | '-' | '*' | '/' => {
                    self.bump();
                    let kind = match c {
                        '+' => TokenType::Plus,
                        '-' => TokenType::Minus,
                        '*' => TokenType::Mul,
                        _ => TokenType::Div,
                    };
                    self.push(kind, start, None, line, column);
                }
                c if MINUS_GLYPHS.contains(&c) => {
                    self.bump();
                    self.push(TokenType::Minus, start, None, line, column);
                }
                '!' | '=' | '<' | '>' => {
                    self.bump();
                    let followed_by_equal = self.match_char('=');
                    let kind = match (c, followed_by_equal) {
                        ('!', true) => TokenType::BangEqual,
                        ('!', false) => TokenType::Bang,
                        ('=', true) => TokenType::EqualEqual,
                        ('=', false) => TokenType::Equal,
                        ('<', true) => TokenType::LessEqual,
                        ('<', false) => TokenType::Less,
                        ('>', true) => TokenType::GreaterEqual,
                        _ => TokenType::Greater,
                    };
                    self.push(kind, start, None, line, column);
                }
                '"' => self.string(start, line, column)?,
                '0'..='9' | '.' => self.number(start, line, column)?,
                c if c.is_alphabetic() || c == '_' => self.identifier(start, line, column),
                _ => {
                    return Err(LexError::unexpected_character(c, SourceLocation::new(line, column)));
                }
            }
        }

        let eof = Token::new(TokenType::Eof, "", None, self.line, self.col);
        self.tokens.push(eof);
        Ok(self.tokens)
    }

    fn string(&mut self, start: usize, line: usize, column: usize) -> Result<(), LexError> {
        self.bump(); // opening quote
        loop {
            match self.bump() {
                Some('"') => break,
                Some(_) => {}
                None => {
                    return Err(LexError::new(
                        "Unterminated string literal",
                        SourceLocation::new(line, column),
                    ));
                }
            }
        }
        let end = self.offset();
        let value = self.source[start + 1..end - 1].to_string();
        self.push(TokenType::String, start, Some(Literal::Str(value)), line, column);
        Ok(())
    }

    fn number(&mut self, start: usize, line: usize, column: usize) -> Result<(), LexError> {
        self.eat_digits();

        let mut is_float = false;
        if self.peek_char() == Some('.') {
            is_float = true;
            self.bump();
            if !matches!(self.peek_char(), Some(d) if d.is_ascii_digit()) {
                let end = self.offset();
                return Err(LexError::new(
                    format!("Invalid number: '{}'", &self.source[start..end]),
                    SourceLocation::new(line, column),
                ));
            }
            self.eat_digits();
        }

        let source = self.source;
        let end = self.offset();
        let text = &source[start..end];
        let literal = if is_float {
            text.parse::<f64>().map(Literal::Float).ok()
        } else {
            text.parse::<i64>().map(Literal::Int).ok()
        };
        match literal {
            Some(literal) => {
                self.push(TokenType::Number, start, Some(literal), line, column);
                Ok(())
            }
            None => Err(LexError::new(
                format!("Invalid number: '{}'", text),
                SourceLocation::new(line, column),
            )),
        }
    }

    fn identifier(&mut self, start: usize, line: usize, column: usize) {
        while matches!(self.peek_char(), Some(ch) if ch.is_alphanumeric() || ch == '_') {
            self.bump();
        }
        let source = self.source;
        let end = self.offset();
        let text = &source[start..end];
        match TokenType::keyword(text) {
            Some(kind) => self.push(kind, start, None, line, column),
            None => {
                let literal = Literal::Str(text.to_string());
                self.push(TokenType::Identifier, start, Some(literal), line, column);
            }
        }
    }

    fn eat_digits(&mut self) {
        while matches!(self.peek_char(), Some(d) if d.is_ascii_digit()) {
            self.bump();
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    /// Byte offset of the next unread character
    fn offset(&mut self) -> usize {
        self.chars.peek().map(|&(i, _)| i).unwrap_or(self.source.len())
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn bump(&mut self) -> Option<char> {
        let (_, c) = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn push(&mut self, kind: TokenType, start: usize, literal: Option<Literal>, line: usize, column: usize) {
        let source = self.source;
        let end = self.offset();
        let lexeme = &source[start..end];
        self.tokens.push(Token::new(kind, lexeme, literal, line, column));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenType> {
        tokenize(source).unwrap().into_iter().map(|t| t.token_type).collect()
    }

    #[test]
    fn test_single_and_double_char_operators() {
        assert_eq!(
            kinds("( ) { } + - * / ! != = == < <= > >="),
            vec![
                TokenType::LParen,
                TokenType::RParen,
                TokenType::LBrace,
                TokenType::RBrace,
                TokenType::Plus,
                TokenType::Minus,
                TokenType::Mul,
                TokenType::Div,
                TokenType::Bang,
                TokenType::BangEqual,
                TokenType::Equal,
                TokenType::EqualEqual,
                TokenType::Less,
                TokenType::LessEqual,
                TokenType::Greater,
                TokenType::GreaterEqual,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_empty_source_is_just_eof() {
        let tokens = tokenize("   \n\t ").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token_type, TokenType::Eof);
        assert_eq!(tokens[0].line, 2);
    }

    #[test]
    fn test_numbers() {
        let tokens = tokenize("42 3.25 .5").unwrap();
        assert_eq!(tokens[0].literal, Some(Literal::Int(42)));
        assert_eq!(tokens[0].lexeme, "42");
        assert_eq!(tokens[1].literal, Some(Literal::Float(3.25)));
        assert_eq!(tokens[1].lexeme, "3.25");
        assert_eq!(tokens[2].literal, Some(Literal::Float(0.5)));
    }

    #[test]
    fn test_trailing_dot_is_invalid_number() {
        let err = tokenize("print 12.").unwrap_err();
        assert_eq!(err.message, "Invalid number: '12.'");
        assert_eq!(err.location, SourceLocation::new(1, 7));
    }

    #[test]
    fn test_integer_too_large_is_invalid_number() {
        let err = tokenize("99999999999999999999").unwrap_err();
        assert!(err.message.starts_with("Invalid number"));
    }

    #[test]
    fn test_string_literal_excludes_quotes() {
        let tokens = tokenize("\"hello world\"").unwrap();
        assert_eq!(tokens[0].token_type, TokenType::String);
        assert_eq!(tokens[0].lexeme, "\"hello world\"");
        assert_eq!(tokens[0].literal, Some(Literal::Str("hello world".to_string())));
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("print \"oops").unwrap_err();
        assert_eq!(err.message, "Unterminated string literal");
        assert_eq!(err.location, SourceLocation::new(1, 7));
    }

    #[test]
    fn test_keywords_and_identifiers() {
        let tokens = tokenize("while _count and input or truthy").unwrap();
        assert_eq!(tokens[0].token_type, TokenType::While);
        assert_eq!(tokens[0].literal, None);
        assert_eq!(tokens[1].token_type, TokenType::Identifier);
        assert_eq!(tokens[1].literal, Some(Literal::Str("_count".to_string())));
        assert_eq!(tokens[2].token_type, TokenType::And);
        assert_eq!(tokens[3].token_type, TokenType::Input);
        assert_eq!(tokens[4].token_type, TokenType::Or);
        assert_eq!(tokens[5].token_type, TokenType::Identifier);
    }

    #[test]
    fn test_unicode_whitespace_is_skipped() {
        for source in ["print 1\u{00A0}+ 2", "print 1\x0c+ 2", "print 1\x0b+ 2"] {
            assert_eq!(
                kinds(source),
                vec![TokenType::Print, TokenType::Number, TokenType::Plus, TokenType::Number, TokenType::Eof]
            );
        }
    }

    #[test]
    fn test_unicode_minus_is_normalized() {
        let tokens = tokenize("5 \u{2013} 3").unwrap();
        assert_eq!(tokens[1].token_type, TokenType::Minus);
        assert_eq!(tokens[1].lexeme, "\u{2013}");
        assert_eq!(tokens[2].column, 5);
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize("x = 1 % 2").unwrap_err();
        assert_eq!(err.message, "Unexpected character: '%'");
        assert_eq!(err.location, SourceLocation::new(1, 7));
    }

    #[test]
    fn test_line_and_column_tracking() {
        let tokens = tokenize("x = 1\n  print x").unwrap();
        let print = &tokens[3];
        assert_eq!(print.token_type, TokenType::Print);
        assert_eq!((print.line, print.column), (2, 3));
        assert_eq!(tokens.last().map(|t| t.token_type), Some(TokenType::Eof));
    }
}
