// File: src/parser.rs
//
// Recursive descent parser for the Lox language.
// Transforms a sequence of tokens into an Abstract Syntax Tree (AST).
//
// Precedence, lowest to highest binding power:
//   assignment -> or -> and -> equality -> comparison -> term -> factor
//   -> unary -> call -> primary
//
// Statements:
//   print EXPR
//   if ( EXPR ) { ... } else { ... }
//   while ( EXPR ) { ... }
//   { STMT* }
//   EXPR
//
// There is no error recovery: the first failure aborts the unit.

use crate::ast::{Expr, Stmt};
use crate::errors::ParseError;
use crate::token::{Literal, Token, TokenType};

type ParseResult<T> = Result<T, ParseError>;

/// Parser maintains position in token stream and provides methods to parse statements and expressions
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Creates a new parser from a vector of tokens. A missing trailing
    /// `Eof` is tolerated and synthesized.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.token_type) != Some(TokenType::Eof) {
            let (line, column) = tokens.last().map(|t| (t.line, t.column)).unwrap_or((1, 1));
            tokens.push(Token::new(TokenType::Eof, "", None, line, column));
        }
        Parser { tokens, pos: 0 }
    }

    /// Parse the entire token stream into a vector of statements
    pub fn parse(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut stmts = Vec::new();
        while !self.is_at_end() {
            stmts.push(self.parse_stmt()?);
        }
        log::trace!("parsed {} top-level statements", stmts.len());
        Ok(stmts)
    }

    /// Parse a single expression that must span the whole token stream
    pub fn parse_expression(&mut self) -> ParseResult<Expr> {
        let expr = self.parse_expr()?;
        if !self.is_at_end() {
            return Err(self.error_at_current("Expect end of expression."));
        }
        Ok(expr)
    }

    fn parse_stmt(&mut self) -> ParseResult<Stmt> {
        match self.peek().token_type {
            TokenType::Print => {
                self.advance();
                let value = self.parse_expr()?;
                Ok(Stmt::Print(value))
            }
            TokenType::If => self.parse_if(),
            TokenType::While => self.parse_while(),
            TokenType::LBrace => self.parse_block(),
            _ => self.parse_expr().map(Stmt::Expression),
        }
    }

    fn parse_if(&mut self) -> ParseResult<Stmt> {
        self.advance(); // if
        self.consume(TokenType::LParen, "Expect '(' after 'if'.")?;
        let condition = self.parse_expr()?;
        self.consume(TokenType::RParen, "Expect ')' after if condition.")?;

        self.expect_block_start("Expect '{' before if body.")?;
        let then_branch = Box::new(self.parse_block()?);

        let else_branch = if self.match_token(TokenType::Else) {
            self.expect_block_start("Expect '{' before else body.")?;
            Some(Box::new(self.parse_block()?))
        } else {
            None
        };

        Ok(Stmt::If { condition, then_branch, else_branch })
    }

    fn parse_while(&mut self) -> ParseResult<Stmt> {
        self.advance(); // while
        self.consume(TokenType::LParen, "Expect '(' after 'while'.")?;
        let condition = self.parse_expr()?;
        self.consume(TokenType::RParen, "Expect ')' after while condition.")?;

        self.expect_block_start("Expect '{' before while body.")?;
        let body = Box::new(self.parse_block()?);
        Ok(Stmt::While { condition, body })
    }

    /// Parses `{ STMT* }`; the current token must be `{`
    fn parse_block(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenType::LBrace, "Expect '{' before block.")?;
        let mut body = Vec::new();
        while !self.check(TokenType::RBrace) && !self.is_at_end() {
            body.push(self.parse_stmt()?);
        }
        self.consume(TokenType::RBrace, "Expect '}' after block.")?;
        Ok(Stmt::Block(body))
    }

    fn expect_block_start(&self, message: &str) -> ParseResult<()> {
        if self.check(TokenType::LBrace) {
            Ok(())
        } else {
            Err(self.error_at_current(message))
        }
    }

    fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.parse_or()?;

        if self.check(TokenType::Equal) {
            let equals = self.advance().clone();
            let value = self.parse_assignment()?;
            return match expr {
                Expr::Variable { name } => Ok(Expr::Assignment { name, value: Box::new(value) }),
                _ => Err(Self::error_at(&equals, "Invalid assignment target.")),
            };
        }

        Ok(expr)
    }

    fn parse_or(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_and()?;

        while self.check(TokenType::Or) {
            let operator = self.advance().clone();
            let right = self.parse_and()?;
            left = Expr::Logical { left: Box::new(left), operator, right: Box::new(right) };
        }

        Ok(left)
    }

    fn parse_and(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_equality()?;

        while self.check(TokenType::And) {
            let operator = self.advance().clone();
            let right = self.parse_equality()?;
            left = Expr::Logical { left: Box::new(left), operator, right: Box::new(right) };
        }

        Ok(left)
    }

    fn parse_equality(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_comparison()?;

        while matches!(self.peek().token_type, TokenType::EqualEqual | TokenType::BangEqual) {
            let operator = self.advance().clone();
            let right = self.parse_comparison()?;
            left = Expr::Binary { left: Box::new(left), operator, right: Box::new(right) };
        }

        Ok(left)
    }

    fn parse_comparison(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_additive()?;

        while matches!(
            self.peek().token_type,
            TokenType::Less | TokenType::LessEqual | TokenType::Greater | TokenType::GreaterEqual
        ) {
            let operator = self.advance().clone();
            let right = self.parse_additive()?;
            left = Expr::Binary { left: Box::new(left), operator, right: Box::new(right) };
        }

        Ok(left)
    }

    fn parse_additive(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_multiplicative()?;

        while matches!(self.peek().token_type, TokenType::Plus | TokenType::Minus) {
            let operator = self.advance().clone();
            let right = self.parse_multiplicative()?;
            left = Expr::Binary { left: Box::new(left), operator, right: Box::new(right) };
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_unary()?;

        while matches!(self.peek().token_type, TokenType::Mul | TokenType::Div) {
            let operator = self.advance().clone();
            let right = self.parse_unary()?;
            left = Expr::Binary { left: Box::new(left), operator, right: Box::new(right) };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        if matches!(self.peek().token_type, TokenType::Bang | TokenType::Minus) {
            let operator = self.advance().clone();
            let right = self.parse_unary()?;
            return Ok(Expr::Unary { operator, right: Box::new(right) });
        }
        self.parse_call()
    }

    fn parse_call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_primary()?;

        // Chained calls: f()(x)
        while self.match_token(TokenType::LParen) {
            let mut arguments = Vec::new();
            if !self.check(TokenType::RParen) {
                arguments.push(self.parse_expr()?);
            }
            let paren = self.consume(TokenType::RParen, "Expect ')' after arguments.")?.clone();
            expr = Expr::Call { callee: Box::new(expr), paren, arguments };
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let token = self.peek().clone();
        match token.token_type {
            TokenType::Number | TokenType::String => {
                self.advance();
                match token.literal {
                    Some(literal) => Ok(Expr::Literal(literal)),
                    None => Err(Self::error_at(&token, "Expected expression.")),
                }
            }
            TokenType::True => {
                self.advance();
                Ok(Expr::Literal(Literal::Bool(true)))
            }
            TokenType::False => {
                self.advance();
                Ok(Expr::Literal(Literal::Bool(false)))
            }
            TokenType::Identifier | TokenType::Input => {
                self.advance();
                Ok(Expr::Variable { name: token })
            }
            TokenType::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.consume(TokenType::RParen, "Expect ')' after expression.")?;
                Ok(Expr::Grouping(Box::new(expr)))
            }
            _ => Err(Self::error_at(&token, "Expected expression.")),
        }
    }

    /// Advances past a token of the given type, or fails with `message`
    fn consume(&mut self, token_type: TokenType, message: &str) -> ParseResult<&Token> {
        if self.check(token_type) {
            Ok(self.advance())
        } else {
            Err(self.error_at_current(message))
        }
    }

    fn match_token(&mut self, token_type: TokenType) -> bool {
        if self.check(token_type) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, token_type: TokenType) -> bool {
        self.peek().token_type == token_type
    }

    /// Peek at the current token without consuming it
    fn peek(&self) -> &Token {
        // `new` guarantees a trailing Eof and `advance` never moves past it
        &self.tokens[self.pos]
    }

    /// Consume and return the current token, then advance to the next
    fn advance(&mut self) -> &Token {
        let current = self.pos;
        if !self.is_at_end() {
            self.pos += 1;
        }
        &self.tokens[current]
    }

    fn is_at_end(&self) -> bool {
        self.peek().token_type == TokenType::Eof
    }

    fn error_at_current(&self, message: &str) -> ParseError {
        Self::error_at(self.peek(), message)
    }

    fn error_at(token: &Token, message: &str) -> ParseError {
        let found = match token.token_type {
            TokenType::Eof => None,
            _ => Some(token.lexeme.clone()),
        };
        ParseError::new(message, token.location(), found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse(source: &str) -> ParseResult<Vec<Stmt>> {
        Parser::new(tokenize(source).unwrap()).parse()
    }

    fn parse_expr(source: &str) -> ParseResult<Expr> {
        Parser::new(tokenize(source).unwrap()).parse_expression()
    }

    /// Renders an expression in prefix form to check tree shape
    fn sexpr(expr: &Expr) -> String {
        match expr {
            Expr::Literal(Literal::Int(n)) => n.to_string(),
            Expr::Literal(Literal::Float(n)) => n.to_string(),
            Expr::Literal(Literal::Str(s)) => format!("{:?}", s),
            Expr::Literal(Literal::Bool(b)) => b.to_string(),
            Expr::Grouping(inner) => format!("(group {})", sexpr(inner)),
            Expr::Unary { operator, right } => format!("({} {})", operator.lexeme, sexpr(right)),
            Expr::Binary { left, operator, right } | Expr::Logical { left, operator, right } => {
                format!("({} {} {})", operator.lexeme, sexpr(left), sexpr(right))
            }
            Expr::Variable { name } => name.lexeme.clone(),
            Expr::Assignment { name, value } => format!("(= {} {})", name.lexeme, sexpr(value)),
            Expr::Call { callee, arguments, .. } => {
                let args: Vec<String> = arguments.iter().map(sexpr).collect();
                format!("(call {} {})", sexpr(callee), args.join(" "))
            }
            other => format!("{:?}", other),
        }
    }

    #[test]
    fn test_precedence_cascade() {
        let expr = parse_expr("1 + 2 * 3 == 7 and !false or x").unwrap();
        assert_eq!(sexpr(&expr), "(or (and (== (+ 1 (* 2 3)) 7) (! false)) x)");
    }

    #[test]
    fn test_binary_levels_left_associate() {
        assert_eq!(sexpr(&parse_expr("10 - 4 - 3").unwrap()), "(- (- 10 4) 3)");
        assert_eq!(sexpr(&parse_expr("8 / 4 / 2").unwrap()), "(/ (/ 8 4) 2)");
        assert_eq!(sexpr(&parse_expr("1 < 2 < 3").unwrap()), "(< (< 1 2) 3)");
    }

    #[test]
    fn test_assignment_is_right_associative() {
        assert_eq!(sexpr(&parse_expr("a = b = 3").unwrap()), "(= a (= b 3))");
    }

    #[test]
    fn test_unary_is_right_recursive() {
        assert_eq!(sexpr(&parse_expr("!!true").unwrap()), "(! (! true))");
        assert_eq!(sexpr(&parse_expr("--1").unwrap()), "(- (- 1))");
    }

    #[test]
    fn test_logical_nodes_for_and_or() {
        let expr = parse_expr("a and b").unwrap();
        assert!(matches!(expr, Expr::Logical { .. }));
        let expr = parse_expr("a == b").unwrap();
        assert!(matches!(expr, Expr::Binary { .. }));
    }

    #[test]
    fn test_grouping() {
        assert_eq!(sexpr(&parse_expr("(1 + 2) * 3").unwrap()), "(* (group (+ 1 2)) 3)");
    }

    #[test]
    fn test_calls_chain_with_zero_or_one_argument() {
        assert_eq!(sexpr(&parse_expr("input()").unwrap()), "(call input )");
        assert_eq!(sexpr(&parse_expr("f(1 + 2)(x)").unwrap()), "(call (call f (+ 1 2)) x)");
    }

    #[test]
    fn test_second_argument_is_rejected() {
        let err = parse_expr("f(1 2)").unwrap_err();
        assert_eq!(err.message, "Expect ')' after arguments.");
        assert_eq!(err.found.as_deref(), Some("2"));
    }

    #[test]
    fn test_invalid_assignment_target() {
        let err = parse("1 + 2 = 3").unwrap_err();
        assert_eq!(err.message, "Invalid assignment target.");
        assert_eq!(err.location.column, 7);
    }

    #[test]
    fn test_expected_expression() {
        let err = parse("print )").unwrap_err();
        assert_eq!(err.message, "Expected expression.");
        assert_eq!(err.position_hint(), "at ')'");

        let err = parse("x = ").unwrap_err();
        assert_eq!(err.message, "Expected expression.");
        assert_eq!(err.position_hint(), "at end");
    }

    #[test]
    fn test_missing_closing_paren() {
        let err = parse_expr("(1 + 2").unwrap_err();
        assert_eq!(err.message, "Expect ')' after expression.");
    }

    #[test]
    fn test_statements() {
        let stmts = parse("x = 1 { x = 2 print x } print x").unwrap();
        assert_eq!(stmts.len(), 3);
        assert!(matches!(stmts[0], Stmt::Expression(Expr::Assignment { .. })));
        match &stmts[1] {
            Stmt::Block(inner) => {
                assert_eq!(inner.len(), 2);
                assert!(matches!(inner[1], Stmt::Print(_)));
            }
            other => panic!("expected block, got {:?}", other),
        }
        assert!(matches!(stmts[2], Stmt::Print(_)));
    }

    #[test]
    fn test_if_else_branches_are_blocks() {
        let stmts = parse("if (1 < 2) { print \"yes\" } else { print \"no\" }").unwrap();
        match &stmts[0] {
            Stmt::If { then_branch, else_branch, .. } => {
                assert!(matches!(**then_branch, Stmt::Block(_)));
                assert!(matches!(else_branch.as_deref(), Some(Stmt::Block(_))));
            }
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_if_without_braces_is_rejected() {
        let err = parse("if (true) print 1").unwrap_err();
        assert_eq!(err.message, "Expect '{' before if body.");
        let err = parse("if (true) { } else print 1").unwrap_err();
        assert_eq!(err.message, "Expect '{' before else body.");
    }

    #[test]
    fn test_while_requires_parens_and_block() {
        let stmts = parse("while (x < 3) { x = x + 1 }").unwrap();
        assert!(matches!(&stmts[0], Stmt::While { body, .. } if matches!(**body, Stmt::Block(_))));

        let err = parse("while x < 3 { }").unwrap_err();
        assert_eq!(err.message, "Expect '(' after 'while'.");
        let err = parse("while (x) x = 1").unwrap_err();
        assert_eq!(err.message, "Expect '{' before while body.");
    }

    #[test]
    fn test_unclosed_block() {
        let err = parse("{ print 1").unwrap_err();
        assert_eq!(err.message, "Expect '}' after block.");
        assert_eq!(err.found, None);
    }

    #[test]
    fn test_parse_expression_requires_single_expression() {
        let err = parse_expr("1 2").unwrap_err();
        assert_eq!(err.message, "Expect end of expression.");
    }

    #[test]
    fn test_missing_eof_is_synthesized() {
        let mut tokens = tokenize("print 1").unwrap();
        tokens.pop();
        let stmts = Parser::new(tokens).parse().unwrap();
        assert_eq!(stmts.len(), 1);
    }
}
