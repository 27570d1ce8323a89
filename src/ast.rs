// File: src/ast.rs
//
// Abstract Syntax Tree (AST) definitions for the Lox language.
// Expressions (Expr) evaluate to values, statements (Stmt) are executed
// for their effect. Both are closed sum types: the evaluator matches on
// them exhaustively. Every child node is owned by its parent, so a tree
// is acyclic and immutable once the parser hands it out.

use crate::token::{Literal, Token};

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Grouping(Box<Expr>),
    Unary {
        operator: Token,
        right: Box<Expr>,
    },
    /// Arithmetic, comparison and equality operators
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
    /// `and` / `or`. Kept apart from Binary so the right operand is only
    /// evaluated when the left one does not decide the result.
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
    Variable {
        name: Token,
    },
    Assignment {
        name: Token,
        value: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        /// Closing parenthesis, used to locate call errors
        paren: Token,
        arguments: Vec<Expr>,
    },

    // Reserved for object support. The parser never builds these.
    Get {
        object: Box<Expr>,
        name: Token,
    },
    Set {
        object: Box<Expr>,
        name: Token,
        value: Box<Expr>,
    },
    Super {
        keyword: Token,
        method: Token,
    },
    This {
        keyword: Token,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expression(Expr),
    Print(Expr),
    /// Both branches are always `Stmt::Block`
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    /// The body is always `Stmt::Block`
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    Block(Vec<Stmt>),
}
