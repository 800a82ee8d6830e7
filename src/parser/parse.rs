//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including error types, helper methods, and the main parse entry point.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, and `void main()` framing
//! - `statements`: Parsing statements (declarations, assignment, if, while, printf)
//! - `expressions`: Parsing expressions with precedence climbing
//!
//! A single structural mismatch aborts the parse; there is no panic-mode
//! recovery. Blocks, parentheses, unary chains and expression trees may nest
//! at most [`MAX_NESTING_DEPTH`] levels, which keeps every recursive pass
//! over the tree within the stack.

use crate::parser::ast::*;
use crate::parser::lexer::{Token, TokenKind};
use thiserror::Error;
use tracing::debug;

/// Deepest accepted nesting of blocks and expressions
pub const MAX_NESTING_DEPTH: usize = 256;

/// Parser error type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        location: SourceLocation,
    },

    #[error("expected {expected}, found end of file")]
    UnexpectedEof {
        expected: String,
        location: SourceLocation,
    },

    #[error("{construct} is not supported in this C subset")]
    Unsupported {
        construct: String,
        location: SourceLocation,
    },

    #[error("nesting deeper than {limit} levels")]
    NestingTooDeep {
        limit: usize,
        location: SourceLocation,
    },
}

impl ParseError {
    pub fn location(&self) -> SourceLocation {
        match self {
            ParseError::UnexpectedToken { location, .. }
            | ParseError::UnexpectedEof { location, .. }
            | ParseError::Unsupported { location, .. }
            | ParseError::NestingTooDeep { location, .. } => *location,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ParseError::UnexpectedToken { .. } => "unexpected-token",
            ParseError::UnexpectedEof { .. } => "unexpected-eof",
            ParseError::Unsupported { .. } => "unsupported",
            ParseError::NestingTooDeep { .. } => "nesting-too-deep",
        }
    }
}

/// Recursive descent parser for the mini-C subset
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    /// Blocks and sub-expressions currently open
    depth: usize,
}

impl Parser {
    /// Create a parser over a token stream. A trailing EOF token is added
    /// if the stream does not already end with one.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last(), Some(t) if t.kind == TokenKind::Eof) {
            let location = tokens
                .last()
                .map(|t| t.location)
                .unwrap_or(SourceLocation::new(1, 1));
            tokens.push(Token {
                kind: TokenKind::Eof,
                lexeme: String::new(),
                location,
            });
        }

        Self {
            tokens,
            position: 0,
            depth: 0,
        }
    }

    /// Parse the translation unit: `void main ( ) block EOF`
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let location = self.current_location();

        self.expect_token(&TokenKind::Void, "'void' before 'main'")?;
        match self.peek().kind.clone() {
            TokenKind::Ident(name) if name == "main" => {
                self.advance();
            }
            TokenKind::Ident(name) => {
                return Err(ParseError::Unsupported {
                    construct: format!("function '{}' (only 'main' may be defined)", name),
                    location: self.current_location(),
                });
            }
            _ => return Err(self.unexpected("'main'")),
        }
        self.expect_token(&TokenKind::LParen, "'(' after 'main'")?;
        self.expect_token(&TokenKind::RParen, "')' (main takes no parameters)")?;

        let body = self.parse_block()?;

        if !self.is_at_end() {
            return Err(self.unexpected("end of file after main body"));
        }

        let program = Program { body, location };
        debug!(
            statements = program.statement_count(),
            "parsed translation unit"
        );
        Ok(program)
    }

    // ===== Helper methods =====

    /// Run `parse` one nesting level deeper
    pub(crate) fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.too_deep(self.current_location()));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Build an expression node, rejecting trees taller than the limit
    pub(crate) fn node(&self, kind: ExprKind, location: SourceLocation) -> Result<Expr, ParseError> {
        let expr = Expr::new(kind, location);
        if expr.height() > MAX_NESTING_DEPTH {
            return Err(self.too_deep(location));
        }
        Ok(expr)
    }

    fn too_deep(&self, location: SourceLocation) -> ParseError {
        ParseError::NestingTooDeep {
            limit: MAX_NESTING_DEPTH,
            location,
        }
    }

    pub(crate) fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.peek().kind.same_variant(kind)
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    pub(crate) fn peek(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.position.min(last)]
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location
    }

    /// Build the error for "expected X" at the current token.
    pub(crate) fn unexpected(&self, expected: &str) -> ParseError {
        let token = self.peek();
        match &token.kind {
            TokenKind::Eof => ParseError::UnexpectedEof {
                expected: expected.to_string(),
                location: token.location,
            },
            TokenKind::Reserved(word) => ParseError::Unsupported {
                construct: format!("'{}'", word),
                location: token.location,
            },
            kind => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: kind.to_string(),
                location: token.location,
            },
        }
    }

    pub(crate) fn expect_token(&mut self, kind: &TokenKind, expected: &str) -> Result<(), ParseError> {
        if self.match_token(kind) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    pub(crate) fn expect_semicolon(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(&TokenKind::Semicolon, &format!("';' {ctx}"))
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if let TokenKind::Ident(name) = &self.peek().kind {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(self.unexpected("identifier"))
        }
    }
}
