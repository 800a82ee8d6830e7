//! Expression parsing implementation
//!
//! Binary operators are parsed by precedence climbing, one method per level,
//! all left-associative. From lowest to highest binding:
//!
//! ```text
//! ||   &&   == !=   < > <= >=   + -   * / %   unary - + !
//! ```
//!
//! The location of a binary node is the location of its operator, so a
//! runtime division by zero points at the `/`. Parentheses and unary
//! operators count against the parser's nesting limit; every node built
//! here is checked against the tree height limit.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};

const EQUALITY_OPS: &[(TokenKind, BinOp)] = &[
    (TokenKind::EqEq, BinOp::Eq),
    (TokenKind::NotEq, BinOp::Ne),
];

const RELATIONAL_OPS: &[(TokenKind, BinOp)] = &[
    (TokenKind::Lt, BinOp::Lt),
    (TokenKind::Le, BinOp::Le),
    (TokenKind::Gt, BinOp::Gt),
    (TokenKind::Ge, BinOp::Ge),
];

const ADDITIVE_OPS: &[(TokenKind, BinOp)] = &[
    (TokenKind::Plus, BinOp::Add),
    (TokenKind::Minus, BinOp::Sub),
];

const MULTIPLICATIVE_OPS: &[(TokenKind, BinOp)] = &[
    (TokenKind::Star, BinOp::Mul),
    (TokenKind::Slash, BinOp::Div),
    (TokenKind::Percent, BinOp::Mod),
];

impl Parser {
    /// Parse expression (top-level entry point)
    pub(crate) fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_logical_or()
    }

    /// Parse logical OR (||)
    fn parse_logical_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_logical_and()?;

        while self.match_token(&TokenKind::OrOr) {
            let loc = self.previous().location;
            let right = self.parse_logical_and()?;
            left = self.node(binary(BinOp::Or, left, right), loc)?;
        }

        Ok(left)
    }

    /// Parse logical AND (&&)
    fn parse_logical_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_equality()?;

        while self.match_token(&TokenKind::AndAnd) {
            let loc = self.previous().location;
            let right = self.parse_equality()?;
            left = self.node(binary(BinOp::And, left, right), loc)?;
        }

        Ok(left)
    }

    /// Parse equality (== !=)
    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_relational()?;

        while let Some((op, loc)) = self.match_binary_op(EQUALITY_OPS) {
            let right = self.parse_relational()?;
            left = self.node(binary(op, left, right), loc)?;
        }

        Ok(left)
    }

    /// Parse relational (< <= > >=)
    fn parse_relational(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive()?;

        while let Some((op, loc)) = self.match_binary_op(RELATIONAL_OPS) {
            let right = self.parse_additive()?;
            left = self.node(binary(op, left, right), loc)?;
        }

        Ok(left)
    }

    /// Parse additive (+ -)
    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;

        while let Some((op, loc)) = self.match_binary_op(ADDITIVE_OPS) {
            let right = self.parse_multiplicative()?;
            left = self.node(binary(op, left, right), loc)?;
        }

        Ok(left)
    }

    /// Parse multiplicative (* / %)
    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        while let Some((op, loc)) = self.match_binary_op(MULTIPLICATIVE_OPS) {
            let right = self.parse_unary()?;
            left = self.node(binary(op, left, right), loc)?;
        }

        Ok(left)
    }

    /// Parse unary (- + !), right-recursive
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let loc = self.current_location();
        let op = match self.peek().kind {
            TokenKind::Minus => UnOp::Neg,
            TokenKind::Plus => UnOp::Plus,
            TokenKind::Bang => UnOp::Not,
            _ => return self.parse_primary(),
        };
        self.advance();

        let operand = Box::new(self.nested(Self::parse_unary)?);
        self.node(ExprKind::Unary { op, operand }, loc)
    }

    /// Parse primary: identifier, literal, or parenthesized expression
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let loc = self.current_location();

        let kind = match self.peek().kind.clone() {
            TokenKind::IntLiteral(n) => ExprKind::IntLiteral(n),
            TokenKind::FloatLiteral(n) => ExprKind::FloatLiteral(n),
            TokenKind::Ident(name) => {
                if matches!(self.peek_ahead(1), Some(t) if t.kind == TokenKind::LParen) {
                    return Err(ParseError::Unsupported {
                        construct: format!("call to '{}'", name),
                        location: loc,
                    });
                }
                ExprKind::Variable(name)
            }
            TokenKind::LParen => {
                return self.nested(|parser| {
                    parser.advance();
                    let expr = parser.parse_expression()?;
                    parser.expect_token(&TokenKind::RParen, "')' after expression")?;
                    Ok(expr)
                });
            }
            _ => return Err(self.unexpected("expression")),
        };

        self.advance();
        Ok(Expr::new(kind, loc))
    }

    /// Consume the current token if it is one of `ops`.
    fn match_binary_op(
        &mut self,
        ops: &[(TokenKind, BinOp)],
    ) -> Option<(BinOp, SourceLocation)> {
        let loc = self.current_location();
        let op = ops
            .iter()
            .find(|(kind, _)| self.check(kind))
            .map(|(_, op)| *op)?;
        self.advance();
        Some((op, loc))
    }
}

fn binary(op: BinOp, left: Expr, right: Expr) -> ExprKind {
    ExprKind::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}
