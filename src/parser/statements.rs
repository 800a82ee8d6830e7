//! Statement parsing implementation
//!
//! # Grammar
//!
//! ```text
//! block      ::= '{' stmt* '}'
//! stmt       ::= vardecl | assignment | if_stmt | while_stmt | printf_call | block
//! vardecl    ::= ('int' | 'float') IDENT ('=' expr)? ';'
//! assignment ::= IDENT '=' expr ';'
//! if_stmt    ::= 'if' '(' expr ')' block ('else' (block | if_stmt))?
//! while_stmt ::= 'while' '(' expr ')' block
//! printf     ::= 'printf' '(' STRING (',' expr)* ')' ';'
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse `{ stmt* }`
    pub(crate) fn parse_block(&mut self) -> Result<Block, ParseError> {
        let location = self.current_location();
        self.expect_token(&TokenKind::LBrace, "'{'")?;

        let mut statements = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            if self.is_at_end() {
                return Err(self.unexpected("'}'"));
            }
            statements.push(self.nested(Self::parse_statement)?);
        }
        self.advance();

        Ok(Block {
            statements,
            location,
        })
    }

    /// Parse a statement
    pub(crate) fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        let loc = self.current_location();

        match self.peek().kind.clone() {
            TokenKind::Int => {
                self.advance();
                self.parse_variable_declaration(Type::Int, loc)
            }
            TokenKind::Float => {
                self.advance();
                self.parse_variable_declaration(Type::Float, loc)
            }
            TokenKind::If => {
                self.advance();
                self.parse_if_statement(loc)
            }
            TokenKind::While => {
                self.advance();
                self.parse_while_statement(loc)
            }
            TokenKind::Printf => {
                self.advance();
                self.parse_printf(loc)
            }
            TokenKind::LBrace => Ok(Stmt::Block(self.parse_block()?)),
            TokenKind::Ident(name) => {
                if matches!(self.peek_ahead(1), Some(t) if t.kind == TokenKind::LParen) {
                    return Err(ParseError::Unsupported {
                        construct: format!("call to '{}'", name),
                        location: loc,
                    });
                }
                self.advance();
                self.parse_assignment(name, loc)
            }
            _ => Err(self.unexpected("statement")),
        }
    }

    /// Parse variable declaration after its type keyword: `name [= init];`
    fn parse_variable_declaration(
        &mut self,
        var_type: Type,
        location: SourceLocation,
    ) -> Result<Stmt, ParseError> {
        let name = self.expect_identifier()?;

        let init = if self.match_token(&TokenKind::Eq) {
            Some(self.parse_expression()?)
        } else {
            None
        };

        self.expect_semicolon("after variable declaration")?;

        Ok(Stmt::VarDecl {
            name,
            var_type,
            init,
            location,
        })
    }

    /// Parse `= expr;` after the target identifier
    fn parse_assignment(&mut self, name: String, location: SourceLocation) -> Result<Stmt, ParseError> {
        self.expect_token(&TokenKind::Eq, &format!("'=' after '{}'", name))?;
        let value = self.parse_expression()?;
        self.expect_semicolon("after assignment")?;

        Ok(Stmt::Assignment {
            name,
            value,
            location,
        })
    }

    /// Parse if statement; `else if` chains nest as a one-statement block.
    fn parse_if_statement(&mut self, location: SourceLocation) -> Result<Stmt, ParseError> {
        let condition = self.parse_condition("if")?;
        let then_branch = self.parse_block()?;

        let else_branch = if self.match_token(&TokenKind::Else) {
            if self.check(&TokenKind::If) {
                let nested_loc = self.current_location();
                self.advance();
                let nested = self.nested(|parser| parser.parse_if_statement(nested_loc))?;
                Some(Block {
                    statements: vec![nested],
                    location: nested_loc,
                })
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
            location,
        })
    }

    /// Parse while statement
    fn parse_while_statement(&mut self, location: SourceLocation) -> Result<Stmt, ParseError> {
        let condition = self.parse_condition("while")?;
        let body = self.parse_block()?;

        Ok(Stmt::While {
            condition,
            body,
            location,
        })
    }

    /// `( expr )` after `if` / `while`
    fn parse_condition(&mut self, keyword: &str) -> Result<Expr, ParseError> {
        self.expect_token(&TokenKind::LParen, &format!("'(' after '{}'", keyword))?;
        let condition = self.parse_expression()?;
        self.expect_token(&TokenKind::RParen, &format!("')' after {} condition", keyword))?;
        Ok(condition)
    }

    /// Parse `( "format" , args... ) ;` after `printf`
    fn parse_printf(&mut self, location: SourceLocation) -> Result<Stmt, ParseError> {
        self.expect_token(&TokenKind::LParen, "'(' after 'printf'")?;

        let format = match &self.peek().kind {
            TokenKind::StringLiteral(s) => s.clone(),
            _ => return Err(self.unexpected("format string literal")),
        };
        self.advance();

        let mut args = Vec::new();
        while self.match_token(&TokenKind::Comma) {
            args.push(self.parse_expression()?);
        }

        self.expect_token(&TokenKind::RParen, "')' after printf arguments")?;
        self.expect_semicolon("after printf call")?;

        Ok(Stmt::Printf {
            format,
            args,
            pieces: None,
            location,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::lexer::Lexer;
    use crate::parser::parse::{ParseError, Parser, MAX_NESTING_DEPTH};

    fn parse_body(body: &str) -> Result<Vec<Stmt>, ParseError> {
        let source = format!("void main() {{ {} }}", body);
        let tokens = Lexer::new(&source).tokenize().unwrap();
        Parser::new(tokens)
            .parse_program()
            .map(|p| p.body.statements)
    }

    #[test]
    fn test_declarations() {
        let stmts = parse_body("int x; float y = 2.5;").unwrap();

        assert!(matches!(
            &stmts[0],
            Stmt::VarDecl { name, var_type: Type::Int, init: None, .. } if name == "x"
        ));
        match &stmts[1] {
            Stmt::VarDecl {
                name,
                var_type: Type::Float,
                init: Some(expr),
                ..
            } => {
                assert_eq!(name, "y");
                assert_eq!(expr.kind, ExprKind::FloatLiteral(2.5));
            }
            other => panic!("Expected float declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_if_else() {
        let stmts = parse_body("if (x > 0) { x = 1; } else { x = 2; }").unwrap();

        match &stmts[0] {
            Stmt::If {
                then_branch,
                else_branch: Some(else_branch),
                ..
            } => {
                assert_eq!(then_branch.statements.len(), 1);
                assert_eq!(else_branch.statements.len(), 1);
            }
            other => panic!("Expected if/else, got {:?}", other),
        }
    }

    #[test]
    fn test_else_if_chain() {
        let stmts = parse_body("if (x) { } else if (y) { } else { }").unwrap();

        match &stmts[0] {
            Stmt::If {
                else_branch: Some(else_branch),
                ..
            } => assert!(matches!(
                else_branch.statements[0],
                Stmt::If {
                    else_branch: Some(_),
                    ..
                }
            )),
            other => panic!("Expected if/else-if, got {:?}", other),
        }
    }

    #[test]
    fn test_if_requires_block() {
        let err = parse_body("if (x) x = 1;").unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnexpectedToken { ref expected, .. } if expected == "'{'"
        ));
    }

    #[test]
    fn test_while_and_nested_block() {
        let stmts = parse_body("while (x != 0) { { x = x - 1; } }").unwrap();

        match &stmts[0] {
            Stmt::While { body, .. } => {
                assert!(matches!(body.statements[0], Stmt::Block(_)));
            }
            other => panic!("Expected while, got {:?}", other),
        }
    }

    #[test]
    fn test_printf() {
        let stmts = parse_body(r#"printf("%d and %f\n", x, y + 1);"#).unwrap();

        match &stmts[0] {
            Stmt::Printf {
                format,
                args,
                pieces,
                ..
            } => {
                assert_eq!(format, "%d and %f\n");
                assert_eq!(args.len(), 2);
                assert!(pieces.is_none());
            }
            other => panic!("Expected printf, got {:?}", other),
        }
    }

    #[test]
    fn test_printf_needs_literal_format() {
        let err = parse_body("printf(x);").unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnexpectedToken { ref expected, .. } if expected == "format string literal"
        ));
    }

    #[test]
    fn test_missing_semicolon() {
        let err = parse_body("x = 1 y = 2;").unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnexpectedToken { ref expected, ref found, .. }
                if expected == "';' after assignment" && found == "identifier 'y'"
        ));
    }

    #[test]
    fn test_unsupported_constructs() {
        for body in ["scanf(\"%d\", x);", "return;", "for (;;) { }", "foo();"] {
            let err = parse_body(body).unwrap_err();
            assert_eq!(err.kind(), "unsupported", "body: {}", body);
        }
    }

    #[test]
    fn test_deep_blocks_are_rejected() {
        let body = format!("{}{}", "{ ".repeat(10_000), "} ".repeat(10_000));
        assert!(matches!(
            parse_body(&body),
            Err(ParseError::NestingTooDeep { limit: MAX_NESTING_DEPTH, .. })
        ));

        let body = format!("{}int x;{}", "{ ".repeat(100), "} ".repeat(100));
        assert_eq!(parse_body(&body).unwrap().len(), 1);
    }

    #[test]
    fn test_long_else_if_chain() {
        let chain = |arms: usize| {
            let mut body = String::from("int n; if (n == 0) { n = 1; }");
            for i in 1..arms {
                body.push_str(&format!(" else if (n == {}) {{ n = {}; }}", i, i + 1));
            }
            body
        };

        assert_eq!(parse_body(&chain(100)).unwrap().len(), 2);
        assert_eq!(parse_body(&chain(1_000)).unwrap_err().kind(), "nesting-too-deep");
    }
}
