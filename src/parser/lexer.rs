//! Lexer (tokenizer) for mini-C source code
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//! The [`Lexer`] is itself an [`Iterator`] yielding one token at a time, so
//! callers that only need a prefix of the stream never tokenize the rest.
//!
//! Whitespace, `// line` and `/* block */` comments are skipped. Anything the
//! subset does not know about (`#include`, `&`, `[`, ...) is a [`LexError`].
//! Reserved C keywords outside the subset still lex (as
//! [`TokenKind::Reserved`]) so the parser can report them by name.

use super::ast::SourceLocation;
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// C keywords the subset deliberately does not support.
const RESERVED_WORDS: &[&str] = &[
    "return", "scanf", "for", "do", "switch", "case", "default", "break", "continue", "goto",
    "struct", "union", "enum", "typedef", "char", "double", "long", "short", "unsigned",
    "signed", "const", "static", "extern", "sizeof",
];

/// All token variants produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    IntLiteral(i64),
    FloatLiteral(f64),
    StringLiteral(String),

    // Identifiers
    Ident(String),

    // Keywords
    Int,
    Float,
    Void,
    If,
    Else,
    While,
    Printf,
    /// A C keyword outside the supported subset
    Reserved(String),

    // Arithmetic
    Plus,    // +
    Minus,   // -
    Star,    // *
    Slash,   // /
    Percent, // %

    // Comparison
    EqEq,  // ==
    NotEq, // !=
    Lt,    // <
    Le,    // <=
    Gt,    // >
    Ge,    // >=

    // Logical
    AndAnd, // &&
    OrOr,   // ||
    Bang,   // !

    // Assignment
    Eq, // =

    // Punctuation
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    Semicolon, // ;
    Comma,     // ,

    // End of file
    Eof,
}

/// Coarse token classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCategory {
    Ident,
    IntLit,
    FloatLit,
    StringLit,
    Keyword,
    Operator,
    Punct,
    Eof,
}

impl TokenKind {
    pub fn category(&self) -> TokenCategory {
        match self {
            TokenKind::IntLiteral(_) => TokenCategory::IntLit,
            TokenKind::FloatLiteral(_) => TokenCategory::FloatLit,
            TokenKind::StringLiteral(_) => TokenCategory::StringLit,
            TokenKind::Ident(_) => TokenCategory::Ident,
            TokenKind::Int
            | TokenKind::Float
            | TokenKind::Void
            | TokenKind::If
            | TokenKind::Else
            | TokenKind::While
            | TokenKind::Printf
            | TokenKind::Reserved(_) => TokenCategory::Keyword,
            TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Star
            | TokenKind::Slash
            | TokenKind::Percent
            | TokenKind::EqEq
            | TokenKind::NotEq
            | TokenKind::Lt
            | TokenKind::Le
            | TokenKind::Gt
            | TokenKind::Ge
            | TokenKind::AndAnd
            | TokenKind::OrOr
            | TokenKind::Bang
            | TokenKind::Eq => TokenCategory::Operator,
            TokenKind::LParen
            | TokenKind::RParen
            | TokenKind::LBrace
            | TokenKind::RBrace
            | TokenKind::Semicolon
            | TokenKind::Comma => TokenCategory::Punct,
            TokenKind::Eof => TokenCategory::Eof,
        }
    }

    /// Whether `other` is the same variant, ignoring any payload.
    pub fn same_variant(&self, other: &TokenKind) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::IntLiteral(n) => write!(f, "int literal {}", n),
            TokenKind::FloatLiteral(n) => write!(f, "float literal {:?}", n),
            TokenKind::StringLiteral(s) => write!(f, "string literal {:?}", s),
            TokenKind::Ident(s) => write!(f, "identifier '{}'", s),
            TokenKind::Int => write!(f, "'int'"),
            TokenKind::Float => write!(f, "'float'"),
            TokenKind::Void => write!(f, "'void'"),
            TokenKind::If => write!(f, "'if'"),
            TokenKind::Else => write!(f, "'else'"),
            TokenKind::While => write!(f, "'while'"),
            TokenKind::Printf => write!(f, "'printf'"),
            TokenKind::Reserved(word) => write!(f, "'{}'", word),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::Minus => write!(f, "'-'"),
            TokenKind::Star => write!(f, "'*'"),
            TokenKind::Slash => write!(f, "'/'"),
            TokenKind::Percent => write!(f, "'%'"),
            TokenKind::EqEq => write!(f, "'=='"),
            TokenKind::NotEq => write!(f, "'!='"),
            TokenKind::Lt => write!(f, "'<'"),
            TokenKind::Le => write!(f, "'<='"),
            TokenKind::Gt => write!(f, "'>'"),
            TokenKind::Ge => write!(f, "'>='"),
            TokenKind::AndAnd => write!(f, "'&&'"),
            TokenKind::OrOr => write!(f, "'||'"),
            TokenKind::Bang => write!(f, "'!'"),
            TokenKind::Eq => write!(f, "'='"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::LBrace => write!(f, "'{{'"),
            TokenKind::RBrace => write!(f, "'}}'"),
            TokenKind::Semicolon => write!(f, "';'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Eof => write!(f, "end of file"),
        }
    }
}

/// A lexed token. Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text the token was read from (escapes not decoded)
    pub lexeme: String,
    pub location: SourceLocation,
}

impl Token {
    pub fn category(&self) -> TokenCategory {
        self.kind.category()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

/// Lexer error type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("unexpected character '{ch}'")]
    UnexpectedCharacter { ch: char, location: SourceLocation },

    #[error("unterminated string literal")]
    UnterminatedString { location: SourceLocation },

    #[error("unknown escape sequence '\\{ch}'")]
    UnknownEscape { ch: char, location: SourceLocation },

    #[error("invalid numeric literal '{text}'")]
    InvalidNumber {
        text: String,
        location: SourceLocation,
    },

    #[error("unterminated block comment")]
    UnterminatedComment { location: SourceLocation },
}

impl LexError {
    pub fn location(&self) -> SourceLocation {
        match self {
            LexError::UnexpectedCharacter { location, .. }
            | LexError::UnterminatedString { location }
            | LexError::UnknownEscape { location, .. }
            | LexError::InvalidNumber { location, .. }
            | LexError::UnterminatedComment { location } => *location,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LexError::UnexpectedCharacter { .. } => "unexpected-character",
            LexError::UnterminatedString { .. } => "unterminated-string",
            LexError::UnknownEscape { .. } => "unknown-escape",
            LexError::InvalidNumber { .. } => "invalid-number",
            LexError::UnterminatedComment { .. } => "unterminated-comment",
        }
    }
}

/// Lexer for mini-C source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    finished: bool,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            finished: false,
        }
    }

    /// Tokenize the entire input, stopping at the first error.
    ///
    /// The returned vector always ends with a [`TokenKind::Eof`] token.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let tokens = self.by_ref().collect::<Result<Vec<_>, _>>()?;
        debug!(count = tokens.len(), "tokenized source");
        Ok(tokens)
    }

    /// Tokenize the entire input, resyncing to the next line after each error.
    ///
    /// Used to build a full error listing; the token vector is only
    /// meaningful when the error list is empty.
    pub fn tokenize_recovering(&mut self) -> (Vec<Token>, Vec<LexError>) {
        let mut tokens = Vec::new();
        let mut errors = Vec::new();

        loop {
            match self.scan() {
                Ok(token) => {
                    let at_end = token.kind == TokenKind::Eof;
                    tokens.push(token);
                    if at_end {
                        break;
                    }
                }
                Err(err) => {
                    errors.push(err);
                    self.skip_rest_of_line();
                }
            }
        }

        self.finished = true;
        (tokens, errors)
    }

    /// Scan the next token, including the trailing EOF token.
    fn scan(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace_and_comments()?;

        let start = self.position;
        let loc = self.current_location();
        let kind = match self.advance() {
            None => TokenKind::Eof,
            Some(ch) => self.next_kind(ch, loc)?,
        };

        let lexeme: String = self.input[start..self.position].iter().collect();
        Ok(Token {
            kind,
            lexeme,
            location: loc,
        })
    }

    /// Classify the token starting with `ch`
    fn next_kind(&mut self, ch: char, loc: SourceLocation) -> Result<TokenKind, LexError> {
        match ch {
            '"' => self.string_literal(loc),
            '0'..='9' => self.number_literal(ch, loc),
            'a'..='z' | 'A'..='Z' | '_' => Ok(self.identifier_or_keyword(ch)),

            '+' => Ok(TokenKind::Plus),
            '-' => Ok(TokenKind::Minus),
            '*' => Ok(TokenKind::Star),
            '/' => Ok(TokenKind::Slash),
            '%' => Ok(TokenKind::Percent),
            '=' => Ok(self.either('=', TokenKind::EqEq, TokenKind::Eq)),
            '!' => Ok(self.either('=', TokenKind::NotEq, TokenKind::Bang)),
            '<' => Ok(self.either('=', TokenKind::Le, TokenKind::Lt)),
            '>' => Ok(self.either('=', TokenKind::Ge, TokenKind::Gt)),
            '&' if self.peek() == Some('&') => {
                self.advance();
                Ok(TokenKind::AndAnd)
            }
            '|' if self.peek() == Some('|') => {
                self.advance();
                Ok(TokenKind::OrOr)
            }
            '(' => Ok(TokenKind::LParen),
            ')' => Ok(TokenKind::RParen),
            '{' => Ok(TokenKind::LBrace),
            '}' => Ok(TokenKind::RBrace),
            ';' => Ok(TokenKind::Semicolon),
            ',' => Ok(TokenKind::Comma),

            _ => Err(LexError::UnexpectedCharacter { ch, location: loc }),
        }
    }

    /// Two-character operator if the next char is `second`, else the single one.
    fn either(&mut self, second: char, double: TokenKind, single: TokenKind) -> TokenKind {
        if self.peek() == Some(second) {
            self.advance();
            double
        } else {
            single
        }
    }

    /// Parse string literal; the opening quote is already consumed.
    fn string_literal(&mut self, loc: SourceLocation) -> Result<TokenKind, LexError> {
        let mut string = String::new();

        while let Some(ch) = self.peek() {
            match ch {
                '"' => {
                    self.advance();
                    return Ok(TokenKind::StringLiteral(string));
                }
                '\n' => break,
                '\\' => {
                    self.advance();
                    let escape_loc = self.current_location();
                    let escaped = self
                        .advance()
                        .ok_or(LexError::UnterminatedString { location: loc })?;

                    let unescaped = match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        '\\' => '\\',
                        '"' => '"',
                        '\'' => '\'',
                        '0' => '\0',
                        '\n' => break,
                        _ => {
                            return Err(LexError::UnknownEscape {
                                ch: escaped,
                                location: escape_loc,
                            });
                        }
                    };
                    string.push(unescaped);
                }
                _ => {
                    string.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::UnterminatedString { location: loc })
    }

    /// Parse numeric literal: digits, optionally one `.` and more digits.
    fn number_literal(&mut self, first_digit: char, loc: SourceLocation) -> Result<TokenKind, LexError> {
        let mut text = String::new();
        text.push(first_digit);
        self.take_digits(&mut text);

        let is_float = self.peek() == Some('.');
        if is_float {
            text.push('.');
            self.advance();
            self.take_digits(&mut text);
        }

        // 1.2.3, 12abc
        if let Some(ch) = self.peek() {
            if ch == '.' || ch.is_ascii_alphabetic() || ch == '_' {
                while let Some(ch) = self.peek() {
                    if ch == '.' || ch.is_ascii_alphanumeric() || ch == '_' {
                        text.push(ch);
                        self.advance();
                    } else {
                        break;
                    }
                }
                return Err(LexError::InvalidNumber { text, location: loc });
            }
        }

        if is_float {
            text.parse::<f64>()
                .map(TokenKind::FloatLiteral)
                .map_err(|_| LexError::InvalidNumber { text, location: loc })
        } else {
            text.parse::<i64>()
                .map(TokenKind::IntLiteral)
                .map_err(|_| LexError::InvalidNumber { text, location: loc })
        }
    }

    fn take_digits(&mut self, text: &mut String) {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self, first_char: char) -> TokenKind {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match ident.as_str() {
            "int" => TokenKind::Int,
            "float" => TokenKind::Float,
            "void" => TokenKind::Void,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "printf" => TokenKind::Printf,
            word if RESERVED_WORDS.contains(&word) => TokenKind::Reserved(ident),
            _ => TokenKind::Ident(ident),
        }
    }

    /// Skip whitespace and comments
    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(ch) if ch.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_ahead(1) == Some('/') => self.skip_rest_of_line(),
                Some('/') if self.peek_ahead(1) == Some('*') => self.skip_block_comment()?,
                _ => break,
            }
        }
        Ok(())
    }

    /// Skip through the next newline (line comments and error resync)
    fn skip_rest_of_line(&mut self) {
        while let Some(ch) = self.advance() {
            if ch == '\n' {
                break;
            }
        }
    }

    /// Skip multi-line comment (/* ... */)
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start_loc = self.current_location();
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance();
                self.advance();
                return Ok(());
            }
            self.advance();
        }

        Err(LexError::UnterminatedComment { location: start_loc })
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

impl Iterator for Lexer {
    type Item = Result<Token, LexError>;

    /// Yields tokens up to and including EOF; stops for good after the
    /// first error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let result = self.scan();
        if !matches!(&result, Ok(token) if token.kind != TokenKind::Eof) {
            self.finished = true;
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_simple_tokens() {
        let tokens = kinds("void main() { int x; }");

        assert_eq!(
            tokens,
            vec![
                TokenKind::Void,
                TokenKind::Ident("main".to_string()),
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::Int,
                TokenKind::Ident("x".to_string()),
                TokenKind::Semicolon,
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_operators() {
        let tokens = kinds("== != <= >= < > = && || ! %");

        assert_eq!(
            tokens,
            vec![
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::Le,
                TokenKind::Ge,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::Eq,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::Bang,
                TokenKind::Percent,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        let tokens = kinds("121 3.5 10. 0");

        assert_eq!(tokens[0], TokenKind::IntLiteral(121));
        assert_eq!(tokens[1], TokenKind::FloatLiteral(3.5));
        assert_eq!(tokens[2], TokenKind::FloatLiteral(10.0));
        assert_eq!(tokens[3], TokenKind::IntLiteral(0));
    }

    #[test]
    fn test_malformed_numbers() {
        let err = Lexer::new("x = 1.2.3;").tokenize().unwrap_err();
        assert!(matches!(err, LexError::InvalidNumber { ref text, .. } if text == "1.2.3"));

        let err = Lexer::new("99999999999999999999").tokenize().unwrap_err();
        assert_eq!(err.kind(), "invalid-number");
    }

    #[test]
    fn test_comments() {
        let tokens = kinds("int x; // comment\nint y; /* block\ncomment */ int z;");

        assert_eq!(tokens.len(), 10);
        assert_eq!(tokens[4], TokenKind::Ident("y".to_string()));
        assert_eq!(tokens[7], TokenKind::Ident("z".to_string()));
    }

    #[test]
    fn test_string_literal() {
        let tokens = kinds(r#""hello\n\t\"world\"\\""#);
        assert_eq!(
            tokens[0],
            TokenKind::StringLiteral("hello\n\t\"world\"\\".to_string())
        );
    }

    #[test]
    fn test_lexeme_keeps_source_text() {
        let tokens = Lexer::new(r#"printf("a\n");"#).tokenize().unwrap();
        assert_eq!(tokens[2].lexeme, r#""a\n""#);
        assert_eq!(tokens[2].category(), TokenCategory::StringLit);
        assert_eq!(tokens[0].category(), TokenCategory::Keyword);
    }

    #[test]
    fn test_unterminated_string() {
        let err = Lexer::new("printf(\"abc\n\");").tokenize().unwrap_err();
        assert_eq!(
            err,
            LexError::UnterminatedString {
                location: SourceLocation::new(1, 8)
            }
        );
    }

    #[test]
    fn test_unexpected_character() {
        let err = Lexer::new("#include <stdio.h>").tokenize().unwrap_err();
        assert_eq!(
            err,
            LexError::UnexpectedCharacter {
                ch: '#',
                location: SourceLocation::new(1, 1)
            }
        );

        let err = Lexer::new("a & b").tokenize().unwrap_err();
        assert!(matches!(err, LexError::UnexpectedCharacter { ch: '&', .. }));
    }

    #[test]
    fn test_locations() {
        let tokens = Lexer::new("int x;\n  x = 1;").tokenize().unwrap();
        assert_eq!(tokens[3].location, SourceLocation::new(2, 3));
        assert_eq!(tokens[5].location, SourceLocation::new(2, 7));
    }

    #[test]
    fn test_reserved_words() {
        let tokens = kinds("scanf return for");
        assert_eq!(tokens[0], TokenKind::Reserved("scanf".to_string()));
        assert_eq!(tokens[1], TokenKind::Reserved("return".to_string()));
        assert_eq!(tokens[2], TokenKind::Reserved("for".to_string()));
    }

    #[test]
    fn test_iterator_is_lazy_and_stops_after_error() {
        let mut lexer = Lexer::new("x @ y");
        assert!(matches!(lexer.next(), Some(Ok(_))));
        assert!(matches!(lexer.next(), Some(Err(_))));
        assert!(lexer.next().is_none());
    }

    #[test]
    fn test_recovering_collects_every_line() {
        let (tokens, errors) = Lexer::new("int a; @\nint b; $\nint c;").tokenize_recovering();

        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].location(), SourceLocation::new(1, 8));
        assert_eq!(errors[1].location(), SourceLocation::new(2, 8));
        assert_eq!(tokens.last().map(|t| &t.kind), Some(&TokenKind::Eof));
        assert!(tokens
            .iter()
            .any(|t| t.kind == TokenKind::Ident("c".to_string())));
    }
}
