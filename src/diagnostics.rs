//! Compile and run errors, with source-annotated rendering
//!
//! ```text
//! error[semantic/undeclared-variable]: use of undeclared variable 'y'
//!  --> demos/bad.c:4:9
//!   |
//! 4 |     x = y + 1;
//!   |         ^
//! ```

use crate::interpreter::errors::RuntimeError;
use crate::parser::ast::SourceLocation;
use crate::parser::lexer::LexError;
use crate::parser::parse::ParseError;
use crate::semantic::SemanticError;
use std::fmt::Write;
use thiserror::Error;

/// The pipeline phase an error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Lex,
    Parse,
    Semantic,
    Runtime,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Lex => "lex",
            Phase::Parse => "parse",
            Phase::Semantic => "semantic",
            Phase::Runtime => "runtime",
        }
    }
}

/// Any error from lexing through execution
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Semantic(#[from] SemanticError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl CompileError {
    pub fn phase(&self) -> Phase {
        match self {
            CompileError::Lex(_) => Phase::Lex,
            CompileError::Parse(_) => Phase::Parse,
            CompileError::Semantic(_) => Phase::Semantic,
            CompileError::Runtime(_) => Phase::Runtime,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CompileError::Lex(e) => e.kind(),
            CompileError::Parse(e) => e.kind(),
            CompileError::Semantic(e) => e.kind(),
            CompileError::Runtime(e) => e.kind(),
        }
    }

    pub fn location(&self) -> Option<SourceLocation> {
        match self {
            CompileError::Lex(e) => Some(e.location()),
            CompileError::Parse(e) => Some(e.location()),
            CompileError::Semantic(e) => Some(e.location()),
            CompileError::Runtime(e) => e.location(),
        }
    }

    /// Render for a terminal: header, location pointer, source line and caret.
    pub fn render(&self, source: &str, path: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "error[{}/{}]: {}", self.phase().as_str(), self.kind(), self);

        let Some(location) = self.location() else {
            let _ = writeln!(out, " --> {}", path);
            return out;
        };

        let gutter = location.line.to_string().len();
        let pad = " ".repeat(gutter);
        let _ = writeln!(out, "{} --> {}:{}", pad, path, location);

        if let Some(line) = source.lines().nth(location.line.saturating_sub(1)) {
            // Columns count characters; tabs are kept so the caret lines up
            let marker: String = line
                .chars()
                .take(location.column.saturating_sub(1))
                .map(|c| if c == '\t' { '\t' } else { ' ' })
                .collect();
            let _ = writeln!(out, "{} |", pad);
            let _ = writeln!(out, "{} | {}", location.line, line);
            let _ = writeln!(out, "{} | {}^", pad, marker);
        }

        out
    }
}
