//! Mini-C source code front end
//!
//! This module transforms source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: Parser struct, errors and helpers; `statements` and
//!   `expressions` extend it with the grammar rules
//! - [`ast`]: AST node definitions
//!
//! # Supported C Subset
//!
//! - A single `void main()` function
//! - Types: `int`, `float`
//! - Statements: declarations (with optional initializer), assignment,
//!   `if`/`else`, `while`, `printf`, nested blocks
//! - Expressions: arithmetic, comparison, logical `&&`/`||`/`!`, unary minus
//! - No preprocessor, no other functions, no `scanf`
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with precedence climbing for binary operators.
//! No external parser generator dependencies.

pub mod ast;
mod expressions;
pub mod lexer;
pub mod parse;
mod statements;
