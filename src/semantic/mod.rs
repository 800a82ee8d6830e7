//! Semantic analysis: name resolution, type resolution and printf checking

pub mod checker;
pub mod symbols;

pub use checker::{check, check_with, CheckedProgram, Checker, SemanticError};
pub use symbols::{Symbol, SymbolTable};
