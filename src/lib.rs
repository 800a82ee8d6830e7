//! # Introduction
//!
//! minicc compiles and runs a small subset of C: a single `main` function
//! with `int` and `float` variables, arithmetic, comparisons, `if`/`else`,
//! `while` and `printf`. Programs are checked before anything executes, so
//! every type or scope mistake is reported with a line and column.
//!
//! ## Execution pipeline
//!
//! ```text
//! Source → Lexer → Parser → AST → Checker → Interpreter
//!                                        └→ IR lowering → VM
//! ```
//!
//! 1. [`parser`] tokenises the source and builds an AST.
//! 2. [`semantic`] resolves every name, annotates expression types and
//!    validates printf calls, producing a [`semantic::CheckedProgram`].
//! 3. [`interpreter`] walks the checked AST over a [`memory::environment::Environment`],
//!    optionally recording [`snapshot::Snapshot`]s after each step.
//! 4. [`ir`] lowers the same program to a flat stack machine; its VM prints
//!    exactly what the interpreter prints.
//! 5. [`diagnostics`] renders errors from any phase against the source.
//! 6. [`ui`] is a ratatui step-through viewer over recorded snapshots; not
//!    part of the stable library API.
//!
//! [`pipeline`] strings the phases together and is the easiest way in:
//!
//! ```
//! use minicc::config::Config;
//!
//! let source = "void main() { int x = 6; printf(\"%d\\n\", x * 7); }";
//! let lines = minicc::pipeline::run_source(source, &Config::default()).unwrap();
//! assert_eq!(lines, vec!["42"]);
//! ```

pub mod config;
pub mod diagnostics;
pub mod format;
pub mod interpreter;
pub mod ir;
pub mod memory;
pub mod parser;
pub mod pipeline;
pub mod semantic;
pub mod snapshot;
pub mod ui;
