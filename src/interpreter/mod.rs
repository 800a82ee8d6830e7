//! Mini-C interpreter execution engine
//!
//! This module provides the tree-walking executor:
//! - [`engine`]: [`Interpreter`] state, output capture and snapshots
//! - `statements`, `expressions`: statement execution and expression evaluation
//! - [`ops`]: operator semantics, shared with the IR VM
//! - [`errors`]: runtime error types
//!
//! # Execution Model
//!
//! The interpreter walks a [`CheckedProgram`](crate::semantic::CheckedProgram)
//! and executes statements one at a time against its own
//! [`Environment`](crate::memory::environment::Environment). When snapshots
//! are enabled, one is taken after each leaf statement and at each branch
//! or loop condition for the step-through viewer.

pub mod engine;
pub mod errors;
pub(crate) mod expressions;
pub mod ops;
mod statements;

pub use engine::Interpreter;
pub use errors::RuntimeError;
