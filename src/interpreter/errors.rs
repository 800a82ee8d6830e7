//! Runtime error types
//!
//! This module defines [`RuntimeError`], the errors that can occur while a
//! checked program executes (as opposed to lex, parse or semantic errors).
//!
//! All runtime errors are fatal: they halt execution. Output printed before
//! the failure is kept.

use crate::parser::ast::SourceLocation;
use thiserror::Error;

/// Runtime errors that can occur during execution
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// Division or modulo by zero (int or float operands)
    #[error("division by zero in '{op}'")]
    DivisionByZero {
        op: &'static str,
        location: SourceLocation,
    },

    /// A loop ran past the configured iteration ceiling
    #[error("loop exceeded the iteration limit of {limit}")]
    IterationLimitExceeded {
        limit: u64,
        location: SourceLocation,
    },

    /// Snapshot history limit exceeded
    #[error("snapshot memory limit exceeded: {current} bytes used, limit is {limit}")]
    SnapshotLimitExceeded { current: usize, limit: usize },

    /// A variable without storage; only reachable by executing an AST the
    /// checker did not annotate
    #[error("variable '{name}' has no storage")]
    UnboundVariable {
        name: String,
        location: SourceLocation,
    },

    /// The IR VM hit an instruction stream `lower` would never produce
    #[error("malformed IR module at instruction {pc}: {message}")]
    MalformedModule {
        message: String,
        pc: usize,
        location: SourceLocation,
    },

    /// A node the checker never annotated; a `CheckedProgram` rules this out
    #[error("internal error: {node} at {location} was not type-checked")]
    Unchecked {
        node: &'static str,
        location: SourceLocation,
    },

    /// Writing program output failed
    #[error("failed to write program output: {message}")]
    Output {
        message: String,
        location: SourceLocation,
    },
}

impl RuntimeError {
    pub fn location(&self) -> Option<SourceLocation> {
        match self {
            RuntimeError::DivisionByZero { location, .. }
            | RuntimeError::IterationLimitExceeded { location, .. }
            | RuntimeError::UnboundVariable { location, .. }
            | RuntimeError::MalformedModule { location, .. }
            | RuntimeError::Unchecked { location, .. }
            | RuntimeError::Output { location, .. } => Some(*location),
            RuntimeError::SnapshotLimitExceeded { .. } => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RuntimeError::DivisionByZero { .. } => "division-by-zero",
            RuntimeError::IterationLimitExceeded { .. } => "iteration-limit-exceeded",
            RuntimeError::SnapshotLimitExceeded { .. } => "snapshot-limit-exceeded",
            RuntimeError::UnboundVariable { .. } => "unbound-variable",
            RuntimeError::MalformedModule { .. } => "malformed-module",
            RuntimeError::Unchecked { .. } => "unchecked-node",
            RuntimeError::Output { .. } => "output",
        }
    }
}
