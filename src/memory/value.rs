//! Runtime value representation
//!
//! This module defines the [`Value`] enum, the tagged union stored in the
//! [`Environment`](super::environment::Environment) and on the IR VM stack.
//!
//! # Value Types
//!
//! - [`Value::Int`]: 64-bit signed integer, arithmetic wraps on overflow
//! - [`Value::Float`]: IEEE-754 double
//!
//! Types are resolved statically by the checker, so evaluation never has to
//! dispatch on a tag it did not expect; the conversions here implement C's
//! implicit `int` <-> `float` rules (widening, and truncation toward zero).

use crate::parser::ast::Type;
use std::fmt;

/// Runtime values in the interpreter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
}

impl Value {
    /// Zero value for a declaration without initializer
    pub fn default_for(ty: Type) -> Self {
        match ty {
            Type::Int => Value::Int(0),
            Type::Float => Value::Float(0.0),
        }
    }

    pub fn ty(&self) -> Type {
        match self {
            Value::Int(_) => Type::Int,
            Value::Float(_) => Type::Float,
        }
    }

    /// Integer view; floats truncate toward zero (saturating at the i64 range)
    pub fn as_int(&self) -> i64 {
        match self {
            Value::Int(n) => *n,
            Value::Float(x) => *x as i64,
        }
    }

    /// Float view; ints widen
    pub fn as_float(&self) -> f64 {
        match self {
            Value::Int(n) => *n as f64,
            Value::Float(x) => *x,
        }
    }

    /// Convert to the given static type, as C does on assignment
    pub fn convert_to(self, ty: Type) -> Self {
        match ty {
            Type::Int => Value::Int(self.as_int()),
            Type::Float => Value::Float(self.as_float()),
        }
    }

    /// C truthiness: nonzero is true. NaN compares unequal to 0.0, so it is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(n) => *n != 0,
            Value::Float(x) => *x != 0.0,
        }
    }

    /// Result of a comparison or logical operator
    pub fn from_bool(b: bool) -> Self {
        Value::Int(b as i64)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{:.6}", x),
        }
    }
}
