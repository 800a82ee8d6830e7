//! Operator semantics shared by the tree walker and the IR VM
//!
//! Operands arrive already converted to the operation type chosen by the
//! checker. Integer arithmetic wraps; `/` truncates toward zero and `%`
//! takes the sign of the dividend, as in C.

use crate::interpreter::errors::RuntimeError;
use crate::memory::value::Value;
use crate::parser::ast::{BinOp, SourceLocation, Type, UnOp};

/// Apply a non-short-circuit binary operator.
///
/// `operand_type` is the promoted type of both operands. Arithmetic yields
/// that type; comparisons yield `Int` 0 or 1.
pub fn binary(
    op: BinOp,
    operand_type: Type,
    left: Value,
    right: Value,
    location: SourceLocation,
) -> Result<Value, RuntimeError> {
    match operand_type {
        Type::Int => int_binary(op, left.as_int(), right.as_int(), location),
        Type::Float => float_binary(op, left.as_float(), right.as_float(), location),
    }
}

fn int_binary(op: BinOp, a: i64, b: i64, location: SourceLocation) -> Result<Value, RuntimeError> {
    let value = match op {
        BinOp::Add => Value::Int(a.wrapping_add(b)),
        BinOp::Sub => Value::Int(a.wrapping_sub(b)),
        BinOp::Mul => Value::Int(a.wrapping_mul(b)),
        BinOp::Div | BinOp::Mod if b == 0 => {
            return Err(RuntimeError::DivisionByZero {
                op: op.symbol(),
                location,
            })
        }
        BinOp::Div => Value::Int(a.wrapping_div(b)),
        BinOp::Mod => Value::Int(a.wrapping_rem(b)),
        BinOp::Eq => Value::from_bool(a == b),
        BinOp::Ne => Value::from_bool(a != b),
        BinOp::Lt => Value::from_bool(a < b),
        BinOp::Le => Value::from_bool(a <= b),
        BinOp::Gt => Value::from_bool(a > b),
        BinOp::Ge => Value::from_bool(a >= b),
        BinOp::And => Value::from_bool(a != 0 && b != 0),
        BinOp::Or => Value::from_bool(a != 0 || b != 0),
    };
    Ok(value)
}

fn float_binary(op: BinOp, a: f64, b: f64, location: SourceLocation) -> Result<Value, RuntimeError> {
    let value = match op {
        BinOp::Add => Value::Float(a + b),
        BinOp::Sub => Value::Float(a - b),
        BinOp::Mul => Value::Float(a * b),
        BinOp::Div | BinOp::Mod if b == 0.0 => {
            return Err(RuntimeError::DivisionByZero {
                op: op.symbol(),
                location,
            })
        }
        BinOp::Div => Value::Float(a / b),
        // Rejected by the checker; fmod if it ever gets here
        BinOp::Mod => Value::Float(a % b),
        BinOp::Eq => Value::from_bool(a == b),
        BinOp::Ne => Value::from_bool(a != b),
        BinOp::Lt => Value::from_bool(a < b),
        BinOp::Le => Value::from_bool(a <= b),
        BinOp::Gt => Value::from_bool(a > b),
        BinOp::Ge => Value::from_bool(a >= b),
        BinOp::And => Value::from_bool(a != 0.0 && b != 0.0),
        BinOp::Or => Value::from_bool(a != 0.0 || b != 0.0),
    };
    Ok(value)
}

pub fn unary(op: UnOp, operand: Value) -> Value {
    match (op, operand) {
        (UnOp::Neg, Value::Int(n)) => Value::Int(n.wrapping_neg()),
        (UnOp::Neg, Value::Float(x)) => Value::Float(-x),
        (UnOp::Plus, v) => v,
        (UnOp::Not, v) => Value::from_bool(!v.is_truthy()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> SourceLocation {
        SourceLocation::new(1, 1)
    }

    fn int(op: BinOp, a: i64, b: i64) -> Value {
        binary(op, Type::Int, Value::Int(a), Value::Int(b), loc()).unwrap()
    }

    #[test]
    fn test_division_truncates_toward_zero() {
        assert_eq!(int(BinOp::Div, -7, 2), Value::Int(-3));
        assert_eq!(int(BinOp::Div, 7, -2), Value::Int(-3));
        assert_eq!(int(BinOp::Div, 121, 10), Value::Int(12));
    }

    #[test]
    fn test_modulo_follows_dividend() {
        assert_eq!(int(BinOp::Mod, 7, -2), Value::Int(1));
        assert_eq!(int(BinOp::Mod, -7, 2), Value::Int(-1));
        assert_eq!(int(BinOp::Mod, 121, 10), Value::Int(1));
    }

    #[test]
    fn test_wrapping() {
        assert_eq!(int(BinOp::Add, i64::MAX, 1), Value::Int(i64::MIN));
        assert_eq!(int(BinOp::Div, i64::MIN, -1), Value::Int(i64::MIN));
        assert_eq!(int(BinOp::Mod, i64::MIN, -1), Value::Int(0));
        assert_eq!(unary(UnOp::Neg, Value::Int(i64::MIN)), Value::Int(i64::MIN));
    }

    #[test]
    fn test_division_by_zero() {
        let err = binary(BinOp::Div, Type::Int, Value::Int(1), Value::Int(0), loc()).unwrap_err();
        assert!(matches!(err, RuntimeError::DivisionByZero { op: "/", .. }));

        let err = binary(BinOp::Mod, Type::Int, Value::Int(1), Value::Int(0), loc()).unwrap_err();
        assert!(matches!(err, RuntimeError::DivisionByZero { op: "%", .. }));

        let err = binary(BinOp::Div, Type::Float, Value::Float(1.0), Value::Int(0), loc()).unwrap_err();
        assert_eq!(err.kind(), "division-by-zero");
    }

    #[test]
    fn test_promoted_arithmetic() {
        let v = binary(BinOp::Add, Type::Float, Value::Int(10), Value::Float(0.5), loc()).unwrap();
        assert_eq!(v, Value::Float(10.5));

        let v = binary(BinOp::Div, Type::Float, Value::Int(7), Value::Int(2), loc()).unwrap();
        assert_eq!(v, Value::Float(3.5));
    }

    #[test]
    fn test_comparisons_yield_int() {
        assert_eq!(int(BinOp::Lt, 1, 2), Value::Int(1));
        assert_eq!(int(BinOp::Ge, 1, 2), Value::Int(0));
        let v = binary(BinOp::Eq, Type::Float, Value::Float(f64::NAN), Value::Float(f64::NAN), loc()).unwrap();
        assert_eq!(v, Value::Int(0));
    }

    #[test]
    fn test_unary() {
        assert_eq!(unary(UnOp::Neg, Value::Float(2.5)), Value::Float(-2.5));
        assert_eq!(unary(UnOp::Not, Value::Float(0.0)), Value::Int(1));
        assert_eq!(unary(UnOp::Not, Value::Int(5)), Value::Int(0));
        assert_eq!(unary(UnOp::Plus, Value::Int(5)), Value::Int(5));
    }
}
