//! Expression evaluation
//!
//! Evaluation reads the environment but never changes it. The operation
//! type of each node was fixed by the checker: arithmetic nodes use their
//! own resolved type, comparisons use the promoted type of their operands.

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::ops;
use crate::memory::value::Value;
use crate::parser::ast::*;

impl Interpreter<'_> {
    pub(crate) fn evaluate_expr(&self, expr: &Expr) -> Result<Value, RuntimeError> {
        match &expr.kind {
            ExprKind::IntLiteral(n) => Ok(Value::Int(*n)),
            ExprKind::FloatLiteral(x) => Ok(Value::Float(*x)),

            ExprKind::Variable(name) => {
                self.environment
                    .get(name)
                    .ok_or_else(|| RuntimeError::UnboundVariable {
                        name: name.clone(),
                        location: expr.location,
                    })
            }

            ExprKind::Binary {
                op: BinOp::And,
                left,
                right,
            } => {
                if !self.evaluate_expr(left)?.is_truthy() {
                    return Ok(Value::Int(0));
                }
                Ok(Value::from_bool(self.evaluate_expr(right)?.is_truthy()))
            }

            ExprKind::Binary {
                op: BinOp::Or,
                left,
                right,
            } => {
                if self.evaluate_expr(left)?.is_truthy() {
                    return Ok(Value::Int(1));
                }
                Ok(Value::from_bool(self.evaluate_expr(right)?.is_truthy()))
            }

            ExprKind::Binary { op, left, right } => {
                let lhs = self.evaluate_expr(left)?;
                let rhs = self.evaluate_expr(right)?;
                ops::binary(*op, operation_type(expr, left, right)?, lhs, rhs, expr.location)
            }

            ExprKind::Unary { op, operand } => {
                let value = self.evaluate_expr(operand)?;
                Ok(ops::unary(*op, value))
            }
        }
    }
}

/// Type the checker gave `expr`
pub(crate) fn type_of(expr: &Expr) -> Result<Type, RuntimeError> {
    expr.ty.ok_or(RuntimeError::Unchecked {
        node: "expression",
        location: expr.location,
    })
}

/// Type a binary operation is carried out in
pub(crate) fn operation_type(expr: &Expr, left: &Expr, right: &Expr) -> Result<Type, RuntimeError> {
    match &expr.kind {
        ExprKind::Binary { op, .. } if op.is_arithmetic() => type_of(expr),
        _ => Ok(type_of(left)?.promote(type_of(right)?)),
    }
}
