//! Semantic checker
//!
//! Walks the parsed AST once, in source order, and:
//! - records every declaration in the [`SymbolTable`] (redeclaration and
//!   use of undeclared names are errors)
//! - resolves the static type of every expression into `Expr::ty`
//! - parses each printf format string into `Stmt::Printf::pieces` and
//!   matches its directives against the arguments
//!
//! The result is a [`CheckedProgram`], the only thing the interpreter and
//! the IR lowering accept.

use super::symbols::SymbolTable;
use crate::config::FormatPolicy;
use crate::format::{self, Conversion};
use crate::parser::ast::*;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SemanticError {
    #[error("redeclaration of '{name}' (previously declared at {previous})")]
    Redeclaration {
        name: String,
        location: SourceLocation,
        previous: SourceLocation,
    },

    #[error("use of undeclared variable '{name}'")]
    UndeclaredVariable {
        name: String,
        location: SourceLocation,
    },

    #[error("invalid operand of type '{operand_type}' to '{op}'")]
    InvalidOperandType {
        op: String,
        operand_type: Type,
        location: SourceLocation,
    },

    #[error("printf format mismatch: {detail}")]
    FormatArgMismatch {
        detail: String,
        location: SourceLocation,
    },

    #[error("printf format not supported: {detail}")]
    UnsupportedFormat {
        detail: String,
        location: SourceLocation,
    },
}

impl SemanticError {
    pub fn location(&self) -> SourceLocation {
        match self {
            SemanticError::Redeclaration { location, .. }
            | SemanticError::UndeclaredVariable { location, .. }
            | SemanticError::InvalidOperandType { location, .. }
            | SemanticError::FormatArgMismatch { location, .. }
            | SemanticError::UnsupportedFormat { location, .. } => *location,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SemanticError::Redeclaration { .. } => "redeclaration",
            SemanticError::UndeclaredVariable { .. } => "undeclared-variable",
            SemanticError::InvalidOperandType { .. } => "invalid-operand-type",
            SemanticError::FormatArgMismatch { .. } => "format-arg-mismatch",
            SemanticError::UnsupportedFormat { .. } => "unsupported-format",
        }
    }
}

/// A program that passed semantic checking.
///
/// Every expression carries its resolved type and every printf its parsed
/// format pieces. Only [`Checker`] can build one.
#[derive(Debug, Clone)]
pub struct CheckedProgram {
    program: Program,
    symbols: SymbolTable,
    format_policy: FormatPolicy,
}

impl CheckedProgram {
    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn format_policy(&self) -> FormatPolicy {
        self.format_policy
    }

    pub fn into_program(self) -> Program {
        self.program
    }

    /// Wrap a parsed program without checking it
    #[cfg(test)]
    pub(crate) fn unchecked(program: Program) -> Self {
        CheckedProgram {
            program,
            symbols: SymbolTable::new(),
            format_policy: FormatPolicy::default(),
        }
    }
}

/// Check with the default (strict) format policy.
pub fn check(program: Program) -> Result<CheckedProgram, SemanticError> {
    check_with(program, FormatPolicy::default())
}

pub fn check_with(program: Program, policy: FormatPolicy) -> Result<CheckedProgram, SemanticError> {
    Checker::new(policy).check_program(program)
}

pub struct Checker {
    symbols: SymbolTable,
    policy: FormatPolicy,
}

impl Checker {
    pub fn new(policy: FormatPolicy) -> Self {
        Checker {
            symbols: SymbolTable::new(),
            policy,
        }
    }

    pub fn check_program(mut self, mut program: Program) -> Result<CheckedProgram, SemanticError> {
        self.check_block(&mut program.body)?;

        debug!(symbols = self.symbols.len(), "semantic check passed");
        Ok(CheckedProgram {
            program,
            symbols: self.symbols,
            format_policy: self.policy,
        })
    }

    fn check_block(&mut self, block: &mut Block) -> Result<(), SemanticError> {
        self.symbols.enter_scope();
        let result = block
            .statements
            .iter_mut()
            .try_for_each(|stmt| self.check_statement(stmt));
        self.symbols.exit_scope();
        result
    }

    fn check_statement(&mut self, stmt: &mut Stmt) -> Result<(), SemanticError> {
        match stmt {
            Stmt::VarDecl {
                name,
                var_type,
                init,
                location,
            } => {
                // The initializer is checked before the name comes into scope
                if let Some(init) = init {
                    let init_type = self.check_expr(init)?;
                    warn_if_narrowing(name, *var_type, init_type, init.location);
                }
                if let Err(previous) = self.symbols.declare(name, *var_type, *location) {
                    return Err(SemanticError::Redeclaration {
                        name: name.clone(),
                        location: *location,
                        previous: previous.location,
                    });
                }
                Ok(())
            }

            Stmt::Assignment {
                name,
                value,
                location,
            } => {
                let target_type = self
                    .symbols
                    .lookup(name)
                    .map(|symbol| symbol.ty)
                    .ok_or_else(|| SemanticError::UndeclaredVariable {
                        name: name.clone(),
                        location: *location,
                    })?;
                let value_type = self.check_expr(value)?;
                warn_if_narrowing(name, target_type, value_type, value.location);
                Ok(())
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                self.check_expr(condition)?;
                self.check_block(then_branch)?;
                if let Some(else_branch) = else_branch {
                    self.check_block(else_branch)?;
                }
                Ok(())
            }

            Stmt::While {
                condition, body, ..
            } => {
                self.check_expr(condition)?;
                self.check_block(body)
            }

            Stmt::Printf {
                format: format_string,
                args,
                pieces,
                location,
            } => {
                let parsed = format::parse(format_string).map_err(|e| SemanticError::UnsupportedFormat {
                    detail: e.to_string(),
                    location: *location,
                })?;

                let mut arg_types = Vec::with_capacity(args.len());
                for arg in args.iter_mut() {
                    arg_types.push((self.check_expr(arg)?, arg.location));
                }

                let directives: Vec<_> = format::directives(&parsed).collect();
                if directives.len() != arg_types.len() {
                    return Err(SemanticError::FormatArgMismatch {
                        detail: format!(
                            "format has {} conversion(s) but {} argument(s) were given",
                            directives.len(),
                            arg_types.len()
                        ),
                        location: *location,
                    });
                }

                for (index, (directive, (arg_type, arg_location))) in
                    directives.iter().zip(&arg_types).enumerate()
                {
                    let expected = directive.conversion.expected_type();
                    if expected == *arg_type {
                        continue;
                    }
                    match self.policy {
                        FormatPolicy::Strict => {
                            return Err(SemanticError::FormatArgMismatch {
                                detail: format!(
                                    "'{}' expects {} but argument {} is {}",
                                    directive,
                                    expected,
                                    index + 1,
                                    arg_type
                                ),
                                location: *arg_location,
                            });
                        }
                        FormatPolicy::Convert if directive.conversion == Conversion::Int => {
                            warn!(
                                location = %arg_location,
                                "float argument printed with '{}' is truncated", directive
                            );
                        }
                        FormatPolicy::Convert => {}
                    }
                }

                *pieces = Some(parsed);
                Ok(())
            }

            Stmt::Block(block) => self.check_block(block),
        }
    }

    /// Resolve and record the type of an expression
    fn check_expr(&mut self, expr: &mut Expr) -> Result<Type, SemanticError> {
        let location = expr.location;
        let ty = match &mut expr.kind {
            ExprKind::IntLiteral(_) => Type::Int,
            ExprKind::FloatLiteral(_) => Type::Float,
            ExprKind::Variable(name) => self
                .symbols
                .lookup(name)
                .map(|symbol| symbol.ty)
                .ok_or_else(|| SemanticError::UndeclaredVariable {
                    name: name.clone(),
                    location,
                })?,
            ExprKind::Binary { op, left, right } => {
                let left_type = self.check_expr(left)?;
                let right_type = self.check_expr(right)?;

                if *op == BinOp::Mod {
                    if let Some(bad) = [left_type, right_type]
                        .into_iter()
                        .find(|t| *t == Type::Float)
                    {
                        return Err(SemanticError::InvalidOperandType {
                            op: op.symbol().to_string(),
                            operand_type: bad,
                            location,
                        });
                    }
                }

                if op.is_arithmetic() {
                    left_type.promote(right_type)
                } else {
                    Type::Int
                }
            }
            ExprKind::Unary { op, operand } => {
                let operand_type = self.check_expr(operand)?;
                match op {
                    UnOp::Neg | UnOp::Plus => operand_type,
                    UnOp::Not => Type::Int,
                }
            }
        };

        expr.ty = Some(ty);
        Ok(ty)
    }
}

fn warn_if_narrowing(name: &str, target: Type, value: Type, location: SourceLocation) {
    if target == Type::Int && value == Type::Float {
        warn!(%location, "float value assigned to int '{}' is truncated", name);
    }
}
