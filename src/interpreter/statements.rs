//! Statement execution
//!
//! A snapshot is taken after every leaf statement (declaration, assignment,
//! printf) and at every `if`/`while` condition, so the viewer can show which
//! way control went.

use crate::format::{self, FormatPiece};
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::Value;
use crate::parser::ast::*;
use crate::snapshot::SnapshotEvent;
use tracing::trace;

impl Interpreter<'_> {
    pub(crate) fn execute_block(&mut self, block: &Block) -> Result<(), RuntimeError> {
        block
            .statements
            .iter()
            .try_for_each(|stmt| self.execute_statement(stmt))
    }

    fn execute_statement(&mut self, stmt: &Stmt) -> Result<(), RuntimeError> {
        self.current_location = stmt.location();
        self.statements_executed += 1;
        trace!(location = %self.current_location, "execute statement");

        match stmt {
            Stmt::VarDecl {
                name,
                var_type,
                init,
                location,
            } => self.execute_var_decl(name, *var_type, init.as_ref(), *location),

            Stmt::Assignment {
                name,
                value,
                location,
            } => self.execute_assignment(name, value, *location),

            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => self.execute_if(condition, then_branch, else_branch.as_ref()),

            Stmt::While {
                condition,
                body,
                location,
            } => self.execute_while(condition, body, *location),

            Stmt::Printf {
                args,
                pieces,
                location,
                ..
            } => self.execute_printf(pieces.as_deref(), args, *location),

            Stmt::Block(block) => self.execute_block(block),
        }
    }

    /// Declaring again (on a later loop iteration) resets the variable.
    fn execute_var_decl(
        &mut self,
        name: &str,
        var_type: Type,
        init: Option<&Expr>,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        let value = match init {
            Some(expr) => self.evaluate_expr(expr)?,
            None => Value::default_for(var_type),
        };
        self.environment.declare(name, var_type, value, location);
        self.take_snapshot(SnapshotEvent::Declare)
    }

    fn execute_assignment(
        &mut self,
        name: &str,
        value: &Expr,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        let value = self.evaluate_expr(value)?;
        self.environment
            .assign(name, value)
            .ok_or_else(|| RuntimeError::UnboundVariable {
                name: name.to_string(),
                location,
            })?;
        self.take_snapshot(SnapshotEvent::Assign)
    }

    fn execute_if(
        &mut self,
        condition: &Expr,
        then_branch: &Block,
        else_branch: Option<&Block>,
    ) -> Result<(), RuntimeError> {
        let taken = self.evaluate_expr(condition)?.is_truthy();
        self.take_snapshot(SnapshotEvent::Branch { taken })?;

        if taken {
            self.execute_block(then_branch)
        } else if let Some(else_branch) = else_branch {
            self.execute_block(else_branch)
        } else {
            Ok(())
        }
    }

    fn execute_while(
        &mut self,
        condition: &Expr,
        body: &Block,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        let mut iterations: u64 = 0;

        loop {
            // The condition is re-evaluated at the loop head every time
            self.current_location = location;
            let entering = self.evaluate_expr(condition)?.is_truthy();

            if entering {
                if let Some(limit) = self.config.max_loop_iterations {
                    if iterations >= limit {
                        return Err(RuntimeError::IterationLimitExceeded { limit, location });
                    }
                }
            }

            self.take_snapshot(SnapshotEvent::LoopCheck { entering })?;
            if !entering {
                break;
            }

            iterations += 1;
            self.execute_block(body)?;
        }

        trace!(%location, iterations, "loop finished");
        Ok(())
    }

    fn execute_printf(
        &mut self,
        pieces: Option<&[FormatPiece]>,
        args: &[Expr],
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        let pieces = pieces.ok_or(RuntimeError::Unchecked {
            node: "printf",
            location,
        })?;
        let values = args
            .iter()
            .map(|arg| self.evaluate_expr(arg))
            .collect::<Result<Vec<_>, _>>()?;

        self.emit(&format::render(pieces, &values))?;
        self.take_snapshot(SnapshotEvent::Print)
    }
}
