//! AST to IR lowering
//!
//! ```text
//! if (c) T else E      while (c) B            a && b
//!   <c>                  loop.enter k           <a>
//!   jz  Lelse          Lhead:                   jz  Lfalse
//!   <T>                  <c>                    <b>
//!   jmp Lend             jz  Lend               jz  Lfalse
//! Lelse:                 loop.iter k            push.i 1
//!   <E>                  <B>                    jmp Lend
//! Lend:                  jmp Lhead            Lfalse:
//!                      Lend:                    push.i 0
//!                                             Lend:
//! ```

use super::{FormatId, FormatString, Instr, Local, LocalId, LoopId, Module};
use crate::config::FormatPolicy;
use crate::format::{self, Conversion};
use crate::interpreter::expressions::{operation_type, type_of};
use crate::interpreter::RuntimeError;
use crate::parser::ast::*;
use crate::semantic::CheckedProgram;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

/// Lower a checked program. Fails only on a node without a type.
pub fn lower(program: &CheckedProgram) -> Result<Module, RuntimeError> {
    let mut builder = ModuleBuilder::new(program.format_policy());
    builder.lower_block(&program.program().body)?;
    let module = builder.finish(program.program().location);

    debug!(
        instructions = module.code.len(),
        locals = module.locals.len(),
        "lowered program"
    );
    Ok(module)
}

struct ModuleBuilder {
    locals: Vec<Local>,
    formats: Vec<FormatString>,
    loops: u32,
    code: Vec<Instr>,
    locations: Vec<SourceLocation>,

    policy: FormatPolicy,
    env: FxHashMap<String, LocalId>,
    location: SourceLocation,
}

impl ModuleBuilder {
    fn new(policy: FormatPolicy) -> Self {
        ModuleBuilder {
            locals: Vec::new(),
            formats: Vec::new(),
            loops: 0,
            code: Vec::new(),
            locations: Vec::new(),
            policy,
            env: FxHashMap::default(),
            location: SourceLocation::new(1, 1),
        }
    }

    fn finish(mut self, location: SourceLocation) -> Module {
        self.location = location;
        self.emit(Instr::Halt);
        Module {
            locals: self.locals,
            formats: self.formats,
            loops: self.loops as usize,
            code: self.code,
            locations: self.locations,
        }
    }
}

impl ModuleBuilder {
    fn lower_block(&mut self, block: &Block) -> Result<(), RuntimeError> {
        block
            .statements
            .iter()
            .try_for_each(|stmt| self.lower_stmt(stmt))
    }

    fn lower_stmt(&mut self, stmt: &Stmt) -> Result<(), RuntimeError> {
        self.location = stmt.location();

        match stmt {
            Stmt::VarDecl {
                name,
                var_type,
                init,
                ..
            } => {
                match init {
                    Some(expr) => self.lower_converted(expr, *var_type)?,
                    None => self.emit(match var_type {
                        Type::Int => Instr::PushInt(0),
                        Type::Float => Instr::PushFloat(0.0),
                    }),
                }
                let local = self.local_for(name, *var_type);
                self.emit(Instr::Store(local));
            }

            Stmt::Assignment { name, value, .. } => {
                let target_type = match self.local_type(name) {
                    Some(ty) => ty,
                    None => type_of(value)?,
                };
                self.lower_converted(value, target_type)?;
                let local = self.local_for(name, target_type);
                self.emit(Instr::Store(local));
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
                location,
            } => {
                self.lower_expr(condition)?;
                self.location = *location;
                let jump_to_else = self.emit_placeholder();
                self.lower_block(then_branch)?;

                match else_branch {
                    Some(else_branch) => {
                        self.location = *location;
                        let jump_to_end = self.emit_placeholder();
                        let else_start = self.code.len();
                        self.patch(jump_to_else, Instr::JumpIfFalse(else_start));
                        self.lower_block(else_branch)?;
                        let end = self.code.len();
                        self.patch(jump_to_end, Instr::Jump(end));
                    }
                    None => {
                        let end = self.code.len();
                        self.patch(jump_to_else, Instr::JumpIfFalse(end));
                    }
                }
            }

            Stmt::While {
                condition,
                body,
                location,
            } => {
                let id = LoopId(self.loops);
                self.loops += 1;

                self.emit(Instr::LoopEnter(id));
                let head = self.code.len();
                self.lower_expr(condition)?;
                self.location = *location;
                let exit = self.emit_placeholder();
                self.emit(Instr::LoopIter(id));
                self.lower_block(body)?;
                self.location = *location;
                self.emit(Instr::Jump(head));
                let end = self.code.len();
                self.patch(exit, Instr::JumpIfFalse(end));
            }

            Stmt::Printf {
                format: text,
                args,
                pieces,
                location,
            } => {
                let pieces = pieces.clone().ok_or(RuntimeError::Unchecked {
                    node: "printf",
                    location: *location,
                })?;
                let conversions: Vec<Conversion> =
                    format::directives(&pieces).map(|d| d.conversion).collect();

                for (index, arg) in args.iter().enumerate() {
                    match (self.policy, conversions.get(index)) {
                        (FormatPolicy::Convert, Some(conversion)) => {
                            self.lower_converted(arg, conversion.expected_type())?
                        }
                        _ => self.lower_expr(arg)?,
                    }
                }

                let format = FormatId(self.formats.len() as u32);
                self.formats.push(FormatString {
                    text: text.clone(),
                    pieces,
                });
                self.location = *location;
                self.emit(Instr::Print {
                    format,
                    argc: args.len(),
                });
            }

            Stmt::Block(block) => self.lower_block(block)?,
        }
        Ok(())
    }

    /// Lower `expr` and convert the result to `target`
    fn lower_converted(&mut self, expr: &Expr, target: Type) -> Result<(), RuntimeError> {
        self.lower_expr(expr)?;
        self.location = expr.location;
        self.emit_conversion(type_of(expr)?, target);
        Ok(())
    }

    fn lower_expr(&mut self, expr: &Expr) -> Result<(), RuntimeError> {
        match &expr.kind {
            ExprKind::IntLiteral(n) => {
                self.location = expr.location;
                self.emit(Instr::PushInt(*n));
            }
            ExprKind::FloatLiteral(x) => {
                self.location = expr.location;
                self.emit(Instr::PushFloat(*x));
            }
            ExprKind::Variable(name) => {
                let local = self.local_for(name, type_of(expr)?);
                self.location = expr.location;
                self.emit(Instr::Load(local));
            }
            ExprKind::Binary {
                op: op @ (BinOp::And | BinOp::Or),
                left,
                right,
            } => self.lower_logical(*op, left, right, expr.location)?,
            ExprKind::Binary { op, left, right } => {
                let ty = operation_type(expr, left, right)?;
                self.lower_converted(left, ty)?;
                self.lower_converted(right, ty)?;
                self.location = expr.location;
                self.emit(Instr::Binary { op: *op, ty });
            }
            ExprKind::Unary { op, operand } => {
                self.lower_expr(operand)?;
                self.location = expr.location;
                self.emit(Instr::Unary(*op));
            }
        }
        Ok(())
    }

    fn lower_logical(
        &mut self,
        op: BinOp,
        left: &Expr,
        right: &Expr,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        // && jumps out on the first false operand, || on the first true one
        let short_circuit = |target| match op {
            BinOp::Or => Instr::JumpIfTrue(target),
            _ => Instr::JumpIfFalse(target),
        };
        let (fallthrough, shorted) = match op {
            BinOp::Or => (0, 1),
            _ => (1, 0),
        };

        self.lower_expr(left)?;
        self.location = location;
        let first = self.emit_placeholder();
        self.lower_expr(right)?;
        self.location = location;
        let second = self.emit_placeholder();
        self.emit(Instr::PushInt(fallthrough));
        let to_end = self.emit_placeholder();

        let short = self.code.len();
        self.emit(Instr::PushInt(shorted));
        let end = self.code.len();

        self.patch(first, short_circuit(short));
        self.patch(second, short_circuit(short));
        self.patch(to_end, Instr::Jump(end));
        Ok(())
    }

    fn emit_conversion(&mut self, from: Type, to: Type) {
        match (from, to) {
            (Type::Int, Type::Float) => self.emit(Instr::IntToFloat),
            (Type::Float, Type::Int) => self.emit(Instr::FloatToInt),
            _ => {}
        }
    }

    fn emit(&mut self, instr: Instr) {
        trace!(pc = self.code.len(), ?instr, "emit");
        self.code.push(instr);
        self.locations.push(self.location);
    }

    /// Emit a jump to be patched once its target is known
    fn emit_placeholder(&mut self) -> usize {
        let index = self.code.len();
        self.emit(Instr::Halt);
        index
    }

    fn patch(&mut self, index: usize, instr: Instr) {
        if let Some(slot) = self.code.get_mut(index) {
            *slot = instr;
        }
    }

    fn local_type(&self, name: &str) -> Option<Type> {
        self.env
            .get(name)
            .and_then(|id| self.locals.get(id.index()))
            .map(|local| local.ty)
    }

    /// Slot for a name, created on first use
    fn local_for(&mut self, name: &str, ty: Type) -> LocalId {
        if let Some(id) = self.env.get(name) {
            return *id;
        }
        let id = LocalId(self.locals.len() as u32);
        self.locals.push(Local {
            name: name.to_string(),
            ty,
        });
        self.env.insert(name.to_string(), id);
        id
    }
}
