//! Stack-machine intermediate representation
//!
//! The code generation path: [`lower`](lower::lower) turns a checked program
//! into a flat [`Module`], [`pretty`] prints it and [`vm`] executes it.
//! Control flow is explicit (`if`/`while` become jumps, `&&`/`||` become
//! short-circuit jumps) and every int/float conversion is an instruction.
//!
//! Executing a module produces the same output as interpreting the program
//! it was lowered from.

pub mod lower;
pub mod pretty;
pub mod vm;

pub use lower::lower;
pub use vm::Vm;

use crate::format::FormatPiece;
use crate::parser::ast::{BinOp, SourceLocation, Type, UnOp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalId(u32);

impl LocalId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormatId(u32);

impl FormatId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoopId(u32);

impl LoopId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// A variable slot
#[derive(Debug, Clone, PartialEq)]
pub struct Local {
    pub name: String,
    pub ty: Type,
}

/// A printf format string and its parsed pieces
#[derive(Debug, Clone, PartialEq)]
pub struct FormatString {
    pub text: String,
    pub pieces: Vec<FormatPiece>,
}

/// Jump targets are instruction indices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Instr {
    PushInt(i64),
    PushFloat(f64),
    /// Push the value of a local
    Load(LocalId),
    /// Pop into a local (the value already has the local's type)
    Store(LocalId),
    /// Convert the top of the stack
    IntToFloat,
    FloatToInt,
    /// Pop rhs then lhs, push `lhs op rhs` computed in `ty`
    Binary { op: BinOp, ty: Type },
    Unary(UnOp),
    Jump(usize),
    /// Pop; jump if zero
    JumpIfFalse(usize),
    /// Pop; jump if nonzero
    JumpIfTrue(usize),
    /// Reset the iteration counter of a loop
    LoopEnter(LoopId),
    /// Count one iteration, failing past the configured ceiling
    LoopIter(LoopId),
    /// Pop `argc` values (last argument on top) and print them
    Print { format: FormatId, argc: usize },
    Halt,
}

/// A lowered program: `main`'s body as one instruction stream
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub locals: Vec<Local>,
    pub formats: Vec<FormatString>,
    pub loops: usize,
    pub code: Vec<Instr>,
    /// Source location of each instruction, parallel to `code`
    pub locations: Vec<SourceLocation>,
}

impl Module {
    pub fn local(&self, id: LocalId) -> Option<&Local> {
        self.locals.get(id.index())
    }

    pub fn format(&self, id: FormatId) -> Option<&FormatString> {
        self.formats.get(id.index())
    }

    pub fn location(&self, pc: usize) -> SourceLocation {
        self.locations
            .get(pc)
            .copied()
            .unwrap_or(SourceLocation::new(1, 1))
    }
}
