//! Textual listing of a lowered module

use super::{Instr, Module};
use crate::parser::ast::{BinOp, Type, UnOp};
use rustc_hash::FxHashSet;
use std::fmt::Write;

fn type_suffix(ty: Type) -> &'static str {
    match ty {
        Type::Int => "i",
        Type::Float => "f",
    }
}

pub fn format_binop(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "add",
        BinOp::Sub => "sub",
        BinOp::Mul => "mul",
        BinOp::Div => "div",
        BinOp::Mod => "rem",
        BinOp::Eq => "eq",
        BinOp::Ne => "ne",
        BinOp::Lt => "lt",
        BinOp::Le => "le",
        BinOp::Gt => "gt",
        BinOp::Ge => "ge",
        BinOp::And => "and",
        BinOp::Or => "or",
    }
}

pub fn format_instr(instr: &Instr, module: &Module) -> String {
    match instr {
        Instr::PushInt(n) => format!("push.i {}", n),
        Instr::PushFloat(x) => format!("push.f {:?}", x),
        Instr::Load(local) => match module.local(*local) {
            Some(l) => format!("load l{} ({})", local.index(), l.name),
            None => format!("load l{}", local.index()),
        },
        Instr::Store(local) => match module.local(*local) {
            Some(l) => format!("store l{} ({})", local.index(), l.name),
            None => format!("store l{}", local.index()),
        },
        Instr::IntToFloat => "i2f".to_string(),
        Instr::FloatToInt => "f2i".to_string(),
        Instr::Binary { op, ty } => format!("{}.{}", format_binop(*op), type_suffix(*ty)),
        Instr::Unary(op) => match op {
            UnOp::Neg => "neg".to_string(),
            UnOp::Plus => "nop".to_string(),
            UnOp::Not => "not".to_string(),
        },
        Instr::Jump(target) => format!("jmp L{}", target),
        Instr::JumpIfFalse(target) => format!("jz L{}", target),
        Instr::JumpIfTrue(target) => format!("jnz L{}", target),
        Instr::LoopEnter(id) => format!("loop.enter k{}", id.index()),
        Instr::LoopIter(id) => format!("loop.iter k{}", id.index()),
        Instr::Print { format, argc } => format!("print f{}, {}", format.index(), argc),
        Instr::Halt => "halt".to_string(),
    }
}

/// Full listing: locals, format strings, then code with jump labels
pub fn format_module(module: &Module) -> String {
    let mut s = String::new();

    let targets: FxHashSet<usize> = module
        .code
        .iter()
        .filter_map(|instr| match instr {
            Instr::Jump(t) | Instr::JumpIfFalse(t) | Instr::JumpIfTrue(t) => Some(*t),
            _ => None,
        })
        .collect();

    let _ = writeln!(s, "locals:");
    for (i, local) in module.locals.iter().enumerate() {
        let _ = writeln!(s, "  l{}: {} {}", i, local.ty, local.name);
    }

    let _ = writeln!(s, "formats:");
    for (i, format) in module.formats.iter().enumerate() {
        let _ = writeln!(s, "  f{}: {:?}", i, format.text);
    }

    let _ = writeln!(s, "code:");
    for (pc, instr) in module.code.iter().enumerate() {
        if targets.contains(&pc) {
            let _ = writeln!(s, "L{}:", pc);
        }
        let text = format_instr(instr, module);
        let _ = writeln!(s, "  {:4}  {:<28} ; {}", pc, text, module.location(pc));
    }

    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::lower;
    use crate::parser::lexer::Lexer;
    use crate::parser::parse::Parser;
    use crate::semantic::check;

    fn listing(source: &str) -> String {
        let tokens = Lexer::new(source).tokenize().unwrap();
        let program = check(Parser::new(tokens).parse_program().unwrap()).unwrap();
        format_module(&lower(&program).unwrap())
    }

    #[test]
    fn test_listing_sections() {
        let text = listing("void main() {\n  float r;\n  r = 2 * 1.5;\n  printf(\"%f\\n\", r);\n}");

        assert!(text.starts_with("locals:\n  l0: float r\n"));
        assert!(text.contains("formats:\n  f0: \"%f\\n\"\n"));
        assert!(text.contains("mul.f"));
        assert!(text.contains("print f0, 1"));
        assert!(text.trim_end().lines().last().unwrap().contains("halt"));
    }

    #[test]
    fn test_jump_labels() {
        let text = listing("void main() { int x; while (x < 2) { x = x + 1; } }");

        assert!(text.contains("jz L"));
        assert!(text.contains("jmp L3"));
        assert!(text.contains("\nL3:\n"));
        assert!(text.contains("lt.i"));
    }

    #[test]
    fn test_instruction_locations() {
        let text = listing("void main() {\n  int x;\n  x = 7;\n}");
        let store = text.lines().find(|l| l.contains("push.i 7")).unwrap();
        assert!(store.ends_with("; 3:7"));
    }
}
