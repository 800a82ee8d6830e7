//! Phase-by-phase entry points
//!
//! Each phase runs only if the previous one succeeded; nothing is shared
//! between calls, so independent sources can be compiled side by side.

use crate::config::Config;
use crate::diagnostics::CompileError;
use crate::interpreter::{Interpreter, RuntimeError};
use crate::ir::{self, Module, Vm};
use crate::parser::ast::Program;
use crate::parser::lexer::{LexError, Lexer, Token};
use crate::parser::parse::Parser;
use crate::semantic::{self, CheckedProgram, SemanticError};

pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).tokenize()
}

pub fn parse(source: &str) -> Result<Program, CompileError> {
    let tokens = tokenize(source)?;
    Ok(Parser::new(tokens).parse_program()?)
}

pub fn check(program: Program, config: &Config) -> Result<CheckedProgram, SemanticError> {
    semantic::check_with(program, config.format_policy)
}

/// Lex, parse and check with the default configuration
pub fn compile(source: &str) -> Result<CheckedProgram, CompileError> {
    compile_with(source, &Config::default())
}

pub fn compile_with(source: &str, config: &Config) -> Result<CheckedProgram, CompileError> {
    let program = parse(source)?;
    Ok(check(program, config)?)
}

/// Interpret a checked program; returns its output lines.
pub fn execute(program: &CheckedProgram, config: &Config) -> Result<Vec<String>, RuntimeError> {
    let mut interpreter = Interpreter::new(program, config.clone());
    interpreter.run()?;
    Ok(interpreter.lines())
}

pub fn lower(program: &CheckedProgram) -> Result<Module, RuntimeError> {
    ir::lower(program)
}

/// Lower and run on the IR VM; returns its output lines.
pub fn execute_ir(program: &CheckedProgram, config: &Config) -> Result<Vec<String>, RuntimeError> {
    let module = lower(program)?;
    let mut vm = Vm::new(&module, config.clone());
    vm.run()?;
    Ok(vm.lines())
}

/// All phases, interpreting the result
pub fn run_source(source: &str, config: &Config) -> Result<Vec<String>, CompileError> {
    let program = compile_with(source, config)?;
    Ok(execute(&program, config)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phases_fail_fast() {
        assert!(matches!(
            compile("void main() { int x = 1 }"),
            Err(CompileError::Parse(_))
        ));
        assert!(matches!(
            compile("void main() { \"open }"),
            Err(CompileError::Lex(_))
        ));
    }

    #[test]
    fn test_run_source() {
        let lines = run_source(
            "void main() { int n; n = 123; printf(\"%d is odd: %d\\n\", n, n % 2); }",
            &Config::default(),
        )
        .unwrap();
        assert_eq!(lines, vec!["123 is odd: 1"]);
    }

    #[test]
    fn test_runtime_errors_are_wrapped() {
        let err = run_source("void main() { int z; z = 3 / z; }", &Config::default()).unwrap_err();
        assert!(matches!(
            err,
            CompileError::Runtime(RuntimeError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_both_backends_agree() {
        let source = "void main() { float f; int i; f = 7 / 2; i = 7.9; printf(\"%f %d\\n\", f / 4, -i % 3); }";
        let program = compile(source).unwrap();
        let config = Config::default();
        assert_eq!(
            execute(&program, &config).unwrap(),
            execute_ir(&program, &config).unwrap()
        );
        assert_eq!(execute(&program, &config).unwrap(), vec!["0.750000 -1"]);
    }
}
