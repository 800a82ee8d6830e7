//! Reference executor for lowered modules

use super::{Instr, Module};
use crate::config::Config;
use crate::format;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::ops;
use crate::memory::value::Value;
use crate::parser::ast::Type;
use crate::snapshot::Terminal;
use std::io::Write;
use tracing::{debug, trace};

pub struct Vm<'a> {
    module: &'a Module,
    config: Config,
    locals: Vec<Value>,
    stack: Vec<Value>,
    loop_counters: Vec<u64>,
    pc: usize,
    terminal: Terminal,
    echo: Option<Box<dyn Write + 'a>>,
    executed: u64,
}

impl<'a> Vm<'a> {
    pub fn new(module: &'a Module, config: Config) -> Self {
        Vm {
            module,
            config,
            locals: module
                .locals
                .iter()
                .map(|local| Value::default_for(local.ty))
                .collect(),
            stack: Vec::new(),
            loop_counters: vec![0; module.loops],
            pc: 0,
            terminal: Terminal::new(),
            echo: None,
            executed: 0,
        }
    }

    /// Also write output to `writer` as it is produced
    pub fn with_echo(mut self, writer: impl Write + 'a) -> Self {
        self.echo = Some(Box::new(writer));
        self
    }

    /// Execute until `halt` (or falling off the end)
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        let result = self.execute();
        let flushed = self.flush_echo();
        result?;
        flushed?;

        debug!(
            instructions = self.executed,
            output_bytes = self.terminal.len(),
            "vm finished"
        );
        Ok(())
    }

    fn execute(&mut self) -> Result<(), RuntimeError> {
        let module = self.module;

        while let Some(instr) = module.code.get(self.pc) {
            trace!(pc = self.pc, ?instr, depth = self.stack.len(), "step");
            self.executed += 1;
            let mut next = self.pc + 1;

            match *instr {
                Instr::PushInt(n) => self.stack.push(Value::Int(n)),
                Instr::PushFloat(x) => self.stack.push(Value::Float(x)),
                Instr::Load(local) => {
                    let value = self.local(local.index())?;
                    self.stack.push(value);
                }
                Instr::Store(local) => {
                    let value = self.pop()?;
                    let ty = module.local(local).map(|l| l.ty).unwrap_or(value.ty());
                    match self.locals.get_mut(local.index()) {
                        Some(slot) => *slot = value.convert_to(ty),
                        None => return Err(self.malformed("store to unknown local")),
                    }
                }
                Instr::IntToFloat => {
                    let value = self.pop()?;
                    self.stack.push(value.convert_to(Type::Float));
                }
                Instr::FloatToInt => {
                    let value = self.pop()?;
                    self.stack.push(value.convert_to(Type::Int));
                }
                Instr::Binary { op, ty } => {
                    let rhs = self.pop()?;
                    let lhs = self.pop()?;
                    let result = ops::binary(op, ty, lhs, rhs, module.location(self.pc))?;
                    self.stack.push(result);
                }
                Instr::Unary(op) => {
                    let value = self.pop()?;
                    self.stack.push(ops::unary(op, value));
                }
                Instr::Jump(target) => next = target,
                Instr::JumpIfFalse(target) => {
                    if !self.pop()?.is_truthy() {
                        next = target;
                    }
                }
                Instr::JumpIfTrue(target) => {
                    if self.pop()?.is_truthy() {
                        next = target;
                    }
                }
                Instr::LoopEnter(id) => {
                    if let Some(counter) = self.loop_counters.get_mut(id.index()) {
                        *counter = 0;
                    }
                }
                Instr::LoopIter(id) => {
                    let limit = self.config.max_loop_iterations;
                    if let Some(counter) = self.loop_counters.get_mut(id.index()) {
                        if let Some(limit) = limit {
                            if *counter >= limit {
                                return Err(RuntimeError::IterationLimitExceeded {
                                    limit,
                                    location: module.location(self.pc),
                                });
                            }
                        }
                        *counter += 1;
                    }
                }
                Instr::Print { format, argc } => {
                    if self.stack.len() < argc {
                        return Err(self.malformed("printf arguments missing"));
                    }
                    let args = self.stack.split_off(self.stack.len() - argc);
                    let text = match module.format(format) {
                        Some(fmt) => format::render(&fmt.pieces, &args),
                        None => return Err(self.malformed("unknown format string")),
                    };
                    self.emit(&text)?;
                }
                Instr::Halt => return Ok(()),
            }

            self.pc = next;
        }

        Ok(())
    }

    fn pop(&mut self) -> Result<Value, RuntimeError> {
        match self.stack.pop() {
            Some(value) => Ok(value),
            None => Err(self.malformed("operand stack underflow")),
        }
    }

    fn local(&self, index: usize) -> Result<Value, RuntimeError> {
        self.locals
            .get(index)
            .copied()
            .ok_or_else(|| self.malformed("load from unknown local"))
    }

    fn malformed(&self, message: &str) -> RuntimeError {
        RuntimeError::MalformedModule {
            message: message.to_string(),
            pc: self.pc,
            location: self.module.location(self.pc),
        }
    }

    fn emit(&mut self, text: &str) -> Result<(), RuntimeError> {
        self.terminal.print(text);
        if let Some(echo) = self.echo.as_mut() {
            echo.write_all(text.as_bytes())
                .map_err(|e| RuntimeError::Output {
                    message: e.to_string(),
                    location: self.module.location(self.pc),
                })?;
        }
        Ok(())
    }

    fn flush_echo(&mut self) -> Result<(), RuntimeError> {
        if let Some(echo) = self.echo.as_mut() {
            echo.flush().map_err(|e| RuntimeError::Output {
                message: e.to_string(),
                location: self.module.location(self.pc),
            })?;
        }
        Ok(())
    }

    pub fn output(&self) -> &str {
        self.terminal.text()
    }

    pub fn lines(&self) -> Vec<String> {
        self.terminal.get_output()
    }

    /// Current values of all locals, by slot
    pub fn locals(&self) -> &[Value] {
        &self.locals
    }

    pub fn instructions_executed(&self) -> u64 {
        self.executed
    }
}
