// Execution engine for the mini-C interpreter

use crate::config::Config;
use crate::interpreter::errors::RuntimeError;
use crate::memory::environment::Environment;
use crate::parser::ast::SourceLocation;
use crate::semantic::CheckedProgram;
use crate::snapshot::{Snapshot, SnapshotEvent, SnapshotManager, Terminal};
use std::io::Write;
use tracing::debug;

/// Tree-walking interpreter over a checked program
pub struct Interpreter<'a> {
    /// Checked program (types and printf pieces resolved)
    program: &'a CheckedProgram,

    pub(crate) config: Config,

    /// Variable store, created empty for each run
    pub(crate) environment: Environment,

    /// Captured printf output
    terminal: Terminal,

    /// Optional sink that receives output as it is produced
    echo: Option<Box<dyn Write + 'a>>,

    /// Current source location being executed
    pub(crate) current_location: SourceLocation,

    /// Snapshot history (only filled when `config.record_snapshots`)
    snapshot_manager: SnapshotManager,

    pub(crate) statements_executed: u64,

    /// Whether execution has finished
    finished: bool,
}

impl<'a> Interpreter<'a> {
    /// Create an interpreter with a fresh environment
    pub fn new(program: &'a CheckedProgram, config: Config) -> Self {
        let snapshot_memory_limit = config.snapshot_memory_limit;
        Interpreter {
            program,
            config,
            environment: Environment::new(),
            terminal: Terminal::new(),
            echo: None,
            current_location: program.program().location,
            snapshot_manager: SnapshotManager::new(snapshot_memory_limit),
            statements_executed: 0,
            finished: false,
        }
    }

    /// Also write output to `writer` as each printf executes
    pub fn with_echo(mut self, writer: impl Write + 'a) -> Self {
        self.echo = Some(Box::new(writer));
        self
    }

    /// Run the program from start to finish
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        let program = self.program;
        debug!(
            statements = program.program().statement_count(),
            "executing program"
        );

        self.take_snapshot(SnapshotEvent::Start)?;

        let result = self.execute_block(&program.program().body);
        let flushed = self.flush_echo();
        result?;
        flushed?;

        self.finished = true;
        self.take_snapshot(SnapshotEvent::Finish)?;

        debug!(
            statements = self.statements_executed,
            output_bytes = self.terminal.len(),
            "execution finished"
        );
        Ok(())
    }

    /// Append printf output, echoing it if a writer is attached
    pub(crate) fn emit(&mut self, text: &str) -> Result<(), RuntimeError> {
        self.terminal.print(text);
        if let Some(echo) = self.echo.as_mut() {
            echo.write_all(text.as_bytes())
                .map_err(|e| RuntimeError::Output {
                    message: e.to_string(),
                    location: self.current_location,
                })?;
        }
        Ok(())
    }

    fn flush_echo(&mut self) -> Result<(), RuntimeError> {
        if let Some(echo) = self.echo.as_mut() {
            echo.flush().map_err(|e| RuntimeError::Output {
                message: e.to_string(),
                location: self.current_location,
            })?;
        }
        Ok(())
    }

    /// Take a snapshot of the current execution state
    pub(crate) fn take_snapshot(&mut self, event: SnapshotEvent) -> Result<(), RuntimeError> {
        if !self.config.record_snapshots {
            return Ok(());
        }

        let snapshot = Snapshot {
            environment: self.environment.clone(),
            output_len: self.terminal.len(),
            source_location: self.current_location,
            event,
        };

        self.snapshot_manager
            .push(snapshot)
            .map_err(|_| RuntimeError::SnapshotLimitExceeded {
                current: self.snapshot_manager.memory_usage(),
                limit: self.snapshot_manager.memory_limit(),
            })
    }

    // ========== Getter methods ==========

    /// Output produced so far
    pub fn output(&self) -> &str {
        self.terminal.text()
    }

    /// Output split into lines
    pub fn lines(&self) -> Vec<String> {
        self.terminal.get_output()
    }

    pub fn terminal(&self) -> &Terminal {
        &self.terminal
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn snapshots(&self) -> &SnapshotManager {
        &self.snapshot_manager
    }

    /// Get the current source location
    pub fn current_location(&self) -> SourceLocation {
        self.current_location
    }

    pub fn statements_executed(&self) -> u64 {
        self.statements_executed
    }

    /// Check if execution has finished
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Consume the interpreter, keeping its history and output
    pub fn into_history(self) -> (SnapshotManager, Terminal) {
        (self.snapshot_manager, self.terminal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::Lexer;
    use crate::parser::parse::Parser;
    use crate::semantic::check;

    fn checked(source: &str) -> CheckedProgram {
        let tokens = Lexer::new(source).tokenize().unwrap();
        let program = Parser::new(tokens).parse_program().unwrap();
        check(program).unwrap()
    }

    #[test]
    fn test_echo_receives_output() {
        let program = checked("void main() { printf(\"a\"); printf(\"b\\n\"); }");
        let mut sink = Vec::new();

        let mut interpreter = Interpreter::new(&program, Config::default()).with_echo(&mut sink);
        interpreter.run().unwrap();
        assert_eq!(interpreter.output(), "ab\n");
        drop(interpreter);

        assert_eq!(sink, b"ab\n");
    }

    #[test]
    fn test_no_snapshots_by_default() {
        let program = checked("void main() { int x; x = 1; }");
        let mut interpreter = Interpreter::new(&program, Config::default());
        interpreter.run().unwrap();

        assert!(interpreter.snapshots().is_empty());
        assert!(interpreter.is_finished());
        assert_eq!(interpreter.statements_executed(), 2);
    }

    #[test]
    fn test_snapshot_history() {
        let program = checked("void main() {\n int x;\n x = 5;\n printf(\"%d\\n\", x);\n}");
        let mut interpreter = Interpreter::new(&program, Config::default().with_snapshots());
        interpreter.run().unwrap();

        let events: Vec<_> = interpreter.snapshots().iter().map(|s| s.event).collect();
        assert_eq!(
            events,
            vec![
                SnapshotEvent::Start,
                SnapshotEvent::Declare,
                SnapshotEvent::Assign,
                SnapshotEvent::Print,
                SnapshotEvent::Finish,
            ]
        );

        let assign = interpreter.snapshots().get(2).unwrap();
        assert_eq!(assign.source_location.line, 3);
        assert_eq!(assign.output_len, 0);
        assert_eq!(interpreter.snapshots().last().map(|s| s.output_len), Some(2));
    }

    #[test]
    fn test_snapshot_limit() {
        let program = checked("void main() { int x; while (x < 100) { x = x + 1; } }");
        let mut config = Config::default().with_snapshots();
        config.snapshot_memory_limit = 2048;

        let err = Interpreter::new(&program, config).run().unwrap_err();
        assert_eq!(err.kind(), "snapshot-limit-exceeded");
    }
}
