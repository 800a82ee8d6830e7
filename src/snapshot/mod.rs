// Snapshot management for stepping through an execution

use crate::memory::environment::Environment;
use crate::parser::ast::SourceLocation;

/// Captured printf output
///
/// Output is append-only, so a snapshot records only how much of it had
/// been written at that point.
#[derive(Debug, Clone, Default)]
pub struct Terminal {
    text: String,
}

impl Terminal {
    pub fn new() -> Self {
        Terminal {
            text: String::new(),
        }
    }

    /// Print without adding a newline
    pub fn print(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Get all lines as a vector of strings
    pub fn get_output(&self) -> Vec<String> {
        split_lines(&self.text)
    }

    /// Output as it was when `len` bytes had been written
    pub fn prefix(&self, len: usize) -> &str {
        self.text.get(..len).unwrap_or(&self.text)
    }
}

/// Split output into lines; a trailing newline does not start a new line.
pub fn split_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = text.split('\n').map(|s| s.to_string()).collect();
    if lines.last().is_some_and(|s| s.is_empty()) {
        lines.pop();
    }
    lines
}

/// What the interpreter was doing when a snapshot was taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotEvent {
    Start,
    Declare,
    Assign,
    Print,
    Branch { taken: bool },
    LoopCheck { entering: bool },
    Finish,
}

impl SnapshotEvent {
    pub fn describe(&self) -> &'static str {
        match self {
            SnapshotEvent::Start => "program start",
            SnapshotEvent::Declare => "declaration",
            SnapshotEvent::Assign => "assignment",
            SnapshotEvent::Print => "printf",
            SnapshotEvent::Branch { taken: true } => "if: condition true",
            SnapshotEvent::Branch { taken: false } => "if: condition false",
            SnapshotEvent::LoopCheck { entering: true } => "while: entering body",
            SnapshotEvent::LoopCheck { entering: false } => "while: loop exit",
            SnapshotEvent::Finish => "program finished",
        }
    }
}

/// Snapshot of execution state
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub environment: Environment,
    pub output_len: usize,
    pub source_location: SourceLocation,
    pub event: SnapshotEvent,
}

impl Snapshot {
    /// Estimate the memory usage of this snapshot in bytes
    pub fn estimated_size(&self) -> usize {
        // Rough estimate: 64 bytes per variable plus the names
        let environment_size: usize = self
            .environment
            .iter()
            .map(|(name, _)| 64 + name.len())
            .sum();

        std::mem::size_of::<Snapshot>() + environment_size
    }
}

/// Manages execution history for stepping back and forth
#[derive(Debug)]
pub struct SnapshotManager {
    snapshots: Vec<Snapshot>,
    max_memory: usize,
    current_memory: usize,
}

impl SnapshotManager {
    pub fn new(max_memory: usize) -> Self {
        SnapshotManager {
            snapshots: Vec::new(),
            max_memory,
            current_memory: 0,
        }
    }

    /// Add a snapshot to history
    pub fn push(&mut self, snapshot: Snapshot) -> Result<(), String> {
        let snapshot_size = snapshot.estimated_size();

        if self.current_memory + snapshot_size > self.max_memory {
            return Err(format!(
                "Snapshot memory limit exceeded: {} + {} > {}",
                self.current_memory, snapshot_size, self.max_memory
            ));
        }

        self.current_memory += snapshot_size;
        self.snapshots.push(snapshot);
        Ok(())
    }

    /// Get a snapshot by index
    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.snapshots.get(index)
    }

    pub fn last(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.snapshots.iter()
    }

    /// Get the number of snapshots
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Get current memory usage
    pub fn memory_usage(&self) -> usize {
        self.current_memory
    }

    /// Get max memory limit
    pub fn memory_limit(&self) -> usize {
        self.max_memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::value::Value;
    use crate::parser::ast::Type;

    fn snapshot(vars: usize) -> Snapshot {
        let mut environment = Environment::new();
        for i in 0..vars {
            environment.declare(
                &format!("v{}", i),
                Type::Int,
                Value::Int(i as i64),
                SourceLocation::new(1, 1),
            );
        }
        Snapshot {
            environment,
            output_len: 0,
            source_location: SourceLocation::new(1, 1),
            event: SnapshotEvent::Start,
        }
    }

    #[test]
    fn test_terminal_lines() {
        let mut terminal = Terminal::new();
        terminal.print("Testing number: ");
        terminal.print("121\n");
        terminal.print("\nnext");

        assert_eq!(
            terminal.get_output(),
            vec!["Testing number: 121", "", "next"]
        );
        assert_eq!(terminal.prefix(7), "Testing");
        assert_eq!(split_lines("a\nb\n"), vec!["a", "b"]);
    }

    #[test]
    fn test_manager_tracks_memory() {
        let mut manager = SnapshotManager::new(1024 * 1024);
        manager.push(snapshot(2)).unwrap();
        manager.push(snapshot(3)).unwrap();

        assert_eq!(manager.len(), 2);
        assert!(manager.memory_usage() > 0);
        assert_eq!(manager.get(1).map(|s| s.environment.len()), Some(3));
    }

    #[test]
    fn test_manager_limit() {
        let limit = snapshot(1).estimated_size();
        let mut manager = SnapshotManager::new(limit);
        manager.push(snapshot(1)).unwrap();

        assert!(manager.push(snapshot(1)).is_err());
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.memory_limit(), limit);
    }
}
