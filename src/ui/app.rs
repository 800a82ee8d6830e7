//! Main TUI application state and logic
//!
//! The program has already run to completion (or to its first runtime
//! error) before the viewer opens; the app only moves a cursor over the
//! recorded snapshot history.

use crate::parser::ast::SourceLocation;
use crate::snapshot::{Snapshot, SnapshotManager, Terminal as Output};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};

use super::panes;

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Variables,
    Terminal,
}

impl FocusedPane {
    /// Clockwise: source -> terminal -> variables
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Terminal,
            FocusedPane::Terminal => FocusedPane::Variables,
            FocusedPane::Variables => FocusedPane::Source,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Variables,
            FocusedPane::Terminal => FocusedPane::Source,
            FocusedPane::Variables => FocusedPane::Terminal,
        }
    }
}

/// The runtime error execution stopped on, if any
#[derive(Debug, Clone)]
pub struct ErrorState {
    pub message: String,
    pub location: Option<SourceLocation>,
}

/// The main application state
pub struct App {
    source_code: String,
    snapshots: SnapshotManager,
    output: Output,
    error: Option<ErrorState>,

    /// Index into the snapshot history
    position: usize,

    pub focused_pane: FocusedPane,
    source_scroll: panes::SourceScrollState,
    variables_scroll: usize,
    terminal_scroll: usize,

    pub should_quit: bool,
    pub status_message: String,
    pub is_playing: bool,
    last_play_time: Instant,
}

impl App {
    pub fn new(
        source_code: String,
        snapshots: SnapshotManager,
        output: Output,
        error: Option<ErrorState>,
    ) -> Self {
        let status_message = match &error {
            Some(e) => format!("Stopped on error: {}", e.message),
            None => String::from("Ready!"),
        };
        App {
            source_code,
            snapshots,
            output,
            error,
            position: 0,
            focused_pane: FocusedPane::Source,
            source_scroll: panes::SourceScrollState::default(),
            variables_scroll: 0,
            terminal_scroll: usize::MAX,
            should_quit: false,
            status_message,
            is_playing: false,
            last_play_time: Instant::now(),
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn total_steps(&self) -> usize {
        self.snapshots.len()
    }

    pub fn current_snapshot(&self) -> Option<&Snapshot> {
        self.snapshots.get(self.position)
    }

    fn is_at_end(&self) -> bool {
        self.position + 1 >= self.snapshots.len()
    }

    /// Output as it stood at the current snapshot
    pub fn visible_output(&self) -> &str {
        match self.current_snapshot() {
            Some(snapshot) => self.output.prefix(snapshot.output_len),
            None => self.output.text(),
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if self.is_playing && self.last_play_time.elapsed() >= Duration::from_millis(500) {
                if self.is_at_end() {
                    self.is_playing = false;
                    self.status_message = "Playback complete".to_string();
                } else {
                    self.step_forward();
                }
                self.last_play_time = Instant::now();
            }

            // Poll with a timeout so playback keeps advancing
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(frame.area());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(main_chunks[0]);

        // Left column: source over output; right column: variables
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(columns[0]);

        let (current_line, rows) = match self.snapshots.get(self.position) {
            Some(snapshot) => {
                let previous = self
                    .position
                    .checked_sub(1)
                    .and_then(|i| self.snapshots.get(i))
                    .map(|s| &s.environment);
                (
                    snapshot.source_location.line,
                    panes::variable_rows(&snapshot.environment, previous),
                )
            }
            None => (0, Vec::new()),
        };

        // The error is drawn on the last step, at its own location
        let error_line = self
            .error
            .as_ref()
            .filter(|_| self.is_at_end())
            .and_then(|e| e.location)
            .map(|l| l.line);

        panes::render_source_pane(
            frame,
            left_rows[0],
            &self.source_code,
            error_line.unwrap_or(current_line),
            error_line.is_some(),
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );

        let output = match self.snapshots.get(self.position) {
            Some(snapshot) => self.output.prefix(snapshot.output_len),
            None => self.output.text(),
        };
        panes::render_terminal_pane(
            frame,
            left_rows[1],
            output,
            self.focused_pane == FocusedPane::Terminal,
            &mut self.terminal_scroll,
        );

        panes::render_variables_pane(
            frame,
            columns[1],
            &rows,
            self.focused_pane == FocusedPane::Variables,
            &mut self.variables_scroll,
        );

        panes::render_status_bar(
            frame,
            main_chunks[1],
            &self.status_message,
            self.position,
            self.snapshots.len(),
            self.error.is_some() && self.is_at_end(),
            self.is_playing,
        );
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Tab => self.focused_pane = self.focused_pane.next(),
            KeyCode::BackTab => self.focused_pane = self.focused_pane.prev(),
            KeyCode::Left => {
                self.is_playing = false;
                self.step_backward();
            }
            KeyCode::Right => {
                self.is_playing = false;
                self.step_forward();
            }
            KeyCode::Home | KeyCode::Backspace => {
                self.is_playing = false;
                self.position = 0;
                self.status_message = "Jumped to start".to_string();
                self.terminal_scroll = usize::MAX;
            }
            KeyCode::End | KeyCode::Enter => {
                self.is_playing = false;
                self.position = self.snapshots.len().saturating_sub(1);
                self.status_message = match &self.error {
                    Some(e) => format!("Stopped on error: {}", e.message),
                    None => "Jumped to end".to_string(),
                };
                self.terminal_scroll = usize::MAX;
            }
            KeyCode::Char(' ') => {
                self.is_playing = !self.is_playing;
                if self.is_playing {
                    self.last_play_time = Instant::now();
                    self.status_message = "Playing...".to_string();
                } else {
                    self.status_message = "Paused".to_string();
                }
            }
            KeyCode::Up => match self.focused_pane {
                // Scrolling up moves the current line down the pane
                FocusedPane::Source => {
                    if let Some(row) = self.source_scroll.target_line_row {
                        self.source_scroll.target_line_row = Some(row.saturating_add(1));
                    }
                }
                FocusedPane::Variables => {
                    self.variables_scroll = self.variables_scroll.saturating_sub(1);
                }
                FocusedPane::Terminal => {
                    self.terminal_scroll = self.terminal_scroll.saturating_sub(1);
                }
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Source => {
                    if let Some(row) = self.source_scroll.target_line_row {
                        self.source_scroll.target_line_row = Some(row.saturating_sub(1));
                    }
                }
                FocusedPane::Variables => {
                    self.variables_scroll = self.variables_scroll.saturating_add(1);
                }
                FocusedPane::Terminal => {
                    self.terminal_scroll = self.terminal_scroll.saturating_add(1);
                }
            },
            _ => {}
        }
    }

    fn step_forward(&mut self) {
        if self.is_at_end() {
            self.status_message = "Cannot step forward: at end of execution".to_string();
            return;
        }
        self.position += 1;
        self.status_message = self.describe_position();
        self.terminal_scroll = usize::MAX;
    }

    fn step_backward(&mut self) {
        if self.position == 0 {
            self.status_message = "Cannot step backward: at start of execution".to_string();
            return;
        }
        self.position -= 1;
        self.status_message = self.describe_position();
        self.terminal_scroll = usize::MAX;
    }

    fn describe_position(&self) -> String {
        match self.current_snapshot() {
            Some(snapshot) => format!(
                "{} at {}",
                snapshot.event.describe(),
                snapshot.source_location
            ),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::interpreter::Interpreter;
    use crate::pipeline;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;

    const SOURCE: &str = "void main() {\n  int x;\n  x = 4;\n  printf(\"x=%d\\n\", x);\n}\n";

    fn app_for(source: &str) -> App {
        let config = Config::default().with_snapshots();
        let program = pipeline::compile_with(source, &config).unwrap();
        let mut interpreter = Interpreter::new(&program, config);
        let error = interpreter.run().err().map(|e| ErrorState {
            message: e.to_string(),
            location: e.location(),
        });
        let (snapshots, output) = interpreter.into_history();
        App::new(source.to_string(), snapshots, output, error)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_stepping_is_clamped() {
        let mut app = app_for(SOURCE);
        assert!(app.total_steps() >= 3);

        press(&mut app, KeyCode::Left);
        assert_eq!(app.position(), 0);
        assert!(app.status_message.starts_with("Cannot step backward"));

        press(&mut app, KeyCode::Right);
        assert_eq!(app.position(), 1);

        press(&mut app, KeyCode::End);
        assert_eq!(app.position(), app.total_steps() - 1);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.position(), app.total_steps() - 1);

        press(&mut app, KeyCode::Home);
        assert_eq!(app.position(), 0);
    }

    #[test]
    fn test_output_follows_position() {
        let mut app = app_for(SOURCE);
        assert_eq!(app.visible_output(), "");
        press(&mut app, KeyCode::End);
        assert_eq!(app.visible_output(), "x=4\n");
    }

    #[test]
    fn test_focus_and_quit() {
        let mut app = app_for(SOURCE);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focused_pane, FocusedPane::Terminal);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.focused_pane, FocusedPane::Source);

        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_error_is_reported() {
        let app = app_for("void main() {\n  int z;\n  z = 1 / z;\n}\n");
        assert!(app.status_message.contains("division by zero"));
    }

    #[test]
    fn test_render_draws_panes() {
        let mut app = app_for(SOURCE);
        press(&mut app, KeyCode::End);

        let mut terminal = Terminal::new(TestBackend::new(140, 24)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();

        let screen: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains("Source Code"));
        assert!(screen.contains("Variables"));
        assert!(screen.contains("x=4"));
        assert!(screen.contains("END"));
    }
}
