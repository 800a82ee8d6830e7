//! TUI pane rendering modules
//!
//! - [`source`]: source code with syntax highlighting and the current line
//! - [`variables`]: live variables with their types and values
//! - [`terminal`]: program output written so far
//! - [`status`]: status bar with keybindings and position in the history
//!
//! Each module exports a `render_*` function; panes hold no state of their
//! own beyond the scroll offsets the app passes in.

pub mod source;
pub mod status;
pub mod terminal;
pub mod variables;

pub use source::{render_source_pane, SourceScrollState};
pub use status::render_status_bar;
pub use terminal::render_terminal_pane;
pub use variables::{render_variables_pane, variable_rows, VariableRow};
