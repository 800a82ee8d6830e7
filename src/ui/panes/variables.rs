//! Variables pane: every live variable with its type and value
//!
//! Rows follow declaration order. A variable whose value differs from the
//! previous step (or that was just declared) is drawn in the highlight
//! colour so the effect of each statement is easy to spot.

use crate::memory::environment::Environment;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph},
    Frame,
};

/// One formatted row of the pane
#[derive(Debug, Clone, PartialEq)]
pub struct VariableRow {
    pub name: String,
    pub type_name: String,
    pub value: String,
    pub changed: bool,
}

/// Rows for `current`, marking what changed since `previous`
pub fn variable_rows(current: &Environment, previous: Option<&Environment>) -> Vec<VariableRow> {
    current
        .iter()
        .map(|(name, slot)| {
            let changed = match previous.and_then(|env| env.get(name)) {
                Some(before) => before != slot.value,
                None => previous.is_some(),
            };
            VariableRow {
                name: name.to_string(),
                type_name: slot.var_type.to_string(),
                value: slot.value.to_string(),
                changed,
            }
        })
        .collect()
}

/// Render the variables pane
pub fn render_variables_pane(
    frame: &mut Frame,
    area: Rect,
    rows: &[VariableRow],
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(" Variables ")
        .borders(Borders::ALL)
        .border_style(border_style);

    if rows.is_empty() {
        let paragraph = Paragraph::new("(no variables)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let name_width = rows.iter().map(|r| r.name.len()).max().unwrap_or(0);
    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    if rows.len() > visible_height {
        *scroll_offset = (*scroll_offset).min(rows.len() - visible_height);
    } else {
        *scroll_offset = 0;
    }

    let items: Vec<ListItem> = rows
        .iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|row| {
            let value_style = if row.changed {
                Style::default()
                    .fg(DEFAULT_THEME.changed)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DEFAULT_THEME.number)
            };
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<5} ", row.type_name),
                    Style::default().fg(DEFAULT_THEME.type_name),
                ),
                Span::styled(
                    format!("{:<width$}", row.name, width = name_width),
                    Style::default().fg(DEFAULT_THEME.fg),
                ),
                Span::styled(" = ", Style::default().fg(DEFAULT_THEME.comment)),
                Span::styled(row.value.clone(), value_style),
            ]))
        })
        .collect();

    let list = List::new(items).block(block.padding(Padding::new(1, 0, 0, 0)));
    frame.render_widget(list, area);
}
