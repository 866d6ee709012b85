//! Layout helpers for the terminal user interface.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::Span,
};

use crate::tui::input::InputField;

/// A rectangle of `percent_x` by `percent_y` centred inside `r`.
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// Cursor column and horizontal scroll for a one-line input `width` cells wide.
///
/// Columns are display cells, so wide characters count double. The scroll
/// keeps the cursor inside the box once the text outgrows it.
pub fn input_cursor(field: &InputField, width: u16) -> (u16, u16) {
    let before: String = field.value.chars().take(field.cursor).collect();
    let column = u16::try_from(Span::raw(before).width()).unwrap_or(u16::MAX);
    let scroll = column.saturating_sub(width.saturating_sub(1));
    (column - scroll, scroll)
}
