//! Color constants for the terminal user interface.

use ratatui::style::Color;

use crate::fields::Priority;

/// Used for high priority
pub const DARK_RED: Color = Color::Rgb(178, 34, 34);
/// Used for medium priority
pub const ORANGE: Color = Color::Rgb(255, 140, 0);
/// Used for low priority
pub const STEEL_BLUE: Color = Color::Rgb(70, 130, 180);

/// Accent colour for a priority.
pub fn priority_color(p: Priority) -> Color {
    match p {
        Priority::High => DARK_RED,
        Priority::Medium => ORANGE,
        Priority::Low => STEEL_BLUE,
    }
}
