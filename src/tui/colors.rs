//! Color constants for the terminal user interface.

use ratatui::style::Color;

use crate::fields::Priority;
use crate::stats::Rgb;
use crate::timer::Phase;

/// Used for the work phase and destructive prompts
pub const TOMATO: Color = Color::Rgb(214, 69, 65);
/// Used for the break phase
pub const TEAL: Color = Color::Rgb(0, 128, 128);
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);
/// Header and status bar background
pub const SLATE: Color = Color::Rgb(40, 44, 52);

pub fn rgb(c: Rgb) -> Color {
    Color::Rgb(c.0, c.1, c.2)
}

pub fn phase_color(phase: Phase) -> Color {
    match phase {
        Phase::Work => TOMATO,
        Phase::Break => TEAL,
    }
}

pub fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::LightRed,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Gray,
    }
}
