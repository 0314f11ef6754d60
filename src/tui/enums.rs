//! Enumerations for TUI state management.

use crate::fields::{Priority, StatusFilter};

/// Application state for the terminal user interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    TaskList,
    AddTask,
    Help,
    Confirm,
    /// Blocking message; any key returns to the state it interrupted.
    Notice,
}

/// Next priority filter in the cycle All → Low → Medium → High → All.
pub fn next_priority_filter(current: Option<Priority>) -> Option<Priority> {
    match current {
        None => Some(Priority::Low),
        Some(Priority::Low) => Some(Priority::Medium),
        Some(Priority::Medium) => Some(Priority::High),
        Some(Priority::High) => None,
    }
}

/// Next status filter in the cycle All → Pending → Completed → All.
pub fn next_status_filter(current: Option<StatusFilter>) -> Option<StatusFilter> {
    match current {
        None => Some(StatusFilter::Pending),
        Some(StatusFilter::Pending) => Some(StatusFilter::Completed),
        Some(StatusFilter::Completed) => None,
    }
}
