//! Add-task form for the terminal user interface.

use crate::fields::Priority;
use crate::task::TaskDraft;
use crate::tui::input::InputField;

/// Field order in the form.
pub const TITLE_FIELD: usize = 0;
pub const DESCRIPTION_FIELD: usize = 1;
pub const PRIORITY_FIELD: usize = 2;
pub const DEADLINE_FIELD: usize = 3;
const FIELD_COUNT: usize = 4;

pub const FIELD_LABELS: [&str; FIELD_COUNT] = ["Title*", "Description", "Priority", "Deadline*"];

pub struct TaskForm {
    pub title: InputField,
    pub description: InputField,
    pub deadline: InputField,
    /// Index into [`Priority::ALL`].
    pub priority: usize,
    pub current_field: usize,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskForm {
    pub fn new() -> Self {
        Self {
            title: InputField::new(),
            description: InputField::new(),
            deadline: InputField::new(),
            priority: 1, // Medium
            current_field: TITLE_FIELD,
        }
    }

    pub fn selected_priority(&self) -> Priority {
        Priority::ALL[self.priority]
    }

    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % FIELD_COUNT;
    }

    pub fn prev_field(&mut self) {
        self.current_field = (self.current_field + FIELD_COUNT - 1) % FIELD_COUNT;
    }

    /// The focused text field, or `None` on the priority selector.
    pub fn active_input(&mut self) -> Option<&mut InputField> {
        match self.current_field {
            TITLE_FIELD => Some(&mut self.title),
            DESCRIPTION_FIELD => Some(&mut self.description),
            DEADLINE_FIELD => Some(&mut self.deadline),
            _ => None,
        }
    }

    pub fn handle_char(&mut self, c: char) {
        if let Some(input) = self.active_input() {
            input.handle_char(c);
        }
    }

    pub fn handle_backspace(&mut self) {
        if let Some(input) = self.active_input() {
            input.handle_backspace();
        }
    }

    pub fn handle_delete(&mut self) {
        if let Some(input) = self.active_input() {
            input.handle_delete();
        }
    }

    /// Move the cursor, or cycle the priority when the selector is focused.
    pub fn handle_left_right(&mut self, right: bool) {
        if self.current_field == PRIORITY_FIELD {
            let n = Priority::ALL.len();
            self.priority = if right { (self.priority + 1) % n } else { (self.priority + n - 1) % n };
            return;
        }
        if let Some(input) = self.active_input() {
            if right {
                input.move_cursor_right();
            } else {
                input.move_cursor_left();
            }
        }
    }

    pub fn to_draft(&self) -> TaskDraft {
        TaskDraft::new(&self.title.value, self.selected_priority(), &self.deadline.value)
            .with_description(&self.description.value)
    }
}
