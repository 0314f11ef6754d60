//! Task data structure and related functionality.
//!
//! This module defines the core `Task` struct that represents a single work item,
//! along with `TaskDraft`, the unvalidated input a new task is built from.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::parse_due_input;
use crate::error::TrackerError;
use crate::fields::Priority;

/// Stable task identifier, assigned once at creation and never reused.
pub type TaskId = u64;

/// A work item tracked by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Zero means "not yet assigned" and only appears in data written before ids existed.
    #[serde(default)]
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub priority: Priority,
    pub deadline: NaiveDate,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub pomodoros: u64,
}

/// Raw user input for a new task, as collected by the form or the CLI.
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub deadline: String,
}

impl TaskDraft {
    pub fn new(title: &str, priority: Priority, deadline: &str) -> Self {
        Self {
            title: title.to_string(),
            description: String::new(),
            priority,
            deadline: deadline.to_string(),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Validate the draft and build a task with the given id.
    ///
    /// Title and deadline are required; the deadline accepts the same inputs
    /// as [`parse_due_input`].
    pub fn into_task(self, id: TaskId) -> Result<Task, TrackerError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(TrackerError::Validation("title is required".into()));
        }
        let deadline_raw = self.deadline.trim();
        if deadline_raw.is_empty() {
            return Err(TrackerError::Validation("deadline is required".into()));
        }
        let deadline = parse_due_input(deadline_raw).ok_or_else(|| {
            TrackerError::Validation(format!("could not understand deadline '{deadline_raw}'"))
        })?;
        let description = self.description.trim();

        Ok(Task {
            id,
            title: title.to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            priority: self.priority,
            deadline,
            completed: false,
            pomodoros: 0,
        })
    }
}
