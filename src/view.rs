//! Display rows for task lists, shared by the CLI table and the TUI.

use chrono::{Local, NaiveDate};

use crate::task::{Task, TaskId};

/// An action a row exposes, keyed by stable task id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    StartTimer(TaskId),
    Delete(TaskId),
}

impl TaskAction {
    /// Task the action applies to.
    pub fn task_id(self) -> TaskId {
        match self {
            TaskAction::StartTimer(id) | TaskAction::Delete(id) => id,
        }
    }
}

/// One rendered line of a task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub id: TaskId,
    pub title: String,
    pub priority: &'static str,
    pub deadline: String,
    pub due: String,
    pub status: &'static str,
    pub pomodoros: u64,
    pub actions: [TaskAction; 2],
}

impl TaskRow {
    pub fn from_task(task: &Task, today: NaiveDate) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            priority: task.priority.as_str(),
            deadline: task.deadline.format("%Y-%m-%d").to_string(),
            due: format_due_relative(task.deadline, today),
            status: format_status(task.completed),
            pomodoros: task.pomodoros,
            actions: [TaskAction::StartTimer(task.id), TaskAction::Delete(task.id)],
        }
    }
}

/// Project a task sequence into rows, replacing whatever was shown before.
pub fn task_rows<'a, I>(tasks: I, today: NaiveDate) -> Vec<TaskRow>
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks.into_iter().map(|t| TaskRow::from_task(t, today)).collect()
}

pub fn format_status(completed: bool) -> &'static str {
    if completed {
        "Completed"
    } else {
        "Pending"
    }
}

/// Format a due date relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative(due: NaiveDate, today: NaiveDate) -> String {
    let days = (due - today).num_days();
    match days {
        0 => "today".into(),
        1 => "tomorrow".into(),
        d if d > 1 => format!("in {d}d"),
        d => format!("{}d late", -d),
    }
}

/// Print tasks in a formatted table.
pub fn print_table(tasks: &[&Task]) {
    let today = Local::now().date_naive();
    println!(
        "{:<5} {:<7} {:<11} {:<10} {:<10} {:<5} {}",
        "ID", "Pri", "Deadline", "Due", "Status", "Pomo", "Title"
    );
    for row in task_rows(tasks.iter().copied(), today) {
        println!(
            "{:<5} {:<7} {:<11} {:<10} {:<10} {:<5} {}",
            row.id,
            row.priority,
            row.deadline,
            truncate(&row.due, 10),
            row.status,
            row.pomodoros,
            row.title
        );
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}
