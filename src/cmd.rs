//! Command implementations for the CLI interface.
//!
//! Each handler works on a loaded [`Tracker`], prints its result, and exits
//! with status 1 on failure.

use clap::Subcommand;
use clap_complete::{generate, Shell};

use crate::config::Config;
use crate::error::TrackerError;
use crate::fields::{Priority, StatusFilter};
use crate::storage::FileStore;
use crate::task::{TaskDraft, TaskId};
use crate::tracker::Tracker;
use crate::tui::run::run_tui;
use crate::view::print_table;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive UI (default).
    Ui,

    /// Add a new task.
    Add {
        /// Short title for the task.
        title: String,
        /// Deadline: YYYY-MM-DD, "today", "tomorrow", "next friday", "in Nd".
        #[arg(long)]
        deadline: String,
        /// Priority: low | medium | high.
        #[arg(long, value_enum, ignore_case = true, default_value_t = Priority::Medium)]
        priority: Priority,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
    },

    /// List tasks with optional filters.
    List {
        /// Only tasks with this priority.
        #[arg(long, value_enum, ignore_case = true)]
        priority: Option<Priority>,
        /// Only completed or only pending tasks.
        #[arg(long, value_enum, ignore_case = true)]
        status: Option<StatusFilter>,
    },

    /// Delete a task by ID.
    Delete {
        id: TaskId,
    },

    /// Mark a task completed.
    Complete {
        id: TaskId,
    },

    /// Mark a task pending again.
    Reopen {
        id: TaskId,
    },

    /// Show completed-task and session counts.
    Stats,

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn fail(context: &str, e: TrackerError) -> ! {
    tracing::warn!(error = %e, "{context}");
    eprintln!("{context}: {e}");
    std::process::exit(1);
}

/// Launch the terminal user interface.
pub fn cmd_ui(tracker: Tracker<FileStore>, config: &Config) {
    if let Err(e) = run_tui(tracker, config) {
        tracing::error!(error = %e, "UI exited with error");
        eprintln!("UI error: {e}");
        std::process::exit(1);
    }
}

/// Add a new task to the store.
pub fn cmd_add(
    tracker: &mut Tracker<FileStore>,
    title: String,
    deadline: String,
    priority: Priority,
    desc: Option<String>,
) {
    let draft = TaskDraft::new(&title, priority, &deadline).with_description(desc.as_deref().unwrap_or(""));
    match tracker.add_task(draft) {
        Ok(id) => println!("Added task {id}"),
        Err(e) => fail("Could not add task", e),
    }
}

/// List tasks with optional filtering.
pub fn cmd_list(tracker: &Tracker<FileStore>, priority: Option<Priority>, status: Option<StatusFilter>) {
    let tasks = tracker.filtered(priority, status);
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }
    print_table(&tasks);
}

/// Delete a task by id.
pub fn cmd_delete(tracker: &mut Tracker<FileStore>, id: TaskId) {
    match tracker.delete_task(id) {
        Ok(task) => println!("Deleted {} - {}", task.id, task.title),
        Err(e) => fail("Could not delete task", e),
    }
}

/// Set or clear the completion flag on a task.
pub fn cmd_set_completed(tracker: &mut Tracker<FileStore>, id: TaskId, completed: bool) {
    if let Err(e) = tracker.set_completed(id, completed) {
        fail("Could not update task", e);
    }
    if completed {
        println!("Completed {id}");
    } else {
        println!("Reopened {id}");
    }
}

/// Print the statistics chart as text.
pub fn cmd_stats(tracker: &Tracker<FileStore>) {
    print!("{}", tracker.stats().chart().render_text(30));
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}
