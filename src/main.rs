//! # pomo - task tracker with a Pomodoro timer
//!
//! A terminal task list where each task carries a title, optional description,
//! priority, deadline and completion flag. Any task can be bound to a 25/5
//! minute work/break countdown; every finished work session is credited to
//! that task and to a global session counter.
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the interactive UI
//! pomo
//!
//! # Add a task via CLI
//! pomo add "Write report" --deadline "next friday" --priority high
//!
//! # List pending high-priority tasks
//! pomo list --priority high --status pending
//!
//! # Show the statistics chart
//! pomo stats
//! ```
//!
//! Data is stored in `~/.pomo/` as `tasks.json` and `totalPomodoros.json`.
//! Settings are read from `~/.pomo/config.toml` and logs go to `pomo.log` in
//! the data directory (filter with `POMO_LOG`, e.g. `POMO_LOG=pomo=debug`).

use std::path::Path;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub mod cli;
pub mod cmd;
pub mod config;
pub mod db;
pub mod error;
pub mod fields;
pub mod filter;
pub mod stats;
pub mod storage;
pub mod task;
pub mod timer;
pub mod tracker;
pub mod view;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod task_form;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use config::Config;
use storage::FileStore;
use tracker::Tracker;

const LOG_FILE: &str = "pomo.log";
const LOG_ENV: &str = "POMO_LOG";

/// Send tracing output to a file in `dir`; the TUI owns the terminal.
fn init_logging(dir: &Path) -> WorkerGuard {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("pomo=info"));
    let appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .init();
    guard
}

fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Ui);

    // Completions need neither config nor store
    if let Commands::Completions { shell } = command {
        cmd_completions(shell);
        return;
    }

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    let data_dir = config.resolve_data_dir(cli.data_dir.as_deref());
    let store = match FileStore::open(&data_dir) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Failed to create data directory {}: {e}", data_dir.display());
            std::process::exit(1);
        }
    };

    let _guard = init_logging(&data_dir);
    tracing::debug!(dir = %data_dir.display(), "opened task store");

    let mut tracker = Tracker::new(store, config.durations());

    match command {
        Commands::Ui => cmd_ui(tracker, &config),
        Commands::Add { title, deadline, priority, desc } => cmd_add(&mut tracker, title, deadline, priority, desc),
        Commands::List { priority, status } => cmd_list(&tracker, priority, status),
        Commands::Delete { id } => cmd_delete(&mut tracker, id),
        Commands::Complete { id } => cmd_set_completed(&mut tracker, id, true),
        Commands::Reopen { id } => cmd_set_completed(&mut tracker, id, false),
        Commands::Stats => cmd_stats(&tracker),
        Commands::Completions { .. } => unreachable!("completions handled above"),
    }
}
