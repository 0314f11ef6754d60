use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Task tracker with a built-in Pomodoro timer.
/// Data lives in ~/.pomo unless --data-dir or the config file says otherwise.
#[derive(Parser)]
#[command(name = "pomo", version, about = "Task tracker with a Pomodoro timer")]
pub struct Cli {
    /// Directory holding the task store.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Path to the TOML config file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Defaults to `ui` when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}
