use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Simple, file-backed to-do list.
/// Storage defaults to ~/.todo or a directory passed via --data-dir.
#[derive(Parser)]
#[command(name = "todo", version, about = "Terminal to-do list")]
pub struct Cli {
    /// Directory holding the saved task list and logs.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log level: error | warn | info | debug | trace.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Keep tasks in memory only; nothing is written to disk.
    #[arg(long, global = true)]
    pub memory: bool,

    /// Subcommand to run. Launches the interactive UI when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}
