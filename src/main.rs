//! # todo - Terminal To-Do List
//!
//! A small to-do list with priorities, deadlines, search and filtering, driven
//! either from the command line or from an interactive terminal user interface (TUI).
//!
//! ## Key Features
//!
//! - **Priority Ordering**: tasks are always shown high → medium → low, newest first
//!   within a priority
//! - **Deadlines**: optional deadline per task; open tasks past their deadline are
//!   flagged as overdue
//! - **Filters & Search**: all / active / completed / overdue, plus case-insensitive
//!   search across titles and descriptions
//! - **Local File Storage**: the whole list is a single JSON file, rewritten on every change
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the TUI
//! todo
//!
//! # Add a task via CLI
//! todo add "Buy milk" --priority high --deadline tomorrow
//!
//! # List open tasks
//! todo list --filter active
//!
//! # Complete it
//! todo toggle "Buy milk"
//! ```
//!
//! Data is stored locally in `~/.todo/saved_tasks.json`; logs go to `~/.todo/logs/`.
//! The first launch seeds three example tasks.

use std::path::PathBuf;

use clap::Parser;

pub mod cli;
pub mod cmd;
pub mod error;
pub mod fields;
pub mod logging;
pub mod storage;
pub mod store;
pub mod task;
pub mod util;
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
use storage::{FileStore, KeyValueStore, MemoryStore};
use store::TaskStore;

fn main() {
    let cli = Cli::parse();

    let command = cli.command.unwrap_or(Commands::Ui);
    if let Commands::Completions { shell } = command {
        cmd_completions(shell);
        return;
    }

    // Determine data directory
    let data_dir = cli.data_dir.clone().unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".todo")
    });
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        eprintln!("Failed to create data directory {}: {}", data_dir.display(), e);
        std::process::exit(1);
    }

    let _logger = match logging::init_logging(&cli.log_level, &data_dir.join("logs")) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Failed to start logging: {e}");
            std::process::exit(1);
        }
    };

    if cli.memory {
        dispatch(TaskStore::open(MemoryStore::new()), command);
    } else {
        dispatch(TaskStore::open(FileStore::new(&data_dir)), command);
    }
}

/// Run one command against an opened store.
fn dispatch<S: KeyValueStore>(mut store: TaskStore<S>, command: Commands) {
    match command {
        Commands::Ui => cmd_ui(store),

        Commands::Add { title, desc, priority, deadline } =>
            cmd_add(&mut store, title, desc, priority, deadline),

        Commands::List { filter, search } => cmd_list(&store, filter, search),

        Commands::View { id } => cmd_view(&store, id),

        Commands::Edit { id, title, desc, priority, deadline, clear_deadline } =>
            cmd_edit(&mut store, id, title, desc, priority, deadline, clear_deadline),

        Commands::Toggle { id } => cmd_toggle(&mut store, id),

        Commands::Delete { id } => cmd_delete(&mut store, id),

        Commands::Completions { shell } => cmd_completions(shell),
    }
}
