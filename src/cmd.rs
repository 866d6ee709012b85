//! Command implementations for the CLI interface.
//!
//! Each subcommand maps onto one task store operation (or a read of the
//! derived view). Handlers print their result and exit non-zero on user error.

use clap::Subcommand;
use clap_complete::{generate, Shell};

use chrono::Utc;
use uuid::Uuid;

use crate::fields::*;
use crate::storage::KeyValueStore;
use crate::store::TaskStore;
use crate::tui::run::run_tui;
use crate::util::*;
use crate::view::{derive_view, ViewQuery};

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive UI interface.
    Ui,

    /// Add a new task.
    Add {
        /// Short title for the task.
        title: String,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
        /// Priority: low | medium | high.
        #[arg(long, value_enum, default_value_t = Priority::Medium)]
        priority: Priority,
        /// Deadline: "today", "tomorrow", "in 3d", "in 4h", YYYY-MM-DD or "YYYY-MM-DD HH:MM".
        #[arg(long)]
        deadline: Option<String>,
    },

    /// List tasks, highest priority first.
    List {
        /// Which tasks to show.
        #[arg(long, value_enum, default_value_t = FilterOption::All)]
        filter: FilterOption,
        /// Only show tasks whose title or description contains this text.
        #[arg(long, default_value = "")]
        search: String,
    },

    /// View a single task by ID prefix or title.
    View {
        /// Task ID, ID prefix or title
        id: String,
    },

    /// Edit fields on a task.
    Edit {
        /// Task ID, ID prefix or title
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        #[arg(long)]
        deadline: Option<String>,
        /// Remove the deadline.
        #[arg(long, conflicts_with = "deadline")]
        clear_deadline: bool,
    },

    /// Mark a task done, or open again if it is already done.
    Toggle {
        /// Task ID, ID prefix or title
        id: String,
    },

    /// Delete a task.
    Delete {
        /// Task ID, ID prefix or title
        id: String,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Launch the terminal user interface.
pub fn cmd_ui<S: KeyValueStore>(store: TaskStore<S>) {
    if let Err(e) = run_tui(store) {
        eprintln!("UI error: {e}");
        std::process::exit(1);
    }
}

/// Add a new task to the list.
pub fn cmd_add<S: KeyValueStore>(
    store: &mut TaskStore<S>,
    title: String,
    desc: Option<String>,
    priority: Priority,
    deadline: Option<String>,
) {
    let title = title.trim().to_string();
    if title.is_empty() {
        eprintln!("Title cannot be empty.");
        std::process::exit(1);
    }
    let deadline = deadline.map(|d| parse_or_exit(&d));

    let id = store.create(title, desc.unwrap_or_default(), priority, deadline);
    report_write(store);
    println!("Added {}", short_id(id));
}

/// Print the derived view for the given filter and search text.
pub fn cmd_list<S: KeyValueStore>(store: &TaskStore<S>, filter: FilterOption, search: String) {
    let query = ViewQuery::new(search, filter);
    let shown = derive_view(store.tasks(), &query);
    if shown.is_empty() {
        if query.search.is_empty() {
            println!("No tasks.");
        } else {
            println!("No tasks match '{}'.", query.search);
        }
        return;
    }
    print_table(&shown);
}

/// View detailed information about a specific task.
pub fn cmd_view<S: KeyValueStore>(store: &TaskStore<S>, id: String) {
    let task_id = resolve_or_exit(store, &id);
    let Some(task) = store.get(task_id) else {
        eprintln!("Task {} not found.", task_id);
        std::process::exit(1);
    };
    let now = Utc::now();
    println!("ID:           {}", task.id);
    println!("Title:        {}", task.title);
    println!("Status:       {}", if task.completed { "Done" } else { "Open" });
    println!("Priority:     {}", format_priority(task.priority));
    println!("Created:      {}", format_timestamp(task.created_at));
    println!("Deadline:     {}", match task.deadline {
        Some(d) => format!("{} ({})", format_timestamp(d), format_deadline_relative(Some(d), now)),
        None => "-".into(),
    });
    println!("Overdue:      {}", if task.is_overdue() { "yes" } else { "no" });
    println!("Description:\n{}\n", if task.description.is_empty() { "-" } else { task.description.as_str() });
}

/// Update an existing task's fields.
pub fn cmd_edit<S: KeyValueStore>(
    store: &mut TaskStore<S>,
    id: String,
    title: Option<String>,
    desc: Option<String>,
    priority: Option<Priority>,
    deadline: Option<String>,
    clear_deadline: bool,
) {
    let task_id = resolve_or_exit(store, &id);
    let Some(mut task) = store.get(task_id).cloned() else {
        eprintln!("Task {} not found.", task_id);
        std::process::exit(1);
    };

    if let Some(title) = title {
        let title = title.trim().to_string();
        if title.is_empty() {
            eprintln!("Title cannot be empty.");
            std::process::exit(1);
        }
        task.title = title;
    }
    if let Some(desc) = desc {
        task.description = desc;
    }
    if let Some(priority) = priority {
        task.priority = priority;
    }
    if let Some(d) = deadline {
        task.deadline = Some(parse_or_exit(&d));
    }
    if clear_deadline {
        task.deadline = None;
    }

    store.update(task);
    report_write(store);
    println!("Updated {}", short_id(task_id));
}

/// Flip the completion flag of a task.
pub fn cmd_toggle<S: KeyValueStore>(store: &mut TaskStore<S>, id: String) {
    let task_id = resolve_or_exit(store, &id);
    store.toggle_completion(task_id);
    report_write(store);
    let done = store.get(task_id).map(|t| t.completed).unwrap_or(false);
    println!("{} {}", if done { "Completed" } else { "Reopened" }, short_id(task_id));
}

/// Delete a task.
pub fn cmd_delete<S: KeyValueStore>(store: &mut TaskStore<S>, id: String) {
    let task_id = resolve_or_exit(store, &id);
    store.delete(task_id);
    report_write(store);
    println!("Deleted {}", short_id(task_id));
}

/// Print a completion script for the given shell.
pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

fn resolve_or_exit<S: KeyValueStore>(store: &TaskStore<S>, id: &str) -> Uuid {
    match resolve_task_identifier(id, store.tasks()) {
        Ok(id) => id,
        Err(e) => {
            eprintln!("Error resolving task: {}", e);
            std::process::exit(1);
        }
    }
}

fn parse_or_exit(input: &str) -> chrono::DateTime<Utc> {
    match parse_deadline_input(input) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

/// The store keeps going when a write fails; the CLI exits right after, so say so.
fn report_write<S: KeyValueStore>(store: &TaskStore<S>) {
    if let Some(e) = store.write_error() {
        eprintln!("Warning: change not saved: {e}");
    }
}
