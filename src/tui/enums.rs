//! Enumerations for TUI state management.

/// Application state for the terminal user interface.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum AppState {
    TaskList,
    TaskDetail,
    AddTask,
    EditTask,
    Help,
    Confirm,
}

/// Input mode for the task list: browsing rows or typing a search.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum InputMode {
    None,
    Search,
}
