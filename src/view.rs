//! Derivation of the displayed task list.
//!
//! A view is recomputed from scratch on every call: search, then filter, then
//! sort by priority (high first) and creation time (newest first). Tasks that
//! tie on both keys keep their insertion order.

use chrono::{DateTime, Utc};

use crate::fields::FilterOption;
use crate::task::Task;

/// The UI-controlled inputs to a derived view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewQuery {
    pub search: String,
    pub filter: FilterOption,
}

impl ViewQuery {
    pub fn new(search: impl Into<String>, filter: FilterOption) -> Self {
        ViewQuery {
            search: search.into(),
            filter,
        }
    }
}

/// Derive the displayed tasks using the current time for overdue checks.
pub fn derive_view<'a>(tasks: &'a [Task], query: &ViewQuery) -> Vec<&'a Task> {
    derive_view_at(tasks, query, Utc::now())
}

/// Derive the displayed tasks against an explicit reference instant.
pub fn derive_view_at<'a>(
    tasks: &'a [Task],
    query: &ViewQuery,
    now: DateTime<Utc>,
) -> Vec<&'a Task> {
    let needle = query.search.to_lowercase();

    let mut shown: Vec<&Task> = tasks
        .iter()
        .filter(|t| needle.is_empty() || matches_search(t, &needle))
        .filter(|t| match query.filter {
            FilterOption::All => true,
            FilterOption::Active => !t.completed,
            FilterOption::Completed => t.completed,
            FilterOption::Overdue => t.is_overdue_at(now),
        })
        .collect();

    // Stable sort, so full ties stay in insertion order.
    shown.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then(b.created_at.cmp(&a.created_at))
    });
    shown
}

/// Case-insensitive containment on title or description. `needle` must already be lowercase.
fn matches_search(task: &Task, needle: &str) -> bool {
    task.title.to_lowercase().contains(needle) || task.description.to_lowercase().contains(needle)
}
