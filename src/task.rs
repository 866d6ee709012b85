//! Task data structure and related functionality.
//!
//! This module defines the core `Task` struct that represents a single to-do item,
//! along with the seed data shown on first launch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::fields::Priority;

/// A single to-do item.
///
/// `id` and `created_at` are fixed when the task is created and never change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: Priority,
}

impl Task {
    /// Build a fresh, incomplete task stamped with the current time.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        priority: Priority,
        deadline: Option<DateTime<Utc>>,
    ) -> Self {
        Task {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            completed: false,
            created_at: Utc::now(),
            deadline,
            priority,
        }
    }

    /// Whether the task is past its deadline and still open.
    pub fn is_overdue(&self) -> bool {
        self.is_overdue_at(Utc::now())
    }

    /// Overdue check against an explicit reference instant.
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        match self.deadline {
            Some(deadline) if !self.completed => deadline < now,
            _ => false,
        }
    }
}

/// The tasks shown when no saved list exists yet.
pub fn example_tasks() -> Vec<Task> {
    vec![
        Task::new("Yağ Al", "Eve gelirken aldi den al", Priority::High, None),
        Task::new("Job Center", "Cuma Job Center'de randevuna git", Priority::Medium, None),
        Task::new("Bulaşık", "Bulaşıkları Yıka", Priority::Low, None),
    ]
}
