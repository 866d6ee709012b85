//! Task form handling for the terminal user interface.
//!
//! This module provides the `TaskForm` structure used by both the add and edit
//! screens, including field ordering and conversion of the typed values into
//! task fields.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
    error::DeadlineError,
    fields::Priority,
    task::Task,
    tui::input::InputField,
    util::{format_deadline_input, parse_deadline_input},
};

/// Field order for form navigation.
pub const TITLE_ORDER: usize = 0;
pub const DESCRIPTION_ORDER: usize = 1;
pub const DEADLINE_ORDER: usize = 2;
pub const PRIORITY_ORDER: usize = 3;
pub const FIELD_COUNT: usize = 4;

/// Values read back from a submitted form.
#[derive(Debug, Clone, PartialEq)]
pub struct FormValues {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub deadline: Option<DateTime<Utc>>,
}

/// Reasons a form cannot be saved yet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Title is required")]
    EmptyTitle,
    #[error(transparent)]
    Deadline(#[from] DeadlineError),
}

/// Task form for editing fields
pub struct TaskForm {
    pub title: InputField,
    pub description: InputField,
    pub deadline: InputField,
    pub priority: usize,
    pub current_field: usize,
    pub priorities: Vec<Priority>,
    /// Deadline of the task being edited and the text it was shown as.
    /// Kept so an untouched deadline is saved back at full precision.
    loaded_deadline: Option<(Option<DateTime<Utc>>, String)>,
}

impl TaskForm {
    /// Create an empty form with medium priority selected.
    pub fn new() -> Self {
        let priorities = Priority::ALL.to_vec();
        let priority = priorities
            .iter()
            .position(|&p| p == Priority::default())
            .unwrap_or(0);
        let mut form = Self {
            title: InputField::new(),
            description: InputField::new(),
            deadline: InputField::new(),
            priority,
            current_field: TITLE_ORDER,
            priorities,
            loaded_deadline: None,
        };
        form.update_active_field();
        form
    }

    /// Create a task form populated from an existing task.
    pub fn from_task(task: &Task) -> Self {
        let mut form = Self::new();
        form.title = InputField::with_value(&task.title);
        form.description = InputField::with_value(&task.description);
        let deadline_text = format_deadline_input(task.deadline);
        form.deadline = InputField::with_value(&deadline_text);
        form.loaded_deadline = Some((task.deadline, deadline_text));
        form.priority = form
            .priorities
            .iter()
            .position(|&p| p == task.priority)
            .unwrap_or(form.priority);
        form.update_active_field();
        form
    }

    /// The priority currently selected.
    pub fn selected_priority(&self) -> Priority {
        self.priorities
            .get(self.priority)
            .copied()
            .unwrap_or_default()
    }

    /// Whether the form has the minimum needed to save.
    pub fn can_submit(&self) -> bool {
        !self.title.value.trim().is_empty()
    }

    /// Read the typed values, validating the title and deadline.
    pub fn values(&self) -> Result<FormValues, FormError> {
        if !self.can_submit() {
            return Err(FormError::EmptyTitle);
        }
        let deadline_text = self.deadline.value.trim();
        let deadline = match &self.loaded_deadline {
            Some((loaded, shown)) if shown.trim() == deadline_text => *loaded,
            _ if deadline_text.is_empty() => None,
            _ => Some(parse_deadline_input(deadline_text)?),
        };
        Ok(FormValues {
            title: self.title.value.trim().to_string(),
            description: self.description.value.clone(),
            priority: self.selected_priority(),
            deadline,
        })
    }

    fn active_input(&mut self) -> Option<&mut InputField> {
        match self.current_field {
            TITLE_ORDER => Some(&mut self.title),
            DESCRIPTION_ORDER => Some(&mut self.description),
            DEADLINE_ORDER => Some(&mut self.deadline),
            _ => None,
        }
    }

    /// Move to the next field in the form.
    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % FIELD_COUNT;
        self.update_active_field();
    }

    /// Move to the previous field in the form.
    pub fn prev_field(&mut self) {
        self.current_field = if self.current_field == 0 {
            FIELD_COUNT - 1
        } else {
            self.current_field - 1
        };
        self.update_active_field();
    }

    /// Update which field is currently active for editing.
    pub fn update_active_field(&mut self) {
        self.title.active = self.current_field == TITLE_ORDER;
        self.description.active = self.current_field == DESCRIPTION_ORDER;
        self.deadline.active = self.current_field == DEADLINE_ORDER;
    }

    /// Handle character input for the currently active field.
    pub fn handle_char(&mut self, c: char) {
        if let Some(field) = self.active_input() {
            field.handle_char(c);
        }
    }

    /// Handle backspace input for the currently active field.
    pub fn handle_backspace(&mut self) {
        if let Some(field) = self.active_input() {
            field.handle_backspace();
        }
    }

    /// Handle delete input for the currently active field.
    pub fn handle_delete(&mut self) {
        if let Some(field) = self.active_input() {
            field.handle_delete();
        }
    }

    /// Handle left/right arrow keys for cursor movement or selector changes.
    pub fn handle_left_right(&mut self, right: bool) {
        if self.current_field == PRIORITY_ORDER {
            let len = self.priorities.len();
            self.priority = if right {
                (self.priority + 1) % len
            } else if self.priority == 0 {
                len - 1
            } else {
                self.priority - 1
            };
            return;
        }
        if let Some(field) = self.active_input() {
            if right {
                field.move_cursor_right();
            } else {
                field.move_cursor_left();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_form_defaults_to_medium() {
        let form = TaskForm::new();
        assert_eq!(form.selected_priority(), Priority::Medium);
        assert!(form.title.active);
        assert!(!form.can_submit());
        assert_eq!(form.values(), Err(FormError::EmptyTitle));
    }

    #[test]
    fn test_blank_title_cannot_submit() {
        let mut form = TaskForm::new();
        for c in "   ".chars() {
            form.handle_char(c);
        }
        assert!(!form.can_submit());
    }

    #[test]
    fn test_values_from_typed_input() {
        let mut form = TaskForm::new();
        for c in "Buy milk".chars() {
            form.handle_char(c);
        }
        form.next_field();
        for c in "2 litres".chars() {
            form.handle_char(c);
        }
        form.next_field();
        form.next_field();
        assert_eq!(form.current_field, PRIORITY_ORDER);
        form.handle_left_right(true);

        let values = form.values().unwrap();
        assert_eq!(values.title, "Buy milk");
        assert_eq!(values.description, "2 litres");
        assert_eq!(values.priority, Priority::High);
        assert!(values.deadline.is_none());
    }

    #[test]
    fn test_bad_deadline_is_reported() {
        let mut form = TaskForm::new();
        form.handle_char('x');
        form.current_field = DEADLINE_ORDER;
        form.update_active_field();
        for c in "someday".chars() {
            form.handle_char(c);
        }
        assert!(matches!(form.values(), Err(FormError::Deadline(_))));
    }

    #[test]
    fn test_from_task_round_trips_fields() {
        let mut task = Task::new("Report", "weekly", Priority::Low, None);
        task.deadline = Some(parse_deadline_input("2026-06-01 17:45").unwrap());
        let form = TaskForm::from_task(&task);
        let values = form.values().unwrap();
        assert_eq!(values.title, "Report");
        assert_eq!(values.description, "weekly");
        assert_eq!(values.priority, Priority::Low);
        assert_eq!(values.deadline, task.deadline);
    }

    #[test]
    fn test_untouched_deadline_keeps_seconds() {
        let deadline = Utc::now() + chrono::Duration::seconds(3 * 3600 + 27);
        let task = Task::new("Report", "", Priority::Low, Some(deadline));
        let mut form = TaskForm::from_task(&task);
        for c in " v2".chars() {
            form.handle_char(c);
        }
        let values = form.values().unwrap();
        assert_eq!(values.title, "Report v2");
        assert_eq!(values.deadline, Some(deadline));
    }

    #[test]
    fn test_retyped_deadline_is_parsed() {
        let deadline = Utc::now() + chrono::Duration::seconds(90);
        let task = Task::new("Report", "", Priority::Low, Some(deadline));
        let mut form = TaskForm::from_task(&task);
        form.current_field = DEADLINE_ORDER;
        form.update_active_field();
        for _ in 0..form.deadline.value.chars().count() {
            form.handle_backspace();
        }
        for c in "2026-06-01 17:45".chars() {
            form.handle_char(c);
        }
        let expected = parse_deadline_input("2026-06-01 17:45").unwrap();
        assert_eq!(form.values().unwrap().deadline, Some(expected));

        for _ in 0..form.deadline.value.chars().count() {
            form.handle_backspace();
        }
        assert_eq!(form.values().unwrap().deadline, None);
    }

    #[test]
    fn test_priority_selector_wraps() {
        let mut form = TaskForm::new();
        form.current_field = PRIORITY_ORDER;
        form.handle_left_right(false);
        assert_eq!(form.selected_priority(), Priority::Low);
        form.handle_left_right(false);
        assert_eq!(form.selected_priority(), Priority::High);
    }
}
