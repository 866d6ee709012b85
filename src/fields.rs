//! Enumerations and field types for to-do items.
//!
//! This module defines the structured values used to rank and select tasks:
//! the priority scale and the filter options offered by the list view.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Priority classification for task importance.
///
/// Variants are declared in ascending order so the derived `Ord` ranks
/// `High > Medium > Low`.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq, PartialOrd, Ord,
)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// All priorities, lowest first.
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];
}

/// Which slice of the collection the list view shows.
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum FilterOption {
    #[default]
    All,
    Active,
    Completed,
    Overdue,
}

impl FilterOption {
    /// All filter options in tab order.
    pub const ALL: [FilterOption; 4] = [
        FilterOption::All,
        FilterOption::Active,
        FilterOption::Completed,
        FilterOption::Overdue,
    ];

    /// The option after this one, wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&f| f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// The option before this one, wrapping around.
    pub fn previous(self) -> Self {
        let idx = Self::ALL.iter().position(|&f| f == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Format a priority for display.
pub fn format_priority(p: Priority) -> &'static str {
    match p {
        Priority::Low => "Low",
        Priority::Medium => "Medium",
        Priority::High => "High",
    }
}

/// Format a filter option for display.
pub fn format_filter(f: FilterOption) -> &'static str {
    match f {
        FilterOption::All => "All",
        FilterOption::Active => "Active",
        FilterOption::Completed => "Completed",
        FilterOption::Overdue => "Overdue",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn test_priority_serialises_as_fixed_literals() {
        assert_eq!(serde_json::to_string(&Priority::Low).unwrap(), "\"low\"");
        assert_eq!(serde_json::to_string(&Priority::Medium).unwrap(), "\"medium\"");
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"high\"");
    }

    #[test]
    fn test_filter_cycles() {
        assert_eq!(FilterOption::All.next(), FilterOption::Active);
        assert_eq!(FilterOption::Overdue.next(), FilterOption::All);
        assert_eq!(FilterOption::All.previous(), FilterOption::Overdue);
    }
}
