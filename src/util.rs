//! Utility functions for deadline parsing, formatting and task lookup.
//!
//! Shared by the command handlers and the TUI.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use uuid::Uuid;

use crate::error::{DeadlineError, ResolveError};
use crate::fields::format_priority;
use crate::task::Task;

/// Characters of the id shown in tables.
pub const SHORT_ID_LEN: usize = 8;

/// Parse human-readable deadline input relative to the current local time.
///
/// Supports:
/// - "today", "tomorrow" (end of that day, 23:59)
/// - "in 3h", "in 2d", "in 1w"
/// - "YYYY-MM-DD" (23:59 local)
/// - "YYYY-MM-DD HH:MM" (local)
pub fn parse_deadline_input(s: &str) -> Result<DateTime<Utc>, DeadlineError> {
    parse_deadline_input_at(s, Local::now())
}

/// Deadline parsing against an explicit local "now".
pub fn parse_deadline_input_at(
    s: &str,
    now: DateTime<Local>,
) -> Result<DateTime<Utc>, DeadlineError> {
    let input = s.trim().to_lowercase();
    let bad = || DeadlineError(s.trim().to_string());
    let today = now.date_naive();

    match input.as_str() {
        "today" => return end_of_day(today).ok_or_else(bad),
        "tomorrow" => return end_of_day(today + Duration::days(1)).ok_or_else(bad),
        _ => {}
    }

    // "in X" patterns
    if let Some(rest) = input.strip_prefix("in ") {
        let rest = rest.trim();
        let unit = rest.chars().last().ok_or_else(bad)?;
        let amount = &rest[..rest.len() - unit.len_utf8()];
        let amount: i64 = amount.trim().parse().map_err(|_| bad())?;
        let offset = match unit {
            'h' => Duration::try_hours(amount),
            'd' => Duration::try_days(amount),
            'w' => Duration::try_weeks(amount),
            _ => None,
        };
        return offset
            .and_then(|offset| now.checked_add_signed(offset))
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(bad);
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(&input, "%Y-%m-%d %H:%M") {
        return local_to_utc(dt).ok_or_else(bad);
    }
    if let Ok(date) = NaiveDate::parse_from_str(&input, "%Y-%m-%d") {
        return end_of_day(date).ok_or_else(bad);
    }
    Err(bad())
}

fn end_of_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    let time = NaiveTime::from_hms_opt(23, 59, 0)?;
    local_to_utc(date.and_time(time))
}

fn local_to_utc(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Format a timestamp in local time for display.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// Format a deadline for editing, in the same shape `parse_deadline_input` accepts.
pub fn format_deadline_input(deadline: Option<DateTime<Utc>>) -> String {
    deadline.map(format_timestamp).unwrap_or_default()
}

/// Format a deadline relative to now ("in 3d", "in 5h", "2d late").
pub fn format_deadline_relative(deadline: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    match deadline {
        None => "-".into(),
        Some(d) => {
            let delta = d - now;
            let (span, late) = if delta < Duration::zero() {
                (-delta, true)
            } else {
                (delta, false)
            };
            let amount = if span.num_days() >= 1 {
                format!("{}d", span.num_days())
            } else if span.num_hours() >= 1 {
                format!("{}h", span.num_hours())
            } else {
                format!("{}m", span.num_minutes())
            };
            if late {
                format!("{amount} late")
            } else {
                format!("in {amount}")
            }
        }
    }
}

/// First characters of a task id, enough to type back on the command line.
pub fn short_id(id: Uuid) -> String {
    id.to_string()[..SHORT_ID_LEN].to_string()
}

/// Resolve a task identifier (full id, id prefix, or title) to a task ID.
/// Returns an error if nothing or more than one task matches.
pub fn resolve_task_identifier(identifier: &str, tasks: &[Task]) -> Result<Uuid, ResolveError> {
    let query = identifier.trim();
    let not_found = || ResolveError::NotFound(query.to_string());
    if query.is_empty() {
        return Err(not_found());
    }

    // Try parsing as a full ID first
    if let Ok(id) = Uuid::parse_str(query) {
        return tasks
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.id)
            .ok_or_else(not_found);
    }

    let lowered = query.to_lowercase();
    let by_prefix: Vec<Uuid> = tasks
        .iter()
        .filter(|t| t.id.to_string().starts_with(&lowered))
        .map(|t| t.id)
        .collect();
    let by_title: Vec<Uuid> = tasks
        .iter()
        .filter(|t| t.title.to_lowercase() == lowered)
        .map(|t| t.id)
        .collect();

    let matches = if by_prefix.is_empty() { by_title } else { by_prefix };
    match matches.len() {
        0 => Err(not_found()),
        1 => Ok(matches[0]),
        count => Err(ResolveError::Ambiguous {
            query: query.to_string(),
            count,
        }),
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

/// Print tasks in a formatted table.
pub fn print_table(tasks: &[&Task]) {
    println!(
        "{:<9} {:<5} {:<7} {:<18} {}",
        "ID", "Done", "Pri", "Deadline", "Title"
    );
    let now = Utc::now();
    for t in tasks {
        let done = if t.completed { "[x]" } else { "[ ]" };
        let mut deadline = format_deadline_relative(t.deadline, now);
        if t.is_overdue_at(now) {
            deadline.push_str(" !");
        }
        println!(
            "{:<9} {:<5} {:<7} {:<18} {}",
            short_id(t.id),
            done,
            format_priority(t.priority),
            truncate(&deadline, 18),
            t.title
        );
    }
}
