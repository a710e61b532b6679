use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use crate::models::{Task, TaskStatus};

/// Status as shown to the user. Unlike [`TaskStatus`] it includes `Overdue`,
/// which is computed from the clock and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayStatus {
    Pending,
    Completed,
    Cancelled,
    Overdue,
}

impl DisplayStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Completed => "Done",
            Self::Cancelled => "Cancelled",
            Self::Overdue => "Overdue",
        }
    }
}

/// Canonical `YYYY-MM-DD` key of a task's day, built from calendar fields only.
///
/// Undated tasks have no key and never match a day.
pub fn date_key(task: &Task) -> Option<String> {
    task.date.map(key_of)
}

/// Canonical key of a calendar cell. `None` for dates that do not exist.
pub fn day_key(year: i32, month: u32, day: u32) -> Option<String> {
    NaiveDate::from_ymd_opt(year, month, day).map(key_of)
}

pub fn key_of(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// A task is overdue when it has both a date and a time, that moment is
/// strictly before `now`, and it is not completed.
///
/// Date-only tasks are never overdue, however old.
pub fn is_overdue(task: &Task, now: NaiveDateTime) -> bool {
    match task.due_at() {
        Some(due) => due < now && task.status != TaskStatus::Completed,
        None => false,
    }
}

/// Resolves the status label for a task at `now`.
pub fn display_status(task: &Task, now: NaiveDateTime) -> DisplayStatus {
    match task.status {
        TaskStatus::Completed => DisplayStatus::Completed,
        TaskStatus::Cancelled => DisplayStatus::Cancelled,
        TaskStatus::Pending if is_overdue(task, now) => DisplayStatus::Overdue,
        TaskStatus::Pending => DisplayStatus::Pending,
    }
}

/// Parses a date typed by the user or carried in a timestamp.
///
/// Only the leading `YYYY-MM-DD` is read, so `2024-03-15T23:30:00-05:00`
/// stays on the 15th whatever the offset says.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    let head = input.get(..10)?;
    match input.as_bytes().get(10) {
        None | Some(b'T') | Some(b't') | Some(b' ') => {}
        Some(_) => return None,
    }
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// Parses `HH:MM` or `HH:MM:SS`.
pub fn parse_time(input: &str) -> Option<NaiveTime> {
    let input = input.trim();
    NaiveTime::parse_from_str(input, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M:%S"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_ignores_offset() {
        let d = parse_date("2024-03-15T23:30:00-05:00").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        let d = parse_date("2024-03-15T00:30:00+14:00").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert!(parse_date("").is_none());
        assert!(parse_date("15/03/2024").is_none());
        assert!(parse_date("2024-02-30").is_none());
        assert!(parse_date("2024-03-150").is_none());
    }

    #[test]
    fn parse_time_accepts_seconds() {
        assert_eq!(parse_time("09:00"), NaiveTime::from_hms_opt(9, 0, 0));
        assert_eq!(parse_time("17:45:30"), NaiveTime::from_hms_opt(17, 45, 30));
        assert!(parse_time("25:00").is_none());
    }

    #[test]
    fn day_key_rejects_impossible_days() {
        assert_eq!(day_key(2024, 2, 29).as_deref(), Some("2024-02-29"));
        assert!(day_key(2023, 2, 29).is_none());
    }
}
