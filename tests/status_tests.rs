use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use taskal::models::{Task, TaskStatus};
use taskal::status::{date_key, display_status, is_overdue, DisplayStatus};
use uuid::Uuid;

fn task(date: Option<&str>, time: Option<&str>, status: TaskStatus) -> Task {
    Task {
        id: Uuid::new_v4(),
        title: "Call client".into(),
        date: date.map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()),
        time: time.map(|t| NaiveTime::parse_from_str(t, "%H:%M").unwrap()),
        status,
        category: None,
        assignee: None,
        client: None,
        contract: None,
        comment: None,
        documents: Vec::new(),
    }
}

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
}

#[test]
fn test_pending_task_past_its_time_is_overdue() {
    let t = task(Some("2024-03-15"), Some("09:00"), TaskStatus::Pending);
    let now = at("2024-03-15T10:00:00");

    assert!(is_overdue(&t, now));
    assert_eq!(display_status(&t, now), DisplayStatus::Overdue);
    assert_eq!(display_status(&t, now).label(), "Overdue");
}

#[test]
fn test_completed_task_is_never_overdue() {
    let t = task(Some("2024-03-15"), Some("09:00"), TaskStatus::Completed);
    let now = at("2024-03-15T10:00:00");

    assert!(!is_overdue(&t, now));
    assert_eq!(display_status(&t, now), DisplayStatus::Completed);
}

#[test]
fn test_cancelled_task_shows_cancelled() {
    let t = task(Some("2024-03-15"), Some("09:00"), TaskStatus::Cancelled);
    let now = at("2024-03-15T10:00:00");

    assert!(is_overdue(&t, now));
    assert_eq!(display_status(&t, now), DisplayStatus::Cancelled);
}

#[test]
fn test_overdue_needs_date_and_time() {
    let now = at("2024-03-15T10:00:00");
    let date_only = task(Some("2020-01-01"), None, TaskStatus::Pending);
    let time_only = task(None, Some("08:00"), TaskStatus::Pending);

    assert!(!is_overdue(&date_only, now));
    assert!(!is_overdue(&time_only, now));
    assert_eq!(display_status(&date_only, now), DisplayStatus::Pending);
}

#[test]
fn test_due_exactly_now_is_not_overdue() {
    let t = task(Some("2024-03-15"), Some("10:00"), TaskStatus::Pending);
    assert!(!is_overdue(&t, at("2024-03-15T10:00:00")));
    assert!(is_overdue(&t, at("2024-03-15T10:00:01")));
}

#[test]
fn test_date_key_is_zero_padded() {
    let t = task(Some("2024-03-05"), None, TaskStatus::Pending);
    assert_eq!(date_key(&t).as_deref(), Some("2024-03-05"));
    assert_eq!(date_key(&task(None, None, TaskStatus::Pending)), None);
}

#[test]
fn test_date_key_ignores_time() {
    let morning = task(Some("2024-03-15"), Some("00:00"), TaskStatus::Pending);
    let night = task(Some("2024-03-15"), Some("23:59"), TaskStatus::Pending);
    let none = task(Some("2024-03-15"), None, TaskStatus::Pending);
    assert_eq!(date_key(&morning), date_key(&night));
    assert_eq!(date_key(&morning), date_key(&none));
}
