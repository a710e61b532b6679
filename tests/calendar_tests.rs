use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use taskal::calendar::{
    day_markers, leading_blanks, month_buckets, tasks_for_day, CalendarState, Marker, WeekStart,
};
use taskal::models::{Task, TaskStatus};
use uuid::Uuid;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn task(title: &str, day: &str, time: Option<&str>, status: TaskStatus) -> Task {
    Task {
        id: Uuid::new_v4(),
        title: title.into(),
        date: Some(date(day)),
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

fn noon(day: &str) -> NaiveDateTime {
    date(day).and_hms_opt(12, 0, 0).unwrap()
}

#[test]
fn test_next_month_clamps_day() {
    let mut cal = CalendarState::new(date("2024-01-31"));
    cal.next_month();
    assert_eq!(cal.selected, date("2024-02-29"));
    cal.next_month();
    assert_eq!(cal.selected, date("2024-03-29"));
    cal.prev_month();
    cal.prev_month();
    assert_eq!(cal.selected, date("2024-01-29"));
}

#[test]
fn test_month_navigation_does_not_move_tasks() {
    let tasks = vec![task("Year end", "2024-01-31", None, TaskStatus::Pending)];
    let mut cal = CalendarState::new(date("2024-01-31"));
    cal.next_month();
    cal.next_month();
    assert_eq!((cal.year(), cal.month()), (2024, 3));

    let march = month_buckets(cal.year(), cal.month(), &tasks, noon("2024-03-01"));
    assert!(march.iter().all(|b| b.tasks.is_empty()));

    let january = month_buckets(2024, 1, &tasks, noon("2024-03-01"));
    assert_eq!(january[30].tasks.len(), 1);
    assert_eq!(tasks[0].date, Some(date("2024-01-31")));
}

#[test]
fn test_buckets_cover_every_day_in_order() {
    let tasks = vec![
        task("b", "2024-02-10", Some("15:00"), TaskStatus::Pending),
        task("a", "2024-02-10", Some("08:00"), TaskStatus::Pending),
        task("other month", "2024-03-10", None, TaskStatus::Pending),
    ];
    let buckets = month_buckets(2024, 2, &tasks, noon("2024-02-01"));

    assert_eq!(buckets.len(), 29);
    assert_eq!(buckets[0].day(), 1);
    assert_eq!(buckets[28].day(), 29);
    // Collection order, not time order, within a day.
    let titles: Vec<&str> = buckets[9].tasks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["b", "a"]);
    let total: usize = buckets.iter().map(|b| b.tasks.len()).sum();
    assert_eq!(total, 2);
}

#[test]
fn test_markers_follow_precedence() {
    let tasks = vec![
        task("late", "2024-03-15", Some("09:00"), TaskStatus::Pending),
        task("done", "2024-03-15", Some("08:00"), TaskStatus::Completed),
        task("later", "2024-03-15", Some("18:00"), TaskStatus::Pending),
    ];
    let day = tasks_for_day(&tasks, 2024, 3, 15);
    let markers = day_markers(&day, noon("2024-03-15"));

    assert_eq!(markers.dominant(), Some(Marker::Overdue));
    assert_eq!(markers.all(), vec![Marker::Overdue, Marker::Completed, Marker::Other]);

    let done_only = day_markers(&day[1..2], noon("2024-03-15"));
    assert_eq!(done_only.dominant(), Some(Marker::Completed));
    assert_eq!(day_markers(&[], noon("2024-03-15")).dominant(), None);
}

#[test]
fn test_tasks_for_invalid_day_is_empty() {
    let tasks = vec![task("x", "2024-03-01", None, TaskStatus::Pending)];
    assert!(tasks_for_day(&tasks, 2024, 2, 30).is_empty());
    assert_eq!(tasks_for_day(&tasks, 2024, 3, 1).len(), 1);
}

#[test]
fn test_leading_blanks_by_week_start() {
    // 1 March 2024 is a Friday.
    assert_eq!(leading_blanks(2024, 3, WeekStart::Sunday), 5);
    assert_eq!(leading_blanks(2024, 3, WeekStart::Monday), 4);
    assert_eq!(WeekStart::Monday.labels()[0], "Mo");
}

#[test]
fn test_select_day_and_shift() {
    let mut cal = CalendarState::new(date("2024-02-10"));
    assert!(cal.select_day(29));
    assert!(!cal.select_day(30));
    assert_eq!(cal.selected, date("2024-02-29"));

    cal.shift_days(1);
    assert_eq!(cal.selected, date("2024-03-01"));
    cal.shift_days(-7);
    assert_eq!(cal.selected, date("2024-02-23"));
    assert!(CalendarState::is_weekend(date("2024-02-24")));
    assert!(!CalendarState::is_weekend(date("2024-02-23")));
}
