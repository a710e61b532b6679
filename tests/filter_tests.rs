use chrono::{NaiveDate, NaiveTime};
use taskal::filter::{
    categories, category_count, day_view, range_view, sort_chronologically, CategoryFilter, DateRange,
};
use taskal::models::{Task, TaskStatus, DEFAULT_CATEGORY};
use uuid::Uuid;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn task(title: &str, day: Option<&str>, time: Option<&str>, category: Option<&str>) -> Task {
    Task {
        id: Uuid::new_v4(),
        title: title.into(),
        date: day.map(date),
        time: time.map(|t| NaiveTime::parse_from_str(t, "%H:%M").unwrap()),
        status: TaskStatus::Pending,
        category: category.map(String::from),
        assignee: None,
        client: None,
        contract: None,
        comment: None,
        documents: Vec::new(),
    }
}

fn titles(tasks: &[&Task]) -> Vec<String> {
    tasks.iter().map(|t| t.title.clone()).collect()
}

#[test]
fn test_range_keeps_only_dates_inside() {
    let tasks = vec![
        task("feb", Some("2024-02-28"), None, None),
        task("early march", Some("2024-03-05"), None, None),
        task("mid march", Some("2024-03-15"), None, None),
    ];
    let range = DateRange::new(Some(date("2024-03-01")), Some(date("2024-03-10")));

    let view = range_view(&tasks, &range, &CategoryFilter::All);
    assert_eq!(titles(&view), vec!["early march"]);
}

#[test]
fn test_range_bounds_are_inclusive() {
    let tasks = vec![
        task("start", Some("2024-03-01"), Some("00:00"), None),
        task("end", Some("2024-03-10"), Some("23:59"), None),
    ];
    let range = DateRange::new(Some(date("2024-03-01")), Some(date("2024-03-10")));
    assert_eq!(range_view(&tasks, &range, &CategoryFilter::All).len(), 2);
}

#[test]
fn test_undated_tasks_only_in_unbounded_range() {
    let tasks = vec![task("someday", None, None, None), task("dated", Some("2024-03-05"), None, None)];

    let all = range_view(&tasks, &DateRange::default(), &CategoryFilter::All);
    assert_eq!(titles(&all), vec!["dated", "someday"]);

    let from = DateRange::new(Some(date("2024-01-01")), None);
    assert_eq!(titles(&range_view(&tasks, &from, &CategoryFilter::All)), vec!["dated"]);
}

#[test]
fn test_sort_is_chronological_and_stable() {
    let tasks = vec![
        task("undated", None, None, None),
        task("afternoon", Some("2024-03-05"), Some("14:00"), None),
        task("no time", Some("2024-03-05"), None, None),
        task("morning", Some("2024-03-05"), Some("09:00"), None),
        task("tie a", Some("2024-03-06"), Some("09:00"), None),
        task("tie b", Some("2024-03-06"), Some("09:00"), None),
    ];
    let mut refs: Vec<&Task> = tasks.iter().collect();
    sort_chronologically(&mut refs);

    assert_eq!(
        titles(&refs),
        vec!["no time", "morning", "afternoon", "tie a", "tie b", "undated"]
    );
}

#[test]
fn test_day_view_filters_by_category() {
    let tasks = vec![
        task("billing", Some("2024-03-15"), Some("10:00"), Some("Billing")),
        task("default", Some("2024-03-15"), Some("09:00"), None),
        task("other day", Some("2024-03-16"), None, Some("Billing")),
    ];
    let day = date("2024-03-15");

    assert_eq!(titles(&day_view(&tasks, day, &CategoryFilter::All)), vec!["billing", "default"]);
    let billing = CategoryFilter::Named("Billing".into());
    assert_eq!(titles(&day_view(&tasks, day, &billing)), vec!["billing"]);
    let general = CategoryFilter::Named(DEFAULT_CATEGORY.into());
    assert_eq!(titles(&day_view(&tasks, day, &general)), vec!["default"]);
}

#[test]
fn test_categories_are_distinct_and_counted() {
    let tasks = vec![
        task("a", None, None, Some("Billing")),
        task("b", None, None, None),
        task("c", None, None, Some("Billing")),
    ];

    assert_eq!(categories(&tasks), vec!["Billing".to_string(), DEFAULT_CATEGORY.to_string()]);
    assert_eq!(category_count(&tasks, &CategoryFilter::All), 3);
    assert_eq!(category_count(&tasks, &CategoryFilter::Named("Billing".into())), 2);
    assert_eq!(CategoryFilter::All.label(), "All");
}
