//! Category, day and date-range filters plus the chronological sort used by
//! the list views.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::models::Task;
use crate::status::{date_key, key_of};

/// Category selection of the sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Named(String),
}

impl CategoryFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Named(name) => task.category() == name,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::All => "All",
            Self::Named(name) => name,
        }
    }
}

/// Optional start and end bounds, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Undated tasks only pass an unbounded range. A dated task is compared at
    /// the start of its day; the end bound reaches through 23:59:59.999.
    pub fn contains(&self, task: &Task) -> bool {
        let Some(date) = task.date else {
            return self.is_unbounded();
        };
        let at = date.and_time(NaiveTime::MIN);
        if let Some(start) = self.start {
            if at < start.and_time(NaiveTime::MIN) {
                return false;
            }
        }
        if let Some(end) = self.end {
            if let Some(end_of_day) = end.and_hms_milli_opt(23, 59, 59, 999) {
                if at > end_of_day {
                    return false;
                }
            }
        }
        true
    }
}

/// Sort key of a dated task; a missing time counts as the start of the day.
fn moment(task: &Task) -> Option<NaiveDateTime> {
    task.date.map(|d| d.and_time(task.time.unwrap_or(NaiveTime::MIN)))
}

/// Orders by `(date, time)` with undated tasks last.
pub fn chronological(a: &Task, b: &Task) -> Ordering {
    match (moment(a), moment(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable chronological sort; ties keep their input order.
pub fn sort_chronologically(tasks: &mut [&Task]) {
    tasks.sort_by(|a, b| chronological(a, b));
}

/// Tasks on exactly `day` that match `category`, in collection order.
pub fn day_view<'a>(tasks: &'a [Task], day: NaiveDate, category: &CategoryFilter) -> Vec<&'a Task> {
    let key = key_of(day);
    tasks
        .iter()
        .filter(|t| category.matches(t))
        .filter(|t| date_key(t).as_deref() == Some(key.as_str()))
        .collect()
}

/// Tasks within `range` that match `category`, sorted chronologically.
pub fn range_view<'a>(tasks: &'a [Task], range: &DateRange, category: &CategoryFilter) -> Vec<&'a Task> {
    let mut out: Vec<&Task> = tasks
        .iter()
        .filter(|t| category.matches(t))
        .filter(|t| range.contains(t))
        .collect();
    sort_chronologically(&mut out);
    out
}

/// Distinct effective categories, sorted.
pub fn categories(tasks: &[Task]) -> Vec<String> {
    tasks
        .iter()
        .map(|t| t.category().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Number of tasks a category entry of the sidebar stands for.
pub fn category_count(tasks: &[Task], filter: &CategoryFilter) -> usize {
    tasks.iter().filter(|t| filter.matches(t)).count()
}
