//! Month calendar: which tasks fall on which day, and how each day is marked.

use std::collections::HashMap;

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::models::Task;
use crate::status::{date_key, day_key, display_status, DisplayStatus};

/// First column of the calendar grid.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    /// Column headers, in grid order.
    pub fn labels(&self) -> [&'static str; 7] {
        match self {
            Self::Sunday => ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"],
            Self::Monday => ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"],
        }
    }
}

/// Number of days in `month` of `year`, or 0 for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return 0;
    };
    match first.checked_add_months(Months::new(1)) {
        Some(next) => next.signed_duration_since(first).num_days() as u32,
        None => 31,
    }
}

/// Empty cells before day 1 in the grid.
pub fn leading_blanks(year: i32, month: u32, week_start: WeekStart) -> u32 {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return 0;
    };
    match week_start {
        WeekStart::Sunday => first.weekday().num_days_from_sunday(),
        WeekStart::Monday => first.weekday().num_days_from_monday(),
    }
}

/// Tasks whose date key equals the key of `(year, month, day)`.
pub fn tasks_for_day(tasks: &[Task], year: i32, month: u32, day: u32) -> Vec<&Task> {
    let Some(key) = day_key(year, month, day) else {
        return Vec::new();
    };
    tasks
        .iter()
        .filter(|t| date_key(t).as_deref() == Some(key.as_str()))
        .collect()
}

/// One marker class of a calendar cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Overdue,
    Completed,
    Other,
}

/// Which kinds of tasks a day holds.
///
/// All flags are computed independently; [`DayMarkers::dominant`] picks one
/// when a cell can only show a single marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DayMarkers {
    pub has_overdue: bool,
    pub has_completed: bool,
    /// Pending (not yet due) or cancelled tasks.
    pub has_other: bool,
}

impl DayMarkers {
    /// Precedence: overdue, then completed, then other.
    pub fn dominant(&self) -> Option<Marker> {
        if self.has_overdue {
            Some(Marker::Overdue)
        } else if self.has_completed {
            Some(Marker::Completed)
        } else if self.has_other {
            Some(Marker::Other)
        } else {
            None
        }
    }

    /// Every applicable marker, in precedence order.
    pub fn all(&self) -> Vec<Marker> {
        let mut out = Vec::with_capacity(3);
        if self.has_overdue { out.push(Marker::Overdue); }
        if self.has_completed { out.push(Marker::Completed); }
        if self.has_other { out.push(Marker::Other); }
        out
    }
}

pub fn day_markers(tasks: &[&Task], now: NaiveDateTime) -> DayMarkers {
    let mut markers = DayMarkers::default();
    for task in tasks {
        match display_status(task, now) {
            DisplayStatus::Overdue => markers.has_overdue = true,
            DisplayStatus::Completed => markers.has_completed = true,
            DisplayStatus::Pending | DisplayStatus::Cancelled => markers.has_other = true,
        }
    }
    markers
}

/// Tasks and markers of one calendar cell.
#[derive(Debug, Clone)]
pub struct DayBucket<'a> {
    pub date: NaiveDate,
    pub tasks: Vec<&'a Task>,
    pub markers: DayMarkers,
}

impl DayBucket<'_> {
    pub fn day(&self) -> u32 {
        self.date.day()
    }
}

/// Buckets `tasks` into the days `1..=days_in_month` of the given month.
///
/// Within a day, tasks keep their collection order.
pub fn month_buckets(year: i32, month: u32, tasks: &[Task], now: NaiveDateTime) -> Vec<DayBucket<'_>> {
    let mut by_key: HashMap<String, Vec<&Task>> = HashMap::new();
    for task in tasks {
        if let Some(key) = date_key(task) {
            by_key.entry(key).or_default().push(task);
        }
    }

    (1..=days_in_month(year, month))
        .filter_map(|day| {
            let date = NaiveDate::from_ymd_opt(year, month, day)?;
            let key = day_key(year, month, day)?;
            let tasks = by_key.remove(&key).unwrap_or_default();
            let markers = day_markers(&tasks, now);
            Some(DayBucket { date, tasks, markers })
        })
        .collect()
}

/// Month shown by the calendar and the day selected in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarState {
    pub selected: NaiveDate,
}

impl CalendarState {
    pub fn new(selected: NaiveDate) -> Self {
        Self { selected }
    }

    pub fn year(&self) -> i32 {
        self.selected.year()
    }

    pub fn month(&self) -> u32 {
        self.selected.month()
    }

    /// Moves one month back. The day clamps to the target month's length.
    pub fn prev_month(&mut self) {
        self.selected = self
            .selected
            .checked_sub_months(Months::new(1))
            .unwrap_or(self.selected);
    }

    /// Moves one month forward. Jan 31 becomes Feb 28/29, never early March.
    pub fn next_month(&mut self) {
        self.selected = self
            .selected
            .checked_add_months(Months::new(1))
            .unwrap_or(self.selected);
    }

    /// Selects `day` of the displayed month; out-of-range days are ignored.
    pub fn select_day(&mut self, day: u32) -> bool {
        match self.selected.with_day(day) {
            Some(date) => {
                self.selected = date;
                true
            }
            None => false,
        }
    }

    /// Moves the selection by `days`, crossing month boundaries as needed.
    pub fn shift_days(&mut self, days: i64) {
        if let Some(date) = self
            .selected
            .checked_add_signed(chrono::Duration::days(days))
        {
            self.selected = date;
        }
    }

    pub fn today(&mut self, today: NaiveDate) {
        self.selected = today;
    }

    pub fn is_weekend(date: NaiveDate) -> bool {
        matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 4), 30);
        assert_eq!(days_in_month(2024, 12), 31);
        assert_eq!(days_in_month(2024, 13), 0);
    }

    #[test]
    fn blanks_depend_on_week_start() {
        // 2024-09-01 is a Sunday.
        assert_eq!(leading_blanks(2024, 9, WeekStart::Sunday), 0);
        assert_eq!(leading_blanks(2024, 9, WeekStart::Monday), 6);
    }

    #[test]
    fn dominant_marker_precedence() {
        let m = DayMarkers { has_overdue: true, has_completed: true, has_other: true };
        assert_eq!(m.dominant(), Some(Marker::Overdue));
        assert_eq!(m.all().len(), 3);
        let m = DayMarkers { has_overdue: false, has_completed: true, has_other: true };
        assert_eq!(m.dominant(), Some(Marker::Completed));
        assert_eq!(DayMarkers::default().dominant(), None);
    }
}
