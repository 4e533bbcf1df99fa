use chrono::{Datelike, Days, NaiveDate};

use crate::adapter::ContainerAdapter;
use crate::model::{Task, WeekStart};

/// Day columns of a calendar. Tasks are placed by their scheduled date;
/// unscheduled tasks and tasks outside the window are not shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarAdapter {
    start: NaiveDate,
    days: u32,
}

impl CalendarAdapter {
    /// A window of `days` consecutive days starting at `start`
    pub fn new(start: NaiveDate, days: u32) -> Self {
        CalendarAdapter {
            start,
            days: days.max(1),
        }
    }

    /// The week containing `date`
    pub fn week_of(date: NaiveDate, week_start: WeekStart) -> Self {
        let offset = match week_start {
            WeekStart::Monday => date.weekday().num_days_from_monday(),
            WeekStart::Sunday => date.weekday().num_days_from_sunday(),
        };
        let start = date
            .checked_sub_days(Days::new(u64::from(offset)))
            .unwrap_or(date);
        CalendarAdapter::new(start, 7)
    }

    /// The calendar month containing `date`
    pub fn month_of(date: NaiveDate) -> Self {
        let start = date.with_day(1).unwrap_or(date);
        let next = start
            .checked_add_months(chrono::Months::new(1))
            .unwrap_or(start);
        let days = next.signed_duration_since(start).num_days().max(1);
        CalendarAdapter::new(start, days as u32)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Every day in the window, in order
    pub fn days(&self) -> Vec<NaiveDate> {
        self.start
            .iter_days()
            .take(self.days as usize)
            .collect()
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        let offset = day.signed_duration_since(self.start).num_days();
        (0..i64::from(self.days)).contains(&offset)
    }
}

impl ContainerAdapter for CalendarAdapter {
    type Entity = Task;
    type Key = NaiveDate;

    fn container_of(&self, task: &Task) -> Option<NaiveDate> {
        task.scheduled.filter(|day| self.contains(*day))
    }

    fn assign(&self, task: &mut Task, day: &NaiveDate) {
        task.scheduled = Some(*day);
    }

    fn declared_containers(&self) -> Vec<NaiveDate> {
        self.days()
    }

    fn accepts(&self, day: &NaiveDate) -> bool {
        self.contains(*day)
    }
}
