//! Read-only calendar view used by the scheduler, and per-day shift resolution.

use super::available::shift_bounds;
use super::breaks::{MinuteInterval, align_to_shift, merge_breaks};
use crate::models::calendar_day::{
    CalendarDay, DEFAULT_SHIFT_END, DEFAULT_SHIFT_START, default_regular_breaks,
};
use crate::utils::date::is_sunday;
use crate::utils::time::parse_time;
use chrono::{NaiveDate, NaiveTime};
use std::collections::HashMap;

/// Knobs of the scheduler that do not live in the calendar itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannerSettings {
    /// Shift used for dates with no calendar entry (and for missing bounds).
    pub default_shift_start: NaiveTime,
    pub default_shift_end: NaiveTime,
    /// Rate of the degraded estimate used when the calendar cannot be read.
    pub fallback_hours_per_day: f64,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            default_shift_start: parse_time(DEFAULT_SHIFT_START).unwrap_or(NaiveTime::MIN),
            default_shift_end: parse_time(DEFAULT_SHIFT_END).unwrap_or(NaiveTime::MIN),
            fallback_hours_per_day: 8.0,
        }
    }
}

/// All configured days, indexed by date.
#[derive(Debug, Clone, Default)]
pub struct CalendarSnapshot {
    days: HashMap<NaiveDate, CalendarDay>,
}

impl CalendarSnapshot {
    pub fn from_days<I>(days: I) -> Self
    where
        I: IntoIterator<Item = CalendarDay>,
    {
        Self {
            days: days
                .into_iter()
                .map(|d| (d.date, d.normalized()))
                .collect(),
        }
    }

    pub fn get(&self, date: NaiveDate) -> Option<&CalendarDay> {
        self.days.get(&date)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Shift and breaks of a working day, breaks merged and anchored on the shift.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkingDay {
    pub shift_start: NaiveTime,
    pub shift_end: NaiveTime,
    pub breaks: Vec<MinuteInterval>,
}

impl WorkingDay {
    fn new(shift_start: NaiveTime, shift_end: NaiveTime, merged: Vec<MinuteInterval>) -> Self {
        let (s, e) = shift_bounds(shift_start, shift_end);
        Self {
            shift_start,
            shift_end,
            breaks: align_to_shift(&merged, s, e),
        }
    }

    /// `[start, end)` of the shift in minutes, end past 1440 when overnight.
    pub fn bounds(&self) -> (i64, i64) {
        shift_bounds(self.shift_start, self.shift_end)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DaySchedule {
    Off,
    Working(WorkingDay),
}

/// Decide whether `date` is worked and with which shift.
///
/// * Sunday without the `sunday_work` override: off.
/// * No calendar entry: the default shift with the template breaks.
/// * Entry with no shift at all: off, unless it is a Sunday-work day,
///   which then runs the default shift.
/// * Entry with one bound missing: that bound takes its default.
pub fn resolve_day(
    date: NaiveDate,
    entry: Option<&CalendarDay>,
    settings: &PlannerSettings,
) -> DaySchedule {
    let sunday = is_sunday(date);
    let sunday_work = entry.is_some_and(|e| e.sunday_work);

    if sunday && !sunday_work {
        return DaySchedule::Off;
    }

    let Some(entry) = entry else {
        let merged = merge_breaks(default_regular_breaks().iter().filter_map(|b| b.window()));
        return DaySchedule::Working(WorkingDay::new(
            settings.default_shift_start,
            settings.default_shift_end,
            merged,
        ));
    };

    if entry.shift_start.is_none() && entry.shift_end.is_none() && !(sunday && sunday_work) {
        return DaySchedule::Off;
    }

    DaySchedule::Working(WorkingDay::new(
        entry.shift_start.unwrap_or(settings.default_shift_start),
        entry.shift_end.unwrap_or(settings.default_shift_end),
        merge_breaks(entry.effective_break_windows()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::date::parse_date;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn unknown_weekday_uses_default_shift_and_template_breaks() {
        let day = resolve_day(d("2025-06-03"), None, &PlannerSettings::default());
        let DaySchedule::Working(w) = day else {
            panic!("expected a working day");
        };
        assert_eq!(w.bounds(), (480, 1200));
        assert_eq!(w.breaks.len(), 3);
    }

    #[test]
    fn sunday_is_off_unless_overridden() {
        let settings = PlannerSettings::default();
        assert_eq!(resolve_day(d("2025-06-01"), None, &settings), DaySchedule::Off);

        let mut entry = CalendarDay::with_defaults(d("2025-06-01"));
        assert_eq!(resolve_day(entry.date, Some(&entry), &settings), DaySchedule::Off);

        entry.sunday_work = true;
        assert!(matches!(
            resolve_day(entry.date, Some(&entry), &settings),
            DaySchedule::Working(_)
        ));
    }

    #[test]
    fn entry_without_shift_is_a_holiday() {
        let mut entry = CalendarDay::with_defaults(d("2025-06-04"));
        entry.shift_start = None;
        entry.shift_end = None;
        let settings = PlannerSettings::default();
        assert_eq!(resolve_day(entry.date, Some(&entry), &settings), DaySchedule::Off);
    }

    #[test]
    fn sunday_work_without_shift_runs_the_default_shift() {
        let mut entry = CalendarDay::with_defaults(d("2025-06-08"));
        entry.shift_start = None;
        entry.shift_end = None;
        entry.sunday_work = true;
        let DaySchedule::Working(w) =
            resolve_day(entry.date, Some(&entry), &PlannerSettings::default())
        else {
            panic!("expected a working day");
        };
        assert_eq!(w.bounds(), (480, 1200));
    }

    #[test]
    fn snapshot_normalizes_what_it_is_given() {
        let mut day = CalendarDay::with_defaults(d("2025-06-04"));
        day.available_hours = 0.0;
        day.day = "Sun".into();
        let snap = CalendarSnapshot::from_days(vec![day]);
        let stored = snap.get(d("2025-06-04")).unwrap();
        assert_eq!(stored.day, "Wed");
        assert_eq!(stored.available_hours, 11.0);
        assert_eq!(snap.len(), 1);
    }
}
