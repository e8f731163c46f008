//! Finds the first in-shift moment at or after a timestamp.

use super::calendar::{CalendarSnapshot, DaySchedule, PlannerSettings, resolve_day};
use crate::utils::time::{from_minutes, to_minutes};
use chrono::{Days, NaiveDateTime};
use tracing::warn;

/// Upper bound on days scanned before giving up.
pub const LOCATOR_MAX_DAYS: usize = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkingStart {
    pub at: NaiveDateTime,
    /// Still on the date of the requested start.
    pub is_first_day: bool,
}

/// Next working moment at or after `start`.
///
/// On the original day the requested time of day is kept when it falls
/// inside the shift and moved to the shift start when it falls before.
/// Past the shift end, off days and Sundays move the scan to the next day,
/// where the shift start is taken. A calendar with no working day within
/// [`LOCATOR_MAX_DAYS`] is a configuration error: it is logged and `start`
/// is returned unchanged.
pub fn next_working_time(
    start: NaiveDateTime,
    calendar: &CalendarSnapshot,
    settings: &PlannerSettings,
) -> WorkingStart {
    let mut date = start.date();
    let mut is_first_day = true;

    for _ in 0..LOCATOR_MAX_DAYS {
        if let DaySchedule::Working(day) = resolve_day(date, calendar.get(date), settings) {
            let (shift_start, shift_end) = day.bounds();
            let pos = if is_first_day {
                to_minutes(start.time())
            } else {
                shift_start
            };

            if pos < shift_start {
                return WorkingStart {
                    at: date.and_time(from_minutes(shift_start)),
                    is_first_day,
                };
            }
            if pos < shift_end {
                return WorkingStart {
                    at: date.and_time(from_minutes(pos)),
                    is_first_day,
                };
            }
        }

        let Some(next) = date.checked_add_days(Days::new(1)) else {
            break;
        };
        date = next;
        is_first_day = false;
    }

    warn!(
        start = %start,
        max_days = LOCATOR_MAX_DAYS,
        "no working time found in calendar; keeping the requested start"
    );
    WorkingStart {
        at: start,
        is_first_day: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::calendar_day::CalendarDay;
    use crate::utils::date::parse_date;
    use crate::utils::time::{parse_datetime, parse_time};

    fn at(s: &str) -> NaiveDateTime {
        parse_datetime(s).unwrap()
    }

    fn locate(s: &str, cal: &CalendarSnapshot) -> WorkingStart {
        next_working_time(at(s), cal, &PlannerSettings::default())
    }

    #[test]
    fn before_shift_moves_to_shift_start() {
        let ws = locate("2025-06-03T06:30", &CalendarSnapshot::default());
        assert_eq!(ws.at, at("2025-06-03T08:00"));
        assert!(ws.is_first_day);
    }

    #[test]
    fn during_shift_keeps_the_time() {
        let ws = locate("2025-06-03T11:20", &CalendarSnapshot::default());
        assert_eq!(ws.at, at("2025-06-03T11:20"));
        assert!(ws.is_first_day);
    }

    #[test]
    fn start_inside_a_break_is_left_to_the_walker() {
        let ws = locate("2025-06-03T13:10", &CalendarSnapshot::default());
        assert_eq!(ws.at, at("2025-06-03T13:10"));
    }

    #[test]
    fn after_shift_moves_to_next_day_shift_start() {
        let ws = locate("2025-06-03T21:00", &CalendarSnapshot::default());
        assert_eq!(ws.at, at("2025-06-04T08:00"));
        assert!(!ws.is_first_day);
    }

    #[test]
    fn saturday_evening_skips_sunday() {
        let ws = locate("2025-06-07T20:00", &CalendarSnapshot::default());
        assert_eq!(ws.at, at("2025-06-09T08:00"));
        assert!(!ws.is_first_day);
    }

    #[test]
    fn sunday_work_day_is_used() {
        let mut sunday = CalendarDay::with_defaults(parse_date("2025-06-08").unwrap());
        sunday.sunday_work = true;
        sunday.shift_start = parse_time("09:00");
        let cal = CalendarSnapshot::from_days(vec![sunday]);
        let ws = locate("2025-06-07T22:00", &cal);
        assert_eq!(ws.at, at("2025-06-08T09:00"));
    }

    #[test]
    fn configured_holidays_are_skipped() {
        let mut holiday = CalendarDay::with_defaults(parse_date("2025-06-04").unwrap());
        holiday.shift_start = None;
        holiday.shift_end = None;
        let cal = CalendarSnapshot::from_days(vec![holiday]);
        let ws = locate("2025-06-04T09:00", &cal);
        assert_eq!(ws.at, at("2025-06-05T08:00"));
        assert!(!ws.is_first_day);
    }

    #[test]
    fn overnight_shift_accepts_late_evening_start() {
        let mut night = CalendarDay::with_defaults(parse_date("2025-06-03").unwrap());
        night.shift_start = parse_time("20:00");
        night.shift_end = parse_time("06:00");
        let cal = CalendarSnapshot::from_days(vec![night]);
        let ws = locate("2025-06-03T22:10", &cal);
        assert_eq!(ws.at, at("2025-06-03T22:10"));
        assert!(ws.is_first_day);
    }

    #[test]
    fn calendar_without_working_days_returns_the_start() {
        let first = parse_date("2025-01-01").unwrap();
        let holidays = first.iter_days().take(400).map(|d| {
            let mut day = CalendarDay::with_defaults(d);
            day.shift_start = None;
            day.shift_end = None;
            day
        });
        let cal = CalendarSnapshot::from_days(holidays);
        let ws = locate("2025-01-01T10:00", &cal);
        assert_eq!(ws.at, at("2025-01-01T10:00"));
        assert!(ws.is_first_day);
    }
}
