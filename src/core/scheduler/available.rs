//! Net working minutes of one shift.

use super::breaks::{MinuteInterval, align_to_shift};
use crate::utils::time::{MINUTES_PER_DAY, to_minutes};
use chrono::NaiveTime;

/// Working window of one day after clipping and break subtraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub available_minutes: i64,
    /// Effective start, minutes since midnight.
    pub start_minute: i64,
    /// Shift end, past 1440 for an overnight shift.
    pub end_minute: i64,
}

/// Shift bounds in minutes; an end at or before the start rolls to the next day.
pub fn shift_bounds(shift_start: NaiveTime, shift_end: NaiveTime) -> (i64, i64) {
    let s = to_minutes(shift_start);
    let mut e = to_minutes(shift_end);
    if e <= s {
        e += MINUTES_PER_DAY;
    }
    (s, e)
}

/// Available minutes of a shift given its merged breaks.
///
/// `clip_from` is the requested start minute on the first day of a scan;
/// the effective start becomes `max(clip_from, shift_start)`.
pub fn available_window(
    shift_start: NaiveTime,
    shift_end: NaiveTime,
    merged_breaks: &[MinuteInterval],
    clip_from: Option<i64>,
) -> DayWindow {
    let (s, e) = shift_bounds(shift_start, shift_end);
    let start = clip_from.map_or(s, |c| c.max(s));

    if start >= e {
        return DayWindow {
            available_minutes: 0,
            start_minute: start,
            end_minute: e,
        };
    }

    let breaks = align_to_shift(merged_breaks, s, e);
    let overlap: i64 = breaks.iter().map(|b| b.overlap(start, e)).sum();

    DayWindow {
        available_minutes: ((e - start) - overlap).max(0),
        start_minute: start,
        end_minute: e,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scheduler::breaks::merge_breaks;
    use crate::models::calendar_day::BreakWindow;
    use crate::utils::time::parse_time;

    fn t(s: &str) -> NaiveTime {
        parse_time(s).unwrap()
    }

    fn standard_breaks() -> Vec<MinuteInterval> {
        merge_breaks(vec![
            BreakWindow::new(t("10:00"), t("10:15")),
            BreakWindow::new(t("13:00"), t("13:30")),
            BreakWindow::new(t("16:45"), t("17:00")),
        ])
    }

    #[test]
    fn standard_day_has_660_minutes() {
        let w = available_window(t("08:00"), t("20:00"), &standard_breaks(), None);
        assert_eq!(w.available_minutes, 660);
        assert_eq!((w.start_minute, w.end_minute), (480, 1200));
    }

    #[test]
    fn first_day_clips_to_the_requested_start() {
        // 13:10 start: lunch partly consumed, evening tea whole
        let w = available_window(t("08:00"), t("20:00"), &standard_breaks(), Some(790));
        assert_eq!(w.start_minute, 790);
        assert_eq!(w.available_minutes, (1200 - 790) - 20 - 15);
    }

    #[test]
    fn clip_before_shift_start_uses_shift_start() {
        let w = available_window(t("08:00"), t("20:00"), &[], Some(300));
        assert_eq!(w.start_minute, 480);
        assert_eq!(w.available_minutes, 720);
    }

    #[test]
    fn clip_after_shift_end_leaves_nothing() {
        let w = available_window(t("08:00"), t("20:00"), &[], Some(1260));
        assert_eq!(w.available_minutes, 0);
    }

    #[test]
    fn breaks_outside_the_shift_are_ignored() {
        let breaks = merge_breaks(vec![BreakWindow::new(t("06:00"), t("07:00"))]);
        let w = available_window(t("08:00"), t("12:00"), &breaks, None);
        assert_eq!(w.available_minutes, 240);
    }

    #[test]
    fn break_covering_the_whole_shift_floors_at_zero() {
        let breaks = merge_breaks(vec![BreakWindow::new(t("07:00"), t("21:00"))]);
        let w = available_window(t("08:00"), t("20:00"), &breaks, None);
        assert_eq!(w.available_minutes, 0);
    }

    #[test]
    fn overnight_shift_counts_breaks_after_midnight() {
        let breaks = merge_breaks(vec![
            BreakWindow::new(t("22:00"), t("22:15")),
            BreakWindow::new(t("02:00"), t("02:30")),
        ]);
        let w = available_window(t("20:00"), t("06:00"), &breaks, None);
        assert_eq!(w.end_minute, 1800);
        assert_eq!(w.available_minutes, 600 - 15 - 30);
    }

    #[test]
    fn available_minutes_are_never_negative() {
        let starts = ["00:00", "06:00", "08:00", "12:00", "20:00", "23:30"];
        let ends = ["00:00", "06:30", "12:00", "20:00", "23:59"];
        for s in starts {
            for e in ends {
                let w = available_window(t(s), t(e), &standard_breaks(), None);
                assert!(w.available_minutes >= 0, "{s}-{e}");
            }
        }
    }
}
