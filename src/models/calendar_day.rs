use crate::core::scheduler::{available, breaks};
use crate::utils::date::weekday_label;
use crate::utils::time::{self, hhmm, round_hours, to_minutes};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Canonical regular breaks every calendar day carries: (name, start, end).
pub const BREAK_TEMPLATES: [(&str, &str, &str); 3] = [
    ("Morning Tea", "10:00", "10:15"),
    ("Lunch", "13:00", "13:30"),
    ("Evening Tea", "16:45", "17:00"),
];

pub const DEFAULT_SHIFT_START: &str = "08:00";
pub const DEFAULT_SHIFT_END: &str = "20:00";

/// A recurring, named break applied daily when enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegularBreak {
    #[serde(default)]
    pub name: String,
    #[serde(default, with = "hhmm")]
    pub start: Option<NaiveTime>,
    #[serde(default, with = "hhmm")]
    pub end: Option<NaiveTime>,
    #[serde(default)]
    pub enabled: bool,
}

/// A one-off break for exceptional events on a single date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecialBreak {
    #[serde(default)]
    pub description: String,
    #[serde(default, with = "hhmm")]
    pub start: Option<NaiveTime>,
    #[serde(default, with = "hhmm")]
    pub end: Option<NaiveTime>,
    #[serde(default)]
    pub enabled: bool,
}

/// An enabled, fully specified break as a pair of times of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl BreakWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// `[start, end)` in minutes since midnight; an end at or before the start wraps.
    pub fn span(&self) -> (i64, i64) {
        let s = to_minutes(self.start);
        let mut e = to_minutes(self.end);
        if e <= s {
            e += time::MINUTES_PER_DAY;
        }
        (s, e)
    }

    /// Whether the two windows share at least one minute; touching ends do not count.
    pub fn overlaps(&self, other: &BreakWindow) -> bool {
        let (s, e) = self.span();
        let (os, oe) = other.span();
        s < oe && os < e
    }
}

fn window_of(enabled: bool, start: Option<NaiveTime>, end: Option<NaiveTime>) -> Option<BreakWindow> {
    match (enabled, start, end) {
        (true, Some(s), Some(e)) => Some(BreakWindow::new(s, e)),
        _ => None,
    }
}

impl RegularBreak {
    pub fn template(name: &str, start: &str, end: &str) -> Self {
        Self {
            name: name.to_string(),
            start: time::parse_time(start),
            end: time::parse_time(end),
            enabled: true,
        }
    }

    pub fn window(&self) -> Option<BreakWindow> {
        window_of(self.enabled, self.start, self.end)
    }
}

impl SpecialBreak {
    pub fn window(&self) -> Option<BreakWindow> {
        window_of(self.enabled, self.start, self.end)
    }
}

pub fn default_regular_breaks() -> Vec<RegularBreak> {
    BREAK_TEMPLATES
        .iter()
        .map(|(n, s, e)| RegularBreak::template(n, s, e))
        .collect()
}

/// One configured calendar date.
///
/// `day` and `available_hours` are derived values: they are persisted for
/// display but recomputed by [`CalendarDay::normalize`] on every load and save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    #[serde(default)]
    pub day: String,
    #[serde(default, with = "hhmm")]
    pub shift_start: Option<NaiveTime>,
    #[serde(default, with = "hhmm")]
    pub shift_end: Option<NaiveTime>,
    #[serde(default)]
    pub regular_breaks: Vec<RegularBreak>,
    #[serde(default)]
    pub special_break: SpecialBreak,
    #[serde(default)]
    pub sunday_work: bool,
    #[serde(default)]
    pub available_hours: f64,
}

impl CalendarDay {
    /// A fresh day with the default 08:00–20:00 shift and the template breaks.
    pub fn with_defaults(date: NaiveDate) -> Self {
        let mut day = Self {
            date,
            day: String::new(),
            shift_start: time::parse_time(DEFAULT_SHIFT_START),
            shift_end: time::parse_time(DEFAULT_SHIFT_END),
            regular_breaks: default_regular_breaks(),
            special_break: SpecialBreak::default(),
            sunday_work: false,
            available_hours: 0.0,
        };
        day.normalize();
        day
    }

    /// Recompute every derived field: weekday label, template breaks, available hours.
    pub fn normalize(&mut self) {
        self.day = weekday_label(self.date).to_string();
        self.regular_breaks = ensure_all_breaks_present(&self.regular_breaks);
        self.available_hours = self.compute_available_hours();
    }

    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// Every enabled, fully specified break of the day (regular and special).
    pub fn break_windows(&self) -> Vec<BreakWindow> {
        self.regular_breaks
            .iter()
            .filter_map(RegularBreak::window)
            .chain(self.special_break.window())
            .collect()
    }

    /// Breaks used when scheduling work: an enabled special break replaces
    /// every regular break it overlaps, even partly; the others are kept.
    pub fn effective_break_windows(&self) -> Vec<BreakWindow> {
        let Some(special) = self.special_break.window() else {
            return self.break_windows();
        };

        self.regular_breaks
            .iter()
            .filter_map(RegularBreak::window)
            .filter(|b| !b.overlaps(&special))
            .chain(std::iter::once(special))
            .collect()
    }

    /// Shift duration minus the merged effective breaks, in hours (2 decimals).
    pub fn compute_available_hours(&self) -> f64 {
        let (Some(start), Some(end)) = (self.shift_start, self.shift_end) else {
            return 0.0;
        };

        let merged = breaks::merge_breaks(self.effective_break_windows());
        let window = available::available_window(start, end, &merged, None);
        round_hours(window.available_minutes as f64 / 60.0)
    }
}

/// Make sure the three template breaks exist, in template order.
///
/// A missing template is added enabled with default times. An enabled
/// template with a blank start or end gets the default time back. An
/// explicitly disabled template stays disabled. Custom breaks follow.
pub fn ensure_all_breaks_present(breaks: &[RegularBreak]) -> Vec<RegularBreak> {
    let mut out: Vec<RegularBreak> = BREAK_TEMPLATES
        .iter()
        .map(|(name, start, end)| {
            let tpl = RegularBreak::template(name, start, end);
            match breaks.iter().find(|b| b.name == *name) {
                None => tpl,
                Some(found) => RegularBreak {
                    start: found.start.or(tpl.start),
                    end: found.end.or(tpl.end),
                    ..found.clone()
                },
            }
        })
        .collect();

    out.extend(
        breaks
            .iter()
            .filter(|b| !BREAK_TEMPLATES.iter().any(|(n, _, _)| *n == b.name))
            .cloned(),
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::time::parse_time;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn default_day_has_eleven_hours() {
        let day = CalendarDay::with_defaults(date("2025-06-02"));
        assert_eq!(day.day, "Mon");
        assert_eq!(day.regular_breaks.len(), 3);
        assert_eq!(day.available_hours, 11.0);
    }

    #[test]
    fn weekday_is_recomputed_not_trusted() {
        let mut day = CalendarDay::with_defaults(date("2025-06-01"));
        day.day = "Fri".into();
        day.normalize();
        assert_eq!(day.day, "Sun");
    }

    #[test]
    fn normalize_is_idempotent() {
        let mut day = CalendarDay::with_defaults(date("2025-06-03"));
        day.regular_breaks.remove(1);
        day.special_break = SpecialBreak {
            description: "Audit".into(),
            start: parse_time("12:45"),
            end: parse_time("13:40"),
            enabled: true,
        };
        day.available_hours = 99.0;

        let once = day.clone().normalized();
        let twice = once.clone().normalized();
        assert_eq!(once, twice);
        // Lunch is re-synthesised, then replaced by the special break 12:45-13:40.
        // 720 - (15 + 55 + 15) = 635 minutes.
        assert_eq!(once.available_hours, 10.58);
    }

    #[test]
    fn missing_templates_are_synthesized_and_disabled_ones_kept() {
        let stored = vec![
            RegularBreak {
                name: "Lunch".into(),
                start: None,
                end: None,
                enabled: false,
            },
            RegularBreak {
                name: "Stretch".into(),
                start: parse_time("18:00"),
                end: parse_time("18:05"),
                enabled: true,
            },
        ];
        let out = ensure_all_breaks_present(&stored);
        assert_eq!(out.len(), 4);
        assert_eq!(out[0].name, "Morning Tea");
        assert!(out[0].enabled);
        assert_eq!(out[1].name, "Lunch");
        assert!(!out[1].enabled);
        assert_eq!(out[1].start, parse_time("13:00"));
        assert_eq!(out[3].name, "Stretch");
    }

    #[test]
    fn enabled_template_with_blank_times_gets_defaults() {
        let stored = vec![RegularBreak {
            name: "Evening Tea".into(),
            start: None,
            end: parse_time("17:10"),
            enabled: true,
        }];
        let out = ensure_all_breaks_present(&stored);
        assert_eq!(out[2].start, parse_time("16:45"));
        assert_eq!(out[2].end, parse_time("17:10"));
    }

    #[test]
    fn unset_shift_means_zero_hours() {
        let mut day = CalendarDay::with_defaults(date("2025-06-04"));
        day.shift_end = None;
        day.normalize();
        assert_eq!(day.available_hours, 0.0);
    }

    #[test]
    fn break_fully_covering_shift_never_goes_negative() {
        let mut day = CalendarDay::with_defaults(date("2025-06-04"));
        day.shift_start = parse_time("09:00");
        day.shift_end = parse_time("10:00");
        day.special_break = SpecialBreak {
            description: "Power cut".into(),
            start: parse_time("08:00"),
            end: parse_time("11:00"),
            enabled: true,
        };
        day.normalize();
        assert_eq!(day.available_hours, 0.0);
    }

    #[test]
    fn special_break_replaces_covered_regular_break() {
        let mut day = CalendarDay::with_defaults(date("2025-06-04"));
        day.special_break = SpecialBreak {
            description: "Town hall".into(),
            start: parse_time("12:30"),
            end: parse_time("14:00"),
            enabled: true,
        };
        let starts: Vec<_> = day
            .effective_break_windows()
            .iter()
            .map(|w| time::format_time(w.start))
            .collect();
        assert_eq!(starts, vec!["10:00", "16:45", "12:30"]);
    }

    #[test]
    fn special_break_replaces_partly_overlapped_regular_break() {
        let mut day = CalendarDay::with_defaults(date("2025-06-02"));
        day.special_break = SpecialBreak {
            description: "Toolbox talk".into(),
            start: parse_time("13:15"),
            end: parse_time("13:20"),
            enabled: true,
        };
        day.normalize();

        let starts: Vec<_> = day
            .effective_break_windows()
            .iter()
            .map(|w| time::format_time(w.start))
            .collect();
        assert_eq!(starts, vec!["10:00", "16:45", "13:15"]);
        // 720 - (15 + 5 + 15): lunch no longer counts
        assert_eq!(day.available_hours, 11.42);
    }

    #[test]
    fn touching_special_break_keeps_the_regular_one() {
        let mut day = CalendarDay::with_defaults(date("2025-06-02"));
        day.special_break = SpecialBreak {
            description: "Handover".into(),
            start: parse_time("13:30"),
            end: parse_time("13:45"),
            enabled: true,
        };
        assert_eq!(day.effective_break_windows().len(), 4);
    }

    #[test]
    fn json_document_uses_blank_strings_for_unset_times() {
        let mut day = CalendarDay::with_defaults(date("2025-06-04"));
        day.shift_start = None;
        let json = serde_json::to_value(&day).unwrap();
        assert_eq!(json["shiftStart"], "");
        assert_eq!(json["shiftEnd"], "20:00");
        assert_eq!(json["specialBreak"]["start"], "");

        let back: CalendarDay = serde_json::from_value(json).unwrap();
        assert_eq!(back.shift_start, None);
        assert_eq!(back.shift_end, parse_time("20:00"));
    }
}
