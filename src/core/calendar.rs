use crate::core::scheduler::available::available_window;
use crate::core::scheduler::calendar::{DaySchedule, PlannerSettings, resolve_day};
use crate::db::log::{LogOp, ttlog_quiet};
use crate::db::pool::DbPool;
use crate::db::queries::{
    delete_calendar_day, load_calendar_day, load_calendar_range, upsert_calendar_day,
};
use crate::errors::{AppError, AppResult};
use crate::models::calendar_day::{BREAK_TEMPLATES, CalendarDay, RegularBreak, SpecialBreak};
use crate::ui::messages::success;
use crate::utils::time::{parse_time, round_hours};
use chrono::{NaiveDate, NaiveTime};
use std::collections::HashMap;

/// `NAME=HH:MM-HH:MM` → (name, start, end).
pub fn parse_break_spec(spec: &str) -> AppResult<(String, NaiveTime, NaiveTime)> {
    let invalid = || AppError::InvalidBreak(spec.to_string());

    let (name, range) = spec.split_once('=').ok_or_else(invalid)?;
    let (start, end) = range.split_once('-').ok_or_else(invalid)?;

    let name = name.trim();
    if name.is_empty() {
        return Err(invalid());
    }

    let start = parse_time(start).ok_or_else(invalid)?;
    let end = parse_time(end).ok_or_else(invalid)?;
    if start == end {
        return Err(invalid());
    }

    Ok((name.to_string(), start, end))
}

/// Template names match regardless of case; custom names are kept verbatim.
fn canonical_break_name(name: &str) -> String {
    BREAK_TEMPLATES
        .iter()
        .find(|(n, _, _)| n.eq_ignore_ascii_case(name))
        .map(|(n, _, _)| n.to_string())
        .unwrap_or_else(|| name.to_string())
}

/// Changes requested for one calendar date. Unset fields keep what is stored.
#[derive(Debug, Clone, Default)]
pub struct DayUpdate {
    pub shift_start: Option<NaiveTime>,
    pub shift_end: Option<NaiveTime>,
    /// Clear both shift bounds, turning the date into a holiday.
    pub off: bool,
    pub breaks: Vec<(String, NaiveTime, NaiveTime)>,
    pub disable_breaks: Vec<String>,
    pub special: Option<(String, NaiveTime, NaiveTime)>,
    pub clear_special: bool,
    pub sunday_work: Option<bool>,
    /// Start again from the default day before applying the rest.
    pub reset: bool,
}

impl DayUpdate {
    /// Apply onto `existing` (or a fresh default day) and normalise.
    pub fn apply(&self, date: NaiveDate, existing: Option<CalendarDay>) -> AppResult<CalendarDay> {
        let mut day = match existing {
            Some(d) if !self.reset => d,
            _ => CalendarDay::with_defaults(date),
        };

        if self.off {
            day.shift_start = None;
            day.shift_end = None;
        }
        if let Some(t) = self.shift_start {
            day.shift_start = Some(t);
        }
        if let Some(t) = self.shift_end {
            day.shift_end = Some(t);
        }

        for (name, start, end) in &self.breaks {
            let name = canonical_break_name(name);
            match day.regular_breaks.iter_mut().find(|b| b.name == name) {
                Some(b) => {
                    b.start = Some(*start);
                    b.end = Some(*end);
                    b.enabled = true;
                }
                None => day.regular_breaks.push(RegularBreak {
                    name,
                    start: Some(*start),
                    end: Some(*end),
                    enabled: true,
                }),
            }
        }

        for name in &self.disable_breaks {
            let name = canonical_break_name(name);
            let found = day
                .regular_breaks
                .iter_mut()
                .find(|b| b.name == name)
                .ok_or_else(|| AppError::InvalidBreak(format!("unknown break '{name}'")))?;
            found.enabled = false;
        }

        if self.clear_special {
            day.special_break = SpecialBreak::default();
        }
        if let Some((description, start, end)) = &self.special {
            day.special_break = SpecialBreak {
                description: description.clone(),
                start: Some(*start),
                end: Some(*end),
                enabled: true,
            };
        }

        if let Some(flag) = self.sunday_work {
            day.sunday_work = flag;
        }

        Ok(day.normalized())
    }
}

/// Where a listed day's figures come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaySource {
    Configured,
    Default,
}

/// One row of the calendar listing, as the scheduler sees the date.
#[derive(Debug, Clone)]
pub struct CalendarRow {
    pub date: NaiveDate,
    pub entry: Option<CalendarDay>,
    pub source: DaySource,
    pub working: bool,
    pub shift: Option<(NaiveTime, NaiveTime)>,
    pub available_hours: f64,
}

pub struct CalendarLogic;

impl CalendarLogic {
    pub fn upsert(pool: &DbPool, date: NaiveDate, update: &DayUpdate) -> AppResult<CalendarDay> {
        let existing = load_calendar_day(&pool.conn, date)?;
        let created = existing.is_none();
        let day = update.apply(date, existing)?;
        let stored = upsert_calendar_day(&pool.conn, &day)?;

        let op = if created { LogOp::Add } else { LogOp::Edit };
        ttlog_quiet(
            &pool.conn,
            op,
            &format!("day {date}"),
            &format!("{} ({:.2} h available)", stored.day, stored.available_hours),
        );
        success(format!(
            "Calendar day {} {} → {:.2} h available",
            date,
            if created { "created" } else { "updated" },
            stored.available_hours
        ));

        Ok(stored)
    }

    pub fn delete(pool: &DbPool, date: NaiveDate) -> AppResult<()> {
        if delete_calendar_day(&pool.conn, date)? == 0 {
            return Err(AppError::NoCalendarEntry(date.to_string()));
        }
        ttlog_quiet(&pool.conn, LogOp::Del, &format!("day {date}"), "Calendar day deleted");
        success(format!("Deleted calendar day {}", date));
        Ok(())
    }

    /// Every date of `dates`, stored or not, resolved the way projections see it.
    pub fn rows(
        pool: &DbPool,
        dates: &[NaiveDate],
        settings: &PlannerSettings,
    ) -> AppResult<Vec<CalendarRow>> {
        let (Some(&first), Some(&last)) = (dates.first(), dates.last()) else {
            return Ok(Vec::new());
        };

        let mut stored: HashMap<NaiveDate, CalendarDay> =
            load_calendar_range(&pool.conn, first, last)?
                .into_iter()
                .map(|d| (d.date, d))
                .collect();

        Ok(dates
            .iter()
            .map(|&date| describe_day(date, stored.remove(&date), settings))
            .collect())
    }
}

pub fn describe_day(
    date: NaiveDate,
    entry: Option<CalendarDay>,
    settings: &PlannerSettings,
) -> CalendarRow {
    let source = if entry.is_some() {
        DaySource::Configured
    } else {
        DaySource::Default
    };

    match resolve_day(date, entry.as_ref(), settings) {
        DaySchedule::Off => CalendarRow {
            date,
            entry,
            source,
            working: false,
            shift: None,
            available_hours: 0.0,
        },
        DaySchedule::Working(w) => {
            let window = available_window(w.shift_start, w.shift_end, &w.breaks, None);
            CalendarRow {
                date,
                entry,
                source,
                working: true,
                shift: Some((w.shift_start, w.shift_end)),
                available_hours: round_hours(window.available_minutes as f64 / 60.0),
            }
        }
    }
}
