//! Target-date projection: required hours + start → completion timestamp.

use super::available::available_window;
use super::calendar::{CalendarSnapshot, DaySchedule, PlannerSettings, resolve_day};
use super::locator::next_working_time;
use super::walker::walk;
use crate::errors::AppResult;
use crate::models::calendar_day::CalendarDay;
use crate::models::plan::ProductionPlan;
use crate::utils::date::inclusive_day_span;
use crate::utils::time::{MINUTES_PER_DAY, from_minutes, round_hours, to_minutes};
use chrono::{Days, Local, Months, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, warn};

/// Upper bound on days walked before answering with the sentinel.
pub const PROJECTOR_MAX_DAYS: usize = 1000;

/// Distance of the sentinel from "now".
pub const SENTINEL_MONTHS: u32 = 36;

/// No shift is longer than a day, so more than this can never fit in the guard.
const MAX_PROJECTABLE_HOURS: f64 = (PROJECTOR_MAX_DAYS * 24) as f64;

/// Work is tracked in hundredths of an hour (36 s) so minute rounding is exact.
const SECONDS_PER_HUNDREDTH: i64 = 36;

/// Which duration of a job feeds the projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProjectionKind {
    /// Every operation of the part.
    WholePart,
    /// The primary machining operation with load/unload and setup.
    MachineOnly,
}

impl ProjectionKind {
    pub fn label(&self) -> &'static str {
        match self {
            ProjectionKind::WholePart => "whole part",
            ProjectionKind::MachineOnly => "machine only",
        }
    }
}

/// A completion timestamp and how it was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "at", rename_all = "lowercase")]
pub enum ProjectionOutcome {
    /// Walked through the calendar.
    Computed(NaiveDateTime),
    /// Calendar unreadable: fixed hours-per-day estimate from now.
    Fallback(NaiveDateTime),
    /// Day-scan guard exhausted: far-future placeholder.
    Sentinel(NaiveDateTime),
}

impl ProjectionOutcome {
    pub fn timestamp(&self) -> NaiveDateTime {
        match self {
            ProjectionOutcome::Computed(t)
            | ProjectionOutcome::Fallback(t)
            | ProjectionOutcome::Sentinel(t) => *t,
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, ProjectionOutcome::Computed(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProjectionOutcome::Computed(_) => "computed",
            ProjectionOutcome::Fallback(_) => "fallback",
            ProjectionOutcome::Sentinel(_) => "sentinel",
        }
    }

    /// ISO-8601 without offset, e.g. `2025-06-04T18:00:00`.
    pub fn to_iso(&self) -> String {
        self.timestamp().format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}

/// Anything able to hand over the whole calendar.
pub trait CalendarSource {
    fn fetch_calendar(&self) -> AppResult<Vec<CalendarDay>>;
}

impl CalendarSource for Vec<CalendarDay> {
    fn fetch_calendar(&self) -> AppResult<Vec<CalendarDay>> {
        Ok(self.clone())
    }
}

/// Completion of `required_hours` of work starting at `start`.
///
/// Pure: the calendar is a snapshot and `now` only anchors the sentinel.
/// Hours are rounded to two decimals; negative hours count as zero, and
/// zero hours complete at the located start.
pub fn project_completion(
    start: NaiveDateTime,
    required_hours: f64,
    calendar: &CalendarSnapshot,
    settings: &PlannerSettings,
    now: NaiveDateTime,
) -> ProjectionOutcome {
    let hours = round_hours(required_hours.max(0.0));
    if hours > MAX_PROJECTABLE_HOURS {
        warn!(
            start = %start,
            hours,
            max_hours = MAX_PROJECTABLE_HOURS,
            "request exceeds what the projection guard can cover; answering with the sentinel"
        );
        return ProjectionOutcome::Sentinel(sentinel_from(now));
    }
    let mut remaining = (hours * 100.0).round() as i64 * SECONDS_PER_HUNDREDTH;

    let located = next_working_time(start, calendar, settings);
    if remaining <= 0 {
        return ProjectionOutcome::Computed(located.at);
    }

    let start_minute = to_minutes(located.at.time());
    let mut date = located.at.date();
    let mut first_day = located.is_first_day;

    for _ in 0..PROJECTOR_MAX_DAYS {
        if let DaySchedule::Working(day) = resolve_day(date, calendar.get(date), settings) {
            let clip = first_day.then_some(start_minute);
            let window = available_window(day.shift_start, day.shift_end, &day.breaks, clip);
            let available = window.available_minutes * 60;

            if available > 0 {
                if remaining <= available {
                    // a started minute still has to be walked in full
                    let minutes = (remaining + 59) / 60;
                    let finish = walk(window.start_minute, window.end_minute, &day.breaks, minutes);
                    let offset = Days::new(finish.div_euclid(MINUTES_PER_DAY) as u64);
                    if let Some(finish_date) = date.checked_add_days(offset) {
                        return ProjectionOutcome::Computed(
                            finish_date.and_time(from_minutes(finish)),
                        );
                    }
                    break;
                }
                remaining -= available;
            }
        }

        let Some(next) = date.checked_add_days(Days::new(1)) else {
            break;
        };
        date = next;
        first_day = false;
    }

    warn!(
        start = %start,
        hours,
        max_days = PROJECTOR_MAX_DAYS,
        "projection guard exhausted; answering with the far-future sentinel"
    );
    ProjectionOutcome::Sentinel(sentinel_from(now))
}

pub fn sentinel_from(now: NaiveDateTime) -> NaiveDateTime {
    now.checked_add_months(Months::new(SENTINEL_MONTHS))
        .unwrap_or(NaiveDateTime::MAX)
}

/// `now + ceil(hours / hours_per_day)` days.
pub fn fallback_from(now: NaiveDateTime, hours: f64, hours_per_day: f64) -> NaiveDateTime {
    let per_day = if hours_per_day > 0.0 { hours_per_day } else { 8.0 };
    let days = (hours.max(0.0) / per_day).ceil() as u64;
    now.checked_add_days(Days::new(days))
        .unwrap_or(NaiveDateTime::MAX)
}

/// Both targets of a production plan plus the elapsed calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlanProjection {
    pub whole_part: Option<ProjectionOutcome>,
    pub machine_only: Option<ProjectionOutcome>,
    pub working_days: i64,
}

/// Projector bound to a calendar source.
///
/// Every projection fetches the calendar once. A failed fetch never
/// reaches the caller: it degrades to [`ProjectionOutcome::Fallback`].
pub struct Projector<'a, S: CalendarSource + ?Sized> {
    source: &'a S,
    settings: PlannerSettings,
}

impl<'a, S: CalendarSource + ?Sized> Projector<'a, S> {
    pub fn new(source: &'a S, settings: PlannerSettings) -> Self {
        Self { source, settings }
    }

    pub fn settings(&self) -> &PlannerSettings {
        &self.settings
    }

    pub fn project(&self, start: NaiveDateTime, required_hours: f64) -> ProjectionOutcome {
        self.project_at(start, required_hours, Local::now().naive_local())
    }

    pub fn project_at(
        &self,
        start: NaiveDateTime,
        required_hours: f64,
        now: NaiveDateTime,
    ) -> ProjectionOutcome {
        match self.source.fetch_calendar() {
            Ok(days) => {
                let calendar = CalendarSnapshot::from_days(days);
                let outcome =
                    project_completion(start, required_hours, &calendar, &self.settings, now);
                debug!(
                    start = %start,
                    hours = required_hours,
                    outcome = outcome.label(),
                    at = %outcome.timestamp(),
                    "projection done"
                );
                outcome
            }
            Err(e) => {
                warn!(error = %e, "calendar unavailable; using the fixed-rate estimate");
                ProjectionOutcome::Fallback(fallback_from(
                    now,
                    required_hours,
                    self.settings.fallback_hours_per_day,
                ))
            }
        }
    }

    /// Duration of `plan` fed to the projection of the given kind.
    pub fn hours_for(plan: &ProductionPlan, kind: ProjectionKind) -> f64 {
        match kind {
            ProjectionKind::WholePart => plan.total_hours,
            ProjectionKind::MachineOnly => plan.machine_only_hours,
        }
    }

    /// Whole-part and machine-only targets of a plan. A kind with no hours
    /// gets no target; `working_days` counts calendar days from the start
    /// date to the whole-part target, both inclusive.
    pub fn project_plan(&self, plan: &ProductionPlan, now: NaiveDateTime) -> PlanProjection {
        let run = |kind| {
            let hours = Self::hours_for(plan, kind);
            (hours > 0.0).then(|| self.project_at(plan.start, hours, now))
        };

        let whole_part = run(ProjectionKind::WholePart);
        let machine_only = run(ProjectionKind::MachineOnly);
        let working_days = whole_part
            .map(|o| inclusive_day_span(plan.start.date(), o.timestamp().date()))
            .unwrap_or(0);

        PlanProjection {
            whole_part,
            machine_only,
            working_days,
        }
    }
}
