//! Walks working minutes forward through a shift, stepping over breaks.

use super::breaks::MinuteInterval;
use crate::utils::time::{MINUTES_PER_DAY, from_minutes, to_minutes};
use chrono::NaiveTime;

/// Minute at which `required` working minutes have elapsed from `start`.
///
/// A minute inside a break does not count as work. Clear stretches are
/// consumed in bulk up to the next break or the shift end, which gives the
/// same result as advancing one minute at a time. The walk stops at
/// `end` even if `required` is not met. The result is not wrapped: values
/// past 1440 fall on the next day.
pub fn walk(start: i64, end: i64, breaks: &[MinuteInterval], required: i64) -> i64 {
    let mut t = start;
    let mut done = 0;
    let mut idx = 0;

    while t < end && done < required {
        while idx < breaks.len() && breaks[idx].end <= t {
            idx += 1;
        }

        if let Some(b) = breaks.get(idx)
            && b.start <= t
        {
            t = b.end;
            continue;
        }

        let stop = breaks.get(idx).map_or(end, |b| b.start.min(end));
        let step = (stop - t).min(required - done);
        t += step;
        done += step;
    }

    t
}

/// Time of day at which `required` working minutes are done.
///
/// `breaks` must be merged and sorted. A shift end at or before `start`
/// is taken as the next day.
pub fn finish_time(
    start: NaiveTime,
    shift_end: NaiveTime,
    breaks: &[MinuteInterval],
    required: i64,
) -> NaiveTime {
    let s = to_minutes(start);
    let mut e = to_minutes(shift_end);
    if e <= s {
        e += MINUTES_PER_DAY;
    }
    from_minutes(walk(s, e, breaks, required))
}
