//! Break interval merging.
//!
//! Breaks arrive as times of day and leave as disjoint, sorted minute
//! intervals `[start, end)`. A break whose end is at or before its start
//! runs past midnight and ends on the next day (`end + 1440`).

use crate::models::calendar_day::BreakWindow;
use crate::utils::time::MINUTES_PER_DAY;

/// Half-open interval of minutes since midnight of the scheduling day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinuteInterval {
    pub start: i64,
    pub end: i64,
}

impl MinuteInterval {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn contains(&self, minute: i64) -> bool {
        minute >= self.start && minute < self.end
    }

    /// Minutes shared with `[from, to)`.
    #[inline]
    pub fn overlap(&self, from: i64, to: i64) -> i64 {
        (self.end.min(to) - self.start.max(from)).max(0)
    }
}

/// Merge break windows into the minimal sorted set of disjoint intervals.
pub fn merge_breaks<I>(windows: I) -> Vec<MinuteInterval>
where
    I: IntoIterator<Item = BreakWindow>,
{
    let intervals = windows
        .into_iter()
        .map(|w| {
            let (s, e) = w.span();
            MinuteInterval::new(s, e)
        })
        .collect();
    merge_intervals(intervals)
}

/// Sort then sweep: an interval starting at or before the last end extends it.
pub fn merge_intervals(mut intervals: Vec<MinuteInterval>) -> Vec<MinuteInterval> {
    intervals.sort_by_key(|i| i.start);

    let mut merged: Vec<MinuteInterval> = Vec::with_capacity(intervals.len());
    for iv in intervals {
        match merged.last_mut() {
            Some(last) if iv.start <= last.end => last.end = last.end.max(iv.end),
            _ => merged.push(iv),
        }
    }
    merged
}

/// Re-anchor merged breaks on a shift that runs past midnight.
///
/// For a shift `[shift_start, shift_end)` with `shift_end > 1440`, a break
/// that ends at or before `shift_start` belongs to the early-morning part of
/// the shift and is moved to the next day. Day shifts are returned unchanged.
pub fn align_to_shift(
    merged: &[MinuteInterval],
    shift_start: i64,
    shift_end: i64,
) -> Vec<MinuteInterval> {
    if shift_end <= MINUTES_PER_DAY {
        return merged.to_vec();
    }

    let moved = merged
        .iter()
        .map(|iv| {
            if iv.end <= shift_start {
                MinuteInterval::new(iv.start + MINUTES_PER_DAY, iv.end + MINUTES_PER_DAY)
            } else {
                *iv
            }
        })
        .collect();
    merge_intervals(moved)
}
