//! Time utilities: HH:MM parsing, minute arithmetic, date-time formatting.

use crate::errors::{AppError, AppResult};
use chrono::{NaiveDateTime, NaiveTime, Timelike};

pub const MINUTES_PER_DAY: i64 = 24 * 60;

pub fn parse_time(t: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(t.trim(), "%H:%M").ok()
}

/// Empty or malformed strings are treated as "unset".
pub fn parse_time_lenient(t: &str) -> Option<NaiveTime> {
    if t.trim().is_empty() {
        None
    } else {
        parse_time(t)
    }
}

pub fn format_time(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

pub fn format_optional_time(t: Option<NaiveTime>) -> String {
    t.map(format_time).unwrap_or_else(|| "--:--".to_string())
}

/// Minutes since midnight.
pub fn to_minutes(t: NaiveTime) -> i64 {
    (t.hour() * 60 + t.minute()) as i64
}

/// Inverse of [`to_minutes`], wrapping past midnight.
pub fn from_minutes(mins: i64) -> NaiveTime {
    let m = mins.rem_euclid(MINUTES_PER_DAY);
    NaiveTime::from_hms_opt((m / 60) as u32, (m % 60) as u32, 0).unwrap_or(NaiveTime::MIN)
}

/// Two-decimal rounding used for every hour figure shown or stored.
pub fn round_hours(hours: f64) -> f64 {
    (hours * 100.0).round() / 100.0
}

pub fn parse_optional_time(input: Option<&String>) -> AppResult<Option<NaiveTime>> {
    if let Some(s) = input {
        let t = parse_time(s).ok_or_else(|| AppError::InvalidTime(s.to_string()))?;
        Ok(Some(t))
    } else {
        Ok(None)
    }
}

/// Accepts `YYYY-MM-DDTHH:MM`, `YYYY-MM-DD HH:MM` or a bare date (00:00).
pub fn parse_datetime(s: &str) -> AppResult<NaiveDateTime> {
    let s = s.trim();
    for fmt in ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN))
        .map_err(|_| AppError::InvalidDateTime(s.to_string()))
}

pub fn format_datetime(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M").to_string()
}

/// Serde adapter storing `Option<NaiveTime>` as `"HH:MM"`, with `""` for unset.
pub mod hhmm {
    use super::{format_time, parse_time_lenient};
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(t) => serializer.serialize_str(&format_time(*t)),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse_time_lenient))
    }
}
