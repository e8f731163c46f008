use chrono::{Datelike, NaiveDate, Weekday};

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Short weekday label (`Sun`..`Sat`), always derived from the date itself.
pub fn weekday_label(d: NaiveDate) -> &'static str {
    match d.weekday() {
        Weekday::Sun => "Sun",
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
    }
}

pub fn is_sunday(d: NaiveDate) -> bool {
    d.weekday() == Weekday::Sun
}

pub fn generate_from_period(p: &str) -> Result<Vec<NaiveDate>, String> {
    // YYYY-MM-DD
    if let Ok(d) = NaiveDate::parse_from_str(p, "%Y-%m-%d") {
        return Ok(vec![d]);
    }

    // YYYY-MM
    if let Ok(dm) = NaiveDate::parse_from_str(&(p.to_string() + "-01"), "%Y-%m-%d") {
        return Ok(all_days_of_month(dm.year(), dm.month()));
    }

    // YYYY
    if let Ok(year) = p.parse::<i32>()
        && NaiveDate::from_ymd_opt(year, 1, 1).is_some()
    {
        return Ok(all_days_of_year(year));
    }

    Err(format!("Invalid period: {}", p))
}

pub fn generate_range(start: &str, end: &str) -> Result<Vec<NaiveDate>, String> {
    let s = generate_from_period(start)?;
    let e = generate_from_period(end)?;

    let (Some(&start_date), Some(&end_date)) = (s.first(), e.last()) else {
        return Err(format!("Invalid range: {}:{}", start, end));
    };

    Ok(start_date
        .iter_days()
        .take_while(|d| *d <= end_date)
        .collect())
}

/// Resolve a `--period` argument; no argument means the current month.
pub fn resolve_period(period: Option<&str>) -> Result<Vec<NaiveDate>, String> {
    match period {
        Some(p) => match p.split_once(':') {
            Some((a, b)) => generate_range(a, b),
            None => generate_from_period(p),
        },
        None => current_month_dates(),
    }
}

pub fn current_month_dates() -> Result<Vec<NaiveDate>, String> {
    let today = today();
    Ok(all_days_of_month(today.year(), today.month()))
}

pub fn all_days_of_month(year: i32, month: u32) -> Vec<NaiveDate> {
    match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(first) => first.iter_days().take_while(|d| d.month() == month).collect(),
        None => Vec::new(),
    }
}

pub fn all_days_of_year(year: i32) -> Vec<NaiveDate> {
    match NaiveDate::from_ymd_opt(year, 1, 1) {
        Some(first) => first.iter_days().take_while(|d| d.year() == year).collect(),
        None => Vec::new(),
    }
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Calendar days from `start` to `end`, both inclusive; 0 when `end` precedes `start`.
pub fn inclusive_day_span(start: NaiveDate, end: NaiveDate) -> i64 {
    let diff = (end - start).num_days();
    if diff < 0 { 0 } else { diff + 1 }
}
