//! Formatting utilities used for CLI outputs.

/// Decimal hours as `X hrs Y min`, carrying a rounded 60 into the hour.
pub fn hours2readable(hours: f64) -> String {
    if hours <= 0.0 {
        return "0 hrs 0 min".to_string();
    }

    let mut h = hours.floor() as i64;
    let mut m = ((hours - h as f64) * 60.0).round() as i64;
    if m == 60 {
        h += 1;
        m = 0;
    }

    format!("{} hrs {} min", h, m)
}
