use chrono::{DateTime, Utc};

#[must_use]
pub fn format_datetime(value: DateTime<Utc>) -> String {
    value.to_rfc3339()
}

/// `m:ss` countdown text.
#[must_use]
pub fn format_countdown(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Response time with one decimal, e.g. `3.0s`.
#[must_use]
pub fn format_seconds(secs: f64) -> String {
    format!("{secs:.1}s")
}

/// Whole-number percentage, e.g. `67%`.
#[must_use]
pub fn format_percent(value: f64) -> String {
    format!("{value:.0}%")
}

/// Signed score change, e.g. `+10` or `-5`.
#[must_use]
pub fn format_delta(delta: i32) -> String {
    format!("{delta:+}")
}
