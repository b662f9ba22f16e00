use chrono::{DateTime, Utc};
use tracing::warn;

/// Parse an RFC 3339 timestamp such as `2021-01-26T09:16:16.000Z`.
///
/// Empty or unparseable values fall back to `now` with a warning.
pub fn parse_timestamp(value: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    if value.is_empty() {
        warn!("empty timestamp, using current time");
        return now;
    }

    match DateTime::parse_from_rfc3339(value) {
        Ok(timestamp) => timestamp.with_timezone(&Utc),
        Err(e) => {
            warn!(value, error = %e, "unparseable timestamp, using current time");
            now
        }
    }
}

fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Absolute hours between `timestamp` and `now`, rounded to two decimals
pub fn elapsed_hours(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let seconds = (now - timestamp).num_seconds().abs();
    round_hundredths(seconds as f64 / 3600.0)
}

/// Hours converted to days, rounded to two decimals
pub fn elapsed_days(hours: f64) -> f64 {
    round_hundredths(hours / 24.0)
}

/// Hours between an RFC 3339 timestamp string and `now`
pub fn hours_since(value: &str, now: DateTime<Utc>) -> f64 {
    elapsed_hours(parse_timestamp(value, now), now)
}

/// Days between an RFC 3339 timestamp string and `now`
pub fn days_since(value: &str, now: DateTime<Utc>) -> f64 {
    elapsed_days(hours_since(value, now))
}

/// A device is active while it was last heard from within the threshold.
pub fn is_active(elapsed_hours: f64, inactivity_threshold_secs: i64) -> bool {
    elapsed_hours < inactivity_threshold_secs as f64 / 3600.0
}

/// Fraction reported by the remote service as a truncated percentage
pub fn as_percent(fraction: f64) -> i64 {
    (fraction * 100.0) as i64
}
