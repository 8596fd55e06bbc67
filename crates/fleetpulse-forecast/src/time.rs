//! Calendar helpers shared across the engine.
//!
//! All public entry points take an explicit `now` so the engine never reads
//! the wall clock itself; callers (CLI, scheduled jobs) sample it once.

use chrono::{DateTime, Duration, NaiveTime, Utc};

/// Trailing lookback for metrics and repair-duration windows, in days.
pub const METRICS_WINDOW_DAYS: i64 = 30;

/// Truncate a timestamp to midnight UTC of the same day.
pub fn start_of_day(t: DateTime<Utc>) -> DateTime<Utc> {
    t.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Start of the trailing metrics window: start-of-day 30 days before `now`.
///
/// Recomputed on every call, so results drift as real time advances.
pub fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    start_of_day(now - Duration::days(METRICS_WINDOW_DAYS))
}

/// Signed fractional hours from `from` to `to`. Negative when `to` is earlier.
pub fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_seconds() as f64 / 3600.0
}
