//! Date/time utilities for giveaway-scout.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Format used for the "Posted" line of a notification.
pub const POSTED_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";

/// Parse a timezone name, falling back to UTC for unknown names.
pub fn parse_timezone(timezone: &str) -> Tz {
    timezone.parse().unwrap_or(Tz::UTC)
}

/// Format a UTC datetime in the given timezone.
///
/// # Arguments
///
/// * `dt` - DateTime in UTC
/// * `tz` - Display timezone
/// * `format` - Output format string (e.g., "%Y-%m-%d %H:%M")
pub fn format_in_timezone(dt: &DateTime<Utc>, tz: Tz, format: &str) -> String {
    dt.with_timezone(&tz).format(format).to_string()
}

/// Whole minutes elapsed between `created_at` and `now`, never negative.
pub fn minutes_since(created_at: &DateTime<Utc>, now: &DateTime<Utc>) -> i64 {
    now.signed_duration_since(*created_at).num_minutes().max(0)
}
