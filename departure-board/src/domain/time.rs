//! Timestamp parsing, clock formatting and humanized durations.
//!
//! The transit API sends ISO-8601 timestamps with the agency's UTC offset
//! (`2024-01-01T08:00:00-05:00`). Instants are compared in UTC, but clock
//! times are rendered in the offset the API supplied so the board shows
//! local time.

use chrono::{DateTime, FixedOffset, Utc};

/// Clock format for display times: `hh:mm:ss AM/PM`.
pub const CLOCK_FORMAT: &str = "%I:%M:%S %p";

const MINUTES_IN_HOUR: i64 = 60;
const MINUTES_IN_DAY: i64 = 1440;
const MINUTES_IN_ALMOST_TWO_DAYS: i64 = 2520;
const MINUTES_IN_MONTH: i64 = 43200;
const MINUTES_IN_TWO_MONTHS: i64 = 86400;
const MINUTES_IN_YEAR: i64 = 525600;

/// Error returned when a timestamp is not valid ISO-8601.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid timestamp {value:?}: {reason}")]
pub struct TimeError {
    value: String,
    reason: String,
}

impl TimeError {
    /// The offending input.
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Parse an ISO-8601 (RFC 3339) timestamp, keeping its UTC offset.
///
/// # Examples
///
/// ```
/// use departure_board::domain::parse_timestamp;
///
/// let t = parse_timestamp("2024-01-01T08:00:00-05:00").unwrap();
/// assert_eq!(t.with_timezone(&chrono::Utc).to_rfc3339(), "2024-01-01T13:00:00+00:00");
///
/// assert!(parse_timestamp("08:00").is_err());
/// ```
pub fn parse_timestamp(s: &str) -> Result<DateTime<FixedOffset>, TimeError> {
    DateTime::parse_from_rfc3339(s.trim()).map_err(|e| TimeError {
        value: s.to_string(),
        reason: e.to_string(),
    })
}

/// Format a timestamp as `hh:mm:ss AM/PM` in its own offset.
pub fn format_clock(t: &DateTime<FixedOffset>) -> String {
    t.format(CLOCK_FORMAT).to_string()
}

/// Describe the distance between two instants in words.
///
/// Direction is ignored; the result reads the same whichever argument is
/// later. Sub-minute differences are rounded to the nearest minute.
///
/// # Examples
///
/// ```
/// use chrono::{TimeDelta, Utc};
/// use departure_board::domain::humanize_distance;
///
/// let t = Utc::now();
/// assert_eq!(humanize_distance(t + TimeDelta::minutes(5), t), "5 minutes");
/// assert_eq!(humanize_distance(t, t + TimeDelta::seconds(20)), "less than a minute");
/// ```
pub fn humanize_distance(a: DateTime<Utc>, b: DateTime<Utc>) -> String {
    let seconds = (a - b).num_seconds().abs();
    let minutes = round_div(seconds, 60);

    if minutes == 0 {
        "less than a minute".to_string()
    } else if minutes < 45 {
        plural(minutes, "minute")
    } else if minutes < 90 {
        "about 1 hour".to_string()
    } else if minutes < MINUTES_IN_DAY {
        format!("about {}", plural(round_div(minutes, MINUTES_IN_HOUR), "hour"))
    } else if minutes < MINUTES_IN_ALMOST_TWO_DAYS {
        "1 day".to_string()
    } else if minutes < MINUTES_IN_MONTH {
        plural(round_div(minutes, MINUTES_IN_DAY), "day")
    } else if minutes < MINUTES_IN_TWO_MONTHS {
        format!("about {}", plural(round_div(minutes, MINUTES_IN_MONTH), "month"))
    } else if minutes < MINUTES_IN_YEAR {
        plural(round_div(minutes, MINUTES_IN_MONTH), "month")
    } else {
        let months = round_div(minutes, MINUTES_IN_MONTH);
        let years = months / 12;
        match months % 12 {
            0..3 => format!("about {}", plural(years, "year")),
            3..9 => format!("over {}", plural(years, "year")),
            _ => format!("almost {}", plural(years + 1, "year")),
        }
    }
}

/// Integer division rounding half up. Both operands must be non-negative.
fn round_div(n: i64, d: i64) -> i64 {
    (n + d / 2) / d
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}
