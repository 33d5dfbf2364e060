//! On-time / early / late status for one leg (arrival or departure) of a
//! scheduled stop.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use super::time::{TimeError, format_clock, humanize_distance, parse_timestamp};

/// The time shown for a leg.
///
/// A leg with a live prediction keeps both values so the original schedule
/// can always be recovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DisplayTime {
    /// Scheduled time only; no prediction available.
    Plain { time: String },

    /// Predicted time, with the originally scheduled time as detail.
    Adjusted { predicted: String, original: String },
}

impl DisplayTime {
    /// The time to show first: the prediction if there is one.
    pub fn primary(&self) -> &str {
        match self {
            DisplayTime::Plain { time } => time,
            DisplayTime::Adjusted { predicted, .. } => predicted,
        }
    }

    /// The originally scheduled time.
    pub fn original(&self) -> &str {
        match self {
            DisplayTime::Plain { time } => time,
            DisplayTime::Adjusted { original, .. } => original,
        }
    }

    /// Whether a prediction moved the time away from the schedule.
    pub fn is_changed(&self) -> bool {
        self.primary() != self.original()
    }
}

impl fmt::Display for DisplayTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.primary())
    }
}

/// How a prediction compares with the schedule.
///
/// The early/late variants carry the humanized distance, e.g. `5 minutes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Punctuality {
    OnTime,
    Early(String),
    Late(String),
}

impl Punctuality {
    /// Compare a predicted instant with the scheduled one.
    pub fn compare(predicted: DateTime<Utc>, scheduled: DateTime<Utc>) -> Self {
        match predicted.cmp(&scheduled) {
            Ordering::Greater => Punctuality::Late(humanize_distance(predicted, scheduled)),
            Ordering::Less => Punctuality::Early(humanize_distance(predicted, scheduled)),
            Ordering::Equal => Punctuality::OnTime,
        }
    }
}

impl fmt::Display for Punctuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Punctuality::OnTime => f.write_str("On Time"),
            Punctuality::Early(delta) => write!(f, "Early {delta}"),
            Punctuality::Late(delta) => write!(f, "Late {delta}"),
        }
    }
}

/// Status of one leg of a scheduled stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegStatus {
    pub display_time: DisplayTime,

    /// The scheduled instant. Predictions never change it, so ordering by
    /// this value keeps the board stable.
    pub scheduled: DateTime<Utc>,

    pub punctuality: Punctuality,
}

impl LegStatus {
    /// Status text such as `On Time` or `Late 5 minutes`.
    pub fn status_text(&self) -> String {
        self.punctuality.to_string()
    }
}

/// Compute the status of one leg from its scheduled and predicted times.
///
/// Returns `Ok(None)` when there is no scheduled time, meaning the leg does
/// not apply (a terminus has no departure). A scheduled time that cannot be
/// parsed is an error; a predicted time that cannot be parsed is ignored and
/// the leg is reported as if it had no prediction.
///
/// # Examples
///
/// ```
/// use departure_board::domain::compute_status;
///
/// let leg = compute_status(Some("2024-01-01T08:00:00Z"), Some("2024-01-01T08:05:00Z"))
///     .unwrap()
///     .unwrap();
/// assert_eq!(leg.status_text(), "Late 5 minutes");
/// assert_eq!(leg.display_time.primary(), "08:05:00 AM");
/// assert_eq!(leg.display_time.original(), "08:00:00 AM");
///
/// assert!(compute_status(None, Some("2024-01-01T08:05:00Z")).unwrap().is_none());
/// ```
pub fn compute_status(
    scheduled: Option<&str>,
    predicted: Option<&str>,
) -> Result<Option<LegStatus>, TimeError> {
    let Some(scheduled) = scheduled else {
        return Ok(None);
    };

    let scheduled = parse_timestamp(scheduled)?;
    let scheduled_utc = scheduled.with_timezone(&Utc);

    let predicted = predicted.and_then(|p| match parse_timestamp(p) {
        Ok(t) => Some(t),
        Err(e) => {
            debug!(error = %e, "ignoring unparseable prediction");
            None
        }
    });

    let status = match predicted {
        None => LegStatus {
            display_time: DisplayTime::Plain {
                time: format_clock(&scheduled),
            },
            scheduled: scheduled_utc,
            punctuality: Punctuality::OnTime,
        },
        Some(predicted) => LegStatus {
            display_time: DisplayTime::Adjusted {
                predicted: format_clock(&predicted),
                original: format_clock(&scheduled),
            },
            scheduled: scheduled_utc,
            punctuality: Punctuality::compare(predicted.with_timezone(&Utc), scheduled_utc),
        },
    };

    Ok(Some(status))
}
