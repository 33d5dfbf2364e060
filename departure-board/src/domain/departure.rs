//! Display-ready departure records.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::status::{DisplayTime, LegStatus};

/// Prefix marking a record whose trip ends at this stop.
pub const LAST_STOP_PREFIX: &str = "Last stop: ";

/// One row of the departure board.
///
/// Built from a scheduled stop and its resolved route, stop, trip and
/// optional prediction. Records are immutable once built; every load
/// produces a fresh set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartureRecord {
    /// Train number (the trip's name).
    pub train_number: String,

    /// Name of the stop.
    pub stop_name: String,

    /// Route label (the route id).
    pub route_name: String,

    /// Departure time, or arrival time at a terminus.
    pub display_time: DisplayTime,

    /// Status text, e.g. `Late 5 minutes` or `Last stop: On Time`.
    pub status: String,

    /// True when the trip ends here (no departure time).
    pub is_last_stop: bool,

    /// Scheduled departure if present, otherwise scheduled arrival.
    pub sort_time: DateTime<Utc>,

    /// Scheduled arrival instant, if any.
    pub arrival_instant: Option<DateTime<Utc>>,

    /// Scheduled departure instant, if any.
    pub departure_instant: Option<DateTime<Utc>>,
}

impl DepartureRecord {
    /// Combine the arrival and departure legs of a scheduled stop.
    ///
    /// The departure leg is primary. Without one the stop is the trip's
    /// terminus, so the arrival leg is used and its status is prefixed with
    /// [`LAST_STOP_PREFIX`]. Returns `None` if neither leg applies.
    pub fn from_legs(
        train_number: impl Into<String>,
        stop_name: impl Into<String>,
        route_name: impl Into<String>,
        arrival: Option<LegStatus>,
        departure: Option<LegStatus>,
    ) -> Option<Self> {
        let arrival_instant = arrival.as_ref().map(|a| a.scheduled);
        let departure_instant = departure.as_ref().map(|d| d.scheduled);

        let (primary, is_last_stop) = match (departure, arrival) {
            (Some(departure), _) => (departure, false),
            (None, Some(arrival)) => (arrival, true),
            (None, None) => return None,
        };

        let status = if is_last_stop {
            format!("{LAST_STOP_PREFIX}{}", primary.status_text())
        } else {
            primary.status_text()
        };

        Some(Self {
            train_number: train_number.into(),
            stop_name: stop_name.into(),
            route_name: route_name.into(),
            display_time: primary.display_time,
            status,
            is_last_stop,
            sort_time: primary.scheduled,
            arrival_instant,
            departure_instant,
        })
    }

    /// Whether this departure is at or before `now`.
    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.sort_time <= now
    }
}
