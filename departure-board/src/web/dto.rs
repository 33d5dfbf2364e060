//! Data transfer objects for web requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::board::{BoardQuery, BoardSnapshot, Column, LoadStatus};
use crate::domain::DepartureRecord;

/// Query parameters for the departures listing.
#[derive(Debug, Default, Deserialize)]
pub struct DeparturesRequest {
    /// Exact train number
    pub train: Option<String>,

    /// Exact stop name
    pub stop: Option<String>,

    /// Exact route name
    pub route: Option<String>,

    /// Include departures that have already left
    #[serde(default)]
    pub show_past: bool,
}

impl DeparturesRequest {
    /// Convert to a board query. Empty filters mean "all".
    pub fn to_query(&self) -> BoardQuery {
        fn filter(value: &Option<String>) -> Option<String> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        }

        BoardQuery {
            train_number: filter(&self.train),
            stop_name: filter(&self.stop),
            route_name: filter(&self.route),
            show_past: self.show_past,
        }
    }
}

/// Choices for the column filters. Each column lists the values left after
/// the other filters are applied.
#[derive(Debug, Serialize)]
pub struct FilterOptions {
    pub trains: Vec<String>,
    pub stops: Vec<String>,
    pub routes: Vec<String>,
}

impl FilterOptions {
    pub fn for_query(records: &[DepartureRecord], query: &BoardQuery, now: DateTime<Utc>) -> Self {
        Self {
            trains: query.options(records, Column::TrainNumber, now),
            stops: query.options(records, Column::StopName, now),
            routes: query.options(records, Column::RouteName, now),
        }
    }
}

/// Response for the departures listing.
#[derive(Debug, Serialize)]
pub struct DeparturesResponse {
    /// Transit mode label, e.g. "Commuter Rail"
    pub mode: String,

    /// Load status of the board
    pub status: LoadStatus,

    /// Message of a failed load, for display above the table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Generation of the displayed records
    pub generation: u64,

    /// Scheduled stops that could not be displayed
    pub dropped: usize,

    /// Instant the board was loaded for
    pub as_of: Option<DateTime<Utc>>,

    /// Filter choices
    pub filters: FilterOptions,

    /// Matching departures, ordered by scheduled time
    pub departures: Vec<DepartureRecord>,
}

impl DeparturesResponse {
    /// Build the response for a snapshot, applying the query at `now`.
    pub fn from_snapshot(
        mode: &str,
        snapshot: &BoardSnapshot,
        query: &BoardQuery,
        now: DateTime<Utc>,
    ) -> Self {
        let error = match &snapshot.status {
            LoadStatus::Error(message) => Some(message.clone()),
            LoadStatus::Pending | LoadStatus::Ready => None,
        };

        Self {
            mode: mode.to_string(),
            status: snapshot.status.clone(),
            error,
            generation: snapshot.generation,
            dropped: snapshot.dropped,
            as_of: snapshot.as_of,
            filters: FilterOptions::for_query(&snapshot.records, query, now),
            departures: query.apply(&snapshot.records, now),
        }
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
