//! Filtering and ordering of board records for display.

use chrono::{DateTime, Utc};

use crate::domain::DepartureRecord;

/// Filterable board columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    TrainNumber,
    StopName,
    RouteName,
}

impl Column {
    fn value(self, record: &DepartureRecord) -> &str {
        match self {
            Column::TrainNumber => &record.train_number,
            Column::StopName => &record.stop_name,
            Column::RouteName => &record.route_name,
        }
    }
}

/// Table view over the board: exact-match column filters, an optional
/// "hide past departures" filter, ordered by scheduled time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardQuery {
    pub train_number: Option<String>,
    pub stop_name: Option<String>,
    pub route_name: Option<String>,

    /// Include departures at or before `now`. Off by default.
    pub show_past: bool,
}

impl BoardQuery {
    /// Whether a record passes every filter.
    pub fn matches(&self, record: &DepartureRecord, now: DateTime<Utc>) -> bool {
        let filters = [
            (Column::TrainNumber, &self.train_number),
            (Column::StopName, &self.stop_name),
            (Column::RouteName, &self.route_name),
        ];

        let columns_match = filters.iter().all(|(column, wanted)| match wanted {
            Some(wanted) => column.value(record) == wanted,
            None => true,
        });

        columns_match && (self.show_past || !record.is_past(now))
    }

    /// Filter the records and sort them by scheduled time. Records with
    /// equal times keep their input order.
    pub fn apply(&self, records: &[DepartureRecord], now: DateTime<Utc>) -> Vec<DepartureRecord> {
        let mut selected: Vec<DepartureRecord> = records
            .iter()
            .filter(|r| self.matches(r, now))
            .cloned()
            .collect();
        selected.sort_by_key(|r| r.sort_time);
        selected
    }

    /// Choices for one column's filter: its distinct values among the
    /// records that pass every other filter. The column's own selection
    /// does not narrow its choices, so it can always be changed.
    pub fn options(
        &self,
        records: &[DepartureRecord],
        column: Column,
        now: DateTime<Utc>,
    ) -> Vec<String> {
        let others = self.without(column);
        let remaining: Vec<DepartureRecord> = records
            .iter()
            .filter(|r| others.matches(r, now))
            .cloned()
            .collect();
        distinct_values(&remaining, column)
    }

    fn without(&self, column: Column) -> BoardQuery {
        let mut query = self.clone();
        match column {
            Column::TrainNumber => query.train_number = None,
            Column::StopName => query.stop_name = None,
            Column::RouteName => query.route_name = None,
        }
        query
    }
}

/// Distinct values of a column in first-seen order, for filter choices.
pub fn distinct_values(records: &[DepartureRecord], column: Column) -> Vec<String> {
    let mut values: Vec<String> = Vec::new();
    for record in records {
        let value = column.value(record);
        if !values.iter().any(|v| v == value) {
            values.push(value.to_string());
        }
    }
    values
}
