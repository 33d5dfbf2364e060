//! Per-record reconciliation errors.

use crate::domain::TimeError;
use crate::transit::EntityKind;

/// Why a scheduled stop could not become a departure record.
///
/// These are absorbed by the reconciler: the record is dropped and counted,
/// and the rest of the board is still built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconciliationError {
    /// The scheduled stop has no reference of a required kind
    #[error("schedule {schedule} has no {kind} relationship")]
    MissingRelationship { schedule: String, kind: EntityKind },

    /// The referenced entity is not in the included side table
    #[error("schedule {schedule} references {kind} {id}, which was not included")]
    UnresolvedRelationship {
        schedule: String,
        kind: EntityKind,
        id: String,
    },

    /// A scheduled time is not a valid timestamp
    #[error("schedule {schedule} has invalid {field}: {source}")]
    InvalidTime {
        schedule: String,
        field: &'static str,
        #[source]
        source: TimeError,
    },

    /// Neither an arrival nor a departure time is scheduled
    #[error("schedule {schedule} has neither arrival nor departure time")]
    NoTimes { schedule: String },
}
