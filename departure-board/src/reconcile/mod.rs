//! Schedule reconciliation.
//!
//! Turns a normalized schedules document into flat departure records. Each
//! scheduled stop is joined with its route, stop, trip and (optional)
//! prediction from the `included` side table, and its arrival and departure
//! legs are run through the status algorithm.
//!
//! Records that cannot be resolved are dropped one at a time; a bad record
//! never fails the whole board.

mod error;
mod index;

pub use error::ReconciliationError;
pub use index::IncludedIndex;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::domain::{DepartureRecord, LegStatus, RouteId, compute_status};
use crate::transit::{Document, EntityKind, Resource, TransitApi, TransportError};

/// Result of reconciling one schedules document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Records in API response order.
    pub records: Vec<DepartureRecord>,

    /// Number of scheduled stops that were dropped.
    pub dropped: usize,

    /// The instant the board was loaded for.
    pub as_of: DateTime<Utc>,
}

impl Reconciliation {
    /// A reconciliation with nothing to show.
    pub fn empty(as_of: DateTime<Utc>) -> Self {
        Self {
            records: Vec::new(),
            dropped: 0,
            as_of,
        }
    }
}

/// Fetch schedules for the given routes and reconcile them.
///
/// With no routes there is nothing to ask for, so no request is made and
/// the result is empty.
pub async fn reconcile<A: TransitApi>(
    api: &A,
    route_ids: &[RouteId],
    as_of: DateTime<Utc>,
) -> Result<Reconciliation, TransportError> {
    if route_ids.is_empty() {
        debug!("no routes to reconcile");
        return Ok(Reconciliation::empty(as_of));
    }

    let document = api.fetch_schedules(route_ids).await?;
    Ok(reconcile_document(&document, as_of))
}

/// Reconcile an already-fetched schedules document.
pub fn reconcile_document(document: &Document, as_of: DateTime<Utc>) -> Reconciliation {
    let index = IncludedIndex::build(&document.included);
    debug!(
        schedules = document.data.len(),
        routes = index.count(EntityKind::Route),
        stops = index.count(EntityKind::Stop),
        trips = index.count(EntityKind::Trip),
        predictions = index.count(EntityKind::Prediction),
        "reconciling schedules"
    );

    let mut records = Vec::with_capacity(document.data.len());
    let mut dropped = 0;

    for scheduled in &document.data {
        match reconcile_stop(scheduled, &index) {
            Ok(record) => records.push(record),
            Err(e @ ReconciliationError::NoTimes { .. }) => {
                debug!(error = %e, "skipping scheduled stop");
                dropped += 1;
            }
            Err(e) => {
                warn!(error = %e, "skipping scheduled stop");
                dropped += 1;
            }
        }
    }

    Reconciliation {
        records,
        dropped,
        as_of,
    }
}

/// Reconcile a single scheduled stop against the included entities.
pub fn reconcile_stop(
    scheduled: &Resource,
    index: &IncludedIndex<'_>,
) -> Result<DepartureRecord, ReconciliationError> {
    let trip = resolve_required(scheduled, index, EntityKind::Trip)?;
    let route = resolve_required(scheduled, index, EntityKind::Route)?;
    let stop = resolve_required(scheduled, index, EntityKind::Stop)?;
    let prediction = resolve_prediction(scheduled, index);

    let arrival = leg_status(scheduled, prediction, "arrival_time")?;
    let departure = leg_status(scheduled, prediction, "departure_time")?;

    DepartureRecord::from_legs(
        display_name(trip),
        display_name(stop),
        route.id.as_str(),
        arrival,
        departure,
    )
    .ok_or_else(|| ReconciliationError::NoTimes {
        schedule: scheduled.id.clone(),
    })
}

/// Look up a relationship that every scheduled stop must have.
fn resolve_required<'a>(
    scheduled: &Resource,
    index: &IncludedIndex<'a>,
    kind: EntityKind,
) -> Result<&'a Resource, ReconciliationError> {
    let id = scheduled.related_id(kind.as_str()).ok_or_else(|| {
        ReconciliationError::MissingRelationship {
            schedule: scheduled.id.clone(),
            kind,
        }
    })?;

    index
        .get(kind, id)
        .ok_or_else(|| ReconciliationError::UnresolvedRelationship {
            schedule: scheduled.id.clone(),
            kind,
            id: id.to_string(),
        })
}

/// Look up the optional live prediction. A dangling reference is treated
/// as no prediction.
fn resolve_prediction<'a>(scheduled: &Resource, index: &IncludedIndex<'a>) -> Option<&'a Resource> {
    let id = scheduled.related_id(EntityKind::Prediction.as_str())?;
    let prediction = index.get(EntityKind::Prediction, id);
    if prediction.is_none() {
        debug!(schedule = %scheduled.id, prediction = id, "prediction not included");
    }
    prediction
}

fn leg_status(
    scheduled: &Resource,
    prediction: Option<&Resource>,
    field: &'static str,
) -> Result<Option<LegStatus>, ReconciliationError> {
    compute_status(
        scheduled.attribute_str(field),
        prediction.and_then(|p| p.attribute_str(field)),
    )
    .map_err(|source| ReconciliationError::InvalidTime {
        schedule: scheduled.id.clone(),
        field,
        source,
    })
}

/// The `name` attribute, falling back to the id.
fn display_name(entity: &Resource) -> &str {
    entity.attribute_str("name").unwrap_or(&entity.id)
}
