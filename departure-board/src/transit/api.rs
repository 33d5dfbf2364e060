//! The seam between the board and the network.

use std::future::Future;

use crate::domain::{RouteId, TransitMode};

use super::error::TransportError;
use super::types::Document;

/// Source of transit API documents.
///
/// Implemented by [`TransitClient`](super::TransitClient) for the real API
/// and by [`MockTransitApi`](super::MockTransitApi) for fixtures.
pub trait TransitApi: Send + Sync {
    /// Fetch the routes of the given mode.
    fn fetch_routes(
        &self,
        mode: TransitMode,
    ) -> impl Future<Output = Result<Document, TransportError>> + Send;

    /// Fetch the schedules of the given routes, with routes, stops, trips
    /// and predictions included.
    fn fetch_schedules(
        &self,
        route_ids: &[RouteId],
    ) -> impl Future<Output = Result<Document, TransportError>> + Send;
}
