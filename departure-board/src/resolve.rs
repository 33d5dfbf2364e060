//! Route resolution: which routes does the configured mode run?

use tracing::debug;

use crate::domain::{RouteId, TransitMode};
use crate::transit::{TransitApi, TransportError};

/// Fetch the ids of the active routes for a mode, in API order.
///
/// An empty list is a valid answer (nothing to display), not an error.
pub async fn resolve_routes<A: TransitApi>(
    api: &A,
    mode: TransitMode,
) -> Result<Vec<RouteId>, TransportError> {
    let document = api.fetch_routes(mode).await?;

    let routes: Vec<RouteId> = document
        .data
        .into_iter()
        .map(|route| RouteId::new(route.id))
        .collect();

    debug!(%mode, count = routes.len(), "resolved routes");
    Ok(routes)
}

/// Join route ids into the comma-separated `filter[route]` value.
///
/// # Examples
///
/// ```
/// use departure_board::domain::RouteId;
/// use departure_board::resolve::route_filter;
///
/// let ids = [RouteId::new("CR-Fitchburg"), RouteId::new("CR-Lowell")];
/// assert_eq!(route_filter(&ids), "CR-Fitchburg,CR-Lowell");
/// assert_eq!(route_filter(&[]), "");
/// ```
pub fn route_filter(route_ids: &[RouteId]) -> String {
    route_ids
        .iter()
        .map(RouteId::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transit::{Document, MockTransitApi};

    #[tokio::test]
    async fn resolves_in_api_order() {
        let api = MockTransitApi::new("data/mock").unwrap();
        let routes = resolve_routes(&api, TransitMode::CommuterRail).await.unwrap();

        assert_eq!(
            routes,
            vec![RouteId::new("CR-Fitchburg"), RouteId::new("CR-Lowell")]
        );
    }

    #[tokio::test]
    async fn empty_route_list_is_not_an_error() {
        let api = MockTransitApi::from_documents(Document::default(), Document::default());
        let routes = resolve_routes(&api, TransitMode::Ferry).await.unwrap();
        assert!(routes.is_empty());
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let api = MockTransitApi::from_documents(Document::default(), Document::default())
            .failing_with(500);

        let err = resolve_routes(&api, TransitMode::CommuterRail)
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Api { status: 500, .. }));
    }

    #[test]
    fn single_route_has_no_separator() {
        assert_eq!(route_filter(&[RouteId::new("CR-Worcester")]), "CR-Worcester");
    }
}
