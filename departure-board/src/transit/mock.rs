//! Mock transit API for running without network access.
//!
//! Loads a routes document and a schedules document from JSON files and
//! serves them as if they were live API responses.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use crate::domain::{RouteId, TransitMode};
use crate::resolve::route_filter;

use super::api::TransitApi;
use super::error::TransportError;
use super::types::Document;

/// File name of the routes fixture.
pub const ROUTES_FILE: &str = "routes.json";

/// File name of the schedules fixture.
pub const SCHEDULES_FILE: &str = "schedules.json";

/// Mock transit API that serves fixed documents.
///
/// Route and mode parameters are ignored, except that every schedules
/// request is recorded so tests can check what was asked for.
#[derive(Clone)]
pub struct MockTransitApi {
    routes: Arc<Document>,
    schedules: Arc<Document>,
    failure: Option<u16>,
    schedule_requests: Arc<Mutex<Vec<String>>>,
}

impl MockTransitApi {
    /// Load `routes.json` and `schedules.json` from a directory.
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, TransportError> {
        let data_dir = data_dir.as_ref();
        let routes = load_document(&data_dir.join(ROUTES_FILE))?;
        let schedules = load_document(&data_dir.join(SCHEDULES_FILE))?;
        Ok(Self::from_documents(routes, schedules))
    }

    /// Serve the given documents.
    pub fn from_documents(routes: Document, schedules: Document) -> Self {
        Self {
            routes: Arc::new(routes),
            schedules: Arc::new(schedules),
            failure: None,
            schedule_requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Make every request fail with the given HTTP status.
    pub fn failing_with(mut self, status: u16) -> Self {
        self.failure = Some(status);
        self
    }

    /// Route filters of the schedules requests made so far.
    pub fn schedule_requests(&self) -> Vec<String> {
        self.schedule_requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn check_failure(&self) -> Result<(), TransportError> {
        match self.failure {
            Some(status) => Err(TransportError::Api {
                status,
                message: "mock failure".to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl TransitApi for MockTransitApi {
    async fn fetch_routes(&self, _mode: TransitMode) -> Result<Document, TransportError> {
        self.check_failure()?;
        Ok(Document::clone(&self.routes))
    }

    async fn fetch_schedules(&self, route_ids: &[RouteId]) -> Result<Document, TransportError> {
        self.schedule_requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route_filter(route_ids));
        self.check_failure()?;
        Ok(Document::clone(&self.schedules))
    }
}

fn load_document(path: &Path) -> Result<Document, TransportError> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| TransportError::Config(format!("failed to read {}: {e}", path.display())))?;

    serde_json::from_str(&json).map_err(|e| TransportError::Json {
        message: format!("failed to parse {}: {e}", path.display()),
        body: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn load_mock_data() {
        let api = MockTransitApi::new("data/mock").unwrap();

        let routes = api.fetch_routes(TransitMode::CommuterRail).await.unwrap();
        assert!(!routes.data.is_empty());

        let schedules = api
            .fetch_schedules(&[RouteId::new("CR-Fitchburg")])
            .await
            .unwrap();
        assert!(!schedules.data.is_empty());
        assert!(!schedules.included.is_empty());
        assert_eq!(api.schedule_requests(), vec!["CR-Fitchburg".to_string()]);
    }

    #[test]
    fn missing_directory_is_config_error() {
        let result = MockTransitApi::new("/nonexistent/mock");
        assert!(matches!(result, Err(TransportError::Config(_))));
    }

    #[test]
    fn malformed_fixture_is_json_error() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(ROUTES_FILE), r#"{"data": []}"#).unwrap();
        std::fs::write(dir.path().join(SCHEDULES_FILE), "{not json").unwrap();

        let result = MockTransitApi::new(dir.path());
        assert!(matches!(result, Err(TransportError::Json { .. })));
    }

    #[tokio::test]
    async fn fixtures_from_temp_dir() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(ROUTES_FILE),
            r#"{"data": [{"id": "CR-Lowell", "type": "route"}]}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join(SCHEDULES_FILE), r#"{"data": [], "included": []}"#)
            .unwrap();

        let api = MockTransitApi::new(dir.path()).unwrap();
        let routes = api.fetch_routes(TransitMode::CommuterRail).await.unwrap();
        assert_eq!(routes.data[0].id, "CR-Lowell");
    }

    #[tokio::test]
    async fn failing_mock_returns_status() {
        let api = MockTransitApi::from_documents(Document::default(), Document::default())
            .failing_with(503);

        let err = api.fetch_routes(TransitMode::Bus).await.unwrap_err();
        assert_eq!(err.status(), Some(503));
    }
}
